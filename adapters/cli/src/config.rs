//! Optional TOML game configuration.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use metro_runners_system_spawning::Config as SpawningConfig;
use metro_runners_world::Config as WorldConfig;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_SPAWNING_SEED: u64 = 0x4d59_5df4_d0f3_3173;
const DEFAULT_TICK_RATE: u32 = 30;

/// Failures that can occur while loading the game configuration.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file is not valid TOML or contains unknown fields.
    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// A value is outside the range the game supports.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Root of the configuration file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) world: WorldSection,
    pub(crate) spawning: SpawningSection,
    pub(crate) window: WindowSection,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WorldSection {
    pub(crate) rng_seed: Option<u64>,
    pub(crate) boss_score_threshold: u32,
    pub(crate) damage_cooldown_ms: u64,
}

impl Default for WorldSection {
    fn default() -> Self {
        let defaults = WorldConfig::default();
        Self {
            rng_seed: None,
            boss_score_threshold: defaults.boss_score_threshold,
            damage_cooldown_ms: defaults.damage_cooldown.as_millis() as u64,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SpawningSection {
    pub(crate) rng_seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WindowSection {
    pub(crate) vsync: bool,
    pub(crate) show_fps: bool,
    pub(crate) tick_rate: u32,
    pub(crate) sprites: Option<PathBuf>,
    pub(crate) sounds: Option<PathBuf>,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            vsync: true,
            show_fps: false,
            tick_rate: DEFAULT_TICK_RATE,
            sprites: None,
            sounds: None,
        }
    }
}

impl GameConfig {
    /// Reads and validates the configuration stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.world.boss_score_threshold == 0 {
            return Err(ConfigError::Invalid {
                field: "world.boss_score_threshold",
                reason: "must be positive",
            });
        }
        Ok(())
    }

    /// World configuration, preferring `seed` over the file's seed.
    pub(crate) fn world_config(&self, seed: Option<u64>) -> WorldConfig {
        let defaults = WorldConfig::default();
        WorldConfig {
            rng_seed: seed.or(self.world.rng_seed).unwrap_or(defaults.rng_seed),
            boss_score_threshold: self.world.boss_score_threshold,
            damage_cooldown: Duration::from_millis(self.world.damage_cooldown_ms),
            ..defaults
        }
    }

    /// Spawning configuration, deriving a distinct stream from `seed`.
    pub(crate) fn spawning_config(&self, seed: Option<u64>) -> SpawningConfig {
        let seed = seed
            .map(|seed| seed.rotate_left(32) ^ DEFAULT_SPAWNING_SEED)
            .or(self.spawning.rng_seed)
            .unwrap_or(DEFAULT_SPAWNING_SEED);
        SpawningConfig::new(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = GameConfig::parse("", Path::new("game.toml")).expect("empty config parses");
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.world_config(None), WorldConfig::default());
        assert_eq!(config.window.tick_rate, 30);
    }

    #[test]
    fn sections_override_individual_fields() {
        let contents = r#"
            [world]
            rng_seed = 7
            boss_score_threshold = 100

            [window]
            vsync = false
            sprites = "assets/sprites.toml"
        "#;
        let config = GameConfig::parse(contents, Path::new("game.toml")).expect("config parses");

        let world = config.world_config(None);
        assert_eq!(world.rng_seed, 7);
        assert_eq!(world.boss_score_threshold, 100);
        assert_eq!(world.damage_cooldown, Duration::from_millis(1000));
        assert!(!config.window.vsync);
        assert_eq!(
            config.window.sprites.as_deref(),
            Some(Path::new("assets/sprites.toml"))
        );
    }

    #[test]
    fn command_line_seed_wins_over_file_seed() {
        let contents = "[world]\nrng_seed = 7\n";
        let config = GameConfig::parse(contents, Path::new("game.toml")).expect("config parses");
        assert_eq!(config.world_config(Some(99)).rng_seed, 99);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = GameConfig::parse("[world]\ngravity = 3\n", Path::new("game.toml"))
            .expect_err("unknown field must fail");
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_boss_threshold_is_invalid() {
        let error = GameConfig::parse("[world]\nboss_score_threshold = 0\n", Path::new("game.toml"))
            .expect_err("zero threshold must fail");
        assert_eq!(
            error.to_string(),
            "invalid value for `world.boss_score_threshold`: must be positive"
        );
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = GameConfig::load(Path::new("does/not/exist.toml")).expect_err("missing file");
        assert_eq!(error.to_string(), "failed to read config file does/not/exist.toml");
    }
}
