#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that launches Metro Runners.

mod clock;
mod config;
mod scene;
mod simulation;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use metro_runners_core::{GAME_TITLE, PLAY_HEIGHT, PLAY_WIDTH};
use metro_runners_rendering::{
    Color, Presentation, RenderingBackend, Scene, SoundCue, Viewport,
};
use metro_runners_rendering_macroquad::MacroquadBackend;

use self::{clock::MonotonicClock, config::GameConfig, simulation::Simulation};

/// Command-line arguments accepted by the game.
#[derive(Debug, Parser)]
#[command(name = "metro-runners", about = "Side-scrolling gravity runner")]
struct CliArgs {
    /// Seed for every random stream; overrides the config file.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML file with world, spawning and window settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Sprite manifest; placeholder rectangles are drawn without one.
    #[arg(long, value_name = "PATH")]
    sprites: Option<PathBuf>,
    /// Sound manifest; cues are only logged without one.
    #[arg(long, value_name = "PATH")]
    sounds: Option<PathBuf>,
    /// Log frame timing once per second.
    #[arg(long)]
    show_fps: bool,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, value_enum, value_name = "MODE")]
    vsync: Option<VsyncMode>,
    /// Fixed simulation rate; 0 runs unpaced.
    #[arg(long, value_name = "HZ")]
    tick_rate: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum VsyncMode {
    On,
    Off,
}

/// Entry point for the Metro Runners command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => GameConfig::default(),
    };

    let window = &config.window;
    let vsync = args
        .vsync
        .map_or(window.vsync, |mode| mode == VsyncMode::On);
    let tick_rate = args.tick_rate.unwrap_or(window.tick_rate);
    let sprites = args.sprites.clone().or_else(|| window.sprites.clone());
    let sounds = args.sounds.clone().or_else(|| window.sounds.clone());

    let world_config = config.world_config(args.seed);
    log::info!(
        "starting {GAME_TITLE} with seed {} at {tick_rate} ticks per second",
        world_config.rng_seed
    );
    let mut simulation = Simulation::new(
        world_config,
        config.spawning_config(args.seed),
        MonotonicClock::new(),
    );

    let viewport = Viewport::new(PLAY_WIDTH, PLAY_HEIGHT)?;
    let presentation = Presentation::new(GAME_TITLE, Color::BLACK, viewport, Scene::default())
        .with_music(SoundCue::Theme);
    let backend = MacroquadBackend::new()
        .with_vsync(vsync)
        .with_show_fps(args.show_fps || window.show_fps)
        .with_tick_rate(tick_rate)
        .with_sprite_manifest(sprites)
        .with_sound_manifest(sounds);

    backend.run(presentation, move |input, scene| simulation.step(&input, scene))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_parse_overrides() {
        let args = CliArgs::try_parse_from([
            "metro-runners",
            "--seed",
            "42",
            "--vsync",
            "off",
            "--tick-rate",
            "60",
            "--show-fps",
        ])
        .expect("arguments parse");

        assert_eq!(args.seed, Some(42));
        assert_eq!(args.vsync, Some(VsyncMode::Off));
        assert_eq!(args.tick_rate, Some(60));
        assert!(args.show_fps);
        assert!(args.sprites.is_none());
    }

    #[test]
    fn invalid_vsync_mode_is_rejected() {
        assert!(CliArgs::try_parse_from(["metro-runners", "--vsync", "maybe"]).is_err());
    }
}
