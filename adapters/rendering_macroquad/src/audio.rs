//! Sound cue playback.
//!
//! Playback needs macroquad's `audio` feature, which pulls in native audio
//! libraries. Without it every cue is only logged.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use metro_runners_rendering::SoundCue;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Default)]
pub(crate) struct SoundBank {
    #[cfg(feature = "audio")]
    sounds: HashMap<SoundCue, macroquad::audio::Sound>,
}

impl SoundBank {
    /// Loads every sound listed in the manifest.
    #[cfg(feature = "audio")]
    pub(crate) async fn from_manifest_path(path: &Path) -> Result<Self> {
        let entries = read_manifest(path)?;
        let mut sounds = HashMap::with_capacity(entries.len());
        for (cue, file) in entries {
            let bytes = fs::read(&file)
                .with_context(|| format!("failed to read sound asset at {}", file.display()))?;
            let sound = macroquad::audio::load_sound_from_bytes(&bytes)
                .await
                .map_err(|error| anyhow::anyhow!("{error:?}"))
                .with_context(|| format!("failed to decode sound {cue:?} from {}", file.display()))?;
            let _ = sounds.insert(cue, sound);
        }
        log::info!("loaded {} sound cues", sounds.len());
        Ok(Self { sounds })
    }

    /// Validates the manifest; cues stay silent because audio support is off.
    #[cfg(not(feature = "audio"))]
    pub(crate) async fn from_manifest_path(path: &Path) -> Result<Self> {
        let entries = read_manifest(path)?;
        log::warn!(
            "audio support is disabled; {} sound cues will only be logged",
            entries.len()
        );
        Ok(Self::default())
    }

    pub(crate) fn play(&self, cue: SoundCue) {
        #[cfg(feature = "audio")]
        if let Some(sound) = self.sounds.get(&cue) {
            macroquad::audio::play_sound_once(*sound);
            return;
        }
        log::debug!("sound cue {cue:?}");
    }

    pub(crate) fn play_looped(&self, cue: SoundCue) {
        #[cfg(feature = "audio")]
        if let Some(sound) = self.sounds.get(&cue) {
            macroquad::audio::play_sound(
                *sound,
                macroquad::audio::PlaySoundParams {
                    looped: true,
                    volume: 1.0,
                },
            );
            return;
        }
        log::debug!("looping sound cue {cue:?}");
    }
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    sounds: HashMap<String, String>,
}

fn read_manifest(path: &Path) -> Result<Vec<(SoundCue, PathBuf)>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read sound manifest at {}", path.display()))?;
    let base = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    parse_manifest(&contents, &base)
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<(SoundCue, PathBuf)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse sound manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sound manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut entries = Vec::with_capacity(manifest.sounds.len());
    for (name, file) in manifest.sounds {
        let cue = SoundCue::from_name(&name)
            .with_context(|| format!("unknown sound cue `{name}` in manifest"))?;
        entries.push((cue, base_path.join(file)));
    }
    entries.sort_by_key(|(cue, _)| *cue);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_manifest_is_accepted_in_cue_order() {
        let manifest = r#"
            version = 1

            [sounds]
            victory = "win.wav"
            theme = "music.ogg"
        "#;

        let entries = parse_manifest(manifest, Path::new("audio")).expect("manifest should parse");
        assert_eq!(
            entries,
            vec![
                (SoundCue::Theme, PathBuf::from("audio/music.ogg")),
                (SoundCue::Victory, PathBuf::from("audio/win.wav")),
            ]
        );
    }

    #[test]
    fn unknown_cues_are_rejected() {
        let manifest = r#"
            version = 1

            [sounds]
            explosion = "boom.wav"
        "#;
        assert!(parse_manifest(manifest, Path::new(".")).is_err());
    }
}
