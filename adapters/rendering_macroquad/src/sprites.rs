use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use macroquad::{
    math::Vec2 as MacroquadVec2,
    texture::{self, DrawTextureParams, Texture2D},
};
use metro_runners_rendering::{Color, Sprite, SpriteKey};

use crate::to_macroquad_color;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Animation frames loaded for every sprite key named in the manifest.
#[derive(Debug)]
pub(crate) struct SpriteAtlas {
    frames: HashMap<SpriteKey, Vec<Texture2D>>,
}

impl SpriteAtlas {
    /// Loads sprites from the manifest located at the provided path.
    pub(crate) fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Draws the sprite when artwork exists for it and reports whether it did.
    pub(crate) fn draw(&self, sprite: &Sprite) -> bool {
        let Some(texture) = self.frame(sprite.key, sprite.frame) else {
            return false;
        };

        let params = DrawTextureParams {
            dest_size: Some(MacroquadVec2::new(sprite.size.x, sprite.size.y)),
            flip_y: sprite.flip_vertical,
            ..DrawTextureParams::default()
        };
        texture::draw_texture_ex(
            texture,
            sprite.position.x,
            sprite.position.y,
            to_macroquad_color(sprite.tint),
            params,
        );
        true
    }

    /// Returns the texture for the frame, wrapping around the loaded frames.
    fn frame(&self, key: SpriteKey, frame: u32) -> Option<Texture2D> {
        let frames = self.frames.get(&key)?;
        if frames.is_empty() {
            return None;
        }
        frames.get(frame as usize % frames.len()).copied()
    }

    /// Number of frames loaded for the key.
    pub(crate) fn frame_count(&self, key: SpriteKey) -> usize {
        self.frames.get(&key).map_or(0, Vec::len)
    }

    fn from_manifest_with_loader(
        path: impl AsRef<Path>,
        mut loader: impl FnMut(SpriteKey, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read sprite manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let entries = parse_manifest(&contents, &base)?;
        Self::from_entries(entries, &mut loader)
    }

    fn from_entries(
        entries: Vec<(SpriteKey, Vec<PathBuf>)>,
        loader: &mut impl FnMut(SpriteKey, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let mut frames = HashMap::with_capacity(entries.len());
        for (key, paths) in entries {
            let mut textures = Vec::with_capacity(paths.len());
            for path in paths {
                let texture = loader(key, &path).with_context(|| {
                    format!("failed to load sprite {key:?} from {}", path.display())
                })?;
                textures.push(texture);
            }
            if frames.insert(key, textures).is_some() {
                bail!("duplicate sprite entry for {key:?}");
            }
        }
        Ok(Self { frames })
    }
}

fn default_loader(_key: SpriteKey, path: &Path) -> Result<Texture2D> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read sprite asset at {}", path.display()))?;
    Ok(Texture2D::from_file_with_format(&bytes, None))
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    sprites: HashMap<String, Vec<String>>,
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<(SpriteKey, Vec<PathBuf>)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse sprite manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sprite manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut resolved = HashMap::new();
    for (name, frames) in manifest.sprites {
        let key = SpriteKey::from_name(&name)
            .with_context(|| format!("unknown sprite key `{name}` in manifest"))?;
        if frames.is_empty() {
            bail!("sprite `{name}` lists no frames");
        }
        let paths = frames.iter().map(|frame| base_path.join(frame)).collect();
        let _ = resolved.insert(key, paths);
    }

    let mut ordered = Vec::with_capacity(SpriteKey::ALL.len());
    for key in SpriteKey::ALL {
        let Some(paths) = resolved.remove(&key) else {
            bail!("sprite manifest missing entry for `{}`", key.name());
        };
        ordered.push((key, paths));
    }

    Ok(ordered)
}

/// Draws a solid rectangle in place of missing artwork.
pub(crate) fn draw_placeholder(sprite: &Sprite) {
    let base = sprite.key.fallback_color();
    let color = Color::new(
        base.red * sprite.tint.red,
        base.green * sprite.tint.green,
        base.blue * sprite.tint.blue,
        base.alpha * sprite.tint.alpha,
    );
    macroquad::shapes::draw_rectangle(
        sprite.position.x,
        sprite.position.y,
        sprite.size.x,
        sprite.size.y,
        to_macroquad_color(color),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn full_manifest(extra: &str) -> String {
        let mut manifest = String::from("version = 1\n\n[sprites]\n");
        for key in SpriteKey::ALL {
            manifest.push_str(&format!("{} = [\"{}/1.png\", \"{}/2.png\"]\n", key.name(), key.name(), key.name()));
        }
        manifest.push_str(extra);
        manifest
    }

    #[test]
    fn parse_manifest_requires_all_known_keys() {
        let manifest = r#"
            version = 1

            [sprites]
            player = ["player/1.png"]
        "#;

        let result = parse_manifest(manifest, Path::new("assets"));
        assert!(result.is_err(), "manifest missing most keys should fail");
    }

    #[test]
    fn manifest_rejects_unknown_keys() {
        let manifest = full_manifest("bug = [\"bug.png\"]\n");
        let result = parse_manifest(&manifest, Path::new("assets"));
        assert!(result.is_err(), "unknown keys must be rejected");
    }

    #[test]
    fn manifest_rejects_unsupported_versions() {
        let manifest = full_manifest("").replace("version = 1", "version = 2");
        assert!(parse_manifest(&manifest, Path::new("assets")).is_err());
    }

    #[test]
    fn manifest_resolves_frames_relative_to_base_directory() {
        let parsed =
            parse_manifest(&full_manifest(""), Path::new("root")).expect("manifest should parse");
        let (key, frames) = &parsed[0];
        assert_eq!(*key, SpriteKey::Player);
        assert_eq!(
            frames,
            &vec![
                PathBuf::from("root/player/1.png"),
                PathBuf::from("root/player/2.png"),
            ]
        );
    }

    #[test]
    fn atlas_loads_every_frame_in_canonical_order() {
        let entries = parse_manifest(&full_manifest(""), Path::new("assets"))
            .expect("manifest should parse into canonical order");
        let load_order = RefCell::new(Vec::new());
        let atlas = SpriteAtlas::from_entries(entries, &mut |key, _| {
            load_order.borrow_mut().push(key);
            Ok(Texture2D::empty())
        })
        .expect("atlas should load using provided loader");

        let expected: Vec<SpriteKey> = SpriteKey::ALL
            .into_iter()
            .flat_map(|key| [key, key])
            .collect();
        assert_eq!(load_order.into_inner(), expected);
        assert_eq!(atlas.frame_count(SpriteKey::Boss), 2);
        assert!(atlas.frame(SpriteKey::Boss, 7).is_some());
    }
}
