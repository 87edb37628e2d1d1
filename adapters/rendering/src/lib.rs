#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Metro Runners adapters.
//!
//! The simulation fills a [`Scene`] draw list every tick and a
//! [`RenderingBackend`] turns it into pixels and sounds. Nothing flows back from
//! the backend into the simulation apart from the [`FrameInput`] it collects.

use anyhow::Result as AnyResult;
use glam::Vec2;
use metro_runners_core::InputAction;
use std::{error::Error, fmt};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color darkened towards black, keeping `brightness` of
    /// each channel.
    #[must_use]
    pub fn dimmed(self, brightness: f32) -> Self {
        let brightness = brightness.clamp(0.0, 1.0);

        Self {
            red: self.red * brightness,
            green: self.green * brightness,
            blue: self.blue * brightness,
            alpha: self.alpha,
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Actions triggered since the previous frame, in the order they occurred.
    pub actions: Vec<InputAction>,
}

/// Artwork identifiers understood by every backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpriteKey {
    /// Running player animation.
    Player,
    /// Lane obstacle.
    Obstacle,
    /// Collectible gem; the frame selects the variant.
    Gem,
    /// Projectile animation.
    Projectile,
    /// Sword swing animation.
    Sword,
    /// Boss animation.
    Boss,
    /// Regular lane background.
    LaneBackground,
    /// Lane background while the boss is present.
    BossBackground,
    /// Background scrolling behind the menu.
    MenuBackground,
    /// Title logo on the menu.
    Logo,
    /// Menu start button.
    StartButton,
    /// Control instructions on the menu.
    Instructions,
    /// Gem counter icon in the HUD.
    GemIcon,
    /// Shoot cooldown icon in the HUD.
    ShootIcon,
    /// Dash cooldown icon in the HUD.
    DashIcon,
    /// Slash cooldown icon in the HUD.
    SlashIcon,
}

impl SpriteKey {
    /// Every sprite key in drawing-priority order.
    pub const ALL: [SpriteKey; 16] = [
        Self::Player,
        Self::Obstacle,
        Self::Gem,
        Self::Projectile,
        Self::Sword,
        Self::Boss,
        Self::LaneBackground,
        Self::BossBackground,
        Self::MenuBackground,
        Self::Logo,
        Self::StartButton,
        Self::Instructions,
        Self::GemIcon,
        Self::ShootIcon,
        Self::DashIcon,
        Self::SlashIcon,
    ];

    /// Identifier used for the sprite in manifests.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Obstacle => "obstacle",
            Self::Gem => "gem",
            Self::Projectile => "projectile",
            Self::Sword => "sword",
            Self::Boss => "boss",
            Self::LaneBackground => "lane_background",
            Self::BossBackground => "boss_background",
            Self::MenuBackground => "menu_background",
            Self::Logo => "logo",
            Self::StartButton => "start_button",
            Self::Instructions => "instructions",
            Self::GemIcon => "gem_icon",
            Self::ShootIcon => "shoot_icon",
            Self::DashIcon => "dash_icon",
            Self::SlashIcon => "slash_icon",
        }
    }

    /// Looks up a sprite key by its manifest identifier.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }

    /// Solid color drawn when no artwork is loaded for the sprite.
    #[must_use]
    pub const fn fallback_color(self) -> Color {
        match self {
            Self::Player => Color::from_rgb_u8(0x29, 0x80, 0xb9),
            Self::Obstacle => Color::from_rgb_u8(0xc0, 0x39, 0x2b),
            Self::Gem | Self::GemIcon => Color::from_rgb_u8(0x1a, 0xbc, 0x9c),
            Self::Projectile | Self::ShootIcon => Color::from_rgb_u8(0xbd, 0xc3, 0xc7),
            Self::Sword | Self::SlashIcon => Color::from_rgb_u8(0xf1, 0xc4, 0x0f),
            Self::Boss => Color::from_rgb_u8(0x8e, 0x44, 0xad),
            Self::LaneBackground => Color::from_rgb_u8(0x2c, 0x3e, 0x50),
            Self::BossBackground => Color::from_rgb_u8(0x4a, 0x23, 0x5a),
            Self::MenuBackground => Color::from_rgb_u8(0x34, 0x49, 0x5e),
            Self::Logo => Color::from_rgb_u8(0xe6, 0x7e, 0x22),
            Self::StartButton => Color::from_rgb_u8(0x27, 0xae, 0x60),
            Self::Instructions => Color::from_rgb_u8(0x7f, 0x8c, 0x8d),
            Self::DashIcon => Color::from_rgb_u8(0x34, 0x98, 0xdb),
        }
    }
}

/// Sound effects and music understood by every backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SoundCue {
    /// Looping background music.
    Theme,
    /// The player died.
    Death,
    /// An obstacle was destroyed.
    ObstacleDestroyed,
    /// The player ran into an obstacle.
    PlayerHit,
    /// A gem was collected.
    GemCollected,
    /// The boss was defeated.
    Victory,
    /// The boss was hit.
    BossHit,
    /// An upgrade phase completed.
    Upgrade,
    /// The projectile upgrade was granted.
    ProjectileUpgrade,
    /// The sword upgrade was granted.
    SwordUpgrade,
    /// The dash upgrade was granted.
    DashUpgrade,
    /// A sword swing started.
    Slash,
    /// The player dashed.
    Dash,
    /// A projectile burst started.
    Shoot,
}

impl SoundCue {
    /// Every sound cue.
    pub const ALL: [SoundCue; 14] = [
        Self::Theme,
        Self::Death,
        Self::ObstacleDestroyed,
        Self::PlayerHit,
        Self::GemCollected,
        Self::Victory,
        Self::BossHit,
        Self::Upgrade,
        Self::ProjectileUpgrade,
        Self::SwordUpgrade,
        Self::DashUpgrade,
        Self::Slash,
        Self::Dash,
        Self::Shoot,
    ];

    /// Identifier used for the cue in manifests.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Theme => "theme",
            Self::Death => "death",
            Self::ObstacleDestroyed => "obstacle_destroyed",
            Self::PlayerHit => "player_hit",
            Self::GemCollected => "gem_collected",
            Self::Victory => "victory",
            Self::BossHit => "boss_hit",
            Self::Upgrade => "upgrade",
            Self::ProjectileUpgrade => "projectile_upgrade",
            Self::SwordUpgrade => "sword_upgrade",
            Self::DashUpgrade => "dash_upgrade",
            Self::Slash => "slash",
            Self::Dash => "dash",
            Self::Shoot => "shoot",
        }
    }

    /// Looks up a cue by its manifest identifier.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cue| cue.name() == name)
    }
}

/// Positioned instance of a sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    /// Artwork to draw.
    pub key: SpriteKey,
    /// Animation frame; backends wrap it around the available frames.
    pub frame: u32,
    /// Top-left corner in screen units.
    pub position: Vec2,
    /// Drawn size in screen units.
    pub size: Vec2,
    /// Whether the artwork is mirrored vertically.
    pub flip_vertical: bool,
    /// Multiplicative tint; white leaves the artwork unchanged.
    pub tint: Color,
}

impl Sprite {
    /// Creates an untinted, unflipped sprite instance.
    #[must_use]
    pub const fn new(key: SpriteKey, frame: u32, position: Vec2, size: Vec2) -> Self {
        Self {
            key,
            frame,
            position,
            size,
            flip_vertical: false,
            tint: Color::WHITE,
        }
    }

    /// Mirrors the sprite vertically when `flipped` is set.
    #[must_use]
    pub fn flipped(mut self, flipped: bool) -> Self {
        self.flip_vertical = flipped;
        self
    }

    /// Multiplies the artwork by the provided tint.
    #[must_use]
    pub fn tinted(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }
}

/// Horizontal health gauge with a percentage label.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealthBar {
    /// Top-left corner of the gauge.
    pub position: Vec2,
    /// Health shown by the gauge, out of 100.
    pub health: i32,
    /// Color of the filled portion.
    pub fill: Color,
}

impl HealthBar {
    /// Width of the gauge.
    pub const WIDTH: f32 = 200.0;

    /// Height of the gauge.
    pub const HEIGHT: f32 = 20.0;

    /// Width of the filled portion; negative health draws an empty gauge.
    #[must_use]
    pub fn fill_width(&self) -> f32 {
        (self.health.clamp(0, 100) as f32 / 100.0) * Self::WIDTH
    }

    /// Text drawn over the gauge.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}%", self.health)
    }
}

/// Point a text label is positioned by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    /// The position is the top-left corner of the text.
    TopLeft,
    /// The position is the centre of the text.
    Center,
}

/// Text drawn on top of the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLabel {
    /// Text content.
    pub text: String,
    /// Anchor point in screen units.
    pub position: Vec2,
    /// Font size in screen units.
    pub font_size: f32,
    /// Text color.
    pub color: Color,
    /// How `position` relates to the text.
    pub anchor: TextAnchor,
}

/// Draw list and sound queue produced for a single frame.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Scene {
    /// Sprites in back-to-front order.
    pub sprites: Vec<Sprite>,
    /// Health gauges drawn over the sprites.
    pub health_bars: Vec<HealthBar>,
    /// Text drawn over everything else.
    pub texts: Vec<TextLabel>,
    /// Sounds to start this frame.
    pub sounds: Vec<SoundCue>,
}

impl Scene {
    /// Removes every queued item so the scene can be refilled.
    pub fn clear(&mut self) {
        self.sprites.clear();
        self.health_bars.clear();
        self.texts.clear();
        self.sounds.clear();
    }

    /// Queues a sprite.
    pub fn draw_sprite(&mut self, sprite: Sprite) {
        self.sprites.push(sprite);
    }

    /// Queues a health gauge.
    pub fn draw_health_bar(&mut self, position: Vec2, health: i32, fill: Color) {
        self.health_bars.push(HealthBar {
            position,
            health,
            fill,
        });
    }

    /// Queues a text label.
    pub fn draw_text(&mut self, label: TextLabel) {
        self.texts.push(label);
    }

    /// Queues a sound.
    pub fn play_sound(&mut self, cue: SoundCue) {
        self.sounds.push(cue);
    }
}

/// Size of the drawable area in screen units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
}

impl Viewport {
    /// Creates a viewport, rejecting empty or non-finite sizes.
    pub fn new(width: f32, height: f32) -> Result<Self, RenderingError> {
        let valid = |value: f32| value.is_finite() && value > 0.0;
        if !valid(width) || !valid(height) {
            return Err(RenderingError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }

    /// Horizontal size of the viewport.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical size of the viewport.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Size of the play area.
    pub viewport: Viewport,
    /// Music looped for the lifetime of the window.
    pub music: Option<SoundCue>,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, viewport: Viewport, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            viewport,
            music: None,
            scene,
        }
    }

    /// Loops the provided cue as background music.
    #[must_use]
    pub fn with_music(mut self, cue: SoundCue) -> Self {
        self.music = Some(cue);
        self
    }
}

/// Whether a backend should keep presenting frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Present the next frame.
    Continue,
    /// Close the window and return from [`RenderingBackend::run`].
    Exit,
}

/// Rendering backend capable of presenting Metro Runners scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure is called once per fixed tick with
    /// the input captured by the adapter. It refills the scene before it is
    /// rendered and decides whether the loop continues.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut Scene) -> FrameOutcome + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Viewport dimensions must be positive and finite.
    InvalidViewport {
        /// Provided width.
        width: f32,
        /// Provided height.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidViewport { width, height } => {
                write!(
                    f,
                    "viewport must have a positive finite size (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
