#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Metro Runners.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature. Enable this crate's `audio` feature to play sound
//! cues instead of logging them.

mod audio;
mod sprites;

use anyhow::Result;
use macroquad::input::{
    is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton,
};
use metro_runners_core::InputAction;
use metro_runners_rendering::{
    Color, FrameInput, FrameOutcome, HealthBar, Presentation, RenderingBackend, Scene,
    SpriteKey, TextAnchor, TextLabel, Viewport,
};
use std::{
    path::PathBuf,
    sync::mpsc,
    time::{Duration, Instant},
};

use self::{audio::SoundBank, sprites::SpriteAtlas};

const DEFAULT_TICK_RATE: u32 = 30;
const HEALTH_BAR_BACKGROUND: Color = Color::new(0.15, 0.15, 0.15, 1.0);
const HEALTH_BAR_LABEL_SIZE: f32 = 18.0;

/// Keys mapped onto gameplay actions.
const KEY_BINDINGS: [(KeyCode, InputAction); 6] = [
    (KeyCode::Space, InputAction::SwitchGravity),
    (KeyCode::D, InputAction::Shoot),
    (KeyCode::E, InputAction::Dash),
    (KeyCode::F, InputAction::Slash),
    (KeyCode::Enter, InputAction::Restart),
    (KeyCode::Q, InputAction::Quit),
];

/// Collects the actions triggered since the previous frame.
fn gather_frame_input(viewport: Viewport) -> FrameInput {
    let mut actions: Vec<InputAction> = KEY_BINDINGS
        .iter()
        .filter(|(key, _)| is_key_pressed(*key))
        .map(|(_, action)| *action)
        .collect();

    if is_mouse_button_pressed(MouseButton::Left) {
        let (x, y) = mouse_position();
        let (x, y) = to_viewport_space(
            x,
            y,
            viewport,
            macroquad::window::screen_width(),
            macroquad::window::screen_height(),
        );
        actions.push(InputAction::Click { x, y });
    }

    FrameInput { actions }
}

/// Maps window coordinates onto the play area when the window was scaled.
fn to_viewport_space(
    x: f32,
    y: f32,
    viewport: Viewport,
    screen_width: f32,
    screen_height: f32,
) -> (f32, f32) {
    if screen_width <= f32::EPSILON || screen_height <= f32::EPSILON {
        return (x, y);
    }
    (
        x * viewport.width() / screen_width,
        y * viewport.height() / screen_height,
    )
}

/// Spaces ticks a fixed period apart by sleeping until a running deadline.
///
/// The deadline advances by one period per tick instead of restarting at the
/// start of each frame, so time spent waiting for vblank after the sleep is
/// absorbed by the next tick rather than added to it.
#[doc(hidden)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickPacer {
    period: Duration,
    deadline: Option<Instant>,
}

impl TickPacer {
    /// Creates a pacer for the provided rate; zero disables pacing.
    #[must_use]
    pub fn from_rate(ticks_per_second: u32) -> Option<Self> {
        (ticks_per_second > 0).then(|| Self {
            period: Duration::from_secs(1) / ticks_per_second,
            deadline: None,
        })
    }

    /// Length of a single tick.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Advances the deadline by one tick and returns how long to sleep at
    /// `now` to reach it.
    ///
    /// A pacer running more than a full period late restarts from `now`
    /// instead of rushing through the missed ticks.
    pub fn delay(&mut self, now: Instant) -> Duration {
        let deadline = self.deadline.unwrap_or(now) + self.period;
        if deadline + self.period < now {
            self.deadline = Some(now);
            return Duration::ZERO;
        }
        self.deadline = Some(deadline);
        deadline.saturating_duration_since(now)
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    tick_rate: u32,
    sprite_manifest: Option<PathBuf>,
    sound_manifest: Option<PathBuf>,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            tick_rate: DEFAULT_TICK_RATE,
            sprite_manifest: None,
            sound_manifest: None,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures how many times per second the scene is updated; zero runs
    /// unpaced.
    #[must_use]
    pub fn with_tick_rate(mut self, ticks_per_second: u32) -> Self {
        self.tick_rate = ticks_per_second;
        self
    }

    /// Loads sprite artwork from the manifest instead of drawing rectangles.
    #[must_use]
    pub fn with_sprite_manifest(mut self, path: Option<PathBuf>) -> Self {
        self.sprite_manifest = path;
        self
    }

    /// Loads sound cues from the manifest.
    #[must_use]
    pub fn with_sound_manifest(mut self, path: Option<PathBuf>) -> Self {
        self.sound_manifest = path;
        self
    }
}

/// Time spent in each stage of a frame.
#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    simulation: Duration,
    render: Duration,
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    simulation_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    avg_simulation: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a presented frame and returns averages once a second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.simulation_accum += breakdown.simulation;
        self.render_accum += breakdown.render;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames.max(1);
        let metrics = FpsMetrics {
            per_second: self.frames as f32 / seconds,
            avg_simulation: self.simulation_accum / frames,
            avg_render: self.render_accum / frames,
        };
        *self = Self::default();
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(FrameInput, &mut Scene) -> FrameOutcome + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            tick_rate,
            sprite_manifest,
            sound_manifest,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            viewport,
            music,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: viewport.width().round() as i32,
            window_height: viewport.height().round() as i32,
            window_resizable: false,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let mut pacer = TickPacer::from_rate(tick_rate);
        let (init_sender, init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;

            let sprite_atlas = match sprite_manifest {
                Some(path) => match SpriteAtlas::from_manifest_path(&path) {
                    Ok(atlas) => {
                        log::info!(
                            "sprite atlas loaded from {} ({} player frames)",
                            path.display(),
                            atlas.frame_count(SpriteKey::Player)
                        );
                        Some(atlas)
                    }
                    Err(error) => {
                        let _ = init_sender.send(Err(error));
                        return;
                    }
                },
                None => {
                    log::info!("no sprite manifest provided; drawing placeholders");
                    None
                }
            };

            let sounds = match sound_manifest {
                Some(path) => match SoundBank::from_manifest_path(&path).await {
                    Ok(bank) => bank,
                    Err(error) => {
                        let _ = init_sender.send(Err(error));
                        return;
                    }
                },
                None => SoundBank::default(),
            };

            let _ = init_sender.send(Ok(()));

            if let Some(cue) = music {
                sounds.play_looped(cue);
            }

            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut last_update = Instant::now();

            loop {
                let frame_start = Instant::now();
                let frame_input = gather_frame_input(viewport);
                let frame_dt = frame_start.duration_since(last_update);
                last_update = frame_start;

                let outcome = update_scene(frame_input, &mut scene);
                let simulation = frame_start.elapsed();
                if outcome == FrameOutcome::Exit {
                    log::info!("render loop exiting");
                    break;
                }

                let render_start = Instant::now();
                macroquad::window::clear_background(background);
                draw_scene(&scene, sprite_atlas.as_ref());
                for cue in &scene.sounds {
                    sounds.play(*cue);
                }
                let render = render_start.elapsed();

                if let Some(metrics) = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    simulation,
                    render,
                }) {
                    if show_fps {
                        log::info!(
                            "FPS: {:.2} | sim: {:>6.2}ms render: {:>6.2}ms",
                            metrics.per_second,
                            metrics.avg_simulation.as_secs_f64() * 1_000.0,
                            metrics.avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                if let Some(pacer) = pacer.as_mut() {
                    std::thread::sleep(pacer.delay(Instant::now()));
                }

                macroquad::window::next_frame().await;
            }
        });

        init_receiver.recv().unwrap_or_else(|_| Ok(()))?;

        Ok(())
    }
}

fn draw_scene(scene: &Scene, sprite_atlas: Option<&SpriteAtlas>) {
    for sprite in &scene.sprites {
        let drawn = sprite_atlas.map_or(false, |atlas| atlas.draw(sprite));
        if !drawn {
            sprites::draw_placeholder(sprite);
        }
    }

    for bar in &scene.health_bars {
        draw_health_bar(bar);
    }

    for label in &scene.texts {
        draw_label(label);
    }
}

fn draw_health_bar(bar: &HealthBar) {
    let x = bar.position.x;
    let y = bar.position.y;
    macroquad::shapes::draw_rectangle(
        x,
        y,
        HealthBar::WIDTH,
        HealthBar::HEIGHT,
        to_macroquad_color(HEALTH_BAR_BACKGROUND),
    );
    macroquad::shapes::draw_rectangle(
        x,
        y,
        bar.fill_width(),
        HealthBar::HEIGHT,
        to_macroquad_color(bar.fill),
    );
    macroquad::shapes::draw_rectangle_lines(
        x,
        y,
        HealthBar::WIDTH,
        HealthBar::HEIGHT,
        2.0,
        to_macroquad_color(Color::WHITE),
    );
    draw_label(&TextLabel {
        text: bar.label(),
        position: glam::Vec2::new(x + HealthBar::WIDTH / 2.0, y + HealthBar::HEIGHT / 2.0),
        font_size: HEALTH_BAR_LABEL_SIZE,
        color: Color::WHITE,
        anchor: TextAnchor::Center,
    });
}

fn draw_label(label: &TextLabel) {
    let font_size = label.font_size.max(1.0).round() as u16;
    let dimensions = macroquad::text::measure_text(&label.text, None, font_size, 1.0);
    let (x, y) = match label.anchor {
        TextAnchor::TopLeft => (label.position.x, label.position.y + dimensions.offset_y),
        TextAnchor::Center => (
            label.position.x - dimensions.width / 2.0,
            label.position.y - dimensions.height / 2.0 + dimensions.offset_y,
        ),
    };
    let _ = macroquad::text::draw_text(
        &label.text,
        x,
        y,
        f32::from(font_size),
        to_macroquad_color(label.color),
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
