//! Translates world state and events into the backend draw list.

use std::time::Duration;

use glam::Vec2;
use metro_runners_core::{
    BackgroundSnapshot, BackgroundVariant, DamageCause, Event, GamePhase, GravityDirection, Rect,
    RunOutcome, UpgradeKind, PLAY_HEIGHT, PLAY_WIDTH, START_BUTTON,
};
use metro_runners_rendering::{
    Color, Scene, SoundCue, Sprite, SpriteKey, TextAnchor, TextLabel,
};
use metro_runners_world::{query, World};

const LOGO: Rect = Rect::new(300.0, 10.0, 300.0, 300.0);
const INSTRUCTIONS: Rect = Rect::new(630.0, 120.0, 250.0, 250.0);
const PLAYER_HEALTH_POSITION: Vec2 = Vec2::new(650.0, 20.0);
const BOSS_HEALTH_POSITION: Vec2 = Vec2::new(650.0, 40.0);
const PLAYER_HEALTH_FILL: Color = Color::from_rgb_u8(124, 252, 0);
const BOSS_HEALTH_FILL: Color = Color::from_rgb_u8(138, 43, 226);
const HUD_FONT_SIZE: f32 = 30.0;
const BANNER_FONT_SIZE: f32 = 48.0;
const GEM_ICON: Rect = Rect::new(10.0, 50.0, 25.0, 25.0);

/// Refills `scene` for the current phase and queues sounds for `events`.
pub(crate) fn populate(world: &World, now: Duration, events: &[Event], scene: &mut Scene) {
    scene.clear();

    match query::phase(world) {
        GamePhase::Menu => draw_menu(world, scene),
        GamePhase::Active | GamePhase::BossActive => draw_run(world, now, scene),
        GamePhase::GameOver { outcome } => draw_game_over(outcome, scene),
    }

    for event in events {
        queue_sounds(event, scene);
    }
}

fn draw_menu(world: &World, scene: &mut Scene) {
    draw_background(query::menu_background(world), SpriteKey::MenuBackground, scene);
    scene.draw_sprite(sprite_at(SpriteKey::Logo, 0, LOGO));
    scene.draw_sprite(sprite_at(SpriteKey::Instructions, 0, INSTRUCTIONS));
    scene.draw_sprite(sprite_at(SpriteKey::StartButton, 0, START_BUTTON));
}

fn draw_run(world: &World, now: Duration, scene: &mut Scene) {
    let lane = query::lane_background(world);
    let key = match lane.variant {
        BackgroundVariant::Normal => SpriteKey::LaneBackground,
        BackgroundVariant::Boss => SpriteKey::BossBackground,
    };
    draw_background(lane, key, scene);

    for obstacle in query::obstacles(world) {
        scene.draw_sprite(sprite_at(SpriteKey::Obstacle, obstacle.frame, obstacle.rect));
    }
    for gem in query::gems(world) {
        scene.draw_sprite(sprite_at(SpriteKey::Gem, gem.frame, gem.rect));
    }
    for projectile in query::projectiles(world) {
        scene.draw_sprite(sprite_at(
            SpriteKey::Projectile,
            projectile.frame,
            projectile.rect,
        ));
    }

    let player = query::player(world);
    scene.draw_sprite(
        sprite_at(SpriteKey::Player, player.frame, player.rect)
            .flipped(player.gravity == GravityDirection::Up),
    );
    if let Some(sword) = query::sword(world) {
        scene.draw_sprite(sprite_at(SpriteKey::Sword, sword.frame, sword.rect).flipped(sword.flipped));
    }

    scene.draw_health_bar(PLAYER_HEALTH_POSITION, player.health, PLAYER_HEALTH_FILL);
    if let Some(boss) = query::boss(world) {
        scene.draw_sprite(sprite_at(SpriteKey::Boss, boss.frame, boss.rect));
        scene.draw_health_bar(BOSS_HEALTH_POSITION, boss.health, BOSS_HEALTH_FILL);
    }

    draw_hud(world, now, scene);
}

fn draw_hud(world: &World, now: Duration, scene: &mut Scene) {
    let progress = query::progress(world);
    scene.draw_text(label(
        format!("Score: {}", progress.score),
        Vec2::new(10.0, 10.0),
        HUD_FONT_SIZE,
        TextAnchor::TopLeft,
    ));
    scene.draw_sprite(sprite_at(SpriteKey::GemIcon, 0, GEM_ICON));
    scene.draw_text(label(
        format!("x{}", progress.gems),
        Vec2::new(GEM_ICON.right() + 5.0, GEM_ICON.top()),
        HUD_FONT_SIZE,
        TextAnchor::TopLeft,
    ));

    // Icons are anchored by their bottom-right corner.
    let readiness = query::cooldown_readiness(world, now);
    let icons = [
        (SpriteKey::ShootIcon, 50.0, PLAY_WIDTH - 100.0, PLAY_HEIGHT - 10.0, readiness.shoot),
        (SpriteKey::DashIcon, 50.0, PLAY_WIDTH - 30.0, PLAY_HEIGHT - 10.0, readiness.dash),
        (SpriteKey::SlashIcon, 75.0, PLAY_WIDTH - 140.0, PLAY_HEIGHT - 4.0, readiness.slash),
    ];
    for (key, size, right, bottom, ready) in icons {
        let rect = Rect::new(right - size, bottom - size, size, size);
        scene.draw_sprite(sprite_at(key, 0, rect).tinted(Color::WHITE.dimmed(ready)));
    }
}

fn draw_game_over(outcome: RunOutcome, scene: &mut Scene) {
    let headline = match outcome {
        RunOutcome::Defeat => "You lost!",
        RunOutcome::Victory => "CONGRATS! YOU WON!",
    };
    let center = Vec2::new(PLAY_WIDTH / 2.0, PLAY_HEIGHT / 2.0);
    scene.draw_text(label(
        headline.to_owned(),
        center - Vec2::new(0.0, 60.0),
        BANNER_FONT_SIZE,
        TextAnchor::Center,
    ));
    scene.draw_text(label(
        "Press RETURN to play again".to_owned(),
        center,
        HUD_FONT_SIZE,
        TextAnchor::Center,
    ));
    scene.draw_text(label(
        "Press Q to quit".to_owned(),
        center + Vec2::new(0.0, 40.0),
        HUD_FONT_SIZE,
        TextAnchor::Center,
    ));
}

/// Draws the strip twice so the wrap point never shows a gap.
fn draw_background(background: BackgroundSnapshot, key: SpriteKey, scene: &mut Scene) {
    let size = Vec2::new(background.width, PLAY_HEIGHT);
    for offset in [0.0, background.width] {
        scene.draw_sprite(Sprite::new(
            key,
            0,
            Vec2::new(background.left + offset, 0.0),
            size,
        ));
    }
}

fn queue_sounds(event: &Event, scene: &mut Scene) {
    match event {
        Event::PlayerDamaged {
            cause: DamageCause::Obstacle,
            ..
        } => scene.play_sound(SoundCue::PlayerHit),
        Event::ObstacleDestroyed { .. } => scene.play_sound(SoundCue::ObstacleDestroyed),
        Event::GemCollected { .. } => scene.play_sound(SoundCue::GemCollected),
        Event::UpgradeApplied { kind, .. } => match kind {
            UpgradeKind::Projectile => {
                scene.play_sound(SoundCue::Upgrade);
                scene.play_sound(SoundCue::ProjectileUpgrade);
            }
            UpgradeKind::Sword => {
                scene.play_sound(SoundCue::Upgrade);
                scene.play_sound(SoundCue::SwordUpgrade);
            }
            UpgradeKind::Dash => scene.play_sound(SoundCue::DashUpgrade),
        },
        Event::BossDamaged { .. } => scene.play_sound(SoundCue::BossHit),
        Event::RunEnded { outcome, .. } => scene.play_sound(match outcome {
            RunOutcome::Victory => SoundCue::Victory,
            RunOutcome::Defeat => SoundCue::Death,
        }),
        Event::BurstStarted { .. } => scene.play_sound(SoundCue::Shoot),
        Event::Dashed { .. } => scene.play_sound(SoundCue::Dash),
        Event::SlashStarted => scene.play_sound(SoundCue::Slash),
        _ => {}
    }
}

fn sprite_at(key: SpriteKey, frame: u32, rect: Rect) -> Sprite {
    Sprite::new(
        key,
        frame,
        Vec2::new(rect.left(), rect.top()),
        Vec2::new(rect.width(), rect.height()),
    )
}

fn label(text: String, position: Vec2, font_size: f32, anchor: TextAnchor) -> TextLabel {
    TextLabel {
        text,
        position,
        font_size,
        color: Color::WHITE,
        anchor,
    }
}
