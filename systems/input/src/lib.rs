#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Input system translating per-frame actions into world commands.
//!
//! Every ability passes through an input-side cooldown here before the world
//! player controller applies its own. Both gates must be open for an ability
//! to fire, so the longer one binds:
//!
//! | Ability | Input | Controller | Binding |
//! | --- | --- | --- | --- |
//! | Shoot | 1000 ms | 2 s burst reuse | controller |
//! | Dash | 1000 ms | 10 s, minus 1.5 s per upgrade | controller until the cooldown drops below 1 s |
//! | Slash | 2000 ms | 2 s | both, equal |
//! | Gravity switch | 3000 ms | none, two switches per boundary contact | input |

use std::time::Duration;

use metro_runners_core::{
    Ability, Command, Cooldown, GamePhase, InputAction, MAX_GRAVITY_SWITCHES, START_BUTTON,
};

/// Configuration parameters required to construct the input system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Minimum time between two gravity switch requests.
    pub gravity_cooldown: Duration,
    /// Minimum time between two shoot requests.
    pub shoot_cooldown: Duration,
    /// Minimum time between two dash requests.
    pub dash_cooldown: Duration,
    /// Minimum time between two slash requests.
    pub slash_cooldown: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gravity_cooldown: Duration::from_millis(3000),
            shoot_cooldown: Duration::from_millis(1000),
            dash_cooldown: Duration::from_millis(1000),
            slash_cooldown: Duration::from_millis(2000),
        }
    }
}

/// State of the world the input system reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputContext {
    /// Current game phase.
    pub phase: GamePhase,
    /// Gravity switches the player used since the last boundary contact.
    pub gravity_switches: u32,
}

/// Whether the main loop should keep running after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopControl {
    /// Keep stepping the simulation.
    Continue,
    /// Leave the main loop.
    Quit,
}

/// Pure system gating player input before it reaches the world.
#[derive(Debug)]
pub struct Input {
    gravity: Cooldown,
    shoot: Cooldown,
    dash: Cooldown,
    slash: Cooldown,
}

impl Input {
    /// Creates a new input system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            gravity: Cooldown::new(config.gravity_cooldown),
            shoot: Cooldown::new(config.shoot_cooldown),
            dash: Cooldown::new(config.dash_cooldown),
            slash: Cooldown::new(config.slash_cooldown),
        }
    }

    /// Consumes the actions collected during a frame and emits commands.
    pub fn handle(
        &mut self,
        actions: &[InputAction],
        now: Duration,
        context: InputContext,
        out: &mut Vec<Command>,
    ) -> LoopControl {
        let mut gravity_switches = context.gravity_switches;

        for action in actions {
            match *action {
                InputAction::Click { x, y } => {
                    if context.phase == GamePhase::Menu && START_BUTTON.contains_point(x, y) {
                        out.push(Command::StartRun);
                    }
                }
                InputAction::Restart => {
                    if matches!(context.phase, GamePhase::GameOver { .. }) {
                        out.push(Command::ReturnToMenu);
                    }
                }
                InputAction::Quit => {
                    if matches!(context.phase, GamePhase::GameOver { .. }) {
                        log::info!("quit requested");
                        return LoopControl::Quit;
                    }
                }
                InputAction::SwitchGravity => {
                    if context.phase.is_running()
                        && gravity_switches < MAX_GRAVITY_SWITCHES
                        && self.gravity.try_trigger(now)
                    {
                        gravity_switches += 1;
                        out.push(ability(Ability::SwitchGravity, now));
                    }
                }
                InputAction::Shoot => {
                    if context.phase.is_running() && self.shoot.try_trigger(now) {
                        out.push(ability(Ability::Shoot, now));
                    }
                }
                InputAction::Dash => {
                    if context.phase.is_running() && self.dash.try_trigger(now) {
                        out.push(ability(Ability::Dash, now));
                    }
                }
                InputAction::Slash => {
                    if context.phase.is_running() && self.slash.try_trigger(now) {
                        out.push(ability(Ability::Slash, now));
                    }
                }
            }
        }

        LoopControl::Continue
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn ability(ability: Ability, at: Duration) -> Command {
    Command::UseAbility { ability, at }
}
