//! Player movement, dash state machine, damage and invincibility
//!
//! This is the single canonical movement implementation; the frame tick
//! consumes it and nothing else integrates the player. Time is measured in
//! whole 60 Hz ticks of the world clock.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::config::Config;
use crate::ms_to_ticks;

use super::world::SimEvent;

/// Fraction of the remaining dash kept after the input is released early.
const DASH_RELEASE_FRACTION: f32 = 0.4;
/// Lateral steering authority during a back dash.
const BACK_DASH_STEER: f32 = 0.45;
/// Waterfall bounce-back phase lengths.
const BOUNCE_EASE_MS: u64 = 600;
const BOUNCE_PAUSE_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DashState {
    None,
    Forward { ends_at: u64 },
    Back { ends_at: u64 },
}

/// Eased knock-back after hitting a waterfall. Locks movement until it runs
/// out or a dash cancels it.
#[derive(Debug, Clone, Copy)]
struct Bounce {
    started_at: u64,
    initial_vy: f32,
}

/// Player inputs for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Lateral steer in [-1, 1]
    pub move_x: f32,
    pub dash_held: bool,
    pub back_dash_held: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: f32,
    dash: DashState,
    dash_ready_at: u64,
    back_dash_ready_at: u64,
    invincible_until: u64,
    bounce: Option<Bounce>,
}

impl Player {
    pub fn new(pos: Vec2, health: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            health,
            dash: DashState::None,
            dash_ready_at: 0,
            back_dash_ready_at: 0,
            invincible_until: 0,
            bounce: None,
        }
    }

    pub fn is_invincible(&self, now: u64) -> bool {
        now < self.invincible_until
    }

    /// True during a forward dash; stones, waterfalls and bears are skipped
    /// while jumping.
    pub fn is_jumping(&self) -> bool {
        matches!(self.dash, DashState::Forward { .. })
    }

    pub fn is_dashing(&self) -> bool {
        self.dash != DashState::None
    }

    pub fn is_bouncing(&self) -> bool {
        self.bounce.is_some()
    }

    /// Arm an invincibility window ending at least `ms` from `now`. Never
    /// shortens an existing window.
    pub fn grant_invincibility(&mut self, now: u64, ms: u64) {
        self.invincible_until = self.invincible_until.max(now + ms_to_ticks(ms));
    }

    /// Apply damage unless invincible. Arms the window, emits the hit event,
    /// and flips to game over at zero health.
    pub fn take_damage(
        &mut self,
        amount: f32,
        invuln_ms: u64,
        now: u64,
        events: &mut Vec<SimEvent>,
    ) {
        if self.is_invincible(now) {
            return;
        }
        self.health = (self.health - amount).max(0.0);
        self.grant_invincibility(now, invuln_ms);
        events.push(SimEvent::PlayerHit { damage: amount });
        if self.health <= 0.0 {
            events.push(SimEvent::GameOver);
        }
    }

    /// Knock the player back downstream after waterfall contact.
    pub fn start_bounce(&mut self, now: u64, rng: &mut Pcg32) {
        self.bounce = Some(Bounce {
            started_at: now,
            initial_vy: rng.random_range(9.0..11.0),
        });
        self.dash = DashState::None;
    }

    fn try_start_dash(
        &mut self,
        input: &PlayerInput,
        config: &Config,
        now: u64,
        events: &mut Vec<SimEvent>,
    ) {
        if self.dash != DashState::None {
            return;
        }
        if input.dash_held && now >= self.dash_ready_at {
            let ends_at = now + ms_to_ticks(config.dash.duration_ms);
            self.dash = DashState::Forward { ends_at };
            self.dash_ready_at = now + ms_to_ticks(config.dash.cooldown_ms);
            // A dash always wins over a waterfall lockout
            self.bounce = None;
            events.push(SimEvent::DashStarted { forward: true });
        } else if input.back_dash_held && now >= self.back_dash_ready_at {
            let ends_at = now + ms_to_ticks(config.back_dash.duration_ms);
            self.dash = DashState::Back { ends_at };
            self.back_dash_ready_at = now + ms_to_ticks(config.back_dash.cooldown_ms);
            self.bounce = None;
            events.push(SimEvent::DashStarted { forward: false });
        }
    }

    fn advance_dash(&mut self, input: &PlayerInput, now: u64) {
        match self.dash {
            DashState::Forward { ends_at } => {
                if now >= ends_at {
                    self.dash = DashState::None;
                } else if !input.dash_held {
                    // Early release keeps only a fraction of the remainder
                    let remaining = (ends_at - now) as f32 * DASH_RELEASE_FRACTION;
                    self.dash = DashState::Forward {
                        ends_at: now + remaining.ceil() as u64,
                    };
                }
            }
            DashState::Back { ends_at } => {
                if now >= ends_at {
                    self.dash = DashState::None;
                } else if !input.back_dash_held {
                    let remaining = (ends_at - now) as f32 * DASH_RELEASE_FRACTION;
                    self.dash = DashState::Back {
                        ends_at: now + remaining.ceil() as u64,
                    };
                }
            }
            DashState::None => {}
        }
    }

    /// Bounce velocity for this tick, or `None` once the bounce has expired.
    fn bounce_vy(&mut self, now: u64) -> Option<f32> {
        let b = self.bounce?;
        let elapsed = now.saturating_sub(b.started_at);
        let ease_ticks = ms_to_ticks(BOUNCE_EASE_MS);
        let total_ticks = ease_ticks + ms_to_ticks(BOUNCE_PAUSE_MS);
        if elapsed >= total_ticks {
            self.bounce = None;
            return None;
        }
        if elapsed >= ease_ticks {
            // Pause phase: held in place
            return Some(0.0);
        }
        let t = elapsed as f32 / ease_ticks as f32;
        let falloff = (1.0 - t) * (1.0 - t);
        Some(b.initial_vy * falloff)
    }

    /// One tick of movement. Order: dash start/advance, then velocity
    /// targets, then position integration.
    pub fn integrate(
        &mut self,
        input: &PlayerInput,
        config: &Config,
        now: u64,
        dt: f32,
        events: &mut Vec<SimEvent>,
    ) {
        self.try_start_dash(input, config, now, events);
        self.advance_dash(input, now);

        if let Some(vy) = self.bounce_vy(now) {
            // Lockout: the waterfall owns the player until it lets go
            self.vel = Vec2::new(0.0, vy);
            self.pos += self.vel * dt;
            return;
        }

        let steer = match self.dash {
            DashState::Back { .. } => input.move_x * BACK_DASH_STEER,
            _ => input.move_x,
        };
        if steer != 0.0 {
            let target = steer.clamp(-1.0, 1.0) * config.player_max_speed;
            self.vel.x += (target - self.vel.x) * config.player_acceleration * dt;
        } else {
            self.vel.x *= config.player_friction.powf(dt);
        }

        self.vel.y = match self.dash {
            DashState::Forward { .. } => -config.dash.speed,
            DashState::Back { .. } => config.back_dash.speed,
            DashState::None => -config.scroll_speed,
        };

        self.pos += self.vel * dt;
    }
}
