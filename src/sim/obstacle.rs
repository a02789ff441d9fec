//! Obstacle kinds and their per-frame behavior
//!
//! One closed enum covers every hazard in the river. Collision dispatch and
//! the registry pattern-match on the kind, so adding a hazard is a compile
//! error until every consumer handles it.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::config::ObstacleTuning;

use super::camera::ViewRect;
use super::collision::Aabb;
use super::hitbox::HitboxLibrary;
use super::path::PathField;

/// Bear walking pace along the bank (world units per tick).
const BEAR_WALK_SPEED: f32 = 1.845703125;
/// Bear pace once it has a target (matches the river scroll speed).
const BEAR_CHASE_SPEED: f32 = 7.5;
/// Distance from the bank edge to the bear's lane.
const BEAR_LANE_OFFSET: f32 = 80.0;
/// Ticks of wing flapping before a glide.
const BIRD_FLAP_TICKS: u32 = 60;
/// Ticks of gliding before flapping resumes.
const BIRD_GLIDE_TICKS: u32 = 90;

/// Which river bank a bear walks along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankSide {
    Left,
    Right,
}

/// Bird size class; drives scale, damage and speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BirdSize {
    Small,
    Medium,
    Large,
}

impl BirdSize {
    pub fn scale(self) -> f32 {
        match self {
            BirdSize::Small => 0.35,
            BirdSize::Medium => 0.5,
            BirdSize::Large => 0.65,
        }
    }

    /// Bigger birds hit harder and fly slower.
    pub fn speed_multiplier(self) -> f32 {
        match self {
            BirdSize::Small => 1.3,
            BirdSize::Medium => 1.0,
            BirdSize::Large => 0.8,
        }
    }

    pub fn damage(self, tuning: &ObstacleTuning) -> f32 {
        match self {
            BirdSize::Small => tuning.bird_damage_small,
            BirdSize::Medium => tuning.bird_damage_medium,
            BirdSize::Large => tuning.bird_damage_large,
        }
    }

    pub fn random(rng: &mut Pcg32) -> Self {
        match rng.random_range(0..3) {
            0 => BirdSize::Small,
            1 => BirdSize::Medium,
            _ => BirdSize::Large,
        }
    }
}

/// Per-kind behavior state.
#[derive(Debug, Clone, PartialEq)]
pub enum ObstacleKind {
    Bear {
        /// Lane side, resolved lazily against the path on first update
        side: Option<BankSide>,
        /// Latched once the player swims past; the bear never gives up after
        always_chase: bool,
        chasing: bool,
    },
    Bird {
        size: BirdSize,
        gliding: bool,
        anim_ticks: u32,
    },
    Stone,
    Net,
}

/// Read-only frame context handed to obstacle updates.
pub struct ObstacleCtx<'a> {
    pub player_pos: Vec2,
    pub path: &'a PathField,
    pub view: &'a ViewRect,
    /// Fixed horizontal extent of the playfield; bird flight bounces here,
    /// not at the river banks
    pub world_width: f32,
    pub dt: f32,
}

/// One live hazard in the river.
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ObstacleKind,
    pub scale: f32,
    pub frame: usize,
    pub alive: bool,
}

impl Obstacle {
    pub fn bear(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            kind: ObstacleKind::Bear {
                side: None,
                always_chase: false,
                chasing: false,
            },
            scale: 0.5,
            frame: 0,
            alive: true,
        }
    }

    pub fn bird(pos: Vec2, vel: Vec2, size: BirdSize) -> Self {
        Self {
            pos,
            vel,
            kind: ObstacleKind::Bird {
                size,
                gliding: false,
                anim_ticks: 0,
            },
            scale: size.scale(),
            frame: 0,
            alive: true,
        }
    }

    pub fn stone(pos: Vec2, rng: &mut Pcg32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            kind: ObstacleKind::Stone,
            scale: rng.random_range(0.3..0.7),
            frame: rng.random_range(0..6),
            alive: true,
        }
    }

    pub fn net(pos: Vec2, rng: &mut Pcg32) -> Self {
        Self {
            pos,
            // Nets ride the current downstream
            vel: Vec2::new(0.0, rng.random_range(1.5..2.5)),
            kind: ObstacleKind::Net,
            scale: 0.5,
            frame: 0,
            alive: true,
        }
    }

    /// Sheet key in the [`HitboxLibrary`].
    pub fn sheet_name(&self) -> &'static str {
        match self.kind {
            ObstacleKind::Bear { .. } => "bear",
            ObstacleKind::Bird { .. } => "bird",
            ObstacleKind::Stone => "stone",
            ObstacleKind::Net => "net",
        }
    }

    /// Current world-space collision box.
    pub fn aabb(&self, hitboxes: &HitboxLibrary) -> Aabb {
        match hitboxes.sheet(self.sheet_name()) {
            Ok(sheet) => sheet.aabb(self.frame, self.pos, self.scale),
            // Sheets are validated at spawn time; a library swapped out from
            // under a live obstacle still degrades instead of panicking.
            Err(_) => Aabb::from_center_size(
                self.pos,
                Vec2::splat(crate::consts::FALLBACK_HITBOX),
            ),
        }
    }

    pub fn damage(&self, tuning: &ObstacleTuning) -> f32 {
        match self.kind {
            ObstacleKind::Bear { .. } => tuning.bear_damage,
            ObstacleKind::Bird { size, .. } => size.damage(tuning),
            ObstacleKind::Stone => tuning.stone_damage,
            ObstacleKind::Net => tuning.net_damage,
        }
    }

    /// True when this obstacle updates even while outside the expanded view.
    pub fn updates_off_screen(&self) -> bool {
        matches!(
            self.kind,
            ObstacleKind::Bear {
                chasing: true,
                ..
            } | ObstacleKind::Bear {
                always_chase: true,
                ..
            }
        )
    }

    /// Advance one frame of behavior.
    pub fn update(&mut self, ctx: &ObstacleCtx) {
        match &mut self.kind {
            ObstacleKind::Bear {
                side,
                always_chase,
                chasing,
            } => {
                let sample = ctx.path.sample_at(self.pos.y);
                let side = *side.get_or_insert_with(|| {
                    if self.pos.x < sample.center() {
                        BankSide::Left
                    } else {
                        BankSide::Right
                    }
                });
                let lane_x = match side {
                    BankSide::Left => sample.left + BEAR_LANE_OFFSET,
                    BankSide::Right => sample.right - BEAR_LANE_OFFSET,
                };

                if ctx.player_pos.y < self.pos.y {
                    *always_chase = true;
                }
                let near = (ctx.player_pos.y - self.pos.y).abs() < ctx.view.height();
                *chasing = *always_chase || near;

                if *chasing {
                    let dir = crate::normalize_or_unit_x(ctx.player_pos - self.pos);
                    self.vel = dir * BEAR_CHASE_SPEED;
                } else {
                    // Patrol the lane, drifting slowly toward the player
                    let dx = (lane_x - self.pos.x).clamp(-BEAR_WALK_SPEED, BEAR_WALK_SPEED);
                    let dy = (ctx.player_pos.y - self.pos.y).signum() * BEAR_WALK_SPEED;
                    self.vel = Vec2::new(dx, dy);
                }
                self.pos += self.vel * ctx.dt;
            }
            ObstacleKind::Bird {
                size,
                gliding,
                anim_ticks,
            } => {
                // Bounce lateral drift off the playfield edges; birds fly
                // over the banks freely
                if (self.pos.x < 0.0 && self.vel.x < 0.0)
                    || (self.pos.x > ctx.world_width && self.vel.x > 0.0)
                {
                    self.vel.x = -self.vel.x;
                }
                self.pos += self.vel * size.speed_multiplier() * ctx.dt;

                *anim_ticks += 1;
                let period = if *gliding {
                    BIRD_GLIDE_TICKS
                } else {
                    BIRD_FLAP_TICKS
                };
                if *anim_ticks >= period {
                    *anim_ticks = 0;
                    *gliding = !*gliding;
                }
                self.frame = usize::from(*gliding);
            }
            ObstacleKind::Stone => {}
            ObstacleKind::Net => {
                self.pos += self.vel * ctx.dt;
            }
        }
    }
}
