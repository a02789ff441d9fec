//! Per-frame collision resolution
//!
//! Runs after player integration. The bank boundary is a soft constraint:
//! push back inside and damp the outward velocity. Obstacle checks dispatch
//! by kind: stones resolve penetration along the minimum translation vector
//! and are consumed; everything else is a boolean overlap that damages the
//! player and survives. Forward dashes skip stones, waterfalls and bears but
//! never birds.

use glam::Vec2;
use rand_pcg::Pcg32;

use crate::config::Config;

use super::hitbox::HitboxLibrary;
use super::obstacle::ObstacleKind;
use super::particles::{ParticlePools, SplashOptions};
use super::path::PathSample;
use super::player::Player;
use super::registry::EntityRegistry;
use super::world::SimEvent;

/// Outward velocity retained after a bank push-back.
const BANK_DAMPING: f32 = 0.2;
/// Invincibility window after a stone hit, in milliseconds.
const STONE_INVULN_MS: u64 = 350;
/// Invincibility window after a predator hit, in milliseconds.
const PREDATOR_INVULN_MS: u64 = 1000;

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Minimum translation vector that moves `self` out of `other`: the
    /// smallest of the four directional overlaps, as a single-axis
    /// displacement. `None` when the boxes do not overlap.
    pub fn mtv(&self, other: &Aabb) -> Option<Vec2> {
        if !self.intersects(other) {
            return None;
        }
        let push_left = self.max.x - other.min.x;
        let push_right = other.max.x - self.min.x;
        let push_up = self.max.y - other.min.y;
        let push_down = other.max.y - self.min.y;

        let min = push_left.min(push_right).min(push_up).min(push_down);
        Some(if min == push_left {
            Vec2::new(-push_left, 0.0)
        } else if min == push_right {
            Vec2::new(push_right, 0.0)
        } else if min == push_up {
            Vec2::new(0.0, -push_up)
        } else {
            Vec2::new(0.0, push_down)
        })
    }
}

/// Player collision box for obstacle tests.
pub fn player_aabb(player: &Player, radius: f32) -> Aabb {
    Aabb::from_center_size(player.pos, Vec2::splat(radius * 2.0))
}

/// Soft bank constraint: clamp the player's horizontal extent inside the
/// corridor and keep only a fraction of the outward velocity.
pub fn resolve_bank_collision(player: &mut Player, sample: &PathSample, radius: f32) {
    let left_overlap = sample.left - (player.pos.x - radius);
    if left_overlap > 0.0 {
        player.pos.x += left_overlap;
        if player.vel.x < 0.0 {
            player.vel.x *= BANK_DAMPING;
        }
    }
    let right_overlap = (player.pos.x + radius) - sample.right;
    if right_overlap > 0.0 {
        player.pos.x -= right_overlap;
        if player.vel.x > 0.0 {
            player.vel.x *= BANK_DAMPING;
        }
    }
}

/// Waterfall line: while not dashing forward, its bottom edge blocks
/// upstream progress and knocks the player back downstream.
pub fn resolve_waterfall(
    player: &mut Player,
    line_y: f32,
    now: u64,
    rng: &mut Pcg32,
    events: &mut Vec<SimEvent>,
) {
    if player.is_jumping() || player.is_bouncing() {
        return;
    }
    if player.pos.y <= line_y {
        player.pos.y = line_y;
        player.start_bounce(now, rng);
        events.push(SimEvent::WaterfallBounce);
    }
}

/// Check the player against every live obstacle, dispatching resolution by
/// kind. Mutates the player (position, velocity, health) and kills consumed
/// stones in place; the registry sweeps the bodies during its cull pass.
#[allow(clippy::too_many_arguments)]
pub fn resolve_obstacle_collisions(
    player: &mut Player,
    registry: &mut EntityRegistry,
    hitboxes: &HitboxLibrary,
    pools: &mut ParticlePools,
    config: &Config,
    now: u64,
    rng: &mut Pcg32,
    events: &mut Vec<SimEvent>,
) {
    let tuning = &config.obstacles;
    for obstacle in registry.obstacles_mut() {
        if !obstacle.alive {
            continue;
        }
        let player_box = player_aabb(player, config.player_radius);
        let obstacle_box = obstacle.aabb(hitboxes);
        if !player_box.intersects(&obstacle_box) {
            continue;
        }

        match obstacle.kind {
            ObstacleKind::Stone => {
                if player.is_jumping() || player.is_invincible(now) {
                    continue;
                }
                if let Some(mtv) = player_box.mtv(&obstacle_box) {
                    player.pos += mtv;
                    if mtv.x != 0.0 {
                        player.vel.x = 0.0;
                    } else {
                        player.vel.y = 0.0;
                    }
                }
                player.take_damage(obstacle.damage(tuning), STONE_INVULN_MS, now, events);
                obstacle.alive = false;
                let at = obstacle_box.center();
                pools.emit_splash(at, SplashOptions::default(), rng);
                events.push(SimEvent::StoneShattered { pos: at });
            }
            ObstacleKind::Bear { .. } => {
                if player.is_dashing() || player.is_invincible(now) {
                    continue;
                }
                player.take_damage(obstacle.damage(tuning), PREDATOR_INVULN_MS, now, events);
                pools.emit_splash(player.pos, SplashOptions::default(), rng);
                events.push(SimEvent::Splash { pos: player.pos });
            }
            // Birds hit even mid-dash; nets take the same generic path
            ObstacleKind::Bird { .. } | ObstacleKind::Net => {
                if player.is_invincible(now) {
                    continue;
                }
                player.take_damage(obstacle.damage(tuning), PREDATOR_INVULN_MS, now, events);
                pools.emit_splash(player.pos, SplashOptions::default(), rng);
                events.push(SimEvent::Splash { pos: player.pos });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacle::{BirdSize, Obstacle};
    use crate::sim::player::PlayerInput;
    use rand::SeedableRng;

    fn world_bits() -> (Config, HitboxLibrary, ParticlePools, Pcg32, Vec<SimEvent>) {
        (
            Config::default(),
            HitboxLibrary::with_defaults(),
            ParticlePools::default(),
            Pcg32::seed_from_u64(9),
            Vec::new(),
        )
    }

    #[test]
    fn test_mtv_picks_smallest_axis() {
        let a = Aabb::from_center_size(Vec2::new(0.0, 0.0), Vec2::new(40.0, 40.0));
        // Overlapping mostly from the left: cheapest push is -x
        let b = Aabb::from_center_size(Vec2::new(35.0, 0.0), Vec2::new(40.0, 40.0));
        let mtv = a.mtv(&b).unwrap();
        assert_eq!(mtv, Vec2::new(-5.0, 0.0));
        // Shallow vertical overlap: cheapest push is -y
        let c = Aabb::from_center_size(Vec2::new(0.0, 38.0), Vec2::new(40.0, 40.0));
        let mtv = a.mtv(&c).unwrap();
        assert_eq!(mtv, Vec2::new(0.0, -2.0));
    }

    #[test]
    fn test_bank_pushback_is_exact_with_damped_velocity() {
        let sample = PathSample {
            left: 100.0,
            right: 600.0,
            curve: 0.0,
            width: 500.0,
        };
        let mut p = Player::new(Vec2::new(605.0, 0.0), 100.0);
        p.vel.x = 4.0;
        // Radius zero isolates the push-back arithmetic
        resolve_bank_collision(&mut p, &sample, 0.0);
        assert_eq!(p.pos.x, 600.0);
        assert!((p.vel.x - 0.8).abs() < 1e-6);

        let mut p = Player::new(Vec2::new(110.0, 0.0), 100.0);
        p.vel.x = -4.0;
        resolve_bank_collision(&mut p, &sample, 20.0);
        assert_eq!(p.pos.x, 120.0);
        assert!((p.vel.x - -0.8).abs() < 1e-6);
    }

    #[test]
    fn test_inward_velocity_is_untouched() {
        let sample = PathSample {
            left: 100.0,
            right: 600.0,
            curve: 0.0,
            width: 500.0,
        };
        let mut p = Player::new(Vec2::new(95.0, 0.0), 100.0);
        p.vel.x = 3.0;
        resolve_bank_collision(&mut p, &sample, 0.0);
        assert_eq!(p.pos.x, 100.0);
        assert_eq!(p.vel.x, 3.0);
    }

    #[test]
    fn test_stone_hit_leaves_zero_residual_overlap() {
        let (config, lib, mut pools, mut rng, mut events) = world_bits();
        let mut reg = EntityRegistry::new();
        let stone_pos = Vec2::new(500.0, 0.0);
        reg.spawn(Obstacle::stone(stone_pos, &mut rng), &lib, &config.obstacles)
            .unwrap();
        let stone_box = reg.obstacles()[0].aabb(&lib);

        let mut p = Player::new(stone_box.center() + Vec2::new(stone_box.size().x / 2.0, 0.0), 100.0);
        resolve_obstacle_collisions(
            &mut p, &mut reg, &lib, &mut pools, &config, 0, &mut rng, &mut events,
        );
        assert_eq!(p.health, 80.0);
        assert!(!reg.obstacles()[0].alive);
        assert!(!player_aabb(&p, config.player_radius).intersects(&stone_box));
        assert!(events
            .iter()
            .any(|e| matches!(e, SimEvent::StoneShattered { .. })));
    }

    #[test]
    fn test_jumping_skips_stones_and_bears_but_not_birds() {
        let (config, lib, mut pools, mut rng, mut events) = world_bits();
        let mut reg = EntityRegistry::new();
        let at = Vec2::new(500.0, 0.0);
        reg.spawn(Obstacle::stone(at, &mut rng), &lib, &config.obstacles)
            .unwrap();
        reg.spawn(Obstacle::bear(at), &lib, &config.obstacles).unwrap();
        reg.spawn(
            Obstacle::bird(at, Vec2::ZERO, BirdSize::Small),
            &lib,
            &config.obstacles,
        )
        .unwrap();

        let mut p = Player::new(at, 100.0);
        p.integrate(
            &PlayerInput {
                dash_held: true,
                ..PlayerInput::default()
            },
            &config,
            0,
            0.0,
            &mut events,
        );
        assert!(p.is_jumping());
        events.clear();

        resolve_obstacle_collisions(
            &mut p, &mut reg, &lib, &mut pools, &config, 0, &mut rng, &mut events,
        );
        // Only the small bird lands its 15 damage
        assert_eq!(p.health, 85.0);
        assert!(reg.obstacles().iter().all(|o| !matches!(o.kind, ObstacleKind::Stone) || o.alive));
    }

    #[test]
    fn test_predator_hits_do_not_destroy_the_predator() {
        let (config, lib, mut pools, mut rng, mut events) = world_bits();
        let mut reg = EntityRegistry::new();
        let at = Vec2::new(500.0, 0.0);
        reg.spawn(Obstacle::bear(at), &lib, &config.obstacles).unwrap();

        let mut p = Player::new(at, 100.0);
        resolve_obstacle_collisions(
            &mut p, &mut reg, &lib, &mut pools, &config, 0, &mut rng, &mut events,
        );
        assert_eq!(p.health, 70.0);
        assert!(reg.obstacles()[0].alive);
        // The invincibility window absorbs an immediate second contact
        resolve_obstacle_collisions(
            &mut p, &mut reg, &lib, &mut pools, &config, 1, &mut rng, &mut events,
        );
        assert_eq!(p.health, 70.0);
    }

    #[test]
    fn test_waterfall_bounce_triggers_once() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut events = Vec::new();
        let mut p = Player::new(Vec2::new(500.0, -105.0), 100.0);
        resolve_waterfall(&mut p, -100.0, 0, &mut rng, &mut events);
        assert_eq!(p.pos.y, -100.0);
        assert!(p.is_bouncing());
        resolve_waterfall(&mut p, -100.0, 1, &mut rng, &mut events);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_jumping_clears_the_waterfall() {
        let (config, _, _, mut rng, mut events) = world_bits();
        let mut p = Player::new(Vec2::new(500.0, -99.0), 100.0);
        p.integrate(
            &PlayerInput {
                dash_held: true,
                ..PlayerInput::default()
            },
            &config,
            0,
            1.0,
            &mut events,
        );
        resolve_waterfall(&mut p, -100.0, 0, &mut rng, &mut events);
        assert!(!p.is_bouncing());
        assert!(p.pos.y < -100.0);
    }
}
