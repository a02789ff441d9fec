//! Bounded collection of live obstacles
//!
//! The registry exclusively owns obstacle lifetimes. Spawns are capped per
//! kind and validated against the hitbox library up front; updates are gated
//! on an expanded view rectangle; culling removes obstacles that have fully
//! left the relevant window and keeps the per-kind counts honest.

use glam::Vec2;

use crate::config::ObstacleTuning;

use super::camera::ViewRect;
use super::hitbox::{HitboxError, HitboxLibrary};
use super::obstacle::{Obstacle, ObstacleCtx, ObstacleKind};
use super::path::PathField;
use super::world::SimEvent;

/// Margin past the view edge before an obstacle is considered gone.
const CULL_MARGIN: f32 = 40.0;
/// Score awarded for outrunning or outlasting an obstacle.
const CULL_SCORE: u32 = 10;

#[derive(Debug, Default)]
pub struct EntityRegistry {
    obstacles: Vec<Obstacle>,
    bear_count: usize,
    bird_count: usize,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bear_count(&self) -> usize {
        self.bear_count
    }

    pub fn bird_count(&self) -> usize {
        self.bird_count
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub(crate) fn obstacles_mut(&mut self) -> &mut [Obstacle] {
        &mut self.obstacles
    }

    /// Add an obstacle. Returns `Ok(None)` when the kind is at cap (a normal,
    /// silent condition); errors only when the kind's hitbox sheet was never
    /// registered, which is a setup bug.
    pub fn spawn(
        &mut self,
        obstacle: Obstacle,
        hitboxes: &HitboxLibrary,
        tuning: &ObstacleTuning,
    ) -> Result<Option<usize>, HitboxError> {
        hitboxes.sheet(obstacle.sheet_name())?;

        match obstacle.kind {
            ObstacleKind::Bear { .. } => {
                if self.bear_count >= tuning.bear_cap {
                    return Ok(None);
                }
                self.bear_count += 1;
            }
            ObstacleKind::Bird { .. } => {
                if self.bird_count >= tuning.bird_cap {
                    return Ok(None);
                }
                self.bird_count += 1;
            }
            ObstacleKind::Stone | ObstacleKind::Net => {}
        }

        self.obstacles.push(obstacle);
        Ok(Some(self.obstacles.len() - 1))
    }

    /// Update every live obstacle inside the expanded vertical band (one
    /// full view height of buffer above and below). The gate is vertical
    /// only: a bird holding a fixed side x must keep flying even when the
    /// camera's horizontal window has drifted off it. Out-of-band obstacles
    /// keep their position and skip behavior, except chasing bears, which
    /// always update.
    pub fn tick(
        &mut self,
        player_pos: Vec2,
        path: &PathField,
        view: &ViewRect,
        world_width: f32,
        dt: f32,
    ) {
        let band_top = view.top - view.height();
        let band_bottom = view.bottom + view.height();
        let ctx = ObstacleCtx {
            player_pos,
            path,
            view,
            world_width,
            dt,
        };
        for obstacle in &mut self.obstacles {
            if !obstacle.alive {
                continue;
            }
            let in_band = obstacle.pos.y >= band_top && obstacle.pos.y <= band_bottom;
            if in_band || obstacle.updates_off_screen() {
                obstacle.update(&ctx);
            }
        }
    }

    /// Remove obstacles that crossed their exit threshold, plus anything a
    /// collision already killed. Birds exit upstream past the player, bears
    /// (and drifting stones/nets) exit downstream. Reverse index order so
    /// removal never skips an element.
    pub fn cull(&mut self, player_y: f32, view_height: f32, events: &mut Vec<SimEvent>) {
        let ahead = player_y - view_height / 2.0 - CULL_MARGIN;
        let behind = player_y + view_height / 2.0 + CULL_MARGIN;

        for i in (0..self.obstacles.len()).rev() {
            let o = &self.obstacles[i];
            let gone = match o.kind {
                _ if !o.alive => true,
                ObstacleKind::Bird { .. } => o.pos.y < ahead,
                ObstacleKind::Bear { .. } => o.pos.y > behind,
                ObstacleKind::Stone | ObstacleKind::Net => o.pos.y > behind,
            };
            if !gone {
                continue;
            }
            if self.obstacles[i].alive {
                events.push(SimEvent::Score(CULL_SCORE));
            }
            self.remove(i);
        }
    }

    fn remove(&mut self, index: usize) {
        let o = self.obstacles.swap_remove(index);
        match o.kind {
            ObstacleKind::Bear { .. } => self.bear_count -= 1,
            ObstacleKind::Bird { .. } => self.bird_count -= 1,
            ObstacleKind::Stone | ObstacleKind::Net => {}
        }
    }

    /// True when any live bear is within `range` of `player_y` vertically.
    /// Drives bear-formation suppression.
    pub fn bear_near(&self, player_y: f32, range: f32) -> bool {
        self.obstacles.iter().any(|o| {
            o.alive
                && matches!(o.kind, ObstacleKind::Bear { .. })
                && (o.pos.y - player_y).abs() < range
        })
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.bear_count = 0;
        self.bird_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use crate::sim::obstacle::BirdSize;

    fn setup() -> (HitboxLibrary, ObstacleTuning, EntityRegistry) {
        (
            HitboxLibrary::with_defaults(),
            Config::default().obstacles,
            EntityRegistry::new(),
        )
    }

    #[test]
    fn test_caps_are_enforced() {
        let (lib, tuning, mut reg) = setup();
        for _ in 0..5 {
            reg.spawn(Obstacle::bear(Vec2::ZERO), &lib, &tuning).unwrap();
        }
        for _ in 0..5 {
            reg.spawn(
                Obstacle::bird(Vec2::ZERO, Vec2::new(0.0, -8.0), BirdSize::Small),
                &lib,
                &tuning,
            )
            .unwrap();
        }
        assert_eq!(reg.bear_count(), 2);
        assert_eq!(reg.bird_count(), 3);
        assert_eq!(reg.obstacles().len(), 5);
    }

    #[test]
    fn test_spawn_at_cap_returns_none_not_error() {
        let (lib, tuning, mut reg) = setup();
        assert!(reg
            .spawn(Obstacle::bear(Vec2::ZERO), &lib, &tuning)
            .unwrap()
            .is_some());
        assert!(reg
            .spawn(Obstacle::bear(Vec2::ZERO), &lib, &tuning)
            .unwrap()
            .is_some());
        assert!(reg
            .spawn(Obstacle::bear(Vec2::ZERO), &lib, &tuning)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_spawn_without_sheet_fails_fast() {
        let (_, tuning, mut reg) = setup();
        let empty = HitboxLibrary::new();
        let err = reg.spawn(Obstacle::bear(Vec2::ZERO), &empty, &tuning);
        assert!(err.is_err());
        assert_eq!(reg.bear_count(), 0);
    }

    #[test]
    fn test_cull_decrements_count_exactly_once() {
        let (lib, tuning, mut reg) = setup();
        let mut events = Vec::new();
        // Bird far upstream of the player, bear far downstream
        reg.spawn(
            Obstacle::bird(Vec2::new(500.0, -2000.0), Vec2::ZERO, BirdSize::Small),
            &lib,
            &tuning,
        )
        .unwrap();
        reg.spawn(Obstacle::bear(Vec2::new(500.0, 2000.0)), &lib, &tuning)
            .unwrap();

        reg.cull(0.0, 1000.0, &mut events);
        assert_eq!(reg.bird_count(), 0);
        assert_eq!(reg.bear_count(), 0);
        assert!(reg.obstacles().is_empty());
        let score: u32 = events
            .iter()
            .map(|e| match e {
                SimEvent::Score(s) => *s,
                _ => 0,
            })
            .sum();
        assert_eq!(score, 2 * CULL_SCORE);

        // A second pass must not underflow or re-award
        reg.cull(0.0, 1000.0, &mut events);
        assert_eq!(reg.bird_count(), 0);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_cull_keeps_in_window_obstacles() {
        let (lib, tuning, mut reg) = setup();
        let mut events = Vec::new();
        reg.spawn(
            Obstacle::bird(Vec2::new(500.0, -400.0), Vec2::ZERO, BirdSize::Small),
            &lib,
            &tuning,
        )
        .unwrap();
        reg.cull(0.0, 1000.0, &mut events);
        assert_eq!(reg.bird_count(), 1);
        assert!(events.is_empty());
    }

    #[test]
    fn test_dead_obstacles_are_swept_without_score() {
        let (lib, tuning, mut reg) = setup();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut events = Vec::new();
        reg.spawn(Obstacle::stone(Vec2::new(500.0, 0.0), &mut rng), &lib, &tuning)
            .unwrap();
        reg.obstacles_mut()[0].alive = false;
        reg.cull(0.0, 1000.0, &mut events);
        assert!(reg.obstacles().is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn test_offscreen_obstacles_skip_updates() {
        let (lib, tuning, mut reg) = setup();
        let path = PathField::new(500.0, 0.18, 450.0);
        let view = ViewRect {
            left: 0.0,
            right: 1000.0,
            top: -500.0,
            bottom: 500.0,
        };
        // Net three view heights downstream: outside even the expanded band
        reg.spawn(
            Obstacle::net(Vec2::new(500.0, 3000.0), &mut Pcg32::seed_from_u64(1)),
            &lib,
            &tuning,
        )
        .unwrap();
        reg.tick(Vec2::new(500.0, 0.0), &path, &view, 1000.0, 1.0);
        assert_eq!(reg.obstacles()[0].pos, Vec2::new(500.0, 3000.0));
    }

    #[test]
    fn test_update_gate_ignores_horizontal_window() {
        // A side-lane bird must keep flying (and eventually free its cap
        // slot) even when the camera's x window has drifted away from it
        let (lib, tuning, mut reg) = setup();
        let path = PathField::new(500.0, 0.18, 450.0);
        let mut events = Vec::new();
        reg.spawn(
            Obstacle::bird(Vec2::new(100.0, 520.0), Vec2::new(0.0, -8.0), BirdSize::Small),
            &lib,
            &tuning,
        )
        .unwrap();
        // Player hugging the far bank: view excludes x = 100 entirely
        let view = ViewRect {
            left: 200.0,
            right: 1200.0,
            top: -500.0,
            bottom: 500.0,
        };
        for _ in 0..200 {
            reg.tick(Vec2::new(700.0, 0.0), &path, &view, 1000.0, 1.0);
            reg.cull(0.0, 1000.0, &mut events);
        }
        // 200 ticks at vy = -8 carries the bird far past the upstream cull
        // line; the slot is free again
        assert_eq!(reg.bird_count(), 0);
        assert!(reg.obstacles().is_empty());
    }

    #[test]
    fn test_bear_near_detects_range() {
        let (lib, tuning, mut reg) = setup();
        reg.spawn(Obstacle::bear(Vec2::new(500.0, -1500.0)), &lib, &tuning)
            .unwrap();
        assert!(reg.bear_near(0.0, 2000.0));
        assert!(!reg.bear_near(0.0, 1000.0));
    }
}
