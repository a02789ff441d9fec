//! World: owns every simulation component and orders the frame
//!
//! One `tick` is one 60 Hz frame. The order is fixed: camera follow, bank
//! segments, spawn scheduling, player integration, collision resolution,
//! registry cull, particles. An obstacle spawned this frame is therefore
//! never culled in the same frame. All randomness flows through one seeded
//! generator, so a seed plus an input stream reproduces a run exactly.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::Config;

use super::camera::Camera;
use super::collision::{resolve_bank_collision, resolve_obstacle_collisions, resolve_waterfall};
use super::hitbox::{HitboxError, HitboxLibrary};
use super::obstacle::ObstacleKind;
use super::particles::ParticlePools;
use super::path::PathField;
use super::player::Player;
use super::registry::EntityRegistry;
use super::segments::{BankChange, SegmentManager};
use super::spawn::{SpawnCtx, SpawnScheduler};

/// Player inputs for one frame.
pub use super::player::PlayerInput as TickInput;

/// Fire-and-forget feedback for audio/HUD collaborators, drained once per
/// frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    Splash { pos: Vec2 },
    PlayerHit { damage: f32 },
    Score(u32),
    GameOver,
    StoneShattered { pos: Vec2 },
    DashStarted { forward: bool },
    WaterfallBounce,
}

pub struct World {
    config: Config,
    seed: u64,
    pub player: Player,
    camera: Camera,
    path: PathField,
    segments: SegmentManager,
    registry: EntityRegistry,
    scheduler: SpawnScheduler,
    pub particles: ParticlePools,
    hitboxes: HitboxLibrary,
    rng: Pcg32,
    time_ticks: u64,
    score: u32,
    paused: bool,
    game_over: bool,
    waterfall_y: Option<f32>,
    events: Vec<SimEvent>,
}

impl World {
    pub fn new(config: Config, seed: u64) -> Self {
        let start = Vec2::new(config.center_x(), 0.0);
        let mut path = PathField::new(config.center_x(), config.bank_curve_speed, config.river_width);
        let segments = SegmentManager::new(&mut path);
        let player = Player::new(start, config.player_health);
        let camera = Camera::new(start, config.width, config.height);
        log::info!("world created, seed {seed}");
        Self {
            player,
            camera,
            path,
            segments,
            registry: EntityRegistry::new(),
            scheduler: SpawnScheduler::new(),
            particles: ParticlePools::default(),
            hitboxes: HitboxLibrary::with_defaults(),
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            score: 0,
            paused: false,
            game_over: false,
            waterfall_y: None,
            events: Vec::new(),
            config,
            seed,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn path(&self) -> &PathField {
        &self.path
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Place or clear the waterfall line blocking upstream progress.
    pub fn set_waterfall(&mut self, line_y: Option<f32>) {
        self.waterfall_y = line_y;
    }

    /// Queue the scripted two-net gauntlet ahead of the player.
    pub fn trigger_net_gauntlet(&mut self) {
        self.scheduler
            .schedule_net_gauntlet(self.time_ticks, &mut self.rng);
    }

    /// Enter the finale: waves stop, hearts ring out around the player.
    pub fn celebrate(&mut self) {
        self.scheduler.cutscene = true;
        self.particles.emit_win_hearts(self.player.pos);
    }

    /// Freeze the simulation. Outstanding delayed spawns are cancelled so
    /// nothing fires into a stale world on resume.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.scheduler.cancel_pending();
            log::info!("paused at tick {}", self.time_ticks);
        }
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Rebuild everything from the starting config and seed.
    pub fn restart(&mut self) {
        log::info!("restarting");
        *self = World::new(self.config.clone(), self.seed);
    }

    /// Feedback events accumulated since the last drain.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Bank attach/detach notifications for the renderer.
    pub fn drain_bank_changes(&mut self) -> Vec<BankChange> {
        std::mem::take(&mut self.segments.changes)
    }

    /// Advance one frame.
    pub fn tick(&mut self, input: &TickInput) -> Result<(), HitboxError> {
        if self.paused || self.game_over {
            return Ok(());
        }
        self.time_ticks += 1;
        let now = self.time_ticks;
        let dt = 1.0;
        let first_new_event = self.events.len();

        self.camera.set_target(self.player.pos);
        self.camera.update(dt);
        let view = self.camera.bounds();

        self.segments.extend(self.player.pos.y, &mut self.path);

        self.scheduler.tick(
            now,
            &mut SpawnCtx {
                registry: &mut self.registry,
                hitboxes: &self.hitboxes,
                path: &self.path,
                player_pos: self.player.pos,
                view: &view,
                config: &self.config,
                rng: &mut self.rng,
            },
        )?;

        self.player
            .integrate(input, &self.config, now, dt, &mut self.events);

        self.registry
            .tick(self.player.pos, &self.path, &view, self.config.width, dt);

        let sample = self.path.sample_at(self.player.pos.y);
        resolve_bank_collision(&mut self.player, &sample, self.config.player_radius);
        if let Some(line_y) = self.waterfall_y {
            resolve_waterfall(&mut self.player, line_y, now, &mut self.rng, &mut self.events);
        }
        resolve_obstacle_collisions(
            &mut self.player,
            &mut self.registry,
            &self.hitboxes,
            &mut self.particles,
            &self.config,
            now,
            &mut self.rng,
            &mut self.events,
        );

        self.emit_stone_foam(&view);

        self.registry
            .cull(self.player.pos.y, self.config.height, &mut self.events);

        self.particles.update(dt);
        self.particles.cull(&view);

        self.apply_events(first_new_event);
        Ok(())
    }

    /// Foam churns at the upstream face of every visible stone, every other
    /// frame.
    fn emit_stone_foam(&mut self, view: &super::camera::ViewRect) {
        if self.time_ticks % 2 != 0 {
            return;
        }
        for obstacle in self.registry.obstacles() {
            if !obstacle.alive || !matches!(obstacle.kind, ObstacleKind::Stone) {
                continue;
            }
            if !view.contains(obstacle.pos) {
                continue;
            }
            let b = obstacle.aabb(&self.hitboxes);
            self.particles
                .emit_foam(b.center(), b.size() / 2.0, &mut self.rng);
        }
    }

    /// Fold this frame's events into the world's own counters; the events
    /// stay queued for collaborators.
    fn apply_events(&mut self, from: usize) {
        let mut dash_splashes = Vec::new();
        for event in &self.events[from..] {
            match event {
                SimEvent::Score(s) => self.score += s,
                SimEvent::GameOver => self.game_over = true,
                SimEvent::DashStarted { forward } => dash_splashes.push(*forward),
                _ => {}
            }
        }
        for forward in dash_splashes {
            self.particles.emit_dash_splash(self.player.pos, &mut self.rng);
            if forward {
                self.particles
                    .emit_dash_upward_splash(self.player.pos, &mut self.rng);
            }
        }
    }
}
