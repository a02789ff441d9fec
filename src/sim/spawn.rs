//! Timed wave spawning
//!
//! The scheduler fires on a fixed game-clock interval, rotating through
//! spawn patterns by wave counter. Delayed sub-spawns are tasks keyed by a
//! logical tick and tagged with their wave id, so a pause or restart cancels
//! every outstanding sub-spawn atomically and nothing fires into a torn-down
//! world. Tasks re-check caps and placement rules when they come due, not
//! when they are scheduled.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::config::Config;
use crate::ms_to_ticks;

use super::camera::ViewRect;
use super::hitbox::{HitboxError, HitboxLibrary};
use super::obstacle::{BirdSize, Obstacle};
use super::path::PathField;
use super::registry::EntityRegistry;

/// Gap between birds of one wave, milliseconds.
const BIRD_WAVE_STEP_MS: u64 = 300;
/// Gap between diagonal sub-spawns, milliseconds.
const DIAGONAL_STEP_MS: u64 = 400;
/// Chance of a bear formation when no bears are alive.
const BEAR_FORMATION_CHANCE: f64 = 0.3;
/// Bears spawn this many view heights upstream of the player.
const BEAR_LEAD_FACTOR: f32 = 1.5;
/// A live bear within this many view heights suppresses a new formation.
const BEAR_SUPPRESS_FACTOR: f32 = 2.0;
/// Birds spawn this far below the bottom view edge.
const BIRD_SPAWN_MARGIN: f32 = 20.0;
/// Upstream lead of a net gauntlet.
const NET_LEAD: f32 = 400.0;
/// Half-width of the navigable gap a net gauntlet leaves open.
const NET_GAP_HALF: f32 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum TaskKind {
    Bird { side_x: f32, vy: f32, size: BirdSize },
    DiagonalStep { frac: f32, step: usize },
    BearFormation,
    Single,
    NetPair { gap_frac: f32 },
}

#[derive(Debug, Clone, Copy)]
struct Task {
    due: u64,
    wave: u64,
    kind: TaskKind,
}

/// Everything a due task needs to place an obstacle.
pub struct SpawnCtx<'a> {
    pub registry: &'a mut EntityRegistry,
    pub hitboxes: &'a HitboxLibrary,
    pub path: &'a PathField,
    pub player_pos: Vec2,
    pub view: &'a ViewRect,
    pub config: &'a Config,
    pub rng: &'a mut Pcg32,
}

#[derive(Debug, Default)]
pub struct SpawnScheduler {
    next_spawn_at: u64,
    wave_counter: u64,
    next_wave_id: u64,
    tasks: Vec<Task>,
    /// Set during the scripted finale; waves stop, pending tasks still drain
    pub cutscene: bool,
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wave_counter(&self) -> u64 {
        self.wave_counter
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    /// Drop every outstanding sub-spawn. Called on pause, restart and
    /// teardown.
    pub fn cancel_pending(&mut self) {
        self.tasks.clear();
    }

    /// Drop the outstanding sub-spawns of a single wave.
    pub fn cancel_wave(&mut self, wave: u64) {
        self.tasks.retain(|t| t.wave != wave);
    }

    fn push(&mut self, due: u64, wave: u64, kind: TaskKind) {
        self.tasks.push(Task { due, wave, kind });
    }

    /// Advance the scheduler one frame: fire the interval if it is due, then
    /// execute every task whose tick has arrived.
    pub fn tick(&mut self, now: u64, ctx: &mut SpawnCtx) -> Result<(), HitboxError> {
        let interval = ms_to_ticks(ctx.config.spawn_interval_ms);
        if now >= self.next_spawn_at {
            self.next_spawn_at = now + interval;
            self.wave_counter += 1;
            if !self.cutscene {
                self.plan_wave(now, ctx);
            }
        }
        self.run_due(now, ctx)
    }

    fn plan_wave(&mut self, now: u64, ctx: &mut SpawnCtx) {
        let wave = self.next_wave_id;
        self.next_wave_id += 1;

        if ctx.registry.bear_count() == 0
            && ctx.rng.random_bool(BEAR_FORMATION_CHANCE)
        {
            self.push(now, wave, TaskKind::BearFormation);
            return;
        }

        match self.wave_counter % 3 {
            0 => {
                let count = ctx.rng.random_range(1..=2);
                let side_x = if ctx.rng.random_bool(0.5) {
                    100.0
                } else {
                    ctx.config.width - 100.0
                };
                for i in 0..count {
                    self.push(
                        now + i * ms_to_ticks(BIRD_WAVE_STEP_MS),
                        wave,
                        TaskKind::Bird {
                            side_x,
                            vy: -8.0,
                            size: BirdSize::random(ctx.rng),
                        },
                    );
                }
            }
            1 => {
                let reverse = ctx.rng.random_bool(0.5);
                for step in 0..3 {
                    let t = step as f32 / 2.0;
                    let frac = if reverse {
                        0.7 - 0.4 * t
                    } else {
                        0.3 + 0.4 * t
                    };
                    self.push(
                        now + step as u64 * ms_to_ticks(DIAGONAL_STEP_MS),
                        wave,
                        TaskKind::DiagonalStep { frac, step },
                    );
                }
            }
            _ => self.push(now, wave, TaskKind::Single),
        }
    }

    /// Queue the two-net gauntlet 400 ahead of the player, leaving a random
    /// gap. Exposed for scripted sequences; returns the wave id so the
    /// caller can cancel it.
    pub fn schedule_net_gauntlet(&mut self, now: u64, rng: &mut Pcg32) -> u64 {
        let wave = self.next_wave_id;
        self.next_wave_id += 1;
        let gap_frac = rng.random_range(0.3..0.7);
        self.push(now, wave, TaskKind::NetPair { gap_frac });
        wave
    }

    fn run_due(&mut self, now: u64, ctx: &mut SpawnCtx) -> Result<(), HitboxError> {
        // Reverse index order: execution removes in place
        for i in (0..self.tasks.len()).rev() {
            if self.tasks[i].due > now {
                continue;
            }
            let task = self.tasks.swap_remove(i);
            Self::execute(task.kind, ctx)?;
        }
        Ok(())
    }

    fn execute(kind: TaskKind, ctx: &mut SpawnCtx) -> Result<(), HitboxError> {
        let tuning = &ctx.config.obstacles;
        match kind {
            TaskKind::Bird { side_x, vy, size } => {
                let pos = Vec2::new(side_x, ctx.view.bottom + BIRD_SPAWN_MARGIN);
                let vel = Vec2::new(ctx.rng.random_range(-1.5..1.5), vy);
                ctx.registry
                    .spawn(Obstacle::bird(pos, vel, size), ctx.hitboxes, tuning)?;
            }
            TaskKind::DiagonalStep { frac, step } => {
                let x = ctx.view.left + frac * ctx.view.width();
                let lead = BEAR_LEAD_FACTOR * ctx.view.height() - 100.0 * step as f32;
                match ctx.rng.random_range(0..3) {
                    0 => {
                        let pos = Vec2::new(x, ctx.view.bottom + BIRD_SPAWN_MARGIN);
                        let vel = Vec2::new(0.0, ctx.rng.random_range(-14.0..-7.0));
                        ctx.registry.spawn(
                            Obstacle::bird(pos, vel, BirdSize::random(ctx.rng)),
                            ctx.hitboxes,
                            tuning,
                        )?;
                    }
                    1 => {
                        let pos = Vec2::new(x, ctx.player_pos.y - lead);
                        ctx.registry
                            .spawn(Obstacle::bear(pos), ctx.hitboxes, tuning)?;
                    }
                    _ => {
                        // Stones sit in the channel itself
                        let y = ctx.player_pos.y - lead;
                        let sample = ctx.path.sample_at(y);
                        let x = x.clamp(sample.left + 60.0, sample.right - 60.0);
                        ctx.registry.spawn(
                            Obstacle::stone(Vec2::new(x, y), ctx.rng),
                            ctx.hitboxes,
                            tuning,
                        )?;
                    }
                }
            }
            TaskKind::BearFormation => {
                // Anti-clustering, re-checked at execution time
                if ctx.registry.bear_near(
                    ctx.player_pos.y,
                    BEAR_SUPPRESS_FACTOR * ctx.view.height(),
                ) {
                    return Ok(());
                }
                let y = ctx.player_pos.y - BEAR_LEAD_FACTOR * ctx.view.height();
                let x = ctx.path.sample_at(y).center();
                ctx.registry
                    .spawn(Obstacle::bear(Vec2::new(x, y)), ctx.hitboxes, tuning)?;
            }
            TaskKind::Single => {
                if ctx.rng.random_bool(0.5) {
                    let x = ctx
                        .rng
                        .random_range(100.0..ctx.config.width - 100.0);
                    let pos = Vec2::new(x, ctx.view.bottom + BIRD_SPAWN_MARGIN);
                    let vel = Vec2::new(0.0, -8.0);
                    ctx.registry.spawn(
                        Obstacle::bird(pos, vel, BirdSize::random(ctx.rng)),
                        ctx.hitboxes,
                        tuning,
                    )?;
                } else {
                    let y = ctx.player_pos.y - BEAR_LEAD_FACTOR * ctx.view.height();
                    let x = ctx.path.sample_at(y).center();
                    ctx.registry
                        .spawn(Obstacle::bear(Vec2::new(x, y)), ctx.hitboxes, tuning)?;
                }
            }
            TaskKind::NetPair { gap_frac } => {
                let y = ctx.player_pos.y - NET_LEAD;
                let sample = ctx.path.sample_at(y);
                let gap_x = sample.left + gap_frac * sample.width;
                let left_mid = (sample.left + (gap_x - NET_GAP_HALF)) / 2.0;
                let right_mid = ((gap_x + NET_GAP_HALF) + sample.right) / 2.0;
                ctx.registry.spawn(
                    Obstacle::net(Vec2::new(left_mid, y), ctx.rng),
                    ctx.hitboxes,
                    tuning,
                )?;
                ctx.registry.spawn(
                    Obstacle::net(Vec2::new(right_mid, y), ctx.rng),
                    ctx.hitboxes,
                    tuning,
                )?;
            }
        }
        Ok(())
    }
}
