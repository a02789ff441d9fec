//! Bounded particle pools for water feedback effects
//!
//! Two independent collections with fixed capacities: a general list
//! (splashes, hearts) and a foam list. When a list is full the oldest entry
//! is evicted. Expired particles return to a free list instead of being
//! dropped, so sustained emission does not allocate.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::{MAX_FOAM, MAX_PARTICLES};

use super::camera::ViewRect;

/// Per-frame velocity damping factor.
const DRAG: f32 = 0.92;
/// Downward pull on rising splash droplets, per frame.
const GRAVITY: f32 = 0.22;
/// Foam alpha damping factor per frame.
const FOAM_FADE: f32 = 0.96;
/// Foam below this alpha is dead.
const FOAM_MIN_ALPHA: f32 = 0.05;

/// One ephemeral visual effect.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub alpha: f32,
    pub base_size: f32,
    pub visible: bool,
    foam: bool,
}

/// Fixed-capacity free list. Released values are retained for reuse up to
/// the capacity and discarded past it.
#[derive(Debug)]
pub struct Pool<T> {
    free: Vec<T>,
    capacity: usize,
}

impl<T: Default> Pool<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn acquire(&mut self) -> T {
        self.free.pop().unwrap_or_default()
    }

    pub fn release(&mut self, value: T) {
        if self.free.len() < self.capacity {
            self.free.push(value);
        }
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }
}

/// Emission parameters for a splash burst.
#[derive(Debug, Clone, Copy)]
pub struct SplashOptions {
    pub count: usize,
    /// Speed range (min, max) in world units per frame
    pub speed: (f32, f32),
    /// Droplet size range (min, max)
    pub size: (f32, f32),
    pub life: f32,
    /// `None` for a full radial burst; `Some((angle_deg, spread_deg))` for a
    /// directional spray
    pub direction: Option<(f32, f32)>,
}

impl Default for SplashOptions {
    fn default() -> Self {
        Self {
            count: 36,
            speed: (1.0, 4.0),
            size: (2.0, 6.0),
            life: 60.0,
            direction: None,
        }
    }
}

/// The two particle collections plus their shared free list.
#[derive(Debug)]
pub struct ParticlePools {
    particles: Vec<Particle>,
    foam: Vec<Particle>,
    pool: Pool<Particle>,
    max_particles: usize,
    max_foam: usize,
}

impl Default for ParticlePools {
    fn default() -> Self {
        Self::with_capacity(MAX_PARTICLES, MAX_FOAM)
    }
}

impl ParticlePools {
    pub fn with_capacity(max_particles: usize, max_foam: usize) -> Self {
        Self {
            particles: Vec::with_capacity(max_particles),
            foam: Vec::with_capacity(max_foam),
            pool: Pool::new(max_particles),
            max_particles,
            max_foam,
        }
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn foam_count(&self) -> usize {
        self.foam.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn foam(&self) -> &[Particle] {
        &self.foam
    }

    fn push_general(&mut self, p: Particle) {
        if self.particles.len() >= self.max_particles {
            let oldest = self.particles.remove(0);
            self.pool.release(oldest);
        }
        self.particles.push(p);
    }

    fn push_foam(&mut self, p: Particle) {
        if self.foam.len() >= self.max_foam {
            let oldest = self.foam.remove(0);
            self.pool.release(oldest);
        }
        self.foam.push(p);
    }

    /// Burst of droplets at a point, radial or directional per the options.
    pub fn emit_splash(&mut self, at: Vec2, opts: SplashOptions, rng: &mut Pcg32) {
        for _ in 0..opts.count {
            let angle = match opts.direction {
                Some((center_deg, spread_deg)) => {
                    (center_deg + rng.random_range(-spread_deg..spread_deg)).to_radians()
                }
                None => rng.random_range(0.0..2.0 * PI),
            };
            let speed = rng.random_range(opts.speed.0..opts.speed.1);
            let mut p = self.pool.acquire();
            p.pos = at;
            p.vel = Vec2::new(angle.cos(), angle.sin()) * speed;
            p.life = opts.life;
            p.max_life = opts.life;
            p.alpha = 1.0;
            p.base_size = rng.random_range(opts.size.0..opts.size.1);
            p.visible = true;
            p.foam = false;
            self.push_general(p);
        }
    }

    /// Big burst trailing a forward dash.
    pub fn emit_dash_splash(&mut self, at: Vec2, rng: &mut Pcg32) {
        self.emit_splash(
            at - Vec2::new(0.0, 40.0),
            SplashOptions {
                count: 64,
                speed: (2.0, 6.0),
                life: 44.0,
                ..SplashOptions::default()
            },
            rng,
        );
    }

    /// Narrow upward spray at the dash start point.
    pub fn emit_dash_upward_splash(&mut self, at: Vec2, rng: &mut Pcg32) {
        self.emit_splash(
            at - Vec2::new(0.0, 24.0),
            SplashOptions {
                count: 40,
                speed: (3.0, 7.0),
                life: 44.0,
                direction: Some((-90.0, 22.5)),
                ..SplashOptions::default()
            },
            rng,
        );
    }

    /// Slow expanding ring of hearts for the finale.
    pub fn emit_win_hearts(&mut self, at: Vec2) {
        for i in 0..16 {
            let angle = i as f32 / 16.0 * 2.0 * PI;
            let mut p = self.pool.acquire();
            p.pos = at;
            p.vel = Vec2::new(angle.cos(), angle.sin()) * 1.5;
            p.life = 90.0;
            p.max_life = 90.0;
            p.alpha = 1.0;
            p.base_size = 8.0;
            p.visible = true;
            p.foam = false;
            self.push_general(p);
        }
    }

    /// Foam along the upstream arc of a stone's hitbox ellipse. Callers gate
    /// this to every other frame per stone.
    pub fn emit_foam(&mut self, center: Vec2, half_extent: Vec2, rng: &mut Pcg32) {
        for i in 0..12 {
            // Upstream half of the ellipse only
            let angle = PI + (i as f32 + rng.random_range(0.0..1.0)) / 12.0 * PI;
            let dir = Vec2::new(angle.cos(), angle.sin());
            let mut p = self.pool.acquire();
            p.pos = center + dir * half_extent;
            p.vel = dir * rng.random_range(0.3..1.0);
            p.life = 30.0;
            p.max_life = 30.0;
            p.alpha = rng.random_range(0.5..0.9);
            p.base_size = rng.random_range(2.0..5.0);
            p.visible = true;
            p.foam = true;
            self.push_foam(p);
        }
    }

    /// Integrate all particles one step. `dt` is in 60 Hz frames.
    pub fn update(&mut self, dt: f32) {
        for i in (0..self.particles.len()).rev() {
            let p = &mut self.particles[i];
            let rate = if p.visible { dt } else { dt * 2.0 };
            p.pos += p.vel * dt;
            p.vel *= DRAG.powf(dt);
            if p.vel.y < 0.0 {
                p.vel.y += GRAVITY * dt;
            }
            p.life -= rate;
            let frac = (p.life / p.max_life).max(0.0);
            p.alpha = frac * frac;
            if p.life <= 0.0 {
                let dead = self.particles.swap_remove(i);
                self.pool.release(dead);
            }
        }

        for i in (0..self.foam.len()).rev() {
            let p = &mut self.foam[i];
            let rate = if p.visible { dt } else { dt * 2.0 };
            p.pos += p.vel * dt;
            p.vel *= DRAG.powf(dt);
            p.life -= rate;
            p.alpha *= FOAM_FADE.powf(rate);
            if p.life <= 0.0 || p.alpha < FOAM_MIN_ALPHA {
                let dead = self.foam.swap_remove(i);
                self.pool.release(dead);
            }
        }
    }

    /// Mark particles outside the expanded view invisible so they fade at
    /// double rate instead of being simulated indefinitely.
    pub fn cull(&mut self, view: &ViewRect) {
        let expanded = view.expanded(view.width() / 2.0, view.height() / 2.0);
        for p in self.particles.iter_mut().chain(self.foam.iter_mut()) {
            p.visible = expanded.contains(p.pos);
        }
    }

    pub fn clear(&mut self) {
        for p in self.particles.drain(..).chain(self.foam.drain(..)) {
            self.pool.release(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut pools = ParticlePools::with_capacity(32, 16);
        let mut rng = rng();
        // 8 long-lived sentinels, then a 40-particle burst into a 32-cap list
        for i in 0..8 {
            pools.emit_splash(
                Vec2::new(i as f32, 0.0),
                SplashOptions {
                    count: 1,
                    life: 500.0,
                    ..SplashOptions::default()
                },
                &mut rng,
            );
        }
        pools.emit_splash(
            Vec2::ZERO,
            SplashOptions {
                count: 40,
                ..SplashOptions::default()
            },
            &mut rng,
        );
        // Capacity holds; the 8 pre-existing sentinels were the oldest and
        // are all gone
        assert_eq!(pools.particle_count(), 32);
        assert!(!pools.particles().iter().any(|p| p.max_life == 500.0));
    }

    #[test]
    fn test_expired_particles_return_to_pool() {
        let mut pools = ParticlePools::default();
        let mut rng = rng();
        pools.emit_splash(
            Vec2::ZERO,
            SplashOptions {
                count: 10,
                life: 2.0,
                ..SplashOptions::default()
            },
            &mut rng,
        );
        pools.update(1.0);
        assert_eq!(pools.particle_count(), 10);
        pools.update(1.0);
        assert_eq!(pools.particle_count(), 0);
        assert_eq!(pools.pool.free_len(), 10);
    }

    #[test]
    fn test_alpha_follows_squared_life_fraction() {
        let mut pools = ParticlePools::default();
        let mut rng = rng();
        pools.emit_splash(
            Vec2::ZERO,
            SplashOptions {
                count: 1,
                life: 10.0,
                ..SplashOptions::default()
            },
            &mut rng,
        );
        pools.update(5.0);
        let p = pools.particles()[0];
        assert!((p.alpha - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_gravity_only_pulls_rising_droplets() {
        let mut pools = ParticlePools::default();
        let mut rng = rng();
        pools.emit_splash(
            Vec2::ZERO,
            SplashOptions {
                count: 1,
                life: 100.0,
                direction: Some((-90.0, 0.1)),
                speed: (4.0, 4.1),
                ..SplashOptions::default()
            },
            &mut rng,
        );
        let vy0 = pools.particles()[0].vel.y;
        assert!(vy0 < 0.0);
        pools.update(1.0);
        // Drag shrinks the magnitude, gravity adds on top
        assert!(pools.particles()[0].vel.y > vy0);
    }

    #[test]
    fn test_invisible_particles_decay_twice_as_fast() {
        let mut pools = ParticlePools::default();
        let mut rng = rng();
        pools.emit_splash(
            Vec2::new(0.0, 0.0),
            SplashOptions {
                count: 1,
                life: 100.0,
                speed: (0.01, 0.02),
                ..SplashOptions::default()
            },
            &mut rng,
        );
        let view = ViewRect {
            left: 10_000.0,
            right: 11_000.0,
            top: 0.0,
            bottom: 1000.0,
        };
        pools.cull(&view);
        pools.update(10.0);
        assert!((pools.particles()[0].life - 80.0).abs() < 1e-3);
    }

    #[test]
    fn test_foam_dies_below_alpha_floor() {
        let mut pools = ParticlePools::default();
        let mut rng = rng();
        pools.emit_foam(Vec2::ZERO, Vec2::splat(20.0), &mut rng);
        assert_eq!(pools.foam_count(), 12);
        // Alpha halves roughly every 17 frames; the 30-frame lifetime or the
        // alpha floor ends every one of these well before 200 updates
        for _ in 0..200 {
            pools.update(1.0);
        }
        assert_eq!(pools.foam_count(), 0);
    }

    #[test]
    fn test_foam_spawns_on_upstream_arc() {
        let mut pools = ParticlePools::default();
        let mut rng = rng();
        pools.emit_foam(Vec2::new(100.0, 100.0), Vec2::new(30.0, 20.0), &mut rng);
        for p in pools.foam() {
            assert!(p.pos.y >= 100.0 - 20.0 - 1e-3);
        }
    }

    #[test]
    fn test_clear_refills_pool() {
        let mut pools = ParticlePools::default();
        let mut rng = rng();
        pools.emit_dash_splash(Vec2::ZERO, &mut rng);
        assert_eq!(pools.particle_count(), 64);
        pools.clear();
        assert_eq!(pools.particle_count(), 0);
        assert_eq!(pools.pool.free_len(), 64);
    }
}
