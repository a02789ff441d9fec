//! River Rush - an endless upstream river-survival simulation
//!
//! Core modules:
//! - `sim`: Deterministic world simulation (river path, obstacles, collisions,
//!   particles)
//! - `config`: Data-driven tuning constants
//!
//! Rendering, audio and input live outside this crate; the simulation exposes
//! positions, view-space visibility and a drained event queue to those
//! collaborators and never issues a draw call itself.

pub mod config;
pub mod sim;

pub use config::Config;
pub use sim::world::{SimEvent, TickInput, World};

use glam::Vec2;

/// Fixed simulation constants that are structural rather than tunable.
pub mod consts {
    /// Fixed simulation timestep (60 Hz frame tick)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Milliseconds of game clock per tick
    pub const TICK_MS: u64 = 1000 / 60;

    /// Vertical extent of one bank segment in world units
    pub const SEGMENT_HEIGHT: f32 = 50.0;
    /// Segments kept alive ahead of and behind the player
    pub const VISIBLE_RANGE: i64 = 20;
    /// Retirement runs only after this many segments of travel
    pub const CLEANUP_INTERVAL: i64 = 50;
    /// Samples farther than VISIBLE_RANGE * this factor are retired
    pub const RETIRE_FACTOR: f32 = 2.5;

    /// Default collision box edge when no hitbox data exists for a frame
    pub const FALLBACK_HITBOX: f32 = 64.0;

    /// General particle list capacity
    pub const MAX_PARTICLES: usize = 256;
    /// Foam list capacity (separate, smaller pool)
    pub const MAX_FOAM: usize = 96;
}

/// Convert a duration in milliseconds of game clock to whole 60 Hz ticks,
/// rounding up so short windows never collapse to zero.
#[inline]
pub fn ms_to_ticks(ms: u64) -> u64 {
    (ms * 60).div_ceil(1000)
}

/// Convert a world y coordinate to its bank segment index.
#[inline]
pub fn segment_index(y: f32) -> i64 {
    (y / consts::SEGMENT_HEIGHT).floor() as i64
}

/// Normalize a vector, falling back to +x when the input is degenerate.
///
/// Knockback directions can be computed from coincident centers; propagating
/// a NaN position would poison the whole frame.
#[inline]
pub fn normalize_or_unit_x(v: Vec2) -> Vec2 {
    let n = v.normalize_or_zero();
    if n.length_squared() < 0.5 {
        Vec2::X
    } else {
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_index_floors_negative() {
        assert_eq!(segment_index(0.0), 0);
        assert_eq!(segment_index(49.9), 0);
        assert_eq!(segment_index(50.0), 1);
        assert_eq!(segment_index(-0.1), -1);
        assert_eq!(segment_index(-50.0), -1);
        assert_eq!(segment_index(-50.1), -2);
    }

    #[test]
    fn test_normalize_or_unit_x() {
        assert_eq!(normalize_or_unit_x(Vec2::ZERO), Vec2::X);
        let n = normalize_or_unit_x(Vec2::new(0.0, 3.0));
        assert!((n - Vec2::Y).length() < 1e-6);
        assert_eq!(normalize_or_unit_x(Vec2::new(f32::NAN, 0.0)), Vec2::X);
    }
}
