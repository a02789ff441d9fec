//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order; reverse-index removal)
//! - No rendering or platform dependencies

pub mod camera;
pub mod collision;
pub mod hitbox;
pub mod obstacle;
pub mod particles;
pub mod path;
pub mod player;
pub mod registry;
pub mod segments;
pub mod spawn;
pub mod world;

pub use camera::{Camera, ViewRect};
pub use collision::{
    resolve_bank_collision, resolve_obstacle_collisions, resolve_waterfall, Aabb,
};
pub use hitbox::{HitboxError, HitboxLibrary, HitboxSheet};
pub use obstacle::{BirdSize, Obstacle, ObstacleKind};
pub use particles::{ParticlePools, SplashOptions};
pub use path::{BoundarySample, PathField, PathSample};
pub use player::{Player, PlayerInput};
pub use registry::EntityRegistry;
pub use segments::{BankChange, SegmentManager};
pub use spawn::{SpawnCtx, SpawnScheduler};
pub use world::{SimEvent, TickInput, World};
