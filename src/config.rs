//! Data-driven tuning constants
//!
//! Every knob the simulation consumes lives in one serde-friendly structure
//! so collaborators can load/override balance without touching sim code.

use serde::{Deserialize, Serialize};

/// Speed/duration/cooldown triple for a dash direction (milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashTuning {
    /// Velocity magnitude while dashing (world units per tick)
    pub speed: f32,
    /// Dash length in milliseconds of game clock
    pub duration_ms: u64,
    /// Minimum gap between dash starts in milliseconds
    pub cooldown_ms: u64,
}

/// Per-kind obstacle tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleTuning {
    pub bear_damage: f32,
    pub bird_damage_small: f32,
    pub bird_damage_medium: f32,
    pub bird_damage_large: f32,
    pub stone_damage: f32,
    pub net_damage: f32,
    /// Hard cap on live bears
    pub bear_cap: usize,
    /// Hard cap on live birds
    pub bird_cap: usize,
}

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Viewport width in world units
    pub width: f32,
    /// Viewport height in world units
    pub height: f32,
    /// Constant upstream drift applied to the player (units per tick)
    pub scroll_speed: f32,
    /// Lateral player acceleration blend factor
    pub player_acceleration: f32,
    /// Lateral player top speed (units per tick)
    pub player_max_speed: f32,
    /// Exponential velocity friction per tick when no input is held
    pub player_friction: f32,
    /// Player collision radius for bank checks
    pub player_radius: f32,
    /// Starting health
    pub player_health: f32,

    /// Forward (upstream) dash tuning
    pub dash: DashTuning,
    /// Backward (downstream) dash tuning
    pub back_dash: DashTuning,

    /// Milliseconds between spawn scheduler ticks
    pub spawn_interval_ms: u64,
    /// Obstacle damage and cap table
    pub obstacles: ObstacleTuning,

    /// Base river width before oscillation
    pub river_width: f32,
    /// Frequency of the primary bank curve term
    pub bank_curve_speed: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
            scroll_speed: 7.5,
            player_acceleration: 0.5,
            player_max_speed: 10.0,
            player_friction: 0.85,
            player_radius: 20.0,
            player_health: 100.0,
            dash: DashTuning {
                speed: 24.0,
                duration_ms: 300,
                cooldown_ms: 500,
            },
            back_dash: DashTuning {
                speed: 24.0,
                duration_ms: 150,
                cooldown_ms: 500,
            },
            spawn_interval_ms: 2000,
            obstacles: ObstacleTuning {
                bear_damage: 30.0,
                bird_damage_small: 15.0,
                bird_damage_medium: 25.0,
                bird_damage_large: 35.0,
                stone_damage: 20.0,
                net_damage: 40.0,
                bear_cap: 2,
                bird_cap: 3,
            },
            river_width: 450.0,
            bank_curve_speed: 0.18,
        }
    }
}

impl Config {
    /// Horizontal center of the river corridor.
    #[inline]
    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_caps() {
        let config = Config::default();
        assert_eq!(config.obstacles.bear_cap, 2);
        assert_eq!(config.obstacles.bird_cap, 3);
        assert!(config.river_width > 0.0);
    }

    #[test]
    fn test_serde_round_trip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        // Collaborators may supply only the knobs they care about
        let config: Config = serde_json::from_str(r#"{"spawn_interval_ms": 1500}"#).unwrap();
        assert_eq!(config.spawn_interval_ms, 1500);
        assert_eq!(config.width, 1000.0);
    }
}
