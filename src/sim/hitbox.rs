//! Per-frame hitbox sheets
//!
//! Each obstacle kind owns an animation sheet whose frames may carry a
//! collision rectangle in frame-local pixel coordinates. Sheets are
//! registered up front; asking for an unregistered sheet is a hard error
//! (spawning a kind before its data exists is a setup bug, not a runtime
//! condition to paper over). A frame without a rectangle degrades to the
//! fixed fallback square instead.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::FALLBACK_HITBOX;

use super::collision::Aabb;

#[derive(Debug, Error)]
pub enum HitboxError {
    #[error("hitbox sheet '{0}' was never registered")]
    MissingSheet(String),
}

/// Collision rectangle in frame-local pixel coordinates (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Hitbox data for one animation sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitboxSheet {
    /// Edge length of the square source frame in pixels
    pub frame_size: f32,
    /// One entry per animation frame; `None` falls back to the default box
    pub frames: Vec<Option<FrameRect>>,
}

impl HitboxSheet {
    /// World-space AABB for `frame` of an entity centered at `pos`, drawn at
    /// `scale`. The frame rect is recentered on the frame midpoint so the
    /// entity position stays the box center.
    pub fn aabb(&self, frame: usize, pos: Vec2, scale: f32) -> Aabb {
        match self.frames.get(frame).copied().flatten() {
            Some(r) => {
                let half_frame = self.frame_size / 2.0;
                let cx = (r.x + r.w / 2.0 - half_frame) * scale;
                let cy = (r.y + r.h / 2.0 - half_frame) * scale;
                Aabb::from_center_size(
                    pos + Vec2::new(cx, cy),
                    Vec2::new(r.w * scale, r.h * scale),
                )
            }
            None => Aabb::from_center_size(pos, Vec2::splat(FALLBACK_HITBOX)),
        }
    }
}

/// Registry of hitbox sheets keyed by kind name.
#[derive(Debug, Clone, Default)]
pub struct HitboxLibrary {
    sheets: HashMap<String, HitboxSheet>,
}

impl HitboxLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, sheet: HitboxSheet) {
        self.sheets.insert(name.to_string(), sheet);
    }

    pub fn sheet(&self, name: &str) -> Result<&HitboxSheet, HitboxError> {
        self.sheets
            .get(name)
            .ok_or_else(|| HitboxError::MissingSheet(name.to_string()))
    }

    /// Library preloaded with the built-in kind sheets. Collaborators with
    /// authored JSON data can deserialize [`HitboxSheet`]s and register those
    /// instead.
    pub fn with_defaults() -> Self {
        let mut lib = Self::new();
        lib.register(
            "bear",
            HitboxSheet {
                frame_size: 256.0,
                frames: vec![Some(FrameRect {
                    x: 64.0,
                    y: 48.0,
                    w: 128.0,
                    h: 160.0,
                })],
            },
        );
        lib.register(
            "bird",
            HitboxSheet {
                frame_size: 256.0,
                frames: vec![
                    Some(FrameRect {
                        x: 56.0,
                        y: 80.0,
                        w: 144.0,
                        h: 96.0,
                    }),
                    Some(FrameRect {
                        x: 56.0,
                        y: 64.0,
                        w: 144.0,
                        h: 112.0,
                    }),
                ],
            },
        );
        // Six stone variants, each its own silhouette
        lib.register(
            "stone",
            HitboxSheet {
                frame_size: 256.0,
                frames: vec![
                    Some(FrameRect {
                        x: 32.0,
                        y: 40.0,
                        w: 192.0,
                        h: 176.0,
                    }),
                    Some(FrameRect {
                        x: 48.0,
                        y: 32.0,
                        w: 160.0,
                        h: 192.0,
                    }),
                    Some(FrameRect {
                        x: 24.0,
                        y: 56.0,
                        w: 208.0,
                        h: 144.0,
                    }),
                    Some(FrameRect {
                        x: 40.0,
                        y: 40.0,
                        w: 176.0,
                        h: 176.0,
                    }),
                    Some(FrameRect {
                        x: 56.0,
                        y: 48.0,
                        w: 144.0,
                        h: 160.0,
                    }),
                    None,
                ],
            },
        );
        lib.register(
            "net",
            HitboxSheet {
                frame_size: 256.0,
                frames: vec![Some(FrameRect {
                    x: 16.0,
                    y: 96.0,
                    w: 224.0,
                    h: 64.0,
                })],
            },
        );
        lib
    }
}
