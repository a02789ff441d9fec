//! Smoothed follow camera and world-space view bounds
//!
//! The camera chases a target point with a frame-rate-independent lerp. The
//! simulation only ever reads `bounds()`; nothing inside component updates
//! mutates camera state.

use glam::Vec2;

/// Default follow smoothing per 60 Hz frame.
const FOLLOW_SMOOTHING: f32 = 0.15;

/// World-space rectangle. `top` is the upstream (smaller y) edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl ViewRect {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Grow the rect by `margin_x` horizontally and `margin_y` vertically on
    /// every side.
    pub fn expanded(&self, margin_x: f32, margin_y: f32) -> ViewRect {
        ViewRect {
            left: self.left - margin_x,
            right: self.right + margin_x,
            top: self.top - margin_y,
            bottom: self.bottom + margin_y,
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }
}

/// Follow camera centered on a smoothed copy of its target.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec2,
    target: Vec2,
    half_width: f32,
    half_height: f32,
}

impl Camera {
    pub fn new(start: Vec2, view_width: f32, view_height: f32) -> Self {
        Self {
            position: start,
            target: start,
            half_width: view_width / 2.0,
            half_height: view_height / 2.0,
        }
    }

    pub fn set_target(&mut self, target: Vec2) {
        self.target = target;
    }

    /// Move toward the target. `dt` is in 60 Hz frames so the smoothing is
    /// identical at any real frame rate.
    pub fn update(&mut self, dt: f32) {
        let t = 1.0 - (1.0 - FOLLOW_SMOOTHING).powf(dt);
        self.position += (self.target - self.position) * t;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Snap straight to the target, bypassing smoothing. Used on restart.
    pub fn snap_to_target(&mut self) {
        self.position = self.target;
    }

    pub fn bounds(&self) -> ViewRect {
        ViewRect {
            left: self.position.x - self.half_width,
            right: self.position.x + self.half_width,
            top: self.position.y - self.half_height,
            bottom: self.position.y + self.half_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_converges_on_target() {
        let mut cam = Camera::new(Vec2::ZERO, 1000.0, 1000.0);
        cam.set_target(Vec2::new(0.0, -500.0));
        for _ in 0..300 {
            cam.update(1.0);
        }
        assert!((cam.position().y - -500.0).abs() < 1.0);
    }

    #[test]
    fn test_smoothing_is_framerate_independent() {
        // One dt=2 step must equal two dt=1 steps
        let mut a = Camera::new(Vec2::ZERO, 1000.0, 1000.0);
        let mut b = a.clone();
        a.set_target(Vec2::new(100.0, -300.0));
        b.set_target(Vec2::new(100.0, -300.0));
        a.update(2.0);
        b.update(1.0);
        b.update(1.0);
        assert!((a.position() - b.position()).length() < 1e-3);
    }

    #[test]
    fn test_bounds_centered_on_position() {
        let cam = Camera::new(Vec2::new(500.0, -200.0), 1000.0, 800.0);
        let view = cam.bounds();
        assert_eq!(view.left, 0.0);
        assert_eq!(view.right, 1000.0);
        assert_eq!(view.top, -600.0);
        assert_eq!(view.bottom, 200.0);
        assert_eq!(view.width(), 1000.0);
        assert_eq!(view.height(), 800.0);
    }

    #[test]
    fn test_expanded_rect_contains() {
        let view = ViewRect {
            left: 0.0,
            right: 100.0,
            top: 0.0,
            bottom: 100.0,
        };
        let big = view.expanded(0.0, 100.0);
        assert!(!view.contains(Vec2::new(50.0, 150.0)));
        assert!(big.contains(Vec2::new(50.0, 150.0)));
    }
}
