//! River path field: procedural bank boundary and interpolated sampling
//!
//! The river's navigable corridor is defined by boundary samples at fixed
//! vertical steps. Each sample is a pure function of its integer segment
//! index, so the river shape is fully reproducible for a given index and
//! the fallback path (query outside the cached window) generates exactly
//! what the segment manager would have.

use std::collections::BTreeMap;

use crate::consts::SEGMENT_HEIGHT;
use crate::segment_index;

/// One procedurally generated slice of the river boundary.
///
/// `min_gap` oscillates inside [400, 500] by construction; the formula must
/// never be retuned so that it can reach zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundarySample {
    pub y: f32,
    pub left_curve: f32,
    pub right_curve: f32,
    pub min_gap: f32,
}

/// Interpolated boundary data at an arbitrary world y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub left: f32,
    pub right: f32,
    pub curve: f32,
    pub width: f32,
}

impl PathSample {
    /// Horizontal center of the corridor at this y.
    #[inline]
    pub fn center(&self) -> f32 {
        (self.left + self.right) / 2.0
    }
}

/// Cache of boundary samples plus the procedural generator behind them.
#[derive(Debug, Clone)]
pub struct PathField {
    samples: BTreeMap<i64, BoundarySample>,
    center_x: f32,
    curve_speed: f32,
    base_width: f32,
}

impl PathField {
    pub fn new(center_x: f32, curve_speed: f32, base_width: f32) -> Self {
        Self {
            samples: BTreeMap::new(),
            center_x,
            curve_speed,
            base_width,
        }
    }

    /// Procedurally generate the boundary sample for a segment index.
    ///
    /// Three sine octaves plus three high-frequency bumps, seeded only by the
    /// integer index. Width is an independent single sine on a positive base.
    pub fn generate(&self, index: i64) -> BoundarySample {
        let i = index as f32;
        let k = self.curve_speed;
        let curve = (i * k).sin() * 80.0
            + (i * k * 2.3).sin() * 30.0
            + (i * k * 0.5).sin() * 50.0
            + (i * 1.7).sin() * 15.0
            + (i * 3.2).cos() * 10.0
            + (i * 0.87).sin() * 20.0;
        let width = (i * 0.1).sin() * 50.0 + self.base_width;
        BoundarySample {
            y: i * SEGMENT_HEIGHT,
            left_curve: curve,
            right_curve: curve,
            min_gap: width,
        }
    }

    fn to_path(&self, s: &BoundarySample) -> PathSample {
        PathSample {
            left: self.center_x - s.min_gap / 2.0 + s.left_curve,
            right: self.center_x + s.min_gap / 2.0 + s.right_curve,
            curve: s.left_curve,
            width: s.min_gap,
        }
    }

    /// Boundary data at `y`, interpolated between the two bracketing samples.
    ///
    /// If only one bracket is cached it is returned unmodified; if neither
    /// is, the procedural formula is evaluated directly so queries outside
    /// the active window stay continuous with what the cache would hold.
    pub fn sample_at(&self, y: f32) -> PathSample {
        let i0 = segment_index(y);
        let i1 = i0 + 1;

        match (self.samples.get(&i0), self.samples.get(&i1)) {
            (Some(a), Some(b)) => {
                let p0 = self.to_path(a);
                let p1 = self.to_path(b);
                let t = (y - a.y) / SEGMENT_HEIGHT;
                PathSample {
                    left: p0.left + (p1.left - p0.left) * t,
                    right: p0.right + (p1.right - p0.right) * t,
                    curve: p0.curve + (p1.curve - p0.curve) * t,
                    width: p0.width + (p1.width - p0.width) * t,
                }
            }
            (Some(a), None) => self.to_path(a),
            (None, Some(b)) => self.to_path(b),
            (None, None) => self.to_path(&self.generate(i0)),
        }
    }

    /// Insert a sample at its index. Exclusive to the segment manager.
    pub(crate) fn insert(&mut self, index: i64, sample: BoundarySample) {
        self.samples.insert(index, sample);
    }

    pub(crate) fn contains(&self, index: i64) -> bool {
        self.samples.contains_key(&index)
    }

    /// Drop every sample whose index fails the predicate, returning how many
    /// were retired.
    pub(crate) fn retain<F: FnMut(i64) -> bool>(&mut self, mut keep: F) -> usize {
        let before = self.samples.len();
        self.samples.retain(|&i, _| keep(i));
        before - self.samples.len()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}
