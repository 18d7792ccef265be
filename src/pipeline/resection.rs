//! Scalar resection depth along a fixed world direction.

use crate::geom::{Point3, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResectionOffset {
    distance: f64,
    visible: bool,
}

impl ResectionOffset {
    /// Offset at `distance` (clamped), visible.
    #[must_use]
    pub fn new(distance: f64) -> Self {
        let mut offset = Self {
            distance: 0.0,
            visible: true,
        };
        offset.set_offset(distance);
        offset
    }

    #[must_use]
    pub const fn distance(&self) -> f64 {
        self.distance
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Set the depth; negative values clamp to zero. Non-finite values are ignored.
    pub fn set_offset(&mut self, distance: f64) -> f64 {
        if distance.is_finite() {
            self.distance = clamp_depth(distance);
        }
        self.distance
    }

    /// Apply a relative step through the same clamp.
    pub fn adjust(&mut self, delta: f64) -> f64 {
        self.set_offset(self.distance + delta)
    }

    pub fn toggle_visible(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    #[must_use]
    pub fn position(&self, base: Point3, direction: Vec3) -> Point3 {
        recompute_position(base, direction, self.distance)
    }
}

/// `base + direction * distance`.
#[must_use]
pub fn recompute_position(base: Point3, direction: Vec3, distance: f64) -> Point3 {
    base + direction * distance
}

fn clamp_depth(value: f64) -> f64 {
    value.max(0.0)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    #[test]
    fn steps_accumulate_from_default_depth() {
        let mut offset = ResectionOffset::new(0.1);
        for _ in 0..3 {
            offset.adjust(0.01);
        }
        for _ in 0..5 {
            offset.adjust(-0.01);
        }
        assert!((offset.distance() - 0.08).abs() < 1e-12);
    }

    #[test]
    fn depth_never_goes_negative() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut offset = ResectionOffset::new(0.1);
        for _ in 0..500 {
            let step = rng.random_range(-0.05..0.03);
            offset.adjust(step);
            assert!(offset.distance() >= 0.0);
        }
        assert_eq!(ResectionOffset::new(-3.0).distance(), 0.0);
    }

    #[test]
    fn toggle_keeps_distance() {
        let mut offset = ResectionOffset::new(0.25);
        assert!(offset.is_visible());
        assert!(!offset.toggle_visible());
        assert_eq!(offset.distance(), 0.25);
        assert!(offset.toggle_visible());
    }

    #[test]
    fn non_finite_depth_is_ignored() {
        let mut offset = ResectionOffset::new(0.1);
        offset.set_offset(f64::NAN);
        assert_eq!(offset.distance(), 0.1);
    }

    #[test]
    fn position_moves_along_direction() {
        let base = Point3::new(1.0, 2.0, 3.0);
        let moved = recompute_position(base, Vec3::Y, 0.1);
        assert!((moved.y - 2.1).abs() < 1e-12);
        assert_eq!(moved.x, 1.0);
        assert_eq!(ResectionOffset::new(0.0).position(base, Vec3::Y), base);
    }
}
