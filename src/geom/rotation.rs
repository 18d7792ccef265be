//! Unit quaternions for accumulated plane rotations.
//!
//! Convention: right-handed. A positive angle about `axis` turns vectors
//! counter-clockwise when looking down the axis towards the origin, so
//! rotating `Y` by +90° about `Z` yields `-X`.

use std::ops::Mul;

use super::core::{Tolerance, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[must_use]
    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Rotation of `radians` about `axis`. The axis does not have to be unit
    /// length; `None` when it is (near) zero.
    #[must_use]
    pub fn from_axis_angle(axis: Vec3, radians: f64) -> Option<Self> {
        let axis = axis.normalized_with(Tolerance::ZERO_LENGTH)?;
        if !radians.is_finite() {
            return None;
        }
        let half = radians * 0.5;
        let sin_half = half.sin();
        Some(Self::new(
            half.cos(),
            axis.x * sin_half,
            axis.y * sin_half,
            axis.z * sin_half,
        ))
    }

    #[must_use]
    pub fn from_axis_degrees(axis: Vec3, degrees: f64) -> Option<Self> {
        Self::from_axis_angle(axis, degrees.to_radians())
    }

    /// Hamilton product `self * rhs`: applying the result rotates by `rhs`
    /// first, then by `self`.
    #[must_use]
    pub fn compose(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }

    #[must_use]
    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    #[must_use]
    pub fn norm(self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Renormalize to counter drift after many compositions.
    #[must_use]
    pub fn normalized(self) -> Self {
        let n = self.norm();
        if n.is_finite() && n > 0.0 {
            Self::new(self.w / n, self.x / n, self.y / n, self.z / n)
        } else {
            Self::IDENTITY
        }
    }

    #[must_use]
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let q = Vec3::new(self.x, self.y, self.z);
        let uv = q.cross(v);
        let uuv = q.cross(uv);
        v + uv * (2.0 * self.w) + uuv * 2.0
    }

    /// Rotation angle in degrees, in `[0, 360]`.
    #[must_use]
    pub fn angle_degrees(self) -> f64 {
        let w = self.normalized().w.clamp(-1.0, 1.0);
        (2.0 * w.acos()).to_degrees()
    }
}

impl Mul for Quaternion {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}
