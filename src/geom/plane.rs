//! Reference planes: construction, projection, rotation and duplication.
//!
//! A [`Plane`] is the authoritative mathematical object. Its [`PlaneVisual`]
//! is recomputed from it on demand and never fed back into the math.

use super::core::{Point3, Tolerance, Vec3};
use super::line::ReferenceLine;
use super::rotation::Quaternion;
use crate::error::{PlanError, PlanResult};

/// Side length of the square drawn for a plane when nothing else is configured.
pub const DEFAULT_PLANE_EXTENT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub origin: Point3,
    /// Unit normal.
    pub normal: Vec3,
    /// Unit in-plane direction; `normal × x_axis` gives the second in-plane axis.
    pub x_axis: Vec3,
    /// Rotation accumulated since the plane was built or derived.
    pub rotation: Quaternion,
    /// Side length of the visual quad.
    pub extent: f64,
}

impl Plane {
    #[must_use]
    pub fn y_axis(&self) -> Vec3 {
        self.normal.cross(self.x_axis)
    }

    #[must_use]
    pub fn signed_distance(&self, point: Point3) -> f64 {
        (point - self.origin).dot(self.normal)
    }

    #[must_use]
    pub fn project(&self, point: Point3) -> Point3 {
        project_point(point, self)
    }

    #[must_use]
    pub fn visual(&self) -> PlaneVisual {
        PlaneVisual::from_plane(self)
    }
}

/// Bounded square used to draw a plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneVisual {
    pub center: Point3,
    pub normal: Vec3,
    pub u_axis: Vec3,
    pub v_axis: Vec3,
    pub extent: f64,
    /// Counter-clockwise when viewed from the normal side.
    pub corners: [Point3; 4],
}

impl PlaneVisual {
    #[must_use]
    pub fn from_plane(plane: &Plane) -> Self {
        let u = plane.x_axis;
        let v = plane.y_axis();
        let half = plane.extent * 0.5;
        let c = plane.origin;
        let corners = [
            c + u * -half + v * -half,
            c + u * half + v * -half,
            c + u * half + v * half,
            c + u * -half + v * half,
        ];
        Self {
            center: c,
            normal: plane.normal,
            u_axis: u,
            v_axis: v,
            extent: plane.extent,
            corners,
        }
    }
}

pub fn build_plane(origin: Point3, normal_seed: Vec3) -> PlanResult<Plane> {
    build_plane_with_extent(origin, normal_seed, DEFAULT_PLANE_EXTENT, Tolerance::ZERO_LENGTH)
}

pub fn build_plane_with_extent(
    origin: Point3,
    normal_seed: Vec3,
    extent: f64,
    tol: Tolerance,
) -> PlanResult<Plane> {
    if !origin.is_finite() || !normal_seed.is_finite() {
        return Err(PlanError::degenerate("plane origin and normal must be finite"));
    }
    if !extent.is_finite() || extent <= 0.0 {
        return Err(PlanError::degenerate("plane extent must be positive"));
    }
    let normal = normal_seed
        .normalized_with(tol)
        .ok_or_else(|| PlanError::degenerate("plane normal has zero length"))?;
    let x_axis = normal
        .any_perpendicular()
        .ok_or_else(|| PlanError::degenerate("plane normal has zero length"))?;

    Ok(Plane {
        origin,
        normal,
        x_axis,
        rotation: Quaternion::IDENTITY,
        extent,
    })
}

/// Orthogonal projection of `point` onto `plane`.
#[must_use]
pub fn project_point(point: Point3, plane: &Plane) -> Point3 {
    point - plane.normal * plane.signed_distance(point)
}

/// Project both endpoints onto `plane` and return the segment between them.
pub fn project_segment(a: Point3, b: Point3, plane: &Plane) -> PlanResult<ReferenceLine> {
    project_segment_with_tolerance(a, b, plane, Tolerance::ZERO_LENGTH)
}

pub fn project_segment_with_tolerance(
    a: Point3,
    b: Point3,
    plane: &Plane,
    tol: Tolerance,
) -> PlanResult<ReferenceLine> {
    if !a.is_finite() || !b.is_finite() {
        return Err(PlanError::degenerate("segment endpoints must be finite"));
    }
    let pa = project_point(a, plane);
    let pb = project_point(b, plane);
    let delta = pb - pa;
    let length = delta.length();
    if tol.is_zero_length(length) {
        return Err(PlanError::degenerate(
            "segment projects to a single point on the plane",
        ));
    }

    Ok(ReferenceLine {
        origin: pa,
        direction: delta * (1.0 / length),
        length,
    })
}

/// Rotate `plane` about `axis` by `degrees`, composing onto its accumulated
/// rotation. The origin stays fixed.
pub fn rotate_plane(plane: &Plane, axis: Vec3, degrees: f64) -> PlanResult<Plane> {
    let step = Quaternion::from_axis_degrees(axis, degrees).ok_or_else(|| {
        PlanError::degenerate("rotation axis must be non-zero and the angle finite")
    })?;
    Ok(apply_rotation(plane, step))
}

/// Apply an already composed rotation to `plane`.
#[must_use]
pub fn apply_rotation(plane: &Plane, rotation: Quaternion) -> Plane {
    let normal = rotation.rotate(plane.normal);
    let x_axis = rotation.rotate(plane.x_axis);
    Plane {
        origin: plane.origin,
        normal: normal.normalized().unwrap_or(plane.normal),
        x_axis: x_axis.normalized().unwrap_or(plane.x_axis),
        rotation: (rotation * plane.rotation).normalized(),
        extent: plane.extent,
    }
}

/// Copy orientation and extent of `source`; move the origin to `through` when
/// given. The copy starts with an identity rotation of its own.
pub fn derive_plane(source: &Plane, through: Option<Point3>) -> PlanResult<Plane> {
    let origin = match through {
        Some(point) if !point.is_finite() => {
            return Err(PlanError::degenerate("anchor point must be finite"));
        }
        Some(point) => point,
        None => source.origin,
    };

    Ok(Plane {
        origin,
        normal: source.normal,
        x_axis: source.x_axis,
        rotation: Quaternion::IDENTITY,
        extent: source.extent,
    })
}
