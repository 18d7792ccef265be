//! Anterior and lateral reference lines.

use super::core::{Point3, Tolerance, Vec3};
use super::line::ReferenceLine;
use crate::error::{PlanError, PlanResult};

/// Visual length of both reference lines in the planning scene.
pub const DEFAULT_REFERENCE_LENGTH: f64 = 0.1;

/// Result of [`lateral_line`]; `used_fallback` is set when the plane normal
/// had to stand in for a degenerate cross product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LateralLine {
    pub line: ReferenceLine,
    pub used_fallback: bool,
}

/// Line at `landmark` perpendicular to both the reference direction and the
/// direction towards the viewer: `normalize(reference × (view - landmark))`.
pub fn anterior_line(
    landmark: Point3,
    reference: Vec3,
    view_position: Point3,
    length: f64,
    tol: Tolerance,
) -> PlanResult<ReferenceLine> {
    if !landmark.is_finite() || !view_position.is_finite() || !reference.is_finite() {
        return Err(PlanError::degenerate("anterior line inputs must be finite"));
    }
    let reference = reference
        .normalized_with(Tolerance::ZERO_LENGTH)
        .ok_or_else(|| PlanError::degenerate("reference direction has zero length"))?;
    let view = (view_position - landmark)
        .normalized_with(Tolerance::ZERO_LENGTH)
        .ok_or_else(|| PlanError::degenerate("view position coincides with the landmark"))?;
    let direction = reference.cross(view).normalized_with(tol).ok_or_else(|| {
        PlanError::degenerate("reference direction is parallel to the view direction")
    })?;

    Ok(ReferenceLine {
        origin: landmark,
        direction,
        length,
    })
}

/// Line at `origin` lying in the plane with `plane_normal`, perpendicular to
/// the anterior direction: `normalize(plane_normal × anterior)`.
///
/// When the cross product vanishes the normal itself is used. That line is
/// not perpendicular to the anterior direction, so the result is flagged and
/// a warning is logged.
pub fn lateral_line(
    origin: Point3,
    plane_normal: Vec3,
    anterior: Vec3,
    length: f64,
    tol: Tolerance,
) -> PlanResult<LateralLine> {
    let normal = plane_normal
        .normalized_with(Tolerance::ZERO_LENGTH)
        .ok_or_else(|| PlanError::degenerate("plane normal has zero length"))?;
    let anterior = anterior
        .normalized_with(Tolerance::ZERO_LENGTH)
        .ok_or_else(|| PlanError::degenerate("anterior direction has zero length"))?;

    let (direction, used_fallback) = match normal.cross(anterior).normalized_with(tol) {
        Some(direction) => (direction, false),
        None => {
            log::warn!(
                "lateral line: plane normal is parallel to the anterior direction, \
                 falling back to the normal ({:?})",
                normal.to_array()
            );
            (normal, true)
        }
    };

    Ok(LateralLine {
        line: ReferenceLine {
            origin,
            direction,
            length,
        },
        used_fallback,
    })
}
