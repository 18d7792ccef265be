//! Planner configuration.
//!
//! Every field has the value used by the planning scene it was calibrated
//! against, so an empty object (or `PlannerConfig::default()`) is a valid
//! configuration.

use serde::Deserialize;

use crate::error::{PlanError, PlanResult};
use crate::geom::{DEFAULT_PLANE_EXTENT, DEFAULT_REFERENCE_LENGTH, Point3, Tolerance, Vec3};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlannerConfig {
    /// Side length of every plane quad.
    pub plane_extent: f64,
    /// Visual length of the anterior and lateral lines.
    pub reference_line_length: f64,
    pub axis_radius: f64,
    pub projected_line_radius: f64,
    /// Increment used by the rotate actions, in degrees.
    pub rotation_step_degrees: f64,
    pub resection_step: f64,
    pub initial_resection: f64,
    /// World direction along which resection depth is measured.
    pub resection_direction: Vec3,
    /// Initial observer position used for the anterior line.
    pub view_position: Point3,
    /// Threshold for parallel-vector checks.
    pub tolerance: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            plane_extent: DEFAULT_PLANE_EXTENT,
            reference_line_length: DEFAULT_REFERENCE_LENGTH,
            axis_radius: 0.01,
            projected_line_radius: 0.02,
            rotation_step_degrees: 5.0,
            resection_step: 0.01,
            initial_resection: 0.1,
            resection_direction: Vec3::Y,
            view_position: Point3::new(0.0, 0.0, 5.0),
            tolerance: Tolerance::DEFAULT.eps,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> PlanResult<()> {
        let positive = [
            ("planeExtent", self.plane_extent),
            ("referenceLineLength", self.reference_line_length),
            ("axisRadius", self.axis_radius),
            ("projectedLineRadius", self.projected_line_radius),
            ("rotationStepDegrees", self.rotation_step_degrees),
            ("resectionStep", self.resection_step),
            ("tolerance", self.tolerance),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlanError::InvalidConfig(format!(
                    "`{name}` must be a positive number, got {value}"
                )));
            }
        }

        if !self.initial_resection.is_finite() || self.initial_resection < 0.0 {
            return Err(PlanError::InvalidConfig(format!(
                "`initialResection` must be >= 0, got {}",
                self.initial_resection
            )));
        }
        if self
            .resection_direction
            .normalized_with(Tolerance::ZERO_LENGTH)
            .is_none()
        {
            return Err(PlanError::InvalidConfig(
                "`resectionDirection` must be a finite non-zero vector".to_owned(),
            ));
        }
        if !self.view_position.is_finite() {
            return Err(PlanError::InvalidConfig(
                "`viewPosition` must be finite".to_owned(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn tolerance(&self) -> Tolerance {
        Tolerance::new(self.tolerance)
    }

    /// Unit resection direction. Falls back to world up for configs that
    /// skipped [`PlannerConfig::validate`].
    #[must_use]
    pub fn resection_unit(&self) -> Vec3 {
        self.resection_direction.normalized().unwrap_or(Vec3::Y)
    }
}
