use super::core::{Point3, Tolerance, Vec3};
use crate::error::{PlanError, PlanResult};

/// Directed segment between two landmark positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    pub start: Point3,
    pub end: Point3,
    /// Unit vector from `start` to `end`.
    pub direction: Vec3,
    pub length: f64,
}

impl Axis {
    #[must_use]
    pub fn midpoint(&self) -> Point3 {
        self.start.midpoint(self.end)
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
            direction: -self.direction,
            length: self.length,
        }
    }
}

/// Line anchored at `origin`, drawn along `direction` for `length` units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLine {
    pub origin: Point3,
    pub direction: Vec3,
    pub length: f64,
}

impl ReferenceLine {
    #[must_use]
    pub fn end(&self) -> Point3 {
        self.origin + self.direction * self.length
    }

    #[must_use]
    pub fn midpoint(&self) -> Point3 {
        self.origin.midpoint(self.end())
    }
}

pub fn build_axis(start: Point3, end: Point3) -> PlanResult<Axis> {
    build_axis_with_tolerance(start, end, Tolerance::ZERO_LENGTH)
}

pub fn build_axis_with_tolerance(start: Point3, end: Point3, tol: Tolerance) -> PlanResult<Axis> {
    if !start.is_finite() || !end.is_finite() {
        return Err(PlanError::degenerate("axis endpoints must be finite"));
    }

    let delta = end - start;
    let length = delta.length();
    if tol.is_zero_length(length) {
        return Err(PlanError::degenerate("axis endpoints coincide"));
    }

    Ok(Axis {
        start,
        end,
        direction: delta * (1.0 / length),
        length,
    })
}
