//! Viewport export: one serializable item per landmark, axis, line and plane.

use serde::Serialize;

use crate::geom::{Axis, Plane, Point3, ReferenceLine};
use crate::landmarks::{AxisKind, Landmark};

pub const PLANE_COLOR: u32 = 0x00ff00;
pub const PROJECTED_TEA_COLOR: u32 = 0xff0000;
pub const ANTERIOR_LINE_COLOR: u32 = 0x0000ff;
pub const LATERAL_LINE_COLOR: u32 = 0x00ffff;

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum RenderItem {
    Point {
        name: String,
        coordinates: [f64; 3],
        color: u32,
    },
    Axis {
        name: String,
        start: [f64; 3],
        end: [f64; 3],
        direction: [f64; 3],
        radius: f64,
        color: u32,
    },
    Line {
        name: String,
        start: [f64; 3],
        end: [f64; 3],
        direction: [f64; 3],
        radius: f64,
        color: u32,
    },
    Plane {
        name: String,
        center: [f64; 3],
        normal: [f64; 3],
        corners: [[f64; 3]; 4],
        extent: f64,
        color: u32,
        visible: bool,
    },
}

impl RenderItem {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Point { name, .. }
            | Self::Axis { name, .. }
            | Self::Line { name, .. }
            | Self::Plane { name, .. } => name,
        }
    }

    #[must_use]
    pub fn landmark(landmark: Landmark, position: Point3) -> Self {
        Self::Point {
            name: landmark.name().to_owned(),
            coordinates: position.to_array(),
            color: landmark.color(),
        }
    }

    #[must_use]
    pub fn axis(kind: AxisKind, axis: &Axis, radius: f64) -> Self {
        Self::Axis {
            name: kind.name().to_owned(),
            start: axis.start.to_array(),
            end: axis.end.to_array(),
            direction: axis.direction.to_array(),
            radius,
            color: kind.color(),
        }
    }

    #[must_use]
    pub fn line(name: &str, line: &ReferenceLine, radius: f64, color: u32) -> Self {
        Self::Line {
            name: name.to_owned(),
            start: line.origin.to_array(),
            end: line.end().to_array(),
            direction: line.direction.to_array(),
            radius,
            color,
        }
    }

    #[must_use]
    pub fn plane(name: &str, plane: &Plane, visible: bool) -> Self {
        let visual = plane.visual();
        Self::Plane {
            name: name.to_owned(),
            center: visual.center.to_array(),
            normal: visual.normal.to_array(),
            corners: visual.corners.map(Point3::to_array),
            extent: visual.extent,
            color: PLANE_COLOR,
            visible,
        }
    }
}
