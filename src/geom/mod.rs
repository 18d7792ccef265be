mod core;
mod line;
mod plane;
mod reference;
mod rotation;

pub use core::{Point3, Tolerance, Vec3};
pub use line::{Axis, ReferenceLine, build_axis, build_axis_with_tolerance};
pub use plane::{
    DEFAULT_PLANE_EXTENT, Plane, PlaneVisual, apply_rotation, build_plane,
    build_plane_with_extent, derive_plane, project_point, project_segment,
    project_segment_with_tolerance, rotate_plane,
};
pub use reference::{DEFAULT_REFERENCE_LENGTH, LateralLine, anterior_line, lateral_line};
pub use rotation::Quaternion;
