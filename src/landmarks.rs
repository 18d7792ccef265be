//! Named landmarks and the store holding their finalized positions.

use std::fmt;

use serde::Serialize;

use crate::error::{PlanError, PlanResult};
use crate::geom::Point3;

pub const LANDMARK_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Landmark {
    FemurCenter,
    HipCenter,
    FemurProximalCanal,
    FemurDistalCanal,
    MedialEpicondyle,
    LateralEpicondyle,
    DistalMedialPoint,
    DistalLateralPoint,
    PosteriorMedialPoint,
    PosteriorLateralPoint,
}

impl Landmark {
    pub const ALL: [Self; LANDMARK_COUNT] = [
        Self::FemurCenter,
        Self::HipCenter,
        Self::FemurProximalCanal,
        Self::FemurDistalCanal,
        Self::MedialEpicondyle,
        Self::LateralEpicondyle,
        Self::DistalMedialPoint,
        Self::DistalLateralPoint,
        Self::PosteriorMedialPoint,
        Self::PosteriorLateralPoint,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> PlanResult<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(PlanError::IndexOutOfRange {
                index,
                max: LANDMARK_COUNT,
            })
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FemurCenter => "Femur center",
            Self::HipCenter => "Hip center",
            Self::FemurProximalCanal => "Femur Proximal Canal",
            Self::FemurDistalCanal => "Femur Distal Canal",
            Self::MedialEpicondyle => "Medial Epicondyle",
            Self::LateralEpicondyle => "Lateral Epicondyle",
            Self::DistalMedialPoint => "Distal Medial Point",
            Self::DistalLateralPoint => "Distal Lateral Point",
            Self::PosteriorMedialPoint => "Posterior Medial Point",
            Self::PosteriorLateralPoint => "Posterior Lateral Point",
        }
    }

    /// RGB color hint for the landmark marker.
    #[must_use]
    pub const fn color(self) -> u32 {
        match self {
            Self::FemurCenter => 0xff0000,
            Self::HipCenter => 0x00ff00,
            Self::FemurProximalCanal => 0x0000ff,
            Self::FemurDistalCanal => 0xffff00,
            Self::MedialEpicondyle => 0xff00ff,
            Self::LateralEpicondyle => 0x00ffff,
            Self::DistalMedialPoint => 0xffa500,
            Self::DistalLateralPoint => 0x800080,
            Self::PosteriorMedialPoint => 0x008080,
            Self::PosteriorLateralPoint => 0x808080,
        }
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The anatomical axes drawn between landmark pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AxisKind {
    Mechanical,
    Anatomical,
    TransEpicondylar,
    DistalCondylar,
    PosteriorCondylar,
}

impl AxisKind {
    pub const ALL: [Self; 5] = [
        Self::Mechanical,
        Self::Anatomical,
        Self::TransEpicondylar,
        Self::DistalCondylar,
        Self::PosteriorCondylar,
    ];

    #[must_use]
    pub const fn endpoints(self) -> (Landmark, Landmark) {
        match self {
            Self::Mechanical => (Landmark::FemurCenter, Landmark::HipCenter),
            Self::Anatomical => (Landmark::FemurProximalCanal, Landmark::FemurDistalCanal),
            Self::TransEpicondylar => (Landmark::MedialEpicondyle, Landmark::LateralEpicondyle),
            Self::DistalCondylar => (Landmark::DistalMedialPoint, Landmark::DistalLateralPoint),
            Self::PosteriorCondylar => {
                (Landmark::PosteriorMedialPoint, Landmark::PosteriorLateralPoint)
            }
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mechanical => "Mechanical Axis",
            Self::Anatomical => "Anatomical Axis",
            Self::TransEpicondylar => "Trans epicondyle Axis(TEA)",
            Self::DistalCondylar => "Distal condyle Axis",
            Self::PosteriorCondylar => "Posterior condyle Axis(PCA)",
        }
    }

    #[must_use]
    pub const fn color(self) -> u32 {
        match self {
            Self::Mechanical => 0xff0000,
            Self::Anatomical => 0x00ff00,
            Self::TransEpicondylar => 0x0000ff,
            Self::DistalCondylar => 0xffa500,
            Self::PosteriorCondylar => 0xffff00,
        }
    }

    #[must_use]
    pub fn uses(self, landmark: Landmark) -> bool {
        let (a, b) = self.endpoints();
        a == landmark || b == landmark
    }
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Finalized landmark positions, at most one per landmark.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkStore {
    positions: [Option<Point3>; LANDMARK_COUNT],
}

impl LandmarkStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the position at `index` and return the previous one.
    pub fn set(&mut self, index: usize, position: Point3) -> PlanResult<Option<Point3>> {
        let landmark = Landmark::from_index(index)?;
        if !position.is_finite() {
            return Err(PlanError::degenerate(format!(
                "{landmark} position must be finite"
            )));
        }
        Ok(self.positions[landmark.index()].replace(position))
    }

    pub fn get_index(&self, index: usize) -> PlanResult<Option<Point3>> {
        Landmark::from_index(index).map(|landmark| self.get(landmark))
    }

    #[must_use]
    pub fn get(&self, landmark: Landmark) -> Option<Point3> {
        self.positions[landmark.index()]
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_some()).count()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.count() == LANDMARK_COUNT
    }

    /// Landmarks without a position, in index order.
    #[must_use]
    pub fn missing(&self) -> Vec<Landmark> {
        Landmark::ALL
            .into_iter()
            .filter(|landmark| self.get(*landmark).is_none())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Landmark, Point3)> + '_ {
        Landmark::ALL
            .into_iter()
            .filter_map(|landmark| self.get(landmark).map(|p| (landmark, p)))
    }

    pub fn clear(&mut self) {
        self.positions = [None; LANDMARK_COUNT];
    }
}
