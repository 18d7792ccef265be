//! Typed slots for every derived artifact.

use crate::error::{PlanError, PlanResult};
use crate::geom::{Axis, LateralLine, Plane, ReferenceLine};
use crate::landmarks::AxisKind;

/// The anatomical axes. The mechanical axis is always present; every other
/// pairing is built on its own and may be missing when its landmarks are
/// degenerate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSet {
    mechanical: Axis,
    anatomical: Option<Axis>,
    trans_epicondylar: Option<Axis>,
    distal_condylar: Option<Axis>,
    posterior_condylar: Option<Axis>,
}

impl AxisSet {
    /// Build every axis independently. Only a mechanical-axis failure is an
    /// error; the other failures come back alongside the set.
    pub(crate) fn try_build(
        mut build: impl FnMut(AxisKind) -> PlanResult<Axis>,
    ) -> PlanResult<(Self, Vec<(AxisKind, PlanError)>)> {
        let mechanical = build(AxisKind::Mechanical)?;
        let mut failures = Vec::new();
        let mut side = |kind: AxisKind| match build(kind) {
            Ok(axis) => Some(axis),
            Err(error) => {
                failures.push((kind, error));
                None
            }
        };
        let set = Self {
            mechanical,
            anatomical: side(AxisKind::Anatomical),
            trans_epicondylar: side(AxisKind::TransEpicondylar),
            distal_condylar: side(AxisKind::DistalCondylar),
            posterior_condylar: side(AxisKind::PosteriorCondylar),
        };
        Ok((set, failures))
    }

    #[must_use]
    pub const fn mechanical(&self) -> &Axis {
        &self.mechanical
    }

    #[must_use]
    pub const fn get(&self, kind: AxisKind) -> Option<&Axis> {
        match kind {
            AxisKind::Mechanical => Some(&self.mechanical),
            AxisKind::Anatomical => self.anatomical.as_ref(),
            AxisKind::TransEpicondylar => self.trans_epicondylar.as_ref(),
            AxisKind::DistalCondylar => self.distal_condylar.as_ref(),
            AxisKind::PosteriorCondylar => self.posterior_condylar.as_ref(),
        }
    }

    /// Present axes in [`AxisKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (AxisKind, &Axis)> + '_ {
        AxisKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|axis| (kind, axis)))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Artifacts {
    pub axes: Option<AxisSet>,
    pub mechanical_plane: Option<Plane>,
    pub tea_projection: Option<ReferenceLine>,
    pub anterior_line: Option<ReferenceLine>,
    pub valgus_plane: Option<Plane>,
    pub lateral_line: Option<LateralLine>,
    pub flexion_plane: Option<Plane>,
    pub distal_medial_plane: Option<Plane>,
    pub distal_resection_plane: Option<Plane>,
}

impl Artifacts {
    #[must_use]
    pub fn contains(&self, kind: super::ArtifactKind) -> bool {
        use super::ArtifactKind as K;
        match kind {
            K::Axes => self.axes.is_some(),
            K::MechanicalPlane => self.mechanical_plane.is_some(),
            K::TeaProjection => self.tea_projection.is_some(),
            K::AnteriorLine => self.anterior_line.is_some(),
            K::ValgusPlane => self.valgus_plane.is_some(),
            K::LateralLine => self.lateral_line.is_some(),
            K::FlexionPlane => self.flexion_plane.is_some(),
            K::DistalMedialPlane => self.distal_medial_plane.is_some(),
            K::DistalResectionPlane => self.distal_resection_plane.is_some(),
        }
    }

    /// Empty the slot; returns whether it held a value.
    pub fn remove(&mut self, kind: super::ArtifactKind) -> bool {
        use super::ArtifactKind as K;
        match kind {
            K::Axes => self.axes.take().is_some(),
            K::MechanicalPlane => self.mechanical_plane.take().is_some(),
            K::TeaProjection => self.tea_projection.take().is_some(),
            K::AnteriorLine => self.anterior_line.take().is_some(),
            K::ValgusPlane => self.valgus_plane.take().is_some(),
            K::LateralLine => self.lateral_line.take().is_some(),
            K::FlexionPlane => self.flexion_plane.take().is_some(),
            K::DistalMedialPlane => self.distal_medial_plane.take().is_some(),
            K::DistalResectionPlane => self.distal_resection_plane.take().is_some(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Store `value` in `slot` and report whether it differs from what was there.
pub(crate) fn replace_slot<T: PartialEq>(slot: &mut Option<T>, value: T) -> bool {
    let changed = slot.as_ref() != Some(&value);
    *slot = Some(value);
    changed
}
