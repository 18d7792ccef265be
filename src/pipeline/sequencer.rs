//! Gate states, artifacts, actions and the dependency table between them.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use super::topo;
use crate::error::{PlanError, PlanResult};
use crate::landmarks::Landmark;

/// Linear chain of gates. The order of the variants is the order of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SequencerState {
    LandmarksIncomplete,
    AxesReady,
    MechPlaneReady,
    TeaProjected,
    AnteriorLineReady,
    ValgusPlaneReady,
    LateralLineReady,
    FlexionPlaneReady,
    DistalMedialReady,
    DistalResectionReady,
}

impl SequencerState {
    pub const ALL: [Self; 10] = [
        Self::LandmarksIncomplete,
        Self::AxesReady,
        Self::MechPlaneReady,
        Self::TeaProjected,
        Self::AnteriorLineReady,
        Self::ValgusPlaneReady,
        Self::LateralLineReady,
        Self::FlexionPlaneReady,
        Self::DistalMedialReady,
        Self::DistalResectionReady,
    ];

    /// Artifact whose presence puts the pipeline in this state.
    #[must_use]
    pub const fn artifact(self) -> Option<ArtifactKind> {
        match self {
            Self::LandmarksIncomplete => None,
            Self::AxesReady => Some(ArtifactKind::Axes),
            Self::MechPlaneReady => Some(ArtifactKind::MechanicalPlane),
            Self::TeaProjected => Some(ArtifactKind::TeaProjection),
            Self::AnteriorLineReady => Some(ArtifactKind::AnteriorLine),
            Self::ValgusPlaneReady => Some(ArtifactKind::ValgusPlane),
            Self::LateralLineReady => Some(ArtifactKind::LateralLine),
            Self::FlexionPlaneReady => Some(ArtifactKind::FlexionPlane),
            Self::DistalMedialReady => Some(ArtifactKind::DistalMedialPlane),
            Self::DistalResectionReady => Some(ArtifactKind::DistalResectionPlane),
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::DistalResectionReady)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LandmarksIncomplete => "LandmarksIncomplete",
            Self::AxesReady => "AxesReady",
            Self::MechPlaneReady => "MechPlaneReady",
            Self::TeaProjected => "TEAProjected",
            Self::AnteriorLineReady => "AnteriorLineReady",
            Self::ValgusPlaneReady => "ValgusPlaneReady",
            Self::LateralLineReady => "LateralLineReady",
            Self::FlexionPlaneReady => "FlexionPlaneReady",
            Self::DistalMedialReady => "DistalMedialReady",
            Self::DistalResectionReady => "DistalResectionReady",
        }
    }
}

impl fmt::Display for SequencerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SequencerState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|state| state.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown pipeline state `{trimmed}`"))
    }
}

/// Derived geometry held by the pipeline, one typed slot each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Axes,
    MechanicalPlane,
    TeaProjection,
    AnteriorLine,
    ValgusPlane,
    LateralLine,
    FlexionPlane,
    DistalMedialPlane,
    DistalResectionPlane,
}

impl ArtifactKind {
    pub const ALL: [Self; 9] = [
        Self::Axes,
        Self::MechanicalPlane,
        Self::TeaProjection,
        Self::AnteriorLine,
        Self::ValgusPlane,
        Self::LateralLine,
        Self::FlexionPlane,
        Self::DistalMedialPlane,
        Self::DistalResectionPlane,
    ];

    /// Artifacts read by this artifact's derivation.
    #[must_use]
    pub const fn predecessors(self) -> &'static [ArtifactKind] {
        match self {
            Self::Axes => &[],
            Self::MechanicalPlane => &[Self::Axes],
            Self::TeaProjection => &[Self::MechanicalPlane],
            Self::AnteriorLine => &[Self::TeaProjection, Self::MechanicalPlane],
            Self::ValgusPlane => &[Self::AnteriorLine, Self::MechanicalPlane],
            Self::LateralLine => &[Self::ValgusPlane, Self::AnteriorLine],
            Self::FlexionPlane => &[Self::LateralLine, Self::ValgusPlane],
            Self::DistalMedialPlane => &[Self::FlexionPlane],
            Self::DistalResectionPlane => &[Self::DistalMedialPlane],
        }
    }

    /// Landmarks read directly by this artifact's derivation.
    #[must_use]
    pub const fn landmark_inputs(self) -> &'static [Landmark] {
        match self {
            Self::Axes => &Landmark::ALL,
            Self::MechanicalPlane | Self::AnteriorLine => {
                &[Landmark::FemurCenter, Landmark::HipCenter]
            }
            Self::TeaProjection => &[Landmark::MedialEpicondyle, Landmark::LateralEpicondyle],
            Self::DistalMedialPlane => &[Landmark::DistalMedialPoint],
            Self::ValgusPlane
            | Self::LateralLine
            | Self::FlexionPlane
            | Self::DistalResectionPlane => &[],
        }
    }

    #[must_use]
    pub const fn state(self) -> SequencerState {
        match self {
            Self::Axes => SequencerState::AxesReady,
            Self::MechanicalPlane => SequencerState::MechPlaneReady,
            Self::TeaProjection => SequencerState::TeaProjected,
            Self::AnteriorLine => SequencerState::AnteriorLineReady,
            Self::ValgusPlane => SequencerState::ValgusPlaneReady,
            Self::LateralLine => SequencerState::LateralLineReady,
            Self::FlexionPlane => SequencerState::FlexionPlaneReady,
            Self::DistalMedialPlane => SequencerState::DistalMedialReady,
            Self::DistalResectionPlane => SequencerState::DistalResectionReady,
        }
    }

    /// Action that creates this artifact.
    #[must_use]
    pub const fn action(self) -> ActionKind {
        match self {
            Self::Axes => ActionKind::BuildAxes,
            Self::MechanicalPlane => ActionKind::CreateMechanicalPlane,
            Self::TeaProjection => ActionKind::ProjectTea,
            Self::AnteriorLine => ActionKind::CreateAnteriorLine,
            Self::ValgusPlane => ActionKind::CreateValgusPlane,
            Self::LateralLine => ActionKind::CreateLateralLine,
            Self::FlexionPlane => ActionKind::CreateFlexionPlane,
            Self::DistalMedialPlane => ActionKind::CreateDistalMedialPlane,
            Self::DistalResectionPlane => ActionKind::CreateDistalResectionPlane,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Axes => "axes",
            Self::MechanicalPlane => "mechanical axis plane",
            Self::TeaProjection => "projected TEA",
            Self::AnteriorLine => "anterior line",
            Self::ValgusPlane => "varus/valgus plane",
            Self::LateralLine => "lateral line",
            Self::FlexionPlane => "flexion/extension plane",
            Self::DistalMedialPlane => "distal medial plane",
            Self::DistalResectionPlane => "distal resection plane",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something an action needs before it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prerequisite {
    Landmark(Landmark),
    Artifact(ArtifactKind),
}

impl fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Landmark(landmark) => write!(f, "landmark `{landmark}`"),
            Self::Artifact(artifact) => write!(f, "the {artifact}"),
        }
    }
}

/// Operator actions exposed as control affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    BuildAxes,
    CreateMechanicalPlane,
    ProjectTea,
    CreateAnteriorLine,
    CreateValgusPlane,
    RotateValgusPlane,
    CreateLateralLine,
    CreateFlexionPlane,
    RotateFlexionPlane,
    CreateDistalMedialPlane,
    CreateDistalResectionPlane,
    AdjustResection,
    ToggleResectionPlane,
}

impl ActionKind {
    pub const ALL: [Self; 13] = [
        Self::BuildAxes,
        Self::CreateMechanicalPlane,
        Self::ProjectTea,
        Self::CreateAnteriorLine,
        Self::CreateValgusPlane,
        Self::RotateValgusPlane,
        Self::CreateLateralLine,
        Self::CreateFlexionPlane,
        Self::RotateFlexionPlane,
        Self::CreateDistalMedialPlane,
        Self::CreateDistalResectionPlane,
        Self::AdjustResection,
        Self::ToggleResectionPlane,
    ];

    /// Artifact created by this action, if it creates one.
    #[must_use]
    pub const fn produces(self) -> Option<ArtifactKind> {
        match self {
            Self::BuildAxes => Some(ArtifactKind::Axes),
            Self::CreateMechanicalPlane => Some(ArtifactKind::MechanicalPlane),
            Self::ProjectTea => Some(ArtifactKind::TeaProjection),
            Self::CreateAnteriorLine => Some(ArtifactKind::AnteriorLine),
            Self::CreateValgusPlane => Some(ArtifactKind::ValgusPlane),
            Self::CreateLateralLine => Some(ArtifactKind::LateralLine),
            Self::CreateFlexionPlane => Some(ArtifactKind::FlexionPlane),
            Self::CreateDistalMedialPlane => Some(ArtifactKind::DistalMedialPlane),
            Self::CreateDistalResectionPlane => Some(ArtifactKind::DistalResectionPlane),
            Self::RotateValgusPlane
            | Self::RotateFlexionPlane
            | Self::AdjustResection
            | Self::ToggleResectionPlane => None,
        }
    }

    /// Artifacts that must be present before the action can run.
    #[must_use]
    pub const fn requires(self) -> &'static [ArtifactKind] {
        match self {
            Self::RotateValgusPlane => &[ArtifactKind::ValgusPlane, ArtifactKind::AnteriorLine],
            Self::RotateFlexionPlane => &[ArtifactKind::FlexionPlane, ArtifactKind::LateralLine],
            Self::AdjustResection | Self::ToggleResectionPlane => {
                &[ArtifactKind::DistalResectionPlane]
            }
            Self::BuildAxes
            | Self::CreateMechanicalPlane
            | Self::ProjectTea
            | Self::CreateAnteriorLine
            | Self::CreateValgusPlane
            | Self::CreateLateralLine
            | Self::CreateFlexionPlane
            | Self::CreateDistalMedialPlane
            | Self::CreateDistalResectionPlane => match self.produces() {
                Some(artifact) => artifact.predecessors(),
                None => &[],
            },
        }
    }

    /// Whether the action stays live once the terminal state is reached.
    #[must_use]
    pub const fn live_when_terminal(self) -> bool {
        matches!(self, Self::AdjustResection | Self::ToggleResectionPlane)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BuildAxes => "build_axes",
            Self::CreateMechanicalPlane => "create_mechanical_plane",
            Self::ProjectTea => "project_tea",
            Self::CreateAnteriorLine => "create_anterior_line",
            Self::CreateValgusPlane => "create_valgus_plane",
            Self::RotateValgusPlane => "rotate_valgus_plane",
            Self::CreateLateralLine => "create_lateral_line",
            Self::CreateFlexionPlane => "create_flexion_plane",
            Self::RotateFlexionPlane => "rotate_flexion_plane",
            Self::CreateDistalMedialPlane => "create_distal_medial_plane",
            Self::CreateDistalResectionPlane => "create_distal_resection_plane",
            Self::AdjustResection => "adjust_resection",
            Self::ToggleResectionPlane => "toggle_resection_plane",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|action| action.name() == normalized)
            .ok_or_else(|| format!("unknown action `{}`", s.trim()))
    }
}

/// Validated artifact dependency graph with a fixed recomputation order.
#[derive(Debug, Clone)]
pub struct ArtifactGraph {
    order: Vec<ArtifactKind>,
    successors: BTreeMap<ArtifactKind, Vec<ArtifactKind>>,
}

impl ArtifactGraph {
    pub fn new() -> PlanResult<Self> {
        Self::from_table(&ArtifactKind::ALL, ArtifactKind::predecessors)
    }

    fn from_table(
        nodes: &[ArtifactKind],
        predecessors: impl Fn(ArtifactKind) -> &'static [ArtifactKind],
    ) -> PlanResult<Self> {
        let mut edges = Vec::new();
        let mut successors: BTreeMap<ArtifactKind, Vec<ArtifactKind>> = BTreeMap::new();
        for node in nodes {
            successors.entry(*node).or_default();
            for predecessor in predecessors(*node) {
                edges.push((*predecessor, *node));
                successors.entry(*predecessor).or_default().push(*node);
            }
        }

        let order = topo::sort(nodes, &edges).map_err(|cycle| {
            let chain = cycle
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" -> ");
            PlanError::Topology(chain)
        })?;

        log::debug!(
            "artifact order: {}",
            order
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" -> ")
        );

        Ok(Self { order, successors })
    }

    /// Topological order; every artifact appears after its predecessors.
    #[must_use]
    pub fn order(&self) -> &[ArtifactKind] {
        &self.order
    }

    /// Every artifact that transitively depends on `kind`, excluding `kind`.
    #[must_use]
    pub fn downstream(&self, kind: ArtifactKind) -> BTreeSet<ArtifactKind> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![kind];
        while let Some(node) = stack.pop() {
            if let Some(next) = self.successors.get(&node) {
                for successor in next {
                    if seen.insert(*successor) {
                        stack.push(*successor);
                    }
                }
            }
        }
        seen
    }

    /// Artifacts that read `landmark` directly.
    #[must_use]
    pub fn reading(&self, landmark: Landmark) -> BTreeSet<ArtifactKind> {
        self.order
            .iter()
            .copied()
            .filter(|kind| kind.landmark_inputs().contains(&landmark))
            .collect()
    }
}
