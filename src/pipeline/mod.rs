//! Planning pipeline: owns the landmark store and every derived artifact,
//! gates operator actions and keeps downstream geometry consistent when an
//! upstream input changes.
//!
//! Recomputation walks the artifact graph in topological order. An artifact
//! is re-derived when it reads a changed input directly or when one of its
//! predecessors produced a different value; a derivation that yields the same
//! value stops the propagation there.

mod artifacts;
mod render;
mod resection;
mod sequencer;
mod topo;

use std::collections::BTreeSet;
use std::mem;

pub use artifacts::{Artifacts, AxisSet};
pub use render::{
    ANTERIOR_LINE_COLOR, LATERAL_LINE_COLOR, PLANE_COLOR, PROJECTED_TEA_COLOR, RenderItem,
};
pub use resection::{ResectionOffset, recompute_position};
pub use sequencer::{ActionKind, ArtifactGraph, ArtifactKind, Prerequisite, SequencerState};

use crate::config::PlannerConfig;
use crate::error::{PlanError, PlanResult};
use crate::geom::{
    Point3, anterior_line, build_axis_with_tolerance, build_plane_with_extent, derive_plane,
    lateral_line, project_segment_with_tolerance, rotate_plane,
};
use crate::landmarks::{Landmark, LandmarkStore};
use artifacts::replace_slot;

/// Owned pipeline state. One instance per planning session.
#[derive(Debug, Clone)]
pub struct Planner {
    config: PlannerConfig,
    graph: ArtifactGraph,
    landmarks: LandmarkStore,
    artifacts: Artifacts,
    /// Accumulated valgus correction about the anterior direction.
    valgus_degrees: f64,
    /// Accumulated flexion correction about the lateral-line direction.
    flexion_degrees: f64,
    resection: ResectionOffset,
    view_position: Point3,
    status: Vec<String>,
}

impl Planner {
    pub fn new() -> PlanResult<Self> {
        Self::with_config(PlannerConfig::default())
    }

    pub fn with_config(config: PlannerConfig) -> PlanResult<Self> {
        config.validate()?;
        let graph = ArtifactGraph::new()?;
        Ok(Self {
            resection: ResectionOffset::new(config.initial_resection),
            view_position: config.view_position,
            config,
            graph,
            landmarks: LandmarkStore::new(),
            artifacts: Artifacts::default(),
            valgus_degrees: 0.0,
            flexion_degrees: 0.0,
            status: Vec::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    #[must_use]
    pub fn graph(&self) -> &ArtifactGraph {
        &self.graph
    }

    #[must_use]
    pub fn landmarks(&self) -> &LandmarkStore {
        &self.landmarks
    }

    #[must_use]
    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    #[must_use]
    pub fn resection(&self) -> &ResectionOffset {
        &self.resection
    }

    #[must_use]
    pub fn valgus_degrees(&self) -> f64 {
        self.valgus_degrees
    }

    #[must_use]
    pub fn flexion_degrees(&self) -> f64 {
        self.flexion_degrees
    }

    #[must_use]
    pub fn view_position(&self) -> Point3 {
        self.view_position
    }

    // ───────────────────────────────────────────────────────────────────────
    // Status
    // ───────────────────────────────────────────────────────────────────────

    /// Messages emitted since the last [`Planner::take_status`].
    #[must_use]
    pub fn status(&self) -> &[String] {
        &self.status
    }

    pub fn take_status(&mut self) -> Vec<String> {
        mem::take(&mut self.status)
    }

    fn narrate(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.status.push(message);
    }

    fn report(&mut self, error: PlanError) -> PlanError {
        log::warn!("{error}");
        self.status.push(format!("Error: {error}"));
        error
    }

    // ───────────────────────────────────────────────────────────────────────
    // Sequencing
    // ───────────────────────────────────────────────────────────────────────

    /// Furthest gate whose artifact is present.
    #[must_use]
    pub fn current_state(&self) -> SequencerState {
        ArtifactKind::ALL
            .into_iter()
            .rev()
            .find(|kind| self.artifacts.contains(*kind))
            .map_or(SequencerState::LandmarksIncomplete, ArtifactKind::state)
    }

    #[must_use]
    pub fn available_actions(&self) -> BTreeSet<ActionKind> {
        ActionKind::ALL
            .into_iter()
            .filter(|action| self.check(*action).is_ok())
            .collect()
    }

    fn check(&self, action: ActionKind) -> PlanResult<()> {
        let state = self.current_state();
        if state.is_terminal() && !action.live_when_terminal() {
            return Err(PlanError::ActionUnavailable { action, state });
        }
        if action == ActionKind::BuildAxes {
            if let Some(landmark) = self.landmarks.missing().first() {
                return Err(PlanError::PrerequisiteMissing {
                    action,
                    missing: Prerequisite::Landmark(*landmark),
                });
            }
        }
        if let Some(missing) = action
            .requires()
            .iter()
            .find(|kind| !self.artifacts.contains(**kind))
        {
            return Err(PlanError::PrerequisiteMissing {
                action,
                missing: Prerequisite::Artifact(*missing),
            });
        }
        Ok(())
    }

    /// Run `action` with the configured step for the parameterised ones.
    pub fn perform(&mut self, action: ActionKind) -> PlanResult<SequencerState> {
        let step = self.config.rotation_step_degrees;
        match action {
            ActionKind::RotateValgusPlane => self.rotate_valgus(step),
            ActionKind::RotateFlexionPlane => self.rotate_flexion(step),
            ActionKind::AdjustResection => self.adjust_resection(self.config.resection_step),
            ActionKind::ToggleResectionPlane => {
                self.toggle_resection_visibility()?;
                Ok(self.current_state())
            }
            ActionKind::BuildAxes
            | ActionKind::CreateMechanicalPlane
            | ActionKind::ProjectTea
            | ActionKind::CreateAnteriorLine
            | ActionKind::CreateValgusPlane
            | ActionKind::CreateLateralLine
            | ActionKind::CreateFlexionPlane
            | ActionKind::CreateDistalMedialPlane
            | ActionKind::CreateDistalResectionPlane => match action.produces() {
                Some(kind) => self.create(kind),
                None => Ok(self.current_state()),
            },
        }
    }

    /// Derive `kind` from its predecessors. Re-creating an existing artifact
    /// recomputes everything downstream of it; a rotatable plane keeps its
    /// accumulated correction.
    pub fn create(&mut self, kind: ArtifactKind) -> PlanResult<SequencerState> {
        let action = kind.action();
        self.check(action).map_err(|error| self.report(error))?;

        let changed = self.derive(kind).map_err(|error| self.report(error))?;
        self.narrate(created_message(kind));
        crate::debug_log!("{action}: {kind} ready");

        let changed = if changed {
            BTreeSet::from([kind])
        } else {
            BTreeSet::new()
        };
        self.refresh(&BTreeSet::new(), changed)
    }

    /// Drop every artifact past `state`. Rotation corrections are kept and
    /// re-applied when their plane is created again.
    pub fn revert_to(&mut self, state: SequencerState) -> SequencerState {
        let dropped: Vec<ArtifactKind> = ArtifactKind::ALL
            .into_iter()
            .filter(|kind| kind.state() > state)
            .filter(|kind| self.artifacts.remove(*kind))
            .collect();
        if !dropped.is_empty() {
            self.narrate(format!("Reverted to {state}"));
        }
        self.current_state()
    }

    /// Clear landmarks, artifacts, rotations and the resection offset.
    pub fn reset(&mut self) {
        self.landmarks.clear();
        self.artifacts.clear();
        self.valgus_degrees = 0.0;
        self.flexion_degrees = 0.0;
        self.resection = ResectionOffset::new(self.config.initial_resection);
        self.view_position = self.config.view_position;
        self.narrate("Pipeline reset");
    }

    fn drop_from(&mut self, kind: ArtifactKind) -> Vec<ArtifactKind> {
        let mut doomed = self.graph.downstream(kind);
        doomed.insert(kind);
        doomed
            .into_iter()
            .filter(|kind| self.artifacts.remove(*kind))
            .collect()
    }

    // ───────────────────────────────────────────────────────────────────────
    // Inputs
    // ───────────────────────────────────────────────────────────────────────

    /// Store a finalized landmark position and bring existing artifacts in
    /// line with it.
    pub fn set_landmark(&mut self, index: usize, position: Point3) -> PlanResult<SequencerState> {
        let was_complete = self.landmarks.is_complete();
        let previous = self
            .landmarks
            .set(index, position)
            .map_err(|error| self.report(error))?;
        if previous == Some(position) {
            return Ok(self.current_state());
        }
        if !was_complete && self.landmarks.is_complete() {
            self.narrate("All landmarks placed - axes can be built");
        }
        self.on_landmark_changed(index)
    }

    pub fn on_landmark_changed(&mut self, index: usize) -> PlanResult<SequencerState> {
        let landmark = Landmark::from_index(index).map_err(|error| self.report(error))?;
        log::debug!("landmark changed: {landmark}");
        let dirty = self.graph.reading(landmark);
        self.refresh(&dirty, BTreeSet::new())
    }

    /// Move the observer used by the anterior line.
    pub fn set_view_position(&mut self, position: Point3) -> PlanResult<SequencerState> {
        if !position.is_finite() {
            return Err(self.report(PlanError::degenerate("view position must be finite")));
        }
        self.view_position = position;
        self.refresh(&BTreeSet::from([ArtifactKind::AnteriorLine]), BTreeSet::new())
    }

    // ───────────────────────────────────────────────────────────────────────
    // Rotations
    // ───────────────────────────────────────────────────────────────────────

    /// Rotate the valgus plane about the anterior direction by `degrees`.
    pub fn rotate_valgus(&mut self, degrees: f64) -> PlanResult<SequencerState> {
        self.check(ActionKind::RotateValgusPlane)
            .map_err(|error| self.report(error))?;
        let (Some(plane), Some(anterior)) =
            (self.artifacts.valgus_plane, self.artifacts.anterior_line)
        else {
            return Ok(self.current_state());
        };

        let rotated = rotate_plane(&plane, anterior.direction, degrees)
            .map_err(|error| self.report(error.context(ArtifactKind::ValgusPlane)))?;
        self.valgus_degrees += degrees;
        self.artifacts.valgus_plane = Some(rotated);
        self.narrate(format!(
            "Varus/Valgus plane rotated by {degrees:+} degrees (total {:.1})",
            self.valgus_degrees
        ));

        self.refresh(
            &BTreeSet::from([ArtifactKind::AnteriorLine]),
            BTreeSet::from([ArtifactKind::ValgusPlane]),
        )
    }

    /// Rotate the flexion plane about the lateral-line direction by `degrees`.
    pub fn rotate_flexion(&mut self, degrees: f64) -> PlanResult<SequencerState> {
        self.check(ActionKind::RotateFlexionPlane)
            .map_err(|error| self.report(error))?;
        let (Some(plane), Some(lateral)) =
            (self.artifacts.flexion_plane, self.artifacts.lateral_line)
        else {
            return Ok(self.current_state());
        };

        let rotated = rotate_plane(&plane, lateral.line.direction, degrees)
            .map_err(|error| self.report(error.context(ArtifactKind::FlexionPlane)))?;
        self.flexion_degrees += degrees;
        self.artifacts.flexion_plane = Some(rotated);
        self.narrate(format!(
            "Flexion/Extension plane rotated by {degrees:+} degrees (total {:.1})",
            self.flexion_degrees
        ));

        self.refresh(&BTreeSet::new(), BTreeSet::from([ArtifactKind::FlexionPlane]))
    }

    // ───────────────────────────────────────────────────────────────────────
    // Resection
    // ───────────────────────────────────────────────────────────────────────

    pub fn adjust_resection(&mut self, delta: f64) -> PlanResult<SequencerState> {
        self.check(ActionKind::AdjustResection)
            .map_err(|error| self.report(error))?;
        if !delta.is_finite() {
            return Err(self.report(PlanError::degenerate("resection step must be finite")));
        }
        self.resection.adjust(delta);
        self.resection_moved()
    }

    pub fn set_resection(&mut self, distance: f64) -> PlanResult<SequencerState> {
        self.check(ActionKind::AdjustResection)
            .map_err(|error| self.report(error))?;
        if !distance.is_finite() {
            return Err(self.report(PlanError::degenerate("resection depth must be finite")));
        }
        self.resection.set_offset(distance);
        self.resection_moved()
    }

    fn resection_moved(&mut self) -> PlanResult<SequencerState> {
        self.narrate(format!("Resection offset: {:.3}", self.resection.distance()));
        self.refresh(
            &BTreeSet::from([ArtifactKind::DistalResectionPlane]),
            BTreeSet::new(),
        )
    }

    /// Flip resection plane visibility; returns the new flag.
    pub fn toggle_resection_visibility(&mut self) -> PlanResult<bool> {
        self.check(ActionKind::ToggleResectionPlane)
            .map_err(|error| self.report(error))?;
        let visible = self.resection.toggle_visible();
        self.narrate(if visible {
            "Distal resection plane shown"
        } else {
            "Distal resection plane hidden"
        });
        Ok(visible)
    }

    // ───────────────────────────────────────────────────────────────────────
    // Recomputation
    // ───────────────────────────────────────────────────────────────────────

    /// Re-derive present artifacts that are in `dirty` or downstream of a
    /// changed one. A failure drops the artifact and everything after it.
    fn refresh(
        &mut self,
        dirty: &BTreeSet<ArtifactKind>,
        mut changed: BTreeSet<ArtifactKind>,
    ) -> PlanResult<SequencerState> {
        let order = self.graph.order().to_vec();
        for kind in order {
            if !self.artifacts.contains(kind) {
                continue;
            }
            let stale = dirty.contains(&kind)
                || kind.predecessors().iter().any(|p| changed.contains(p));
            if !stale {
                continue;
            }

            match self.derive(kind) {
                Ok(true) => {
                    log::debug!("recomputed {kind}");
                    changed.insert(kind);
                }
                Ok(false) => {}
                Err(error) => {
                    let dropped = self.drop_from(kind);
                    log::warn!("recomputing {kind} failed, dropped {dropped:?}");
                    self.narrate(format!(
                        "The {kind} could not be recomputed; it and everything after it were removed"
                    ));
                    return Err(self.report(error));
                }
            }
        }
        Ok(self.current_state())
    }

    /// Compute `kind` from current inputs and store it. Returns whether the
    /// stored value changed.
    fn derive(&mut self, kind: ArtifactKind) -> PlanResult<bool> {
        let tol = self.config.tolerance();
        let action = kind.action();

        let changed = match kind {
            ArtifactKind::Axes => {
                let (axes, failures) = AxisSet::try_build(|axis_kind| {
                    let (start, end) = axis_kind.endpoints();
                    let start = self.landmark(action, start)?;
                    let end = self.landmark(action, end)?;
                    build_axis_with_tolerance(start, end, tol).map_err(|error| error.context(axis_kind))
                })?;
                let previous = self.artifacts.axes;
                for (axis_kind, error) in failures {
                    if previous.is_none_or(|set| set.get(axis_kind).is_some()) {
                        log::warn!("{axis_kind} skipped: {error}");
                        self.narrate(format!("Warning: {error}; the axis is left out"));
                    }
                }
                replace_slot(&mut self.artifacts.axes, axes)
            }
            ArtifactKind::MechanicalPlane => {
                let axes = require(self.artifacts.axes, action, ArtifactKind::Axes)?;
                let origin = self.landmark(action, Landmark::FemurCenter)?;
                let mechanical = axes.mechanical();
                let plane = build_plane_with_extent(
                    origin,
                    mechanical.direction,
                    self.config.plane_extent,
                    tol,
                )
                .map_err(|error| error.context(kind))?;
                replace_slot(&mut self.artifacts.mechanical_plane, plane)
            }
            ArtifactKind::TeaProjection => {
                let plane = require(
                    self.artifacts.mechanical_plane,
                    action,
                    ArtifactKind::MechanicalPlane,
                )?;
                let medial = self.landmark(action, Landmark::MedialEpicondyle)?;
                let lateral = self.landmark(action, Landmark::LateralEpicondyle)?;
                let line = project_segment_with_tolerance(medial, lateral, &plane, tol)
                    .map_err(|error| error.context(kind))?;
                replace_slot(&mut self.artifacts.tea_projection, line)
            }
            ArtifactKind::AnteriorLine => {
                require(self.artifacts.tea_projection, action, ArtifactKind::TeaProjection)?;
                let plane = require(
                    self.artifacts.mechanical_plane,
                    action,
                    ArtifactKind::MechanicalPlane,
                )?;
                let origin = self.landmark(action, Landmark::FemurCenter)?;
                let line = anterior_line(
                    origin,
                    plane.normal,
                    self.view_position,
                    self.config.reference_line_length,
                    tol,
                )
                .map_err(|error| error.context(kind))?;
                replace_slot(&mut self.artifacts.anterior_line, line)
            }
            ArtifactKind::ValgusPlane => {
                let anterior =
                    require(self.artifacts.anterior_line, action, ArtifactKind::AnteriorLine)?;
                let source = require(
                    self.artifacts.mechanical_plane,
                    action,
                    ArtifactKind::MechanicalPlane,
                )?;
                let plane = rotate_plane(
                    &derive_plane(&source, None)?,
                    anterior.direction,
                    self.valgus_degrees,
                )
                .map_err(|error| error.context(kind))?;
                replace_slot(&mut self.artifacts.valgus_plane, plane)
            }
            ArtifactKind::LateralLine => {
                let valgus = require(self.artifacts.valgus_plane, action, ArtifactKind::ValgusPlane)?;
                let anterior =
                    require(self.artifacts.anterior_line, action, ArtifactKind::AnteriorLine)?;
                let lateral = lateral_line(
                    anterior.origin,
                    valgus.normal,
                    anterior.direction,
                    self.config.reference_line_length,
                    tol,
                )
                .map_err(|error| error.context(kind))?;
                if lateral.used_fallback {
                    self.narrate(
                        "Warning: the varus/valgus plane normal is parallel to the anterior line; \
                         the lateral line follows the plane normal instead",
                    );
                }
                replace_slot(&mut self.artifacts.lateral_line, lateral)
            }
            ArtifactKind::FlexionPlane => {
                let lateral =
                    require(self.artifacts.lateral_line, action, ArtifactKind::LateralLine)?;
                let source = require(self.artifacts.valgus_plane, action, ArtifactKind::ValgusPlane)?;
                let plane = rotate_plane(
                    &derive_plane(&source, None)?,
                    lateral.line.direction,
                    self.flexion_degrees,
                )
                .map_err(|error| error.context(kind))?;
                replace_slot(&mut self.artifacts.flexion_plane, plane)
            }
            ArtifactKind::DistalMedialPlane => {
                let source =
                    require(self.artifacts.flexion_plane, action, ArtifactKind::FlexionPlane)?;
                let through = self.landmark(action, Landmark::DistalMedialPoint)?;
                let plane = derive_plane(&source, Some(through)).map_err(|error| error.context(kind))?;
                replace_slot(&mut self.artifacts.distal_medial_plane, plane)
            }
            ArtifactKind::DistalResectionPlane => {
                let source = require(
                    self.artifacts.distal_medial_plane,
                    action,
                    ArtifactKind::DistalMedialPlane,
                )?;
                let origin = self
                    .resection
                    .position(source.origin, self.config.resection_unit());
                let plane = derive_plane(&source, Some(origin)).map_err(|error| error.context(kind))?;
                replace_slot(&mut self.artifacts.distal_resection_plane, plane)
            }
        };
        Ok(changed)
    }

    fn landmark(&self, action: ActionKind, landmark: Landmark) -> PlanResult<Point3> {
        self.landmarks
            .get(landmark)
            .ok_or(PlanError::PrerequisiteMissing {
                action,
                missing: Prerequisite::Landmark(landmark),
            })
    }

    // ───────────────────────────────────────────────────────────────────────
    // Viewport
    // ───────────────────────────────────────────────────────────────────────

    /// Everything the viewport should draw, landmarks first.
    #[must_use]
    pub fn render_items(&self) -> Vec<RenderItem> {
        let mut items: Vec<RenderItem> = self
            .landmarks
            .iter()
            .map(|(landmark, position)| RenderItem::landmark(landmark, position))
            .collect();

        let artifacts = &self.artifacts;
        if let Some(axes) = &artifacts.axes {
            items.extend(
                axes.iter()
                    .map(|(kind, axis)| RenderItem::axis(kind, axis, self.config.axis_radius)),
            );
        }
        if let Some(plane) = &artifacts.mechanical_plane {
            items.push(RenderItem::plane("Mechanical axis plane", plane, true));
        }
        if let Some(line) = &artifacts.tea_projection {
            items.push(RenderItem::line(
                "Projected TEA",
                line,
                self.config.projected_line_radius,
                PROJECTED_TEA_COLOR,
            ));
        }
        if let Some(line) = &artifacts.anterior_line {
            items.push(RenderItem::line(
                "Anterior line",
                line,
                self.config.axis_radius,
                ANTERIOR_LINE_COLOR,
            ));
        }
        if let Some(plane) = &artifacts.valgus_plane {
            items.push(RenderItem::plane("Varus/Valgus plane", plane, true));
        }
        if let Some(lateral) = &artifacts.lateral_line {
            items.push(RenderItem::line(
                "Lateral line",
                &lateral.line,
                self.config.axis_radius,
                LATERAL_LINE_COLOR,
            ));
        }
        if let Some(plane) = &artifacts.flexion_plane {
            items.push(RenderItem::plane("Flexion/Extension plane", plane, true));
        }
        if let Some(plane) = &artifacts.distal_medial_plane {
            items.push(RenderItem::plane("Distal medial plane", plane, true));
        }
        if let Some(plane) = &artifacts.distal_resection_plane {
            items.push(RenderItem::plane(
                "Distal resection plane",
                plane,
                self.resection.is_visible(),
            ));
        }
        items
    }
}

fn require<T>(slot: Option<T>, action: ActionKind, missing: ArtifactKind) -> PlanResult<T> {
    slot.ok_or(PlanError::PrerequisiteMissing {
        action,
        missing: Prerequisite::Artifact(missing),
    })
}

fn created_message(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Axes => {
            "Landmarks updated - now you can create the plane perpendicular to the mechanical axis"
        }
        ArtifactKind::MechanicalPlane => "Plane perpendicular to the mechanical axis created",
        ArtifactKind::TeaProjection => "TEA projected onto the mechanical axis plane",
        ArtifactKind::AnteriorLine => "Anterior line created",
        ArtifactKind::ValgusPlane => "Varus/Valgus plane created",
        ArtifactKind::LateralLine => "Lateral line created",
        ArtifactKind::FlexionPlane => "Flexion/Extension plane created",
        ArtifactKind::DistalMedialPlane => "Distal medial plane created",
        ArtifactKind::DistalResectionPlane => "Distal resection plane created",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Tolerance, Vec3};

    fn scene() -> [Point3; 10] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.02, 0.9, 0.0),
            Point3::new(0.0, 0.1, 0.0),
            Point3::new(-0.4, 0.05, 0.1),
            Point3::new(0.4, 0.05, 0.1),
            Point3::new(-0.2, -0.05, 0.0),
            Point3::new(0.2, -0.05, 0.0),
            Point3::new(-0.2, 0.0, -0.3),
            Point3::new(0.2, 0.0, -0.3),
        ]
    }

    fn planner_with_landmarks() -> Planner {
        let mut planner = Planner::new().unwrap();
        for (index, position) in scene().into_iter().enumerate() {
            planner.set_landmark(index, position).unwrap();
        }
        planner
    }

    #[test]
    fn build_axes_waits_for_all_landmarks() {
        let mut planner = Planner::new().unwrap();
        planner.set_landmark(0, Point3::ORIGIN).unwrap();
        let err = planner.perform(ActionKind::BuildAxes).unwrap_err();
        assert_eq!(
            err,
            PlanError::PrerequisiteMissing {
                action: ActionKind::BuildAxes,
                missing: Prerequisite::Landmark(Landmark::HipCenter),
            }
        );
        assert_eq!(planner.current_state(), SequencerState::LandmarksIncomplete);
        assert!(planner.status().last().unwrap().starts_with("Error:"));
    }

    #[test]
    fn mechanical_plane_follows_axis() {
        let mut planner = planner_with_landmarks();
        planner.perform(ActionKind::BuildAxes).unwrap();
        let state = planner.perform(ActionKind::CreateMechanicalPlane).unwrap();
        assert_eq!(state, SequencerState::MechPlaneReady);

        let plane = planner.artifacts().mechanical_plane.unwrap();
        assert!(Tolerance::LOOSE.approx_eq_vec3(plane.normal, Vec3::Y));
        assert_eq!(plane.origin, Point3::ORIGIN);
    }

    #[test]
    fn unchanged_landmark_does_not_emit_status() {
        let mut planner = planner_with_landmarks();
        planner.take_status();
        planner.set_landmark(3, scene()[3]).unwrap();
        assert!(planner.status().is_empty());
    }

    #[test]
    fn revert_drops_later_artifacts_only() {
        let mut planner = planner_with_landmarks();
        for action in [
            ActionKind::BuildAxes,
            ActionKind::CreateMechanicalPlane,
            ActionKind::ProjectTea,
        ] {
            planner.perform(action).unwrap();
        }
        let state = planner.revert_to(SequencerState::AxesReady);
        assert_eq!(state, SequencerState::AxesReady);
        assert!(planner.artifacts().axes.is_some());
        assert!(planner.artifacts().mechanical_plane.is_none());
        assert!(planner.artifacts().tea_projection.is_none());
    }
}
