use knee_plan_engine::geom::{Point3, Quaternion, Tolerance, Vec3};
use knee_plan_engine::landmarks::{AxisKind, Landmark, LandmarkStore};
use knee_plan_engine::pipeline::Prerequisite;
use knee_plan_engine::{
    ActionKind, ArtifactKind, PlanError, Planner, PlannerConfig, RenderItem, SequencerState,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TOL: Tolerance = Tolerance::LOOSE;

fn scene() -> [Point3; 10] {
    [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.9, 0.0),
        Point3::new(0.0, 0.1, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(1.0, 1.0, 2.0),
        Point3::new(-0.2, -0.05, 0.0),
        Point3::new(0.2, -0.05, 0.0),
        Point3::new(-0.2, 0.0, -0.3),
        Point3::new(0.2, 0.0, -0.3),
    ]
}

fn planner_with_scene() -> Planner {
    let mut planner = Planner::new().expect("default config");
    for (index, position) in scene().into_iter().enumerate() {
        planner.set_landmark(index, position).expect("landmark");
    }
    planner
}

fn run_until(planner: &mut Planner, last: ActionKind) {
    for action in [
        ActionKind::BuildAxes,
        ActionKind::CreateMechanicalPlane,
        ActionKind::ProjectTea,
        ActionKind::CreateAnteriorLine,
        ActionKind::CreateValgusPlane,
        ActionKind::CreateLateralLine,
        ActionKind::CreateFlexionPlane,
        ActionKind::CreateDistalMedialPlane,
        ActionKind::CreateDistalResectionPlane,
    ] {
        planner
            .perform(action)
            .unwrap_or_else(|err| panic!("{action} failed: {err}"));
        if action == last {
            return;
        }
    }
}

fn assert_vec(actual: Vec3, expected: Vec3) {
    assert!(
        TOL.approx_eq_vec3(actual, expected),
        "expected {expected:?}, got {actual:?}"
    );
}

fn assert_point(actual: Point3, expected: Point3) {
    assert!(
        TOL.approx_eq_point3(actual, expected),
        "expected {expected:?}, got {actual:?}"
    );
}

#[test]
fn full_pipeline_reaches_terminal_state() {
    let mut planner = planner_with_scene();
    run_until(&mut planner, ActionKind::CreateDistalResectionPlane);
    assert_eq!(planner.current_state(), SequencerState::DistalResectionReady);

    let artifacts = planner.artifacts();
    let mechanical = artifacts.mechanical_plane.unwrap();
    assert_vec(mechanical.normal, Vec3::Y);
    assert_point(mechanical.origin, Point3::ORIGIN);

    let tea = artifacts.tea_projection.unwrap();
    assert_point(tea.origin, Point3::new(1.0, 0.0, 0.0));
    assert_point(tea.end(), Point3::new(1.0, 0.0, 2.0));
    assert_vec(tea.direction, Vec3::Z);
    assert!((tea.length - 2.0).abs() < 1e-9);

    let anterior = artifacts.anterior_line.unwrap();
    assert_vec(anterior.direction, Vec3::X);
    assert!((anterior.length - 0.1).abs() < 1e-12);

    let lateral = artifacts.lateral_line.unwrap();
    assert!(!lateral.used_fallback);
    assert_vec(lateral.line.direction, Vec3::new(0.0, 0.0, -1.0));
    assert_point(lateral.line.origin, anterior.origin);

    let distal_medial = artifacts.distal_medial_plane.unwrap();
    assert_point(distal_medial.origin, scene()[6]);
    assert_vec(distal_medial.normal, Vec3::Y);

    let resection = artifacts.distal_resection_plane.unwrap();
    assert_point(resection.origin, Point3::new(-0.2, 0.05, 0.0));
    assert!(planner.resection().is_visible());
}

#[test]
fn valgus_plane_requires_anterior_line() {
    let mut planner = planner_with_scene();
    run_until(&mut planner, ActionKind::ProjectTea);

    let err = planner.perform(ActionKind::CreateValgusPlane).unwrap_err();
    assert_eq!(
        err,
        PlanError::PrerequisiteMissing {
            action: ActionKind::CreateValgusPlane,
            missing: Prerequisite::Artifact(ArtifactKind::AnteriorLine),
        }
    );
    assert_eq!(planner.current_state(), SequencerState::TeaProjected);
    assert!(planner.artifacts().valgus_plane.is_none());
    assert!(
        !planner
            .available_actions()
            .contains(&ActionKind::CreateValgusPlane)
    );
}

#[test]
fn available_actions_track_the_gate() {
    let mut planner = Planner::new().unwrap();
    assert!(planner.available_actions().is_empty());

    for (index, position) in scene().into_iter().enumerate() {
        planner.set_landmark(index, position).unwrap();
    }
    assert_eq!(
        planner.available_actions().into_iter().collect::<Vec<_>>(),
        vec![ActionKind::BuildAxes]
    );

    run_until(&mut planner, ActionKind::CreateValgusPlane);
    let available = planner.available_actions();
    assert!(available.contains(&ActionKind::RotateValgusPlane));
    assert!(available.contains(&ActionKind::CreateLateralLine));
    assert!(!available.contains(&ActionKind::RotateFlexionPlane));
    assert!(!available.contains(&ActionKind::AdjustResection));
}

#[test]
fn terminal_state_only_allows_resection_controls() {
    let mut planner = planner_with_scene();
    run_until(&mut planner, ActionKind::CreateDistalResectionPlane);

    assert_eq!(
        planner.available_actions().into_iter().collect::<Vec<_>>(),
        vec![ActionKind::AdjustResection, ActionKind::ToggleResectionPlane]
    );

    let err = planner.rotate_valgus(5.0).unwrap_err();
    assert_eq!(
        err,
        PlanError::ActionUnavailable {
            action: ActionKind::RotateValgusPlane,
            state: SequencerState::DistalResectionReady,
        }
    );
    assert!(planner.perform(ActionKind::CreateMechanicalPlane).is_err());
    assert!(planner.perform(ActionKind::AdjustResection).is_ok());
}

#[test]
fn resection_steps_move_the_plane() {
    let mut planner = planner_with_scene();
    run_until(&mut planner, ActionKind::CreateDistalResectionPlane);

    for _ in 0..3 {
        planner.adjust_resection(0.01).unwrap();
    }
    for _ in 0..5 {
        planner.adjust_resection(-0.01).unwrap();
    }
    assert!((planner.resection().distance() - 0.08).abs() < 1e-12);

    let plane = planner.artifacts().distal_resection_plane.unwrap();
    assert_point(plane.origin, Point3::new(-0.2, 0.03, 0.0));

    planner.set_resection(-1.0).unwrap();
    assert_eq!(planner.resection().distance(), 0.0);
    let plane = planner.artifacts().distal_resection_plane.unwrap();
    assert_point(plane.origin, scene()[6]);
}

#[test]
fn random_resection_steps_never_go_negative() {
    let mut planner = planner_with_scene();
    run_until(&mut planner, ActionKind::CreateDistalResectionPlane);

    let mut rng = StdRng::seed_from_u64(0x0ff5e7);
    for _ in 0..200 {
        let delta: f64 = rng.random_range(-0.04..0.03);
        planner.adjust_resection(delta).unwrap();
        assert!(planner.resection().distance() >= 0.0);
        let plane = planner.artifacts().distal_resection_plane.unwrap();
        let medial = planner.artifacts().distal_medial_plane.unwrap();
        assert!(
            (plane.origin.y - medial.origin.y - planner.resection().distance()).abs() < 1e-9
        );
    }
}

#[test]
fn toggling_visibility_keeps_depth_and_marks_render_item() {
    let mut planner = planner_with_scene();
    run_until(&mut planner, ActionKind::CreateDistalResectionPlane);
    planner.adjust_resection(0.02).unwrap();

    assert!(!planner.toggle_resection_visibility().unwrap());
    assert!((planner.resection().distance() - 0.12).abs() < 1e-12);

    let hidden = planner
        .render_items()
        .into_iter()
        .find(|item| item.name() == "Distal resection plane")
        .expect("resection plane item");
    assert!(matches!(hidden, RenderItem::Plane { visible: false, .. }));
}

#[test]
fn valgus_rotation_tilts_about_anterior_line() {
    let mut planner = planner_with_scene();
    run_until(&mut planner, ActionKind::CreateLateralLine);

    planner.rotate_valgus(5.0).unwrap();
    let (sin, cos) = 5.0_f64.to_radians().sin_cos();
    let valgus = planner.artifacts().valgus_plane.unwrap();
    assert_vec(valgus.normal, Vec3::new(0.0, cos, sin));
    assert_point(valgus.origin, Point3::ORIGIN);

    let lateral = planner.artifacts().lateral_line.unwrap();
    assert_vec(lateral.line.direction, Vec3::new(0.0, sin, -cos));

    let anterior = planner.artifacts().anterior_line.unwrap();
    assert_vec(anterior.direction, Vec3::X);

    planner.rotate_valgus(-5.0).unwrap();
    let valgus = planner.artifacts().valgus_plane.unwrap();
    assert_vec(valgus.normal, Vec3::Y);
    assert!(planner.valgus_degrees().abs() < 1e-12);
}

#[test]
fn flexion_rotation_follows_lateral_line() {
    let mut planner = planner_with_scene();
    run_until(&mut planner, ActionKind::CreateDistalMedialPlane);

    planner.perform(ActionKind::RotateFlexionPlane).unwrap();
    let (sin, cos) = 5.0_f64.to_radians().sin_cos();
    let flexion = planner.artifacts().flexion_plane.unwrap();
    // Lateral direction is -Z, so +5 degrees tips the normal towards +X.
    assert_vec(flexion.normal, Vec3::new(sin, cos, 0.0));

    let distal_medial = planner.artifacts().distal_medial_plane.unwrap();
    assert_vec(distal_medial.normal, flexion.normal);
    assert_point(distal_medial.origin, scene()[6]);

    let valgus = planner.artifacts().valgus_plane.unwrap();
    assert_vec(valgus.normal, Vec3::Y);
}

#[test]
fn landmark_edit_recomputes_downstream_and_keeps_rotations() {
    let mut planner = planner_with_scene();
    run_until(&mut planner, ActionKind::CreateFlexionPlane);
    planner.rotate_valgus(5.0).unwrap();
    planner.take_status();

    planner
        .set_landmark(Landmark::HipCenter.index(), Point3::new(1.0, 1.0, 0.0))
        .unwrap();
    assert_eq!(planner.current_state(), SequencerState::FlexionPlaneReady);

    let artifacts = planner.artifacts();
    let diagonal = Vec3::new(1.0, 1.0, 0.0).normalized().unwrap();
    let mechanical = artifacts.mechanical_plane.unwrap();
    assert_vec(mechanical.normal, diagonal);

    let anterior = artifacts.anterior_line.unwrap();
    assert!(anterior.direction.dot(diagonal).abs() < 1e-9);

    let valgus = artifacts.valgus_plane.unwrap();
    let expected = Quaternion::from_axis_degrees(anterior.direction, 5.0)
        .unwrap()
        .rotate(mechanical.normal);
    assert_vec(valgus.normal, expected);
    assert!((valgus.normal.dot(mechanical.normal) - 5.0_f64.to_radians().cos()).abs() < 1e-9);
    assert!((planner.valgus_degrees() - 5.0).abs() < 1e-12);

    let flexion = artifacts.flexion_plane.unwrap();
    assert_vec(flexion.normal, valgus.normal);
}

#[test]
fn degenerate_landmark_edit_drops_downstream() {
    let mut planner = planner_with_scene();
    run_until(&mut planner, ActionKind::CreateAnteriorLine);

    // Epicondyles stacked along the mechanical axis project to one point.
    let err = planner
        .set_landmark(Landmark::LateralEpicondyle.index(), Point3::new(1.0, 3.0, 0.0))
        .unwrap_err();
    assert!(matches!(err, PlanError::DegenerateInput(_)));
    assert_eq!(planner.current_state(), SequencerState::MechPlaneReady);
    assert!(planner.artifacts().tea_projection.is_none());
    assert!(planner.artifacts().anterior_line.is_none());
    assert_eq!(
        planner.landmarks().get(Landmark::LateralEpicondyle),
        Some(Point3::new(1.0, 3.0, 0.0))
    );

    let err = planner.perform(ActionKind::ProjectTea).unwrap_err();
    assert!(matches!(err, PlanError::DegenerateInput(_)));
    assert_eq!(planner.current_state(), SequencerState::MechPlaneReady);
}

#[test]
fn coincident_side_axis_landmarks_do_not_block_axes() {
    let mut planner = Planner::new().unwrap();
    for (index, position) in scene().into_iter().enumerate() {
        let position = if index == 3 { scene()[2] } else { position };
        planner.set_landmark(index, position).unwrap();
    }
    planner.take_status();

    let state = planner.perform(ActionKind::BuildAxes).unwrap();
    assert_eq!(state, SequencerState::AxesReady);
    let axes = planner.artifacts().axes.unwrap();
    assert!(axes.get(AxisKind::Anatomical).is_none());
    assert!(axes.get(AxisKind::TransEpicondylar).is_some());
    assert_eq!(axes.iter().count(), 4);

    let status = planner.take_status();
    assert!(
        status
            .iter()
            .any(|message| message.starts_with("Warning:") && message.contains("Anatomical Axis"))
    );

    let state = planner.perform(ActionKind::CreateMechanicalPlane).unwrap();
    assert_eq!(state, SequencerState::MechPlaneReady);
}

#[test]
fn coincident_mechanical_landmarks_block_axes() {
    let mut planner = Planner::new().unwrap();
    for (index, position) in scene().into_iter().enumerate() {
        let position = if index == 1 { scene()[0] } else { position };
        planner.set_landmark(index, position).unwrap();
    }
    let err = planner.perform(ActionKind::BuildAxes).unwrap_err();
    match err {
        PlanError::DegenerateInput(message) => assert!(message.contains("Mechanical Axis")),
        other => panic!("expected degenerate input, got {other:?}"),
    }
    assert_eq!(planner.current_state(), SequencerState::LandmarksIncomplete);
}

#[test]
fn collapsing_posterior_condyles_keeps_the_chain() {
    let mut planner = planner_with_scene();
    run_until(&mut planner, ActionKind::CreateDistalResectionPlane);
    let before = planner.artifacts().clone();
    planner.take_status();

    let state = planner
        .set_landmark(Landmark::PosteriorLateralPoint.index(), scene()[8])
        .unwrap();
    assert_eq!(state, SequencerState::DistalResectionReady);

    let artifacts = planner.artifacts();
    let axes = artifacts.axes.unwrap();
    assert!(axes.get(AxisKind::PosteriorCondylar).is_none());
    assert_eq!(axes.mechanical(), before.axes.unwrap().mechanical());
    assert_eq!(artifacts.mechanical_plane, before.mechanical_plane);
    assert_eq!(artifacts.flexion_plane, before.flexion_plane);
    assert_eq!(artifacts.distal_resection_plane, before.distal_resection_plane);
    assert!(
        planner
            .render_items()
            .iter()
            .all(|item| item.name() != "Posterior condyle Axis(PCA)")
    );

    let status = planner.take_status();
    assert_eq!(status.len(), 1);
    assert!(status[0].contains("Posterior condyle Axis(PCA)"));

    planner
        .set_landmark(Landmark::PosteriorLateralPoint.index(), scene()[9])
        .unwrap();
    assert_eq!(planner.artifacts(), &before);
}

#[test]
fn moving_the_viewer_recomputes_anterior_line() {
    let mut planner = planner_with_scene();
    run_until(&mut planner, ActionKind::CreateLateralLine);

    planner.set_view_position(Point3::new(5.0, 0.0, 0.0)).unwrap();
    let anterior = planner.artifacts().anterior_line.unwrap();
    // Y × X = -Z
    assert_vec(anterior.direction, Vec3::new(0.0, 0.0, -1.0));
    let lateral = planner.artifacts().lateral_line.unwrap();
    assert_vec(lateral.line.direction, Vec3::new(-1.0, 0.0, 0.0));

    let err = planner
        .set_view_position(Point3::new(0.0, 5.0, 0.0))
        .unwrap_err();
    assert!(matches!(err, PlanError::DegenerateInput(_)));
    assert_eq!(planner.current_state(), SequencerState::TeaProjected);
}

#[test]
fn revert_and_recreate_reapplies_rotation() {
    let mut planner = planner_with_scene();
    run_until(&mut planner, ActionKind::CreateFlexionPlane);
    planner.rotate_valgus(10.0).unwrap();
    planner.rotate_flexion(-5.0).unwrap();
    let rotated = planner.artifacts().clone();

    let state = planner.revert_to(SequencerState::AnteriorLineReady);
    assert_eq!(state, SequencerState::AnteriorLineReady);
    assert!(planner.artifacts().valgus_plane.is_none());
    assert!(planner.artifacts().flexion_plane.is_none());
    assert!(planner.artifacts().anterior_line.is_some());
    assert!((planner.valgus_degrees() - 10.0).abs() < 1e-12);
    assert!((planner.flexion_degrees() + 5.0).abs() < 1e-12);

    for action in [
        ActionKind::CreateValgusPlane,
        ActionKind::CreateLateralLine,
        ActionKind::CreateFlexionPlane,
    ] {
        planner.perform(action).unwrap();
    }
    let (sin, cos) = 10.0_f64.to_radians().sin_cos();
    let valgus = planner.artifacts().valgus_plane.unwrap();
    assert_vec(valgus.normal, Vec3::new(0.0, cos, sin));
    assert_vec(
        planner.artifacts().flexion_plane.unwrap().normal,
        rotated.flexion_plane.unwrap().normal,
    );
}

#[test]
fn recreating_rotated_plane_keeps_its_correction() {
    let mut planner = planner_with_scene();
    run_until(&mut planner, ActionKind::CreateValgusPlane);
    planner.rotate_valgus(10.0).unwrap();
    let before = planner.artifacts().valgus_plane.unwrap();

    let state = planner.perform(ActionKind::CreateValgusPlane).unwrap();
    assert_eq!(state, SequencerState::ValgusPlaneReady);
    let after = planner.artifacts().valgus_plane.unwrap();
    assert_vec(after.normal, before.normal);
    assert!((planner.valgus_degrees() - 10.0).abs() < 1e-12);

    planner.reset();
    assert_eq!(planner.valgus_degrees(), 0.0);
}

#[test]
fn recreating_mechanical_plane_mid_chain_keeps_downstream() {
    let mut planner = planner_with_scene();
    run_until(&mut planner, ActionKind::CreateFlexionPlane);
    planner.rotate_valgus(5.0).unwrap();
    let before = planner.artifacts().clone();

    let state = planner.perform(ActionKind::CreateMechanicalPlane).unwrap();
    assert_eq!(state, SequencerState::FlexionPlaneReady);
    assert_eq!(planner.artifacts(), &before);
}

#[test]
fn reset_clears_everything() {
    let mut planner = planner_with_scene();
    run_until(&mut planner, ActionKind::CreateDistalResectionPlane);
    planner.adjust_resection(0.05).unwrap();
    planner.toggle_resection_visibility().unwrap();

    planner.reset();
    assert_eq!(planner.current_state(), SequencerState::LandmarksIncomplete);
    assert_eq!(planner.landmarks(), &LandmarkStore::new());
    assert!((planner.resection().distance() - 0.1).abs() < 1e-12);
    assert!(planner.resection().is_visible());
    assert!(planner.render_items().is_empty());
}

#[test]
fn status_narrates_each_step_and_error() {
    let mut planner = planner_with_scene();
    let placed = planner.take_status();
    assert_eq!(placed.len(), 1);

    run_until(&mut planner, ActionKind::CreateMechanicalPlane);
    let messages = planner.take_status();
    assert_eq!(messages.len(), 2);

    let _ = planner.perform(ActionKind::CreateFlexionPlane);
    let messages = planner.take_status();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Error:"));
}

#[test]
fn index_out_of_range_is_reported() {
    let mut planner = Planner::new().unwrap();
    let err = planner.set_landmark(10, Point3::ORIGIN).unwrap_err();
    assert_eq!(err, PlanError::IndexOutOfRange { index: 10, max: 10 });
    assert_eq!(planner.landmarks().count(), 0);
}

#[test]
fn custom_config_changes_extent_and_direction() {
    let config = PlannerConfig {
        plane_extent: 2.0,
        resection_direction: Vec3::new(0.0, -2.0, 0.0),
        ..PlannerConfig::default()
    };
    let mut planner = Planner::with_config(config).unwrap();
    for (index, position) in scene().into_iter().enumerate() {
        planner.set_landmark(index, position).unwrap();
    }
    run_until(&mut planner, ActionKind::CreateDistalResectionPlane);

    let plane = planner.artifacts().distal_resection_plane.unwrap();
    assert_eq!(plane.extent, 2.0);
    assert_point(plane.origin, Point3::new(-0.2, -0.15, 0.0));

    let invalid = PlannerConfig {
        rotation_step_degrees: 0.0,
        ..PlannerConfig::default()
    };
    assert!(matches!(
        Planner::with_config(invalid),
        Err(PlanError::InvalidConfig(_))
    ));
}
