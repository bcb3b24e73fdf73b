use cgmath::{InnerSpace, Matrix4, Vector3, Vector4, Zero};
use instant::Duration;
use orrery::{
    camera::Camera,
    controls::Controls,
    data_structures::scene_graph::{NodeId, SceneGraph},
    solar_system::{SOLAR_SYSTEM, build_graph},
};

fn graph() -> SceneGraph<&'static str> {
    build_graph(SOLAR_SYSTEM.iter().map(|spec| (spec, spec.name))).unwrap()
}

fn id(graph: &SceneGraph<&'static str>, name: &str) -> NodeId {
    graph
        .iter()
        .find(|(_, node)| node.resource == name)
        .map(|(id, _)| id)
        .unwrap()
}

fn origin_of(model: Matrix4<f32>) -> Vector3<f32> {
    (model * Vector4::new(0.0, 0.0, 0.0, 1.0)).truncate()
}

/// Run `frames` frames of `dt` through the controls the way the event loop does.
fn simulate(
    graph: &mut SceneGraph<&'static str>,
    controls: &mut Controls,
    frames: u32,
    dt: Duration,
) {
    for _ in 0..frames {
        if controls.take_reset() {
            graph.reset();
        }
        graph.update(controls.frame_time(dt).as_secs_f32());
    }
}

#[test]
fn starting_layout_matches_table() {
    let graph = graph();
    let matrices = graph.model_matrices();
    assert_eq!(matrices.len(), 4);
    assert!(origin_of(matrices[0]).magnitude() < 1e-6);
    assert!(origin_of(matrices[1]).magnitude() < 1e-6);

    let earth = graph.world_translation(id(&graph, "earth")).unwrap();
    assert!((earth.magnitude() - 0.8).abs() < 1e-5);
    let moon = graph.world_translation(id(&graph, "moon")).unwrap();
    assert!(((moon - earth).magnitude() - 0.3).abs() < 1e-5);
}

#[test]
fn moon_stays_with_earth_over_a_year() {
    let mut graph = graph();
    let mut controls = Controls::new();
    let (earth, moon) = (id(&graph, "earth"), id(&graph, "moon"));
    for _ in 0..80 {
        simulate(&mut graph, &mut controls, 60, Duration::from_millis(16));
        let e = graph.world_translation(earth).unwrap();
        let m = graph.world_translation(moon).unwrap();
        assert!((e.magnitude() - 0.8).abs() < 1e-4);
        assert!(((m - e).magnitude() - 0.3).abs() < 1e-4);
    }
}

#[test]
fn stars_never_move() {
    let mut graph = graph();
    let stars = id(&graph, "stars");
    let before = graph.model_matrix(stars).unwrap();
    graph.update(123.0);
    assert_eq!(graph.model_matrix(stars).unwrap(), before);
    assert_eq!(graph.world_translation(stars).unwrap(), Vector3::zero());
}

#[test]
fn pause_freezes_and_resume_continues() {
    let mut graph = graph();
    let mut controls = Controls::new();
    let earth = id(&graph, "earth");

    simulate(&mut graph, &mut controls, 10, Duration::from_millis(100));
    let angle = graph.get(earth).unwrap().orbit.orbit_angle();
    assert!((angle - 4.5).abs() < 1e-3);

    controls.toggle_pause();
    simulate(&mut graph, &mut controls, 50, Duration::from_millis(100));
    assert_eq!(graph.get(earth).unwrap().orbit.orbit_angle(), angle);

    controls.toggle_pause();
    simulate(&mut graph, &mut controls, 10, Duration::from_millis(100));
    assert!((graph.get(earth).unwrap().orbit.orbit_angle() - 9.0).abs() < 1e-3);
}

#[test]
fn reset_restores_the_start_even_while_paused() {
    let mut graph = graph();
    let mut controls = Controls::new();
    let start = graph.model_matrices();

    simulate(&mut graph, &mut controls, 30, Duration::from_millis(50));
    assert_ne!(graph.model_matrices(), start);

    controls.toggle_pause();
    controls.request_reset();
    simulate(&mut graph, &mut controls, 1, Duration::from_millis(50));
    assert_eq!(graph.model_matrices(), start);
}

#[test]
fn angles_stay_within_a_turn() {
    let mut graph = graph();
    graph.update(1000.0);
    for (_, node) in graph.iter() {
        let spin = node.orbit.self_rotation_angle();
        let orbit = node.orbit.orbit_angle();
        assert!((0.0..360.0).contains(&spin), "spin {spin}");
        assert!((0.0..360.0).contains(&orbit), "orbit {orbit}");
    }
}

#[test]
fn camera_light_position_follows_controls() {
    let mut camera = Camera::new(0.0, 0.0, 2.0);
    let mut controls = Controls::new();
    controls.scroll(1.5, &mut camera);
    let eye = camera.position();
    assert!((eye.z - 0.5).abs() < 1e-5);
    controls.scroll(10.0, &mut camera);
    assert!(camera.radius() > 0.0);
}
