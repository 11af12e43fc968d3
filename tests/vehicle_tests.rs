#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use geo::Coord;
use selfdrive::simulation::controls::ControlKey;
use selfdrive::simulation::error::SimulationError;
use selfdrive::simulation::geometry::{Point, Polygon};
use selfdrive::simulation::network::{LayerData, Network, NetworkData};
use selfdrive::simulation::params::Params;
use selfdrive::simulation::vehicle::{Driver, DriverKind, Vehicle};

const EPS: f64 = 1e-9;

fn pt(x: f64, y: f64) -> Point {
    Coord { x, y }
}

/// Single-layer network with zero weights: output `j` fires when `bias[j] < 0`.
fn constant_network(inputs: usize, biases: [f64; 4]) -> Network {
    let data = NetworkData {
        layers: vec![LayerData {
            input_count: inputs,
            output_count: 4,
            biases: biases.to_vec(),
            weights: vec![vec![0.0; 4]; inputs],
        }],
    };
    Network::try_from(data).expect("valid network")
}

fn no_obstacles() -> Vec<&'static [Point]> {
    Vec::new()
}

#[test]
fn test_initial_polygon_is_upright_rectangle() {
    let params = Params::default();
    let vehicle = Vehicle::manual(pt(0.0, 0.0), &params);

    let expected = [pt(15.0, -25.0), pt(-15.0, -25.0), pt(-15.0, 25.0), pt(15.0, 25.0)];
    assert_eq!(vehicle.polygon().len(), 4);
    for (corner, want) in vehicle.polygon().iter().zip(&expected) {
        assert!((corner.x - want.x).abs() < EPS, "{corner:?} != {want:?}");
        assert!((corner.y - want.y).abs() < EPS, "{corner:?} != {want:?}");
    }
}

#[test]
fn test_acceleration_rises_to_the_cap() {
    let params = Params::default();
    let mut vehicle = Vehicle::manual(pt(0.0, 0.0), &params);
    vehicle.press_key(ControlKey::Up, true);

    let plateau = params.max_speed_manual - params.kinematics.friction;
    let mut previous = vehicle.speed();
    for _ in 0..40 {
        vehicle.advance(&no_obstacles(), &params.kinematics);
        let speed = vehicle.speed();
        assert!(speed <= params.max_speed_manual);
        assert!(
            speed > previous || (speed - plateau).abs() < EPS,
            "speed fell from {previous} to {speed}"
        );
        previous = speed;
    }
    assert!((vehicle.speed() - plateau).abs() < EPS);
}

#[test]
fn test_first_tick_of_acceleration() {
    let params = Params::default();
    let mut vehicle = Vehicle::manual(pt(0.0, 0.0), &params);
    vehicle.press_key(ControlKey::Up, true);

    vehicle.advance(&no_obstacles(), &params.kinematics);
    assert!((vehicle.speed() - 0.15).abs() < EPS);
    assert!((vehicle.center().y + 0.15).abs() < EPS);
    assert_eq!(vehicle.center().x, 0.0);
}

#[test]
fn test_friction_brings_vehicle_to_rest() {
    let params = Params::default();
    let mut vehicle = Vehicle::manual(pt(0.0, 0.0), &params);
    vehicle.press_key(ControlKey::Up, true);
    for _ in 0..10 {
        vehicle.advance(&no_obstacles(), &params.kinematics);
    }
    vehicle.press_key(ControlKey::Up, false);

    let mut previous = vehicle.speed();
    assert!(previous > 0.0);
    for _ in 0..100 {
        vehicle.advance(&no_obstacles(), &params.kinematics);
        let speed = vehicle.speed();
        assert!(speed >= 0.0, "speed overshot to {speed}");
        assert!(speed <= previous);
        previous = speed;
    }
    assert_eq!(vehicle.speed(), 0.0);
}

#[test]
fn test_reverse_is_capped_at_half_speed() {
    let params = Params::default();
    let mut vehicle = Vehicle::manual(pt(0.0, 0.0), &params);
    vehicle.press_key(ControlKey::Down, true);

    for _ in 0..40 {
        vehicle.advance(&no_obstacles(), &params.kinematics);
        assert!(vehicle.speed() >= -params.max_speed_manual / 2.0);
    }
    let plateau = -params.max_speed_manual / 2.0 + params.kinematics.friction;
    assert!((vehicle.speed() - plateau).abs() < EPS);
    assert!(vehicle.center().y > 0.0, "reversing moves down");

    vehicle.press_key(ControlKey::Down, false);
    for _ in 0..100 {
        vehicle.advance(&no_obstacles(), &params.kinematics);
        assert!(vehicle.speed() <= 0.0);
    }
    assert_eq!(vehicle.speed(), 0.0);
}

#[test]
fn test_steering_needs_motion() {
    let params = Params::default();
    let mut vehicle = Vehicle::manual(pt(0.0, 0.0), &params);
    vehicle.press_key(ControlKey::Left, true);

    for _ in 0..10 {
        vehicle.advance(&no_obstacles(), &params.kinematics);
    }
    assert_eq!(vehicle.heading(), 0.0);
    assert_eq!(vehicle.center(), pt(0.0, 0.0));
}

#[test]
fn test_reverse_steering_is_mirrored() {
    let params = Params::default();

    let mut forward = Vehicle::manual(pt(0.0, 0.0), &params);
    forward.press_key(ControlKey::Up, true);
    forward.press_key(ControlKey::Left, true);

    let mut backward = Vehicle::manual(pt(0.0, 0.0), &params);
    backward.press_key(ControlKey::Down, true);
    backward.press_key(ControlKey::Left, true);

    for _ in 0..5 {
        forward.advance(&no_obstacles(), &params.kinematics);
        backward.advance(&no_obstacles(), &params.kinematics);
    }

    assert!(forward.heading() > 0.0);
    assert!(backward.heading() < 0.0);
    assert!((forward.heading() - 5.0 * params.kinematics.steering_rate).abs() < EPS);
    // Positive heading while moving forward drifts toward negative x.
    assert!(forward.center().x < 0.0);
}

#[test]
fn test_collision_freezes_the_vehicle() {
    let params = Params::default();
    let mut vehicle = Vehicle::manual(pt(0.0, 0.0), &params);
    vehicle.press_key(ControlKey::Up, true);

    let wall: Polygon = vec![pt(-100.0, -26.0), pt(100.0, -26.0)];
    let obstacles = vec![wall.as_slice()];

    for _ in 0..20 {
        vehicle.advance(&obstacles, &params.kinematics);
        if vehicle.collided() {
            break;
        }
    }
    assert!(vehicle.collided());

    let center = vehicle.center();
    let polygon = vehicle.polygon().to_vec();
    let speed = vehicle.speed();
    for _ in 0..10 {
        vehicle.advance(&no_obstacles(), &params.kinematics);
    }
    assert_eq!(vehicle.center(), center);
    assert_eq!(vehicle.polygon(), polygon.as_slice());
    assert_eq!(vehicle.speed(), speed);
    assert!(vehicle.collided());
}

#[test]
fn test_traffic_cruises_and_ignores_keys() {
    let params = Params::default();
    let mut vehicle = Vehicle::traffic(pt(0.0, 0.0), &params);

    assert!(vehicle.sensor().is_none());
    assert!(!vehicle.press_key(ControlKey::Down, true));
    assert_eq!(vehicle.controls().forward, 1.0);
    assert_eq!(vehicle.driver().kind(), DriverKind::Traffic);

    for _ in 0..50 {
        vehicle.update(&no_obstacles(), &params.kinematics).expect("no network");
    }
    let plateau = params.max_speed_traffic - params.kinematics.friction;
    assert!((vehicle.speed() - plateau).abs() < EPS);
    assert!(vehicle.progress() > 0.0);
}

#[test]
fn test_network_outputs_drive_autonomous_vehicle() {
    let params = Params::default();
    // Only the forward channel fires.
    let network = constant_network(5, [-1.0, 1.0, 1.0, 1.0]);
    let mut vehicle = Vehicle::autonomous(pt(0.0, 0.0), &params, network).expect("valid vehicle");

    assert_eq!(vehicle.controls().forward, 0.0);
    vehicle.update(&no_obstacles(), &params.kinematics).expect("five inputs");
    assert_eq!(vehicle.speed(), 0.0);
    assert_eq!(vehicle.controls().forward, 1.0);
    assert_eq!(vehicle.controls().left, 0.0);

    vehicle.update(&no_obstacles(), &params.kinematics).expect("five inputs");
    assert!((vehicle.speed() - 0.15).abs() < EPS);

    let layers = vehicle.network().expect("autonomous").layers();
    assert_eq!(layers[0].outputs().to_vec(), vec![1.0, 0.0, 0.0, 0.0]);
}

#[test]
fn test_crashed_autonomous_vehicle_keeps_its_controls() {
    let params = Params::default();
    let network = constant_network(5, [1.0, -1.0, 1.0, 1.0]);
    let mut vehicle = Vehicle::autonomous(pt(0.0, 0.0), &params, network).expect("valid vehicle");

    let wall: Polygon = vec![pt(-100.0, 0.0), pt(100.0, 0.0)];
    let obstacles = vec![wall.as_slice()];
    vehicle.update(&obstacles, &params.kinematics).expect("five inputs");

    assert!(vehicle.collided());
    assert_eq!(vehicle.controls().left, 0.0);
    // Inference still ran.
    let layers = vehicle.network().expect("autonomous").layers();
    assert_eq!(layers[0].outputs().to_vec(), vec![0.0, 1.0, 0.0, 0.0]);
}

#[test]
fn test_negative_max_speed_is_taken_as_magnitude() {
    let params = Params::default();
    let mut vehicle = Vehicle::new(pt(0.0, 0.0), 30.0, 50.0, -4.0, Driver::Traffic, None)
        .expect("traffic needs no sensor");
    assert_eq!(vehicle.max_speed(), 4.0);
    assert_eq!(Vehicle::manual(pt(0.0, 0.0), &params).max_speed(), 3.0);

    for _ in 0..60 {
        vehicle.advance(&no_obstacles(), &params.kinematics);
    }
    assert!((vehicle.speed() - (4.0 - params.kinematics.friction)).abs() < EPS);
}

#[test]
fn test_autonomous_vehicle_validation() {
    let params = Params::default();

    let narrow = constant_network(3, [0.0; 4]);
    assert!(matches!(
        Vehicle::autonomous(pt(0.0, 0.0), &params, narrow),
        Err(SimulationError::SensorMismatch { rays: 5, inputs: 3 })
    ));

    let data = NetworkData {
        layers: vec![LayerData {
            input_count: 5,
            output_count: 2,
            biases: vec![0.0; 2],
            weights: vec![vec![0.0; 2]; 5],
        }],
    };
    let two_outputs = Network::try_from(data).expect("valid network");
    assert!(matches!(
        Vehicle::autonomous(pt(0.0, 0.0), &params, two_outputs),
        Err(SimulationError::OutputMismatch {
            expected: 4,
            actual: 2
        })
    ));
}

#[test]
fn test_snapshot_reports_state() {
    let params = Params::default();
    let network = constant_network(5, [-1.0, 1.0, 1.0, 1.0]);
    let mut vehicle = Vehicle::autonomous(pt(0.0, 0.0), &params, network).expect("valid vehicle");
    vehicle.update(&no_obstacles(), &params.kinematics).expect("five inputs");

    let snapshot = vehicle.snapshot();
    assert_eq!(snapshot.kind, DriverKind::Autonomous);
    assert_eq!(snapshot.polygon.len(), 4);
    assert_eq!(snapshot.rays.len(), 5);
    assert!(snapshot.readings.iter().all(Option::is_none));
    assert_eq!(snapshot.network.as_ref().map(Vec::len), Some(1));
    assert!(!snapshot.collided);

    let json = serde_json::to_value(&snapshot).expect("serialize");
    assert!(json.get("polygon").is_some());
}
