#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use selfdrive::simulation::road::Road;

#[test]
fn test_lane_centers() {
    let road = Road::new(100.0, 180.0, 3);

    assert_eq!(road.left(), 10.0);
    assert_eq!(road.right(), 190.0);
    assert_eq!(road.lane_center(0), 40.0);
    assert_eq!(road.lane_center(1), 100.0);
    assert_eq!(road.lane_center(2), 160.0);
}

#[test]
fn test_lane_index_is_clamped() {
    let road = Road::new(100.0, 180.0, 3);

    assert_eq!(road.lane_center(3), road.lane_center(2));
    assert_eq!(road.lane_center(usize::MAX), road.lane_center(2));
}

#[test]
fn test_borders_are_vertical_edges() {
    let road = Road::new(100.0, 180.0, 3);
    let [left, right] = road.borders();

    assert_eq!(left.start.x, 10.0);
    assert_eq!(left.end.x, 10.0);
    assert_eq!(right.start.x, 190.0);
    assert!(left.start.y < -1_000_000.0);
    assert!(left.end.y > 1_000_000.0);

    let polygons = road.border_polygons();
    assert_eq!(polygons.len(), 2);
    assert!(polygons.iter().all(|polygon| polygon.len() == 2));
}

#[test]
fn test_lane_dividers() {
    let road = Road::new(100.0, 180.0, 3);
    let dividers = road.lane_dividers();

    assert_eq!(dividers.len(), 2);
    assert!((dividers[0].start.x - 70.0).abs() < 1e-9);
    assert!((dividers[1].start.x - 130.0).abs() < 1e-9);
}

#[test]
fn test_zero_lanes_become_one() {
    let road = Road::new(0.0, 100.0, 0);

    assert_eq!(road.lane_count(), 1);
    assert_eq!(road.lane_center(0), 0.0);
    assert!(road.lane_dividers().is_empty());
}

#[test]
fn test_loaded_road_is_rebuilt_from_its_layout() {
    let road: Road =
        serde_json::from_str(r#"{"center_x": 100.0, "width": 180.0, "lane_count": 0}"#)
            .expect("valid layout");
    assert_eq!(road.lane_count(), 1);
    assert_eq!(road.lane_center(3), 100.0);
    assert_eq!(road.borders()[0].start.x, 10.0);

    let json = serde_json::to_string(&Road::new(100.0, 180.0, 3)).expect("serialize");
    let reloaded: Road = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(reloaded.lane_count(), 3);
    assert_eq!(reloaded.left(), 10.0);
    assert_eq!(reloaded.right(), 190.0);
}
