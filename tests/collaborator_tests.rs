//! Lane index and zone tracker
//!
//! These stand in for the physics ray-cast and trigger volumes of a full
//! scene, so their contracts are checked on their own.

use intersection_sim::simulation::{
    Direction, LaneIndex, LayerMask, Position, RouteLayout, SimId, SpatialRangeQuery, VehicleId,
    Zone, ZoneEvent, ZoneTracker,
};

fn id(n: usize) -> VehicleId {
    VehicleId(SimId(n))
}

fn north(z: f32) -> Position {
    Position::new(1.75, 0.0, z)
}

#[test]
fn test_lane_index_finds_nearest_obstacle_ahead() {
    let mut lanes = LaneIndex::new();
    lanes.upsert(id(1), Direction::North, north(10.0), 2.0, LayerMask::VEHICLES);
    lanes.upsert(id(2), Direction::North, north(20.0), 2.0, LayerMask::VEHICLES);

    let ahead = |z: f32, range: f32| {
        lanes.cast_forward(north(z), Direction::North, range, LayerMask::VEHICLES)
    };

    assert_eq!(ahead(0.0, 100.0), Some(8.0));
    assert_eq!(ahead(12.0, 100.0), Some(6.0));
    assert_eq!(ahead(0.0, 5.0), None);
    assert_eq!(ahead(25.0, 100.0), None);
    assert_eq!(lanes.len(), 2);
    assert_eq!(lanes.lane_len(Direction::North), 2);
}

#[test]
fn test_lane_index_keeps_headings_apart() {
    let mut lanes = LaneIndex::new();
    lanes.upsert(id(1), Direction::North, north(10.0), 2.0, LayerMask::VEHICLES);

    let south = lanes.cast_forward(
        Position::new(-1.75, 0.0, 30.0),
        Direction::South,
        100.0,
        LayerMask::VEHICLES,
    );
    assert_eq!(south, None);
    assert_eq!(lanes.lane_len(Direction::South), 0);
}

#[test]
fn test_lane_index_moves_and_removes() {
    let mut lanes = LaneIndex::new();
    lanes.upsert(id(1), Direction::North, north(10.0), 2.0, LayerMask::VEHICLES);
    lanes.upsert(id(2), Direction::North, north(20.0), 2.0, LayerMask::VEHICLES);

    assert!(lanes.remove(id(1)));
    assert!(!lanes.remove(id(1)));
    assert_eq!(
        lanes.cast_forward(north(0.0), Direction::North, 100.0, LayerMask::VEHICLES),
        Some(18.0)
    );

    lanes.upsert(id(2), Direction::North, north(5.0), 2.0, LayerMask::VEHICLES);
    assert_eq!(lanes.len(), 1);
    assert_eq!(
        lanes.cast_forward(north(0.0), Direction::North, 100.0, LayerMask::VEHICLES),
        Some(3.0)
    );

    // Overlapping obstacles report a zero distance.
    assert_eq!(
        lanes.cast_forward(north(4.0), Direction::North, 100.0, LayerMask::VEHICLES),
        Some(0.0)
    );
}

#[test]
fn test_lane_index_skips_the_caller_and_filtered_layers() {
    let mut lanes = LaneIndex::new();
    lanes.upsert(id(0), Direction::North, north(0.0), 2.0, LayerMask::VEHICLES);
    lanes.upsert(id(1), Direction::North, north(6.0), 1.0, LayerMask::STATIC);
    lanes.upsert(id(2), Direction::North, north(15.0), 2.0, LayerMask::VEHICLES);

    assert_eq!(
        lanes.cast_forward(north(0.0), Direction::North, 100.0, LayerMask::VEHICLES),
        Some(13.0)
    );
    assert_eq!(
        lanes.cast_forward(north(0.0), Direction::North, 100.0, LayerMask::ALL),
        Some(5.0)
    );
    assert_eq!(
        lanes.cast_forward(north(0.0), Direction::North, 100.0, LayerMask::NONE),
        None
    );
    assert!(LayerMask::VEHICLES.union(LayerMask::STATIC).contains(LayerMask::STATIC));
}

#[test]
fn test_zone_tracker_reports_crossings_in_route_order() {
    let mut tracker = ZoneTracker::new(RouteLayout::default());
    let car = id(7);

    assert!(tracker.update(car, -40.0, 4.0).is_empty());
    assert_eq!(
        tracker.update(car, -28.0, 4.0),
        vec![ZoneEvent::Enter(Zone::Approach)]
    );
    assert!(tracker.update(car, -20.0, 4.0).is_empty());
    assert_eq!(
        tracker.update(car, -8.0, 4.0),
        vec![ZoneEvent::Enter(Zone::Crosswalk)]
    );
    assert_eq!(
        tracker.update(car, -5.0, 4.0),
        vec![
            ZoneEvent::Exit(Zone::Approach),
            ZoneEvent::Enter(Zone::Intersection)
        ]
    );
    assert_eq!(
        tracker.update(car, 10.0, 4.0),
        vec![
            ZoneEvent::Exit(Zone::Crosswalk),
            ZoneEvent::Exit(Zone::Intersection),
            ZoneEvent::Enter(Zone::Exit)
        ]
    );
    assert_eq!(
        tracker.update(car, 30.0, 4.0),
        vec![ZoneEvent::Exit(Zone::Exit)]
    );

    assert_eq!(tracker.tracked(), 1);
    tracker.forget(car);
    assert_eq!(tracker.tracked(), 0);
}

#[test]
fn test_route_layout_is_contiguous() {
    let layout = RouteLayout::default();
    let spans = layout.spans();

    assert_eq!(
        spans.iter().map(|span| span.zone).collect::<Vec<_>>(),
        Zone::ROUTE.to_vec()
    );
    for pair in spans.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }

    let intersection = layout.span(Zone::Intersection).unwrap();
    assert_eq!(intersection.start, -intersection.end);
    assert!(layout.span(Zone::None).is_none());
}
