//! Driver world validation
//!
//! Runs the controller, vehicle agents and collaborators together.

use intersection_sim::simulation::{
    ControllerConfig, Direction, Phase, SimWorld, VehicleConfig, WorldConfig,
};

fn seeded_world() -> SimWorld {
    SimWorld::with_seed(WorldConfig::default(), 42).expect("valid config")
}

#[test]
fn test_world_starts_controller() {
    let world = seeded_world();

    assert!(world.controller().is_running());
    assert_eq!(world.controller().phase(), Phase::NsGreen);
    assert_eq!(world.vehicle_count(), 0);
    assert_eq!(world.controller().subscriber_count(), 0);
}

#[test]
fn test_spawn_subscribes_and_blocks_occupied_lane() {
    let mut world = seeded_world();

    let first = world.spawn_vehicle(Direction::North).unwrap();
    assert!(first.is_some());
    assert_eq!(world.controller().subscriber_count(), 1);
    assert_eq!(world.lanes().len(), 1);

    // The spawn point is still occupied by the first vehicle.
    assert!(world.spawn_vehicle(Direction::North).unwrap().is_none());
    assert_eq!(world.stats().spawns_blocked, 1);

    assert!(world.spawn_vehicle(Direction::East).unwrap().is_some());
    assert_eq!(world.vehicle_count(), 2);
    assert_eq!(world.stats().vehicles_spawned, 2);

    let id = first.unwrap();
    let vehicle = world.vehicle(id).unwrap();
    assert_eq!(vehicle.heading(), Direction::North);
    assert_eq!(vehicle.position(), SimWorld::spawn_position(Direction::North));
}

#[test]
fn test_despawn_unsubscribes() {
    let mut world = seeded_world();
    let id = world.spawn_vehicle(Direction::South).unwrap().unwrap();

    assert!(world.despawn_vehicle(id));
    assert!(!world.despawn_vehicle(id));
    assert_eq!(world.controller().subscriber_count(), 0);
    assert!(world.lanes().is_empty());
    assert!(world.vehicle(id).is_none());
}

#[test]
fn test_vehicle_caches_follow_controller() {
    let mut world = seeded_world();
    world.spawn_vehicle(Direction::East).unwrap();

    for _ in 0..200 {
        world.tick(0.5).unwrap();

        for id in world.vehicle_ids() {
            let vehicle = world.vehicle(id).unwrap();
            for direction in Direction::ALL {
                assert_eq!(
                    vehicle.cached_signal(direction),
                    world.controller().current_signal(direction)
                );
            }
        }
    }
}

#[test]
fn test_seeded_run_moves_traffic_through() {
    let mut world = seeded_world();

    for _ in 0..3000 {
        world.tick(0.1).unwrap();
        world.controller().check_invariants().unwrap();

        for id in world.vehicle_ids() {
            let vehicle = world.vehicle(id).unwrap();
            assert!(vehicle.speed() >= 0.0);
            assert!(vehicle.speed() <= vehicle.config().max_speed);
        }
    }

    let stats = world.stats().clone();
    assert!(stats.vehicles_spawned > 0);
    assert!(stats.vehicles_exited > 0);
    assert_eq!(
        stats.vehicles_spawned,
        stats.vehicles_exited + world.vehicle_count()
    );
    assert_eq!(world.controller().subscriber_count(), world.vehicle_count());
    assert!(world.controller().cycles_completed() >= 4);
}

#[test]
fn test_rejects_invalid_world_config() {
    let bad_controller = WorldConfig {
        controller: ControllerConfig {
            all_red_duration: 0.0,
            ..ControllerConfig::default()
        },
        ..WorldConfig::default()
    };
    assert!(SimWorld::new(bad_controller).is_err());

    let bad_vehicle = WorldConfig {
        vehicle: VehicleConfig {
            car_length: -4.0,
            ..VehicleConfig::default()
        },
        ..WorldConfig::default()
    };
    assert!(SimWorld::new(bad_vehicle).is_err());

    let bad_spawn = WorldConfig {
        spawn_jitter: 10.0,
        ..WorldConfig::default()
    };
    assert!(SimWorld::new(bad_spawn).is_err());
}
