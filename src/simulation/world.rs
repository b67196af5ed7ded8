//! Main simulation world that ties everything together
//!
//! The world is the external driver of the simulation: once per frame it
//! advances the signal controller, spawns vehicles at the start of each
//! lane, ticks every vehicle agent, keeps the lane index and zone tracker in
//! step with the agents, and removes vehicles that have cleared the route.

use anyhow::{Context, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use super::car::VehicleAgent;
use super::config::WorldConfig;
use super::events::{ListenerId, SharedListener};
use super::intersection::IntersectionPhaseController;
use super::spatial::{LaneIndex, LayerMask, SpatialRangeQuery};
use super::types::{Direction, Position, SimId, VehicleId};
use super::zones::{RouteLayout, ZoneEvent, ZoneTracker, ROUTE_END, ROUTE_START};

/// Lateral offset of every lane from the road centre line (right-hand traffic)
pub const LANE_OFFSET: f32 = 1.75;

/// Running totals for the world
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimStats {
    pub vehicles_spawned: usize,
    pub vehicles_exited: usize,
    /// Spawn attempts skipped because the lane start was occupied
    pub spawns_blocked: usize,
}

/// A vehicle agent together with its signal subscription
struct SimVehicle {
    agent: Rc<RefCell<VehicleAgent>>,
    subscription: ListenerId,
}

/// The main simulation world
pub struct SimWorld {
    config: WorldConfig,
    controller: IntersectionPhaseController,
    lanes: LaneIndex,
    zones: ZoneTracker,
    /// Ordered by id, so older vehicles (further along) tick first
    vehicles: BTreeMap<VehicleId, SimVehicle>,
    /// Countdown to the next spawn attempt on each lane
    spawn_timers: [f32; 4],
    next_id: usize,
    /// Simulation time
    pub time: f32,
    stats: SimStats,
    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,
}

impl SimWorld {
    fn new_internal(config: WorldConfig, rng: Option<StdRng>) -> Result<Self> {
        config.validate().context("Invalid world configuration")?;

        let mut controller = IntersectionPhaseController::new(config.controller)
            .context("Invalid controller configuration")?;
        controller.start();

        let mut world = Self {
            config,
            controller,
            lanes: LaneIndex::new(),
            zones: ZoneTracker::new(RouteLayout::default()),
            vehicles: BTreeMap::new(),
            spawn_timers: [0.0; 4],
            next_id: 0,
            time: 0.0,
            stats: SimStats::default(),
            rng,
        };

        for direction in Direction::ALL {
            let first = world.random_range(0.0, world.config.spawn_interval);
            world.spawn_timers[direction.index()] = first;
        }

        Ok(world)
    }

    pub fn new(config: WorldConfig) -> Result<Self> {
        Self::new_internal(config, None)
    }

    /// Create a new SimWorld with a seeded RNG for reproducible simulations
    pub fn with_seed(config: WorldConfig, seed: u64) -> Result<Self> {
        Self::new_internal(config, Some(StdRng::seed_from_u64(seed)))
    }

    /// Get a random value in `[low, high)`, using seeded RNG if available
    fn random_range(&mut self, low: f32, high: f32) -> f32 {
        if high <= low {
            return low;
        }
        match &mut self.rng {
            Some(rng) => rng.random_range(low..high),
            None => rand::rng().random_range(low..high),
        }
    }

    fn next_sim_id(&mut self) -> SimId {
        let id = SimId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Where vehicles travelling `direction` enter the simulation
    pub fn spawn_position(direction: Direction) -> Position {
        Position::default()
            .offset(&direction.forward(), ROUTE_START)
            .offset(&direction.right(), LANE_OFFSET)
    }

    /// Spawn a vehicle at the start of the lane travelling `direction`.
    /// Returns `None` when the lane start is still occupied.
    pub fn spawn_vehicle(&mut self, direction: Direction) -> Result<Option<VehicleId>> {
        let template = self.config.vehicle.with_direction(direction);
        let position = Self::spawn_position(direction);

        // Probe from behind the spawn point so an obstacle sitting exactly on
        // it is not skipped as the caller.
        let clearance = template.half_length() + template.min_distance_between_cars;
        let probe_origin = position.offset(&direction.forward(), -clearance);
        let blocked = self
            .lanes
            .cast_forward(probe_origin, direction, 2.0 * clearance, template.obstacle_layers)
            .is_some();
        if blocked {
            self.stats.spawns_blocked += 1;
            return Ok(None);
        }

        let jitter = self.config.max_speed_jitter;
        let mut vehicle_config = template;
        vehicle_config.max_speed += self.random_range(-jitter, jitter);

        let id = VehicleId(self.next_sim_id());
        let mut agent = VehicleAgent::new(id, vehicle_config, position)
            .with_context(|| format!("Failed to create vehicle {id}"))?;
        agent.sync_signals(&self.controller);

        let agent = Rc::new(RefCell::new(agent));
        let listener: SharedListener = agent.clone();
        let subscription = self.controller.subscribe(listener);

        self.lanes.upsert(
            id,
            direction,
            position,
            vehicle_config.half_length(),
            LayerMask::VEHICLES,
        );
        self.zones
            .update(id, position.dot(&direction.forward()), vehicle_config.car_length);

        self.vehicles.insert(id, SimVehicle { agent, subscription });
        self.stats.vehicles_spawned += 1;
        debug!("Spawned vehicle {} heading {}", id, direction);

        Ok(Some(id))
    }

    /// Remove a vehicle and every reference to it.
    /// Returns false when the vehicle does not exist.
    pub fn despawn_vehicle(&mut self, id: VehicleId) -> bool {
        let Some(vehicle) = self.vehicles.remove(&id) else {
            return false;
        };
        self.controller.unsubscribe(vehicle.subscription);
        self.lanes.remove(id);
        self.zones.forget(id);
        true
    }

    /// Run one simulation frame
    pub fn tick(&mut self, delta_secs: f32) -> Result<()> {
        self.controller
            .advance(delta_secs)
            .context("Failed to advance the signal controller")?;
        self.time += delta_secs;

        self.update_spawns(delta_secs)?;

        let leaving = self.update_vehicles(delta_secs)?;
        for id in leaving {
            self.despawn_vehicle(id);
            self.stats.vehicles_exited += 1;
            debug!("Vehicle {} left the intersection", id);
        }

        Ok(())
    }

    fn update_spawns(&mut self, delta_secs: f32) -> Result<()> {
        for direction in Direction::ALL {
            let slot = direction.index();
            self.spawn_timers[slot] -= delta_secs;
            if self.spawn_timers[slot] > 0.0 {
                continue;
            }

            let interval = self.config.spawn_interval;
            let jitter = self.config.spawn_jitter;
            self.spawn_timers[slot] = self.random_range(interval - jitter, interval + jitter);
            self.spawn_vehicle(direction)?;
        }
        Ok(())
    }

    /// Tick every agent and deliver its zone notifications.
    /// Returns the vehicles that have cleared the end of the route.
    fn update_vehicles(&mut self, delta_secs: f32) -> Result<Vec<VehicleId>> {
        let mut leaving = Vec::new();

        for (id, vehicle) in &self.vehicles {
            let mut agent = vehicle.agent.borrow_mut();
            agent
                .tick(delta_secs, &self.lanes)
                .with_context(|| format!("Vehicle {id} failed to tick"))?;

            let config = *agent.config();
            self.lanes.upsert(
                *id,
                agent.heading(),
                agent.position(),
                config.half_length(),
                LayerMask::VEHICLES,
            );

            for event in self.zones.update(*id, agent.progress(), config.car_length) {
                let delivered = match event {
                    ZoneEvent::Enter(zone) => agent.on_zone_enter(zone),
                    ZoneEvent::Exit(zone) => agent.on_zone_exit(zone),
                };
                delivered.with_context(|| format!("Vehicle {id} rejected {event:?}"))?;
            }

            if agent.progress() - config.half_length() > ROUTE_END {
                leaving.push(*id);
            }
        }

        Ok(leaving)
    }

    pub fn controller(&self) -> &IntersectionPhaseController {
        &self.controller
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<Ref<'_, VehicleAgent>> {
        self.vehicles.get(&id).map(|vehicle| vehicle.agent.borrow())
    }

    pub fn vehicle_ids(&self) -> Vec<VehicleId> {
        self.vehicles.keys().copied().collect()
    }

    pub fn lanes(&self) -> &LaneIndex {
        &self.lanes
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Intersection Simulation Summary ===");
        println!("Time: {:.2}s", self.time);
        println!(
            "Phase: {:?} ({:.1}s left, cycle {})",
            self.controller.phase(),
            self.controller.phase_remaining(),
            self.controller.cycles_completed()
        );

        println!("--- Signals ---");
        for direction in Direction::ALL {
            println!(
                "  {:<5}: vehicle={:<6} pedestrian={}",
                direction,
                self.controller.current_signal(direction),
                if self.controller.is_pedestrian_walk_on(direction) {
                    "walk"
                } else {
                    "don't walk"
                }
            );
        }

        println!(
            "Vehicles: {} active, {} spawned, {} exited",
            self.vehicles.len(),
            self.stats.vehicles_spawned,
            self.stats.vehicles_exited
        );

        if !self.vehicles.is_empty() {
            println!("--- Active Vehicles ---");
            for (id, vehicle) in &self.vehicles {
                let agent = vehicle.agent.borrow();
                println!(
                    "  Vehicle {}: heading={:<5} speed={:.1}, progress={:.1}, zone={:?}, motion={:?}, waiting={}, queued={}",
                    id,
                    agent.heading(),
                    agent.speed(),
                    agent.progress(),
                    agent.zone(),
                    agent.motion(),
                    agent.is_waiting_for_light(),
                    agent.is_in_queue()
                );
            }
        }
    }

    /// Log the end-of-run statistics
    pub fn log_report(&self) {
        let throughput = if self.stats.vehicles_spawned > 0 {
            self.stats.vehicles_exited as f32 / self.stats.vehicles_spawned as f32 * 100.0
        } else {
            0.0
        };

        info!("=== SIMULATION COMPLETE ===");
        info!("Elapsed time: {:.2}s", self.time);
        info!("Signal cycles completed: {}", self.controller.cycles_completed());
        info!("Signal changes published: {}", self.controller.changes_published());
        info!("Total vehicles spawned: {}", self.stats.vehicles_spawned);
        info!("Total vehicles exited: {}", self.stats.vehicles_exited);
        info!("Spawns blocked: {}", self.stats.spawns_blocked);
        info!("Active vehicles: {}", self.vehicles.len());
        info!("Throughput: {:.1}%", throughput);
    }
}
