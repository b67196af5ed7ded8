//! Configuration for the controller, the vehicle agents and the driver world
//!
//! Every struct validates itself; construction of the component that owns it
//! fails with [`SimError::Configuration`] on a bad value.

use super::error::{SimError, SimResult};
use super::spatial::LayerMask;
use super::types::Direction;

/// Default green time for a vehicle pair, in seconds
pub const DEFAULT_GREEN_DURATION: f32 = 30.0;
/// Default yellow time for a vehicle pair, in seconds
pub const DEFAULT_YELLOW_DURATION: f32 = 5.0;
/// Default all-red clearance time, in seconds
pub const DEFAULT_ALL_RED_DURATION: f32 = 2.0;

fn require_positive(name: &str, value: f32) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::Configuration(format!(
            "{name} must be a positive finite number, got {value}"
        )))
    }
}

fn require_non_negative(name: &str, value: f32) -> SimResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::Configuration(format!(
            "{name} must be a non-negative finite number, got {value}"
        )))
    }
}

/// Fixed phase durations of the intersection controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    pub vehicle_green_duration: f32,
    pub vehicle_yellow_duration: f32,
    pub all_red_duration: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            vehicle_green_duration: DEFAULT_GREEN_DURATION,
            vehicle_yellow_duration: DEFAULT_YELLOW_DURATION,
            all_red_duration: DEFAULT_ALL_RED_DURATION,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> SimResult<()> {
        require_positive("vehicle_green_duration", self.vehicle_green_duration)?;
        require_positive("vehicle_yellow_duration", self.vehicle_yellow_duration)?;
        require_positive("all_red_duration", self.all_red_duration)
    }

    /// Length of one full six-phase cycle
    pub fn cycle_duration(&self) -> f32 {
        2.0 * (self.vehicle_green_duration + self.vehicle_yellow_duration + self.all_red_duration)
    }
}

/// Per-vehicle kinematic parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleConfig {
    pub max_speed: f32,
    pub acceleration_rate: f32,
    pub deceleration_rate: f32,
    /// Gap over which the vehicle ramps its speed down to zero
    pub stopping_distance: f32,
    pub min_distance_between_cars: f32,
    pub car_length: f32,
    pub travel_direction: Direction,
    /// Layers the vehicle treats as obstacles when probing ahead
    pub obstacle_layers: LayerMask,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            max_speed: 5.0,
            acceleration_rate: 2.0,
            deceleration_rate: 4.0,
            stopping_distance: 2.0,
            min_distance_between_cars: 0.5,
            car_length: 4.0,
            travel_direction: Direction::North,
            obstacle_layers: LayerMask::VEHICLES,
        }
    }
}

impl VehicleConfig {
    pub fn validate(&self) -> SimResult<()> {
        require_positive("max_speed", self.max_speed)?;
        require_positive("acceleration_rate", self.acceleration_rate)?;
        require_positive("deceleration_rate", self.deceleration_rate)?;
        require_positive("stopping_distance", self.stopping_distance)?;
        require_positive("min_distance_between_cars", self.min_distance_between_cars)?;
        require_positive("car_length", self.car_length)
    }

    pub fn half_length(&self) -> f32 {
        self.car_length / 2.0
    }

    pub fn with_direction(mut self, travel_direction: Direction) -> Self {
        self.travel_direction = travel_direction;
        self
    }
}

/// Settings of the headless driver world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldConfig {
    pub controller: ControllerConfig,
    /// Template for spawned vehicles; the travel direction is overridden per lane
    pub vehicle: VehicleConfig,
    /// Mean seconds between spawn attempts on each lane
    pub spawn_interval: f32,
    /// Random spread applied to each spawn interval, in seconds
    pub spawn_jitter: f32,
    /// Random spread applied to each vehicle's max speed
    pub max_speed_jitter: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            controller: ControllerConfig::default(),
            vehicle: VehicleConfig::default(),
            spawn_interval: 6.0,
            spawn_jitter: 2.0,
            max_speed_jitter: 1.0,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> SimResult<()> {
        self.controller.validate()?;
        self.vehicle.validate()?;
        require_positive("spawn_interval", self.spawn_interval)?;
        require_non_negative("spawn_jitter", self.spawn_jitter)?;
        require_non_negative("max_speed_jitter", self.max_speed_jitter)?;
        if self.spawn_jitter >= self.spawn_interval {
            return Err(SimError::Configuration(format!(
                "spawn_jitter ({}) must be smaller than spawn_interval ({})",
                self.spawn_jitter, self.spawn_interval
            )));
        }
        if self.max_speed_jitter >= self.vehicle.max_speed {
            return Err(SimError::Configuration(format!(
                "max_speed_jitter ({}) must be smaller than max_speed ({})",
                self.max_speed_jitter, self.vehicle.max_speed
            )));
        }
        Ok(())
    }
}
