//! Vehicle agent behavior for the intersection simulation
//!
//! Each agent follows the car ahead using forward range queries and holds
//! at the approach while its signal is red or yellow. Signal state arrives
//! as pushed events and is cached locally; the agent never reads the
//! controller while ticking.

use log::{debug, warn};

use super::config::VehicleConfig;
use super::error::{check_delta, SimError, SimResult};
use super::events::{ListenerAction, SignalChange, SignalListener};
use super::intersection::IntersectionPhaseController;
use super::spatial::SpatialRangeQuery;
use super::types::{Direction, Position, SignalColor, VehicleId, Zone};

/// Range of the car-following probe
pub const FOLLOW_PROBE_RANGE: f32 = 100.0;

/// Primary motion state of a vehicle
///
/// Maps onto the legacy `(is_moving, is_stopping)` pairs as
/// `Accelerating = (true, false)`, `Decelerating = (false, true)` and
/// `Stopped = (false, false)`. The pair `(true, true)` is never produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    /// Free to speed up toward max speed
    Accelerating,
    /// Braking on a stop order from the signal policy
    Decelerating,
    /// Halted by a projected collision
    Stopped,
}

/// A vehicle travelling one straight lane through the intersection
#[derive(Debug, Clone)]
pub struct VehicleAgent {
    pub id: VehicleId,
    config: VehicleConfig,
    position: Position,
    speed: f32,
    zone: Zone,
    motion: MotionState,
    waiting_for_light: bool,
    in_queue: bool,
    /// Last color seen for each direction, indexed by `Direction::index`
    signals: [SignalColor; 4],
    distance_travelled: f32,
}

impl VehicleAgent {
    pub fn new(id: VehicleId, config: VehicleConfig, position: Position) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            id,
            config,
            position,
            speed: 0.0,
            zone: Zone::None,
            motion: MotionState::Accelerating,
            waiting_for_light: false,
            in_queue: false,
            signals: [SignalColor::Red; 4],
            distance_travelled: 0.0,
        })
    }

    /// Refresh the cached signal copy from the controller's current state
    pub fn sync_signals(&mut self, controller: &IntersectionPhaseController) {
        for direction in Direction::ALL {
            self.signals[direction.index()] = controller.current_signal(direction);
        }
    }

    /// Signal change pushed by the controller
    pub fn on_signal_changed(&mut self, direction: Direction, color: SignalColor) {
        self.signals[direction.index()] = color;
        if direction == self.config.travel_direction {
            self.evaluate_signal();
        }
    }

    /// The vehicle crossed into a zone boundary
    pub fn on_zone_enter(&mut self, zone: Zone) -> SimResult<()> {
        let Some(index) = zone.route_index() else {
            return Err(SimError::InvalidArgument(format!(
                "vehicle {} cannot enter zone {:?}",
                self.id, zone
            )));
        };

        let expected = self.zone.route_index().map_or(0, |current| current + 1);
        if index != expected {
            warn!(
                "Vehicle {} entered {:?} out of route order (was in {:?})",
                self.id, zone, self.zone
            );
        }

        self.zone = zone;
        debug!("Vehicle {} entered {:?} zone", self.id, zone);

        if zone == Zone::Approach {
            self.evaluate_signal();
        }
        Ok(())
    }

    /// The vehicle left a zone boundary
    pub fn on_zone_exit(&mut self, zone: Zone) -> SimResult<()> {
        if zone == Zone::None {
            return Err(SimError::InvalidArgument(format!(
                "vehicle {} cannot exit zone {:?}",
                self.id, zone
            )));
        }

        debug!("Vehicle {} exited {:?} zone", self.id, zone);

        // Cleared regardless of the current color; a vehicle straddling the
        // approach boundary may resume against a red.
        if zone == Zone::Approach {
            self.waiting_for_light = false;
        }
        Ok(())
    }

    /// Stop/go decision for the travel direction's cached color
    fn evaluate_signal(&mut self) {
        let color = self.signals[self.config.travel_direction.index()];

        if color.is_stop() {
            if self.zone == Zone::Approach || self.in_queue {
                self.motion = MotionState::Decelerating;
                self.waiting_for_light = true;
                debug!(
                    "Vehicle {} stopping for {} at ({:.1}, {:.1})",
                    self.id, color, self.position.x, self.position.z
                );
            }
        } else {
            self.motion = MotionState::Accelerating;
            self.waiting_for_light = false;
            debug!("Vehicle {} proceeding on green", self.id);
        }
    }

    /// Advance kinematics by one simulation step
    pub fn tick(&mut self, delta_secs: f32, space: &dyn SpatialRangeQuery) -> SimResult<()> {
        check_delta(delta_secs)?;

        let heading = self.config.travel_direction;
        let layers = self.config.obstacle_layers;
        let half_length = self.config.half_length();
        let min_gap = self.config.min_distance_between_cars;

        let gap = space
            .cast_forward(self.position, heading, FOLLOW_PROBE_RANGE, layers)
            .map_or(f32::MAX, |hit| hit - half_length);

        let held_by_light = self.waiting_for_light && self.zone == Zone::Approach;
        let can_move = !held_by_light && gap > min_gap;

        if can_move && !self.is_stopping() {
            let max_speed = self.config.max_speed;
            let next = self.speed + self.config.acceleration_rate * delta_secs;
            // Snap onto the cap when only rounding error is left.
            self.speed = if max_speed - next <= f32::EPSILON * max_speed * 4.0 {
                max_speed
            } else {
                next
            };
        } else {
            let target_speed = if self.waiting_for_light || gap <= min_gap {
                0.0
            } else {
                ((gap - min_gap) / self.config.stopping_distance * self.config.max_speed)
                    .clamp(0.0, self.config.max_speed)
            };
            self.speed = (self.speed - self.config.deceleration_rate * delta_secs).max(target_speed);
        }

        let movement = self.speed * delta_secs;
        let collision_probe = movement + min_gap + half_length;
        let blocked = space
            .cast_forward(self.position, heading, collision_probe, layers)
            .is_some();

        if blocked {
            self.speed = 0.0;
            self.motion = MotionState::Stopped;
        } else {
            self.position = self.position.offset(&heading.forward(), movement);
            self.distance_travelled += movement;
            if self.speed > 0.0 {
                self.motion = MotionState::Accelerating;
            }
        }

        self.in_queue = space
            .cast_forward(self.position, heading, 2.0 * self.config.stopping_distance, layers)
            .is_some();

        Ok(())
    }

    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn heading(&self) -> Direction {
        self.config.travel_direction
    }

    /// Distance along the heading, the coordinate zones are laid out on
    pub fn progress(&self) -> f32 {
        self.position.dot(&self.heading().forward())
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn motion(&self) -> MotionState {
        self.motion
    }

    pub fn is_moving(&self) -> bool {
        self.motion == MotionState::Accelerating
    }

    pub fn is_stopping(&self) -> bool {
        self.motion == MotionState::Decelerating
    }

    pub fn is_waiting_for_light(&self) -> bool {
        self.waiting_for_light
    }

    pub fn is_in_queue(&self) -> bool {
        self.in_queue
    }

    pub fn cached_signal(&self, direction: Direction) -> SignalColor {
        self.signals[direction.index()]
    }

    pub fn distance_travelled(&self) -> f32 {
        self.distance_travelled
    }
}

impl SignalListener for VehicleAgent {
    fn on_signal_changed(&mut self, change: SignalChange) -> ListenerAction {
        VehicleAgent::on_signal_changed(self, change.direction, change.color);
        ListenerAction::Keep
    }
}
