//! Standalone intersection simulation module
//!
//! This module contains the signal controller, the vehicle agents and the
//! reference collaborators they talk to. Everything runs on simulated time
//! advanced by the caller, so it can be tested by single-stepping.

mod car;
mod config;
mod error;
mod events;
mod intersection;
mod spatial;
mod types;
mod world;
mod zones;

pub use car::{MotionState, VehicleAgent, FOLLOW_PROBE_RANGE};
pub use config::{
    ControllerConfig, VehicleConfig, WorldConfig, DEFAULT_ALL_RED_DURATION,
    DEFAULT_GREEN_DURATION, DEFAULT_YELLOW_DURATION,
};
pub use error::{SimError, SimResult};
pub use events::{
    ListenerAction, ListenerId, SharedListener, SignalBus, SignalChange, SignalListener,
};
pub use intersection::{IntersectionPhaseController, Phase, PEDESTRIAN_HEAD_COUNT};
pub use spatial::{LaneIndex, LayerMask, Obstacle, SpatialRangeQuery};
pub use types::{Direction, Position, SignalColor, SimId, VehicleId, Zone};
pub use world::{SimStats, SimWorld, LANE_OFFSET};
pub use zones::{RouteLayout, ZoneEvent, ZoneSpan, ZoneTracker, ROUTE_END, ROUTE_START};
