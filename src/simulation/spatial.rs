//! Forward range queries against obstacles on the road
//!
//! Vehicle agents only see the world through [`SpatialRangeQuery`]. The
//! [`LaneIndex`] implementation keeps one ordered map per travel heading,
//! keyed by distance along that heading, so "nearest obstacle ahead" is a
//! single ordered range scan.

use ordered_float::OrderedFloat;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use super::types::{Direction, Position, SimId, VehicleId};

/// Bitmask of obstacle layers a query is allowed to hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const VEHICLES: LayerMask = LayerMask(1);
    pub const STATIC: LayerMask = LayerMask(1 << 1);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub fn contains(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(self, other: LayerMask) -> LayerMask {
        LayerMask(self.0 | other.0)
    }
}

/// Distance to the nearest obstacle along a ray
pub trait SpatialRangeQuery {
    /// Distance from `origin` to the first obstacle hit travelling along
    /// `heading`, or `None` when nothing on `layers` lies within `max_range`.
    fn cast_forward(
        &self,
        origin: Position,
        heading: Direction,
        max_range: f32,
        layers: LayerMask,
    ) -> Option<f32>;
}

/// Something occupying a stretch of a lane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub id: VehicleId,
    pub half_length: f32,
    pub layer: LayerMask,
}

type LaneKey = (OrderedFloat<f32>, VehicleId);

/// Obstacles per heading, ordered by distance along the heading
#[derive(Debug, Default)]
pub struct LaneIndex {
    lanes: HashMap<Direction, BTreeMap<LaneKey, Obstacle>>,
    /// Where each obstacle is currently filed, for O(log n) moves
    locations: HashMap<VehicleId, (Direction, OrderedFloat<f32>)>,
}

impl LaneIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an obstacle or move it to a new position
    pub fn upsert(
        &mut self,
        id: VehicleId,
        heading: Direction,
        position: Position,
        half_length: f32,
        layer: LayerMask,
    ) {
        self.remove(id);

        let distance = OrderedFloat(position.dot(&heading.forward()));
        self.lanes
            .entry(heading)
            .or_default()
            .insert((distance, id), Obstacle { id, half_length, layer });
        self.locations.insert(id, (heading, distance));
    }

    /// Returns false when the obstacle was not tracked
    pub fn remove(&mut self, id: VehicleId) -> bool {
        let Some((heading, distance)) = self.locations.remove(&id) else {
            return false;
        };
        if let Some(lane) = self.lanes.get_mut(&heading) {
            lane.remove(&(distance, id));
        }
        true
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Number of obstacles filed on one heading
    pub fn lane_len(&self, heading: Direction) -> usize {
        self.lanes.get(&heading).map_or(0, |lane| lane.len())
    }
}

impl SpatialRangeQuery for LaneIndex {
    fn cast_forward(
        &self,
        origin: Position,
        heading: Direction,
        max_range: f32,
        layers: LayerMask,
    ) -> Option<f32> {
        let lane = self.lanes.get(&heading)?;
        let start = OrderedFloat(origin.dot(&heading.forward()));

        // Skip everything filed exactly at the origin, the caller included.
        let lower = Bound::Excluded((start, VehicleId(SimId(usize::MAX))));

        lane.range((lower, Bound::Unbounded))
            .find(|(_, obstacle)| layers.contains(obstacle.layer))
            .map(|((distance, _), obstacle)| {
                (distance.into_inner() - obstacle.half_length - start.into_inner()).max(0.0)
            })
            .filter(|hit| *hit <= max_range)
    }
}
