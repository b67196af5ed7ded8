//! Core types for the intersection simulation

use std::fmt;

use super::error::{SimError, SimResult};

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimId(pub usize);

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VehicleId(pub SimId);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0 .0)
    }
}

/// Approach direction of a signal head, and travel direction of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The direction that always shares this direction's signal color
    pub fn partner(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Unit vector of travel on the ground plane
    pub fn forward(self) -> Position {
        match self {
            Direction::North => Position::new(0.0, 0.0, 1.0),
            Direction::South => Position::new(0.0, 0.0, -1.0),
            Direction::East => Position::new(1.0, 0.0, 0.0),
            Direction::West => Position::new(-1.0, 0.0, 0.0),
        }
    }

    /// Unit vector pointing to the right-hand side of travel
    pub fn right(self) -> Position {
        let f = self.forward();
        Position::new(f.z, 0.0, -f.x)
    }
}

impl TryFrom<usize> for Direction {
    type Error = SimError;

    fn try_from(index: usize) -> SimResult<Self> {
        Direction::ALL.get(index).copied().ok_or_else(|| {
            SimError::InvalidArgument(format!("direction index {index} is out of range 0..4"))
        })
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "North",
            Direction::South => "South",
            Direction::East => "East",
            Direction::West => "West",
        };
        f.pad(name)
    }
}

/// Color of a vehicle signal head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalColor {
    Red,
    Yellow,
    Green,
}

impl SignalColor {
    /// Red and Yellow both hold vehicles at the approach
    pub fn is_stop(self) -> bool {
        !matches!(self, SignalColor::Green)
    }
}

impl fmt::Display for SignalColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalColor::Red => "Red",
            SignalColor::Yellow => "Yellow",
            SignalColor::Green => "Green",
        };
        f.pad(name)
    }
}

/// Named region along a vehicle's route, in travel order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Zone {
    #[default]
    None,
    Approach,
    Crosswalk,
    Intersection,
    Exit,
}

impl Zone {
    /// The zones a route is made of, in the order a vehicle crosses them
    pub const ROUTE: [Zone; 4] = [Zone::Approach, Zone::Crosswalk, Zone::Intersection, Zone::Exit];

    /// Position of the zone along the route; `None` for `Zone::None`
    pub fn route_index(self) -> Option<usize> {
        Zone::ROUTE.iter().position(|zone| *zone == self)
    }
}

impl TryFrom<u8> for Zone {
    type Error = SimError;

    fn try_from(index: u8) -> SimResult<Self> {
        match index {
            0 => Ok(Zone::None),
            1 => Ok(Zone::Approach),
            2 => Ok(Zone::Crosswalk),
            3 => Ok(Zone::Intersection),
            4 => Ok(Zone::Exit),
            other => Err(SimError::InvalidArgument(format!(
                "zone index {other} is out of range 0..5"
            ))),
        }
    }
}

/// A 3D position in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Position) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// This position moved `distance` units along `direction`
    pub fn offset(&self, direction: &Position, distance: f32) -> Position {
        Position {
            x: self.x + direction.x * distance,
            y: self.y + direction.y * distance,
            z: self.z + direction.z * distance,
        }
    }
}
