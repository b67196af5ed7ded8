//! Zone boundaries along a straight route through the intersection
//!
//! Every heading uses the same layout, measured along the heading's
//! progress coordinate with the intersection centred on the origin. A
//! vehicle overlaps a zone while its front bumper is past the zone start and
//! its rear bumper has not yet cleared the zone end.

use std::collections::HashMap;

use super::types::{VehicleId, Zone};

/// Progress coordinate where vehicles are spawned
pub const ROUTE_START: f32 = -60.0;
/// Progress coordinate past which vehicles leave the simulation
pub const ROUTE_END: f32 = 40.0;

/// Half-open `[start, end)` interval of one zone along the route
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneSpan {
    pub zone: Zone,
    pub start: f32,
    pub end: f32,
}

/// Consecutive zone spans in route order
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLayout {
    spans: [ZoneSpan; 4],
}

impl Default for RouteLayout {
    fn default() -> Self {
        Self::new(20.0, 3.0, 6.0, 15.0)
    }
}

impl RouteLayout {
    /// Layout with the intersection box spanning `[-half_width, half_width)`,
    /// the crosswalk right before it and the approach before that.
    pub fn new(approach_length: f32, crosswalk_width: f32, half_width: f32, exit_length: f32) -> Self {
        let crosswalk_start = -half_width - crosswalk_width;
        let approach_start = crosswalk_start - approach_length;
        Self {
            spans: [
                ZoneSpan { zone: Zone::Approach, start: approach_start, end: crosswalk_start },
                ZoneSpan { zone: Zone::Crosswalk, start: crosswalk_start, end: -half_width },
                ZoneSpan { zone: Zone::Intersection, start: -half_width, end: half_width },
                ZoneSpan { zone: Zone::Exit, start: half_width, end: half_width + exit_length },
            ],
        }
    }

    pub fn spans(&self) -> &[ZoneSpan] {
        &self.spans
    }

    pub fn span(&self, zone: Zone) -> Option<&ZoneSpan> {
        self.spans.iter().find(|span| span.zone == zone)
    }

    /// Bitmask of zones overlapped by a vehicle centred at `progress`
    fn overlap(&self, progress: f32, length: f32) -> u8 {
        let front = progress + length / 2.0;
        let rear = progress - length / 2.0;
        self.spans
            .iter()
            .enumerate()
            .filter(|(_, span)| front > span.start && rear < span.end)
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }
}

/// A boundary crossing to deliver to a vehicle agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneEvent {
    Enter(Zone),
    Exit(Zone),
}

/// Turns vehicle progress into zone enter/exit notifications
#[derive(Debug, Default)]
pub struct ZoneTracker {
    layout: RouteLayout,
    overlaps: HashMap<VehicleId, u8>,
}

impl ZoneTracker {
    pub fn new(layout: RouteLayout) -> Self {
        Self {
            layout,
            overlaps: HashMap::new(),
        }
    }

    pub fn layout(&self) -> &RouteLayout {
        &self.layout
    }

    /// Notifications since the previous update: exits first, then enters,
    /// each in route order.
    pub fn update(&mut self, id: VehicleId, progress: f32, length: f32) -> Vec<ZoneEvent> {
        let current = self.layout.overlap(progress, length);
        let previous = self.overlaps.insert(id, current).unwrap_or(0);

        let left = previous & !current;
        let entered = current & !previous;

        let mut events = Vec::new();
        for (i, span) in self.layout.spans.iter().enumerate() {
            if left & (1 << i) != 0 {
                events.push(ZoneEvent::Exit(span.zone));
            }
        }
        for (i, span) in self.layout.spans.iter().enumerate() {
            if entered & (1 << i) != 0 {
                events.push(ZoneEvent::Enter(span.zone));
            }
        }
        events
    }

    pub fn forget(&mut self, id: VehicleId) {
        self.overlaps.remove(&id);
    }

    pub fn tracked(&self) -> usize {
        self.overlaps.len()
    }
}
