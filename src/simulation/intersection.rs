//! Intersection phase controller
//!
//! A fixed-time, six-phase signal cycle for a four-way intersection. The
//! controller is a resumable state machine: the driver calls
//! [`IntersectionPhaseController::advance`] with simulated time and the
//! controller steps through as many phase boundaries as that time covers.

use log::{debug, info, warn};

use super::config::ControllerConfig;
use super::error::{check_delta, SimError, SimResult};
use super::events::{ListenerId, SharedListener, SignalBus, SignalChange};
use super::types::{Direction, SignalColor};

/// Two pedestrian heads per approach direction
pub const PEDESTRIAN_HEAD_COUNT: usize = 8;

/// One fixed-duration state of the signal cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    NsGreen,
    NsYellow,
    AllRed1,
    EwGreen,
    EwYellow,
    AllRed2,
}

impl Phase {
    pub const CYCLE: [Phase; 6] = [
        Phase::NsGreen,
        Phase::NsYellow,
        Phase::AllRed1,
        Phase::EwGreen,
        Phase::EwYellow,
        Phase::AllRed2,
    ];

    pub fn next(self) -> Phase {
        match self {
            Phase::NsGreen => Phase::NsYellow,
            Phase::NsYellow => Phase::AllRed1,
            Phase::AllRed1 => Phase::EwGreen,
            Phase::EwGreen => Phase::EwYellow,
            Phase::EwYellow => Phase::AllRed2,
            Phase::AllRed2 => Phase::NsGreen,
        }
    }

    pub fn duration(self, config: &ControllerConfig) -> f32 {
        match self {
            Phase::NsGreen | Phase::EwGreen => config.vehicle_green_duration,
            Phase::NsYellow | Phase::EwYellow => config.vehicle_yellow_duration,
            Phase::AllRed1 | Phase::AllRed2 => config.all_red_duration,
        }
    }

    /// Vehicle color assignments made on entry, in assignment order
    fn vehicle_assignments(self) -> &'static [(Direction, SignalColor)] {
        use Direction::*;
        use SignalColor::*;
        match self {
            Phase::NsGreen => &[(North, Green), (South, Green), (East, Red), (West, Red)],
            Phase::NsYellow => &[(North, Yellow), (South, Yellow)],
            Phase::EwGreen => &[(East, Green), (West, Green), (North, Red), (South, Red)],
            Phase::EwYellow => &[(East, Yellow), (West, Yellow)],
            Phase::AllRed1 | Phase::AllRed2 => &[(North, Red), (South, Red), (East, Red), (West, Red)],
        }
    }

    /// Pedestrian head assignments made on entry
    fn pedestrian_assignments(self) -> &'static [(Direction, bool)] {
        use Direction::*;
        match self {
            Phase::NsGreen => &[(East, true), (West, true)],
            Phase::NsYellow => &[(East, false), (West, false)],
            Phase::EwGreen => &[(North, true), (South, true)],
            Phase::EwYellow => &[(North, false), (South, false)],
            Phase::AllRed1 | Phase::AllRed2 => &[],
        }
    }
}

/// Cyclic fixed-time controller owning all signal state of the intersection
pub struct IntersectionPhaseController {
    config: ControllerConfig,
    phase: Phase,
    /// Countdown until the current phase ends
    remaining: f32,
    running: bool,
    signals: [SignalColor; 4],
    pedestrian_heads: [bool; PEDESTRIAN_HEAD_COUNT],
    bus: SignalBus,
    elapsed: f32,
    cycles_completed: u64,
    changes_published: u64,
}

impl IntersectionPhaseController {
    pub fn new(config: ControllerConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            phase: Phase::NsGreen,
            remaining: Phase::NsGreen.duration(&config),
            running: false,
            signals: [SignalColor::Red; 4],
            pedestrian_heads: [false; PEDESTRIAN_HEAD_COUNT],
            bus: SignalBus::new(),
            elapsed: 0.0,
            cycles_completed: 0,
            changes_published: 0,
        })
    }

    /// Reset every head to Red / do-not-walk and enter the first phase.
    /// Calling this while the cycle is already running does nothing.
    pub fn start(&mut self) {
        if self.running {
            warn!("Intersection controller already running; ignoring start");
            return;
        }

        for direction in Direction::ALL {
            self.set_signal(direction, SignalColor::Red);
        }
        self.pedestrian_heads = [false; PEDESTRIAN_HEAD_COUNT];

        self.running = true;
        self.elapsed = 0.0;
        self.cycles_completed = 0;
        self.enter_phase(Phase::NsGreen);
        info!(
            "Intersection controller started (cycle {:.1}s)",
            self.cycle_duration()
        );
    }

    /// Halt the cycle and drop every subscriber. Signal state is left as is.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.bus.clear();
        info!("Intersection controller stopped in phase {:?}", self.phase);
    }

    /// Advance simulated time, crossing as many phase boundaries as needed
    pub fn advance(&mut self, delta_secs: f32) -> SimResult<()> {
        check_delta(delta_secs)?;
        if !self.running {
            return Ok(());
        }

        self.elapsed += delta_secs;
        self.remaining -= delta_secs;

        // Whole cycles end on the same phase and colors: count them, don't replay.
        let cycle = f64::from(self.cycle_duration());
        let overshoot = -f64::from(self.remaining);
        if overshoot >= cycle {
            let rest = overshoot.rem_euclid(cycle);
            let skipped = ((overshoot - rest) / cycle).round() as u64;
            self.cycles_completed = self.cycles_completed.saturating_add(skipped);
            self.remaining = -(rest as f32);
        }

        while self.remaining <= 0.0 {
            let overshoot = -self.remaining;
            let next = self.phase.next();
            if next == Phase::NsGreen {
                self.cycles_completed = self.cycles_completed.saturating_add(1);
            }
            self.enter_phase(next);
            self.remaining -= overshoot;
        }

        Ok(())
    }

    fn enter_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.remaining = phase.duration(&self.config);

        for &(direction, color) in phase.vehicle_assignments() {
            self.set_signal(direction, color);
        }
        for &(direction, walk) in phase.pedestrian_assignments() {
            self.set_pedestrian(direction, walk);
        }

        debug_assert!(
            self.check_invariants().is_ok(),
            "signal invariants broken entering {phase:?}"
        );
        info!("Phase -> {:?} ({:.1}s)", phase, self.remaining);
    }

    fn set_signal(&mut self, direction: Direction, color: SignalColor) {
        let slot = &mut self.signals[direction.index()];
        if *slot == color {
            return;
        }
        *slot = color;
        self.changes_published += 1;
        debug!("Signal {} -> {}", direction, color);
        self.bus.publish(SignalChange { direction, color });
    }

    fn set_pedestrian(&mut self, direction: Direction, walk: bool) {
        let first = direction.index() * 2;
        self.pedestrian_heads[first] = walk;
        self.pedestrian_heads[first + 1] = walk;
    }

    pub fn current_signal(&self, direction: Direction) -> SignalColor {
        self.signals[direction.index()]
    }

    pub fn is_pedestrian_walk_on(&self, direction: Direction) -> bool {
        self.pedestrian_heads[direction.index() * 2]
    }

    /// Raw access to one of the eight pedestrian heads
    pub fn pedestrian_head(&self, index: usize) -> SimResult<bool> {
        self.pedestrian_heads.get(index).copied().ok_or_else(|| {
            SimError::InvalidArgument(format!(
                "pedestrian head index {index} is out of range 0..{PEDESTRIAN_HEAD_COUNT}"
            ))
        })
    }

    /// Register a listener for every vehicle color change.
    ///
    /// Listeners are invoked synchronously while the controller transitions;
    /// they must not try to reach the controller from inside the callback.
    pub fn subscribe(&mut self, listener: SharedListener) -> ListenerId {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.len()
    }

    /// Paired directions agree and the two axes are never green together
    pub fn check_invariants(&self) -> SimResult<()> {
        for direction in [Direction::North, Direction::East] {
            let own = self.current_signal(direction);
            let partner = self.current_signal(direction.partner());
            if own != partner {
                return Err(SimError::InvariantViolation(format!(
                    "{} is {} but {} is {}",
                    direction,
                    own,
                    direction.partner(),
                    partner
                )));
            }
        }

        if self.current_signal(Direction::North) == SignalColor::Green
            && self.current_signal(Direction::East) == SignalColor::Green
        {
            return Err(SimError::InvariantViolation(
                "north/south and east/west are green at the same time".to_string(),
            ));
        }

        Ok(())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn phase_remaining(&self) -> f32 {
        self.remaining
    }

    pub fn cycle_duration(&self) -> f32 {
        self.config.cycle_duration()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Simulated seconds since `start`
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// Number of color changes broadcast so far
    pub fn changes_published(&self) -> u64 {
        self.changes_published
    }
}
