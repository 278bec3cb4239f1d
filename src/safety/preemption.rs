use crate::intersection::direction::Direction;
use crate::log_main;
use crate::signals::machine::SignalMachine;
use crate::verbose::{EVENT_PREEMPTION_ACTIVATE, EVENT_PREEMPTION_CLEAR, EVENT_PREEMPTION_REQUEST};
use std::collections::VecDeque;
use uuid::Uuid;

/// Default minimum hold for an emergency vehicle, in seconds.
pub const DEFAULT_MIN_HOLD_S: f64 = 10.0;

/// A single preemption request and its lifecycle timestamps.
///
/// Lifecycle: pending → active (`activated_at` set) → cleared
/// (`cleared_at` set). All timestamps are monotonic seconds.
#[derive(Debug, Clone)]
pub struct PreemptionEvent {
    id: Uuid,
    direction: Direction,
    requested_at: f64,
    activated_at: Option<f64>,
    cleared_at: Option<f64>,
    /// Minimum time to hold green for the emergency vehicle.
    min_hold_s: f64,
}

impl PreemptionEvent {
    pub fn new(direction: Direction, requested_at: f64, min_hold_s: f64) -> Self {
        PreemptionEvent {
            id: Uuid::new_v4(),
            direction,
            requested_at,
            activated_at: None,
            cleared_at: None,
            min_hold_s,
        }
    }

    pub fn get_id(&self) -> Uuid {
        self.id
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub fn get_requested_at(&self) -> f64 {
        self.requested_at
    }

    pub fn get_activated_at(&self) -> Option<f64> {
        self.activated_at
    }

    pub fn get_cleared_at(&self) -> Option<f64> {
        self.cleared_at
    }

    pub fn get_min_hold_s(&self) -> f64 {
        self.min_hold_s
    }

    pub fn is_active(&self) -> bool {
        self.activated_at.is_some() && self.cleared_at.is_none()
    }

    /// Seconds the hold has been active; zero before activation.
    pub fn hold_elapsed_s(&self, now: f64) -> f64 {
        match self.activated_at {
            Some(activated_at) => now - activated_at,
            None => 0.0,
        }
    }
}

/// Status summary of the preemption subsystem for observers and UIs.
#[derive(Debug, Clone, PartialEq)]
pub struct PreemptionStatus {
    pub active_direction: Option<Direction>,
    pub hold_elapsed_s: f64,
    pub queue_depth: usize,
    pub total_events: usize,
}

/// Manages emergency vehicle preemption for the intersection.
///
/// Multiple simultaneous requests are queued and served in FIFO order.
/// At most one event is active at a time; an active hold auto-clears
/// after `max_hold_s`.
///
/// Usage:
///   - Call [`request`](PreemptionManager::request) when an emergency vehicle is detected.
///   - Call [`tick`](PreemptionManager::tick) every controller tick to manage the lifecycle.
///   - Call [`clear`](PreemptionManager::clear) when the vehicle has passed (manual or auto).
#[derive(Debug)]
pub struct PreemptionManager {
    /// Maximum preemption hold before auto-clear, in seconds.
    max_hold_s: f64,

    pending: VecDeque<PreemptionEvent>,
    active_event: Option<PreemptionEvent>,
    history: Vec<PreemptionEvent>,
}

impl Default for PreemptionManager {
    fn default() -> Self {
        PreemptionManager::new()
    }
}

impl PreemptionManager {
    pub fn new() -> Self {
        PreemptionManager {
            max_hold_s: 30.0,
            pending: VecDeque::new(),
            active_event: None,
            history: Vec::new(),
        }
    }

    /// Overrides the auto-clear timeout.
    pub fn with_max_hold_s(mut self, max_hold_s: f64) -> Self {
        self.max_hold_s = max_hold_s;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active_event.is_some()
    }

    pub fn active_event(&self) -> Option<&PreemptionEvent> {
        self.active_event.as_ref()
    }

    pub fn active_direction(&self) -> Option<Direction> {
        self.active_event.as_ref().map(|e| e.get_direction())
    }

    pub fn queue_depth(&self) -> usize {
        self.pending.len()
    }

    pub fn history(&self) -> &[PreemptionEvent] {
        &self.history
    }

    /// Requests preemption for an emergency vehicle approaching from
    /// `direction`. If a preemption is already active the request is
    /// queued and served after the active one clears.
    pub fn request(
        &mut self,
        machine: &mut SignalMachine,
        direction: Direction,
        min_hold_s: f64,
        now: f64,
    ) {
        let event = PreemptionEvent::new(direction, now, min_hold_s);

        if self.active_event.is_some() {
            log_main!(
                EVENT_PREEMPTION_REQUEST,
                "Preemption already active, queueing request",
                active = self.active_direction().map(|d| d.to_string()).unwrap_or_default(),
                requested = direction.to_string()
            );
            self.pending.push_back(event);
        } else {
            self.activate(event, machine, now);
        }
    }

    /// Called every controller tick.
    ///
    /// Activates the next queued event when none is active and
    /// auto-clears the active hold once it exceeds `max_hold_s`.
    pub fn tick(&mut self, machine: &mut SignalMachine, now: f64) {
        let Some(active) = &self.active_event else {
            if let Some(next) = self.pending.pop_front() {
                self.activate(next, machine, now);
            }
            return;
        };

        if active.hold_elapsed_s(now) >= self.max_hold_s {
            log_main!(
                EVENT_PREEMPTION_CLEAR,
                "Preemption exceeded max hold, auto-clearing",
                direction = active.get_direction().to_string(),
                max_hold_s = self.max_hold_s
            );
            self.clear(machine, now);
        }
    }

    /// Clears the active preemption event.
    ///
    /// Archives the event, instructs the state machine to release the
    /// hold (through clearance) and activates the next pending request
    /// if any.
    pub fn clear(&mut self, machine: &mut SignalMachine, now: f64) {
        let Some(mut event) = self.active_event.take() else {
            return;
        };

        event.cleared_at = Some(now);
        log_main!(
            EVENT_PREEMPTION_CLEAR,
            "Preemption cleared",
            direction = event.get_direction().to_string(),
            held_s = event.hold_elapsed_s(now)
        );
        self.history.push(event);
        machine.clear_preemption(now);

        if let Some(next) = self.pending.pop_front() {
            self.activate(next, machine, now);
        }
    }

    fn activate(&mut self, mut event: PreemptionEvent, machine: &mut SignalMachine, now: f64) {
        event.activated_at = Some(now);
        log_main!(
            EVENT_PREEMPTION_ACTIVATE,
            "Preemption activated",
            direction = event.get_direction().to_string()
        );
        machine.request_preemption(event.get_direction(), now);
        self.active_event = Some(event);
    }

    /// Status summary for observers and UIs.
    pub fn status(&self, now: f64) -> PreemptionStatus {
        PreemptionStatus {
            active_direction: self.active_direction(),
            hold_elapsed_s: self
                .active_event
                .as_ref()
                .map(|e| e.hold_elapsed_s(now))
                .unwrap_or(0.0),
            queue_depth: self.queue_depth(),
            total_events: self.history.len(),
        }
    }
}
