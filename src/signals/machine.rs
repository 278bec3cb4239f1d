use crate::intersection::direction::Direction;
use crate::signals::heads::{LeftTurnSignal, PedestrianSignal, SignalHead, VehicleSignal};
use crate::signals::phase::{Phase, PhaseId, PhaseStep};
use crate::signals::ring::PhaseRing;
use crate::verbose::{EVENT_CONFLICT, EVENT_CYCLE_COMPLETE, EVENT_FAULT_CLEAR, EVENT_FAULT_ENTER, EVENT_PHASE_CHANGE, EVENT_PREEMPTION_REQUEST};
use crate::{log_additional, log_main};
use indexmap::IndexMap;

/// Transition notification emitted by [`SignalMachine::tick`].
///
/// A transition moves either to the next sub-step of the current phase
/// or into the next phase. `completed_cycle` is set when the transition
/// wrapped the ring back to phase index 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineEvent {
    pub phase_id: PhaseId,
    pub step: PhaseStep,
    pub completed_cycle: Option<u32>,
}

/// Signal state machine for the entire intersection.
///
/// Runs through the phase ring, transitioning through sub-steps
/// (green → yellow → all-red) with precise timing. No phase transition
/// ever skips yellow or all-red clearance, including entry into and
/// exit out of a preemption hold.
///
/// External code never sets signals directly — it can only:
///   - call [`tick`](SignalMachine::tick) to advance time,
///   - call [`request_preemption`](SignalMachine::request_preemption) for emergency vehicles,
///   - let the timing engine update `Phase::green_time_s` between cycles.
///
/// Time is injected: every method that depends on the clock takes a
/// monotonic `now` in seconds, which keeps the machine deterministic
/// and testable.
#[derive(Debug)]
pub struct SignalMachine {
    phase_ring: PhaseRing,

    current_phase_idx: usize,
    current_step: PhaseStep,
    step_start_time: f64,
    cycle_count: u32,

    is_preempted: bool,
    preemption_direction: Option<Direction>,
    /// Preemption hold green is currently displayed.
    preemption_hold: bool,
    /// Clearing out of a preemption hold (yellow, then all-red).
    preemption_exit: bool,

    fault_active: bool,

    signal_heads: IndexMap<Direction, SignalHead>,
}

impl SignalMachine {
    /// Creates the machine at the first phase, step green.
    ///
    /// # Arguments
    /// * `phase_ring` - Ordered cyclic phases to run. All durations come
    ///   from the phases themselves; the enforcer has already clamped them.
    /// * `now` - Current monotonic time in seconds.
    pub fn new(phase_ring: PhaseRing, now: f64) -> Self {
        let mut signal_heads = IndexMap::new();
        for direction in Direction::ALL {
            signal_heads.insert(direction, SignalHead::new(direction));
        }
        let mut machine = SignalMachine {
            phase_ring,
            current_phase_idx: 0,
            current_step: PhaseStep::Green,
            step_start_time: now,
            cycle_count: 0,
            is_preempted: false,
            preemption_direction: None,
            preemption_hold: false,
            preemption_exit: false,
            fault_active: false,
            signal_heads,
        };
        machine.apply_signals_for_current_state();
        machine
    }

    // --- accessors ---

    pub fn phase_ring(&self) -> &PhaseRing {
        &self.phase_ring
    }

    pub fn phase_ring_mut(&mut self) -> &mut PhaseRing {
        &mut self.phase_ring
    }

    pub fn current_phase(&self) -> &Phase {
        self.phase_ring.phase(self.current_phase_idx)
    }

    pub fn current_phase_idx(&self) -> usize {
        self.current_phase_idx
    }

    pub fn current_step(&self) -> PhaseStep {
        self.current_step
    }

    pub fn get_cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn is_preempted(&self) -> bool {
        self.is_preempted
    }

    pub fn preemption_direction(&self) -> Option<Direction> {
        self.preemption_direction
    }

    pub fn is_fault_active(&self) -> bool {
        self.fault_active
    }

    pub fn signal_heads(&self) -> &IndexMap<Direction, SignalHead> {
        &self.signal_heads
    }

    /// Mutable access to the signal heads.
    ///
    /// Intended for fault-injection testing and for bridging to
    /// physical signal-head I/O; normal operation never writes heads
    /// from outside the machine.
    pub fn signal_heads_mut(&mut self) -> &mut IndexMap<Direction, SignalHead> {
        &mut self.signal_heads
    }

    pub fn head(&self, direction: Direction) -> &SignalHead {
        &self.signal_heads[&direction]
    }

    pub fn step_elapsed_s(&self, now: f64) -> f64 {
        now - self.step_start_time
    }

    pub fn step_remaining_s(&self, now: f64) -> f64 {
        let duration = self.current_step_duration();
        if duration.is_infinite() {
            return f64::INFINITY;
        }
        (duration - self.step_elapsed_s(now)).max(0.0)
    }

    // --- main tick ---

    /// Advances the state machine by one tick.
    ///
    /// Should be called at the controller's tick rate (e.g. 10 Hz).
    /// Returns the transition that happened this tick, if any. While
    /// the machine is in fault mode no transitions occur.
    pub fn tick(&mut self, now: f64) -> Option<MachineEvent> {
        if self.fault_active {
            return None;
        }

        let elapsed = now - self.step_start_time;
        let duration = self.current_step_duration();

        let event = if elapsed >= duration {
            Some(self.advance_step(now))
        } else {
            None
        };

        // Internal conflict check, duplicated by the independent
        // conflict monitor (defense in depth).
        self.self_check_conflicts();

        event
    }

    // --- preemption ---

    /// Emergency vehicle preemption entry.
    ///
    /// Begins a safe transition (yellow → all-red), then gives green to
    /// the requested direction and holds it until
    /// [`clear_preemption`](SignalMachine::clear_preemption).
    pub fn request_preemption(&mut self, direction: Direction, now: f64) {
        if self.is_preempted {
            log_main!(
                EVENT_PREEMPTION_REQUEST,
                "Preemption already active, ignoring new request",
                requested = direction.to_string()
            );
            return;
        }

        log_main!(
            EVENT_PREEMPTION_REQUEST,
            "Preemption requested",
            direction = direction.to_string()
        );
        self.is_preempted = true;
        self.preemption_direction = Some(direction);

        // Force transition to yellow if right of way is currently granted,
        // guaranteeing clearance before the preemption green
        if matches!(self.current_step, PhaseStep::Green | PhaseStep::FlashingYellow)
            && !self.preemption_hold
        {
            self.current_step = PhaseStep::Yellow;
            self.step_start_time = now;
            self.apply_signals_for_current_state();
        }
    }

    /// Ends the preemption hold and resumes normal cycling.
    ///
    /// The held direction traverses yellow and all-red before the next
    /// phase gets green; clearance applies on the way out just as it
    /// does on the way in.
    pub fn clear_preemption(&mut self, now: f64) {
        if !self.is_preempted {
            return;
        }
        self.is_preempted = false;

        if self.preemption_hold {
            self.preemption_hold = false;
            self.preemption_exit = true;
            self.current_step = PhaseStep::Yellow;
            self.step_start_time = now;
            self.apply_signals_for_current_state();
        } else {
            // Hold was never reached; the entry clearance in progress
            // becomes a normal phase clearance
            self.preemption_direction = None;
        }
    }

    // --- fault mode ---

    /// Fail-safe: force every head to red and stop normal transitions.
    ///
    /// This is what real conflict monitors do when they detect an
    /// impossible state: the intersection goes to all-way stop.
    pub fn enter_fault_mode(&mut self) {
        if !self.fault_active {
            log_main!(EVENT_FAULT_ENTER, "Entering fault mode, all heads red",);
        }
        self.fault_active = true;
        for head in self.signal_heads.values_mut() {
            head.set_all_red();
        }
    }

    /// Leaves fault mode and resumes the current phase from `now`.
    ///
    /// Called by the conflict monitor once its latch releases.
    pub fn clear_fault(&mut self, now: f64) {
        if !self.fault_active {
            return;
        }
        log_main!(EVENT_FAULT_CLEAR, "Fault cleared, resuming operation",);
        self.fault_active = false;
        self.current_step = PhaseStep::AllRed;
        self.step_start_time = now;
        self.apply_signals_for_current_state();
    }

    // --- internal state transitions ---

    /// Moves to the next sub-step or the next phase.
    fn advance_step(&mut self, now: f64) -> MachineEvent {
        match self.current_step {
            PhaseStep::Green | PhaseStep::FlashingYellow => {
                self.current_step = PhaseStep::Yellow;
            }
            PhaseStep::Yellow => {
                self.current_step = PhaseStep::AllRed;
            }
            PhaseStep::AllRed => {
                // Clearance complete; decide what gets green next. A
                // fresh request accepted during an exit clearance takes
                // the hold immediately instead of resuming cycling.
                if self.is_preempted && self.preemption_direction.is_some() {
                    self.preemption_exit = false;
                    return self.enter_preemption_hold(now);
                }
                if self.preemption_exit {
                    self.preemption_exit = false;
                    self.preemption_direction = None;
                }
                return self.advance_to_next_phase(now);
            }
        }

        self.step_start_time = now;
        self.apply_signals_for_current_state();
        log_additional!(
            EVENT_PHASE_CHANGE,
            "Step transition",
            phase = self.current_phase().id.0,
            step = self.current_step.to_string()
        );
        MachineEvent {
            phase_id: self.current_phase().id,
            step: self.current_step,
            completed_cycle: None,
        }
    }

    /// Moves to the next phase in the ring.
    fn advance_to_next_phase(&mut self, now: f64) -> MachineEvent {
        let prev_idx = self.current_phase_idx;
        self.current_phase_idx = self.phase_ring.next_phase_index(prev_idx);
        self.current_step = PhaseStep::Green;
        self.step_start_time = now;
        self.apply_signals_for_current_state();

        let mut completed_cycle = None;
        if self.current_phase_idx == 0 && prev_idx != 0 {
            self.cycle_count += 1;
            completed_cycle = Some(self.cycle_count);
            log_main!(EVENT_CYCLE_COMPLETE, "Cycle complete", cycle = self.cycle_count);
        }
        log_additional!(
            EVENT_PHASE_CHANGE,
            "Phase transition",
            phase = self.current_phase().id.0,
            step = self.current_step.to_string()
        );
        MachineEvent {
            phase_id: self.current_phase().id,
            step: self.current_step,
            completed_cycle,
        }
    }

    /// Gives green to the preemption direction after safe clearance.
    fn enter_preemption_hold(&mut self, now: f64) -> MachineEvent {
        self.preemption_hold = true;
        self.current_step = PhaseStep::Green;
        self.step_start_time = now;
        self.apply_signals_for_current_state();
        MachineEvent {
            phase_id: self.current_phase().id,
            step: self.current_step,
            completed_cycle: None,
        }
    }

    // --- signal application ---

    /// Sets all signal heads based on current phase, step and
    /// preemption state. Pure function of the machine state; every
    /// transition recomputes the full display.
    fn apply_signals_for_current_state(&mut self) {
        // Default everything to red / don't walk
        for head in self.signal_heads.values_mut() {
            head.set_all_red();
        }

        if self.fault_active {
            return;
        }

        if self.preemption_hold {
            if let Some(direction) = self.preemption_direction {
                self.signal_heads[&direction].vehicle = VehicleSignal::Green;
            }
            return;
        }

        if self.preemption_exit {
            if self.current_step == PhaseStep::Yellow {
                if let Some(direction) = self.preemption_direction {
                    self.signal_heads[&direction].vehicle = VehicleSignal::Yellow;
                }
            }
            // All-red of the exit clearance is covered by the default
            return;
        }

        if self.current_step == PhaseStep::AllRed {
            return;
        }

        let phase = self.phase_ring.phase(self.current_phase_idx).clone();
        for direction in &phase.served_directions {
            let head = &mut self.signal_heads[direction];

            match self.current_step {
                PhaseStep::Green => {
                    if phase.is_left_turn() {
                        if phase.use_protected_left {
                            head.left_turn = LeftTurnSignal::GreenArrow;
                        } else {
                            head.left_turn = LeftTurnSignal::FlashingYellow;
                        }
                        // Through stays red during a left-turn phase
                    } else {
                        head.vehicle = VehicleSignal::Green;
                        // Permissive left turn during through green
                        head.left_turn = LeftTurnSignal::FlashingYellow;
                        // Pedestrian walk runs concurrent with through green
                        head.pedestrian = PedestrianSignal::Walk;
                    }
                }
                PhaseStep::FlashingYellow => {
                    head.left_turn = LeftTurnSignal::FlashingYellow;
                }
                PhaseStep::Yellow => {
                    if phase.is_left_turn() {
                        head.left_turn = LeftTurnSignal::YellowArrow;
                    } else {
                        head.vehicle = VehicleSignal::Yellow;
                        head.left_turn = LeftTurnSignal::Red;
                        head.pedestrian = PedestrianSignal::PedClearance;
                    }
                }
                PhaseStep::AllRed => {}
            }
        }
    }

    // --- step duration ---

    /// Duration of the current sub-step in seconds.
    fn current_step_duration(&self) -> f64 {
        if self.preemption_hold && self.current_step == PhaseStep::Green {
            // Hold green until preemption is cleared
            return f64::INFINITY;
        }

        let phase = self.current_phase();
        match self.current_step {
            PhaseStep::Green => phase.green_time_s,
            // Flashing yellow runs for the remainder of the phase green
            PhaseStep::FlashingYellow => phase.green_time_s,
            PhaseStep::Yellow => phase.yellow_time_s,
            PhaseStep::AllRed => phase.all_red_time_s,
        }
    }

    // --- conflict detection ---

    /// Directions currently granted (or clearing) right of way.
    pub fn granting_directions(&self) -> Vec<Direction> {
        self.signal_heads
            .iter()
            .filter(|(_, head)| head.grants_movement())
            .map(|(direction, _)| *direction)
            .collect()
    }

    /// Internal conflict check, mirroring the independent monitor.
    fn self_check_conflicts(&mut self) {
        let granting = self.granting_directions();
        for (i, d1) in granting.iter().enumerate() {
            for d2 in granting.iter().skip(i + 1) {
                if d1.conflicts_with(*d2) {
                    log_main!(
                        EVENT_CONFLICT,
                        "Conflicting greens detected by state machine",
                        first = d1.to_string(),
                        second = d2.to_string()
                    );
                    self.enter_fault_mode();
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::constraints::TimingConstraints;

    fn machine() -> SignalMachine {
        let timing = TimingConstraints::default();
        let ring = PhaseRing::standard_4way(&timing);
        SignalMachine::new(ring, 0.0)
    }

    #[test]
    fn test_starts_in_green_at_phase_one() {
        let machine = machine();
        assert_eq!(machine.current_step(), PhaseStep::Green);
        assert_eq!(machine.current_phase_idx(), 0);
        assert_eq!(machine.current_phase().id, PhaseId(1));
        for direction in Direction::ALL {
            assert_eq!(machine.head(direction).direction, direction);
        }
    }

    #[test]
    fn test_green_yellow_all_red_sequence() {
        let mut machine = machine();
        let green = machine.current_phase().green_time_s;
        let yellow = machine.current_phase().yellow_time_s;
        let all_red = machine.current_phase().all_red_time_s;

        // Just before green expires: no transition
        assert!(machine.tick(green - 0.1).is_none());
        assert_eq!(machine.current_step(), PhaseStep::Green);

        // Green expires
        let event = machine.tick(green).unwrap();
        assert_eq!(event.step, PhaseStep::Yellow);

        // Yellow expires
        let event = machine.tick(green + yellow).unwrap();
        assert_eq!(event.step, PhaseStep::AllRed);

        // All-red expires, next phase begins
        let event = machine.tick(green + yellow + all_red).unwrap();
        assert_eq!(event.step, PhaseStep::Green);
        assert_eq!(machine.current_phase_idx(), 1);
    }

    #[test]
    fn test_cycle_complete_fires_on_ring_wrap() {
        let mut machine = machine();
        let mut now = 0.0;
        let mut completed = None;
        // Plenty of ticks to traverse all four phases
        for _ in 0..5000 {
            now += 0.1;
            if let Some(event) = machine.tick(now) {
                if event.completed_cycle.is_some() {
                    completed = event.completed_cycle;
                    break;
                }
            }
        }
        assert_eq!(completed, Some(1));
        assert_eq!(machine.current_phase_idx(), 0);
    }

    #[test]
    fn test_through_phase_display() {
        let mut machine = machine();
        let mut now = 0.0;
        // Advance to phase index 1 (N/S through)
        while machine.current_phase_idx() != 1 {
            now += 0.1;
            machine.tick(now);
        }
        let north = machine.head(Direction::North);
        assert_eq!(north.vehicle, VehicleSignal::Green);
        assert_eq!(north.left_turn, LeftTurnSignal::FlashingYellow);
        assert_eq!(north.pedestrian, PedestrianSignal::Walk);

        // Cross street stays fully red
        let east = machine.head(Direction::East);
        assert_eq!(east.vehicle, VehicleSignal::Red);
        assert_eq!(east.left_turn, LeftTurnSignal::Red);
        assert_eq!(east.pedestrian, PedestrianSignal::DontWalk);
    }

    #[test]
    fn test_left_turn_phase_display_permissive_and_protected() {
        let timing = TimingConstraints::default();
        let ring = PhaseRing::standard_4way(&timing);
        let mut machine = SignalMachine::new(ring, 0.0);

        // Permissive by default
        assert_eq!(
            machine.head(Direction::North).left_turn,
            LeftTurnSignal::FlashingYellow
        );
        assert_eq!(machine.head(Direction::North).vehicle, VehicleSignal::Red);

        // Protected after the engine sets the flag; rebuild display via a
        // fresh machine since mode changes land at cycle boundaries
        let mut ring = PhaseRing::standard_4way(&timing);
        ring.phases_mut()[0].use_protected_left = true;
        machine = SignalMachine::new(ring, 0.0);
        assert_eq!(
            machine.head(Direction::South).left_turn,
            LeftTurnSignal::GreenArrow
        );
    }

    #[test]
    fn test_preemption_forces_clearance_before_green() {
        let mut machine = machine();
        machine.request_preemption(Direction::East, 1.0);
        assert_eq!(machine.current_step(), PhaseStep::Yellow);

        let mut now = 1.0;
        let mut saw_all_red = false;
        loop {
            now += 0.1;
            machine.tick(now);
            if machine.current_step() == PhaseStep::AllRed {
                saw_all_red = true;
            }
            if machine.head(Direction::East).vehicle == VehicleSignal::Green {
                break;
            }
            assert!(now < 60.0, "preemption green never granted");
        }
        assert!(saw_all_red, "all-red clearance skipped before preemption green");

        // Hold is indefinite
        machine.tick(now + 500.0);
        assert_eq!(machine.head(Direction::East).vehicle, VehicleSignal::Green);
        // Everyone else is red
        for direction in [Direction::North, Direction::South, Direction::West] {
            assert_eq!(machine.head(direction).vehicle, VehicleSignal::Red);
        }
    }

    #[test]
    fn test_preemption_clear_traverses_clearance() {
        let mut machine = machine();
        machine.request_preemption(Direction::North, 0.5);
        let mut now = 0.5;
        while machine.head(Direction::North).vehicle != VehicleSignal::Green {
            now += 0.1;
            machine.tick(now);
        }

        machine.clear_preemption(now);
        // Held direction must clear through yellow
        assert_eq!(machine.head(Direction::North).vehicle, VehicleSignal::Yellow);

        let mut saw_all_red = false;
        for _ in 0..200 {
            now += 0.1;
            machine.tick(now);
            let granting = machine.granting_directions();
            if granting.is_empty() {
                saw_all_red = true;
            }
            if machine.current_step() == PhaseStep::Green && !machine.is_preempted() {
                break;
            }
        }
        assert!(saw_all_red);
        assert!(!machine.is_preempted());
    }

    #[test]
    fn test_fault_mode_stops_transitions_and_reds_heads() {
        let mut machine = machine();
        machine.enter_fault_mode();
        assert!(machine.is_fault_active());
        for direction in Direction::ALL {
            assert_eq!(machine.head(direction).vehicle, VehicleSignal::Red);
            assert_eq!(machine.head(direction).left_turn, LeftTurnSignal::Red);
        }
        // No transitions while faulted
        assert!(machine.tick(1_000.0).is_none());
        assert_eq!(machine.current_step(), PhaseStep::Green);

        // Resumes through an all-red interval after the fault clears
        machine.clear_fault(2_000.0);
        assert!(!machine.is_fault_active());
        assert_eq!(machine.current_step(), PhaseStep::AllRed);
    }

    #[test]
    fn test_internal_conflict_check_faults() {
        let mut machine = machine();
        machine.signal_heads_mut()[&Direction::North].vehicle = VehicleSignal::Green;
        machine.signal_heads_mut()[&Direction::East].vehicle = VehicleSignal::Green;
        machine.tick(0.05);
        assert!(machine.is_fault_active());
    }
}
