use crate::intersection::direction::Direction;
use crate::log_main;
use crate::signals::machine::SignalMachine;
use crate::verbose::{EVENT_CONFLICT, EVENT_FAULT_CLEAR};

/// Pairs of directions that must never both hold green/arrow at once.
///
/// N∥S and E∥W are non-conflicting; every crossing pair is listed here.
pub const CONFLICTING_PAIRS: [(Direction, Direction); 4] = [
    (Direction::North, Direction::East),
    (Direction::North, Direction::West),
    (Direction::South, Direction::East),
    (Direction::South, Direction::West),
];

/// Independent safety watchdog over the displayed signal heads.
///
/// In real traffic controllers the conflict monitor is a separate
/// hardware board that watches the signal outputs independently of the
/// controller CPU. If it detects conflicting greens it forces the
/// intersection to all-way flashing red. This struct simulates that
/// behavior in software; it reads heads only and never touches phases
/// or steps.
///
/// The check is intentionally duplicated inside
/// [`SignalMachine`](crate::signals::SignalMachine) — defense in depth.
#[derive(Debug, Clone)]
pub struct ConflictMonitor {
    fault_active: bool,
    conflict_count: u32,
    /// Consecutive clean checks required to clear a fault.
    clean_checks_to_clear: u32,
    consecutive_clean: u32,
    last_check_time: f64,
}

impl Default for ConflictMonitor {
    fn default() -> Self {
        ConflictMonitor::new()
    }
}

impl ConflictMonitor {
    pub fn new() -> Self {
        ConflictMonitor {
            fault_active: false,
            conflict_count: 0,
            clean_checks_to_clear: 50,
            consecutive_clean: 0,
            last_check_time: 0.0,
        }
    }

    /// Overrides the number of consecutive clean checks required to
    /// release the fault latch.
    pub fn with_clean_checks_to_clear(mut self, clean_checks_to_clear: u32) -> Self {
        self.clean_checks_to_clear = clean_checks_to_clear;
        self
    }

    pub fn is_fault_active(&self) -> bool {
        self.fault_active
    }

    pub fn get_conflict_count(&self) -> u32 {
        self.conflict_count
    }

    pub fn get_last_check_time(&self) -> f64 {
        self.last_check_time
    }

    /// Runs one conflict check against the current signal heads.
    ///
    /// Returns `true` if the intersection is healthy, `false` if a
    /// conflict was detected. A conflict latches the fault: the machine
    /// is driven into fault mode and the latch only releases after
    /// `clean_checks_to_clear` consecutive clean checks.
    pub fn check(&mut self, machine: &mut SignalMachine, now: f64) -> bool {
        self.last_check_time = now;

        let granting = machine.granting_directions();
        for (d1, d2) in CONFLICTING_PAIRS {
            if granting.contains(&d1) && granting.contains(&d2) {
                self.on_conflict_detected(d1, d2, machine);
                return false;
            }
        }

        if self.fault_active {
            self.consecutive_clean += 1;
            if self.consecutive_clean >= self.clean_checks_to_clear {
                log_main!(
                    EVENT_FAULT_CLEAR,
                    "Consecutive clean checks reached, clearing fault latch",
                    clean_checks = self.consecutive_clean
                );
                self.fault_active = false;
                self.consecutive_clean = 0;
                machine.clear_fault(now);
            }
        }
        true
    }

    fn on_conflict_detected(&mut self, d1: Direction, d2: Direction, machine: &mut SignalMachine) {
        self.conflict_count += 1;
        self.consecutive_clean = 0;

        if !self.fault_active {
            self.fault_active = true;
            log_main!(
                EVENT_CONFLICT,
                "Conflict monitor fault, forcing all-way red",
                first = d1.to_string(),
                second = d2.to_string(),
                conflict_count = self.conflict_count
            );
            machine.enter_fault_mode();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::heads::VehicleSignal;
    use crate::signals::ring::PhaseRing;
    use crate::timing::constraints::TimingConstraints;

    fn machine() -> SignalMachine {
        let timing = TimingConstraints::default();
        SignalMachine::new(PhaseRing::standard_4way(&timing), 0.0)
    }

    #[test]
    fn test_healthy_state_returns_true() {
        let mut machine = machine();
        let mut monitor = ConflictMonitor::new();
        assert!(monitor.check(&mut machine, 0.0));
        assert!(!monitor.is_fault_active());
    }

    #[test]
    fn test_detects_forced_conflict() {
        let mut machine = machine();
        let mut monitor = ConflictMonitor::new();

        // Force an illegal state: N and E both green
        machine.signal_heads_mut()[&Direction::North].vehicle = VehicleSignal::Green;
        machine.signal_heads_mut()[&Direction::East].vehicle = VehicleSignal::Green;

        assert!(!monitor.check(&mut machine, 0.1));
        assert!(monitor.is_fault_active());
        assert_eq!(monitor.get_conflict_count(), 1);
        // The machine was driven to all-way red
        assert!(machine.is_fault_active());
    }

    #[test]
    fn test_fault_clears_after_consecutive_clean_checks() {
        let mut machine = machine();
        let mut monitor = ConflictMonitor::new().with_clean_checks_to_clear(5);

        machine.signal_heads_mut()[&Direction::North].vehicle = VehicleSignal::Green;
        machine.signal_heads_mut()[&Direction::East].vehicle = VehicleSignal::Green;
        monitor.check(&mut machine, 0.0);
        assert!(monitor.is_fault_active());

        // Machine fault already forced the heads red; the latch still
        // needs five consecutive clean checks
        for i in 0..4 {
            monitor.check(&mut machine, 0.1 * (i + 1) as f64);
            assert!(monitor.is_fault_active());
        }

        monitor.check(&mut machine, 0.5);
        assert!(!monitor.is_fault_active());
        assert!(!machine.is_fault_active());
    }

    #[test]
    fn test_conflict_resets_clean_counter() {
        let mut machine = machine();
        let mut monitor = ConflictMonitor::new().with_clean_checks_to_clear(3);

        machine.signal_heads_mut()[&Direction::South].vehicle = VehicleSignal::Green;
        machine.signal_heads_mut()[&Direction::West].vehicle = VehicleSignal::Green;
        monitor.check(&mut machine, 0.0);
        assert_eq!(monitor.get_conflict_count(), 1);

        monitor.check(&mut machine, 0.1);
        monitor.check(&mut machine, 0.2);

        // Re-inject the conflict: the latch must start over
        machine.signal_heads_mut()[&Direction::South].vehicle = VehicleSignal::Green;
        machine.signal_heads_mut()[&Direction::West].vehicle = VehicleSignal::Green;
        monitor.check(&mut machine, 0.3);
        assert_eq!(monitor.get_conflict_count(), 2);
        assert!(monitor.is_fault_active());

        machine.enter_fault_mode();
        monitor.check(&mut machine, 0.4);
        monitor.check(&mut machine, 0.5);
        assert!(monitor.is_fault_active());
        monitor.check(&mut machine, 0.6);
        assert!(!monitor.is_fault_active());
    }
}
