use crate::controller::config::{IntersectionConfig, ProviderKind};
use crate::controller::status::{ConflictMonitorStatus, ControllerStatus, SignalsStatus};
use crate::intersection::intersection::Intersection;
use crate::safety::conflict::ConflictMonitor;
use crate::safety::preemption::{PreemptionManager, DEFAULT_MIN_HOLD_S};
use crate::signals::machine::SignalMachine;
use crate::signals::ring::PhaseRing;
use crate::timing::adaptive::AdaptiveTimingEngine;
use crate::utils::clock::monotonic_s;
use crate::verbose::{ensure_logger_init, EVENT_CYCLE_COMPLETE, EVENT_OBSERVER_PANIC, EVENT_SETUP, EVENT_TEARDOWN, EVENT_TICK, EVENT_VISION};
use crate::vision::counting::{count_vehicles_by_lane, count_vehicles_simple};
use crate::vision::mock::MockProvider;
use crate::vision::provider::{Frame, ProviderError, VehicleDetectionProvider};
use crate::{log_additional, log_detailed, log_main};
use crate::intersection::direction::Direction;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Observer invoked synchronously at the end of every tick.
pub type TickObserver = Box<dyn FnMut(&ControllerStatus)>;

/// Custom error types for `TrafficController`.
#[derive(Debug)]
pub enum ControllerError {
    /// The detection provider failed; the controller does not start.
    Provider(ProviderError),
    /// The config names the external provider kind but no provider
    /// instance was supplied.
    MissingExternalProvider,
}

impl fmt::Display for ControllerError {
    /// Formats the error message for `ControllerError`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::Provider(err) => {
                write!(f, "Provider error: {}", err)
            }
            ControllerError::MissingExternalProvider => {
                write!(
                    f,
                    "Provider kind 'external' requires a provider instance, use with_provider()"
                )
            }
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<ProviderError> for ControllerError {
    fn from(err: ProviderError) -> Self {
        ControllerError::Provider(err)
    }
}

/// Top-level controller for a single intersection.
///
/// Owns the whole object graph: intersection model, phase ring (inside
/// the state machine), adaptive engine, safety subsystems and the
/// detection provider. Everything advances from one deterministic
/// [`tick`](TrafficController::tick) call on a single thread; observer
/// callbacks execute synchronously on that thread and must not block.
///
/// Lifecycle:
///   1. Construct with [`new`](TrafficController::new) (or
///      [`with_provider`](TrafficController::with_provider) for a
///      custom detection backend) — this wires and initializes all
///      subsystems and computes the initial cycle plan.
///   2. Call [`run`](TrafficController::run) for the blocking loop, or
///      [`tick`](TrafficController::tick) manually for step-by-step control.
///   3. Call [`teardown`](TrafficController::teardown) on shutdown.
pub struct TrafficController {
    config: IntersectionConfig,

    intersection: Intersection,
    machine: SignalMachine,
    timing_engine: AdaptiveTimingEngine,
    conflict_monitor: ConflictMonitor,
    preemption_manager: PreemptionManager,
    provider: Box<dyn VehicleDetectionProvider>,

    running: Arc<AtomicBool>,
    tick_count: u64,
    last_vision_time: f64,
    last_cycle_count: u32,

    observers: Vec<TickObserver>,
}

impl TrafficController {
    /// Creates a controller with the provider named by the config.
    ///
    /// # Arguments
    /// * `config` - Full intersection configuration.
    ///
    /// # Returns
    /// The ready-to-run controller, or an error if the provider cannot
    /// be constructed or fails to initialize. Setup-time errors abort
    /// startup; nothing is partially running afterwards.
    pub fn new(config: IntersectionConfig) -> Result<Self, ControllerError> {
        let provider: Box<dyn VehicleDetectionProvider> = match config.vision.provider_kind {
            ProviderKind::Mock => Box::new(MockProvider::new()),
            ProviderKind::External => return Err(ControllerError::MissingExternalProvider),
        };
        Self::with_provider(config, provider)
    }

    /// Creates a controller around a caller-supplied detection backend.
    pub fn with_provider(
        config: IntersectionConfig,
        mut provider: Box<dyn VehicleDetectionProvider>,
    ) -> Result<Self, ControllerError> {
        ensure_logger_init();
        log_main!(EVENT_SETUP, "Setting up controller", name = config.name.clone());

        provider.initialize(&config.vision.to_map())?;

        let now = monotonic_s();
        let intersection = Intersection::create_standard(
            config.name.clone(),
            config.flow,
            config.timing.default_crosswalk_distance_ft,
        );
        let phase_ring = PhaseRing::standard_4way(&config.timing);
        let machine = SignalMachine::new(phase_ring, now);
        let timing_engine = AdaptiveTimingEngine::new(config.timing);

        let mut controller = TrafficController {
            config,
            intersection,
            machine,
            timing_engine,
            conflict_monitor: ConflictMonitor::new(),
            preemption_manager: PreemptionManager::new(),
            provider,
            running: Arc::new(AtomicBool::new(false)),
            tick_count: 0,
            last_vision_time: 0.0,
            last_cycle_count: 0,
            observers: Vec::new(),
        };

        // Initial timing computation before the first tick
        controller.recompute_timing();

        log_main!(EVENT_SETUP, "Controller setup complete",);
        Ok(controller)
    }

    // --- accessors ---

    pub fn get_config(&self) -> &IntersectionConfig {
        &self.config
    }

    pub fn intersection(&self) -> &Intersection {
        &self.intersection
    }

    pub fn intersection_mut(&mut self) -> &mut Intersection {
        &mut self.intersection
    }

    pub fn machine(&self) -> &SignalMachine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut SignalMachine {
        &mut self.machine
    }

    pub fn conflict_monitor(&self) -> &ConflictMonitor {
        &self.conflict_monitor
    }

    pub fn preemption_manager(&self) -> &PreemptionManager {
        &self.preemption_manager
    }

    pub fn get_tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Cycle number of the most recent timing recomputation.
    pub fn get_last_cycle_count(&self) -> u32 {
        self.last_cycle_count
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Shared stop flag for signal handlers and observers. Storing
    /// `false` makes the loop exit after completing the current tick.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Registers a tick observer, invoked synchronously after every tick.
    pub fn add_observer(&mut self, observer: TickObserver) {
        self.observers.push(observer);
    }

    // --- main loop ---

    /// Runs the main control loop, blocking until the stop flag clears
    /// or `max_ticks` is reached.
    ///
    /// Tick deadlines advance as `prev_deadline + interval` rather than
    /// `now + interval`, so the loop does not drift.
    pub fn run(&mut self, max_ticks: Option<u64>) {
        self.running.store(true, Ordering::Relaxed);
        let interval = self.config.tick_interval_s();
        let mut next_tick = monotonic_s();

        log_main!(EVENT_SETUP, "Controller running", hz = self.config.controller_hz);

        while self.running.load(Ordering::Relaxed) {
            let now = monotonic_s();

            if now >= next_tick {
                self.tick(now);
                next_tick += interval;

                if let Some(max_ticks) = max_ticks {
                    if self.tick_count >= max_ticks {
                        log_main!(EVENT_TEARDOWN, "Reached max ticks, stopping", max_ticks = max_ticks);
                        break;
                    }
                }
            }

            // Sleep slightly less than the remainder to avoid overshooting
            let sleep_time = next_tick - monotonic_s();
            if sleep_time > 0.0 {
                thread::sleep(Duration::from_secs_f64(sleep_time * 0.9));
            }
        }

        self.running.store(false, Ordering::Relaxed);
    }

    /// Executes one controller tick.
    ///
    /// This is the heartbeat of the system:
    ///   1. Run vision at the target FPS (not every tick) and update queues
    ///   2. Advance the signal state machine
    ///   3. Recompute timing on a completed cycle
    ///   4. Run the conflict monitor
    ///   5. Handle the preemption lifecycle
    ///   6. Notify observers
    pub fn tick(&mut self, now: f64) {
        self.tick_count += 1;
        log_detailed!(EVENT_TICK, "Controller tick", tick = self.tick_count);

        // 1. Vision at target FPS
        let vision_interval = 1.0 / self.config.vision.target_fps;
        if now - self.last_vision_time >= vision_interval {
            self.run_vision(now);
            self.last_vision_time = now;
        }

        // 2. Signal state machine
        let event = self.machine.tick(now);
        if let Some(event) = event {
            if let Some(cycle) = event.completed_cycle {
                self.on_cycle_complete(cycle);
            }
        }

        // 3. Safety checks
        self.conflict_monitor.check(&mut self.machine, now);
        self.preemption_manager.tick(&mut self.machine, now);

        // 4. Notify listeners (dashboard, etc.)
        self.notify_observers(now);
    }

    /// Shuts down all subsystems. The provider shutdown is idempotent.
    pub fn teardown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        self.provider.shutdown();
        log_main!(EVENT_TEARDOWN, "Controller torn down",);
    }

    // --- public preemption API ---

    /// Triggers emergency vehicle preemption from the given direction.
    pub fn trigger_preemption(&mut self, direction: Direction, now: f64) {
        self.preemption_manager
            .request(&mut self.machine, direction, DEFAULT_MIN_HOLD_S, now);
    }

    /// Clears the current preemption.
    pub fn clear_preemption(&mut self, now: f64) {
        self.preemption_manager.clear(&mut self.machine, now);
    }

    // --- vision pipeline ---

    /// Runs one frame through the detection pipeline and updates queues.
    ///
    /// A failed detection pass is logged and the lanes keep their
    /// last-known queue counts for this tick.
    fn run_vision(&mut self, now: f64) {
        let frame = Frame::blank(
            self.config.vision.input_resolution as usize,
            self.config.vision.input_resolution as usize,
        );

        let result = match self.provider.detect(&frame) {
            Ok(result) => result,
            Err(err) => {
                log_main!(
                    EVENT_VISION,
                    "Detection failed, reusing last-known queues",
                    error = err.to_string()
                );
                return;
            }
        };

        if let Some(counts) = self.provider.queue_counts() {
            // Backend tracks per-lane queues itself, skip ROI logic
            for ((direction, lane_kind), count) in counts {
                self.intersection
                    .approach_mut(direction)
                    .lane_mut(lane_kind)
                    .update(count, 0.0, now);
            }
        } else if !self.config.lane_rois.is_empty() {
            for lane_count in count_vehicles_by_lane(&result, &self.config.lane_rois) {
                self.intersection
                    .approach_mut(lane_count.direction)
                    .lane_mut(lane_count.lane_kind)
                    .update(lane_count.count, 0.0, now);
            }
        } else {
            // Quadrant fallback: split each approach 85% through, 15% left
            for (direction, count) in count_vehicles_simple(&result) {
                let through = (count as f64 * 0.85) as u32;
                let left = count.saturating_sub(through);
                let approach = self.intersection.approach_mut(direction);
                approach.through_lane_mut().update(through, 0.0, now);
                approach.left_turn_lane_mut().update(left, 0.0, now);
            }
        }
    }

    // --- cycle-level recomputation ---

    /// Called on every completed cycle — recomputes timing unless a
    /// preemption is in progress.
    fn on_cycle_complete(&mut self, cycle_count: u32) {
        if self.preemption_manager.is_active() {
            log_additional!(
                EVENT_CYCLE_COMPLETE,
                "Skipping timing recompute during preemption",
                cycle = cycle_count
            );
            return;
        }

        self.recompute_timing();
        self.last_cycle_count = cycle_count;
    }

    fn recompute_timing(&mut self) {
        let plan = self
            .timing_engine
            .compute_cycle_plan(self.machine.phase_ring(), &self.intersection);
        self.timing_engine
            .apply_plan(&plan, self.machine.phase_ring_mut());
    }

    // --- observers & status ---

    fn notify_observers(&mut self, now: f64) {
        if self.observers.is_empty() {
            return;
        }
        let status = self.full_status(now);
        for observer in self.observers.iter_mut() {
            // A panicking observer must not take the tick loop down
            let outcome = catch_unwind(AssertUnwindSafe(|| observer(&status)));
            if outcome.is_err() {
                log_main!(EVENT_OBSERVER_PANIC, "Observer panicked, continuing",);
            }
        }
    }

    /// Returns the complete system status for dashboards and APIs.
    pub fn full_status(&self, now: f64) -> ControllerStatus {
        let phase = self.machine.current_phase();
        ControllerStatus {
            tick: self.tick_count,
            queues: self.intersection.snapshot(),
            signals: SignalsStatus {
                phase_id: phase.id,
                phase_kind: phase.kind,
                step: self.machine.current_step(),
                step_remaining_s: self.machine.step_remaining_s(now),
                cycle: self.machine.get_cycle_count(),
                is_preempted: self.machine.is_preempted(),
                heads: self.machine.signal_heads().clone(),
            },
            preemption: self.preemption_manager.status(now),
            conflict_monitor: ConflictMonitorStatus {
                fault_active: self.conflict_monitor.is_fault_active(),
                conflict_count: self.conflict_monitor.get_conflict_count(),
            },
            timing: self.timing_engine.diagnostics().to_vec(),
            cycle_time_s: self.machine.phase_ring().total_cycle_time_s(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::scenarios::seeded_mock_config;
    use serde_json::Value;

    fn test_config() -> IntersectionConfig {
        let mut config = IntersectionConfig::default();
        config.vision.extra = seeded_mock_config(42);
        config
    }

    #[test]
    fn test_setup_wires_subsystems() {
        let controller = TrafficController::new(test_config()).unwrap();
        assert_eq!(controller.get_tick_count(), 0);
        assert_eq!(controller.machine().current_phase_idx(), 0);
        // Initial plan was applied: through greens hold the ped floor
        let ring = controller.machine().phase_ring();
        for phase in ring.phases() {
            if !phase.is_left_turn() {
                assert!(phase.green_time_s >= phase.walk_time_s + phase.ped_clearance_time_s);
            }
        }
    }

    #[test]
    fn test_external_kind_requires_instance() {
        let mut config = test_config();
        config.vision.provider_kind = ProviderKind::External;
        assert!(matches!(
            TrafficController::new(config),
            Err(ControllerError::MissingExternalProvider)
        ));
    }

    #[test]
    fn test_tick_advances_and_reports_status() {
        let mut controller = TrafficController::new(test_config()).unwrap();
        let mut now = 0.0;
        for _ in 0..100 {
            now += 0.1;
            controller.tick(now);
        }
        assert_eq!(controller.get_tick_count(), 100);

        let status = controller.full_status(now);
        assert_eq!(status.tick, 100);
        let json = status.to_json();
        assert!(json["signals"]["phase"].is_u64());
        assert_eq!(json["conflict_monitor"]["fault_active"], Value::from(false));
    }

    #[test]
    fn test_observer_runs_and_panic_is_contained() {
        let mut controller = TrafficController::new(test_config()).unwrap();
        let seen = Arc::new(AtomicBool::new(false));
        let seen_clone = Arc::clone(&seen);
        controller.add_observer(Box::new(move |status| {
            if status.tick > 0 {
                seen_clone.store(true, Ordering::Relaxed);
            }
        }));
        controller.add_observer(Box::new(|_| panic!("observer bug")));

        controller.tick(0.1);
        controller.tick(0.2);
        assert!(seen.load(Ordering::Relaxed));
        assert_eq!(controller.get_tick_count(), 2);
    }

    #[test]
    fn test_preemption_passthrough() {
        let mut controller = TrafficController::new(test_config()).unwrap();
        controller.trigger_preemption(Direction::East, 0.5);
        assert!(controller.preemption_manager().is_active());
        controller.clear_preemption(1.0);
        assert!(!controller.preemption_manager().is_active());
    }
}
