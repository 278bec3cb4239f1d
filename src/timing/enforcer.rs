use crate::log_additional;
use crate::signals::phase::Phase;
use crate::timing::constraints::TimingConstraints;
use crate::verbose::EVENT_TIMING_CLAMP;

/// Clamps phase timings to safe limits.
///
/// All phase durations must pass through these checks before being
/// applied. The enforcer is total and idempotent: any input produces a
/// safe output, and enforcing twice changes nothing the second time.
/// Safety-critical minimums and maximums are never violated regardless
/// of what the adaptive algorithm requests.
#[derive(Debug, Clone)]
pub struct TimingEnforcer {
    constraints: TimingConstraints,
}

impl TimingEnforcer {
    pub fn new(constraints: TimingConstraints) -> Self {
        TimingEnforcer { constraints }
    }

    pub fn get_constraints(&self) -> &TimingConstraints {
        &self.constraints
    }

    /// Applies all timing constraints to a phase in place.
    ///
    /// Order of application:
    /// 1. Clamp green into the per-kind bounds.
    /// 2. Overwrite yellow and all-red with the fixed clearance values.
    /// 3. For through phases, floor the walk time, derive pedestrian
    ///    clearance from the crosswalk and extend green so that
    ///    walk + ped clearance always fits inside it. The pedestrian
    ///    extension wins over max-green.
    ///
    /// Logs at `Additional` level whenever a value was changed.
    pub fn enforce(&self, phase: &mut Phase) {
        let c = &self.constraints;

        let (min_green, max_green) = if phase.is_left_turn() {
            (c.min_protected_left_green_s, c.max_protected_left_green_s)
        } else {
            (c.min_green_s, c.max_green_s)
        };

        let original_green = phase.green_time_s;
        phase.green_time_s = phase.green_time_s.clamp(min_green, max_green);
        if phase.green_time_s != original_green {
            log_additional!(
                EVENT_TIMING_CLAMP,
                "Phase green clamped",
                phase = phase.id.0,
                from = original_green,
                to = phase.green_time_s
            );
        }

        // Clearance intervals are fixed, never adaptive
        phase.yellow_time_s = c.yellow_clearance_s;
        phase.all_red_time_s = c.all_red_clearance_s;

        if !phase.is_left_turn() {
            phase.walk_time_s = phase.walk_time_s.max(c.min_walk_s);
            phase.ped_clearance_time_s = c.ped_clearance_s();

            // Green must contain the full pedestrian service interval
            let min_ped_green = phase.walk_time_s + phase.ped_clearance_time_s;
            if phase.green_time_s < min_ped_green {
                log_additional!(
                    EVENT_TIMING_CLAMP,
                    "Phase green extended for pedestrian timing",
                    phase = phase.id.0,
                    from = phase.green_time_s,
                    to = min_ped_green
                );
                phase.green_time_s = min_ped_green;
            }
        }
    }

    /// Applies constraints to all phases and then to the cycle total.
    ///
    /// When the summed cycle falls outside `[min_cycle_s, max_cycle_s]`
    /// green times are scaled proportionally and re-clamped. If the
    /// re-clamp pushes the cycle back out of bounds the per-phase
    /// limits win: they are safety, the cycle bound is efficiency.
    pub fn enforce_cycle(&self, phases: &mut [Phase]) {
        for phase in phases.iter_mut() {
            self.enforce(phase);
        }

        let total: f64 = phases.iter().map(|p| p.total_phase_time_s()).sum();
        if total < self.constraints.min_cycle_s {
            log_additional!(
                EVENT_TIMING_CLAMP,
                "Cycle below minimum, extending greens proportionally",
                total = total,
                min = self.constraints.min_cycle_s
            );
            self.rescale_greens(phases, total, self.constraints.min_cycle_s);
        } else if total > self.constraints.max_cycle_s {
            log_additional!(
                EVENT_TIMING_CLAMP,
                "Cycle above maximum, reducing greens proportionally",
                total = total,
                max = self.constraints.max_cycle_s
            );
            self.rescale_greens(phases, total, self.constraints.max_cycle_s);
        }
    }

    /// Proportionally rescales green times so the cycle meets `target_total`,
    /// then re-clamps each phase into its own bounds.
    fn rescale_greens(&self, phases: &mut [Phase], current_total: f64, target_total: f64) {
        let fixed_time: f64 = phases
            .iter()
            .map(|p| p.yellow_time_s + p.all_red_time_s)
            .sum();
        let green_time = current_total - fixed_time;
        let target_green = target_total - fixed_time;

        if green_time <= 0.0 {
            return;
        }

        let ratio = target_green / green_time;
        for phase in phases.iter_mut() {
            phase.green_time_s *= ratio;
            self.enforce(phase);
        }
    }
}
