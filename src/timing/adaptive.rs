use crate::intersection::intersection::Intersection;
use crate::log_main;
use crate::signals::phase::PhaseId;
use crate::signals::ring::PhaseRing;
use crate::timing::constraints::TimingConstraints;
use crate::timing::enforcer::TimingEnforcer;
use crate::verbose::EVENT_CYCLE_PLAN;
use indexmap::IndexMap;

/// Computed demand metrics for a single phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseDemand {
    pub phase_id: PhaseId,
    /// Total vehicles queued for this phase.
    pub total_queue: u32,
    /// Green time needed to clear the queue.
    pub ideal_green_s: f64,
    /// Smoothed degree of saturation.
    pub degree_of_saturation: f64,
    /// Whether to use a protected arrow next cycle.
    pub needs_protected_left: bool,
}

/// Output of the adaptive algorithm — the immutable plan for the next cycle.
#[derive(Debug, Clone)]
pub struct CyclePlan {
    pub cycle_length_s: f64,
    pub phase_demands: Vec<PhaseDemand>,
    /// Phase id → allocated green time, in ring order.
    pub phase_greens: IndexMap<PhaseId, f64>,
}

/// Computes green splits for each cycle based on real-time demand.
///
/// SCATS-style adaptive timing: call
/// [`compute_cycle_plan`](AdaptiveTimingEngine::compute_cycle_plan) once
/// per completed cycle, then [`apply_plan`](AdaptiveTimingEngine::apply_plan)
/// to write the result into the phase ring through the enforcer.
///
/// Algorithm summary:
///   1. Compute degree of saturation (DS) for each phase, exponentially smoothed.
///   2. Compute ideal green time to clear each queue.
///   3. Derive total cycle length from overall demand (Webster).
///   4. Allocate green splits proportionally based on demand.
///   5. Decide protected vs. permissive left turn per phase.
///   6. Enforce all safety constraints.
#[derive(Debug)]
pub struct AdaptiveTimingEngine {
    timing: TimingConstraints,
    enforcer: TimingEnforcer,

    /// Smoothing factor for demand changes (0-1, higher = more reactive).
    smoothing_alpha: f64,

    /// Previous cycle's smoothed DS values.
    prev_ds: IndexMap<PhaseId, f64>,

    /// Demands from the most recent plan, kept for diagnostics.
    last_demands: Vec<PhaseDemand>,
}

impl AdaptiveTimingEngine {
    pub fn new(timing: TimingConstraints) -> Self {
        AdaptiveTimingEngine {
            timing,
            enforcer: TimingEnforcer::new(timing),
            smoothing_alpha: 0.6,
            prev_ds: IndexMap::new(),
            last_demands: Vec::new(),
        }
    }

    pub fn with_smoothing_alpha(mut self, alpha: f64) -> Self {
        self.smoothing_alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn get_enforcer(&self) -> &TimingEnforcer {
        &self.enforcer
    }

    /// Computes the green splits for the next cycle.
    ///
    /// This is the core adaptive algorithm. Any queue state is
    /// tolerated: division guards keep the DS bounded and a zero total
    /// weight degrades to uniform minimum-green allocation.
    pub fn compute_cycle_plan(
        &mut self,
        phase_ring: &PhaseRing,
        intersection: &Intersection,
    ) -> CyclePlan {
        let demands = self.compute_demands(phase_ring, intersection);
        let cycle_length = self.compute_cycle_length(&demands);
        let phase_greens = self.allocate_green_splits(&demands, cycle_length, phase_ring);

        self.last_demands = demands.clone();

        log_main!(
            EVENT_CYCLE_PLAN,
            "Cycle plan computed",
            cycle_length_s = cycle_length,
            phases = phase_greens.len()
        );

        CyclePlan {
            cycle_length_s: cycle_length,
            phase_demands: demands,
            phase_greens,
        }
    }

    /// Applies the computed plan to the phase ring.
    ///
    /// Sets green times and left-turn mode for each phase, then runs
    /// the full cycle-level enforcement.
    pub fn apply_plan(&self, plan: &CyclePlan, phase_ring: &mut PhaseRing) {
        for phase in phase_ring.phases_mut() {
            if let Some(green) = plan.phase_greens.get(&phase.id) {
                phase.green_time_s = *green;
            }
            if let Some(demand) = plan.phase_demands.iter().find(|d| d.phase_id == phase.id) {
                phase.use_protected_left = demand.needs_protected_left;
            }
        }

        self.enforcer.enforce_cycle(phase_ring.phases_mut());
    }

    /// Demand metrics from the most recent plan, for the status snapshot.
    pub fn diagnostics(&self) -> &[PhaseDemand] {
        &self.last_demands
    }

    // --- internal computation ---

    /// Computes demand metrics for each phase from current lane queues.
    fn compute_demands(
        &mut self,
        phase_ring: &PhaseRing,
        intersection: &Intersection,
    ) -> Vec<PhaseDemand> {
        let mut demands = Vec::with_capacity(phase_ring.len());

        for phase in phase_ring.phases() {
            let mut total_queue: u32 = 0;
            let mut max_ideal_green: f64 = 0.0;

            let lane_kind = phase.kind.lane_kind();
            for direction in &phase.served_directions {
                let lane = intersection.approach(*direction).lane(lane_kind);
                total_queue += lane.get_queue_count();
                let ideal = lane.green_time_to_clear(self.timing.startup_lost_time_s);
                max_ideal_green = max_ideal_green.max(ideal);
            }

            // DS against the capacity granted by the current green; the
            // denominator floor keeps it finite for tiny greens
            let current_green = phase.green_time_s;
            let sat_per_sec = phase
                .served_directions
                .first()
                .map(|d| {
                    intersection
                        .approach(*d)
                        .lane(lane_kind)
                        .saturation_flow_per_sec()
                })
                .unwrap_or(0.0);
            let ds_raw = total_queue as f64 / (current_green * sat_per_sec).max(1.0);

            // Exponential smoothing against the previous cycle
            let prev = *self.prev_ds.get(&phase.id).unwrap_or(&ds_raw);
            let smoothed = self.smoothing_alpha * ds_raw + (1.0 - self.smoothing_alpha) * prev;
            self.prev_ds.insert(phase.id, smoothed);

            let needs_protected_left = phase.is_left_turn()
                && total_queue >= self.timing.left_turn_queue_threshold;

            demands.push(PhaseDemand {
                phase_id: phase.id,
                total_queue,
                ideal_green_s: max_ideal_green,
                degree_of_saturation: smoothed,
                needs_protected_left,
            });
        }

        demands
    }

    /// Determines total cycle length from overall demand.
    ///
    /// Webster's optimal cycle formula (simplified):
    /// `C_opt = (1.5 * L + 5) / (1 - Y)` where L is total lost time and
    /// Y the critical-flow sum, approximated by the mean smoothed DS
    /// capped at 0.90. Very low demand snaps to the minimum cycle.
    fn compute_cycle_length(&self, demands: &[PhaseDemand]) -> f64 {
        let total_lost = demands.len() as f64
            * (self.timing.yellow_clearance_s + self.timing.all_red_clearance_s);

        let avg_ds = demands
            .iter()
            .map(|d| d.degree_of_saturation)
            .sum::<f64>()
            / (demands.len().max(1) as f64);

        let y = avg_ds.min(0.90);

        let cycle = if y < 0.05 {
            self.timing.min_cycle_s
        } else {
            (1.5 * total_lost + 5.0) / (1.0 - y)
        };

        cycle.clamp(self.timing.min_cycle_s, self.timing.max_cycle_s)
    }

    /// Distributes available green time proportionally based on demand.
    ///
    /// Available green = cycle length minus total fixed time (yellow +
    /// all-red). Each phase weighs in with its ideal green floored at
    /// the minimum green; permissive left turns get half the minimum
    /// protected arrow as a pass-through share.
    fn allocate_green_splits(
        &self,
        demands: &[PhaseDemand],
        cycle_length: f64,
        phase_ring: &PhaseRing,
    ) -> IndexMap<PhaseId, f64> {
        let total_fixed: f64 = phase_ring
            .phases()
            .iter()
            .map(|p| p.yellow_time_s + p.all_red_time_s)
            .sum();
        let available_green = (cycle_length - total_fixed).max(0.0);

        let mut weights: IndexMap<PhaseId, f64> = IndexMap::new();
        for demand in demands {
            let mut weight = if demand.total_queue == 0 {
                self.timing.min_green_s
            } else {
                demand.ideal_green_s.max(self.timing.min_green_s)
            };

            let is_left_turn = phase_ring
                .phases()
                .iter()
                .find(|p| p.id == demand.phase_id)
                .map(|p| p.is_left_turn())
                .unwrap_or(false);
            if is_left_turn && !demand.needs_protected_left {
                // Minimal share for the permissive pass-through
                weight = self.timing.min_protected_left_green_s * 0.5;
            }

            weights.insert(demand.phase_id, weight);
        }

        let mut total_weight: f64 = weights.values().sum();
        if total_weight <= 0.0 {
            total_weight = 1.0;
        }

        weights
            .into_iter()
            .map(|(phase_id, weight)| (phase_id, weight / total_weight * available_green))
            .collect()
    }
}
