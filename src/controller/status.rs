use crate::intersection::direction::Direction;
use crate::safety::preemption::PreemptionStatus;
use crate::signals::heads::SignalHead;
use crate::signals::phase::{PhaseId, PhaseKind, PhaseStep};
use crate::timing::adaptive::PhaseDemand;
use indexmap::IndexMap;
use serde_json::{json, Value};

/// Signal summary within the status snapshot.
#[derive(Debug, Clone)]
pub struct SignalsStatus {
    pub phase_id: PhaseId,
    pub phase_kind: PhaseKind,
    pub step: PhaseStep,
    pub step_remaining_s: f64,
    pub cycle: u32,
    pub is_preempted: bool,
    pub heads: IndexMap<Direction, SignalHead>,
}

/// Conflict monitor summary within the status snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictMonitorStatus {
    pub fault_active: bool,
    pub conflict_count: u32,
}

/// Structured snapshot of the whole controller for observers and UIs.
///
/// Produced once per tick; everything a dashboard needs without
/// reaching into the subsystems.
#[derive(Debug, Clone)]
pub struct ControllerStatus {
    pub tick: u64,
    /// Per-approach (through, left-turn) queue counts.
    pub queues: IndexMap<Direction, (u32, u32)>,
    pub signals: SignalsStatus,
    pub preemption: PreemptionStatus,
    pub conflict_monitor: ConflictMonitorStatus,
    /// Demand metrics from the most recent cycle plan.
    pub timing: Vec<PhaseDemand>,
    pub cycle_time_s: f64,
}

impl ControllerStatus {
    /// Renders the snapshot as a JSON value for logging or transport.
    pub fn to_json(&self) -> Value {
        let queues: Value = self
            .queues
            .iter()
            .map(|(direction, (through, left))| {
                (
                    direction.to_string(),
                    json!({ "through": through, "left_turn": left }),
                )
            })
            .collect::<serde_json::Map<String, Value>>()
            .into();

        let heads: Value = self
            .signals
            .heads
            .iter()
            .map(|(direction, head)| {
                (
                    direction.to_string(),
                    json!({
                        "vehicle": head.vehicle.to_string(),
                        "left_turn": head.left_turn.to_string(),
                        "pedestrian": head.pedestrian.to_string(),
                    }),
                )
            })
            .collect::<serde_json::Map<String, Value>>()
            .into();

        let timing: Vec<Value> = self
            .timing
            .iter()
            .map(|d| {
                json!({
                    "phase_id": d.phase_id.0,
                    "queue": d.total_queue,
                    "ideal_green_s": d.ideal_green_s,
                    "ds": d.degree_of_saturation,
                    "protected_left": d.needs_protected_left,
                })
            })
            .collect();

        json!({
            "tick": self.tick,
            "intersection": queues,
            "signals": {
                "phase": self.signals.phase_id.0,
                "phase_kind": self.signals.phase_kind.to_string(),
                "step": self.signals.step.to_string(),
                "step_remaining_s": self.signals.step_remaining_s,
                "cycle": self.signals.cycle,
                "is_preempted": self.signals.is_preempted,
                "heads": heads,
            },
            "preemption": {
                "active": self.preemption.active_direction.map(|d| d.to_string()),
                "hold_elapsed_s": self.preemption.hold_elapsed_s,
                "queue_depth": self.preemption.queue_depth,
                "total_events": self.preemption.total_events,
            },
            "conflict_monitor": {
                "fault_active": self.conflict_monitor.fault_active,
                "conflict_count": self.conflict_monitor.conflict_count,
            },
            "timing": timing,
            "cycle_time_s": self.cycle_time_s,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::heads::SignalHead;

    #[test]
    fn test_to_json_shape() {
        let mut heads = IndexMap::new();
        for direction in Direction::ALL {
            heads.insert(direction, SignalHead::new(direction));
        }
        let status = ControllerStatus {
            tick: 17,
            queues: Direction::ALL.iter().map(|d| (*d, (3, 1))).collect(),
            signals: SignalsStatus {
                phase_id: PhaseId(2),
                phase_kind: PhaseKind::Through,
                step: PhaseStep::Green,
                step_remaining_s: 4.5,
                cycle: 3,
                is_preempted: false,
                heads,
            },
            preemption: PreemptionStatus {
                active_direction: None,
                hold_elapsed_s: 0.0,
                queue_depth: 0,
                total_events: 0,
            },
            conflict_monitor: ConflictMonitorStatus {
                fault_active: false,
                conflict_count: 0,
            },
            timing: Vec::new(),
            cycle_time_s: 90.0,
        };

        let value = status.to_json();
        assert_eq!(value["tick"], 17);
        assert_eq!(value["signals"]["phase"], 2);
        assert_eq!(value["signals"]["step"], "green");
        assert_eq!(value["intersection"]["N"]["through"], 3);
        assert_eq!(value["conflict_monitor"]["fault_active"], false);
        assert_eq!(value["preemption"]["active"], Value::Null);
    }
}
