use crate::intersection::direction::Direction;
use std::collections::HashMap;
use std::fmt;
use lazy_static::lazy_static;

/// Custom error types for `LaneKind`.
#[derive(Debug, Clone)]
pub enum LaneKindError {
    /// Indicates that the provided lane kind string is invalid.
    InvalidLaneKind(String),
}

impl fmt::Display for LaneKindError {
    /// Formats the error message for `LaneKindError`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneKindError::InvalidLaneKind(value) => {
                write!(f, "Invalid lane kind: '{}'", value)
            }
        }
    }
}

impl std::error::Error for LaneKindError {}

lazy_static! {
    static ref LANE_KIND_CONVERTER: HashMap<&'static str, LaneKind> = {
        let mut m = HashMap::new();
        m.insert("through", LaneKind::Through);
        m.insert("left_turn", LaneKind::LeftTurn);
        m
    };
}

/// Kind of lane within an approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneKind {
    Through,
    LeftTurn,
}

impl LaneKind {
    pub const ALL: [LaneKind; 2] = [LaneKind::Through, LaneKind::LeftTurn];

    /// Converts a string representation to a `LaneKind`.
    pub fn from_str(kind_str: &str) -> Result<Self, LaneKindError> {
        LANE_KIND_CONVERTER
            .get(kind_str)
            .copied()
            .ok_or(LaneKindError::InvalidLaneKind(kind_str.to_string()))
    }
}

impl fmt::Display for LaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind_str = match self {
            LaneKind::Through => "through",
            LaneKind::LeftTurn => "left_turn",
        };
        write!(f, "{}", kind_str)
    }
}

/// A single lane within an approach (through or left-turn).
///
/// Holds the saturation-flow constant and the live queue state written
/// by the detection adapter. No other subsystem mutates the queue.
#[derive(Debug, Clone)]
pub struct Lane {
    direction: Direction,
    kind: LaneKind,
    /// Saturation flow in veh/hr/lane.
    saturation_flow: f64,
    /// Vehicles currently queued. Updated by the vision pipeline.
    queue_count: u32,
    /// Estimated vehicles/sec arriving.
    arrival_rate: f64,
    /// Monotonic timestamp of the last queue update (seconds).
    last_updated: f64,
}

impl Lane {
    /// Creates a new lane with an empty queue.
    ///
    /// # Arguments
    /// * `direction` - Which approach the lane belongs to.
    /// * `kind` - Through or left-turn.
    /// * `saturation_flow` - Discharge rate in veh/hr/lane.
    pub fn new(direction: Direction, kind: LaneKind, saturation_flow: f64) -> Self {
        Lane {
            direction,
            kind,
            saturation_flow,
            queue_count: 0,
            arrival_rate: 0.0,
            last_updated: 0.0,
        }
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub fn get_kind(&self) -> LaneKind {
        self.kind
    }

    pub fn get_saturation_flow(&self) -> f64 {
        self.saturation_flow
    }

    pub fn get_queue_count(&self) -> u32 {
        self.queue_count
    }

    pub fn get_arrival_rate(&self) -> f64 {
        self.arrival_rate
    }

    pub fn get_last_updated(&self) -> f64 {
        self.last_updated
    }

    /// Saturation flow converted to vehicles per second.
    pub fn saturation_flow_per_sec(&self) -> f64 {
        self.saturation_flow / 3600.0
    }

    /// Seconds of green needed to discharge the current queue.
    ///
    /// Formula: `queue_count / (saturation_flow / 3600) + startup_lost_time`.
    /// Returns 0 for an empty queue.
    pub fn green_time_to_clear(&self, startup_lost_time_s: f64) -> f64 {
        if self.queue_count == 0 {
            return 0.0;
        }
        (self.queue_count as f64 / self.saturation_flow_per_sec()) + startup_lost_time_s
    }

    /// Ratio of demand to the capacity granted by a given green time.
    ///
    /// v/c = queue_count / (saturation_flow_per_sec * green_time).
    /// Values near 1.0 mean the lane is at capacity. Non-positive green
    /// yields infinity; the caller is expected to cap it.
    pub fn degree_of_saturation(&self, green_time_s: f64) -> f64 {
        if green_time_s <= 0.0 {
            return f64::INFINITY;
        }
        let capacity = self.saturation_flow_per_sec() * green_time_s;
        if capacity <= 0.0 {
            return f64::INFINITY;
        }
        self.queue_count as f64 / capacity
    }

    /// Updates live state from the vision pipeline.
    pub fn update(&mut self, queue_count: u32, arrival_rate: f64, now: f64) {
        self.queue_count = queue_count;
        self.arrival_rate = arrival_rate.max(0.0);
        self.last_updated = now;
    }
}
