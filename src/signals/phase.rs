use crate::intersection::direction::Direction;
use crate::intersection::lane::LaneKind;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhaseId(pub u32);

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which movement class a phase serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// N/S or E/W through movement.
    Through,
    /// Protected or permissive left turn.
    LeftTurn,
}

impl PhaseKind {
    pub fn lane_kind(self) -> LaneKind {
        match self {
            PhaseKind::Through => LaneKind::Through,
            PhaseKind::LeftTurn => LaneKind::LeftTurn,
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PhaseKind::Through => "through",
            PhaseKind::LeftTurn => "left_turn",
        };
        write!(f, "{}", s)
    }
}

/// Sub-states within a single phase.
///
/// `FlashingYellow` is defined for permissive-left pass-throughs but is
/// not entered by the current transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseStep {
    /// Main green (or green arrow for a left-turn phase).
    Green,
    FlashingYellow,
    /// Yellow clearance.
    Yellow,
    /// All-red clearance.
    AllRed,
}

impl fmt::Display for PhaseStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PhaseStep::Green => "green",
            PhaseStep::FlashingYellow => "flashing_yellow",
            PhaseStep::Yellow => "yellow",
            PhaseStep::AllRed => "all_red",
        };
        write!(f, "{}", s)
    }
}

/// A single traffic phase — defines which movements get green.
///
/// In a standard 4-way intersection through phases serve opposing
/// directions (N+S or E+W) and left-turn phases serve opposing left
/// turns. Green, walk and left-turn mode are rewritten each cycle by
/// the adaptive engine; yellow and all-red always come from the
/// timing constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    pub id: PhaseId,
    pub kind: PhaseKind,
    /// Which approaches get green during this phase.
    pub served_directions: Vec<Direction>,

    // Timing, set by the adaptive engine each cycle.
    pub green_time_s: f64,
    pub yellow_time_s: f64,
    pub all_red_time_s: f64,

    // Pedestrian timing, concurrent with vehicle green.
    pub walk_time_s: f64,
    pub ped_clearance_time_s: f64,

    /// True = green arrow, false = permissive flashing yellow.
    pub use_protected_left: bool,
}

impl Phase {
    /// Creates a new `PhaseBuilder` for constructing a `Phase`.
    ///
    /// # Arguments
    /// * `id` - The phase identifier.
    /// * `kind` - Through or left-turn.
    ///
    /// # Returns
    /// A `PhaseBuilder` instance for configuring and building the phase.
    pub fn new(id: PhaseId, kind: PhaseKind) -> PhaseBuilder {
        PhaseBuilder {
            phase: Phase {
                id,
                kind,
                served_directions: Vec::new(),
                green_time_s: 15.0,
                yellow_time_s: 4.0,
                all_red_time_s: 2.5,
                walk_time_s: 0.0,
                ped_clearance_time_s: 0.0,
                use_protected_left: false,
            },
        }
    }

    pub fn is_left_turn(&self) -> bool {
        self.kind == PhaseKind::LeftTurn
    }

    /// Total time this phase occupies: green + yellow + all-red.
    pub fn total_phase_time_s(&self) -> f64 {
        self.green_time_s + self.yellow_time_s + self.all_red_time_s
    }

    /// Movements (direction, lane kind) this phase grants.
    pub fn movements(&self) -> Vec<(Direction, LaneKind)> {
        self.served_directions
            .iter()
            .map(|d| (*d, self.kind.lane_kind()))
            .collect()
    }

    /// Whether the served set contains a conflicting pair of directions.
    pub fn has_conflicting_directions(&self) -> bool {
        for (i, d1) in self.served_directions.iter().enumerate() {
            for d2 in self.served_directions.iter().skip(i + 1) {
                if d1.conflicts_with(*d2) {
                    return true;
                }
            }
        }
        false
    }
}

/// A builder for constructing `Phase` instances.
pub struct PhaseBuilder {
    phase: Phase,
}

impl PhaseBuilder {
    /// Sets the directions served by the phase.
    pub fn with_served_directions(mut self, directions: Vec<Direction>) -> Self {
        self.phase.served_directions = directions;
        self
    }

    /// Sets the green interval duration.
    pub fn with_green_time(mut self, green_time_s: f64) -> Self {
        self.phase.green_time_s = green_time_s;
        self
    }

    /// Sets the yellow clearance duration.
    pub fn with_yellow_time(mut self, yellow_time_s: f64) -> Self {
        self.phase.yellow_time_s = yellow_time_s;
        self
    }

    /// Sets the all-red clearance duration.
    pub fn with_all_red_time(mut self, all_red_time_s: f64) -> Self {
        self.phase.all_red_time_s = all_red_time_s;
        self
    }

    /// Sets the pedestrian walk duration.
    pub fn with_walk_time(mut self, walk_time_s: f64) -> Self {
        self.phase.walk_time_s = walk_time_s;
        self
    }

    /// Sets the pedestrian clearance duration.
    pub fn with_ped_clearance_time(mut self, ped_clearance_time_s: f64) -> Self {
        self.phase.ped_clearance_time_s = ped_clearance_time_s;
        self
    }

    /// Sets the left-turn mode.
    pub fn with_protected_left(mut self, use_protected_left: bool) -> Self {
        self.phase.use_protected_left = use_protected_left;
        self
    }

    /// Builds and returns the final `Phase` instance.
    pub fn build(self) -> Phase {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_total_phase_time() {
        let phase = Phase::new(PhaseId(2), PhaseKind::Through)
            .with_served_directions(vec![Direction::North, Direction::South])
            .with_green_time(20.0)
            .with_yellow_time(4.0)
            .with_all_red_time(2.5)
            .build();
        assert!((phase.total_phase_time_s() - 26.5).abs() < 1e-9);
    }
    #[test]
    fn test_conflicting_served_directions() {
        let good = Phase::new(PhaseId(1), PhaseKind::Through)
            .with_served_directions(vec![Direction::East, Direction::West])
            .build();
        assert!(!good.has_conflicting_directions());

        let bad = Phase::new(PhaseId(1), PhaseKind::Through)
            .with_served_directions(vec![Direction::North, Direction::East])
            .build();
        assert!(bad.has_conflicting_directions());
    }
    #[test]
    fn test_movements() {
        let phase = Phase::new(PhaseId(3), PhaseKind::LeftTurn)
            .with_served_directions(vec![Direction::East, Direction::West])
            .build();
        let movements = phase.movements();
        assert!(movements.contains(&(Direction::East, crate::intersection::LaneKind::LeftTurn)));
        assert!(movements.contains(&(Direction::West, crate::intersection::LaneKind::LeftTurn)));
    }
}
