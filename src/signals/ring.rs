use crate::intersection::direction::Direction;
use crate::signals::phase::{Phase, PhaseId, PhaseKind};
use crate::timing::constraints::TimingConstraints;
use std::fmt;

/// Custom error types for `PhaseRing` construction.
#[derive(Debug, Clone)]
pub enum PhaseRingError {
    /// Indicates that the ring has no phases.
    EmptyRing,
    /// Indicates that a phase serves two conflicting directions at once.
    ConflictingServedDirections(PhaseId),
    /// Indicates that two adjacent phases grant the same movement.
    AdjacentSharedMovement(PhaseId, PhaseId),
}

impl fmt::Display for PhaseRingError {
    /// Formats the error message for `PhaseRingError`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseRingError::EmptyRing => {
                write!(f, "Phase ring must contain at least one phase")
            }
            PhaseRingError::ConflictingServedDirections(id) => {
                write!(f, "Phase {} serves conflicting directions", id)
            }
            PhaseRingError::AdjacentSharedMovement(a, b) => {
                write!(f, "Adjacent phases {} and {} share a movement", a, b)
            }
        }
    }
}

impl std::error::Error for PhaseRingError {}

/// Ordered sequence of phases that constitute one signal cycle.
///
/// The ring is cyclic: after the last phase the first one starts again.
/// Standard layout for a 4-way intersection:
///   Phase 1: N/S left turn
///   Phase 2: N/S through
///   Phase 3: E/W left turn
///   Phase 4: E/W through
#[derive(Debug, Clone)]
pub struct PhaseRing {
    phases: Vec<Phase>,
}

impl PhaseRing {
    /// Creates a ring from an ordered list of phases, validating the
    /// ring invariants.
    ///
    /// # Arguments
    /// * `phases` - Phases in cycle order.
    ///
    /// # Returns
    /// A `Result` with the ring, or an error when a phase serves a
    /// conflicting direction pair or two adjacent phases (including the
    /// last-to-first wraparound) grant the same movement.
    pub fn new(phases: Vec<Phase>) -> Result<Self, PhaseRingError> {
        if phases.is_empty() {
            return Err(PhaseRingError::EmptyRing);
        }
        for phase in &phases {
            if phase.has_conflicting_directions() {
                return Err(PhaseRingError::ConflictingServedDirections(phase.id));
            }
        }
        if phases.len() > 1 {
            for i in 0..phases.len() {
                let next = (i + 1) % phases.len();
                let current_movements = phases[i].movements();
                for movement in phases[next].movements() {
                    if current_movements.contains(&movement) {
                        return Err(PhaseRingError::AdjacentSharedMovement(
                            phases[i].id,
                            phases[next].id,
                        ));
                    }
                }
            }
        }
        Ok(PhaseRing { phases })
    }

    /// Builds the standard 4-phase ring for a 4-way intersection.
    ///
    /// Left-turn phases carry no pedestrian timing; through phases get
    /// minimum walk plus the derived pedestrian clearance.
    pub fn standard_4way(timing: &TimingConstraints) -> Self {
        let ped_clearance = timing.ped_clearance_s();

        let phases = vec![
            Phase::new(PhaseId(1), PhaseKind::LeftTurn)
                .with_served_directions(vec![Direction::North, Direction::South])
                .with_green_time(timing.min_protected_left_green_s)
                .with_yellow_time(timing.yellow_clearance_s)
                .with_all_red_time(timing.all_red_clearance_s)
                .build(),
            Phase::new(PhaseId(2), PhaseKind::Through)
                .with_served_directions(vec![Direction::North, Direction::South])
                .with_green_time(timing.min_green_s)
                .with_yellow_time(timing.yellow_clearance_s)
                .with_all_red_time(timing.all_red_clearance_s)
                .with_walk_time(timing.min_walk_s)
                .with_ped_clearance_time(ped_clearance)
                .build(),
            Phase::new(PhaseId(3), PhaseKind::LeftTurn)
                .with_served_directions(vec![Direction::East, Direction::West])
                .with_green_time(timing.min_protected_left_green_s)
                .with_yellow_time(timing.yellow_clearance_s)
                .with_all_red_time(timing.all_red_clearance_s)
                .build(),
            Phase::new(PhaseId(4), PhaseKind::Through)
                .with_served_directions(vec![Direction::East, Direction::West])
                .with_green_time(timing.min_green_s)
                .with_yellow_time(timing.yellow_clearance_s)
                .with_all_red_time(timing.all_red_clearance_s)
                .with_walk_time(timing.min_walk_s)
                .with_ped_clearance_time(ped_clearance)
                .build(),
        ];

        // The standard layout satisfies every ring invariant
        PhaseRing { phases }
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn phases_mut(&mut self) -> &mut [Phase] {
        &mut self.phases
    }

    pub fn phase(&self, idx: usize) -> &Phase {
        &self.phases[idx]
    }

    /// Index of the phase following `current`, wrapping around.
    pub fn next_phase_index(&self, current: usize) -> usize {
        (current + 1) % self.phases.len()
    }

    /// Sum of total phase times over the whole ring.
    pub fn total_cycle_time_s(&self) -> f64 {
        self.phases.iter().map(|p| p.total_phase_time_s()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_standard_4way_layout() {
        let timing = TimingConstraints::default();
        let ring = PhaseRing::standard_4way(&timing);

        assert_eq!(ring.len(), 4);
        assert_eq!(ring.phase(0).kind, PhaseKind::LeftTurn);
        assert_eq!(ring.phase(1).kind, PhaseKind::Through);
        assert_eq!(ring.phase(2).kind, PhaseKind::LeftTurn);
        assert_eq!(ring.phase(3).kind, PhaseKind::Through);

        assert_eq!(
            ring.phase(0).served_directions,
            vec![Direction::North, Direction::South]
        );
        assert_eq!(
            ring.phase(3).served_directions,
            vec![Direction::East, Direction::West]
        );

        // Clearance values come straight from the constraints
        for phase in ring.phases() {
            assert_eq!(phase.yellow_time_s, timing.yellow_clearance_s);
            assert_eq!(phase.all_red_time_s, timing.all_red_clearance_s);
        }
    }
    #[test]
    fn test_next_phase_index_wraps() {
        let ring = PhaseRing::standard_4way(&TimingConstraints::default());
        assert_eq!(ring.next_phase_index(0), 1);
        assert_eq!(ring.next_phase_index(3), 0);
    }
    #[test]
    fn test_rejects_conflicting_served_directions() {
        let bad = Phase::new(PhaseId(1), PhaseKind::Through)
            .with_served_directions(vec![Direction::North, Direction::East])
            .build();
        let result = PhaseRing::new(vec![bad]);
        assert!(matches!(
            result,
            Err(PhaseRingError::ConflictingServedDirections(PhaseId(1)))
        ));
    }
    #[test]
    fn test_rejects_adjacent_shared_movement() {
        let first = Phase::new(PhaseId(1), PhaseKind::Through)
            .with_served_directions(vec![Direction::North, Direction::South])
            .build();
        let second = Phase::new(PhaseId(2), PhaseKind::Through)
            .with_served_directions(vec![Direction::North, Direction::South])
            .build();
        let result = PhaseRing::new(vec![first, second]);
        assert!(matches!(
            result,
            Err(PhaseRingError::AdjacentSharedMovement(PhaseId(1), PhaseId(2)))
        ));
    }
    #[test]
    fn test_total_cycle_time() {
        let timing = TimingConstraints::default();
        let ring = PhaseRing::standard_4way(&timing);
        let expected: f64 = ring.phases().iter().map(|p| p.total_phase_time_s()).sum();
        assert!((ring.total_cycle_time_s() - expected).abs() < 1e-9);
    }
}
