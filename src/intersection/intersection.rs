use crate::intersection::approach::Approach;
use crate::intersection::direction::Direction;
use crate::intersection::lane::Lane;
use crate::timing::constraints::FlowDefaults;
use indexmap::IndexMap;

/// A complete 4-way intersection with four approaches.
///
/// This is the central data model that the controller, timing engine
/// and status snapshot all read from / write to. Invariant: exactly
/// four approaches, one per direction, in canonical N, S, E, W order.
#[derive(Debug, Clone)]
pub struct Intersection {
    name: String,
    approaches: IndexMap<Direction, Approach>,
}

impl Intersection {
    /// Builds a standard 4-way intersection with default lanes.
    ///
    /// # Arguments
    /// * `name` - Human-readable intersection name.
    /// * `flow` - Saturation flow defaults for the lanes.
    /// * `crosswalk_distance_ft` - Crossing distance applied to every approach.
    ///
    /// # Returns
    /// An `Intersection` with one approach per cardinal direction.
    pub fn create_standard(
        name: impl Into<String>,
        flow: FlowDefaults,
        crosswalk_distance_ft: f64,
    ) -> Self {
        let mut approaches = IndexMap::new();
        for direction in Direction::ALL {
            approaches.insert(
                direction,
                Approach::new(
                    direction,
                    flow.through_lane,
                    flow.left_turn_lane,
                    crosswalk_distance_ft,
                ),
            );
        }
        Intersection {
            name: name.into(),
            approaches,
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Borrow the approach for a direction. Always present for the four
    /// cardinal directions by construction.
    pub fn approach(&self, direction: Direction) -> &Approach {
        &self.approaches[&direction]
    }

    pub fn approach_mut(&mut self, direction: Direction) -> &mut Approach {
        &mut self.approaches[&direction]
    }

    pub fn approaches(&self) -> impl Iterator<Item = &Approach> {
        self.approaches.values()
    }

    /// All eight lanes of the intersection in canonical order.
    pub fn all_lanes(&self) -> Vec<&Lane> {
        let mut lanes = Vec::with_capacity(8);
        for approach in self.approaches.values() {
            lanes.push(approach.through_lane());
            lanes.push(approach.left_turn_lane());
        }
        lanes
    }

    /// Sum of queue counts over all lanes.
    pub fn total_queue(&self) -> u32 {
        self.approaches.values().map(|a| a.total_queue()).sum()
    }

    /// Queue counts per approach for logging and the status snapshot.
    pub fn snapshot(&self) -> IndexMap<Direction, (u32, u32)> {
        self.approaches
            .iter()
            .map(|(d, a)| (*d, (a.through_queue(), a.left_turn_queue())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_create_standard_has_four_approaches() {
        let intersection =
            Intersection::create_standard("Main & 1st", FlowDefaults::default(), 48.0);
        for direction in Direction::ALL {
            assert_eq!(intersection.approach(direction).get_direction(), direction);
        }
        assert_eq!(intersection.all_lanes().len(), 8);
        assert_eq!(intersection.total_queue(), 0);
    }
    #[test]
    fn test_snapshot_reflects_queue_updates() {
        let mut intersection =
            Intersection::create_standard("Main & 1st", FlowDefaults::default(), 48.0);
        intersection
            .approach_mut(Direction::North)
            .through_lane_mut()
            .update(12, 0.0, 0.0);
        intersection
            .approach_mut(Direction::East)
            .left_turn_lane_mut()
            .update(4, 0.0, 0.0);

        let snapshot = intersection.snapshot();
        assert_eq!(snapshot[&Direction::North], (12, 0));
        assert_eq!(snapshot[&Direction::East], (0, 4));
        assert_eq!(intersection.total_queue(), 16);
    }
}
