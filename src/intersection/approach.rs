use crate::intersection::direction::Direction;
use crate::intersection::lane::{Lane, LaneKind};

/// One of the four cardinal approaches to the intersection.
///
/// Each approach has one through lane (may represent multiple physical
/// lanes aggregated) and one left-turn lane, plus the crosswalk the
/// pedestrian clearance interval is derived from.
#[derive(Debug, Clone)]
pub struct Approach {
    direction: Direction,
    through_lane: Lane,
    left_turn_lane: Lane,
    has_pedestrian_crossing: bool,
    crosswalk_distance_ft: f64,
}

impl Approach {
    /// Creates a new approach with empty lanes.
    pub fn new(
        direction: Direction,
        through_saturation_flow: f64,
        left_saturation_flow: f64,
        crosswalk_distance_ft: f64,
    ) -> Self {
        Approach {
            direction,
            through_lane: Lane::new(direction, LaneKind::Through, through_saturation_flow),
            left_turn_lane: Lane::new(direction, LaneKind::LeftTurn, left_saturation_flow),
            has_pedestrian_crossing: true,
            crosswalk_distance_ft,
        }
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub fn through_lane(&self) -> &Lane {
        &self.through_lane
    }

    pub fn through_lane_mut(&mut self) -> &mut Lane {
        &mut self.through_lane
    }

    pub fn left_turn_lane(&self) -> &Lane {
        &self.left_turn_lane
    }

    pub fn left_turn_lane_mut(&mut self) -> &mut Lane {
        &mut self.left_turn_lane
    }

    pub fn lane(&self, kind: LaneKind) -> &Lane {
        match kind {
            LaneKind::Through => &self.through_lane,
            LaneKind::LeftTurn => &self.left_turn_lane,
        }
    }

    pub fn lane_mut(&mut self, kind: LaneKind) -> &mut Lane {
        match kind {
            LaneKind::Through => &mut self.through_lane,
            LaneKind::LeftTurn => &mut self.left_turn_lane,
        }
    }

    pub fn has_pedestrian_crossing(&self) -> bool {
        self.has_pedestrian_crossing
    }

    pub fn get_crosswalk_distance_ft(&self) -> f64 {
        self.crosswalk_distance_ft
    }

    /// Queued vehicles across both lanes.
    pub fn total_queue(&self) -> u32 {
        self.through_lane.get_queue_count() + self.left_turn_lane.get_queue_count()
    }

    pub fn through_queue(&self) -> u32 {
        self.through_lane.get_queue_count()
    }

    pub fn left_turn_queue(&self) -> u32 {
        self.left_turn_lane.get_queue_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_approach_queues() {
        let mut approach = Approach::new(Direction::West, 1800.0, 1600.0, 48.0);
        assert_eq!(approach.total_queue(), 0);

        approach.through_lane_mut().update(7, 0.0, 0.0);
        approach.left_turn_lane_mut().update(2, 0.0, 0.0);

        assert_eq!(approach.through_queue(), 7);
        assert_eq!(approach.left_turn_queue(), 2);
        assert_eq!(approach.total_queue(), 9);
    }
}
