use crate::intersection::direction::Direction;
use crate::intersection::intersection::Intersection;
use crate::timing::constraints::FlowDefaults;
use serde_json::Value;
use std::collections::HashMap;

/// Builds a standard empty intersection for tests and benches.
pub fn create_standard_intersection() -> Intersection {
    Intersection::create_standard("Main & 1st", FlowDefaults::default(), 48.0)
}

/// Mock provider configuration with a fixed seed for reproducible runs.
pub fn seeded_mock_config(seed: u64) -> HashMap<String, Value> {
    let mut config = HashMap::new();
    config.insert("random_seed".to_string(), Value::from(seed));
    config.insert("enable_surge".to_string(), Value::from(false));
    config
}

/// Loads every through lane with `through` vehicles and every left-turn
/// lane with `left` vehicles.
pub fn load_uniform_queues(intersection: &mut Intersection, through: u32, left: u32, now: f64) {
    for direction in Direction::ALL {
        let approach = intersection.approach_mut(direction);
        approach.through_lane_mut().update(through, 0.0, now);
        approach.left_turn_lane_mut().update(left, 0.0, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_load_uniform_queues() {
        let mut intersection = create_standard_intersection();
        load_uniform_queues(&mut intersection, 10, 3, 0.0);
        assert_eq!(intersection.total_queue(), 4 * 13);
    }
}
