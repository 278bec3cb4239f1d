use std::fmt;

/// Hard timing limits that the adaptive algorithm must never violate.
///
/// All values are in seconds unless noted otherwise. Defaults follow
/// typical ITE / MUTCD practice for a standard US four-way intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConstraints {
    /// Minimum green for a vehicle through phase.
    pub min_green_s: f64,
    /// Maximum green for any single phase.
    pub max_green_s: f64,
    /// Yellow interval (3-5s typical).
    pub yellow_clearance_s: f64,
    /// All-red interval between every phase change.
    pub all_red_clearance_s: f64,
    /// Time for the first queued car to react at green.
    pub startup_lost_time_s: f64,

    /// Minimum protected left-turn arrow.
    pub min_protected_left_green_s: f64,
    /// Maximum protected left-turn arrow.
    pub max_protected_left_green_s: f64,
    /// Queued cars needed to trigger a protected left.
    pub left_turn_queue_threshold: u32,

    /// WALK signal minimum.
    pub min_walk_s: f64,
    /// Walking speed used for the pedestrian clearance calculation (ft/s).
    pub ped_clearance_speed_ft_per_s: f64,
    /// Typical 4-lane crossing distance (ft).
    pub default_crosswalk_distance_ft: f64,

    /// Shortest cycle under low traffic.
    pub min_cycle_s: f64,
    /// Longest cycle under heavy traffic.
    pub max_cycle_s: f64,
    pub default_cycle_s: f64,
}

impl Default for TimingConstraints {
    fn default() -> Self {
        TimingConstraints {
            min_green_s: 7.0,
            max_green_s: 60.0,
            yellow_clearance_s: 4.0,
            all_red_clearance_s: 2.5,
            startup_lost_time_s: 2.0,
            min_protected_left_green_s: 8.0,
            max_protected_left_green_s: 25.0,
            left_turn_queue_threshold: 3,
            min_walk_s: 7.0,
            ped_clearance_speed_ft_per_s: 3.5,
            default_crosswalk_distance_ft: 48.0,
            min_cycle_s: 45.0,
            max_cycle_s: 150.0,
            default_cycle_s: 90.0,
        }
    }
}

impl TimingConstraints {
    /// Flashing DON'T WALK duration derived from crosswalk distance.
    ///
    /// # Returns
    /// Crosswalk distance divided by walking speed, in seconds.
    pub fn ped_clearance_s(&self) -> f64 {
        self.default_crosswalk_distance_ft / self.ped_clearance_speed_ft_per_s
    }
}

impl fmt::Display for TimingConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "green [{:.1}; {:.1}]s, yellow {:.1}s, all-red {:.1}s, cycle [{:.0}; {:.0}]s",
            self.min_green_s,
            self.max_green_s,
            self.yellow_clearance_s,
            self.all_red_clearance_s,
            self.min_cycle_s,
            self.max_cycle_s
        )
    }
}

/// Saturation flow defaults in vehicles per hour per lane.
///
/// Saturation flow is the maximum number of vehicles that can discharge
/// per hour of green through a single lane when there is a standing queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowDefaults {
    pub through_lane: f64,
    /// Lower than through due to the turning movement.
    pub left_turn_lane: f64,
}

impl Default for FlowDefaults {
    fn default() -> Self {
        FlowDefaults {
            through_lane: 1_800.0,
            left_turn_lane: 1_600.0,
        }
    }
}
