use crate::intersection::direction::Direction;
use crate::intersection::lane::LaneKind;
use crate::log_main;
use crate::utils::clock::monotonic_s;
use crate::verbose::{EVENT_PROVIDER_INIT, EVENT_PROVIDER_SHUTDOWN};
use crate::vision::provider::{
    DetectedVehicle, DetectionResult, Frame, ProviderError, VehicleDetectionProvider, VehicleKind,
};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use std::collections::HashMap;
use std::f64::consts::PI;

/// Realistic cap on a single-lane standing queue.
const MAX_QUEUE: u32 = 25;

/// Synthetic vehicle detection provider for simulation and testing.
///
/// Generates fake detections from a Poisson-like arrival process with a
/// time-varying, rush-hour-shaped rate, so the timing engine can be
/// developed and exercised without a camera or a model.
///
/// Config keys used (on top of the standard provider contract, unknown
/// keys are silently ignored):
///   - `base_arrival_rate`  : float (vehicles/sec per approach, default 0.3)
///   - `peak_multiplier`    : float (rush-hour multiplier, default 2.5)
///   - `left_turn_fraction` : float (fraction of traffic turning left, default 0.15)
///   - `enable_surge`       : bool  (inject random surges, default true)
///   - `random_seed`        : int   (for reproducible runs)
pub struct MockProvider {
    base_rate: f64,
    peak_mult: f64,
    left_frac: f64,
    enable_surge: bool,
    rng: StdRng,
    start_time: f64,
    initialized: bool,

    /// Persistent synthetic queue state per (direction, lane kind).
    queues: IndexMap<(Direction, LaneKind), u32>,
}

impl Default for MockProvider {
    fn default() -> Self {
        MockProvider::new()
    }
}

impl MockProvider {
    pub fn new() -> Self {
        MockProvider {
            base_rate: 0.3,
            peak_mult: 2.5,
            left_frac: 0.15,
            enable_surge: true,
            rng: StdRng::from_os_rng(),
            start_time: 0.0,
            initialized: false,
            queues: IndexMap::new(),
        }
    }

    /// Manually sets a queue count — useful for testing specific scenarios.
    pub fn set_queue(&mut self, direction: Direction, lane_kind: LaneKind, count: u32) {
        self.queues.insert((direction, lane_kind), count.min(MAX_QUEUE));
    }

    /// Generates a plausible bounding-box position for a queued car.
    ///
    /// The positions are laid out as if viewed from above, with cars
    /// spacing back from the stop line.
    fn make_vehicle(&mut self, direction: Direction, lane_kind: LaneKind, index: u32) -> DetectedVehicle {
        let (mut bx, mut by) = match direction {
            // Top of frame, heading south
            Direction::North => (0.45, 0.1),
            // Bottom of frame, heading north
            Direction::South => (0.55, 0.9),
            // Right of frame, heading west
            Direction::East => (0.9, 0.45),
            // Left of frame, heading east
            Direction::West => (0.1, 0.55),
        };

        // Left-turn lane sits adjacent to the through lane
        if lane_kind == LaneKind::LeftTurn {
            match direction {
                Direction::North | Direction::South => bx -= 0.05,
                Direction::East | Direction::West => by -= 0.05,
            }
        }

        // Stack cars back from the stop line
        let spacing = 0.03;
        match direction {
            Direction::North => by -= index as f64 * spacing,
            Direction::South => by += index as f64 * spacing,
            Direction::East => bx += index as f64 * spacing,
            Direction::West => bx -= index as f64 * spacing,
        }

        bx = bx.clamp(0.02, 0.98);
        by = by.clamp(0.02, 0.98);

        // Weighted kind distribution: mostly cars, occasional heavies
        let kind = match self.rng.random_range(0..210u32) {
            0..180 => VehicleKind::Car,
            180..190 => VehicleKind::Truck,
            190..195 => VehicleKind::Bus,
            _ => VehicleKind::Motorcycle,
        };

        DetectedVehicle {
            x: bx,
            y: by,
            width: 0.03 + self.rng.random::<f64>() * 0.01,
            height: 0.05 + self.rng.random::<f64>() * 0.02,
            confidence: 0.90 + self.rng.random::<f64>() * 0.10,
            kind,
        }
    }
}

impl VehicleDetectionProvider for MockProvider {
    fn initialize(&mut self, config: &HashMap<String, Value>) -> Result<(), ProviderError> {
        self.base_rate = config
            .get("base_arrival_rate")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.3);
        self.peak_mult = config
            .get("peak_multiplier")
            .and_then(|v| v.as_f64())
            .unwrap_or(2.5);
        self.left_frac = config
            .get("left_turn_fraction")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.15);
        self.enable_surge = config
            .get("enable_surge")
            .and_then(|v| v.as_bool())
            .unwrap_or(true);
        self.rng = match config.get("random_seed").and_then(|v| v.as_u64()) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.start_time = monotonic_s();

        for direction in Direction::ALL {
            for lane_kind in LaneKind::ALL {
                self.queues.insert((direction, lane_kind), 0);
            }
        }

        self.initialized = true;
        log_main!(
            EVENT_PROVIDER_INIT,
            "Mock provider initialized",
            base_rate = self.base_rate,
            peak_multiplier = self.peak_mult
        );
        Ok(())
    }

    /// Ignores the frame entirely — synthesizes detections from the
    /// arrival model with time-varying rates.
    fn detect(&mut self, _frame: &Frame) -> Result<DetectionResult, ProviderError> {
        if !self.initialized {
            return Err(ProviderError::NotInitialized);
        }

        let t0 = monotonic_s();
        let elapsed = t0 - self.start_time;

        // Time-varying rate: a sinusoidal rush-hour pattern over two
        // minutes of simulation time
        let cycle_position = (elapsed % 120.0) / 120.0;
        let time_mult = 1.0 + (self.peak_mult - 1.0) * (cycle_position * PI).sin().max(0.0);

        // Optional random surge on one approach (2% chance per frame)
        let surge_dir = if self.enable_surge && self.rng.random::<f64>() < 0.02 {
            Some(Direction::ALL[self.rng.random_range(0..Direction::ALL.len())])
        } else {
            None
        };

        let mut vehicles: Vec<DetectedVehicle> = Vec::new();

        for direction in Direction::ALL {
            let mut rate = self.base_rate * time_mult;
            if surge_dir == Some(direction) {
                // A surge triples the arrival rate
                rate *= 3.0;
            }

            let through_arrivals = u32::from(self.rng.random::<f64>() < rate);
            // Discharge is decoupled from the actual signal; the mock
            // has no access to the heads
            let through_departures = u32::from(self.rng.random::<f64>() < 0.4);

            let key_through = (direction, LaneKind::Through);
            let through_queue = self.queues[&key_through]
                .saturating_add(through_arrivals)
                .saturating_sub(through_departures)
                .min(MAX_QUEUE);
            self.queues.insert(key_through, through_queue);

            let left_arrivals = u32::from(self.rng.random::<f64>() < rate * self.left_frac);
            let left_departures = u32::from(self.rng.random::<f64>() < 0.3);

            let key_left = (direction, LaneKind::LeftTurn);
            let left_queue = self.queues[&key_left]
                .saturating_add(left_arrivals)
                .saturating_sub(left_departures)
                .min(MAX_QUEUE);
            self.queues.insert(key_left, left_queue);

            for i in 0..through_queue {
                let vehicle = self.make_vehicle(direction, LaneKind::Through, i);
                vehicles.push(vehicle);
            }
            for i in 0..left_queue {
                let vehicle = self.make_vehicle(direction, LaneKind::LeftTurn, i);
                vehicles.push(vehicle);
            }
        }

        let elapsed_ms = (monotonic_s() - t0) * 1000.0;

        Ok(DetectionResult {
            vehicles,
            frame_timestamp: t0,
            processing_time_ms: elapsed_ms,
            // The mock is always "confident"
            confidence_threshold: 0.95,
            provider_name: "mock".to_string(),
        })
    }

    fn shutdown(&mut self) {
        if self.initialized {
            log_main!(EVENT_PROVIDER_SHUTDOWN, "Mock provider shut down",);
        }
        self.initialized = false;
    }

    fn name(&self) -> &str {
        "mock"
    }

    /// Direct access to synthetic queue counts, bypassing ROI logic.
    fn queue_counts(&self) -> Option<IndexMap<(Direction, LaneKind), u32>> {
        Some(self.queues.clone())
    }
}
