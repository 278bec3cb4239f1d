use crate::intersection::direction::Direction;
use crate::intersection::lane::LaneKind;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Custom error types for detection providers.
#[derive(Debug, Clone)]
pub enum ProviderError {
    /// The provider was used before `initialize` succeeded.
    NotInitialized,
    /// Initialization failed; the controller must not start.
    InitializationFailed(String),
    /// A single detection pass failed; the tick reuses last-known queues.
    DetectionFailed(String),
}

impl fmt::Display for ProviderError {
    /// Formats the error message for `ProviderError`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::NotInitialized => {
                write!(f, "Provider was not initialized")
            }
            ProviderError::InitializationFailed(value) => {
                write!(f, "Provider initialization failed: {}", value)
            }
            ProviderError::DetectionFailed(value) => {
                write!(f, "Detection failed: {}", value)
            }
        }
    }
}

impl std::error::Error for ProviderError {}

lazy_static! {
    static ref VEHICLE_KIND_CONVERTER: HashMap<&'static str, VehicleKind> = {
        let mut m = HashMap::new();
        m.insert("car", VehicleKind::Car);
        m.insert("truck", VehicleKind::Truck);
        m.insert("bus", VehicleKind::Bus);
        m.insert("motorcycle", VehicleKind::Motorcycle);
        m.insert("unknown", VehicleKind::Unknown);
        m
    };
}

/// Classified kind of a detected vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleKind {
    Car,
    Truck,
    Bus,
    Motorcycle,
    Unknown,
}

impl VehicleKind {
    /// Converts a string representation to a `VehicleKind`. Unknown
    /// labels map to `VehicleKind::Unknown` rather than erroring, since
    /// detection backends are free to emit classes of their own.
    pub fn from_str(kind_str: &str) -> Self {
        VEHICLE_KIND_CONVERTER
            .get(kind_str)
            .copied()
            .unwrap_or(VehicleKind::Unknown)
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind_str = match self {
            VehicleKind::Car => "car",
            VehicleKind::Truck => "truck",
            VehicleKind::Bus => "bus",
            VehicleKind::Motorcycle => "motorcycle",
            VehicleKind::Unknown => "unknown",
        };
        write!(f, "{}", kind_str)
    }
}

/// A single BGR frame, `height × width × 3` bytes.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl Frame {
    /// Creates an all-zero frame. Handy for providers that synthesize
    /// their detections and ignore pixels entirely.
    pub fn blank(width: usize, height: usize) -> Self {
        Frame {
            width,
            height,
            data: vec![0; width * height * 3],
        }
    }
}

/// A single detected vehicle.
///
/// All coordinates are normalized to [0, 1] relative to the frame so
/// that providers with different input resolutions produce comparable
/// output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedVehicle {
    /// Bounding-box center X (0-1).
    pub x: f64,
    /// Bounding-box center Y (0-1).
    pub y: f64,
    /// Bounding-box width (0-1).
    pub width: f64,
    /// Bounding-box height (0-1).
    pub height: f64,
    /// Detection confidence (0-1).
    pub confidence: f64,
    pub kind: VehicleKind,
}

/// One detection pass over a single frame.
///
/// Every provider returns exactly this shape regardless of the
/// underlying model or technique.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    pub vehicles: Vec<DetectedVehicle>,
    /// Monotonic timestamp when the frame was captured.
    pub frame_timestamp: f64,
    /// Wall-clock inference duration.
    pub processing_time_ms: f64,
    /// Threshold that was applied.
    pub confidence_threshold: f64,
    /// E.g. "mock" or "yolo-nano".
    pub provider_name: String,
}

impl DetectionResult {
    pub fn count(&self) -> usize {
        self.vehicles.len()
    }
}

/// Interface that any vehicle-detection backend must implement.
///
/// Lifecycle:
///   1. Construct the provider
///   2. Call `initialize(config)` once at startup
///   3. Call `detect(frame)` repeatedly from the controller loop
///   4. Call `shutdown()` on teardown (idempotent)
///
/// Config map contract (providers SHOULD support these keys and MUST
/// silently ignore keys they don't understand):
///   - `confidence_threshold` : float (default 0.5)
///   - `device`               : str   ("cpu", "cuda", "mps")
///   - `input_resolution`     : int   (e.g. 640)
///   - `model_path`           : str   (path to weights file)
pub trait VehicleDetectionProvider {
    /// Loads model weights, allocates resources, warms up.
    ///
    /// Called exactly once before the first `detect` call.
    fn initialize(&mut self, config: &HashMap<String, Value>) -> Result<(), ProviderError>;

    /// Runs detection on a single frame.
    ///
    /// Returns ALL vehicles found in the frame. Spatial filtering (e.g.
    /// by lane ROI) is the caller's responsibility.
    fn detect(&mut self, frame: &Frame) -> Result<DetectionResult, ProviderError>;

    /// Releases resources. Safe to call more than once.
    fn shutdown(&mut self);

    /// Stable identifier for this provider instance.
    fn name(&self) -> &str;

    /// Direct per-lane queue counts, when the backend tracks them.
    ///
    /// Providers that synthesize traffic (or count on-camera with their
    /// own lane logic) may expose ready-made queues here; the
    /// controller then skips ROI counting. The default is `None`.
    fn queue_counts(&self) -> Option<IndexMap<(Direction, LaneKind), u32>> {
        None
    }
}
