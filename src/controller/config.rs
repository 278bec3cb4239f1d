use crate::timing::constraints::{FlowDefaults, TimingConstraints};
use crate::vision::counting::LaneRoi;
use lazy_static::lazy_static;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Custom error types for controller configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Indicates that the provider kind string is not recognized.
    UnknownProviderKind(String),
    /// Indicates that the device string is not recognized.
    UnknownDevice(String),
}

impl fmt::Display for ConfigError {
    /// Formats the error message for `ConfigError`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownProviderKind(value) => {
                write!(f, "Unknown provider kind: '{}'", value)
            }
            ConfigError::UnknownDevice(value) => {
                write!(f, "Unknown device: '{}'", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

lazy_static! {
    static ref PROVIDER_KIND_CONVERTER: HashMap<&'static str, ProviderKind> = {
        let mut m = HashMap::new();
        m.insert("mock", ProviderKind::Mock);
        m.insert("external", ProviderKind::External);
        m
    };
    static ref DEVICE_CONVERTER: HashMap<&'static str, Device> = {
        let mut m = HashMap::new();
        m.insert("cpu", Device::Cpu);
        m.insert("cuda", Device::Cuda);
        m.insert("mps", Device::Mps);
        m
    };
}

/// Which detection backend the controller should construct.
///
/// `External` means the caller supplies a provider instance of its own
/// through [`TrafficController::with_provider`](crate::controller::TrafficController::with_provider).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Mock,
    External,
}

impl ProviderKind {
    /// Converts a string representation to a `ProviderKind`.
    ///
    /// Unknown kinds are a configuration error: the controller fails
    /// fast at setup rather than guessing a backend.
    pub fn from_str(kind_str: &str) -> Result<Self, ConfigError> {
        PROVIDER_KIND_CONVERTER
            .get(kind_str)
            .copied()
            .ok_or(ConfigError::UnknownProviderKind(kind_str.to_string()))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind_str = match self {
            ProviderKind::Mock => "mock",
            ProviderKind::External => "external",
        };
        write!(f, "{}", kind_str)
    }
}

/// Inference device passed through to the detection backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    Cpu,
    Cuda,
    Mps,
}

impl Device {
    pub fn from_str(device_str: &str) -> Result<Self, ConfigError> {
        DEVICE_CONVERTER
            .get(device_str)
            .copied()
            .ok_or(ConfigError::UnknownDevice(device_str.to_string()))
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let device_str = match self {
            Device::Cpu => "cpu",
            Device::Cuda => "cuda",
            Device::Mps => "mps",
        };
        write!(f, "{}", device_str)
    }
}

/// Configuration passed to the detection provider.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub provider_kind: ProviderKind,
    pub confidence_threshold: f64,
    pub device: Device,
    pub input_resolution: u32,
    /// Frames to process per second; detection does not run every tick.
    pub target_fps: f64,
    /// Only meaningful to model-backed providers.
    pub model_path: String,
    /// Provider-specific keys merged into the config map as-is
    /// (providers silently ignore what they don't understand).
    pub extra: HashMap<String, Value>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        VisionConfig {
            provider_kind: ProviderKind::Mock,
            confidence_threshold: 0.5,
            device: Device::Cpu,
            input_resolution: 640,
            target_fps: 3.0,
            model_path: "yolov8n.pt".to_string(),
            extra: HashMap::new(),
        }
    }
}

impl VisionConfig {
    /// Builds the type-erased configuration map handed to
    /// `VehicleDetectionProvider::initialize`.
    pub fn to_map(&self) -> HashMap<String, Value> {
        let mut map = HashMap::new();
        map.insert(
            "confidence_threshold".to_string(),
            Value::from(self.confidence_threshold),
        );
        map.insert("device".to_string(), Value::from(self.device.to_string()));
        map.insert(
            "input_resolution".to_string(),
            Value::from(self.input_resolution),
        );
        map.insert("model_path".to_string(), Value::from(self.model_path.clone()));
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }
        map
    }
}

/// Top-level configuration for a single 4-way intersection.
#[derive(Debug, Clone)]
pub struct IntersectionConfig {
    pub name: String,
    pub timing: TimingConstraints,
    pub flow: FlowDefaults,
    pub vision: VisionConfig,
    pub lane_rois: Vec<LaneRoi>,

    /// Approach speed for clearance calculations.
    pub approach_speed_mph: f64,

    /// Controller tick rate.
    pub controller_hz: f64,
}

impl Default for IntersectionConfig {
    fn default() -> Self {
        IntersectionConfig {
            name: "Main & 1st".to_string(),
            timing: TimingConstraints::default(),
            flow: FlowDefaults::default(),
            vision: VisionConfig::default(),
            lane_rois: Vec::new(),
            approach_speed_mph: 35.0,
            controller_hz: 10.0,
        }
    }
}

impl IntersectionConfig {
    pub fn tick_interval_s(&self) -> f64 {
        1.0 / self.controller_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_provider_kind_parse() {
        assert_eq!(ProviderKind::from_str("mock").unwrap(), ProviderKind::Mock);
        assert_eq!(
            ProviderKind::from_str("external").unwrap(),
            ProviderKind::External
        );
        let result = ProviderKind::from_str("lidar");
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Unknown provider kind: 'lidar'"
        );
    }
    #[test]
    fn test_vision_config_map_contains_contract_keys() {
        let mut vision = VisionConfig::default();
        vision.extra.insert("random_seed".to_string(), Value::from(42));
        let map = vision.to_map();

        assert_eq!(map["confidence_threshold"], Value::from(0.5));
        assert_eq!(map["device"], Value::from("cpu"));
        assert_eq!(map["input_resolution"], Value::from(640u32));
        assert_eq!(map["random_seed"], Value::from(42));
    }
    #[test]
    fn test_tick_interval() {
        let config = IntersectionConfig::default();
        assert!((config.tick_interval_s() - 0.1).abs() < 1e-9);
    }
}
