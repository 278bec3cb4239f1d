//! # Vision Module
//!
//! Detection provider interface and the queue-count bridge.
//!
//! Any CV backend (neural detector, background subtraction, mock)
//! implements [`provider::VehicleDetectionProvider`] so the controller
//! stays decoupled from the detection technique. The provider returns
//! normalized detections; the counting helpers map them onto lanes.
//!
//! ## Components
//!
//! - [`provider::VehicleDetectionProvider`] - Backend trait (initialize / detect / shutdown)
//! - [`provider::DetectionResult`] / [`provider::DetectedVehicle`] - Provider-agnostic data shapes
//! - [`provider::Frame`] - H×W×3 byte frame buffer
//! - [`mock::MockProvider`] - Synthetic arrival-process provider for simulation and tests
//! - [`counting`] - ROI polygon counting with a quadrant fallback
//!
//! ## ROI-to-lane mapping
//!
//! Two paths, chosen by configuration:
//! - Lane ROIs as normalized polygons, ray-casting point-in-polygon on
//!   each detection's center, first match wins
//!   ([`counting::count_vehicles_by_lane`]).
//! - Quadrant fallback when no ROIs are provided
//!   ([`counting::count_vehicles_simple`]); the controller then splits
//!   each approach 85% through / 15% left-turn.
pub mod provider;
pub mod mock;
pub mod counting;

pub use self::provider::{
    DetectedVehicle, DetectionResult, Frame, ProviderError, VehicleDetectionProvider, VehicleKind,
};
pub use self::mock::MockProvider;
pub use self::counting::{count_vehicles_by_lane, count_vehicles_simple, point_in_polygon, LaneCount, LaneRoi};
