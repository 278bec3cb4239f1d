//! # Controller Module
//!
//! **Top-level orchestration module** – Coordinates all major components
//! of the adaptive intersection controller.
//!
//! This module owns the intersection model, signal state machine,
//! adaptive timing engine, safety subsystems and the detection
//! provider, and drives them all from a single fixed-rate tick loop.
//!
//! ## Purpose
//!
//! - Manages the controller lifecycle (setup, run, teardown)
//! - Interleaves vision ingestion, state advancement and safety checks
//! - Recomputes green splits once per completed cycle
//! - Produces the structured status snapshot for observers and UIs
//!
//! ## Tick pipeline
//!
//! The controller executes the following pipeline in
//! [`TrafficController::tick`](controller::TrafficController::tick):
//! ```text
//! 1. Vision ingestion (at target FPS)  ← vision module
//! 2. Signal state machine advance      ← signals module
//! 3. Cycle-boundary timing recompute   ← timing module
//! 4. Conflict monitor                  ← safety module
//! 5. Preemption lifecycle              ← safety module
//! 6. Observer notifications
//! ```
//!
//! ## Concurrency
//!
//! The core is single-threaded and cooperative: all mutation happens on
//! the tick thread and observers run synchronously on it. Only the loop
//! driver sleeps, between ticks, using drift-free deadlines. The shared
//! stop flag ([`controller::TrafficController::stop_flag`]) may be
//! flipped from a signal handler; the loop exits after completing the
//! current tick, never mid-tick.
//!
//! ## Components
//!
//! - [`controller::TrafficController`] – Main loop and object graph owner
//! - [`config::IntersectionConfig`] / [`config::VisionConfig`] – Setup configuration
//! - [`status::ControllerStatus`] – Per-tick structured snapshot
//! - [`controller::ControllerError`] – Unified setup/runtime error type
//!
//! ## Usage
//!
//! ```rust
//! use adaptive_signal_core::controller::config::IntersectionConfig;
//! use adaptive_signal_core::controller::controller::TrafficController;
//!
//! let config = IntersectionConfig::default();
//! let mut controller = TrafficController::new(config).expect("setup failed");
//! // Step manually with injected time, or call run(Some(max_ticks))
//! controller.tick(0.1);
//! let status = controller.full_status(0.1);
//! println!("{}", status.to_json());
//! controller.teardown();
//! ```
pub mod config;
pub mod controller;
pub mod status;

pub use self::config::{ConfigError, Device, IntersectionConfig, ProviderKind, VisionConfig};
pub use self::controller::{ControllerError, TickObserver, TrafficController};
pub use self::status::{ConflictMonitorStatus, ControllerStatus, SignalsStatus};
