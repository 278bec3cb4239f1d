//! # adaptive_signal_core
//!
//! Safety-critical real-time core of an adaptive four-way signalized
//! intersection controller.
//!
//! The crate runs a NEMA-style phase ring through its sub-states
//! (green, yellow, all-red) under hard timing constraints, recomputes
//! green splits once per cycle from measured queue lengths with a
//! SCATS/Webster-style algorithm, enforces timing and conflict
//! invariants that hold regardless of what the adaptive layer requests,
//! and handles emergency-vehicle preemption through the same
//! safe-clearance discipline as normal cycling.
//!
//! ## Modules
//!
//! - [`intersection`] – Approaches, lanes and live queue state
//! - [`signals`] – Phase ring, signal heads and the state machine
//! - [`timing`] – Constraints, enforcer and the adaptive engine
//! - [`safety`] – Conflict monitor and preemption manager
//! - [`vision`] – Detection provider interface and queue counting
//! - [`controller`] – Fixed-rate tick loop tying it all together
//! - [`verbose`] – Structured logging
//! - [`utils`] – Clock and test scenario helpers
//!
//! ## Quick start
//!
//! ```rust
//! use adaptive_signal_core::controller::{IntersectionConfig, TrafficController};
//!
//! let mut controller = TrafficController::new(IntersectionConfig::default())
//!     .expect("controller setup");
//! for i in 1..=50 {
//!     controller.tick(i as f64 * 0.1);
//! }
//! controller.teardown();
//! ```
//!
//! ## Safety model
//!
//! Three independent layers keep the intersection safe:
//! 1. The state machine never emits a transition that bypasses
//!    clearance (yellow then all-red).
//! 2. The timing enforcer clamps every requested plan into hard bounds
//!    before it reaches the phase ring.
//! 3. The conflict monitor watches the displayed heads every tick and
//!    latches an all-way red fault on any conflicting green.
pub mod verbose;
pub mod utils;
pub mod intersection;
pub mod signals;
pub mod timing;
pub mod safety;
pub mod vision;
pub mod controller;
