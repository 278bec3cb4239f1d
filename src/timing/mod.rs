//! # Timing Module
//!
//! Safety constraints, the constraint enforcer and the adaptive timing
//! engine.
//!
//! ## Control flow at a cycle boundary
//!
//! ```text
//! cycle complete
//!   └── AdaptiveTimingEngine::compute_cycle_plan   ← queue lengths
//!         ├── per-phase demand (queue, ideal green, smoothed DS)
//!         ├── cycle length (Webster)
//!         └── proportional green allocation
//!   └── AdaptiveTimingEngine::apply_plan
//!         └── TimingEnforcer::enforce_cycle        ← clamps to safe limits
//! ```
//!
//! The enforcer is the only path by which green splits reach the phase
//! ring. It is total: any requested plan produces a safe one. Yellow
//! and all-red clearance are never adaptive, pedestrian walk +
//! clearance always fits inside a through green and per-phase bounds
//! dominate cycle bounds when the two disagree.
//!
//! ## Components
//!
//! - [`constraints::TimingConstraints`] - Immutable limits (ITE / MUTCD style defaults)
//! - [`constraints::FlowDefaults`] - Saturation flow constants
//! - [`enforcer::TimingEnforcer`] - Pure, idempotent clamp
//! - [`adaptive::AdaptiveTimingEngine`] - Once-per-cycle planner
//! - [`adaptive::CyclePlan`] / [`adaptive::PhaseDemand`] - Plan data
pub mod constraints;
pub mod enforcer;
pub mod adaptive;

pub use self::constraints::{FlowDefaults, TimingConstraints};
pub use self::enforcer::TimingEnforcer;
pub use self::adaptive::{AdaptiveTimingEngine, CyclePlan, PhaseDemand};
