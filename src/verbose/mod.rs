//! # Logging Module
//!
//! Structured logging system for controller debugging and monitoring.
//!
//! This module provides hierarchical logging levels and structured event tracking
//! using the `tracing` crate with JSON output format.
//!
//! **Most of time end-developer should not use this module directly, except
//! for setting the global logging level and using logging macros.**
//!
//! ## Components
//!
//! - [`VerboseLevel`] - Hierarchical debug levels (None → Main → Additional → Detailed → All)
//! - [`verbose_log`] - Global logging functions
//! - Event constants - Predefined event types for controller subsystems
//! - Macros - `log_main!`, `log_additional!`, `log_detailed!`, `log_all!`
//!
//! ## Quick Start
//!
//! ```rust
//! use adaptive_signal_core::verbose::{set_verbose_level, VerboseLevel, EVENT_TICK};
//! use adaptive_signal_core::log_main;
//!
//! // Set global logging level
//! set_verbose_level(VerboseLevel::Main);
//!
//! // Log controller events
//! log_main!(EVENT_TICK, "Executing controller tick", tick = 42);
//! ```
//!
//! ## Logging Levels
//!
//! - `None` - No logging
//! - `Main` - Major controller events only (phase changes, faults, cycle plans)
//! - `Additional` - Nested function details (clamp events, demand metrics)
//! - `Detailed` - Per-tick operations
//! - `All` - Everything (trace level)
pub mod verbose;

pub use self::{verbose::*};

// Initialize logger when module is loaded
use std::sync::Once;

static INIT: Once = Once::new();

pub fn ensure_logger_init() {
    INIT.call_once(|| {
        init_logger();
    });
}
