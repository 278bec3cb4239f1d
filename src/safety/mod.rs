//! # Safety Module
//!
//! **Independent safety subsystems** – Conflict monitoring and emergency
//! vehicle preemption.
//!
//! Both subsystems run once per controller tick, after the state
//! machine advances, and in that order:
//! ```text
//! Controller tick pipeline:
//! 1. Vision ingestion
//! 2. Signal state machine      ← signals module
//! 3. Conflict monitor          ← THIS MODULE
//! 4. Preemption manager        ← THIS MODULE
//! 5. Observer notifications
//! ```
//!
//! ## Components
//!
//! - [`conflict::ConflictMonitor`] – Per-tick watchdog over the signal heads with a fault latch
//! - [`conflict::CONFLICTING_PAIRS`] – Direction pairs that must never both hold green
//! - [`preemption::PreemptionManager`] – FIFO preemption queue with auto-clear timeout
//! - [`preemption::PreemptionEvent`] – Lifecycle record of one preemption request
//!
//! ## Fault behavior
//!
//! A detected conflict latches `fault_active`, drives the state machine
//! to all-way red and increments the conflict counter. The latch only
//! releases after a configurable number of consecutive clean checks,
//! at which point the machine resumes through an all-red interval.
//! Faults never propagate as errors up the tick loop; they are surfaced
//! through the status snapshot.
pub mod conflict;
pub mod preemption;

pub use self::conflict::{ConflictMonitor, CONFLICTING_PAIRS};
pub use self::preemption::{PreemptionEvent, PreemptionManager, PreemptionStatus, DEFAULT_MIN_HOLD_S};
