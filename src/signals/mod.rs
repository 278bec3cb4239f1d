//! # Signals Module
//!
//! Phase ring and signal state machine for a NEMA-style sequential
//! controller at a single 4-way intersection.
//!
//! The state machine enforces safe transitions:
//! ```text
//! GREEN → YELLOW → ALL_RED → (next phase)
//! ```
//! No phase transition ever skips yellow or all-red clearance, and the
//! same discipline applies entering and leaving an emergency preemption
//! hold.
//!
//! ## Architecture
//!
//! ```text
//! SignalMachine - one per intersection
//! ├── PhaseRing                       - cyclic phase sequence
//! │   ├── Phase 1: N/S left turn
//! │   ├── Phase 2: N/S through
//! │   ├── Phase 3: E/W left turn
//! │   └── Phase 4: E/W through
//! ├── PhaseStep                       - sub-state within a phase
//! │   └── green / flashing_yellow / yellow / all_red
//! └── SignalHead (per direction)      - displayed output
//!     ├── vehicle:    red / green / yellow
//!     ├── left_turn:  red / green_arrow / yellow_arrow / flashing_yellow
//!     └── pedestrian: dont_walk / walk / ped_clearance
//! ```
//!
//! ## Components
//!
//! ### Core Structures
//! - [`machine::SignalMachine`] - Per-tick state machine and display computation
//! - [`ring::PhaseRing`] - Ordered cyclic phases with ring invariants
//! - [`phase::Phase`] - Per-phase movements and durations
//! - [`heads::SignalHead`] - Three-channel display state for one direction
//!
//! ### Builder Pattern
//! - [`phase::PhaseBuilder`] - API builder for phases
//!
//! ### Error Handling
//! - [`ring::PhaseRingError`] - Ring construction/validation errors
//!
//! ## Timing and phase management
//!
//! The machine is advanced by [`machine::SignalMachine::tick`] with an
//! explicitly injected monotonic timestamp, so any sequence of ticks is
//! reproducible in tests. Transitions fire when the elapsed time in the
//! current step reaches the step duration taken from the active
//! [`phase::Phase`]. During a preemption hold the green duration is
//! infinite and only [`machine::SignalMachine::clear_preemption`]
//! releases it.
//!
//! ## Integration
//!
//! - Green splits are rewritten between cycles by the adaptive engine
//!   (see [`timing`](crate::timing)) through the enforcer.
//! - The independent conflict monitor (see [`safety`](crate::safety))
//!   reads the signal heads after every tick; the machine additionally
//!   runs the same check itself.
pub mod heads;
pub mod phase;
pub mod ring;
pub mod machine;

pub use self::heads::{LeftTurnSignal, PedestrianSignal, SignalHead, VehicleSignal};
pub use self::phase::{Phase, PhaseBuilder, PhaseId, PhaseKind, PhaseStep};
pub use self::ring::{PhaseRing, PhaseRingError};
pub use self::machine::{MachineEvent, SignalMachine};
