//! # Intersection Module
//!
//! Data model for a 4-way intersection: approaches, lanes and live queue state.
//!
//! ## Architecture
//!
//! ```text
//! Intersection - one per controller
//! ├── Approach (N)
//! │   ├── through lane    (saturation flow 1800 veh/hr, queue count)
//! │   ├── left-turn lane  (saturation flow 1600 veh/hr, queue count)
//! │   └── crosswalk distance (ft)
//! ├── Approach (S)
//! ├── Approach (E)
//! └── Approach (W)
//! ```
//!
//! Queue counts are the only mutable state; they are written by the
//! detection adapter on the controller tick thread and read by the
//! adaptive timing engine at cycle boundaries.
//!
//! ## Components
//!
//! - [`direction::Direction`] - Cardinal directions and the conflict relation between them
//! - [`lane::Lane`] / [`lane::LaneKind`] - Per-lane saturation flow and queue state
//! - [`approach::Approach`] - Through + left-turn lane pair with crosswalk geometry
//! - [`intersection::Intersection`] - The four approaches, keyed by direction
//!
//! ## Derived quantities
//!
//! - [`lane::Lane::green_time_to_clear`] - Seconds of green needed to discharge the queue
//! - [`lane::Lane::degree_of_saturation`] - Demand over capacity for a given green
pub mod direction;
pub mod lane;
pub mod approach;
pub mod intersection;

pub use self::direction::{Axis, Direction, DirectionError};
pub use self::lane::{Lane, LaneKind, LaneKindError};
pub use self::approach::Approach;
pub use self::intersection::Intersection;
