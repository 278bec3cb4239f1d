//! # Utils Module
//!
//! Utility helpers for the controller core and its tests.
//!
//! ## Key Components
//!
//! ### Clock
//! - [`clock::monotonic_s`] - Process-local monotonic timestamp in seconds
//!
//! ### Testing Support
//! - [`scenarios::create_standard_intersection`] - Empty 4-way intersection
//! - [`scenarios::seeded_mock_config`] - Reproducible mock provider configuration
//! - [`scenarios::load_uniform_queues`] - Bulk queue setup for demand scenarios
pub mod clock;
pub mod scenarios;
