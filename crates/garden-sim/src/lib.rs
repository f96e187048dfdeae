//! # Garden Sim
//!
//! Simulation core for Fractal Garden.
//!
//! This crate provides the tick-driven plant model and its surroundings:
//! - Environmental stress model (per-factor stress, health, growth modifier)
//! - Recursive stem/branch tree with spacing-limited branching
//! - Per-branch flowering state machine
//! - Plant lifecycle (growing, withering, dead)
//! - Species definitions and registry
//! - Day cycle, weather and the per-tick environment
//! - Garden placement and pruning
//!
//! All randomness comes from an explicitly seeded [`SimRng`], so identical
//! seeds and inputs replay identical gardens.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod definition;
pub mod environment;
pub mod flowering;
pub mod garden;
pub mod plant;
pub mod rng;
pub mod stem;
pub mod time;
pub mod weather;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::definition::*;
    pub use crate::environment::*;
    pub use crate::flowering::*;
    pub use crate::garden::*;
    pub use crate::plant::*;
    pub use crate::rng::*;
    pub use crate::stem::*;
    pub use crate::time::*;
    pub use crate::weather::*;
}

pub use prelude::*;
