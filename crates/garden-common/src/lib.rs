//! # Garden Common
//!
//! Common types and utilities shared by the Fractal Garden crates.
//!
//! This crate provides:
//! - Screen-space geometry helpers over `glam::Vec2`
//! - ID types (BranchId, PlantId)
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;

pub use glam::Vec2;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use glam::Vec2;
}

pub use prelude::*;
