//! Core types shared by the effect crates.
//!
//! This crate provides the small foundation every effect is built on:
//! - Axis-aligned spawn regions and scalar ranges
//! - Host-driven frame timing

pub mod bounds;
pub mod time;

pub use bounds::*;
pub use time::*;

// Re-export commonly used types
pub use glam::{Vec2, Vec3};
