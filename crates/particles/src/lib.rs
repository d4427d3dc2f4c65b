//! Host-driven visual effects: recycling particle fields, lightning-style
//! pulses, animated water, camera follow and scroll-story helpers.
//!
//! Nothing here renders. Each effect owns its buffers, advances once per host
//! frame and exposes flat `f32` views for the host to upload.

pub mod emitter;
pub mod error;
pub mod field;
pub mod follow;
pub mod links;
pub mod motion;
pub mod presets;
pub mod story;
pub mod water;

pub use emitter::*;
pub use error::*;
pub use field::*;
pub use follow::*;
pub use links::*;
pub use motion::*;
pub use story::*;
pub use water::*;
