//! Ready-made effect configurations.
//!
//! Speeds were tuned per frame at 60 Hz and are stored here per second.

use fx_core::{Aabb, Axis, Span};
use glam::Vec3;

use crate::emitter::EmitterConfig;
use crate::field::{FieldConfig, Recycle};
use crate::follow::FollowConfig;
use crate::links::LinkConfig;
use crate::motion::MotionRule;
use crate::water::WaveConfig;

/// Frame rate the per-frame speeds were tuned at.
pub const REFERENCE_RATE: f32 = 60.0;

pub const RAIN_COUNT: usize = 1500;
pub const BUBBLE_COUNT: usize = 50;
pub const SPARKLE_COUNT: usize = 30;
pub const LEAF_COUNT: usize = 200;
pub const SNOW_COUNT: usize = 500;
pub const POLLEN_COUNT: usize = 300;
pub const STAR_COUNT: usize = 2000;
pub const EMBER_COUNT: usize = 120;

#[inline]
fn per_second(per_frame: f32) -> f32 {
    per_frame * REFERENCE_RATE
}

fn square(half_width: f32, y: Span) -> Aabb {
    Aabb::from_spans(Span::new(-half_width, half_width), y, Span::new(-half_width, half_width))
}

/// Storm rain: falls 30-48 u/s with a westward wind, respawns in a band near the top.
pub fn rain(capacity: usize) -> FieldConfig {
    FieldConfig::new(
        capacity,
        square(40.0, Span::new(0.0, 40.0)),
        MotionRule::Drift {
            base: Vec3::new(per_second(-0.3), per_second(-0.5), 0.0),
            spread: Vec3::new(per_second(0.2), per_second(-0.3), 0.0),
        },
    )
    .with_respawn(square(40.0, Span::new(30.0, 40.0)))
    .with_recycle(Recycle::below(Axis::Y, -5.0))
}

/// Cave bubbles: rise at 0.6-2.4 u/s, pop at y = 15 and restart at the floor.
///
/// Bubbles are seeded between the floor and the pop height (x, z within ±15)
/// rather than over a 30-unit column, so none is recycled on the first tick.
pub fn bubbles(capacity: usize) -> FieldConfig {
    FieldConfig::new(
        capacity,
        square(15.0, Span::new(-1.0, 15.0)),
        MotionRule::Drift {
            base: Vec3::new(0.0, per_second(0.01), 0.0),
            spread: Vec3::new(0.0, per_second(0.03), 0.0),
        },
    )
    .with_respawn(square(15.0, Span::new(-1.0, -0.5)))
    .with_recycle(Recycle::above(Axis::Y, 15.0))
}

/// Treasure sparkles: small orbits around fixed anchors, never recycled.
pub fn sparkles(capacity: usize) -> FieldConfig {
    FieldConfig::new(
        capacity,
        square(2.5, Span::new(0.0, 3.0)),
        MotionRule::Oscillate {
            amplitude: Vec3::new(0.2, 0.3, 0.2),
            frequency: Vec3::new(2.0, 3.0, 2.0),
            phase_step: Vec3::new(1.0, 0.5, 1.0),
        },
    )
}

/// Autumn leaves: slow fall with a gentle sway.
pub fn leaves(capacity: usize) -> FieldConfig {
    FieldConfig::new(
        capacity,
        square(10.0, Span::new(0.0, 15.0)),
        MotionRule::Sway {
            fall: per_second(0.03),
            amplitude: per_second(0.01),
            frequency: 1.0,
            phase_step: 0.3,
        },
    )
    .with_respawn(square(10.0, Span::new(14.5, 15.0)))
    .with_recycle(Recycle::below(Axis::Y, -2.0))
}

/// Winter snow: twice the leaf fall speed, wider and slower sway.
pub fn snow(capacity: usize) -> FieldConfig {
    FieldConfig::new(
        capacity,
        square(15.0, Span::new(0.0, 20.0)),
        MotionRule::Sway {
            fall: per_second(0.06),
            amplitude: per_second(0.02),
            frequency: 0.5,
            phase_step: 0.15,
        },
    )
    .with_respawn(square(15.0, Span::new(19.5, 20.0)))
    .with_recycle(Recycle::below(Axis::Y, -2.0))
}

/// Spring pollen velocity field: vertical bob keyed on x, sideways drift keyed on y.
pub fn pollen_drift(position: Vec3, t: f32) -> Vec3 {
    Vec3::new(
        (t + position.y * 0.1).cos() * per_second(0.008),
        (t + position.x * 0.1).sin() * per_second(0.015),
        0.0,
    )
}

/// Spring pollen: drifts on [`pollen_drift`] and wraps vertically, top back to
/// the ground and ground back to the top.
pub fn pollen(capacity: usize) -> FieldConfig {
    FieldConfig::new(capacity, square(12.5, Span::new(0.0, 12.0)), MotionRule::Field(pollen_drift))
        .with_respawn(square(12.5, Span::new(0.0, 15.0)))
        .with_recycle(Recycle::between(Axis::Y, 0.0, 15.0).wrapping())
}

/// Background star field slowly turning about the vertical axis.
pub fn star_swirl(capacity: usize) -> FieldConfig {
    FieldConfig::new(
        capacity,
        Aabb::centered(Vec3::ZERO, Vec3::splat(2000.0)),
        MotionRule::Swirl {
            angular_speed: per_second(0.0002),
            bob_amplitude: per_second(0.5),
            bob_frequency: 0.001,
        },
    )
}

/// Embers lifted by a noisy updraft.
pub fn embers(capacity: usize, seed: u32) -> FieldConfig {
    FieldConfig::new(
        capacity,
        square(6.0, Span::new(0.0, 12.0)),
        MotionRule::Turbulence {
            base: Vec3::new(0.3, 1.2, 0.0),
            strength: 1.5,
            scale: 0.15,
            seed,
        },
    )
    .with_respawn(square(6.0, Span::new(0.0, 0.5)))
    .with_recycle(Recycle::above(Axis::Y, 12.0))
}

/// Storm lightning: 2% chance per tick, 0.10-0.25 s flashes at intensity 2-4.
pub fn lightning() -> EmitterConfig {
    EmitterConfig {
        probability: 0.02,
        intensity: Span::new(2.0, 4.0),
        duration: Span::new(0.1, 0.25),
    }
}

/// Storm sea surface.
pub fn storm_sea() -> WaveConfig {
    WaveConfig {
        width: 200.0,
        depth: 200.0,
        segments: 64,
        amplitude: 0.5,
        ..WaveConfig::default()
    }
}

/// Camera trailing a hero object from above and behind.
pub fn hero_camera() -> FollowConfig {
    FollowConfig {
        offset: Vec3::new(2.0, 4.0, 10.0),
        smoothing: 0.05,
    }
}

/// Link lines for the star field theme.
pub fn star_links() -> LinkConfig {
    LinkConfig {
        max_points: 300,
        distance: 100.0,
        max_per_point: 3,
    }
}
