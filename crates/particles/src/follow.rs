//! Smoothed follow for cameras and look targets.

use glam::Vec3;

use crate::error::{check_param, Result};
use crate::presets::REFERENCE_RATE;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowConfig {
    /// Offset from the target to the desired follower position.
    pub offset: Vec3,
    /// Fraction of the remaining distance closed per reference frame, in `(0, 1]`.
    pub smoothing: f32,
}

/// Eases a position toward `target + offset` every frame.
#[derive(Debug, Clone)]
pub struct SmoothFollow {
    position: Vec3,
    config: FollowConfig,
}

impl SmoothFollow {
    pub fn new(position: Vec3, config: FollowConfig) -> Result<Self> {
        check_param(
            "follow smoothing",
            config.smoothing,
            config.smoothing > 0.0 && config.smoothing <= 1.0,
        )?;
        check_param("follow offset", config.offset.length(), config.offset.is_finite())?;
        Ok(Self { position, config })
    }

    /// One fixed-rate step: close `smoothing` of the gap.
    pub fn update(&mut self, target: Vec3) -> Vec3 {
        let goal = target + self.config.offset;
        self.position += (goal - self.position) * self.config.smoothing;
        self.position
    }

    /// Frame-rate independent step: `dt` seconds behave like `dt * 60` fixed steps.
    pub fn update_dt(&mut self, target: Vec3, dt: f32) -> Vec3 {
        if dt <= 0.0 || !dt.is_finite() {
            return self.position;
        }
        let factor = 1.0 - (1.0 - self.config.smoothing).powf(dt * REFERENCE_RATE);
        let goal = target + self.config.offset;
        self.position += (goal - self.position) * factor;
        self.position
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Jump straight to the goal (scene cuts).
    pub fn snap(&mut self, target: Vec3) {
        self.position = target + self.config.offset;
    }
}
