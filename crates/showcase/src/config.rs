//! Showcase configuration. Loaded from showcase.ron at startup.

use serde::{Deserialize, Serialize};

/// Run settings. Loaded from `showcase.ron` in the current directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowcaseConfig {
    /// Seed every effect's random source is derived from.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Number of frames to simulate.
    #[serde(default = "default_frames")]
    pub frames: u32,
    /// Simulated host frame rate in Hz.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,
    /// Fixed simulation step rate in Hz. Effects always tick at this rate.
    #[serde(default = "default_sim_rate")]
    pub sim_rate: f32,
    /// Seconds the simulated reader takes to scroll through the whole story.
    #[serde(default = "default_scroll_seconds")]
    pub scroll_seconds: f32,
    #[serde(default)]
    pub counts: EffectCounts,
    #[serde(default)]
    pub lightning: LightningSettings,
}

/// Particle counts per effect. A zero count disables that effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectCounts {
    pub rain: usize,
    pub leaves: usize,
    pub snow: usize,
    pub bubbles: usize,
    pub embers: usize,
    pub pollen: usize,
    pub sparkles: usize,
    pub stars: usize,
}

impl Default for EffectCounts {
    fn default() -> Self {
        use particles::presets::*;
        Self {
            rain: RAIN_COUNT,
            leaves: LEAF_COUNT,
            snow: SNOW_COUNT,
            bubbles: BUBBLE_COUNT,
            embers: EMBER_COUNT,
            pollen: POLLEN_COUNT,
            sparkles: SPARKLE_COUNT,
            stars: STAR_COUNT,
        }
    }
}

/// Storm flash tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightningSettings {
    pub probability: f32,
    /// Flash intensity range `(min, max)`.
    pub intensity: (f32, f32),
    /// Flash length range in seconds `(min, max)`.
    pub duration: (f32, f32),
}

impl Default for LightningSettings {
    fn default() -> Self {
        let preset = particles::presets::lightning();
        Self {
            probability: preset.probability,
            intensity: (preset.intensity.min, preset.intensity.max),
            duration: (preset.duration.min, preset.duration.max),
        }
    }
}

fn default_seed() -> u64 {
    7
}
fn default_frames() -> u32 {
    1200
}
fn default_frame_rate() -> f32 {
    60.0
}
fn default_sim_rate() -> f32 {
    60.0
}
fn default_scroll_seconds() -> f32 {
    15.0
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            frames: default_frames(),
            frame_rate: default_frame_rate(),
            sim_rate: default_sim_rate(),
            scroll_seconds: default_scroll_seconds(),
            counts: EffectCounts::default(),
            lightning: LightningSettings::default(),
        }
    }
}

impl ShowcaseConfig {
    /// Load config from `showcase.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match Self::parse(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    pub fn parse(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }
}

fn config_path() -> std::path::PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| std::path::PathBuf::from("."))
        .join("showcase.ron")
}
