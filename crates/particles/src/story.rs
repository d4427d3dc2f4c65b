//! Scroll-driven chapter timeline.
//!
//! The page reports scroll progress in `[0, 1]`; the timeline turns it into a
//! chapter index and per-layer opacities. Layers that are nearly invisible are
//! skipped by the host so hidden particle fields cost nothing.

use crate::error::{check_param, Result};

/// Layers at or below this opacity are not simulated.
pub const VISIBILITY_THRESHOLD: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoryTimeline {
    chapters: usize,
}

impl StoryTimeline {
    pub fn new(chapters: usize) -> Result<Self> {
        check_param("story chapters", chapters as f32, chapters > 0)?;
        Ok(Self { chapters })
    }

    pub fn chapters(&self) -> usize {
        self.chapters
    }

    /// Chapter shown at `progress`. Progress is clamped to `[0, 1]`.
    pub fn chapter_at(&self, progress: f32) -> usize {
        let p = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        ((p * self.chapters as f32) as usize).min(self.chapters - 1)
    }

    /// Progress at which `chapter` begins (navigation dots jump here).
    pub fn chapter_start(&self, chapter: usize) -> f32 {
        chapter.min(self.chapters - 1) as f32 / self.chapters as f32
    }
}

/// Piecewise-linear opacity over scroll progress.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerFade {
    /// `(progress, opacity)` keys sorted by progress.
    keys: Vec<(f32, f32)>,
}

impl LayerFade {
    pub fn new(mut keys: Vec<(f32, f32)>) -> Result<Self> {
        check_param("fade key count", keys.len() as f32, !keys.is_empty())?;
        for &(progress, opacity) in &keys {
            check_param("fade progress", progress, (0.0..=1.0).contains(&progress))?;
            check_param("fade opacity", opacity, (0.0..=1.0).contains(&opacity))?;
        }
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self { keys })
    }

    /// Fade in over `[fade_in.0, fade_in.1]`, hold `peak`, fade out over `[fade_out.0, fade_out.1]`.
    pub fn window(fade_in: (f32, f32), peak: f32, fade_out: (f32, f32)) -> Result<Self> {
        Self::new(vec![
            (fade_in.0, 0.0),
            (fade_in.1, peak),
            (fade_out.0, peak),
            (fade_out.1, 0.0),
        ])
    }

    pub fn opacity_at(&self, progress: f32) -> f32 {
        let first = self.keys[0];
        let last = self.keys[self.keys.len() - 1];
        if progress <= first.0 {
            return first.1;
        }
        if progress >= last.0 {
            return last.1;
        }
        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if progress <= b.0 {
                let span = b.0 - a.0;
                if span <= 0.0 {
                    return b.1;
                }
                return a.1 + (b.1 - a.1) * (progress - a.0) / span;
            }
        }
        last.1
    }

    pub fn is_visible(&self, progress: f32) -> bool {
        self.opacity_at(progress) > VISIBILITY_THRESHOLD
    }
}
