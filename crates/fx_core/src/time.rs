//! Host-driven frame timing.
//!
//! The clock never reads the wall clock itself: the host feeds it either frame
//! deltas or absolute timestamps, which keeps simulations reproducible.

/// Fraction of a fixed step forgiven when deciding whether it is due.
pub const STEP_TOLERANCE: f32 = 0.01;

/// Tracks delta and elapsed time for an effect loop.
#[derive(Debug, Clone)]
pub struct Time {
    /// Total elapsed time in seconds.
    elapsed: f32,
    /// Duration of the last frame in seconds.
    delta: f32,
    /// Frame count since start.
    frame_count: u64,
    /// Fixed timestep in seconds (default 60 Hz).
    fixed_timestep: f32,
    /// Accumulated time for fixed updates.
    accumulator: f32,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a clock at t = 0 with a 60 Hz fixed step.
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            delta: 0.0,
            frame_count: 0,
            fixed_timestep: 1.0 / 60.0,
            accumulator: 0.0,
        }
    }

    /// Advance by a frame delta. Negative or non-finite deltas count as a paused frame.
    pub fn advance(&mut self, dt: f32) {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            log::warn!("Ignoring invalid frame delta {}", dt);
            0.0
        };
        self.delta = dt;
        self.elapsed += dt;
        self.frame_count += 1;
        self.accumulator += dt;
    }

    /// Advance to an absolute timestamp. Time never runs backwards: an earlier
    /// timestamp is treated as a paused frame.
    pub fn advance_to(&mut self, now: f32) {
        if now < self.elapsed {
            log::warn!("Timestamp {} is before current time {}, holding", now, self.elapsed);
            self.advance(0.0);
        } else {
            self.advance(now - self.elapsed);
        }
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the fixed timestep in seconds.
    pub fn fixed_timestep_seconds(&self) -> f32 {
        self.fixed_timestep
    }

    /// Check if a fixed update should run and consume the time.
    /// A step that is short by less than [`STEP_TOLERANCE`] of its length still
    /// runs, so rounding in host timestamps does not skip or double frames.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.accumulator >= self.fixed_timestep * (1.0 - STEP_TOLERANCE) {
            self.accumulator -= self.fixed_timestep;
            true
        } else {
            false
        }
    }

    /// Set the fixed timestep rate in Hz. Non-positive rates are ignored.
    pub fn set_fixed_rate(&mut self, hz: f32) {
        if hz > 0.0 && hz.is_finite() {
            self.fixed_timestep = 1.0 / hz;
        } else {
            log::warn!("Ignoring fixed rate {} Hz", hz);
        }
    }
}
