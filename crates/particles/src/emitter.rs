//! Probabilistic one-shot pulses (lightning flashes).
//!
//! The emitter is a two-state machine polled by the host:
//! `Idle --[random draw < probability]--> Active --[now >= active_until]--> Idle`.
//! While a pulse is active nothing is drawn, so pulses never overlap or queue.

use fx_core::Span;
use rand::rngs::StdRng;
use rand::Rng;

use crate::error::{EffectError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitterState {
    #[default]
    Idle,
    Active,
}

/// What the host applies to its light or uniform after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pulse {
    pub state: EmitterState,
    pub intensity: f32,
}

impl Pulse {
    pub fn is_active(&self) -> bool {
        self.state == EmitterState::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterConfig {
    /// Chance per tick of starting a pulse while idle, in `[0, 1]`.
    pub probability: f32,
    pub intensity: Span,
    /// Pulse length in seconds.
    pub duration: Span,
}

impl EmitterConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.probability.is_finite() && (0.0..=1.0).contains(&self.probability)) {
            return Err(EffectError::ProbabilityOutOfRange(self.probability));
        }
        if !self.intensity.is_valid() {
            return Err(EffectError::InvalidRange {
                what: "intensity",
                min: self.intensity.min,
                max: self.intensity.max,
            });
        }
        if !self.duration.is_valid() || self.duration.min < 0.0 {
            return Err(EffectError::InvalidRange {
                what: "duration",
                min: self.duration.min,
                max: self.duration.max,
            });
        }
        Ok(())
    }
}

/// Lightning-style flash generator driven by host timestamps.
#[derive(Debug)]
pub struct TransientEmitter<R = StdRng> {
    config: EmitterConfig,
    state: EmitterState,
    intensity: f32,
    active_until: f32,
    last_duration: f32,
    pulse_count: u64,
    rng: R,
}

impl<R: Rng> TransientEmitter<R> {
    pub fn new(config: EmitterConfig, rng: R) -> Result<Self> {
        config.validate()?;
        log::debug!(
            "Transient emitter created: p = {}, intensity {:?}, duration {:?}",
            config.probability,
            config.intensity,
            config.duration
        );
        Ok(Self {
            config,
            state: EmitterState::Idle,
            intensity: 0.0,
            active_until: 0.0,
            last_duration: 0.0,
            pulse_count: 0,
            rng,
        })
    }

    /// Poll at host time `now` (seconds, non-decreasing).
    pub fn tick(&mut self, now: f32) -> Pulse {
        match self.state {
            EmitterState::Active if now >= self.active_until => {
                self.state = EmitterState::Idle;
                self.intensity = 0.0;
            }
            EmitterState::Active => {}
            EmitterState::Idle => {
                if self.rng.gen::<f32>() < self.config.probability {
                    self.intensity = self.config.intensity.sample(&mut self.rng);
                    self.last_duration = self.config.duration.sample(&mut self.rng);
                    self.active_until = now + self.last_duration;
                    self.state = EmitterState::Active;
                    self.pulse_count += 1;
                    log::trace!(
                        "Pulse {} at t = {:.3}: intensity {:.2} for {:.3}s",
                        self.pulse_count,
                        now,
                        self.intensity,
                        self.last_duration
                    );
                }
            }
        }
        self.pulse()
    }

    pub fn pulse(&self) -> Pulse {
        Pulse { state: self.state, intensity: self.intensity }
    }

    pub fn state(&self) -> EmitterState {
        self.state
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// End time of the current (or last) pulse.
    pub fn active_until(&self) -> f32 {
        self.active_until
    }

    /// Length of the most recently started pulse.
    pub fn last_duration(&self) -> f32 {
        self.last_duration
    }

    pub fn pulse_count(&self) -> u64 {
        self.pulse_count
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn dispose(self) -> u64 {
        log::debug!("Transient emitter disposed after {} pulses", self.pulse_count);
        self.pulse_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn starts_idle() {
        let emitter = TransientEmitter::new(presets::lightning(), StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(emitter.pulse(), Pulse::default());
    }

    #[test]
    fn never_overlaps_with_always_low_draws() {
        // Every draw is 0.0: below any positive probability, and the minimum of every range.
        let config = EmitterConfig {
            probability: 0.5,
            intensity: Span::new(2.0, 4.0),
            duration: Span::new(0.1, 0.25),
        };
        let mut emitter = TransientEmitter::new(config, StepRng::new(0, 0)).unwrap();

        let first = emitter.tick(0.0);
        assert!(first.is_active());
        assert_eq!(first.intensity, 2.0);
        let until = emitter.active_until();
        assert!((until - 0.1).abs() < 1e-6);

        for now in [0.02, 0.04, 0.06, 0.08] {
            let pulse = emitter.tick(now);
            assert!(pulse.is_active());
            assert_eq!(emitter.active_until(), until);
            assert_eq!(emitter.pulse_count(), 1);
        }

        // Expiry tick goes idle without redrawing.
        let expired = emitter.tick(until);
        assert_eq!(expired.state, EmitterState::Idle);
        assert_eq!(expired.intensity, 0.0);
        assert_eq!(emitter.pulse_count(), 1);

        // Re-arms on the next tick.
        assert!(emitter.tick(until + FRAME).is_active());
        assert_eq!(emitter.pulse_count(), 2);
    }

    #[test]
    fn draws_stay_within_ranges() {
        let config = EmitterConfig { probability: 1.0, ..presets::lightning() };
        let mut emitter = TransientEmitter::new(config, StdRng::seed_from_u64(42)).unwrap();
        let mut seen = 0;
        for frame in 0..10_000 {
            let pulse = emitter.tick(frame as f32 * FRAME);
            if emitter.pulse_count() > seen {
                seen = emitter.pulse_count();
                assert!(config.intensity.contains(pulse.intensity));
                assert!(config.duration.contains(emitter.last_duration()));
            }
        }
        assert!(seen > 100);
    }

    #[test]
    fn zero_probability_never_fires() {
        let config = EmitterConfig { probability: 0.0, ..presets::lightning() };
        let mut emitter = TransientEmitter::new(config, StepRng::new(0, 0)).unwrap();
        for frame in 0..1000 {
            assert!(!emitter.tick(frame as f32 * FRAME).is_active());
        }
    }

    #[test]
    fn rejects_bad_configuration() {
        let rng = || StdRng::seed_from_u64(0);
        let err = TransientEmitter::new(EmitterConfig { probability: 1.5, ..presets::lightning() }, rng()).unwrap_err();
        assert_eq!(err, EffectError::ProbabilityOutOfRange(1.5));
        assert!(TransientEmitter::new(EmitterConfig { probability: -0.1, ..presets::lightning() }, rng()).is_err());
        assert!(TransientEmitter::new(EmitterConfig { probability: f32::NAN, ..presets::lightning() }, rng()).is_err());

        let err = TransientEmitter::new(
            EmitterConfig { intensity: Span::new(4.0, 2.0), ..presets::lightning() },
            rng(),
        )
        .unwrap_err();
        assert!(matches!(err, EffectError::InvalidRange { what: "intensity", .. }));

        let err = TransientEmitter::new(
            EmitterConfig { duration: Span::new(0.3, 0.1), ..presets::lightning() },
            rng(),
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn storm_rate_is_roughly_two_percent() {
        let mut emitter = TransientEmitter::new(presets::lightning(), StdRng::seed_from_u64(7)).unwrap();
        for frame in 0..60 * 60 {
            emitter.tick(frame as f32 * FRAME);
        }
        // 3600 ticks, most of them idle, at 2% per idle tick.
        let pulses = emitter.dispose();
        assert!((30..=110).contains(&pulses), "{} pulses", pulses);
    }
}
