//! Motion rules: how a particle moves from one tick to the next.
//!
//! Rain, bubbles, sparkles, leaves and star swirls all run on the same field
//! engine; only the rule differs. Velocities are world units per second.

use glam::Vec3;
use noise::{NoiseFn, Perlin};
use rand::Rng;

use crate::error::{check_param, Result};

/// Per-particle state as seen by a motion rule.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Base point for oscillating rules. Set at spawn and on respawn.
    pub anchor: Vec3,
}

/// Strategy applied to every particle on every tick.
#[derive(Debug, Clone, Copy)]
pub enum MotionRule {
    /// Constant velocity `base + spread * u` with `u` drawn once per particle in `[0, 1)`.
    Drift { base: Vec3, spread: Vec3 },
    /// Position orbits the anchor: `sin` on x and y, `cos` on z, phase shifted by particle index.
    Oscillate {
        amplitude: Vec3,
        frequency: Vec3,
        phase_step: Vec3,
    },
    /// Steady fall with a sinusoidal sideways sway on x.
    Sway {
        fall: f32,
        amplitude: f32,
        frequency: f32,
        phase_step: f32,
    },
    /// Rotation about the vertical axis plus a vertical wave keyed on x.
    Swirl {
        /// Radians per second.
        angular_speed: f32,
        bob_amplitude: f32,
        bob_frequency: f32,
    },
    /// Base velocity plus a Perlin noise vector field.
    Turbulence {
        base: Vec3,
        strength: f32,
        /// Spatial frequency of the noise.
        scale: f32,
        seed: u32,
    },
    /// Caller-supplied velocity field `(position, elapsed) -> velocity`.
    Field(fn(Vec3, f32) -> Vec3),
}

impl MotionRule {
    /// Constant drift with no per-particle jitter.
    pub fn constant(velocity: Vec3) -> Self {
        MotionRule::Drift { base: velocity, spread: Vec3::ZERO }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            MotionRule::Drift { base, spread } => {
                check_param("drift base", base.x + base.y + base.z, base.is_finite())?;
                check_param("drift spread", spread.x + spread.y + spread.z, spread.is_finite())
            }
            MotionRule::Oscillate { amplitude, frequency, phase_step } => {
                let finite = amplitude.is_finite() && frequency.is_finite() && phase_step.is_finite();
                check_param("oscillation", amplitude.length(), finite)
            }
            MotionRule::Sway { fall, amplitude, frequency, phase_step } => {
                check_param("sway fall", fall, true)?;
                check_param("sway amplitude", amplitude, true)?;
                check_param("sway frequency", frequency, true)?;
                check_param("sway phase step", phase_step, true)
            }
            MotionRule::Swirl { angular_speed, bob_amplitude, bob_frequency } => {
                check_param("swirl angular speed", angular_speed, true)?;
                check_param("swirl bob amplitude", bob_amplitude, true)?;
                check_param("swirl bob frequency", bob_frequency, true)
            }
            MotionRule::Turbulence { base, strength, scale, .. } => {
                check_param("turbulence base", base.length(), base.is_finite())?;
                check_param("turbulence strength", strength, strength >= 0.0)?;
                check_param("turbulence scale", scale, scale > 0.0)
            }
            MotionRule::Field(_) => Ok(()),
        }
    }
}

/// A validated rule plus whatever it needs precomputed (noise tables).
#[derive(Clone)]
pub struct Motion {
    rule: MotionRule,
    perlin: Option<Perlin>,
}

impl std::fmt::Debug for Motion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Motion").field("rule", &self.rule).finish()
    }
}

impl Motion {
    pub fn new(rule: MotionRule) -> Result<Self> {
        rule.validate()?;
        let perlin = match rule {
            MotionRule::Turbulence { seed, .. } => Some(Perlin::new(seed)),
            _ => None,
        };
        Ok(Self { rule, perlin })
    }

    pub fn rule(&self) -> &MotionRule {
        &self.rule
    }

    /// Velocity given to a freshly spawned particle.
    pub fn initial_velocity<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        match self.rule {
            MotionRule::Drift { base, spread } => {
                let u = Vec3::new(rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>());
                base + spread * u
            }
            MotionRule::Sway { fall, .. } => Vec3::new(0.0, -fall, 0.0),
            MotionRule::Turbulence { base, .. } => base,
            MotionRule::Oscillate { .. } | MotionRule::Swirl { .. } | MotionRule::Field(_) => Vec3::ZERO,
        }
    }

    /// Advance one particle by `dt` seconds at elapsed time `t`.
    #[inline]
    pub fn advance(&self, index: usize, p: Particle, dt: f32, t: f32) -> Particle {
        let i = index as f32;
        match self.rule {
            MotionRule::Drift { .. } => Particle {
                position: p.position + p.velocity * dt,
                ..p
            },
            MotionRule::Oscillate { amplitude, frequency, phase_step } => {
                let phase = frequency * t + phase_step * i;
                let offset = Vec3::new(phase.x.sin(), phase.y.sin(), phase.z.cos()) * amplitude;
                let position = p.anchor + offset;
                Particle {
                    position,
                    velocity: (position - p.position) / dt,
                    anchor: p.anchor,
                }
            }
            MotionRule::Sway { fall, amplitude, frequency, phase_step } => {
                let sway = (t * frequency + i * phase_step).sin() * amplitude;
                let velocity = Vec3::new(sway, -fall, 0.0);
                Particle {
                    position: p.position + velocity * dt,
                    velocity,
                    anchor: p.anchor,
                }
            }
            MotionRule::Swirl { angular_speed, bob_amplitude, bob_frequency } => {
                let (sin, cos) = (angular_speed * dt).sin_cos();
                let x = p.position.x * cos - p.position.z * sin;
                let z = p.position.x * sin + p.position.z * cos;
                let y = p.position.y + (t + p.position.x * bob_frequency).sin() * bob_amplitude * dt;
                let position = Vec3::new(x, y, z);
                Particle {
                    position,
                    velocity: (position - p.position) / dt,
                    anchor: p.anchor,
                }
            }
            MotionRule::Turbulence { base, strength, scale, .. } => {
                let velocity = base + self.noise_at(p.position * scale, t) * strength;
                Particle {
                    position: p.position + velocity * dt,
                    velocity,
                    anchor: p.anchor,
                }
            }
            MotionRule::Field(field) => {
                let velocity = field(p.position, t);
                Particle {
                    position: p.position + velocity * dt,
                    velocity,
                    anchor: p.anchor,
                }
            }
        }
    }

    /// Three decorrelated noise channels, each in roughly `[-1, 1]`.
    fn noise_at(&self, q: Vec3, t: f32) -> Vec3 {
        let Some(perlin) = &self.perlin else {
            return Vec3::ZERO;
        };
        let (x, y, z, w) = (q.x as f64, q.y as f64, q.z as f64, t as f64 * 0.25);
        Vec3::new(
            perlin.get([x, y, z, w]) as f32,
            perlin.get([x + 31.7, y + 11.3, z + 47.1, w]) as f32,
            perlin.get([x + 73.9, y + 59.3, z + 5.9, w]) as f32,
        )
    }
}
