//! Fixed-capacity particle field with recycling.
//!
//! A field seeds `capacity` particles inside its spawn region, moves them with a
//! [`MotionRule`] every tick, and sends any particle that crosses the recycle
//! boundary back to the respawn region. Slots are reused, never freed, so a
//! finite pool reads on screen as an endless flow of rain, bubbles or snow.

use fx_core::{Aabb, Axis, Span};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::Rng;

use crate::error::{EffectError, Result};
use crate::motion::{Motion, MotionRule, Particle};

/// Side of the threshold that triggers a recycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Boundary {
    /// Recycle once the coordinate drops below the threshold (rain, snow).
    Below(f32),
    /// Recycle once the coordinate rises above the threshold (bubbles).
    Above(f32),
    /// Recycle once the coordinate leaves `[lo, hi]` on either side (pollen).
    Between(f32, f32),
}

impl Boundary {
    /// The recycle threshold; the lower edge for [`Boundary::Between`].
    pub fn threshold(self) -> f32 {
        match self {
            Boundary::Below(t) | Boundary::Above(t) | Boundary::Between(t, _) => t,
        }
    }

    /// True if `value` lies past the boundary.
    #[inline]
    pub fn crossed(self, value: f32) -> bool {
        match self {
            Boundary::Below(t) => value < t,
            Boundary::Above(t) => value > t,
            Boundary::Between(lo, hi) => value < lo || value > hi,
        }
    }

    fn validate(self) -> Result<()> {
        match self {
            Boundary::Below(t) | Boundary::Above(t) if !t.is_finite() => {
                Err(EffectError::InvalidParameter { what: "recycle threshold", value: t })
            }
            Boundary::Between(lo, hi) if !(lo.is_finite() && hi.is_finite() && lo < hi) => {
                Err(EffectError::InvalidRange { what: "recycle band", min: lo, max: hi })
            }
            _ => Ok(()),
        }
    }

    /// Part of `span` on the live (non-recycling) side, if any remains.
    fn clip(self, span: Span) -> Option<Span> {
        let clipped = match self {
            Boundary::Below(t) => Span::new(span.min.max(t), span.max),
            Boundary::Above(t) => Span::new(span.min, span.max.min(t)),
            Boundary::Between(lo, hi) => Span::new(span.min.max(lo), span.max.min(hi)),
        };
        (clipped.min < clipped.max).then_some(clipped)
    }

    /// Face of `live` a wrapping particle at `value` re-enters from.
    fn wrap_face(self, value: f32, live: Span) -> f32 {
        match self {
            Boundary::Below(_) => live.max,
            Boundary::Above(_) => live.min,
            Boundary::Between(lo, _) if value < lo => live.max,
            Boundary::Between(..) => live.min,
        }
    }
}

/// What happens to a particle that crosses the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecycleMode {
    /// Teleport to a fresh random point of the respawn region, all axes redrawn.
    #[default]
    Respawn,
    /// Move only the recycle axis to the far face of the respawn region.
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recycle {
    pub axis: Axis,
    pub boundary: Boundary,
    pub mode: RecycleMode,
}

impl Recycle {
    /// Respawn particles that fall below `threshold` on `axis`.
    pub fn below(axis: Axis, threshold: f32) -> Self {
        Self { axis, boundary: Boundary::Below(threshold), mode: RecycleMode::Respawn }
    }

    /// Respawn particles that rise above `threshold` on `axis`.
    pub fn above(axis: Axis, threshold: f32) -> Self {
        Self { axis, boundary: Boundary::Above(threshold), mode: RecycleMode::Respawn }
    }

    /// Respawn particles that leave `[lo, hi]` on `axis`.
    pub fn between(axis: Axis, lo: f32, hi: f32) -> Self {
        Self { axis, boundary: Boundary::Between(lo, hi), mode: RecycleMode::Respawn }
    }

    /// Switch to [`RecycleMode::Wrap`].
    pub fn wrapping(mut self) -> Self {
        self.mode = RecycleMode::Wrap;
        self
    }
}

/// Construction parameters for a [`ParticleField`].
#[derive(Debug, Clone)]
pub struct FieldConfig {
    /// Number of particles. Fixed for the life of the field.
    pub capacity: usize,
    /// Region particles are seeded in at construction.
    pub spawn: Aabb,
    /// Region recycled particles return to. Defaults to `spawn`.
    pub respawn: Option<Aabb>,
    pub motion: MotionRule,
    /// `None` for fields that never leave their volume (sparkles, swirls).
    pub recycle: Option<Recycle>,
}

impl FieldConfig {
    pub fn new(capacity: usize, spawn: Aabb, motion: MotionRule) -> Self {
        Self { capacity, spawn, respawn: None, motion, recycle: None }
    }

    pub fn with_recycle(mut self, recycle: Recycle) -> Self {
        self.recycle = Some(recycle);
        self
    }

    pub fn with_respawn(mut self, respawn: Aabb) -> Self {
        self.respawn = Some(respawn);
        self
    }
}

/// Counters reported by [`ParticleField::stats`] and on dispose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldStats {
    pub capacity: usize,
    pub ticks: u64,
    pub recycled: u64,
}

/// A fixed pool of particles advanced by a shared motion rule.
#[derive(Debug)]
pub struct ParticleField<R = StdRng> {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    anchors: Vec<Vec3>,
    motion: Motion,
    recycle: Option<Recycle>,
    /// Respawn region already clipped to the live side of the boundary.
    respawn: Aabb,
    rng: R,
    ticks: u64,
    recycled: u64,
}

impl<R: Rng> ParticleField<R> {
    /// Validate `config` and seed every particle inside the spawn region.
    pub fn new(config: FieldConfig, mut rng: R) -> Result<Self> {
        if config.capacity == 0 {
            return Err(EffectError::InvalidCapacity);
        }
        if config.spawn.is_degenerate() {
            return Err(EffectError::DegenerateRegion {
                what: "spawn",
                min: config.spawn.min,
                max: config.spawn.max,
            });
        }
        let mut respawn = config.respawn.unwrap_or(config.spawn);
        if respawn.is_degenerate() {
            return Err(EffectError::DegenerateRegion {
                what: "respawn",
                min: respawn.min,
                max: respawn.max,
            });
        }
        if let Some(recycle) = config.recycle {
            recycle.boundary.validate()?;
            let threshold = recycle.boundary.threshold();
            let live = recycle
                .boundary
                .clip(respawn.span(recycle.axis))
                .ok_or(EffectError::EmptyRespawnRegion { threshold })?;
            respawn = respawn.with_span(recycle.axis, live);
        }
        let motion = Motion::new(config.motion)?;

        let capacity = config.capacity;
        let mut positions = Vec::with_capacity(capacity);
        let mut velocities = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            positions.push(config.spawn.sample(&mut rng));
            velocities.push(motion.initial_velocity(&mut rng));
        }
        let anchors = positions.clone();

        log::debug!(
            "Particle field created: {} particles, rule {:?}, recycle {:?}",
            capacity,
            motion.rule(),
            config.recycle
        );

        Ok(Self {
            positions,
            velocities,
            anchors,
            motion,
            recycle: config.recycle,
            respawn,
            rng,
            ticks: 0,
            recycled: 0,
        })
    }

    /// Advance every particle by `dt` seconds at elapsed time `elapsed`.
    /// Returns how many particles were recycled. A zero `dt` (paused host) is a no-op.
    pub fn tick(&mut self, dt: f32, elapsed: f32) -> usize {
        if !(dt > 0.0 && dt.is_finite()) {
            return 0;
        }
        let mut recycled = 0;
        for i in 0..self.positions.len() {
            let current = Particle {
                position: self.positions[i],
                velocity: self.velocities[i],
                anchor: self.anchors[i],
            };
            let mut next = self.motion.advance(i, current, dt, elapsed);

            if let Some(recycle) = self.recycle {
                if recycle.boundary.crossed(recycle.axis.get(next.position)) {
                    match recycle.mode {
                        RecycleMode::Respawn => {
                            next.position = self.respawn.sample(&mut self.rng);
                            next.anchor = next.position;
                        }
                        RecycleMode::Wrap => {
                            let value = recycle.axis.get(next.position);
                            let face = recycle.boundary.wrap_face(value, self.respawn.span(recycle.axis));
                            recycle.axis.set(&mut next.position, face);
                        }
                    }
                    recycled += 1;
                }
            }

            self.positions[i] = next.position;
            self.velocities[i] = next.velocity;
            self.anchors[i] = next.anchor;
        }
        self.ticks += 1;
        self.recycled += recycled as u64;
        recycled
    }

    /// Flat position buffer: 3 floats per particle, particle order fixed.
    pub fn positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn particle(&self, index: usize) -> Option<Particle> {
        Some(Particle {
            position: *self.positions.get(index)?,
            velocity: self.velocities[index],
            anchor: self.anchors[index],
        })
    }

    /// Override one particle's velocity. Only rules that integrate stored
    /// velocity (`Drift`) keep the override across ticks.
    pub fn set_velocity(&mut self, index: usize, velocity: Vec3) {
        if let Some(v) = self.velocities.get_mut(index) {
            *v = velocity;
        }
    }

    /// Number of live particles. Always equals the capacity.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Pool size fixed at construction.
    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    /// Recycle rule, if the field has one.
    pub fn recycle(&self) -> Option<Recycle> {
        self.recycle
    }

    /// Respawn region after clipping to the live side of the boundary.
    pub fn respawn_region(&self) -> Aabb {
        self.respawn
    }

    /// Tick and recycle counters so far.
    pub fn stats(&self) -> FieldStats {
        FieldStats {
            capacity: self.positions.len(),
            ticks: self.ticks,
            recycled: self.recycled,
        }
    }

    /// Release the buffers. The field cannot be used afterwards.
    pub fn dispose(self) -> FieldStats {
        let stats = self.stats();
        log::debug!(
            "Particle field disposed after {} ticks ({} recycles)",
            stats.ticks,
            stats.recycled
        );
        stats
    }
}
