//! Spawn volumes and scalar ranges.
//!
//! Every random draw goes through a caller-supplied `Rng`, so a seeded generator
//! reproduces the same points on every run.

use glam::Vec3;
use rand::Rng;

/// One of the three world axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    X,
    #[default]
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index into a `Vec3`.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    #[inline]
    pub fn get(self, v: Vec3) -> f32 {
        v[self.index()]
    }

    #[inline]
    pub fn set(self, v: &mut Vec3, value: f32) {
        v[self.index()] = value;
    }
}

/// Closed scalar range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// A zero-width span at `value`.
    pub const fn point(value: f32) -> Self {
        Self { min: value, max: value }
    }

    /// Both ends finite and `min <= max`.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    pub fn length(&self) -> f32 {
        self.max - self.min
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Linear interpolation from `min` (t = 0) to `max` (t = 1).
    #[inline]
    pub fn lerp(&self, t: f32) -> f32 {
        self.min + (self.max - self.min) * t
    }

    /// Uniform draw in `[min, max)`; returns `min` for a zero-width span.
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        self.lerp(rng.gen::<f32>())
    }
}

/// Axis-aligned box used for spawn and respawn regions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Build a box from per-axis ranges.
    pub fn from_spans(x: Span, y: Span, z: Span) -> Self {
        Self {
            min: Vec3::new(x.min, y.min, z.min),
            max: Vec3::new(x.max, y.max, z.max),
        }
    }

    /// Box of the given half extents around `center`.
    pub fn centered(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// A box is degenerate when any bound is non-finite or any axis has no volume.
    pub fn is_degenerate(&self) -> bool {
        !(self.min.is_finite() && self.max.is_finite() && self.min.cmplt(self.max).all())
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && point.cmple(self.max).all()
    }

    /// The box's extent along one axis.
    pub fn span(&self, axis: Axis) -> Span {
        Span::new(axis.get(self.min), axis.get(self.max))
    }

    /// Copy of this box with one axis replaced.
    pub fn with_span(mut self, axis: Axis, span: Span) -> Self {
        axis.set(&mut self.min, span.min);
        axis.set(&mut self.max, span.max);
        self
    }

    /// Uniform point inside the box. Draws x, then y, then z.
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let t = Vec3::new(rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>());
        self.min + self.size() * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn axis_get_and_set() {
        let mut v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Axis::Z.get(v), 3.0);
        Axis::Y.set(&mut v, -7.0);
        assert_eq!(v, Vec3::new(1.0, -7.0, 3.0));
    }

    #[test]
    fn span_validity() {
        assert!(Span::new(0.1, 0.25).is_valid());
        assert!(Span::point(2.0).is_valid());
        assert!(!Span::new(4.0, 2.0).is_valid());
        assert!(!Span::new(f32::NAN, 1.0).is_valid());
    }

    #[test]
    fn degenerate_boxes_are_detected() {
        assert!(!Aabb::new(Vec3::ZERO, Vec3::ONE).is_degenerate());
        assert!(Aabb::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0)).is_degenerate());
        assert!(Aabb::new(Vec3::ONE, Vec3::ZERO).is_degenerate());
        assert!(Aabb::new(Vec3::ZERO, Vec3::new(f32::INFINITY, 1.0, 1.0)).is_degenerate());
    }

    #[test]
    fn samples_stay_inside_the_box() {
        let region = Aabb::from_spans(Span::new(-40.0, 40.0), Span::new(0.0, 40.0), Span::new(-40.0, 40.0));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(region.contains(region.sample(&mut rng)));
        }
    }

    #[test]
    fn with_span_replaces_one_axis() {
        let region = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0)).with_span(Axis::Y, Span::new(30.0, 40.0));
        assert_eq!(region.span(Axis::Y), Span::new(30.0, 40.0));
        assert_eq!(region.span(Axis::X), Span::new(-1.0, 1.0));
    }
}
