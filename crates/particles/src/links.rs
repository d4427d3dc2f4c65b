//! Proximity link lines between nearby particles ("constellation" effect).

use glam::Vec3;

use crate::error::{check_param, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkConfig {
    /// Only the first `max_points` particles are considered (the scan is quadratic).
    pub max_points: usize,
    /// Link particles closer than this.
    pub distance: f32,
    /// Links started per particle.
    pub max_per_point: usize,
}

/// Reusable segment buffer rebuilt from a particle position buffer.
#[derive(Debug, Clone)]
pub struct ProximityLinks {
    config: LinkConfig,
    /// Segment endpoints, two per link.
    endpoints: Vec<Vec3>,
}

impl ProximityLinks {
    pub fn new(config: LinkConfig) -> Result<Self> {
        check_param("link max points", config.max_points as f32, config.max_points > 0)?;
        check_param("links per point", config.max_per_point as f32, config.max_per_point > 0)?;
        check_param("link distance", config.distance, config.distance > 0.0)?;
        Ok(Self {
            config,
            endpoints: Vec::with_capacity(config.max_points * config.max_per_point * 2),
        })
    }

    /// Rebuild the links from a flat `[x, y, z, ...]` buffer. Returns the link count.
    pub fn rebuild(&mut self, positions: &[f32]) -> usize {
        self.endpoints.clear();
        let points: &[Vec3] = bytemuck::cast_slice(&positions[..positions.len() - positions.len() % 3]);
        let points = &points[..points.len().min(self.config.max_points)];
        let max_sq = self.config.distance * self.config.distance;

        for (i, &a) in points.iter().enumerate() {
            let mut links = 0;
            for &b in &points[i + 1..] {
                if links == self.config.max_per_point {
                    break;
                }
                if a.distance_squared(b) < max_sq {
                    self.endpoints.push(a);
                    self.endpoints.push(b);
                    links += 1;
                }
            }
        }
        self.len()
    }

    /// Flat segment buffer, 6 floats per link.
    pub fn segments(&self) -> &[f32] {
        bytemuck::cast_slice(&self.endpoints)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
