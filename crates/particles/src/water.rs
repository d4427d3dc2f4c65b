//! Animated water surface.
//!
//! A flat grid over the xz plane whose heights follow two crossing sine waves.

use glam::Vec3;

use crate::error::{check_param, Result};

/// Largest accepted grid resolution per side.
pub const MAX_WAVE_SEGMENTS: u32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveConfig {
    /// Extent along x.
    pub width: f32,
    /// Extent along z.
    pub depth: f32,
    /// Grid cells per side; the grid has `(segments + 1)^2` vertices.
    pub segments: u32,
    /// Height of the primary wave. The cross wave runs at half amplitude.
    pub amplitude: f32,
    /// Spatial frequency of both waves.
    pub wave_number: f32,
    /// Time scale of the cross wave relative to the primary wave.
    pub cross_speed: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            width: 100.0,
            depth: 100.0,
            segments: 64,
            amplitude: 0.5,
            wave_number: 0.1,
            cross_speed: 0.8,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WaveSurface {
    config: WaveConfig,
    vertices: Vec<Vec3>,
}

impl WaveSurface {
    pub fn new(config: WaveConfig) -> Result<Self> {
        check_param("wave width", config.width, config.width > 0.0)?;
        check_param("wave depth", config.depth, config.depth > 0.0)?;
        check_param(
            "wave segments",
            config.segments as f32,
            config.segments > 0 && config.segments <= MAX_WAVE_SEGMENTS,
        )?;
        check_param("wave amplitude", config.amplitude, true)?;
        check_param("wave number", config.wave_number, true)?;
        check_param("wave cross speed", config.cross_speed, true)?;

        let n = config.segments as usize + 1;
        let step_x = config.width / config.segments as f32;
        let step_z = config.depth / config.segments as f32;
        let mut vertices = Vec::with_capacity(n * n);
        for row in 0..n {
            for col in 0..n {
                vertices.push(Vec3::new(
                    -config.width * 0.5 + col as f32 * step_x,
                    0.0,
                    -config.depth * 0.5 + row as f32 * step_z,
                ));
            }
        }
        Ok(Self { config, vertices })
    }

    /// Surface height at (x, z) and time `t`.
    pub fn height_at(&self, x: f32, z: f32, t: f32) -> f32 {
        wave_height(&self.config, x, z, t)
    }

    /// Recompute every vertex height for time `t`.
    pub fn animate(&mut self, t: f32) {
        let c = self.config;
        for v in &mut self.vertices {
            v.y = wave_height(&c, v.x, v.z, t);
        }
    }

    /// Flat vertex buffer, 3 floats per vertex, row-major from -z to +z.
    pub fn positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    pub fn dispose(self) -> usize {
        self.vertices.len()
    }
}

#[inline]
fn wave_height(c: &WaveConfig, x: f32, z: f32, t: f32) -> f32 {
    (x * c.wave_number + t).sin() * c.amplitude
        + (z * c.wave_number + t * c.cross_speed).sin() * c.amplitude * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_expected_vertices() {
        let surface = WaveSurface::new(WaveConfig { segments: 4, ..WaveConfig::default() }).unwrap();
        assert_eq!(surface.vertex_count(), 25);
        assert_eq!(surface.positions().len(), 75);
        assert_eq!(surface.positions()[0], -50.0);
        assert_eq!(surface.positions()[2], -50.0);
    }

    #[test]
    fn heights_follow_crossing_waves() {
        let mut surface = WaveSurface::new(WaveConfig { segments: 8, ..WaveConfig::default() }).unwrap();
        surface.animate(1.3);
        for v in surface.positions().chunks_exact(3) {
            let expected = surface.height_at(v[0], v[2], 1.3);
            assert!((v[1] - expected).abs() < 1e-6);
            assert!(v[1].abs() <= 0.75 + 1e-6);
        }
    }

    #[test]
    fn rejects_empty_grid() {
        assert!(WaveSurface::new(WaveConfig { segments: 0, ..WaveConfig::default() }).is_err());
        assert!(WaveSurface::new(WaveConfig { width: -1.0, ..WaveConfig::default() }).is_err());
    }

    #[test]
    fn rejects_oversized_grid() {
        let huge = WaveConfig { segments: u32::MAX, ..WaveConfig::default() };
        assert!(WaveSurface::new(huge).is_err());
        let over = WaveConfig { segments: MAX_WAVE_SEGMENTS + 1, ..WaveConfig::default() };
        assert!(WaveSurface::new(over).is_err());
    }
}
