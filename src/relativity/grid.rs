use crate::config::GridConfig;
use crate::relativity::objects::MassiveObject;
use crate::simulation::types::{C, G};

/// `r_s = 2GM/c²`.
pub fn schwarzschild_radius(mass: f64) -> f64 {
    2.0 * G * mass / (C * C)
}

/// Embedding-diagram depth of one well at horizontal distance `distance`.
///
/// Outside the horizon this is `2·sqrt(r_s·(d − r_s))`; at or inside it the
/// value saturates at `2·r_s`.
pub fn warp_contribution(distance: f64, r_s: f64) -> f64 {
    if distance > r_s {
        2.0 * (r_s * (distance - r_s)).sqrt()
    } else {
        2.0 * r_s
    }
}

/// Planar lattice in XZ whose heights approximate spacetime curvature.
///
/// Wells from several objects are summed linearly, which is a visual
/// approximation and not exact for overlapping wells.
#[derive(Debug, Clone)]
pub struct WarpGrid {
    size: u32,
    spacing: f64,
    baseline_offset: f64,
    vertices: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl WarpGrid {
    pub fn new(config: &GridConfig) -> Self {
        let size = config.size;
        let stride = size + 1;
        let mut indices = Vec::with_capacity((size * size * 4) as usize);
        for z in 0..size {
            for x in 0..size {
                let i = z * stride + x;
                indices.extend_from_slice(&[i, i + 1, i, i + stride]);
            }
        }

        let mut grid = Self {
            size,
            spacing: config.spacing,
            baseline_offset: config.baseline_offset,
            vertices: Vec::with_capacity((stride * stride) as usize),
            indices,
        };
        grid.rebuild(&[]);
        grid
    }

    /// World-space (x, z) of lattice vertex `(ix, iz)`, centred on the origin.
    pub fn lattice_point(&self, ix: u32, iz: u32) -> (f64, f64) {
        let half = (self.size / 2) as f64;
        ((ix as f64 - half) * self.spacing, (iz as f64 - half) * self.spacing)
    }

    /// Summed well depth below the baseline at `(x, z)`.
    pub fn height_at(&self, x: f64, z: f64, objects: &[MassiveObject]) -> f64 {
        let warp: f64 = objects
            .iter()
            .map(|object| {
                let dx = x - object.position.x;
                let dz = z - object.position.z;
                warp_contribution((dx * dx + dz * dz).sqrt(), object.schwarzschild_radius())
            })
            .sum();
        warp - self.baseline_offset
    }

    /// Recompute every vertex height for the current object positions.
    pub fn rebuild(&mut self, objects: &[MassiveObject]) {
        self.vertices.clear();
        for iz in 0..=self.size {
            for ix in 0..=self.size {
                let (x, z) = self.lattice_point(ix, iz);
                let y = self.height_at(x, z, objects);
                self.vertices.push([x as f32, y as f32, z as f32]);
            }
        }
    }

    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    /// Line-list indices, two per segment.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;

    fn object(mass: f64, position: DVec3) -> MassiveObject {
        MassiveObject::new(position, 1.0e10, [1.0, 1.0, 1.0, 1.0], mass).unwrap()
    }

    #[test]
    fn schwarzschild_radius_of_sun() {
        let r_s = schwarzschild_radius(1.989e30);
        assert!((r_s - 2953.0).abs() < 2.0, "r_s = {r_s}");
    }

    #[test]
    fn contribution_is_continuous_at_horizon() {
        let r_s = 1.0e4;
        assert_eq!(warp_contribution(r_s, r_s), 2.0 * r_s);
        assert_eq!(warp_contribution(r_s * 2.0, r_s), 2.0 * r_s);
        assert!(warp_contribution(r_s * 10.0, r_s) > 2.0 * r_s);
    }

    #[test]
    fn empty_grid_sits_at_baseline() {
        let config = GridConfig::default();
        let grid = WarpGrid::new(&config);
        assert_eq!(grid.vertices().len(), 26 * 26);
        assert_eq!(grid.indices().len(), 25 * 25 * 4);
        assert!(grid.vertices().iter().all(|v| v[1] == -3.0e10));
    }

    #[test]
    fn lattice_is_centred() {
        let grid = WarpGrid::new(&GridConfig::default());
        assert_eq!(grid.lattice_point(12, 12), (0.0, 0.0));
        assert_eq!(grid.lattice_point(0, 25), (-12.0e10, 13.0e10));
    }

    #[test]
    fn wells_superpose_linearly() {
        let grid = WarpGrid::new(&GridConfig::default());
        let a = object(8.54e36, DVec3::ZERO);
        let b = object(1.98892e30, DVec3::new(4.0e11, 0.0, 0.0));
        let (x, z) = (1.0e11, 2.0e10);
        let both = grid.height_at(x, z, &[a, b]) + 3.0e10;
        let only_a = grid.height_at(x, z, &[a]) + 3.0e10;
        let only_b = grid.height_at(x, z, &[b]) + 3.0e10;
        assert!((both - (only_a + only_b)).abs() < 1.0);
    }

    #[test]
    fn rebuild_tracks_moved_objects() {
        let mut grid = WarpGrid::new(&GridConfig::default());
        let mut hole = object(8.54e36, DVec3::ZERO);
        grid.rebuild(&[hole]);
        let centre = (12 * 26 + 12) as usize;
        let before = grid.vertices()[centre][1];
        hole.position = DVec3::new(5.0e10, 0.0, 0.0);
        grid.rebuild(&[hole]);
        assert_ne!(grid.vertices()[centre][1], before);
    }
}
