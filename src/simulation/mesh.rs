use std::f32::consts::{PI, TAU};

/// CPU-side triangle mesh, handed to the renderer for upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Stack/slice tessellated sphere centred on the origin.
    pub fn uv_sphere(radius: f32, stacks: u32, slices: u32) -> Self {
        let mut vertices = Vec::with_capacity(((stacks + 1) * (slices + 1)) as usize);
        for i in 0..=stacks {
            let phi = PI * i as f32 / stacks as f32;
            for j in 0..=slices {
                let theta = TAU * j as f32 / slices as f32;
                vertices.push([
                    radius * phi.sin() * theta.cos(),
                    radius * phi.cos(),
                    radius * phi.sin() * theta.sin(),
                ]);
            }
        }

        let mut indices = Vec::with_capacity((stacks * slices * 6) as usize);
        for i in 0..stacks {
            for j in 0..slices {
                let first = i * (slices + 1) + j;
                let second = first + slices + 1;
                indices.extend_from_slice(&[first, second, first + 1, second, second + 1, first + 1]);
            }
        }

        Self { vertices, indices }
    }

    /// Flat ring in the XZ plane between `inner` and `outer`.
    ///
    /// Vertices alternate inner/outer around the circle, so even indices are
    /// the inner edge and odd indices the outer edge.
    pub fn annulus(inner: f32, outer: f32, segments: u32) -> Self {
        let mut vertices = Vec::with_capacity(((segments + 1) * 2) as usize);
        for s in 0..=segments {
            let theta = TAU * s as f32 / segments as f32;
            let (sin, cos) = theta.sin_cos();
            vertices.push([inner * cos, 0.0, inner * sin]);
            vertices.push([outer * cos, 0.0, outer * sin]);
        }

        let mut indices = Vec::with_capacity((segments * 6) as usize);
        for s in 0..segments {
            let i = s * 2;
            indices.extend_from_slice(&[i, i + 1, i + 2, i + 1, i + 3, i + 2]);
        }

        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = Mesh::uv_sphere(2.5, 8, 12);
        assert_eq!(mesh.vertices.len(), 9 * 13);
        assert_eq!(mesh.triangle_count(), 8 * 12 * 2);
        for v in &mesh.vertices {
            let r = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((r - 2.5).abs() < 1e-4);
        }
        let max = *mesh.indices.iter().max().unwrap() as usize;
        assert!(max < mesh.vertices.len());
    }

    #[test]
    fn annulus_alternates_edges() {
        let mesh = Mesh::annulus(1.0, 2.0, 16);
        assert_eq!(mesh.vertices.len(), 34);
        assert_eq!(mesh.triangle_count(), 32);
        let inner = mesh.vertices[4];
        let outer = mesh.vertices[5];
        assert!(((inner[0].powi(2) + inner[2].powi(2)).sqrt() - 1.0).abs() < 1e-5);
        assert!(((outer[0].powi(2) + outer[2].powi(2)).sqrt() - 2.0).abs() < 1e-5);
    }
}
