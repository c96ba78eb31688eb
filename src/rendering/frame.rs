//! CPU-side frame assembly: everything the GPU needs for one frame, built
//! from the simulation state without touching the device.

use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::camera::OrbitCamera;
use crate::config::Config;
use crate::relativity::{BlackHoleSystem, CameraBlock, DiskBlock, ObjectsBlock, lensing_extent};
use crate::simulation::{BodyDetails, Scene, World};

// Bodies never shrink below this angular radius (radians) on screen
const MIN_ANGULAR_RADIUS: f32 = 0.004;
const SOLAR_FOV_DEG: f32 = 45.0;
const GRID_COLOR: [f32; 4] = [0.35, 0.4, 0.6, 0.6];

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Per-body transform and shading, one per [`MeshDraw`].
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// Stars are lit from within; zero for everything else.
    pub glow: f32,
    pub _pad: [f32; 3],
}

/// One body's slice of the shared mesh buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshDraw {
    pub indices: Range<u32>,
    pub base_vertex: i32,
}

/// Every body mesh of a frame, packed back to back. `draws[i]` uses `instances[i]`.
#[derive(Debug, Clone, Default)]
pub struct MeshBatch {
    pub vertices: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub draws: Vec<MeshDraw>,
    pub instances: Vec<MeshInstance>,
}

impl MeshBatch {
    fn push(&mut self, vertices: &[[f32; 3]], indices: &[u32], instance: MeshInstance) {
        let first = self.indices.len() as u32;
        self.draws.push(MeshDraw {
            indices: first..first + indices.len() as u32,
            base_vertex: self.vertices.len() as i32,
        });
        self.vertices.extend_from_slice(vertices);
        self.indices.extend_from_slice(indices);
        self.instances.push(instance);
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],
}

/// Uniform blocks for the black-hole pass and the size of its target.
#[derive(Debug, Copy, Clone)]
pub struct LensingFrame {
    pub objects: ObjectsBlock,
    pub camera: CameraBlock,
    pub disk: DiskBlock,
    pub extent: (u32, u32),
}

#[derive(Debug, Clone)]
pub struct FrameData {
    pub globals: Globals,
    /// Line list: every two vertices form one segment.
    pub lines: Vec<LineVertex>,
    pub meshes: MeshBatch,
    pub lensing: Option<LensingFrame>,
}

impl FrameData {
    pub fn new(world: &World, camera: &OrbitCamera, config: &Config, aspect: f32) -> Self {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        match world {
            World::Solar(scene) => Self::solar(scene, camera, aspect),
            World::BlackHole(system) => Self::black_hole(system, camera, config, aspect),
        }
    }

    fn solar(scene: &Scene, camera: &OrbitCamera, aspect: f32) -> Self {
        let distance = camera.distance();
        let projection = Mat4::perspective_rh(SOLAR_FOV_DEG.to_radians(), aspect, distance * 1.0e-3, distance * 1.0e5);
        let eye = camera.position();

        let mut lines = Vec::new();
        let mut meshes = MeshBatch::default();
        for (_, body) in scene.iter() {
            let color = body.color.extend(1.0).to_array();
            push_trail(&mut lines, body.trail.points().map(|p| p.as_vec3()), color);

            let center = body.position.as_vec3();
            for ring in body.rings() {
                let model = ring.model_matrix(center);
                let ring_color = ring.color.extend(0.8).to_array();
                let edge = |i: usize| model.transform_point3(Vec3::from_array(ring.mesh.vertices[i]));
                // Inner and outer edges: even and odd vertices
                for i in 0..ring.mesh.vertices.len().saturating_sub(2) {
                    lines.push(LineVertex {
                        position: edge(i).to_array(),
                        color: ring_color,
                    });
                    lines.push(LineVertex {
                        position: edge(i + 2).to_array(),
                        color: ring_color,
                    });
                }
            }

            let glow = match body.details {
                BodyDetails::Star { brightness } => brightness,
                _ => 0.0,
            };
            let radius = body.radius as f32;
            let scale = apparent_radius(radius, center.distance(eye)) / radius;
            let instance = MeshInstance {
                model: body.model_matrix(scale).to_cols_array_2d(),
                color,
                glow,
                _pad: [0.0; 3],
            };
            meshes.push(&body.mesh.vertices, &body.mesh.indices, instance);
        }

        Self {
            globals: globals(camera, projection),
            lines,
            meshes,
            lensing: None,
        }
    }

    fn black_hole(system: &BlackHoleSystem, camera: &OrbitCamera, config: &Config, aspect: f32) -> Self {
        let projection = Mat4::perspective_rh(config.lensing.fov_deg.to_radians(), aspect, 1.0e9, 1.0e14);
        let grid = system.grid();
        let vertices = grid.vertices();
        let lines = grid
            .indices()
            .iter()
            .filter_map(|&i| vertices.get(i as usize))
            .map(|&position| LineVertex {
                position,
                color: GRID_COLOR,
            })
            .collect();

        Self {
            globals: globals(camera, projection),
            lines,
            meshes: MeshBatch::default(),
            lensing: Some(LensingFrame {
                objects: *system.objects_block(),
                camera: CameraBlock::new(camera, config.lensing.fov_deg, aspect),
                disk: *system.disk(),
                extent: lensing_extent(&config.lensing, camera.is_moving()),
            }),
        }
    }
}

fn globals(camera: &OrbitCamera, projection: Mat4) -> Globals {
    Globals {
        view_proj: (projection * camera.view_matrix()).to_cols_array_2d(),
    }
}

/// World radius that keeps a body at least [`MIN_ANGULAR_RADIUS`] wide.
pub fn apparent_radius(radius: f32, distance_to_eye: f32) -> f32 {
    radius.max(distance_to_eye * MIN_ANGULAR_RADIUS)
}

/// Append a trail as line segments, fading towards the oldest point.
/// Fewer than two points draw nothing.
fn push_trail(lines: &mut Vec<LineVertex>, points: impl ExactSizeIterator<Item = Vec3>, color: [f32; 4]) {
    let count = points.len();
    if count < 2 {
        return;
    }
    let faded = |i: usize, p: Vec3| LineVertex {
        position: p.to_array(),
        color: [color[0], color[1], color[2], 0.1 + 0.7 * i as f32 / (count - 1) as f32],
    };
    let mut previous: Option<(usize, Vec3)> = None;
    for (i, point) in points.enumerate() {
        if let Some((j, from)) = previous {
            lines.push(faded(j, from));
            lines.push(faded(i, point));
        }
        previous = Some((i, point));
    }
}
