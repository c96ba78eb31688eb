use bytemuck::{Pod, Zeroable};
use glam::DVec3;

use crate::error::BodyError;
use crate::relativity::grid::schwarzschild_radius;
use crate::simulation::PointMass;
use crate::simulation::body::{finite, validate};

/// Capacity of the GPU object table.
pub const MAX_OBJECTS: usize = 16;

/// A massive object as seen by the lensing stage and the warp grid.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MassiveObject {
    pub position: DVec3,
    pub velocity: DVec3,
    pub radius: f64,
    pub color: [f32; 4],
    pub mass: f64,
}

impl MassiveObject {
    /// An object at rest. Mass and radius must be positive and finite.
    pub fn new(position: DVec3, radius: f64, color: [f32; 4], mass: f64) -> Result<Self, BodyError> {
        validate("massive object", mass, radius)?;
        finite("massive object", "position", position)?;
        Ok(Self {
            position,
            velocity: DVec3::ZERO,
            radius,
            color,
            mass,
        })
    }

    pub fn schwarzschild_radius(&self) -> f64 {
        schwarzschild_radius(self.mass)
    }

    pub fn point_mass(&self) -> PointMass {
        PointMass::new(self.position, self.velocity, self.mass)
    }
}

/// Uniform block consumed by the lensing shader.
///
/// Layout is `{ i32 count; f32 pad[3]; vec4 pos_radius[16]; vec4 color[16]; f32 mass[16]; }`
/// and must not change without the shader changing with it.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ObjectsBlock {
    pub count: i32,
    pub _pad: [f32; 3],
    pub pos_radius: [[f32; 4]; MAX_OBJECTS],
    pub color: [[f32; 4]; MAX_OBJECTS],
    pub mass: [f32; MAX_OBJECTS],
}

impl ObjectsBlock {
    /// Pack the first [`MAX_OBJECTS`] objects in input order. Returns the
    /// block and how many objects did not fit.
    pub fn pack(objects: &[MassiveObject]) -> (Self, usize) {
        let mut block = Self::zeroed();
        let kept = objects.len().min(MAX_OBJECTS);
        for (slot, object) in objects.iter().take(kept).enumerate() {
            block.pos_radius[slot] = [
                object.position.x as f32,
                object.position.y as f32,
                object.position.z as f32,
                object.radius as f32,
            ];
            block.color[slot] = object.color;
            block.mass[slot] = object.mass as f32;
        }
        block.count = kept as i32;
        (block, objects.len() - kept)
    }

    pub fn len(&self) -> usize {
        self.count.max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count <= 0
    }
}

impl Default for ObjectsBlock {
    fn default() -> Self {
        Self::zeroed()
    }
}
