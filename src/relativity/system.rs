use log::{info, warn};

use crate::camera::{FocusPoint, FocusRegistry};
use crate::config::GridConfig;
use crate::error::BodyError;
use crate::relativity::black_hole::BlackHole;
use crate::relativity::grid::WarpGrid;
use crate::relativity::objects::{MassiveObject, ObjectsBlock};
use crate::relativity::uniforms::DiskBlock;
use crate::simulation::{GravityIntegrator, PointMass};

/// A black hole and the massive objects around it, together with the
/// derived warp grid and GPU blocks.
#[derive(Debug, Clone)]
pub struct BlackHoleSystem {
    hole: BlackHole,
    hole_index: usize,
    objects: Vec<MassiveObject>,
    integrator: GravityIntegrator,
    grid: WarpGrid,
    block: ObjectsBlock,
    disk: DiskBlock,
    dropped: usize,
    dirty: bool,
}

impl BlackHoleSystem {
    /// The hole is appended after `companions` in the object table.
    pub fn new(hole: BlackHole, companions: Vec<MassiveObject>, grid: &GridConfig, min_separation: f64) -> Self {
        let mut objects = companions;
        objects.push(hole.as_object());
        let mut system = Self {
            hole,
            hole_index: objects.len() - 1,
            objects,
            integrator: GravityIntegrator::new(min_separation),
            grid: WarpGrid::new(grid),
            block: ObjectsBlock::default(),
            disk: DiskBlock::around(hole.r_s),
            dropped: 0,
            dirty: true,
        };
        system.refresh();
        system
    }

    /// Insert a companion ahead of the hole, which stays last in the table.
    /// Objects failing mass, radius or position checks are rejected.
    pub fn add_object(&mut self, object: MassiveObject) -> Result<(), BodyError> {
        let object = MassiveObject::new(object.position, object.radius, object.color, object.mass)?;
        self.objects.insert(self.hole_index, object);
        self.hole_index += 1;
        self.dirty = true;
        Ok(())
    }

    /// Advance every object, the hole included, when gravity is active.
    /// Returns whether anything moved.
    pub fn step(&mut self, dt: f64, gravity_active: bool) -> bool {
        if !gravity_active || !(dt > 0.0 && dt.is_finite()) {
            return false;
        }
        let mut masses: Vec<PointMass> = self.objects.iter().map(MassiveObject::point_mass).collect();
        self.integrator.step(&mut masses, dt);
        for (object, mass) in self.objects.iter_mut().zip(&masses) {
            object.position = mass.position;
            object.velocity = mass.velocity;
        }
        self.hole.position = self.objects[self.hole_index].position;
        self.dirty = true;
        true
    }

    /// Rebuild the grid and repack the object table if anything changed
    /// since the last call.
    pub fn refresh(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.grid.rebuild(&self.objects);
        let (block, dropped) = ObjectsBlock::pack(&self.objects);
        if dropped != self.dropped {
            if dropped > 0 {
                warn!(
                    "{} massive objects exceed the GPU table; dropping the last {dropped}",
                    self.objects.len()
                );
            } else {
                info!("All {} massive objects fit the GPU table again", self.objects.len());
            }
            self.dropped = dropped;
        }
        self.block = block;
        self.dirty = false;
        true
    }

    pub fn hole(&self) -> &BlackHole {
        &self.hole
    }

    pub fn objects(&self) -> &[MassiveObject] {
        &self.objects
    }

    pub fn grid(&self) -> &WarpGrid {
        &self.grid
    }

    pub fn objects_block(&self) -> &ObjectsBlock {
        &self.block
    }

    pub fn disk(&self) -> &DiskBlock {
        &self.disk
    }

    /// Objects left out of the last packed table.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl FocusRegistry for BlackHoleSystem {
    fn focus_count(&self) -> usize {
        self.objects.len()
    }

    fn focus_point(&self, index: usize) -> Option<FocusPoint> {
        self.objects.get(index).map(|object| FocusPoint {
            position: object.position.as_vec3(),
            radius: object.radius as f32,
        })
    }
}
