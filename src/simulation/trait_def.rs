use crate::camera::{FocusPoint, FocusRegistry, OrbitCamera};
use crate::config::Config;
use crate::error::BodyError;
use crate::relativity::BlackHoleSystem;
use crate::simulation::scene::Scene;

/// Everything a scenario builds: either a classical scene or a black hole
/// with its companions.
#[derive(Debug)]
pub enum World {
    Solar(Scene),
    BlackHole(BlackHoleSystem),
}

impl World {
    pub fn is_black_hole(&self) -> bool {
        matches!(self, World::BlackHole(_))
    }
}

impl FocusRegistry for World {
    fn focus_count(&self) -> usize {
        match self {
            World::Solar(scene) => scene.focus_count(),
            World::BlackHole(system) => system.focus_count(),
        }
    }

    fn focus_point(&self, index: usize) -> Option<FocusPoint> {
        match self {
            World::Solar(scene) => scene.focus_point(index),
            World::BlackHole(system) => system.focus_point(index),
        }
    }
}

/// A trait that defines the interface for all simulation scenarios
pub trait Simulation {
    /// Short identifier, as accepted on the command line
    fn key(&self) -> &str;

    /// Name of the simulation
    fn name(&self) -> &str;

    /// Description of the simulation
    fn description(&self) -> &str;

    /// Build the bodies of this scenario
    fn build(&self, config: &Config) -> Result<World, BodyError>;

    /// The camera this scenario starts with
    fn camera(&self, config: &Config) -> OrbitCamera;

    /// Simulated seconds per real second
    fn time_scale(&self, config: &Config) -> f64;
}
