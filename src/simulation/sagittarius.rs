use glam::DVec3;

use crate::camera::OrbitCamera;
use crate::config::Config;
use crate::error::BodyError;
use crate::relativity::{BlackHole, BlackHoleSystem, MassiveObject};
use crate::simulation::trait_def::{Simulation, World};

/// Sagittarius A* with two solar-mass companions at rest.
pub struct SagittariusSimulation;

impl SagittariusSimulation {
    pub const MASS: f64 = 8.54e36;
    const COMPANION_MASS: f64 = 1.98892e30;
    const COMPANION_RADIUS: f64 = 4.0e10;
}

impl Simulation for SagittariusSimulation {
    fn key(&self) -> &str {
        "black-hole"
    }

    fn name(&self) -> &str {
        "Sagittarius A*"
    }

    fn description(&self) -> &str {
        "A supermassive black hole bending a reference grid, with two stars falling in when gravity is on"
    }

    fn build(&self, config: &Config) -> Result<World, BodyError> {
        let companions = vec![
            MassiveObject::new(
                DVec3::new(4.0e11, 0.0, 0.0),
                Self::COMPANION_RADIUS,
                [1.0, 1.0, 0.0, 1.0],
                Self::COMPANION_MASS,
            )?,
            MassiveObject::new(
                DVec3::new(0.0, 0.0, 4.0e11),
                Self::COMPANION_RADIUS,
                [1.0, 0.0, 0.0, 1.0],
                Self::COMPANION_MASS,
            )?,
        ];
        let hole = BlackHole::new(DVec3::ZERO, Self::MASS)?;
        log::debug!("black hole: mass {:.3e} kg, r_s {:.3e} m", hole.mass, hole.r_s);
        Ok(World::BlackHole(BlackHoleSystem::new(
            hole,
            companions,
            &config.grid,
            config.simulation.min_separation,
        )))
    }

    fn camera(&self, config: &Config) -> OrbitCamera {
        OrbitCamera::black_hole(&config.camera, 6.34194e10)
    }

    fn time_scale(&self, config: &Config) -> f64 {
        config.simulation.black_hole_time_scale
    }
}
