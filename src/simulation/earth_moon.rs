use glam::Vec3;

use crate::camera::OrbitCamera;
use crate::config::Config;
use crate::error::BodyError;
use crate::simulation::body::{Orbit, PlanetParams};
use crate::simulation::scene::Scene;
use crate::simulation::solar_system::{moon, phases, sun};
use crate::simulation::trait_def::{Simulation, World};

// Earth-Moon system using realistic parameters
pub struct EarthMoonSimulation;

impl EarthMoonSimulation {
    const EARTH_DISTANCE: f64 = 1.496e11; // 1 AU
    const EARTH_SPEED: f64 = 29_780.0;
}

impl Simulation for EarthMoonSimulation {
    fn key(&self) -> &str {
        "earth-moon"
    }

    fn name(&self) -> &str {
        "Earth-Moon System"
    }

    fn description(&self) -> &str {
        "The Sun, Earth and the Moon with correct masses, distances, and velocities"
    }

    fn build(&self, config: &Config) -> Result<World, BodyError> {
        let mut scene = Scene::new(config.trail.clone(), config.simulation.min_separation);
        scene.create_star(sun())?;

        let phase = phases(config, 1)[0];
        let earth = scene.create_planet(PlanetParams {
            orbit: Orbit::new(Self::EARTH_DISTANCE, Self::EARTH_SPEED, 0.0).with_phase(phase),
            mass: 5.97e24,
            radius: 6.37e6,
            color: Vec3::new(0.2, 0.5, 1.0),
            rotation_speed: 7.29e-5,
        })?;
        scene.create_satellite(earth, moon())?;

        scene.set_simulation();
        Ok(World::Solar(scene))
    }

    fn camera(&self, config: &Config) -> OrbitCamera {
        OrbitCamera::solar(&config.camera, 5.0e10)
    }

    fn time_scale(&self, config: &Config) -> f64 {
        config.simulation.solar_time_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FocusRegistry;

    #[test]
    fn moon_starts_beside_earth() {
        let World::Solar(scene) = EarthMoonSimulation.build(&Config::default()).unwrap() else {
            panic!("expected a solar scene");
        };
        assert_eq!(scene.focus_count(), 3);
        let earth = scene.focus_point(1).unwrap();
        let moon = scene.focus_point(2).unwrap();
        assert!((moon.position.distance(earth.position) - 3.84e8).abs() < 1.0e5);
    }
}
