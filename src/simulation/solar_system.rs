use std::f64::consts::TAU;

use glam::{DVec3, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::camera::OrbitCamera;
use crate::config::Config;
use crate::error::BodyError;
use crate::simulation::body::{Orbit, PlanetParams, RingParams, SatelliteParams, StarParams};
use crate::simulation::scene::Scene;
use crate::simulation::trait_def::{Simulation, World};

/// Orbital and physical data for one planet.
struct PlanetData {
    name: &'static str,
    distance: f64, // m
    mass: f64,     // kg
    radius: f64,   // m
    color: Vec3,
    rotation_speed: f64, // rad/s, negative is retrograde
    orbital_speed: f64,  // m/s
    inclination: f64,    // rad
}

// Source: NASA planetary fact sheets
const PLANETS: [PlanetData; 8] = [
    PlanetData {
        name: "Mercury",
        distance: 5.79e10,
        mass: 3.30e23,
        radius: 2.44e6,
        color: Vec3::new(0.7, 0.7, 0.7),
        rotation_speed: 1.24e-6,
        orbital_speed: 47_360.0,
        inclination: 0.1222,
    },
    PlanetData {
        name: "Venus",
        distance: 1.082e11,
        mass: 4.87e24,
        radius: 6.05e6,
        color: Vec3::new(0.9, 0.7, 0.4),
        rotation_speed: -2.99e-7,
        orbital_speed: 35_020.0,
        inclination: 0.0592,
    },
    PlanetData {
        name: "Earth",
        distance: 1.496e11,
        mass: 5.97e24,
        radius: 6.37e6,
        color: Vec3::new(0.2, 0.5, 1.0),
        rotation_speed: 7.29e-5,
        orbital_speed: 29_780.0,
        inclination: 0.0,
    },
    PlanetData {
        name: "Mars",
        distance: 2.279e11,
        mass: 6.39e23,
        radius: 3.39e6,
        color: Vec3::new(0.9, 0.3, 0.2),
        rotation_speed: 7.08e-5,
        orbital_speed: 24_070.0,
        inclination: 0.0323,
    },
    PlanetData {
        name: "Jupiter",
        distance: 7.785e11,
        mass: 1.89e27,
        radius: 6.99e7,
        color: Vec3::new(0.8, 0.7, 0.6),
        rotation_speed: 1.76e-4,
        orbital_speed: 13_070.0,
        inclination: 0.0227,
    },
    PlanetData {
        name: "Saturn",
        distance: 1.433e12,
        mass: 5.68e26,
        radius: 5.82e7,
        color: Vec3::new(0.9, 0.8, 0.5),
        rotation_speed: 1.63e-4,
        orbital_speed: 9_680.0,
        inclination: 0.0435,
    },
    PlanetData {
        name: "Uranus",
        distance: 2.871e12,
        mass: 8.68e25,
        radius: 2.53e7,
        color: Vec3::new(0.6, 0.8, 0.9),
        rotation_speed: -1.04e-4,
        orbital_speed: 6_800.0,
        inclination: 0.0134,
    },
    PlanetData {
        name: "Neptune",
        distance: 4.495e12,
        mass: 1.02e26,
        radius: 2.46e7,
        color: Vec3::new(0.3, 0.5, 0.9),
        rotation_speed: 1.08e-4,
        orbital_speed: 5_430.0,
        inclination: 0.0309,
    },
];

pub(crate) const SUN_MASS: f64 = 1.989e30;
pub(crate) const SUN_RADIUS: f64 = 6.96e8;

pub(crate) fn sun() -> StarParams {
    StarParams {
        position: DVec3::ZERO,
        velocity: DVec3::ZERO,
        mass: SUN_MASS,
        radius: SUN_RADIUS,
        color: Vec3::new(1.0, 0.7, 0.3),
        brightness: 2.0,
    }
}

pub(crate) fn moon() -> SatelliteParams {
    SatelliteParams {
        orbit: Orbit::new(3.84e8, 1022.0, 0.0),
        mass: 7.34e22,
        radius: 1.73e6,
        color: Vec3::splat(0.7),
        rotation_speed: 0.0,
    }
}

/// Starting phase for each planet: all aligned on +X, or spread with a
/// seeded generator.
pub(crate) fn phases(config: &Config, count: usize) -> Vec<f64> {
    if config.simulation.randomize_phases {
        let mut rng = StdRng::seed_from_u64(config.simulation.seed);
        (0..count).map(|_| rng.gen_range(0.0..TAU)).collect()
    } else {
        vec![0.0; count]
    }
}

/// The Sun, the eight planets, the Moon and Saturn's ring.
pub struct SolarSystemSimulation;

impl Simulation for SolarSystemSimulation {
    fn key(&self) -> &str {
        "solar"
    }

    fn name(&self) -> &str {
        "Solar System"
    }

    fn description(&self) -> &str {
        "The Sun and the eight planets with real masses, distances and orbital speeds"
    }

    fn build(&self, config: &Config) -> Result<World, BodyError> {
        let mut scene = Scene::new(config.trail.clone(), config.simulation.min_separation);
        scene.create_star(sun())?;

        let phases = phases(config, PLANETS.len());
        for (planet, phase) in PLANETS.iter().zip(phases) {
            let id = scene.create_planet(PlanetParams {
                orbit: Orbit::new(planet.distance, planet.orbital_speed, planet.inclination).with_phase(phase),
                mass: planet.mass,
                radius: planet.radius,
                color: planet.color,
                rotation_speed: planet.rotation_speed,
            })?;
            log::debug!("{} is {:?}", planet.name, id);

            match planet.name {
                "Earth" => {
                    scene.create_satellite(id, moon())?;
                }
                "Saturn" => scene.attach_ring(
                    id,
                    RingParams {
                        distance: 7.0e7,
                        thickness: 6.5e7,
                        inclination: 0.45,
                        color: Vec3::new(0.8, 0.7, 0.5),
                    },
                )?,
                _ => {}
            }
        }

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
    use crate::simulation::body::BodyKind;

    fn scene(config: &Config) -> Scene {
        match SolarSystemSimulation.build(config).unwrap() {
            World::Solar(scene) => scene,
            World::BlackHole(_) => panic!("expected a solar scene"),
        }
    }

    #[test]
    fn builds_the_sun_eight_planets_and_the_moon() {
        let scene = scene(&Config::default());
        assert_eq!(scene.len(), 10);
        // Satellites are not integrated
        assert_eq!(scene.integration_set().len(), 9);
        assert_eq!(scene.registry().len(), 10);
        let satellites: Vec<_> = scene.iter().filter(|(_, b)| b.kind() == BodyKind::Satellite).collect();
        assert_eq!(satellites.len(), 1);
    }

    #[test]
    fn saturn_carries_the_ring() {
        let scene = scene(&Config::default());
        let ringed: Vec<_> = scene.iter().filter(|(_, b)| !b.rings().is_empty()).collect();
        assert_eq!(ringed.len(), 1);
        assert_eq!(ringed[0].1.mass, 5.68e26);
    }

    #[test]
    fn seeded_phases_are_reproducible() {
        let mut config = Config::default();
        config.simulation.randomize_phases = true;
        let first = phases(&config, 8);
        assert_eq!(first, phases(&config, 8));
        assert!(first.iter().all(|p| (0.0..TAU).contains(p)));
        config.simulation.randomize_phases = false;
        assert!(phases(&config, 8).iter().all(|&p| p == 0.0));
    }
}
