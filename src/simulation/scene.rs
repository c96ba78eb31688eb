use glam::DVec3;

use crate::camera::{FocusPoint, FocusRegistry};
use crate::config::TrailConfig;
use crate::error::BodyError;
use crate::simulation::body::{
    Body, BodyDetails, BodyId, BodyKind, PlanetParams, Ring, RingParams, SatelliteParams, StarParams,
};
use crate::simulation::gravity::{GravityIntegrator, advance_satellite};
use crate::simulation::trail::OrbitSample;
use crate::simulation::types::PointMass;

/// Integration handle: which body, the velocity the integrator owns, and the mass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CelestialBody {
    pub id: BodyId,
    pub velocity: DVec3,
    pub mass: f64,
}

/// Focus-registry entry. Positions are always read through the id.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RegistryEntry {
    pub id: BodyId,
    pub radius: f64,
    pub kind: BodyKind,
}

/// Arena of individually boxed bodies addressed by [`BodyId`].
///
/// Slots are never reused, so an id taken before a removal can only ever
/// resolve to its own body or to nothing.
#[derive(Debug)]
pub struct Scene {
    slots: Vec<Option<Box<Body>>>,
    registry: Vec<RegistryEntry>,
    integration: Vec<CelestialBody>,
    integrator: GravityIntegrator,
    trail_config: TrailConfig,
}

impl Scene {
    pub fn new(trail_config: TrailConfig, min_separation: f64) -> Self {
        Self {
            slots: Vec::new(),
            registry: Vec::new(),
            integration: Vec::new(),
            integrator: GravityIntegrator::new(min_separation),
            trail_config,
        }
    }

    pub fn create_star(&mut self, params: StarParams) -> Result<BodyId, BodyError> {
        let body = Body::star(params, &self.trail_config)?;
        Ok(self.insert(body))
    }

    /// Planets orbit the first star, or the origin when there is none.
    pub fn create_planet(&mut self, params: PlanetParams) -> Result<BodyId, BodyError> {
        let (position, velocity) = self
            .primary()
            .and_then(|id| self.get(id))
            .map_or((DVec3::ZERO, DVec3::ZERO), |star| (star.position, star.velocity));
        let body = Body::planet(params, position, velocity, &self.trail_config)?;
        Ok(self.insert(body))
    }

    pub fn create_satellite(&mut self, parent: BodyId, params: SatelliteParams) -> Result<BodyId, BodyError> {
        let parent_body = self.get(parent).ok_or(BodyError::UnknownBody(parent))?;
        if parent_body.kind() != BodyKind::Planet {
            return Err(BodyError::NotAPlanet(parent));
        }
        let body = Body::satellite(params, parent, parent_body, &self.trail_config)?;
        let id = self.insert(body);
        if let Some(BodyDetails::Planet { satellites, .. }) = self.get_mut(parent).map(|p| &mut p.details) {
            satellites.push(id);
        }
        Ok(id)
    }

    pub fn attach_ring(&mut self, planet: BodyId, params: RingParams) -> Result<(), BodyError> {
        let body = self.get_mut(planet).ok_or(BodyError::UnknownBody(planet))?;
        let BodyDetails::Planet { rings, .. } = &mut body.details else {
            return Err(BodyError::NotAPlanet(planet));
        };
        rings.push(Ring::new(params)?);
        Ok(())
    }

    /// Remove a body; a planet takes its satellites with it.
    pub fn remove_body(&mut self, id: BodyId) -> Result<Body, BodyError> {
        let body = self
            .slots
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(BodyError::UnknownBody(id))?;

        if let BodyDetails::Planet { satellites, .. } = &body.details {
            for &satellite in satellites {
                if let Some(slot) = self.slots.get_mut(satellite.0) {
                    slot.take();
                }
            }
        }
        if let BodyDetails::Satellite { parent, .. } = body.details {
            if let Some(BodyDetails::Planet { satellites, .. }) = self.get_mut(parent).map(|p| &mut p.details) {
                satellites.retain(|&s| s != id);
            }
        }

        let slots = &self.slots;
        self.registry.retain(|entry| slots[entry.id.0].is_some());
        self.integration.retain(|handle| slots[handle.id.0].is_some());
        log::debug!("removed {} {:?}", body.kind().name(), id);
        Ok(*body)
    }

    fn insert(&mut self, body: Body) -> BodyId {
        let id = BodyId(self.slots.len());
        log::debug!(
            "created {} {:?}: mass {:.3e} kg, radius {:.3e} m",
            body.kind().name(),
            id,
            body.mass,
            body.radius
        );
        self.registry.push(RegistryEntry {
            id,
            radius: body.radius,
            kind: body.kind(),
        });
        self.slots.push(Some(Box::new(body)));
        id
    }

    /// Rebuild the N-body integration set from the current stars and planets.
    pub fn set_simulation(&mut self) {
        self.integration = self
            .iter()
            .filter(|(_, body)| body.kind() != BodyKind::Satellite)
            .map(|(id, body)| CelestialBody {
                id,
                velocity: body.velocity,
                mass: body.mass,
            })
            .collect();
        log::debug!("integration set rebuilt with {} bodies", self.integration.len());
    }

    /// Advance the scene by `dt` simulated seconds: N-body step for stars and
    /// planets, then the satellites' relative orbits, then spin.
    pub fn step(&mut self, dt: f64) {
        let mut state: Vec<PointMass> = self
            .integration
            .iter()
            .map(|handle| {
                let position = self.slots[handle.id.0].as_ref().map_or(DVec3::ZERO, |b| b.position);
                PointMass::new(position, handle.velocity, handle.mass)
            })
            .collect();
        self.integrator.step(&mut state, dt);

        for (handle, point) in self.integration.iter_mut().zip(&state) {
            if let Some(body) = self.slots[handle.id.0].as_mut() {
                handle.velocity = point.velocity;
                body.position = point.position;
                body.velocity = point.velocity;
            }
        }

        self.step_satellites(dt);

        for body in self.slots.iter_mut().flatten() {
            match &mut body.details {
                BodyDetails::Planet { rotation, .. } | BodyDetails::Satellite { rotation, .. } => rotation.advance(dt),
                BodyDetails::Star { .. } => {}
            }
        }
    }

    fn step_satellites(&mut self, dt: f64) {
        for index in 0..self.slots.len() {
            let Some(parent_id) = self.slots[index].as_ref().and_then(|b| b.parent()) else {
                continue;
            };
            let Some((parent_position, parent_velocity, parent_mass)) =
                self.get(parent_id).map(|p| (p.position, p.velocity, p.mass))
            else {
                continue;
            };
            let integrator = self.integrator;
            let Some(body) = self.slots[index].as_mut() else {
                continue;
            };
            if let BodyDetails::Satellite {
                offset,
                relative_velocity,
                ..
            } = &mut body.details
            {
                (*offset, *relative_velocity) =
                    advance_satellite(&integrator, *offset, *relative_velocity, parent_mass, dt);
                body.position = parent_position + *offset;
                body.velocity = parent_velocity + *relative_velocity;
            }
        }
    }

    /// Offer every body's current position to its trail.
    ///
    /// Runs after [`step`](Self::step) so all trails see the same tick.
    pub fn sample_trails(&mut self, sim_time: f64) {
        let primary = self.primary().and_then(|id| self.get(id)).map(|s| (s.position, s.velocity));
        let samples: Vec<Option<OrbitSample>> = self
            .slots
            .iter()
            .map(|slot| {
                let body = slot.as_ref()?;
                match &body.details {
                    BodyDetails::Star { .. } => None,
                    BodyDetails::Planet { .. } => primary.map(|(position, velocity)| OrbitSample {
                        distance: body.position.distance(position),
                        speed: (body.velocity - velocity).length(),
                    }),
                    BodyDetails::Satellite {
                        offset,
                        relative_velocity,
                        ..
                    } => Some(OrbitSample {
                        distance: offset.length(),
                        speed: relative_velocity.length(),
                    }),
                }
            })
            .collect();

        for (slot, sample) in self.slots.iter_mut().zip(samples) {
            if let Some(body) = slot.as_mut() {
                let position = body.position;
                body.trail.on_tick(position, sample, sim_time);
            }
        }
    }

    /// Clear all trails so capacities are re-estimated from the current orbits.
    pub fn retarget_trails(&mut self) {
        for body in self.slots.iter_mut().flatten() {
            body.trail.retarget();
        }
    }

    /// The first live star, the primary planets orbit and sample against.
    pub fn primary(&self) -> Option<BodyId> {
        self.iter().find(|(_, b)| b.kind() == BodyKind::Star).map(|(id, _)| id)
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.slots.get(id.0)?.as_deref()
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.slots.get_mut(id.0)?.as_deref_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_deref().map(|body| (BodyId(index), body)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn registry(&self) -> &[RegistryEntry] {
        &self.registry
    }

    pub fn integration_set(&self) -> &[CelestialBody] {
        &self.integration
    }
}

impl FocusRegistry for Scene {
    fn focus_count(&self) -> usize {
        self.registry.len()
    }

    fn focus_point(&self, index: usize) -> Option<FocusPoint> {
        let entry = self.registry.get(index)?;
        let body = self.get(entry.id)?;
        Some(FocusPoint {
            position: body.position.as_vec3(),
            radius: entry.radius as f32,
        })
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::simulation::body::Orbit;

    fn scene() -> Scene {
        Scene::new(TrailConfig::default(), 1.0e5)
    }

    fn sun() -> StarParams {
        StarParams {
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            mass: 1.989e30,
            radius: 6.96e8,
            color: Vec3::ONE,
            brightness: 2.0,
        }
    }

    fn earth() -> PlanetParams {
        PlanetParams {
            orbit: Orbit::new(1.496e11, 29_780.0, 0.0),
            mass: 5.97e24,
            radius: 6.37e6,
            color: Vec3::new(0.2, 0.5, 1.0),
            rotation_speed: 7.29e-5,
        }
    }

    fn moon() -> SatelliteParams {
        SatelliteParams {
            orbit: Orbit::new(3.84e8, 1022.0, 0.0),
            mass: 7.34e22,
            radius: 1.73e6,
            color: Vec3::splat(0.7),
            rotation_speed: 0.0,
        }
    }

    #[test]
    fn registry_tracks_creation_order() {
        let mut scene = scene();
        let sun = scene.create_star(sun()).unwrap();
        let earth = scene.create_planet(earth()).unwrap();
        let moon = scene.create_satellite(earth, moon()).unwrap();
        let ids: Vec<BodyId> = scene.registry().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![sun, earth, moon]);
        assert_eq!(scene.focus_count(), 3);
    }

    #[test]
    fn invalid_bodies_never_enter_registry() {
        let mut scene = scene();
        let mut params = sun();
        params.mass = -1.0;
        assert!(scene.create_star(params).is_err());
        assert!(scene.registry().is_empty());
        assert!(scene.is_empty());
    }

    #[test]
    fn satellites_need_a_planet_parent() {
        let mut scene = scene();
        let sun = scene.create_star(sun()).unwrap();
        assert_eq!(scene.create_satellite(sun, moon()), Err(BodyError::NotAPlanet(sun)));
        assert_eq!(
            scene.create_satellite(BodyId(99), moon()),
            Err(BodyError::UnknownBody(BodyId(99)))
        );
        assert!(scene.attach_ring(sun, RingParams {
            distance: 1.0,
            thickness: 1.0,
            inclination: 0.0,
            color: Vec3::ONE,
        })
        .is_err());
    }

    #[test]
    fn satellites_are_not_integrated() {
        let mut scene = scene();
        scene.create_star(sun()).unwrap();
        let earth = scene.create_planet(earth()).unwrap();
        scene.create_satellite(earth, moon()).unwrap();
        scene.set_simulation();
        assert_eq!(scene.integration_set().len(), 2);
    }

    #[test]
    fn satellite_moves_with_parent() {
        let mut scene = scene();
        scene.create_star(sun()).unwrap();
        let earth = scene.create_planet(earth()).unwrap();
        let moon = scene.create_satellite(earth, moon()).unwrap();
        scene.set_simulation();
        for _ in 0..100 {
            scene.step(3600.0);
        }
        let earth_pos = scene.get(earth).unwrap().position;
        let moon_body = scene.get(moon).unwrap();
        let separation = moon_body.position.distance(earth_pos);
        assert!((separation - 3.84e8).abs() < 0.05 * 3.84e8);
        assert!(earth_pos.z > 1.0e9);
    }

    #[test]
    fn removing_planet_removes_satellites_and_handles() {
        let mut scene = scene();
        let sun = scene.create_star(sun()).unwrap();
        let earth = scene.create_planet(earth()).unwrap();
        let moon = scene.create_satellite(earth, moon()).unwrap();
        scene.set_simulation();

        scene.remove_body(earth).unwrap();
        assert!(scene.get(moon).is_none());
        assert_eq!(scene.registry().len(), 1);
        assert_eq!(scene.integration_set().len(), 1);
        assert_eq!(scene.integration_set()[0].id, sun);
        // Stale id stays dead
        assert!(scene.remove_body(earth).is_err());
        scene.step(60.0);
    }

    #[test]
    fn rings_attach_to_planets() {
        let mut scene = scene();
        let saturn = scene
            .create_planet(PlanetParams {
                orbit: Orbit::new(1.433e12, 9680.0, 0.0435),
                mass: 5.68e26,
                radius: 5.82e7,
                color: Vec3::ONE,
                rotation_speed: 1.63e-4,
            })
            .unwrap();
        scene
            .attach_ring(saturn, RingParams {
                distance: 7.0e7,
                thickness: 6.5e7,
                inclination: 0.45,
                color: Vec3::ONE,
            })
            .unwrap();
        assert_eq!(scene.get(saturn).unwrap().rings().len(), 1);
    }

    #[test]
    fn moon_trail_spans_one_lunar_orbit() {
        use crate::config::Config;
        use crate::simulation::earth_moon::EarthMoonSimulation;
        use crate::simulation::trait_def::{Simulation, World};

        let config = Config::default();
        let World::Solar(mut scene) = EarthMoonSimulation.build(&config).unwrap() else {
            panic!("expected a solar scene");
        };
        let dt = 3600.0;
        let mut sim_time = 0.0;
        for _ in 0..2000 {
            scene.step(dt);
            sim_time += dt;
            scene.sample_trails(sim_time);
        }

        let interval = config.trail.sample_interval;
        let cap_of = |kind: BodyKind| {
            scene
                .iter()
                .find(|(_, body)| body.kind() == kind)
                .map(|(_, body)| body.trail.capacity())
                .unwrap()
        };
        // Measured against Earth, not the Sun
        let lunar = OrbitSample {
            distance: moon().orbit.distance,
            speed: moon().orbit.speed,
        };
        let expected = (lunar.period().unwrap() / interval).ceil() as usize;
        let moon_cap = cap_of(BodyKind::Satellite);
        assert!(moon_cap.abs_diff(expected) <= 1, "moon keeps {moon_cap}, expected {expected}");

        let solar = OrbitSample {
            distance: earth().orbit.distance,
            speed: earth().orbit.speed,
        };
        let earth_cap = cap_of(BodyKind::Planet);
        let year = (solar.period().unwrap() / interval).ceil() as usize;
        assert!(earth_cap.abs_diff(year) <= 1, "earth keeps {earth_cap}, expected {year}");
    }
}
