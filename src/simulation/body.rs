use glam::{DVec3, Mat4, Quat, Vec3};

use crate::config::TrailConfig;
use crate::error::BodyError;
use crate::simulation::mesh::Mesh;
use crate::simulation::trail::OrbitTrail;

const STAR_TESSELLATION: u32 = 50;
const PLANET_TESSELLATION: u32 = 40;
const RING_SEGMENTS: u32 = 128;

/// Stable handle to a body in a [`Scene`](crate::simulation::Scene).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub(crate) usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BodyKind {
    Star,
    Planet,
    Satellite,
}

impl BodyKind {
    pub fn name(self) -> &'static str {
        match self {
            BodyKind::Star => "star",
            BodyKind::Planet => "planet",
            BodyKind::Satellite => "satellite",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Rotation {
    pub angle: f64,
    pub speed: f64, // rad per simulated second
}

impl Rotation {
    pub fn advance(&mut self, dt: f64) {
        self.angle = (self.angle + self.speed * dt).rem_euclid(std::f64::consts::TAU);
    }
}

/// Circular starting orbit: distance from the primary, inclination above the
/// reference plane, speed, and a phase angle around the vertical axis.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Orbit {
    pub distance: f64,
    pub inclination: f64,
    pub speed: f64,
    pub phase: f64,
}

impl Orbit {
    pub fn new(distance: f64, speed: f64, inclination: f64) -> Self {
        Self {
            distance,
            inclination,
            speed,
            phase: 0.0,
        }
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    /// Position relative to the primary: `(d·cos i, d·sin i, 0)` turned by `phase` about +Y.
    pub fn offset(&self) -> DVec3 {
        let base = DVec3::new(
            self.distance * self.inclination.cos(),
            self.distance * self.inclination.sin(),
            0.0,
        );
        rotate_y(base, self.phase)
    }

    /// Velocity relative to the primary: `(0, 0, v)` turned by `phase` about +Y.
    pub fn velocity(&self) -> DVec3 {
        rotate_y(DVec3::new(0.0, 0.0, self.speed), self.phase)
    }
}

fn rotate_y(v: DVec3, angle: f64) -> DVec3 {
    let (sin, cos) = angle.sin_cos();
    DVec3::new(v.x * cos + v.z * sin, v.y, -v.x * sin + v.z * cos)
}

#[derive(Debug, Clone, PartialEq)]
pub struct StarParams {
    pub position: DVec3,
    pub velocity: DVec3,
    pub mass: f64,
    pub radius: f64,
    pub color: Vec3,
    pub brightness: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanetParams {
    pub orbit: Orbit,
    pub mass: f64,
    pub radius: f64,
    pub color: Vec3,
    pub rotation_speed: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteParams {
    pub orbit: Orbit,
    pub mass: f64,
    pub radius: f64,
    pub color: Vec3,
    pub rotation_speed: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RingParams {
    pub distance: f64,
    pub thickness: f64,
    pub inclination: f64,
    pub color: Vec3,
}

/// Decorative ring around a planet. Never integrated.
#[derive(Debug, Clone)]
pub struct Ring {
    pub distance: f64,
    pub thickness: f64,
    pub inclination: f64,
    pub color: Vec3,
    pub mesh: Mesh,
}

impl Ring {
    pub fn new(params: RingParams) -> Result<Self, BodyError> {
        for (field, value) in [("distance", params.distance), ("thickness", params.thickness)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(BodyError::InvalidRing { field, value });
            }
        }
        if !params.inclination.is_finite() {
            return Err(BodyError::NonFinite {
                kind: "ring",
                field: "inclination",
            });
        }
        let inner = (params.distance - params.thickness * 0.5).max(0.0);
        let outer = params.distance + params.thickness * 0.5;
        Ok(Self {
            distance: params.distance,
            thickness: params.thickness,
            inclination: params.inclination,
            color: params.color,
            mesh: Mesh::annulus(inner as f32, outer as f32, RING_SEGMENTS),
        })
    }

    /// Ring transform around the parent at `center`, tilted about the X axis.
    pub fn model_matrix(&self, center: Vec3) -> Mat4 {
        Mat4::from_translation(center) * Mat4::from_rotation_x(self.inclination as f32)
    }
}

#[derive(Debug, Clone)]
pub enum BodyDetails {
    Star {
        brightness: f32,
    },
    Planet {
        rotation: Rotation,
        rings: Vec<Ring>,
        satellites: Vec<BodyId>,
    },
    Satellite {
        rotation: Rotation,
        parent: BodyId,
        /// Position relative to the parent.
        offset: DVec3,
        /// Velocity relative to the parent.
        relative_velocity: DVec3,
    },
}

/// A star, planet or satellite owned by the scene.
#[derive(Debug, Clone)]
pub struct Body {
    pub position: DVec3,
    pub velocity: DVec3,
    pub mass: f64,
    pub radius: f64,
    pub color: Vec3,
    pub mesh: Mesh,
    pub trail: OrbitTrail,
    pub details: BodyDetails,
}

impl Body {
    pub fn star(params: StarParams, trail: &TrailConfig) -> Result<Self, BodyError> {
        validate(BodyKind::Star.name(), params.mass, params.radius)?;
        finite(BodyKind::Star.name(), "position", params.position)?;
        finite(BodyKind::Star.name(), "velocity", params.velocity)?;
        Ok(Self {
            position: params.position,
            velocity: params.velocity,
            mass: params.mass,
            radius: params.radius,
            color: params.color,
            mesh: Mesh::uv_sphere(params.radius as f32, STAR_TESSELLATION, STAR_TESSELLATION),
            trail: OrbitTrail::fixed(trail),
            details: BodyDetails::Star {
                brightness: params.brightness,
            },
        })
    }

    /// A planet orbiting a primary located at `primary_position` moving with `primary_velocity`.
    pub fn planet(
        params: PlanetParams,
        primary_position: DVec3,
        primary_velocity: DVec3,
        trail: &TrailConfig,
    ) -> Result<Self, BodyError> {
        validate(BodyKind::Planet.name(), params.mass, params.radius)?;
        check_orbit(BodyKind::Planet.name(), &params.orbit, params.rotation_speed)?;
        Ok(Self {
            position: primary_position + params.orbit.offset(),
            velocity: primary_velocity + params.orbit.velocity(),
            mass: params.mass,
            radius: params.radius,
            color: params.color,
            mesh: Mesh::uv_sphere(params.radius as f32, PLANET_TESSELLATION, PLANET_TESSELLATION),
            trail: OrbitTrail::periodic(trail),
            details: BodyDetails::Planet {
                rotation: Rotation {
                    angle: 0.0,
                    speed: params.rotation_speed,
                },
                rings: Vec::new(),
                satellites: Vec::new(),
            },
        })
    }

    pub fn satellite(params: SatelliteParams, parent_id: BodyId, parent: &Body, trail: &TrailConfig) -> Result<Self, BodyError> {
        validate(BodyKind::Satellite.name(), params.mass, params.radius)?;
        check_orbit(BodyKind::Satellite.name(), &params.orbit, params.rotation_speed)?;
        let offset = params.orbit.offset();
        let relative_velocity = params.orbit.velocity();
        Ok(Self {
            position: parent.position + offset,
            velocity: parent.velocity + relative_velocity,
            mass: params.mass,
            radius: params.radius,
            color: params.color,
            mesh: Mesh::uv_sphere(params.radius as f32, PLANET_TESSELLATION, PLANET_TESSELLATION),
            trail: OrbitTrail::periodic(trail),
            details: BodyDetails::Satellite {
                rotation: Rotation {
                    angle: 0.0,
                    speed: params.rotation_speed,
                },
                parent: parent_id,
                offset,
                relative_velocity,
            },
        })
    }

    pub fn kind(&self) -> BodyKind {
        match self.details {
            BodyDetails::Star { .. } => BodyKind::Star,
            BodyDetails::Planet { .. } => BodyKind::Planet,
            BodyDetails::Satellite { .. } => BodyKind::Satellite,
        }
    }

    pub fn rotation(&self) -> Option<Rotation> {
        match &self.details {
            BodyDetails::Star { .. } => None,
            BodyDetails::Planet { rotation, .. } | BodyDetails::Satellite { rotation, .. } => Some(*rotation),
        }
    }

    pub fn rings(&self) -> &[Ring] {
        match &self.details {
            BodyDetails::Planet { rings, .. } => rings,
            _ => &[],
        }
    }

    pub fn parent(&self) -> Option<BodyId> {
        match self.details {
            BodyDetails::Satellite { parent, .. } => Some(parent),
            _ => None,
        }
    }

    /// Translation × rotation about Y × uniform scale.
    pub fn model_matrix(&self, scale: f32) -> Mat4 {
        let angle = self.rotation().map_or(0.0, |r| r.angle as f32);
        Mat4::from_scale_rotation_translation(
            Vec3::splat(scale),
            Quat::from_rotation_y(angle),
            self.position.as_vec3(),
        )
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

/// Mass and radius must both be positive and finite.
pub(crate) fn validate(kind: &'static str, mass: f64, radius: f64) -> Result<(), BodyError> {
    if !(mass > 0.0 && mass.is_finite()) {
        return Err(BodyError::InvalidMass { kind, value: mass });
    }
    if !(radius > 0.0 && radius.is_finite()) {
        return Err(BodyError::InvalidRadius { kind, value: radius });
    }
    Ok(())
}

pub(crate) fn finite(kind: &'static str, field: &'static str, v: DVec3) -> Result<(), BodyError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(BodyError::NonFinite { kind, field })
    }
}

fn check_orbit(kind: &'static str, orbit: &Orbit, rotation_speed: f64) -> Result<(), BodyError> {
    finite(kind, "orbit", orbit.offset())?;
    finite(kind, "orbital velocity", orbit.velocity())?;
    if !rotation_speed.is_finite() {
        return Err(BodyError::NonFinite {
            kind,
            field: "rotation speed",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trail() -> TrailConfig {
        TrailConfig::default()
    }

    fn sun() -> StarParams {
        StarParams {
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            mass: 1.989e30,
            radius: 6.96e8,
            color: Vec3::new(1.0, 0.7, 0.3),
            brightness: 2.0,
        }
    }

    #[test]
    fn rejects_non_positive_mass_and_radius() {
        let mut params = sun();
        params.mass = 0.0;
        assert!(matches!(
            Body::star(params, &trail()),
            Err(BodyError::InvalidMass { .. })
        ));

        let mut params = sun();
        params.radius = -1.0;
        assert!(matches!(
            Body::star(params, &trail()),
            Err(BodyError::InvalidRadius { .. })
        ));

        let mut params = sun();
        params.mass = f64::NAN;
        assert!(Body::star(params, &trail()).is_err());
    }

    #[test]
    fn planet_placement_follows_inclination() {
        let params = PlanetParams {
            orbit: Orbit::new(1.0e11, 3.0e4, 0.5),
            mass: 6.0e24,
            radius: 6.4e6,
            color: Vec3::ONE,
            rotation_speed: 7.29e-5,
        };
        let planet = Body::planet(params, DVec3::ZERO, DVec3::ZERO, &trail()).unwrap();
        assert!((planet.position.x - 1.0e11 * 0.5f64.cos()).abs() < 1.0);
        assert!((planet.position.y - 1.0e11 * 0.5f64.sin()).abs() < 1.0);
        assert_eq!(planet.position.z, 0.0);
        assert_eq!(planet.velocity, DVec3::new(0.0, 0.0, 3.0e4));
        assert_eq!(planet.kind(), BodyKind::Planet);
    }

    #[test]
    fn phase_keeps_velocity_perpendicular() {
        let orbit = Orbit::new(2.0, 1.0, 0.0).with_phase(1.1);
        assert!((orbit.offset().length() - 2.0).abs() < 1e-12);
        assert!(orbit.offset().dot(orbit.velocity()).abs() < 1e-12);
    }

    #[test]
    fn ring_rejects_zero_thickness() {
        let ring = Ring::new(RingParams {
            distance: 7.0e7,
            thickness: 0.0,
            inclination: 0.45,
            color: Vec3::ONE,
        });
        assert!(matches!(ring, Err(BodyError::InvalidRing { field: "thickness", .. })));
    }

    #[test]
    fn model_matrix_spins_about_y() {
        let mut planet = Body::planet(
            PlanetParams {
                orbit: Orbit::new(10.0, 1.0, 0.0),
                mass: 1.0,
                radius: 1.0,
                color: Vec3::ONE,
                rotation_speed: std::f64::consts::FRAC_PI_2,
            },
            DVec3::ZERO,
            DVec3::ZERO,
            &trail(),
        )
        .unwrap();
        if let BodyDetails::Planet { rotation, .. } = &mut planet.details {
            rotation.advance(1.0);
        }
        let moved = planet.model_matrix(2.0).transform_point3(Vec3::X);
        assert!((moved - Vec3::new(10.0, 0.0, -2.0)).length() < 1e-5, "{moved}");
    }

    #[test]
    fn rotation_wraps() {
        let mut rotation = Rotation { angle: 6.0, speed: 1.0 };
        rotation.advance(1.0);
        assert!(rotation.angle >= 0.0 && rotation.angle < std::f64::consts::TAU);
        assert!((rotation.angle - (7.0 - std::f64::consts::TAU)).abs() < 1e-12);
    }
}
