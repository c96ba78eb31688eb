use glam::DVec3;

use crate::error::BodyError;
use crate::relativity::grid::schwarzschild_radius;
use crate::relativity::objects::MassiveObject;
use crate::simulation::body::{finite, validate};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BlackHole {
    pub position: DVec3,
    pub mass: f64,
    pub r_s: f64,
}

impl BlackHole {
    pub fn new(position: DVec3, mass: f64) -> Result<Self, BodyError> {
        let r_s = schwarzschild_radius(mass);
        validate("black hole", mass, r_s)?;
        finite("black hole", "position", position)?;
        Ok(Self { position, mass, r_s })
    }

    /// True when `point` lies strictly inside the event horizon.
    pub fn intercepts(&self, point: DVec3) -> bool {
        point.distance_squared(self.position) < self.r_s * self.r_s
    }

    /// The hole as an entry of the massive-object table: black, with its
    /// horizon as the drawn radius.
    pub fn as_object(&self) -> MassiveObject {
        MassiveObject {
            position: self.position,
            velocity: DVec3::ZERO,
            radius: self.r_s,
            color: [0.0, 0.0, 0.0, 1.0],
            mass: self.mass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sagittarius_horizon() {
        let hole = BlackHole::new(DVec3::ZERO, 8.54e36).unwrap();
        assert!((hole.r_s - 1.2685e10).abs() / 1.2685e10 < 1e-3, "r_s = {}", hole.r_s);
    }

    #[test]
    fn intercepts_inside_horizon_only() {
        let hole = BlackHole::new(DVec3::new(1.0e9, 0.0, 0.0), 8.54e36).unwrap();
        assert!(hole.intercepts(DVec3::new(1.0e9, 1.0e9, 0.0)));
        assert!(!hole.intercepts(DVec3::new(1.0e9 + hole.r_s, 0.0, 0.0)));
        assert!(!hole.intercepts(DVec3::new(0.0, 0.0, 2.0e10)));
    }

    #[test]
    fn non_positive_mass_has_no_horizon() {
        assert!(matches!(
            BlackHole::new(DVec3::ZERO, -5.0),
            Err(BodyError::InvalidMass { kind: "black hole", .. })
        ));
        assert!(matches!(BlackHole::new(DVec3::ZERO, 0.0), Err(BodyError::InvalidMass { .. })));
        assert!(BlackHole::new(DVec3::ZERO, f64::INFINITY).is_err());
    }
}
