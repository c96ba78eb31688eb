//! Direct-summation Newtonian gravity.
//!
//! Every step first computes all accelerations from the positions at the
//! start of the step and kicks the velocities, then drifts every position
//! with its new velocity (semi-implicit Euler). Pairs closer than the
//! minimum separation exert no force on each other for that step.
//!
//! Satellites are not part of the N-body set. Their relative orbit is
//! advanced with only their parent's attraction ([`advance_satellite`]), and
//! the parent's velocity is added on top as a baseline drift. Satellite to
//! satellite and satellite to other-planet attraction is ignored; this is a
//! known approximation.

use glam::DVec3;

use crate::simulation::types::{G, PointMass};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GravityIntegrator {
    pub min_separation: f64,
}

impl GravityIntegrator {
    pub fn new(min_separation: f64) -> Self {
        Self { min_separation }
    }

    /// Acceleration of every body due to all others, O(n²).
    pub fn accelerations(&self, bodies: &[PointMass]) -> Vec<DVec3> {
        bodies
            .iter()
            .enumerate()
            .map(|(i, body)| {
                bodies
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .fold(DVec3::ZERO, |acc, (_, other)| {
                        acc + self.pull(body.position, other.position, other.mass)
                    })
            })
            .collect()
    }

    /// Advance every body by `dt` simulated seconds.
    pub fn step(&self, bodies: &mut [PointMass], dt: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let accelerations = self.accelerations(bodies);
        for (body, acceleration) in bodies.iter_mut().zip(&accelerations) {
            body.velocity += *acceleration * dt;
        }
        for body in bodies.iter_mut() {
            body.position += body.velocity * dt;
        }
    }

    /// Acceleration at `at` towards a mass `mass` located at `source`.
    fn pull(&self, at: DVec3, source: DVec3, mass: f64) -> DVec3 {
        let direction = source - at;
        let distance = direction.length();
        if distance.is_nan() || distance < self.min_separation {
            return DVec3::ZERO;
        }
        direction / distance * (G * mass / (distance * distance))
    }
}

/// Advance a satellite's relative orbit around its parent by `dt`.
///
/// Returns the new `(offset, relative_velocity)`.
pub fn advance_satellite(
    integrator: &GravityIntegrator,
    offset: DVec3,
    relative_velocity: DVec3,
    parent_mass: f64,
    dt: f64,
) -> (DVec3, DVec3) {
    if !(dt.is_finite() && dt > 0.0) {
        return (offset, relative_velocity);
    }
    let acceleration = integrator.pull(offset, DVec3::ZERO, parent_mass);
    let relative_velocity = relative_velocity + acceleration * dt;
    (offset + relative_velocity * dt, relative_velocity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::types::circular_speed;

    #[test]
    fn newton_third_law() {
        let integrator = GravityIntegrator::new(1.0);
        let bodies = [
            PointMass::new(DVec3::ZERO, DVec3::ZERO, 2.0e20),
            PointMass::new(DVec3::new(1.0e6, 0.0, 0.0), DVec3::ZERO, 3.0e20),
        ];
        let acc = integrator.accelerations(&bodies);
        let net = acc[0] * bodies[0].mass + acc[1] * bodies[1].mass;
        assert!(net.length() < 1e-6 * (acc[0].length() * bodies[0].mass));
        assert!(acc[0].x > 0.0 && acc[1].x < 0.0);
        let expected = G * 3.0e20 / 1.0e12;
        assert!((acc[0].x - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn positions_use_post_kick_velocity() {
        let integrator = GravityIntegrator::new(1.0);
        let mut bodies = [
            PointMass::new(DVec3::ZERO, DVec3::ZERO, 1.0e24),
            PointMass::new(DVec3::new(1.0e7, 0.0, 0.0), DVec3::ZERO, 1.0),
        ];
        let acc = integrator.accelerations(&bodies)[1];
        integrator.step(&mut bodies, 10.0);
        // Drift after kick: x += (a·dt)·dt
        let expected = 1.0e7 + acc.x * 100.0;
        assert!((bodies[1].position.x - expected).abs() < 1e-6);
    }

    #[test]
    fn close_pairs_are_skipped() {
        let integrator = GravityIntegrator::new(1.0e5);
        let mut bodies = [
            PointMass::new(DVec3::ZERO, DVec3::ZERO, 1.0e30),
            PointMass::new(DVec3::new(1.0, 0.0, 0.0), DVec3::ZERO, 1.0e30),
        ];
        integrator.step(&mut bodies, 1000.0);
        assert_eq!(bodies[0].velocity, DVec3::ZERO);
        assert_eq!(bodies[1].position, DVec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn zero_dt_is_a_no_op() {
        let integrator = GravityIntegrator::new(1.0);
        let mut bodies = [
            PointMass::new(DVec3::ZERO, DVec3::X, 1.0e20),
            PointMass::new(DVec3::new(1.0e6, 0.0, 0.0), DVec3::ZERO, 1.0e20),
        ];
        let before = bodies;
        integrator.step(&mut bodies, 0.0);
        integrator.step(&mut bodies, f64::NAN);
        assert_eq!(bodies, before);
    }

    #[test]
    fn satellite_stays_bound_to_parent() {
        let integrator = GravityIntegrator::new(1.0e5);
        let parent_mass = 5.97e24;
        let r = 3.84e8;
        let mut offset = DVec3::new(r, 0.0, 0.0);
        let mut velocity = DVec3::new(0.0, 0.0, circular_speed(parent_mass, r));
        for _ in 0..10_000 {
            (offset, velocity) = advance_satellite(&integrator, offset, velocity, parent_mass, 600.0);
        }
        let distance = offset.length();
        assert!(distance > 0.95 * r && distance < 1.05 * r, "distance {distance}");
    }
}
