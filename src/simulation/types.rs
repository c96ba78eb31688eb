use glam::DVec3;

// Physical constants (SI)
pub const G: f64 = 6.674_30e-11; // m^3 kg^-1 s^-2
pub const C: f64 = 299_792_458.0; // m/s

/// The state the gravity integrator advances: a position, a velocity and a mass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointMass {
    pub position: DVec3,
    pub velocity: DVec3,
    pub mass: f64,
}

impl PointMass {
    pub fn new(position: DVec3, velocity: DVec3, mass: f64) -> Self {
        Self {
            position,
            velocity,
            mass,
        }
    }
}

/// Speed of a circular orbit at distance `r` around a primary of `mass`.
pub fn circular_speed(mass: f64, r: f64) -> f64 {
    (G * mass / r).sqrt()
}
