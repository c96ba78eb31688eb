pub mod body;
pub mod earth_moon;
pub mod gravity;
pub mod manager;
pub mod mesh;
pub mod sagittarius;
pub mod scene;
pub mod solar_system;
pub mod trail;
pub mod trait_def;
pub mod types;

pub use body::{
    Body, BodyDetails, BodyId, BodyKind, Orbit, PlanetParams, Ring, RingParams, Rotation, SatelliteParams, StarParams,
};
pub use gravity::{GravityIntegrator, advance_satellite};
pub use manager::{SimulationContext, SimulationManager};
pub use mesh::Mesh;
pub use scene::{CelestialBody, RegistryEntry, Scene};
pub use trail::{OrbitSample, OrbitTrail, Retention};
pub use trait_def::{Simulation, World};
pub use types::{C, G, PointMass, circular_speed};
