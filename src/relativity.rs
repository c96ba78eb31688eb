//! Black-hole mode: the warped reference grid and the parameter blocks fed
//! to the lensing pass.

mod black_hole;
mod grid;
mod objects;
mod system;
mod uniforms;

pub use black_hole::BlackHole;
pub use grid::{WarpGrid, schwarzschild_radius, warp_contribution};
pub use objects::{MAX_OBJECTS, MassiveObject, ObjectsBlock};
pub use system::BlackHoleSystem;
pub use uniforms::{CameraBlock, DiskBlock, lensing_extent};
