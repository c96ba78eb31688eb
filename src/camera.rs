mod controller;
mod input;

pub use controller::{FocusPoint, FocusRegistry, Interaction, OrbitCamera, Orientation};
pub use input::{InputEvent, Key, PointerButton};
