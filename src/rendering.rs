mod frame;
mod render_config;
mod renderer;

pub use frame::{FrameData, Globals, LensingFrame, LineVertex, MeshBatch, MeshDraw, MeshInstance, apparent_radius};
pub use renderer::Renderer;
