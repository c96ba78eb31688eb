pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod relativity;
pub mod rendering;
pub mod simulation;

pub use config::Config;
pub use error::{BodyError, ConfigError};
