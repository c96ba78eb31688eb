use std::path::PathBuf;

use thiserror::Error;

use crate::simulation::BodyId;

/// Rejected body parameters or an invalid scene operation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BodyError {
    #[error("{kind} mass must be positive and finite, got {value}")]
    InvalidMass { kind: &'static str, value: f64 },

    #[error("{kind} radius must be positive and finite, got {value}")]
    InvalidRadius { kind: &'static str, value: f64 },

    #[error("{kind} {field} must be finite")]
    NonFinite { kind: &'static str, field: &'static str },

    #[error("ring {field} must be positive and finite, got {value}")]
    InvalidRing { field: &'static str, value: f64 },

    #[error("no body with id {0:?}")]
    UnknownBody(BodyId),

    #[error("body {0:?} is not a planet")]
    NotAPlanet(BodyId),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
