//! Runtime configuration, loadable from YAML.
//!
//! Every section and field is optional; anything left out falls back to the
//! defaults below, which reproduce the stock solar-system and black-hole
//! scenes.
//!
//! ```yaml
//! simulation:
//!   solar_time_scale: 86400.0   # simulated seconds per real second
//!   min_separation: 1.0e5       # pairs closer than this are skipped
//! trail:
//!   sample_interval: 86400.0    # one sample per simulated day
//! camera:
//!   focus_distance_multiple: 10.0
//! grid:
//!   size: 25
//!   spacing: 1.0e10
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub trail: TrailConfig,
    pub camera: CameraConfig,
    pub grid: GridConfig,
    pub lensing: LensingConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub solar_time_scale: f64,
    pub black_hole_time_scale: f64,
    pub min_separation: f64,
    /// Upper bound on the wall-clock delta fed into a single tick.
    pub max_frame_seconds: f64,
    pub seed: u64,
    pub randomize_phases: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            solar_time_scale: 86_400.0,
            black_hole_time_scale: 100.0,
            min_separation: 1.0e5,
            max_frame_seconds: 0.1,
            seed: 42,
            randomize_phases: false,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrailConfig {
    /// Simulation seconds between two recorded samples.
    pub sample_interval: f64,
    pub star_capacity: usize,
    pub max_capacity: usize,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            sample_interval: 86_400.0,
            star_capacity: 1000,
            max_capacity: 100_000,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub yaw_pitch_sensitivity: f32,
    pub pitch_limit_deg: f32,
    pub orbit_speed: f32,
    pub elevation_epsilon: f32,
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
    pub pan_scale: f32,
    pub solar_min_distance: f32,
    pub solar_max_distance: f32,
    pub black_hole_min_radius: f32,
    pub black_hole_max_radius: f32,
    pub focus_distance_multiple: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            yaw_pitch_sensitivity: 0.2,
            pitch_limit_deg: 89.0,
            orbit_speed: 0.01,
            elevation_epsilon: 0.01,
            zoom_in_factor: 0.9,
            zoom_out_factor: 1.1,
            pan_scale: 0.001,
            solar_min_distance: 6.5e6,
            solar_max_distance: 1.0e14,
            black_hole_min_radius: 1.0e10,
            black_hole_max_radius: 1.0e12,
            focus_distance_multiple: 10.0,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    /// Cells per side; the lattice has `size + 1` vertices per side.
    pub size: u32,
    pub spacing: f64,
    pub baseline_offset: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 25,
            spacing: 1.0e10,
            baseline_offset: 3.0e10,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LensingConfig {
    pub compute_width: u32,
    pub compute_height: u32,
    pub moving_width: u32,
    pub moving_height: u32,
    pub fov_deg: f32,
}

impl Default for LensingConfig {
    fn default() -> Self {
        Self {
            compute_width: 800,
            compute_height: 600,
            moving_width: 200,
            moving_height: 150,
            fov_deg: 60.0,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config =
            serde_yaml::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: "<inline>".into(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        positive("simulation.solar_time_scale", sim.solar_time_scale)?;
        positive("simulation.black_hole_time_scale", sim.black_hole_time_scale)?;
        positive("simulation.min_separation", sim.min_separation)?;
        positive("simulation.max_frame_seconds", sim.max_frame_seconds)?;

        positive("trail.sample_interval", self.trail.sample_interval)?;
        if self.trail.star_capacity == 0 || self.trail.max_capacity == 0 {
            return Err(invalid("trail", "capacities must be non-zero"));
        }

        let cam = &self.camera;
        positive("camera.yaw_pitch_sensitivity", cam.yaw_pitch_sensitivity as f64)?;
        positive("camera.orbit_speed", cam.orbit_speed as f64)?;
        positive("camera.pan_scale", cam.pan_scale as f64)?;
        positive("camera.focus_distance_multiple", cam.focus_distance_multiple as f64)?;
        if !(cam.pitch_limit_deg > 0.0 && cam.pitch_limit_deg < 90.0) {
            return Err(invalid("camera.pitch_limit_deg", "must lie strictly inside (0, 90)"));
        }
        if !(cam.elevation_epsilon > 0.0 && cam.elevation_epsilon < std::f32::consts::FRAC_PI_2) {
            return Err(invalid("camera.elevation_epsilon", "must lie strictly inside (0, pi/2)"));
        }
        if !(cam.zoom_in_factor > 0.0 && cam.zoom_in_factor < 1.0) {
            return Err(invalid("camera.zoom_in_factor", "must lie inside (0, 1)"));
        }
        if cam.zoom_out_factor <= 1.0 || !cam.zoom_out_factor.is_finite() {
            return Err(invalid("camera.zoom_out_factor", "must be greater than 1"));
        }
        ordered("camera.solar_*_distance", cam.solar_min_distance, cam.solar_max_distance)?;
        ordered("camera.black_hole_*_radius", cam.black_hole_min_radius, cam.black_hole_max_radius)?;

        if self.grid.size == 0 {
            return Err(invalid("grid.size", "must be non-zero"));
        }
        positive("grid.spacing", self.grid.spacing)?;

        let lens = &self.lensing;
        if lens.compute_width == 0 || lens.compute_height == 0 || lens.moving_width == 0 || lens.moving_height == 0 {
            return Err(invalid("lensing", "resolutions must be non-zero"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be positive and finite, got {value}"),
        })
    }
}

fn ordered(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min > 0.0 && min < max && max.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected 0 < min < max, got [{min}, {max}]"),
        })
    }
}
