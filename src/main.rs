use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use gravity_playground::Config;
use gravity_playground::simulation::SimulationManager;

#[derive(ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
enum Scenario {
    Solar,
    EarthMoon,
    BlackHole,
}

impl Scenario {
    fn key(self) -> &'static str {
        match self {
            Scenario::Solar => "solar",
            Scenario::EarthMoon => "earth-moon",
            Scenario::BlackHole => "black-hole",
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "N-body solar system and black-hole grid warp playground")]
struct Args {
    /// Scenario to start with
    #[arg(long, value_enum, default_value_t = Scenario::Solar)]
    scenario: Scenario,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated seconds per real second, overriding the scenario default
    #[arg(long)]
    time_scale: Option<f64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(scale) = args.time_scale {
        anyhow::ensure!(scale > 0.0 && scale.is_finite(), "--time-scale must be positive, got {scale}");
    }

    let manager = SimulationManager::new(config, args.scenario.key(), args.time_scale);
    gravity_playground::app::run(manager)
}
