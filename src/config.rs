/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;
use std::path::Path;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::error::SimError;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub building: BuildingConfig,
    pub generator: GeneratorConfig,
    pub reporter: ReporterConfig,
    pub simulation: SimulationConfig,
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct BuildingConfig {
    pub n_floors: usize,
    pub n_elevators: usize,
    pub capacity: u32,
    pub start_floor: usize,
    pub move_speed: u64,
    pub door_speed: u64,
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct GeneratorConfig {
    pub weight_from: u32,
    pub weight_to: u32,
    pub generate_speed: u64,
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct ReporterConfig {
    pub render_speed: u64,
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct SimulationConfig {
    /// How long to run before shutting every unit down. 0 = run until killed.
    pub duration_secs: u64,
}

impl Default for BuildingConfig {
    fn default() -> BuildingConfig {
        BuildingConfig {
            n_floors: 10,
            n_elevators: 10,
            capacity: 500,
            start_floor: 0,
            move_speed: 100,
            door_speed: 100,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> GeneratorConfig {
        GeneratorConfig {
            weight_from: 10,
            weight_to: 200,
            generate_speed: 100,
        }
    }
}

impl Default for ReporterConfig {
    fn default() -> ReporterConfig {
        ReporterConfig { render_speed: 600 }
    }
}

impl Default for SimulationConfig {
    fn default() -> SimulationConfig {
        SimulationConfig { duration_secs: 0 }
    }
}

/***************************************/
/*             Public API              */
/***************************************/
/// Loads the configuration from `path`, falling back to the built-in
/// defaults when the file does not exist. Value ranges are validated by the
/// unit constructors, not here.
pub fn load_config(path: &Path) -> Result<Config, SimError> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let config_str = fs::read_to_string(path)?;
    Ok(toml::from_str(&config_str)?)
}

/***************************************/
/*             Unit tests              */
/***************************************/
