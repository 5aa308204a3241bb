//! JSON task files.
//!
//! A task holds everything one run needs: temperature, influent, the zone train with its
//! recycles and solver settings, the mode, and optional parameter overrides. Parameter
//! blocks may list only the values that differ from the ASM2d defaults.
//!
//! ```json
//! {
//!   "problem_name": "A2O",
//!   "temperature": 15.0,
//!   "influent": { "Conventional": { "cod": 400.0, "tkn": 45.0, ... } },
//!   "network": { "zones": [ { "zone_type": "anaerobic", "volume": 1000.0 } ], ... },
//!   "mode": "SteadyState",
//!   "kinetics": { "mu_AUT": 0.9 }
//! }
//! ```

use super::errors::ASMError;
use super::influent_fractionation::{ConventionalInfluent, FractionationRatios};
use super::multi_zone::NetworkConfig;
use super::parameters::{ArrheniusCoefficients, KineticParameters, StoichiometricParameters};
use super::simulation::{ASM2dSimulation, SimulationMode};
use super::state_vector::{StateVector, state_from_map};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const TEMPLATE_FILE_NAME: &str = "asm2d_task_template.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InfluentSpec {
    /// concentrations by component name; missing components are zero
    Components(HashMap<String, f64>),
    Conventional(ConventionalInfluent),
}

impl InfluentSpec {
    pub fn to_state(&self, ratios: &FractionationRatios) -> Result<StateVector, ASMError> {
        match self {
            InfluentSpec::Components(map) => state_from_map(map),
            InfluentSpec::Conventional(measured) => {
                measured.validate()?;
                Ok(measured.fractionate(ratios))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ASM2dTask {
    #[serde(default)]
    pub problem_name: Option<String>,
    /// [°C]
    pub temperature: f64,
    pub influent: InfluentSpec,
    pub network: NetworkConfig,
    #[serde(default)]
    pub mode: SimulationMode,
    #[serde(default)]
    pub kinetics: KineticParameters,
    #[serde(default)]
    pub arrhenius: ArrheniusCoefficients,
    #[serde(default)]
    pub stoichiometry: StoichiometricParameters,
    #[serde(default)]
    pub fractionation: FractionationRatios,
}

pub fn parse_task(content: &str) -> Result<ASM2dTask, ASMError> {
    Ok(serde_json::from_str(content)?)
}

pub fn load_task(path: &Path) -> Result<ASM2dTask, ASMError> {
    let content = fs::read_to_string(path)?;
    let task = parse_task(&content)?;
    info!("task loaded from {:?}", path);
    Ok(task)
}

pub fn save_task(task: &ASM2dTask, path: &Path) -> Result<(), ASMError> {
    fs::write(path, serde_json::to_string_pretty(task)?)?;
    Ok(())
}

impl ASM2dSimulation {
    pub fn from_task(task: &ASM2dTask) -> Result<Self, ASMError> {
        let mut simulation = ASM2dSimulation::new();
        simulation.set_temperature(task.temperature)?;
        simulation.set_parameters(
            task.kinetics.clone(),
            task.arrhenius.clone(),
            task.stoichiometry.clone(),
        )?;
        simulation.set_influent(task.influent.to_state(&task.fractionation)?);
        simulation.set_network(task.network.clone())?;
        simulation.set_mode(task.mode.clone())?;
        Ok(simulation)
    }

    pub fn from_file(path: &Path) -> Result<Self, ASMError> {
        Self::from_task(&load_task(path)?)
    }
}

const TEMPLATE: &str = r#"{
  "problem_name": "A2O plant",
  "temperature": 15.0,
  "influent": {
    "Conventional": {
      "cod": 400.0,
      "tkn": 45.0,
      "nh4_n": 30.0,
      "tp": 8.0,
      "po4_p": 5.0,
      "vfa": 40.0,
      "alkalinity": 7.0
    }
  },
  "network": {
    "zones": [
      { "zone_type": "anaerobic", "volume": 1000.0 },
      { "zone_type": "anoxic", "volume": 2000.0 },
      { "zone_type": "aerobic", "volume": 4000.0, "do_setpoint": 2.0 }
    ],
    "influent_flow": 10000.0,
    "internal_recycle": 2.0,
    "return_sludge": 0.8,
    "max_outer_iterations": 100,
    "network_tolerance": 1e-4,
    "solver": {
      "time_step": 0.01,
      "max_iterations": 10000,
      "check_interval": 100,
      "tolerance": 1e-6
    }
  },
  "mode": "SteadyState",
  "kinetics": {},
  "arrhenius": {},
  "stoichiometry": {},
  "fractionation": {}
}
"#;

/// Writes a valid starter task (an A2O zone train) and returns its path. The train has no
/// clarifier, so at 15 °C the nitrifiers and PAO wash out of it. Without a path the
/// file goes to the current directory.
pub fn create_template(path: Option<PathBuf>) -> Result<PathBuf, ASMError> {
    let path = path.unwrap_or_else(|| PathBuf::from(TEMPLATE_FILE_NAME));
    fs::write(&path, TEMPLATE)?;
    Ok(path)
}
