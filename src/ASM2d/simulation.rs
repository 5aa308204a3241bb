//! # ASM2d simulation task
//!
//! [`ASM2dSimulation`] puts the pieces together: it corrects the kinetics for temperature,
//! builds the stoichiometric matrix once, sets up the zone train and runs it either to
//! steady state (recycle fixed point, see [`super::multi_zone`]) or over time with one of
//! the [`super::ode_integrators`].
//!
//! ## Usage
//! - **Setup**: `new()` → `set_temperature()` → `set_influent()` → `set_network()` →
//!   optional `set_parameters()` / `set_initial_states()` / `set_mode()`
//! - **Solving**: `check_task()` → `solve()` → `pretty_print()` or `get_result()`
//! - **From file**: `from_task()` with a parsed [`ASM2dTask`](super::task_parser_ASM2d::ASM2dTask)
//!
//! ## Dynamic mode
//! All zone states are stacked into one vector (zone after zone) and the whole train is
//! integrated at once. The recycle blending is evaluated at every derivative call with the
//! current zone states, and the stacked state is clamped to ≥ 0 after every step.
//!
//! ## Temperature sweeps
//! Runs share nothing, so [`run_temperature_sweep`] evaluates one copy of the task per
//! temperature on the rayon thread pool.

use super::derivatives::Biokinetics;
use super::errors::ASMError;
use super::multi_zone::{
    MultiZoneResult, MultiZoneSimulator, NetworkConfig, network_derivative, print_zone_states,
    stack_states, unstack_states,
};
use super::ode_integrators::{IntegratorType, OdeIntegrator, create_integrator};
use super::parameters::{ArrheniusCoefficients, KineticParameters, StoichiometricParameters};
use super::process_rates::pretty_print_rates;
use super::state_vector::{StateVector, clamp_non_negative};
use log::{info, warn};
use nalgebra::DVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicSettings {
    /// simulated time [d]
    pub t_end: f64,
    /// integration step [d]
    pub step: f64,
    #[serde(default)]
    pub integrator: IntegratorType,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum SimulationMode {
    #[default]
    SteadyState,
    Dynamic(DynamicSettings),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DynamicResult {
    pub zone_order: Vec<String>,
    pub times: Vec<f64>,
    /// zone id -> state at every entry of `times`
    pub trajectories: HashMap<String, Vec<StateVector>>,
}

impl DynamicResult {
    pub fn final_states(&self) -> HashMap<String, StateVector> {
        self.trajectories
            .iter()
            .filter_map(|(id, states)| states.last().map(|s| (id.clone(), *s)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationResult {
    SteadyState(MultiZoneResult),
    Dynamic(DynamicResult),
}

impl SimulationResult {
    pub fn zone_order(&self) -> &[String] {
        match self {
            SimulationResult::SteadyState(r) => &r.zone_order,
            SimulationResult::Dynamic(r) => &r.zone_order,
        }
    }

    /// zone id -> final state, whatever the mode
    pub fn final_states(&self) -> HashMap<String, StateVector> {
        match self {
            SimulationResult::SteadyState(r) => r.states.clone(),
            SimulationResult::Dynamic(r) => r.final_states(),
        }
    }

    /// final state of the terminal zone
    pub fn effluent(&self) -> Option<StateVector> {
        let id = self.zone_order().last()?;
        self.final_states().get(id).copied()
    }
}

#[derive(Debug, Clone)]
pub struct ASM2dSimulation {
    /// [°C]
    pub temperature: f64,
    pub kinetics: KineticParameters,
    pub arrhenius: ArrheniusCoefficients,
    pub stoichiometry: StoichiometricParameters,
    pub influent: Option<StateVector>,
    pub network: Option<NetworkConfig>,
    pub initial_states: Option<Vec<StateVector>>,
    pub mode: SimulationMode,
    pub result: Option<SimulationResult>,
}

impl Default for ASM2dSimulation {
    fn default() -> Self {
        Self::new()
    }
}

impl ASM2dSimulation {
    pub fn new() -> Self {
        Self {
            temperature: 20.0,
            kinetics: KineticParameters::default(),
            arrhenius: ArrheniusCoefficients::default(),
            stoichiometry: StoichiometricParameters::default(),
            influent: None,
            network: None,
            initial_states: None,
            mode: SimulationMode::SteadyState,
            result: None,
        }
    }

    pub fn set_temperature(&mut self, temperature: f64) -> Result<(), ASMError> {
        if !temperature.is_finite() {
            return Err(ASMError::InvalidParameter(
                "temperature must be a finite number".to_string(),
            ));
        }
        if !(5.0..=35.0).contains(&temperature) {
            warn!(
                "temperature {} C is outside the usual 5-35 C range of ASM2d",
                temperature
            );
        }
        self.temperature = temperature;
        Ok(())
    }

    pub fn set_parameters(
        &mut self,
        kinetics: KineticParameters,
        arrhenius: ArrheniusCoefficients,
        stoichiometry: StoichiometricParameters,
    ) -> Result<(), ASMError> {
        kinetics.validate()?;
        arrhenius.validate()?;
        stoichiometry.validate()?;
        self.kinetics = kinetics;
        self.arrhenius = arrhenius;
        self.stoichiometry = stoichiometry;
        Ok(())
    }

    pub fn set_influent(&mut self, influent: StateVector) {
        let mut influent = influent;
        clamp_non_negative(&mut influent);
        self.influent = Some(influent);
    }

    pub fn set_network(&mut self, network: NetworkConfig) -> Result<(), ASMError> {
        network.validate()?;
        self.network = Some(network);
        Ok(())
    }

    pub fn set_initial_states(&mut self, states: Vec<StateVector>) {
        self.initial_states = Some(states);
    }

    pub fn set_mode(&mut self, mode: SimulationMode) -> Result<(), ASMError> {
        if let SimulationMode::Dynamic(settings) = &mode {
            if !(settings.t_end > 0.0 && settings.step > 0.0) {
                return Err(ASMError::InvalidParameter(format!(
                    "dynamic run needs positive t_end and step, got {} and {}",
                    settings.t_end, settings.step
                )));
            }
        }
        self.mode = mode;
        Ok(())
    }

    pub fn check_task(&self) -> Result<(), ASMError> {
        if self.influent.is_none() {
            return Err(ASMError::MissingData("influent not set".to_string()));
        }
        let network = self
            .network
            .as_ref()
            .ok_or_else(|| ASMError::MissingData("zone network not set".to_string()))?;
        network.validate()?;
        if let Some(states) = &self.initial_states {
            if states.len() != network.zones.len() {
                return Err(ASMError::InvalidConfiguration(format!(
                    "{} initial states given for {} zones",
                    states.len(),
                    network.zones.len()
                )));
            }
        }
        self.kinetics.validate()?;
        self.arrhenius.validate()?;
        self.stoichiometry.validate()
    }

    pub fn biokinetics(&self) -> Biokinetics {
        Biokinetics::new(
            &self.kinetics,
            &self.arrhenius,
            &self.stoichiometry,
            self.temperature,
        )
    }

    fn build_simulator(&self) -> Result<(MultiZoneSimulator, StateVector), ASMError> {
        self.check_task()?;
        let network = self
            .network
            .clone()
            .ok_or_else(|| ASMError::MissingData("zone network not set".to_string()))?;
        let influent = self
            .influent
            .ok_or_else(|| ASMError::MissingData("influent not set".to_string()))?;
        let mut simulator = MultiZoneSimulator::new(network)?;
        if let Some(states) = &self.initial_states {
            simulator.set_initial_states(states)?;
        }
        Ok((simulator, influent))
    }

    pub fn solve(&mut self) -> Result<(), ASMError> {
        let (mut simulator, influent) = self.build_simulator()?;
        let bio = self.biokinetics();
        let result = match &self.mode {
            SimulationMode::SteadyState => {
                SimulationResult::SteadyState(simulator.solve_steady_state(&bio, &influent))
            }
            SimulationMode::Dynamic(settings) => {
                SimulationResult::Dynamic(solve_dynamic(&bio, &simulator, &influent, settings)?)
            }
        };
        self.result = Some(result);
        Ok(())
    }

    pub fn get_result(&self) -> Option<&SimulationResult> {
        self.result.as_ref()
    }

    /// rates of all processes in every zone of the last result
    pub fn process_rates_report(&self) -> Result<(), ASMError> {
        let result = self
            .result
            .as_ref()
            .ok_or_else(|| ASMError::MissingData("nothing solved yet".to_string()))?;
        let bio = self.biokinetics();
        let states = result.final_states();
        for id in result.zone_order() {
            if let Some(state) = states.get(id) {
                println!("\nprocess rates in {}", id);
                pretty_print_rates(&bio.rates(state));
            }
        }
        Ok(())
    }

    pub fn pretty_print(&self) {
        match &self.result {
            Some(SimulationResult::SteadyState(r)) => r.pretty_print(),
            Some(SimulationResult::Dynamic(r)) => {
                println!(
                    "state after {:.3} d ({} points)",
                    r.times.last().copied().unwrap_or(0.0),
                    r.times.len()
                );
                print_zone_states(&r.zone_order, &r.final_states());
            }
            None => println!("nothing solved yet"),
        }
    }
}

fn solve_dynamic(
    bio: &Biokinetics,
    simulator: &MultiZoneSimulator,
    influent: &StateVector,
    settings: &DynamicSettings,
) -> Result<DynamicResult, ASMError> {
    let integrator = create_integrator(settings.integrator);
    info!(
        "dynamic run of {} zones over {} d, {} with step {}",
        simulator.zones.len(),
        settings.t_end,
        integrator.name(),
        settings.step
    );
    let zones = &simulator.zones;
    let layout = simulator.layout();
    let rhs = |_t: f64, y: &DVector<f64>| -> DVector<f64> {
        let mut states = unstack_states(y);
        states.iter_mut().for_each(clamp_non_negative);
        stack_states(&network_derivative(bio, zones, layout, influent, &states))
    };
    let clamp = |y: &mut DVector<f64>| {
        y.iter_mut().for_each(|v| {
            if *v < 0.0 || v.is_nan() {
                *v = 0.0
            }
        })
    };
    let y0 = stack_states(&simulator.states());
    let (times, stacked) =
        integrator.integrate_projected(&rhs, &clamp, &y0, 0.0, settings.t_end, settings.step)?;

    let mut trajectories: HashMap<String, Vec<StateVector>> = simulator
        .ids
        .iter()
        .map(|id| (id.clone(), Vec::with_capacity(times.len())))
        .collect();
    for y in &stacked {
        for (id, state) in simulator.ids.iter().zip(unstack_states(y)) {
            if let Some(trajectory) = trajectories.get_mut(id) {
                trajectory.push(state);
            }
        }
    }
    Ok(DynamicResult {
        zone_order: simulator.ids.clone(),
        times,
        trajectories,
    })
}

/// Solves a copy of `base` at every temperature, in parallel. Results come back in the
/// order of `temperatures`.
pub fn run_temperature_sweep(
    base: &ASM2dSimulation,
    temperatures: &[f64],
) -> Vec<(f64, Result<SimulationResult, ASMError>)> {
    temperatures
        .par_iter()
        .map(|&t| {
            let mut task = base.clone();
            let outcome = task
                .set_temperature(t)
                .and_then(|_| task.solve())
                .and_then(|_| {
                    task.result.take().ok_or_else(|| {
                        ASMError::MissingData("solver produced no result".to_string())
                    })
                });
            (t, outcome)
        })
        .collect()
}
