//! # Multi-zone plant model
//!
//! A train of CSTR zones (for example anaerobic → anoxic → aerobic for A2O) coupled by two
//! recycle streams, both expressed as ratios of the influent flow Q:
//!
//! - **RAS** (return activated sludge): drawn from the terminal zone, returned to the
//!   first zone together with the influent
//! - **IR** (internal recycle): drawn from the last aerobic zone, returned to the first
//!   anoxic zone
//!
//! Blending is flow weighted:
//!
//! ```text
//! C_in,1      = (C_inf + RAS·C_last) / (1 + RAS)
//! C_in,anoxic = (C_up·(1 + RAS) + IR·C_aerobic) / (1 + RAS + IR)
//! ```
//!
//! Steady state is found by fixed-point iteration over the network: each outer pass
//! snapshots the recycle sources, then solves the zones in order, feeding every zone with
//! the converged effluent of the zone upstream. Zones are warm-started from the previous
//! pass. No linear system is assembled.
//!
//! The outer loop runs `max_outer_iterations` passes. The largest relative change of any
//! zone state between two passes is always computed and reported; if
//! `network_tolerance` is set the loop also stops as soon as it drops below that value.

use super::derivatives::Biokinetics;
use super::errors::ASMError;
use super::reactor_zone::{ReactorZone, ZoneType};
use super::state_vector::{
    Component, N_COMPONENTS, StateAccess, StateVector, max_relative_change,
};
use super::steady_state_solver::{SolverConfig, SolverOutcome, solve_zone};
use log::{info, warn};
use nalgebra::DVector;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::IntoEnumIterator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub zone_type: ZoneType,
    /// [m³]
    pub volume: f64,
    /// overrides volume / influent flow [h]
    #[serde(default)]
    pub hrt_hours: Option<f64>,
    /// aerobic zones only [g O2/m³]
    #[serde(default)]
    pub do_setpoint: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub zones: Vec<ZoneConfig>,
    /// [m³/d]
    pub influent_flow: f64,
    /// IR as a multiple of the influent flow
    #[serde(default)]
    pub internal_recycle: f64,
    /// RAS as a multiple of the influent flow
    #[serde(default)]
    pub return_sludge: f64,
    #[serde(default = "default_outer_iterations")]
    pub max_outer_iterations: usize,
    #[serde(default)]
    pub network_tolerance: Option<f64>,
    #[serde(default)]
    pub solver: SolverConfig,
}

fn default_outer_iterations() -> usize {
    100
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<(), ASMError> {
        if self.zones.is_empty() {
            return Err(ASMError::InvalidConfiguration(
                "at least one zone is required".to_string(),
            ));
        }
        for (name, value) in [
            ("influent flow", self.influent_flow),
            ("internal recycle ratio", self.internal_recycle),
            ("return sludge ratio", self.return_sludge),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ASMError::InvalidParameter(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        if self.max_outer_iterations == 0 {
            return Err(ASMError::InvalidParameter(
                "max_outer_iterations must be at least 1".to_string(),
            ));
        }
        if let Some(tol) = self.network_tolerance {
            if !(tol.is_finite() && tol > 0.0) {
                return Err(ASMError::InvalidParameter(format!(
                    "network tolerance must be positive, got {}",
                    tol
                )));
            }
        }
        let has = |t: ZoneType| self.zones.iter().any(|z| z.zone_type == t);
        if self.internal_recycle > 0.0 && !has(ZoneType::Aerobic) {
            return Err(ASMError::InvalidConfiguration(
                "internal recycle needs an aerobic zone to draw from".to_string(),
            ));
        }
        if self.internal_recycle > 0.0 && !has(ZoneType::Anoxic) {
            warn!("internal recycle is set but there is no anoxic zone; it is ignored");
        }
        self.solver.validate()
    }

    /// explicit HRT, otherwise volume / influent flow, in hours
    pub fn zone_hrt_hours(&self, zone: &ZoneConfig) -> Result<f64, ASMError> {
        match zone.hrt_hours {
            Some(hrt) => Ok(hrt),
            None => {
                if self.influent_flow > 0.0 {
                    Ok(zone.volume / self.influent_flow * 24.0)
                } else {
                    Err(ASMError::MissingData(format!(
                        "{} zone has no HRT and the influent flow is zero",
                        zone.zone_type
                    )))
                }
            }
        }
    }

    pub fn build_zones(&self) -> Result<Vec<ReactorZone>, ASMError> {
        self.zones
            .iter()
            .map(|z| ReactorZone::new(z.zone_type, self.zone_hrt_hours(z)?, z.do_setpoint))
            .collect()
    }
}

/// "anaerobic_1", "anoxic_1", "aerobic_1", "aerobic_2", ...
pub fn zone_ids(zone_types: &[ZoneType]) -> Vec<String> {
    let mut counters: HashMap<ZoneType, usize> = HashMap::new();
    zone_types
        .iter()
        .map(|t| {
            let n = counters.entry(*t).or_insert(0);
            *n += 1;
            format!("{}_{}", t, n)
        })
        .collect()
}

/// Where the recycle streams leave and re-enter the train.
#[derive(Debug, Clone, PartialEq)]
pub struct RecycleLayout {
    pub return_sludge: f64,
    pub internal_recycle: f64,
    pub first_anoxic: Option<usize>,
    pub last_aerobic: Option<usize>,
    pub terminal: usize,
}

impl RecycleLayout {
    pub fn new(zone_types: &[ZoneType], return_sludge: f64, internal_recycle: f64) -> Self {
        Self {
            return_sludge,
            internal_recycle,
            first_anoxic: zone_types.iter().position(|t| *t == ZoneType::Anoxic),
            last_aerobic: zone_types.iter().rposition(|t| *t == ZoneType::Aerobic),
            terminal: zone_types.len().saturating_sub(1),
        }
    }

    /// Inlet concentration of zone `index`. `upstream` is the effluent of the previous
    /// zone (ignored for the first zone); `states` supplies the recycle sources.
    pub fn zone_input(
        &self,
        index: usize,
        upstream: &StateVector,
        influent: &StateVector,
        states: &[StateVector],
    ) -> StateVector {
        let ras = self.return_sludge;
        let mut input = if index == 0 {
            (influent + states[self.terminal] * ras) / (1.0 + ras)
        } else {
            *upstream
        };
        if Some(index) == self.first_anoxic && self.internal_recycle > 0.0 {
            if let Some(aerobic) = self.last_aerobic {
                let ir = self.internal_recycle;
                input = (input * (1.0 + ras) + states[aerobic] * ir) / (1.0 + ras + ir);
            }
        }
        input
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiZoneResult {
    pub zone_order: Vec<String>,
    pub states: HashMap<String, StateVector>,
    /// last solver outcome of every zone, in train order
    pub outcomes: Vec<SolverOutcome>,
    pub outer_iterations: usize,
    /// max relative change of any zone state over the last outer pass
    pub network_residual: f64,
    /// only true when a network tolerance was set and met
    pub network_converged: bool,
}

impl MultiZoneResult {
    /// state of the terminal zone
    pub fn effluent(&self) -> Option<&StateVector> {
        self.zone_order.last().and_then(|id| self.states.get(id))
    }

    pub fn all_zones_converged(&self) -> bool {
        self.outcomes.iter().all(|o| o.is_converged())
    }

    pub fn pretty_print(&self) {
        print_zone_states(&self.zone_order, &self.states);
        println!(
            "outer iterations: {}, network residual: {:.3e}, zones converged: {}",
            self.outer_iterations,
            self.network_residual,
            self.all_zones_converged()
        );
    }
}

/// one column per zone, one row per component
pub fn print_zone_states(zone_order: &[String], states: &HashMap<String, StateVector>) {
    let mut table = Table::new();
    let mut header = vec![Cell::new("component")];
    header.extend(zone_order.iter().map(|id| Cell::new(id)));
    table.add_row(Row::new(header));
    for component in Component::iter() {
        let mut row = vec![Cell::new(&format!("{}, {}", component, component.unit()))];
        for id in zone_order {
            let value = states.get(id).map(|s| s.conc(component)).unwrap_or(0.0);
            row.push(Cell::new(&format!("{:.3}", value)));
        }
        table.add_row(Row::new(row));
    }
    table.printstd();
}

pub struct MultiZoneSimulator {
    pub config: NetworkConfig,
    pub zones: Vec<ReactorZone>,
    pub ids: Vec<String>,
    layout: RecycleLayout,
}

impl MultiZoneSimulator {
    pub fn new(config: NetworkConfig) -> Result<Self, ASMError> {
        config.validate()?;
        let zones = config.build_zones()?;
        let types: Vec<ZoneType> = zones.iter().map(|z| z.zone_type).collect();
        let layout = RecycleLayout::new(&types, config.return_sludge, config.internal_recycle);
        Ok(Self {
            ids: zone_ids(&types),
            zones,
            layout,
            config,
        })
    }

    /// Replaces the default initial states; one state per zone.
    pub fn set_initial_states(&mut self, states: &[StateVector]) -> Result<(), ASMError> {
        if states.len() != self.zones.len() {
            return Err(ASMError::InvalidConfiguration(format!(
                "{} initial states given for {} zones",
                states.len(),
                self.zones.len()
            )));
        }
        for (zone, state) in self.zones.iter_mut().zip(states) {
            zone.state = *state;
        }
        Ok(())
    }

    pub fn states(&self) -> Vec<StateVector> {
        self.zones.iter().map(|z| z.state).collect()
    }

    pub fn layout(&self) -> &RecycleLayout {
        &self.layout
    }

    pub fn solve_steady_state(
        &mut self,
        bio: &Biokinetics,
        influent: &StateVector,
    ) -> MultiZoneResult {
        let cfg = &self.config;
        info!(
            "steady state of {} zones at {} C: RAS {}, IR {}",
            self.zones.len(),
            bio.temperature,
            cfg.return_sludge,
            cfg.internal_recycle
        );
        let mut outcomes = Vec::with_capacity(self.zones.len());
        let mut residual = f64::INFINITY;
        let mut network_converged = false;
        let mut outer = 0;
        while outer < cfg.max_outer_iterations {
            outer += 1;
            let snapshot = self.states();
            outcomes.clear();
            let mut upstream = *influent;
            for (i, zone) in self.zones.iter_mut().enumerate() {
                let input = self.layout.zone_input(i, &upstream, influent, &snapshot);
                let outcome = solve_zone(bio, zone, &input, &cfg.solver);
                upstream = *outcome.state();
                outcomes.push(outcome);
            }
            residual = self
                .zones
                .iter()
                .zip(snapshot.iter())
                .map(|(zone, old)| max_relative_change(&zone.state, old))
                .fold(0.0, f64::max);
            if let Some(tol) = cfg.network_tolerance {
                if residual < tol {
                    network_converged = true;
                    break;
                }
            }
        }
        if cfg.network_tolerance.is_some() && !network_converged {
            warn!(
                "recycle network not converged after {} passes, residual {:.3e}",
                outer, residual
            );
        } else {
            info!(
                "network solved in {} passes, residual {:.3e}",
                outer, residual
            );
        }
        MultiZoneResult {
            zone_order: self.ids.clone(),
            states: self
                .ids
                .iter()
                .cloned()
                .zip(self.zones.iter().map(|z| z.state))
                .collect(),
            outcomes,
            outer_iterations: outer,
            network_residual: residual,
            network_converged,
        }
    }
}

/// Stacks the zone states into one vector, zone after zone.
pub fn stack_states(states: &[StateVector]) -> DVector<f64> {
    DVector::from_iterator(
        states.len() * N_COMPONENTS,
        states.iter().flat_map(|s| s.iter().copied()),
    )
}

pub fn unstack_states(stacked: &DVector<f64>) -> Vec<StateVector> {
    stacked
        .as_slice()
        .chunks(N_COMPONENTS)
        .map(StateVector::from_column_slice)
        .collect()
}

/// Time derivative of the whole train, with the recycle blending evaluated on the
/// current states.
pub fn network_derivative(
    bio: &Biokinetics,
    zones: &[ReactorZone],
    layout: &RecycleLayout,
    influent: &StateVector,
    states: &[StateVector],
) -> Vec<StateVector> {
    let mut upstream = *influent;
    let mut derivatives = Vec::with_capacity(zones.len());
    for (i, zone) in zones.iter().enumerate() {
        let input = layout.zone_input(i, &upstream, influent, states);
        derivatives.push(bio.cstr_derivative(&states[i], &input, zone));
        upstream = states[i];
    }
    derivatives
}
