//! Right-hand sides of the ASM2d mass balances.
//!
//! Batch form:  dC/dt = νᵀ·ρ(C)
//!
//! CSTR form:   dC/dt = νᵀ·ρ(C) + (C_in − C)/HRT
//!
//! with HRT in days. For dissolved oxygen the flow term is replaced by
//! (SO_target − SO)/HRT: aeration is represented as an instantaneous pull toward the
//! zone setpoint (0 in anaerobic and anoxic zones) instead of an oxygen-transfer rate.

use super::parameters::{ArrheniusCoefficients, KineticParameters, StoichiometricParameters};
use super::process_rates::{ProcessRate, calculate_process_rates, rate_vector};
use super::reactor_zone::ReactorZone;
use super::state_vector::{Component, StateAccess, StateVector};
use super::stoichiometric_matrix::{StoichiometricMatrix, build_stoichiometric_matrix};
use super::temperature_correction::temperature_corrected;

/// Temperature-corrected kinetics together with the stoichiometric matrix of one run.
/// Built once, then shared read-only by every derivative evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Biokinetics {
    pub temperature: f64,
    pub kinetics: KineticParameters,
    pub matrix: StoichiometricMatrix,
}

impl Biokinetics {
    pub fn new(
        base: &KineticParameters,
        theta: &ArrheniusCoefficients,
        stoich: &StoichiometricParameters,
        temperature: f64,
    ) -> Self {
        Self {
            temperature,
            kinetics: temperature_corrected(base, temperature, theta),
            matrix: build_stoichiometric_matrix(stoich),
        }
    }

    /// default ASM2d parameters at the given temperature
    pub fn at_temperature(temperature: f64) -> Self {
        Self::new(
            &KineticParameters::default(),
            &ArrheniusCoefficients::default(),
            &StoichiometricParameters::default(),
            temperature,
        )
    }

    pub fn rates(&self, state: &StateVector) -> Vec<ProcessRate> {
        calculate_process_rates(state, &self.kinetics)
    }

    pub fn batch_derivative(&self, state: &StateVector) -> StateVector {
        let rates = rate_vector(&self.rates(state));
        self.matrix.tr_mul(&rates)
    }

    pub fn cstr_derivative(
        &self,
        state: &StateVector,
        influent: &StateVector,
        zone: &ReactorZone,
    ) -> StateVector {
        self.batch_derivative(state) + flow_term(state, influent, zone)
    }
}

/// (C_in − C)/HRT with the DO entry replaced by the aeration term.
/// Influent equal to the state zeroes every entry except DO, which is zero only when SO
/// already sits at the zone's DO target.
pub fn flow_term(state: &StateVector, influent: &StateVector, zone: &ReactorZone) -> StateVector {
    let hrt_days = zone.hrt_days();
    let mut term = (influent - state) / hrt_days;
    term.set_conc(
        Component::SO,
        (zone.do_target() - state.conc(Component::SO)) / hrt_days,
    );
    term
}
