//! Per-zone steady state by time stepping.
//!
//! Euler on the CSTR balance with a fixed step. Plain forward Euler chatters on the fast
//! components: with real biomass the oxygen uptake empties the DO of an aerobic zone in
//! one step, aeration refills it in the next, and the state flips between two values for
//! ever. [`solve_zone`] therefore steps linearly implicit (Rosenbrock-Euler):
//! `(I − dt·J)·Δc = dt·f(c)` with the Jacobian `J` from forward differences. Fast modes
//! are damped instead of overshooting, and the fixed points are those of forward Euler
//! (`f = 0`). A singular system falls back to the forward Euler increment.
//!
//! Every `check_interval` steps the state is compared with the previous checkpoint. The
//! zone has converged when the largest relative change of any component since that
//! checkpoint is below `tolerance` and so is the change made by the last single step; the
//! second test catches a period-2 oscillation whose phases land on the checkpoints. The
//! state is clamped to ≥ 0 after every step. Running into the iteration cap is not an
//! error: the outcome says so and still carries the last state.

use super::derivatives::Biokinetics;
use super::errors::ASMError;
use super::reactor_zone::ReactorZone;
use super::state_vector::{N_COMPONENTS, StateVector, clamp_non_negative, max_relative_change};
use log::{debug, warn};
use nalgebra::SMatrix;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Euler step [d]
    pub time_step: f64,
    pub max_iterations: usize,
    /// steps between two convergence checks
    pub check_interval: usize,
    /// on the max relative change between checkpoints
    pub tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_step: 0.01,
            max_iterations: 10_000,
            check_interval: 100,
            tolerance: 1e-6,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), ASMError> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(ASMError::InvalidParameter(format!(
                "time step must be positive, got {}",
                self.time_step
            )));
        }
        if self.max_iterations == 0 || self.check_interval == 0 {
            return Err(ASMError::InvalidParameter(
                "max_iterations and check_interval must be at least 1".to_string(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ASMError::InvalidParameter(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolverOutcome {
    Converged {
        state: StateVector,
        iterations: usize,
    },
    MaxIterationsReached {
        state: StateVector,
        iterations: usize,
    },
}

impl SolverOutcome {
    pub fn state(&self) -> &StateVector {
        match self {
            SolverOutcome::Converged { state, .. } => state,
            SolverOutcome::MaxIterationsReached { state, .. } => state,
        }
    }

    pub fn iterations(&self) -> usize {
        match self {
            SolverOutcome::Converged { iterations, .. } => *iterations,
            SolverOutcome::MaxIterationsReached { iterations, .. } => *iterations,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, SolverOutcome::Converged { .. })
    }
}

/// One plain forward Euler step with clamping.
pub fn euler_step(
    bio: &Biokinetics,
    zone: &ReactorZone,
    state: &StateVector,
    influent: &StateVector,
    dt: f64,
) -> StateVector {
    let mut next = state + bio.cstr_derivative(state, influent, zone) * dt;
    clamp_non_negative(&mut next);
    next
}

/// relative perturbation of the forward-difference Jacobian
pub const JACOBIAN_STEP: f64 = 1e-7;

pub type StateJacobian = SMatrix<f64, N_COMPONENTS, N_COMPONENTS>;

/// ∂f_i/∂c_j of the CSTR derivative by forward differences around `state`,
/// `derivative` being f(state)
pub fn cstr_jacobian(
    bio: &Biokinetics,
    zone: &ReactorZone,
    state: &StateVector,
    influent: &StateVector,
    derivative: &StateVector,
) -> StateJacobian {
    let mut jacobian = StateJacobian::zeros();
    for j in 0..N_COMPONENTS {
        let h = JACOBIAN_STEP * state[j].abs().max(1.0);
        let mut shifted = *state;
        shifted[j] += h;
        let column = (bio.cstr_derivative(&shifted, influent, zone) - derivative) / h;
        jacobian.set_column(j, &column);
    }
    jacobian
}

/// One linearly implicit Euler step with clamping.
pub fn linearly_implicit_step(
    bio: &Biokinetics,
    zone: &ReactorZone,
    state: &StateVector,
    influent: &StateVector,
    dt: f64,
) -> StateVector {
    let derivative = bio.cstr_derivative(state, influent, zone);
    let jacobian = cstr_jacobian(bio, zone, state, influent, &derivative);
    let system = StateJacobian::identity() - jacobian * dt;
    let increment = system.lu().solve(&(derivative * dt)).unwrap_or(derivative * dt);
    let mut next = state + increment;
    clamp_non_negative(&mut next);
    next
}

/// Integrates `zone` from its current state until it settles or the cap is hit.
/// The final state is also written back into `zone.state`.
pub fn solve_zone(
    bio: &Biokinetics,
    zone: &mut ReactorZone,
    influent: &StateVector,
    config: &SolverConfig,
) -> SolverOutcome {
    let mut state = zone.state;
    clamp_non_negative(&mut state);
    let mut checkpoint = state;
    for iteration in 1..=config.max_iterations {
        let previous = state;
        state = linearly_implicit_step(bio, zone, &state, influent, config.time_step);
        if iteration % config.check_interval == 0 {
            let change = max_relative_change(&state, &checkpoint);
            let last_step = max_relative_change(&state, &previous);
            debug!(
                "{} zone, step {}: max relative change {:.3e}, last step {:.3e}",
                zone.zone_type, iteration, change, last_step
            );
            if change < config.tolerance && last_step < config.tolerance {
                zone.state = state;
                return SolverOutcome::Converged {
                    state,
                    iterations: iteration,
                };
            }
            checkpoint = state;
        }
    }
    warn!(
        "{} zone did not reach steady state in {} steps",
        zone.zone_type, config.max_iterations
    );
    zone.state = state;
    SolverOutcome::MaxIterationsReached {
        state,
        iterations: config.max_iterations,
    }
}
