//! Fixed-step integrators used by the dynamic mode.
//!
//! The engine only relies on the [`OdeIntegrator`] contract
//! `integrate(f(t, y), y0, t0, t1, step) -> (times, states)`; [`Integrator`] dispatches
//! to the built-in methods. The last step is shortened so that the trajectory ends exactly
//! at `t1`.

use super::errors::ASMError;
use enum_dispatch::enum_dispatch;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

pub type Trajectory = (Vec<f64>, Vec<DVector<f64>>);

#[enum_dispatch]
pub trait OdeIntegrator {
    fn name(&self) -> &'static str;
    fn step(
        &self,
        f: &dyn Fn(f64, &DVector<f64>) -> DVector<f64>,
        t: f64,
        y: &DVector<f64>,
        h: f64,
    ) -> DVector<f64>;

    fn integrate(
        &self,
        f: &dyn Fn(f64, &DVector<f64>) -> DVector<f64>,
        y0: &DVector<f64>,
        t0: f64,
        t1: f64,
        step: f64,
    ) -> Result<Trajectory, ASMError> {
        self.integrate_projected(f, &|_: &mut DVector<f64>| {}, y0, t0, t1, step)
    }

    /// Same as `integrate`, but `project` is applied to the state after every step
    /// (used to keep concentrations non-negative).
    fn integrate_projected(
        &self,
        f: &dyn Fn(f64, &DVector<f64>) -> DVector<f64>,
        project: &dyn Fn(&mut DVector<f64>),
        y0: &DVector<f64>,
        t0: f64,
        t1: f64,
        step: f64,
    ) -> Result<Trajectory, ASMError> {
        check_span(t0, t1, step)?;
        // round-off in (t1 - t0)/step must not add a zero-length step
        let n_steps = ((t1 - t0) / step * (1.0 - 1e-12)).ceil().max(1.0) as usize;
        let mut times = Vec::with_capacity(n_steps + 1);
        let mut states = Vec::with_capacity(n_steps + 1);
        let mut t = t0;
        let mut y = y0.clone();
        times.push(t);
        states.push(y.clone());
        for i in 0..n_steps {
            let t_next = if i + 1 == n_steps {
                t1
            } else {
                t0 + (i + 1) as f64 * step
            };
            y = self.step(f, t, &y, t_next - t);
            project(&mut y);
            t = t_next;
            times.push(t);
            states.push(y.clone());
        }
        Ok((times, states))
    }
}

fn check_span(t0: f64, t1: f64, step: f64) -> Result<(), ASMError> {
    if !(t0.is_finite() && t1.is_finite() && t1 > t0) {
        return Err(ASMError::InvalidParameter(format!(
            "time span must satisfy t0 < t1, got [{}, {}]",
            t0, t1
        )));
    }
    if !(step.is_finite() && step > 0.0) {
        return Err(ASMError::InvalidParameter(format!(
            "integration step must be positive, got {}",
            step
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForwardEuler;

impl OdeIntegrator for ForwardEuler {
    fn name(&self) -> &'static str {
        "forward Euler"
    }
    fn step(
        &self,
        f: &dyn Fn(f64, &DVector<f64>) -> DVector<f64>,
        t: f64,
        y: &DVector<f64>,
        h: f64,
    ) -> DVector<f64> {
        y + f(t, y) * h
    }
}

/// classical 4th order Runge-Kutta
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RungeKutta4;

impl OdeIntegrator for RungeKutta4 {
    fn name(&self) -> &'static str {
        "RK4"
    }
    fn step(
        &self,
        f: &dyn Fn(f64, &DVector<f64>) -> DVector<f64>,
        t: f64,
        y: &DVector<f64>,
        h: f64,
    ) -> DVector<f64> {
        let k1 = f(t, y);
        let k2 = f(t + 0.5 * h, &(y + &k1 * (0.5 * h)));
        let k3 = f(t + 0.5 * h, &(y + &k2 * (0.5 * h)));
        let k4 = f(t + h, &(y + &k3 * h));
        y + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[enum_dispatch(OdeIntegrator)]
pub enum Integrator {
    ForwardEuler(ForwardEuler),
    RungeKutta4(RungeKutta4),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IntegratorType {
    Euler,
    #[default]
    RK4,
}

pub fn create_integrator(kind: IntegratorType) -> Integrator {
    match kind {
        IntegratorType::Euler => Integrator::ForwardEuler(ForwardEuler),
        IntegratorType::RK4 => Integrator::RungeKutta4(RungeKutta4),
    }
}
