//! Arrhenius correction of the kinetic rate constants: k(T) = k(20)·θ^(T−20).
//! Half-saturation constants and efficiency factors are not temperature dependent.

use super::parameters::{ArrheniusCoefficients, KineticParameters};

/// reference temperature of the default parameter set [°C]
pub const T_REF: f64 = 20.0;

pub fn arrhenius_factor(theta: f64, temperature: f64) -> f64 {
    theta.powf(temperature - T_REF)
}

/// Returns a corrected copy of `base`; `base` itself is left untouched.
pub fn temperature_corrected(
    base: &KineticParameters,
    temperature: f64,
    theta: &ArrheniusCoefficients,
) -> KineticParameters {
    let f = |theta: f64| arrhenius_factor(theta, temperature);
    KineticParameters {
        K_h: base.K_h * f(theta.theta_hydrolysis),
        mu_H: base.mu_H * f(theta.theta_growth_H),
        q_fe: base.q_fe * f(theta.theta_fermentation),
        b_H: base.b_H * f(theta.theta_lysis_H),
        q_PHA: base.q_PHA * f(theta.theta_storage_PHA),
        q_PP: base.q_PP * f(theta.theta_storage_PP),
        mu_PAO: base.mu_PAO * f(theta.theta_growth_PAO),
        b_PAO: base.b_PAO * f(theta.theta_lysis_PAO),
        b_PP: base.b_PP * f(theta.theta_lysis_PP),
        b_PHA: base.b_PHA * f(theta.theta_lysis_PHA),
        mu_AUT: base.mu_AUT * f(theta.theta_growth_AUT),
        b_AUT: base.b_AUT * f(theta.theta_lysis_AUT),
        ..base.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn reference_temperature_is_identity() {
        let base = KineticParameters::default();
        let corrected = temperature_corrected(&base, T_REF, &ArrheniusCoefficients::default());
        assert_eq!(corrected, base);
    }

    #[test]
    fn rates_increase_with_temperature_and_decrease_below_reference() {
        let base = KineticParameters::default();
        let theta = ArrheniusCoefficients::default();
        let cold = temperature_corrected(&base, 12.0, &theta);
        let warm = temperature_corrected(&base, 25.0, &theta);
        let hot = temperature_corrected(&base, 30.0, &theta);
        let reference = base.thermal_rate_constants();
        for i in 0..reference.len() {
            let (name, k20) = reference[i];
            let k_cold = cold.thermal_rate_constants()[i].1;
            let k_warm = warm.thermal_rate_constants()[i].1;
            let k_hot = hot.thermal_rate_constants()[i].1;
            assert!(k_cold < k20, "{} did not decrease below 20 C", name);
            assert!(k20 < k_warm && k_warm < k_hot, "{} not increasing with T", name);
        }
    }

    #[test]
    fn non_thermal_parameters_pass_through() {
        let base = KineticParameters::default();
        let corrected = temperature_corrected(&base, 10.0, &ArrheniusCoefficients::default());
        assert_eq!(corrected.K_O2_PAO, base.K_O2_PAO);
        assert_eq!(corrected.eta_NO3_PAO, base.eta_NO3_PAO);
        assert_eq!(corrected.K_MAX, base.K_MAX);
        // ASM2d 10 C value of mu_AUT is 0.35
        assert_relative_eq!(corrected.mu_AUT, 0.35, epsilon = 0.01);
        // input untouched
        assert_eq!(base, KineticParameters::default());
    }
}
