//! # ASM2d parameter sets
//!
//! Three immutable parameter objects are passed explicitly into every calculation:
//!
//! - [`KineticParameters`]: rate constants at 20 °C, half-saturation constants and
//!   anoxic efficiency factors
//! - [`ArrheniusCoefficients`]: one θ per kinetic group, used by the temperature correction
//! - [`StoichiometricParameters`]: yields and N/P content fractions, the only input of the
//!   stoichiometric matrix builder
//!
//! Defaults are the ASM2d values at 20 °C (Henze et al., IWA Scientific and Technical
//! Report No. 9) with the organic-nitrogen pools SND/XND tracked explicitly.
//! All structs deserialize with `#[serde(default)]`, so a task file may override
//! any subset of values.

use super::errors::ASMError;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kinetic constants. Units: rates 1/d, half-saturation constants g/m³ (alkalinity mol/m³),
/// storage ratio constants g/g, efficiency factors dimensionless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KineticParameters {
    // hydrolysis
    pub K_h: f64,
    /// anoxic hydrolysis reduction factor
    pub eta_NO3_hyd: f64,
    /// anaerobic hydrolysis reduction factor
    pub eta_fe: f64,
    pub K_O2_hyd: f64,
    pub K_NO3_hyd: f64,
    /// saturation coefficient for XS/XH
    pub K_X: f64,
    // heterotrophs
    pub mu_H: f64,
    pub q_fe: f64,
    /// denitrification efficiency of heterotrophic growth
    pub eta_NO3_H: f64,
    pub b_H: f64,
    pub K_O2_H: f64,
    pub K_F: f64,
    pub K_fe: f64,
    pub K_A_H: f64,
    pub K_NO3_H: f64,
    pub K_NH4_H: f64,
    pub K_P_H: f64,
    pub K_ALK_H: f64,
    // phosphate-accumulating organisms
    pub q_PHA: f64,
    pub q_PP: f64,
    pub mu_PAO: f64,
    /// fraction of PAO activity available under anoxic conditions (denitrifying PAO)
    pub eta_NO3_PAO: f64,
    pub b_PAO: f64,
    pub b_PP: f64,
    pub b_PHA: f64,
    /// also the hard switch of the anoxic dPAO processes: they stop at SO >= K_O2_PAO
    pub K_O2_PAO: f64,
    pub K_NO3_PAO: f64,
    pub K_A_PAO: f64,
    pub K_NH4_PAO: f64,
    pub K_PS: f64,
    pub K_P_PAO: f64,
    pub K_ALK_PAO: f64,
    pub K_PP: f64,
    pub K_MAX: f64,
    pub K_IPP: f64,
    pub K_PHA: f64,
    // nitrifiers
    pub mu_AUT: f64,
    pub b_AUT: f64,
    pub K_O2_AUT: f64,
    pub K_NH4_AUT: f64,
    pub K_ALK_AUT: f64,
}

impl Default for KineticParameters {
    fn default() -> Self {
        Self {
            K_h: 3.0,
            eta_NO3_hyd: 0.6,
            eta_fe: 0.4,
            K_O2_hyd: 0.2,
            K_NO3_hyd: 0.5,
            K_X: 0.1,
            mu_H: 6.0,
            q_fe: 3.0,
            eta_NO3_H: 0.8,
            b_H: 0.4,
            K_O2_H: 0.2,
            K_F: 4.0,
            K_fe: 4.0,
            K_A_H: 4.0,
            K_NO3_H: 0.5,
            K_NH4_H: 0.05,
            K_P_H: 0.01,
            K_ALK_H: 0.1,
            q_PHA: 3.0,
            q_PP: 1.5,
            mu_PAO: 1.0,
            eta_NO3_PAO: 0.6,
            b_PAO: 0.2,
            b_PP: 0.2,
            b_PHA: 0.2,
            K_O2_PAO: 0.2,
            K_NO3_PAO: 0.5,
            K_A_PAO: 4.0,
            K_NH4_PAO: 0.05,
            K_PS: 0.2,
            K_P_PAO: 0.01,
            K_ALK_PAO: 0.1,
            K_PP: 0.01,
            K_MAX: 0.34,
            K_IPP: 0.02,
            K_PHA: 0.01,
            mu_AUT: 1.0,
            b_AUT: 0.15,
            K_O2_AUT: 0.5,
            K_NH4_AUT: 1.0,
            K_ALK_AUT: 0.5,
        }
    }
}

impl KineticParameters {
    /// The temperature-dependent rate constants, in a fixed order.
    pub fn thermal_rate_constants(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("K_h", self.K_h),
            ("mu_H", self.mu_H),
            ("q_fe", self.q_fe),
            ("b_H", self.b_H),
            ("q_PHA", self.q_PHA),
            ("q_PP", self.q_PP),
            ("mu_PAO", self.mu_PAO),
            ("b_PAO", self.b_PAO),
            ("b_PP", self.b_PP),
            ("b_PHA", self.b_PHA),
            ("mu_AUT", self.mu_AUT),
            ("b_AUT", self.b_AUT),
        ]
    }

    pub fn validate(&self) -> Result<(), ASMError> {
        check_non_negative(&serde_json::to_value(self)?, "kinetic parameter")
    }
}

/// Arrhenius θ of each kinetic group: k(T) = k(20)·θ^(T−20)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrheniusCoefficients {
    pub theta_hydrolysis: f64,
    pub theta_growth_H: f64,
    pub theta_fermentation: f64,
    pub theta_lysis_H: f64,
    pub theta_storage_PHA: f64,
    pub theta_storage_PP: f64,
    pub theta_growth_PAO: f64,
    pub theta_lysis_PAO: f64,
    pub theta_lysis_PP: f64,
    pub theta_lysis_PHA: f64,
    pub theta_growth_AUT: f64,
    pub theta_lysis_AUT: f64,
}

impl Default for ArrheniusCoefficients {
    /// θ values reproduce the ASM2d 10 °C / 20 °C parameter pairs
    fn default() -> Self {
        Self {
            theta_hydrolysis: 1.041,
            theta_growth_H: 1.072,
            theta_fermentation: 1.072,
            theta_lysis_H: 1.072,
            theta_storage_PHA: 1.041,
            theta_storage_PP: 1.041,
            theta_growth_PAO: 1.041,
            theta_lysis_PAO: 1.072,
            theta_lysis_PP: 1.072,
            theta_lysis_PHA: 1.072,
            theta_growth_AUT: 1.111,
            theta_lysis_AUT: 1.116,
        }
    }
}

impl ArrheniusCoefficients {
    pub fn validate(&self) -> Result<(), ASMError> {
        let value = serde_json::to_value(self)?;
        if let Value::Object(map) = &value {
            for (name, theta) in map {
                let theta = theta.as_f64().unwrap_or(f64::NAN);
                if !(theta.is_finite() && theta > 0.0) {
                    return Err(ASMError::InvalidParameter(format!(
                        "Arrhenius coefficient {} must be positive, got {}",
                        name, theta
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Yields [g COD/g COD, Y_PO4 in g P/g COD, Y_PHA in g COD/g P] and content fractions
/// (i_N_* in g N/g COD, i_P_* in g P/g COD).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoichiometricParameters {
    /// fraction of hydrolysed XS released as SI
    pub f_SI: f64,
    pub Y_H: f64,
    /// fraction of lysed biomass that becomes inert XP
    pub f_P: f64,
    pub Y_PAO: f64,
    /// poly-P released per unit of SA stored as PHA
    pub Y_PO4: f64,
    /// PHA consumed per unit of poly-P stored
    pub Y_PHA: f64,
    pub Y_A: f64,
    pub i_N_SI: f64,
    pub i_N_SF: f64,
    pub i_N_XI: f64,
    pub i_N_XS: f64,
    pub i_N_BM: f64,
    pub i_N_XP: f64,
    pub i_P_SI: f64,
    pub i_P_SF: f64,
    pub i_P_XI: f64,
    pub i_P_XS: f64,
    pub i_P_BM: f64,
    pub i_P_XP: f64,
}

impl Default for StoichiometricParameters {
    fn default() -> Self {
        Self {
            f_SI: 0.0,
            Y_H: 0.625,
            f_P: 0.1,
            Y_PAO: 0.625,
            Y_PO4: 0.40,
            Y_PHA: 0.20,
            Y_A: 0.24,
            i_N_SI: 0.01,
            i_N_SF: 0.03,
            i_N_XI: 0.02,
            i_N_XS: 0.04,
            i_N_BM: 0.07,
            i_N_XP: 0.02,
            i_P_SI: 0.0,
            i_P_SF: 0.01,
            i_P_XI: 0.01,
            i_P_XS: 0.01,
            i_P_BM: 0.02,
            i_P_XP: 0.01,
        }
    }
}

impl StoichiometricParameters {
    pub fn validate(&self) -> Result<(), ASMError> {
        check_non_negative(&serde_json::to_value(self)?, "stoichiometric parameter")?;
        for (name, y) in [
            ("Y_H", self.Y_H),
            ("Y_PAO", self.Y_PAO),
            ("Y_A", self.Y_A),
        ] {
            if !(y > 0.0 && y < 1.0) {
                return Err(ASMError::InvalidParameter(format!(
                    "yield {} must lie in (0, 1), got {}",
                    name, y
                )));
            }
        }
        for (name, f) in [("f_SI", self.f_SI), ("f_P", self.f_P)] {
            if f > 1.0 {
                return Err(ASMError::InvalidParameter(format!(
                    "fraction {} must not exceed 1, got {}",
                    name, f
                )));
            }
        }
        Ok(())
    }
}

fn check_non_negative(value: &Value, what: &str) -> Result<(), ASMError> {
    if let Value::Object(map) = value {
        for (name, v) in map {
            let v = v.as_f64().unwrap_or(f64::NAN);
            if !(v.is_finite() && v >= 0.0) {
                return Err(ASMError::InvalidParameter(format!(
                    "{} {} must be a non-negative number, got {}",
                    what, name, v
                )));
            }
        }
    }
    Ok(())
}

/// prints any of the parameter sets as a two-column table
pub fn pretty_print_parameters<T: Serialize>(title: &str, parameters: &T) -> Result<(), ASMError> {
    let value = serde_json::to_value(parameters)?;
    let mut table = Table::new();
    table.add_row(Row::new(vec![Cell::new(title), Cell::new("value")]));
    if let Value::Object(map) = value {
        for (name, v) in map {
            table.add_row(Row::new(vec![Cell::new(&name), Cell::new(&v.to_string())]));
        }
    }
    table.printstd();
    Ok(())
}
