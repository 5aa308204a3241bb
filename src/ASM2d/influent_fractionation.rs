//! Converts conventional wastewater measurements into an ASM2d influent state using fixed
//! fractionation ratios.
//!
//! COD is split into SI, SF, SA (= VFA), XI, XS and XH; TKN into SNH (= NH4-N) and the
//! organic pools SND/XND; phosphate goes to SPO4 and the remaining organic P is carried by
//! the organic fractions. XS takes whatever COD the other fractions leave, so the total
//! COD is preserved as long as that remainder is non-negative.

use super::errors::ASMError;
use super::state_vector::{Component, StateVector, clamp_non_negative, state_from_pairs};
use serde::{Deserialize, Serialize};

/// Conventional influent analysis [g/m³, alkalinity mol HCO3⁻/m³]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConventionalInfluent {
    pub cod: f64,
    pub tkn: f64,
    pub nh4_n: f64,
    pub tp: f64,
    pub po4_p: f64,
    pub vfa: f64,
    pub alkalinity: f64,
    #[serde(default)]
    pub no3_n: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractionationRatios {
    /// SI / COD
    pub f_SI: f64,
    /// XI / COD
    pub f_XI: f64,
    /// XH / COD
    pub f_XH: f64,
    /// readily biodegradable (SF + SA) / COD
    pub f_SS: f64,
    /// SND / organic N
    pub f_SND: f64,
}

impl Default for FractionationRatios {
    fn default() -> Self {
        Self {
            f_SI: 0.05,
            f_XI: 0.10,
            f_XH: 0.10,
            f_SS: 0.20,
            f_SND: 0.25,
        }
    }
}

impl ConventionalInfluent {
    pub fn validate(&self) -> Result<(), ASMError> {
        for (name, v) in [
            ("COD", self.cod),
            ("TKN", self.tkn),
            ("NH4-N", self.nh4_n),
            ("TP", self.tp),
            ("PO4-P", self.po4_p),
            ("VFA", self.vfa),
            ("alkalinity", self.alkalinity),
            ("NO3-N", self.no3_n),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(ASMError::InvalidParameter(format!(
                    "influent {} must be non-negative, got {}",
                    name, v
                )));
            }
        }
        if self.nh4_n > self.tkn {
            return Err(ASMError::InvalidParameter(format!(
                "NH4-N ({}) exceeds TKN ({})",
                self.nh4_n, self.tkn
            )));
        }
        if self.po4_p > self.tp {
            return Err(ASMError::InvalidParameter(format!(
                "PO4-P ({}) exceeds TP ({})",
                self.po4_p, self.tp
            )));
        }
        Ok(())
    }

    pub fn fractionate(&self, ratios: &FractionationRatios) -> StateVector {
        let cod = self.cod;
        let si = ratios.f_SI * cod;
        let xi = ratios.f_XI * cod;
        let xh = ratios.f_XH * cod;
        let sa = self.vfa;
        let sf = (ratios.f_SS * cod - sa).max(0.0);
        let xs = cod - si - xi - xh - sa - sf;
        let organic_n = (self.tkn - self.nh4_n).max(0.0);
        let mut state = state_from_pairs(&[
            (Component::SI, si),
            (Component::SF, sf),
            (Component::SA, sa),
            (Component::SNO, self.no3_n),
            (Component::SNH, self.nh4_n),
            (Component::SND, ratios.f_SND * organic_n),
            (Component::SPO4, self.po4_p),
            (Component::SALK, self.alkalinity),
            (Component::XI, xi),
            (Component::XS, xs),
            (Component::XH, xh),
            (Component::XND, (1.0 - ratios.f_SND) * organic_n),
        ]);
        clamp_non_negative(&mut state);
        state
    }
}
