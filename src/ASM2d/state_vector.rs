//! # ASM2d state vector
//!
//! The 19 components of the model, stored in a fixed-size `nalgebra` vector so that the
//! state, the derivative and the rows of the stoichiometric matrix share one layout.
//!
//! | Index | Component | Meaning | Units |
//! |-------|-----------|---------|-------|
//! | 0 | `SI` | soluble inert organics | g COD/m³ |
//! | 1 | `SF` | fermentable substrate | g COD/m³ |
//! | 2 | `SA` | fermentation products (acetate) | g COD/m³ |
//! | 3 | `SO` | dissolved oxygen | g O2/m³ |
//! | 4 | `SNO` | nitrate + nitrite | g N/m³ |
//! | 5 | `SNH` | ammonium | g N/m³ |
//! | 6 | `SND` | soluble organic nitrogen | g N/m³ |
//! | 7 | `SPO4` | phosphate | g P/m³ |
//! | 8 | `SALK` | alkalinity | mol HCO3⁻/m³ |
//! | 9 | `SN2` | dinitrogen from denitrification | g N/m³ |
//! | 10 | `XI` | particulate inert organics | g COD/m³ |
//! | 11 | `XS` | slowly biodegradable substrate | g COD/m³ |
//! | 12 | `XH` | heterotrophs | g COD/m³ |
//! | 13 | `XAUT` | nitrifiers | g COD/m³ |
//! | 14 | `XPAO` | phosphate-accumulating organisms | g COD/m³ |
//! | 15 | `XPHA` | stored polyhydroxyalkanoates | g COD/m³ |
//! | 16 | `XPP` | stored poly-phosphate | g P/m³ |
//! | 17 | `XP` | particulate inert products of decay | g COD/m³ |
//! | 18 | `XND` | particulate organic nitrogen | g N/m³ |

use super::errors::ASMError;
use nalgebra::SVector;
use std::collections::HashMap;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

pub const N_COMPONENTS: usize = 19;
/// concentrations of all components in [`Component`] order
pub type StateVector = SVector<f64, N_COMPONENTS>;

/// relative changes are measured against max(|old|, floor) so that components sitting at
/// zero do not block convergence
pub const RELATIVE_CHANGE_FLOOR: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
pub enum Component {
    SI,
    SF,
    SA,
    SO,
    SNO,
    SNH,
    SND,
    SPO4,
    SALK,
    SN2,
    XI,
    XS,
    XH,
    XAUT,
    XPAO,
    XPHA,
    XPP,
    XP,
    XND,
}

impl Component {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn description(&self) -> &'static str {
        match self {
            Component::SI => "soluble inert organics",
            Component::SF => "fermentable substrate",
            Component::SA => "fermentation products",
            Component::SO => "dissolved oxygen",
            Component::SNO => "nitrate",
            Component::SNH => "ammonium",
            Component::SND => "soluble organic nitrogen",
            Component::SPO4 => "phosphate",
            Component::SALK => "alkalinity",
            Component::SN2 => "dinitrogen",
            Component::XI => "particulate inert organics",
            Component::XS => "slowly biodegradable substrate",
            Component::XH => "heterotrophic biomass",
            Component::XAUT => "autotrophic biomass",
            Component::XPAO => "PAO biomass",
            Component::XPHA => "stored PHA",
            Component::XPP => "stored poly-phosphate",
            Component::XP => "inert decay products",
            Component::XND => "particulate organic nitrogen",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Component::SO => "g O2/m3",
            Component::SNO
            | Component::SNH
            | Component::SND
            | Component::SN2
            | Component::XND => "g N/m3",
            Component::SPO4 | Component::XPP => "g P/m3",
            Component::SALK => "mol/m3",
            _ => "g COD/m3",
        }
    }

    pub fn is_particulate(&self) -> bool {
        self.to_string().starts_with('X')
    }
}

/// Named access to the components of a [`StateVector`].
pub trait StateAccess {
    fn conc(&self, component: Component) -> f64;
    fn set_conc(&mut self, component: Component, value: f64);
}

impl StateAccess for StateVector {
    fn conc(&self, component: Component) -> f64 {
        self[component.index()]
    }

    fn set_conc(&mut self, component: Component, value: f64) {
        self[component.index()] = value;
    }
}

/// state with every component at zero
pub fn zero_state() -> StateVector {
    StateVector::zeros()
}

/// state with the listed components set and all others zero
pub fn state_from_pairs(pairs: &[(Component, f64)]) -> StateVector {
    let mut state = zero_state();
    for (component, value) in pairs {
        state.set_conc(*component, *value);
    }
    state
}

/// Negative concentrations are numerical artefacts of time stepping; they are cut to zero.
pub fn clamp_non_negative(state: &mut StateVector) {
    for value in state.iter_mut() {
        if *value < 0.0 || value.is_nan() {
            *value = 0.0;
        }
    }
}

/// max over components of |new - old| / max(|old|, RELATIVE_CHANGE_FLOOR)
pub fn max_relative_change(new: &StateVector, old: &StateVector) -> f64 {
    new.iter()
        .zip(old.iter())
        .map(|(n, o)| (n - o).abs() / o.abs().max(RELATIVE_CHANGE_FLOOR))
        .fold(0.0, f64::max)
}

/// Builds a state from a map of component names ("SNH", "XH", ...). Missing names are zero.
pub fn state_from_map(map: &HashMap<String, f64>) -> Result<StateVector, ASMError> {
    let mut state = zero_state();
    for (name, value) in map {
        let component = Component::from_str(name.trim())
            .map_err(|_| ASMError::UnknownComponent(name.clone()))?;
        if !value.is_finite() {
            return Err(ASMError::InvalidParameter(format!(
                "concentration of {} is not a finite number",
                name
            )));
        }
        state.set_conc(component, *value);
    }
    clamp_non_negative(&mut state);
    Ok(state)
}

pub fn state_to_map(state: &StateVector) -> HashMap<String, f64> {
    Component::iter()
        .map(|c| (c.to_string(), state.conc(c)))
        .collect()
}
