use super::errors::ASMError;
use super::state_vector::{Component, StateVector, state_from_pairs};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum_macros::EnumIter;

/// DO setpoint of aerobic zones when none is given [g O2/m³]
pub const DEFAULT_DO_SETPOINT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    Anaerobic,
    Anoxic,
    Aerobic,
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ZoneType::Anaerobic => "anaerobic",
            ZoneType::Anoxic => "anoxic",
            ZoneType::Aerobic => "aerobic",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ZoneType {
    type Err = ASMError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anaerobic" => Ok(ZoneType::Anaerobic),
            "anoxic" => Ok(ZoneType::Anoxic),
            "aerobic" | "oxic" => Ok(ZoneType::Aerobic),
            _ => Err(ASMError::UnknownZoneType(s.to_string())),
        }
    }
}

/// A completely mixed tank with its own state. The steady-state solver mutates `state`
/// in place; the last written state is the zone's effluent.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactorZone {
    pub zone_type: ZoneType,
    /// hydraulic retention time [h]
    pub hrt_hours: f64,
    /// used by aerobic zones only [g O2/m³]
    pub do_setpoint: f64,
    pub state: StateVector,
}

impl ReactorZone {
    pub fn new(
        zone_type: ZoneType,
        hrt_hours: f64,
        do_setpoint: Option<f64>,
    ) -> Result<Self, ASMError> {
        if !(hrt_hours.is_finite() && hrt_hours > 0.0) {
            return Err(ASMError::InvalidParameter(format!(
                "HRT of a {} zone must be positive, got {} h",
                zone_type, hrt_hours
            )));
        }
        let do_setpoint = do_setpoint.unwrap_or(DEFAULT_DO_SETPOINT);
        if !(do_setpoint.is_finite() && do_setpoint >= 0.0) {
            return Err(ASMError::InvalidParameter(format!(
                "DO setpoint must be non-negative, got {}",
                do_setpoint
            )));
        }
        let mut zone = Self {
            zone_type,
            hrt_hours,
            do_setpoint,
            state: StateVector::zeros(),
        };
        zone.state = zone.default_initial_state();
        Ok(zone)
    }

    pub fn with_state(mut self, state: StateVector) -> Self {
        self.state = state;
        self
    }

    pub fn hrt_days(&self) -> f64 {
        self.hrt_hours / 24.0
    }

    /// the DO value the aeration flow term pulls toward: the setpoint in aerobic zones, 0 elsewhere
    pub fn do_target(&self) -> f64 {
        match self.zone_type {
            ZoneType::Aerobic => self.do_setpoint,
            ZoneType::Anaerobic | ZoneType::Anoxic => 0.0,
        }
    }

    /// typical mixed-liquor concentrations of a nutrient-removal plant
    pub fn default_initial_state(&self) -> StateVector {
        let (so, sno, xpha) = match self.zone_type {
            ZoneType::Anaerobic => (0.0, 0.0, 60.0),
            ZoneType::Anoxic => (0.0, 2.0, 30.0),
            ZoneType::Aerobic => (self.do_setpoint, 8.0, 10.0),
        };
        state_from_pairs(&[
            (Component::SI, 30.0),
            (Component::SF, 5.0),
            (Component::SA, 2.0),
            (Component::SO, so),
            (Component::SNO, sno),
            (Component::SNH, 5.0),
            (Component::SND, 1.0),
            (Component::SPO4, 5.0),
            (Component::SALK, 5.0),
            (Component::XI, 1000.0),
            (Component::XS, 100.0),
            (Component::XH, 2000.0),
            (Component::XAUT, 100.0),
            (Component::XPAO, 300.0),
            (Component::XPHA, xpha),
            (Component::XPP, 60.0),
            (Component::XP, 400.0),
            (Component::XND, 4.0),
        ])
    }
}
