//! # ASM2d process rates
//!
//! Evaluates the 21 reaction rates ρ_j [g/m³/d] of the model from a state vector and a
//! temperature-corrected [`KineticParameters`] set. The result is one ordered list of
//! [`ProcessRate`] records (rate, equation text, activity flag), so that values and their
//! labels can never drift apart.
//!
//! ## Process groups
//!
//! | # | Process | Gate |
//! |---|---------|------|
//! | 1-3 | hydrolysis (aerobic, anoxic, anaerobic) | SO / SNO switches × XS/XH saturation |
//! | 4-7 | heterotroph growth on SF and SA, aerobic and anoxic | anoxic scaled by η_NO3_H |
//! | 8 | fermentation SF → SA | inhibited by SO and SNO |
//! | 9 | heterotroph lysis | first order |
//! | 10-17 | PAO: PHA storage, poly-P storage, growth, lysis | anoxic variants scaled by η_NO3_PAO |
//! | 18-19 | nitrifier growth and lysis | growth limited by alkalinity |
//! | 20-21 | precipitation / redissolution | always zero |
//!
//! Storage ratios (XS/XH, XPP/XPAO, XPHA/XPAO) are zero when the carrier biomass is below
//! the [`BIOMASS_FLOOR`](super::switching_functions::BIOMASS_FLOOR), which keeps washed-out
//! reactors from producing huge ratios.
//!
//! The anoxic dPAO processes (12 and 14) are switched off completely once
//! dissolved oxygen reaches `K_O2_PAO`; below that they carry the usual inhibition term.

use super::parameters::KineticParameters;
use super::state_vector::{Component, StateAccess, StateVector};
use super::switching_functions::{
    EPS, biomass_ratio, inhibition, monod, ratio_monod, saturation_inhibition,
};
use nalgebra::SVector;
use prettytable::{Cell, Row, Table};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

pub const N_PROCESSES: usize = 21;
/// a process counts as active when its rate exceeds this value [g/m³/d]
pub const ACTIVE_THRESHOLD: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum Process {
    AerobicHydrolysis,
    AnoxicHydrolysis,
    AnaerobicHydrolysis,
    AerobicGrowthOnSF,
    AerobicGrowthOnSA,
    AnoxicGrowthOnSF,
    AnoxicGrowthOnSA,
    Fermentation,
    LysisXH,
    StoragePHA,
    AerobicStoragePP,
    AnoxicStoragePP,
    AerobicGrowthPAO,
    AnoxicGrowthPAO,
    LysisXPAO,
    LysisXPP,
    LysisXPHA,
    AerobicGrowthAUT,
    LysisXAUT,
    Precipitation,
    Redissolution,
}

impl Process {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn equation(&self) -> &'static str {
        match self {
            Process::AerobicHydrolysis => "K_h*SO/(K_O2+SO)*(XS/XH)/(K_X+XS/XH)*XH",
            Process::AnoxicHydrolysis => {
                "K_h*eta_NO3*K_O2/(K_O2+SO)*SNO/(K_NO3+SNO)*(XS/XH)/(K_X+XS/XH)*XH"
            }
            Process::AnaerobicHydrolysis => {
                "K_h*eta_fe*K_O2/(K_O2+SO)*K_NO3/(K_NO3+SNO)*(XS/XH)/(K_X+XS/XH)*XH"
            }
            Process::AerobicGrowthOnSF => {
                "mu_H*SO/(K_O2+SO)*SF/(K_F+SF)*SF/(SF+SA)*SNH/(K_NH4+SNH)*SPO4/(K_P+SPO4)*SALK/(K_ALK+SALK)*XH"
            }
            Process::AerobicGrowthOnSA => {
                "mu_H*SO/(K_O2+SO)*SA/(K_A+SA)*SA/(SF+SA)*SNH/(K_NH4+SNH)*SPO4/(K_P+SPO4)*SALK/(K_ALK+SALK)*XH"
            }
            Process::AnoxicGrowthOnSF => {
                "mu_H*eta_NO3*K_O2/(K_O2+SO)*SNO/(K_NO3+SNO)*SF/(K_F+SF)*SF/(SF+SA)*SNH/(K_NH4+SNH)*SPO4/(K_P+SPO4)*SALK/(K_ALK+SALK)*XH"
            }
            Process::AnoxicGrowthOnSA => {
                "mu_H*eta_NO3*K_O2/(K_O2+SO)*SNO/(K_NO3+SNO)*SA/(K_A+SA)*SA/(SF+SA)*SNH/(K_NH4+SNH)*SPO4/(K_P+SPO4)*SALK/(K_ALK+SALK)*XH"
            }
            Process::Fermentation => {
                "q_fe*K_O2/(K_O2+SO)*K_NO3/(K_NO3+SNO)*SF/(K_fe+SF)*SALK/(K_ALK+SALK)*XH"
            }
            Process::LysisXH => "b_H*XH",
            Process::StoragePHA => {
                "q_PHA*SA/(K_A+SA)*SALK/(K_ALK+SALK)*(XPP/XPAO)/(K_PP+XPP/XPAO)*XPAO"
            }
            Process::AerobicStoragePP => {
                "q_PP*SO/(K_O2+SO)*SPO4/(K_PS+SPO4)*SALK/(K_ALK+SALK)*(XPHA/XPAO)/(K_PHA+XPHA/XPAO)*(K_MAX-XPP/XPAO)/(K_IPP+K_MAX-XPP/XPAO)*XPAO"
            }
            Process::AnoxicStoragePP => {
                "[SO<K_O2] q_PP*eta_NO3_PAO*K_O2/(K_O2+SO)*SNO/(K_NO3+SNO)*SPO4/(K_PS+SPO4)*SALK/(K_ALK+SALK)*(XPHA/XPAO)/(K_PHA+XPHA/XPAO)*(K_MAX-XPP/XPAO)/(K_IPP+K_MAX-XPP/XPAO)*XPAO"
            }
            Process::AerobicGrowthPAO => {
                "mu_PAO*SO/(K_O2+SO)*SNH/(K_NH4+SNH)*SPO4/(K_P+SPO4)*SALK/(K_ALK+SALK)*(XPHA/XPAO)/(K_PHA+XPHA/XPAO)*XPAO"
            }
            Process::AnoxicGrowthPAO => {
                "[SO<K_O2] mu_PAO*eta_NO3_PAO*K_O2/(K_O2+SO)*SNO/(K_NO3+SNO)*SNH/(K_NH4+SNH)*SPO4/(K_P+SPO4)*SALK/(K_ALK+SALK)*(XPHA/XPAO)/(K_PHA+XPHA/XPAO)*XPAO"
            }
            Process::LysisXPAO => "b_PAO*XPAO",
            Process::LysisXPP => "b_PP*XPP",
            Process::LysisXPHA => "b_PHA*XPHA",
            Process::AerobicGrowthAUT => {
                "mu_AUT*SO/(K_O2+SO)*SNH/(K_NH4+SNH)*SALK/(K_ALK+SALK)*XAUT"
            }
            Process::LysisXAUT => "b_AUT*XAUT",
            Process::Precipitation => "0",
            Process::Redissolution => "0",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRate {
    pub process: Process,
    /// [g/m³/d]
    pub rate: f64,
    pub equation: &'static str,
    pub active: bool,
}

impl ProcessRate {
    fn new(process: Process, rate: f64) -> Self {
        Self {
            process,
            rate,
            equation: process.equation(),
            active: rate > ACTIVE_THRESHOLD,
        }
    }
}

/// Evaluates all 21 rates, in [`Process`] order.
pub fn calculate_process_rates(state: &StateVector, kin: &KineticParameters) -> Vec<ProcessRate> {
    let c = |component: Component| state.conc(component);
    let (so, sno, snh, spo4, salk) = (
        c(Component::SO),
        c(Component::SNO),
        c(Component::SNH),
        c(Component::SPO4),
        c(Component::SALK),
    );
    let (sf, sa) = (c(Component::SF), c(Component::SA));
    let (xs, xh, xaut) = (c(Component::XS), c(Component::XH), c(Component::XAUT));
    let (xpao, xpha, xpp) = (c(Component::XPAO), c(Component::XPHA), c(Component::XPP));

    // hydrolysis
    let hydrolysis = kin.K_h * ratio_monod(xs, xh, kin.K_X) * xh;
    let aerobic_hydrolysis = hydrolysis * monod(so, kin.K_O2_hyd);
    let anoxic_hydrolysis = hydrolysis
        * kin.eta_NO3_hyd
        * inhibition(so, kin.K_O2_hyd)
        * monod(sno, kin.K_NO3_hyd);
    let anaerobic_hydrolysis = hydrolysis
        * kin.eta_fe
        * inhibition(so, kin.K_O2_hyd)
        * inhibition(sno, kin.K_NO3_hyd);

    // heterotrophs
    let nutrients_h =
        monod(snh, kin.K_NH4_H) * monod(spo4, kin.K_P_H) * monod(salk, kin.K_ALK_H);
    let on_sf = monod(sf, kin.K_F) * sf / (sf + sa + EPS);
    let on_sa = monod(sa, kin.K_A_H) * sa / (sf + sa + EPS);
    let aerobic_h = kin.mu_H * monod(so, kin.K_O2_H) * nutrients_h * xh;
    let anoxic_h = kin.mu_H
        * kin.eta_NO3_H
        * inhibition(so, kin.K_O2_H)
        * monod(sno, kin.K_NO3_H)
        * nutrients_h
        * xh;
    let fermentation = kin.q_fe
        * inhibition(so, kin.K_O2_H)
        * inhibition(sno, kin.K_NO3_H)
        * monod(sf, kin.K_fe)
        * monod(salk, kin.K_ALK_H)
        * xh;

    // PAO
    let pp_ratio = biomass_ratio(xpp, xpao);
    let pha_ratio = biomass_ratio(xpha, xpao);
    let alk_pao = monod(salk, kin.K_ALK_PAO);
    let storage_pha =
        kin.q_PHA * monod(sa, kin.K_A_PAO) * alk_pao * monod(pp_ratio, kin.K_PP) * xpao;
    let storage_pp = kin.q_PP
        * monod(spo4, kin.K_PS)
        * alk_pao
        * monod(pha_ratio, kin.K_PHA)
        * saturation_inhibition(pp_ratio, kin.K_MAX, kin.K_IPP)
        * xpao;
    let growth_pao = kin.mu_PAO
        * monod(snh, kin.K_NH4_PAO)
        * monod(spo4, kin.K_P_PAO)
        * alk_pao
        * monod(pha_ratio, kin.K_PHA)
        * xpao;
    let anoxic_pao = if so >= kin.K_O2_PAO {
        0.0
    } else {
        kin.eta_NO3_PAO * inhibition(so, kin.K_O2_PAO) * monod(sno, kin.K_NO3_PAO)
    };
    let aerobic_pao = monod(so, kin.K_O2_PAO);

    // nitrifiers
    let nitrification = kin.mu_AUT
        * monod(so, kin.K_O2_AUT)
        * monod(snh, kin.K_NH4_AUT)
        * monod(salk, kin.K_ALK_AUT)
        * xaut;

    Process::iter()
        .map(|process| {
            let rate = match process {
                Process::AerobicHydrolysis => aerobic_hydrolysis,
                Process::AnoxicHydrolysis => anoxic_hydrolysis,
                Process::AnaerobicHydrolysis => anaerobic_hydrolysis,
                Process::AerobicGrowthOnSF => aerobic_h * on_sf,
                Process::AerobicGrowthOnSA => aerobic_h * on_sa,
                Process::AnoxicGrowthOnSF => anoxic_h * on_sf,
                Process::AnoxicGrowthOnSA => anoxic_h * on_sa,
                Process::Fermentation => fermentation,
                Process::LysisXH => kin.b_H * xh,
                Process::StoragePHA => storage_pha,
                Process::AerobicStoragePP => storage_pp * aerobic_pao,
                Process::AnoxicStoragePP => storage_pp * anoxic_pao,
                Process::AerobicGrowthPAO => growth_pao * aerobic_pao,
                Process::AnoxicGrowthPAO => growth_pao * anoxic_pao,
                Process::LysisXPAO => kin.b_PAO * xpao,
                Process::LysisXPP => kin.b_PP * xpp,
                Process::LysisXPHA => kin.b_PHA * xpha,
                Process::AerobicGrowthAUT => nitrification,
                Process::LysisXAUT => kin.b_AUT * xaut,
                Process::Precipitation | Process::Redissolution => 0.0,
            };
            ProcessRate::new(process, rate)
        })
        .collect()
}

/// the rates alone, as the vector multiplied with the stoichiometric matrix
pub fn rate_vector(rates: &[ProcessRate]) -> SVector<f64, N_PROCESSES> {
    let mut vector = SVector::<f64, N_PROCESSES>::zeros();
    for record in rates {
        vector[record.process.index()] = record.rate;
    }
    vector
}

pub fn pretty_print_rates(rates: &[ProcessRate]) {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("#"),
        Cell::new("process"),
        Cell::new("rate, g/m3/d"),
        Cell::new("active"),
    ]));
    for record in rates {
        table.add_row(Row::new(vec![
            Cell::new(&(record.process.index() + 1).to_string()),
            Cell::new(&record.process.to_string()),
            Cell::new(&format!("{:.4e}", record.rate)),
            Cell::new(if record.active { "yes" } else { "" }),
        ]));
    }
    table.printstd();
}
