//! # Stoichiometric matrix
//!
//! Builds the 21×19 coupling matrix ν (row = process, column = component; negative =
//! consumed, positive = produced) from a [`StoichiometricParameters`] set. The builder is
//! a pure function: the matrix only has to be rebuilt when the stoichiometric parameters
//! change, and the same matrix is reused by every derivative evaluation of a run.
//!
//! ## Conservation
//!
//! Every row conserves four quantities. For a row ν_j and a weight vector w,
//! Σ_i ν_ji·w_i = 0 where
//!
//! | Quantity | Non-zero weights |
//! |----------|------------------|
//! | COD | organics 1, SO −1, SNO −64/14, SN2 −24/14 |
//! | N | SNH, SNO, SN2, SND, XND 1; biomass i_N_BM; SI/XI/XP their i_N |
//! | P | SPO4, XPP 1; biomass i_P_BM; SI/SF/XI/XS/XP their i_P |
//! | charge | SNH 1/14, SNO −1/14, SPO4 −1/31, XPP −1/31, SALK −1 |
//!
//! Nitrate used as electron acceptor is reduced to N2, which is worth 40/14 ≈ 2.86 g O2
//! per g N. The alkalinity column is not set by hand: it is derived from the ion
//! coefficients of the row, which makes the charge balance hold by construction.
//!
//! The organic nitrogen of SF and XS is carried by SND and XND: hydrolysis moves
//! i_N_XS g N from XND to SND (i_N_SF share) and SNH, and growth on SF ammonifies the
//! SND that accompanies the consumed substrate.

use super::parameters::StoichiometricParameters;
use super::process_rates::{N_PROCESSES, Process};
use super::state_vector::{Component, N_COMPONENTS, StateAccess, StateVector};
use nalgebra::{SMatrix, SVector};

pub type StoichiometricMatrix = SMatrix<f64, N_PROCESSES, N_COMPONENTS>;

/// g N per mol N
pub const N_MOLAR_MASS: f64 = 14.0;
/// g P per mol P
pub const P_MOLAR_MASS: f64 = 31.0;
/// COD of nitrate nitrogen [g COD/g N]
pub const COD_OF_NITRATE: f64 = -64.0 / 14.0;
/// COD of dinitrogen [g COD/g N]
pub const COD_OF_N2: f64 = -24.0 / 14.0;
/// oxygen equivalent of nitrate reduced to N2 [g O2/g N], ≈ 2.86
pub const NO3_TO_N2_O2_EQUIVALENT: f64 = 40.0 / 14.0;

pub fn build_stoichiometric_matrix(p: &StoichiometricParameters) -> StoichiometricMatrix {
    let mut rows: Vec<(Process, Vec<(Component, f64)>)> = Vec::with_capacity(N_PROCESSES);

    // hydrolysis: same coefficients under all three electron-acceptor conditions
    let hydrolysis = vec![
        (Component::XS, -1.0),
        (Component::SF, 1.0 - p.f_SI),
        (Component::SI, p.f_SI),
        (Component::XND, -p.i_N_XS),
        (Component::SND, (1.0 - p.f_SI) * p.i_N_SF),
        (
            Component::SNH,
            p.i_N_XS - (1.0 - p.f_SI) * p.i_N_SF - p.f_SI * p.i_N_SI,
        ),
        (
            Component::SPO4,
            p.i_P_XS - (1.0 - p.f_SI) * p.i_P_SF - p.f_SI * p.i_P_SI,
        ),
    ];
    rows.push((Process::AerobicHydrolysis, hydrolysis.clone()));
    rows.push((Process::AnoxicHydrolysis, hydrolysis.clone()));
    rows.push((Process::AnaerobicHydrolysis, hydrolysis));

    // heterotrophs
    let y = p.Y_H;
    let oxygen_h = (1.0 - y) / y;
    let nitrate_h = (1.0 - y) / (NO3_TO_N2_O2_EQUIVALENT * y);
    let growth_on_sf = |acceptor: Vec<(Component, f64)>| {
        let mut row = vec![
            (Component::XH, 1.0),
            (Component::SF, -1.0 / y),
            (Component::SND, -p.i_N_SF / y),
            (Component::SNH, p.i_N_SF / y - p.i_N_BM),
            (Component::SPO4, p.i_P_SF / y - p.i_P_BM),
        ];
        row.extend(acceptor);
        row
    };
    let growth_on_sa = |acceptor: Vec<(Component, f64)>| {
        let mut row = vec![
            (Component::XH, 1.0),
            (Component::SA, -1.0 / y),
            (Component::SNH, -p.i_N_BM),
            (Component::SPO4, -p.i_P_BM),
        ];
        row.extend(acceptor);
        row
    };
    let aerobic = |o2: f64| vec![(Component::SO, -o2)];
    let anoxic = |no3: f64| vec![(Component::SNO, -no3), (Component::SN2, no3)];
    rows.push((Process::AerobicGrowthOnSF, growth_on_sf(aerobic(oxygen_h))));
    rows.push((Process::AerobicGrowthOnSA, growth_on_sa(aerobic(oxygen_h))));
    rows.push((Process::AnoxicGrowthOnSF, growth_on_sf(anoxic(nitrate_h))));
    rows.push((Process::AnoxicGrowthOnSA, growth_on_sa(anoxic(nitrate_h))));
    rows.push((
        Process::Fermentation,
        vec![
            (Component::SF, -1.0),
            (Component::SA, 1.0),
            (Component::SND, -p.i_N_SF),
            (Component::SNH, p.i_N_SF),
            (Component::SPO4, p.i_P_SF),
        ],
    ));
    let lysis = |biomass: Component| {
        vec![
            (biomass, -1.0),
            (Component::XS, 1.0 - p.f_P),
            (Component::XP, p.f_P),
            (Component::XND, (1.0 - p.f_P) * p.i_N_XS),
            (
                Component::SNH,
                p.i_N_BM - p.f_P * p.i_N_XP - (1.0 - p.f_P) * p.i_N_XS,
            ),
            (
                Component::SPO4,
                p.i_P_BM - p.f_P * p.i_P_XP - (1.0 - p.f_P) * p.i_P_XS,
            ),
        ]
    };
    rows.push((Process::LysisXH, lysis(Component::XH)));

    // phosphate-accumulating organisms
    rows.push((
        Process::StoragePHA,
        vec![
            (Component::SA, -1.0),
            (Component::XPHA, 1.0),
            (Component::XPP, -p.Y_PO4),
            (Component::SPO4, p.Y_PO4),
        ],
    ));
    let storage_pp = |acceptor: Vec<(Component, f64)>| {
        let mut row = vec![
            (Component::XPHA, -p.Y_PHA),
            (Component::XPP, 1.0),
            (Component::SPO4, -1.0),
        ];
        row.extend(acceptor);
        row
    };
    rows.push((Process::AerobicStoragePP, storage_pp(aerobic(p.Y_PHA))));
    rows.push((
        Process::AnoxicStoragePP,
        storage_pp(anoxic(p.Y_PHA / NO3_TO_N2_O2_EQUIVALENT)),
    ));
    let y_pao = p.Y_PAO;
    let growth_pao = |acceptor: Vec<(Component, f64)>| {
        let mut row = vec![
            (Component::XPAO, 1.0),
            (Component::XPHA, -1.0 / y_pao),
            (Component::SNH, -p.i_N_BM),
            (Component::SPO4, -p.i_P_BM),
        ];
        row.extend(acceptor);
        row
    };
    rows.push((
        Process::AerobicGrowthPAO,
        growth_pao(aerobic((1.0 - y_pao) / y_pao)),
    ));
    rows.push((
        Process::AnoxicGrowthPAO,
        growth_pao(anoxic((1.0 - y_pao) / (NO3_TO_N2_O2_EQUIVALENT * y_pao))),
    ));
    rows.push((Process::LysisXPAO, lysis(Component::XPAO)));
    rows.push((
        Process::LysisXPP,
        vec![(Component::XPP, -1.0), (Component::SPO4, 1.0)],
    ));
    rows.push((
        Process::LysisXPHA,
        vec![(Component::XPHA, -1.0), (Component::SA, 1.0)],
    ));

    // nitrifiers
    let y_a = p.Y_A;
    rows.push((
        Process::AerobicGrowthAUT,
        vec![
            (Component::XAUT, 1.0),
            (Component::SNH, -p.i_N_BM - 1.0 / y_a),
            (Component::SNO, 1.0 / y_a),
            (Component::SO, -(-COD_OF_NITRATE - y_a) / y_a),
            (Component::SPO4, -p.i_P_BM),
        ],
    ));
    rows.push((Process::LysisXAUT, lysis(Component::XAUT)));

    // Process::Precipitation and Process::Redissolution keep zero rows

    let mut matrix = StoichiometricMatrix::zeros();
    for (process, coefficients) in rows {
        let j = process.index();
        for (component, value) in coefficients {
            matrix[(j, component.index())] += value;
        }
        let alkalinity = matrix[(j, Component::SNH.index())] / N_MOLAR_MASS
            - matrix[(j, Component::SNO.index())] / N_MOLAR_MASS
            - matrix[(j, Component::SPO4.index())] / P_MOLAR_MASS
            - matrix[(j, Component::XPP.index())] / P_MOLAR_MASS;
        matrix[(j, Component::SALK.index())] = alkalinity;
    }
    matrix
}

/// Weight vectors of the four conserved quantities, in [`Component`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct ConservationWeights {
    pub cod: StateVector,
    pub nitrogen: StateVector,
    pub phosphorus: StateVector,
    pub charge: StateVector,
}

pub fn conservation_weights(p: &StoichiometricParameters) -> ConservationWeights {
    let mut cod = StateVector::zeros();
    for component in [
        Component::SI,
        Component::SF,
        Component::SA,
        Component::XI,
        Component::XS,
        Component::XH,
        Component::XAUT,
        Component::XPAO,
        Component::XPHA,
        Component::XP,
    ] {
        cod.set_conc(component, 1.0);
    }
    cod.set_conc(Component::SO, -1.0);
    cod.set_conc(Component::SNO, COD_OF_NITRATE);
    cod.set_conc(Component::SN2, COD_OF_N2);

    let mut nitrogen = StateVector::zeros();
    for component in [
        Component::SNH,
        Component::SNO,
        Component::SN2,
        Component::SND,
        Component::XND,
    ] {
        nitrogen.set_conc(component, 1.0);
    }
    for biomass in [Component::XH, Component::XAUT, Component::XPAO] {
        nitrogen.set_conc(biomass, p.i_N_BM);
    }
    nitrogen.set_conc(Component::SI, p.i_N_SI);
    nitrogen.set_conc(Component::XI, p.i_N_XI);
    nitrogen.set_conc(Component::XP, p.i_N_XP);

    let mut phosphorus = StateVector::zeros();
    phosphorus.set_conc(Component::SPO4, 1.0);
    phosphorus.set_conc(Component::XPP, 1.0);
    for biomass in [Component::XH, Component::XAUT, Component::XPAO] {
        phosphorus.set_conc(biomass, p.i_P_BM);
    }
    phosphorus.set_conc(Component::SI, p.i_P_SI);
    phosphorus.set_conc(Component::SF, p.i_P_SF);
    phosphorus.set_conc(Component::XI, p.i_P_XI);
    phosphorus.set_conc(Component::XS, p.i_P_XS);
    phosphorus.set_conc(Component::XP, p.i_P_XP);

    let mut charge = StateVector::zeros();
    charge.set_conc(Component::SNH, 1.0 / N_MOLAR_MASS);
    charge.set_conc(Component::SNO, -1.0 / N_MOLAR_MASS);
    charge.set_conc(Component::SPO4, -1.0 / P_MOLAR_MASS);
    charge.set_conc(Component::XPP, -1.0 / P_MOLAR_MASS);
    charge.set_conc(Component::SALK, -1.0);

    ConservationWeights {
        cod,
        nitrogen,
        phosphorus,
        charge,
    }
}

/// Per-row residuals of the four balances; columns are COD, N, P, charge.
pub fn balance_residuals(
    matrix: &StoichiometricMatrix,
    weights: &ConservationWeights,
) -> SMatrix<f64, N_PROCESSES, 4> {
    let columns: [SVector<f64, N_PROCESSES>; 4] = [
        matrix * weights.cod,
        matrix * weights.nitrogen,
        matrix * weights.phosphorus,
        matrix * weights.charge,
    ];
    SMatrix::<f64, N_PROCESSES, 4>::from_columns(&columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_row_is_balanced_for_default_parameters() {
        let p = StoichiometricParameters::default();
        let residuals =
            balance_residuals(&build_stoichiometric_matrix(&p), &conservation_weights(&p));
        for process in Process::iter() {
            for (k, quantity) in ["COD", "N", "P", "charge"].iter().enumerate() {
                let r = residuals[(process.index(), k)];
                assert!(r.abs() < 1e-12, "{} not balanced for {}: {}", quantity, process, r);
            }
        }
    }

    #[test]
    fn every_row_is_balanced_for_perturbed_parameters() {
        let p = StoichiometricParameters {
            f_SI: 0.05,
            Y_H: 0.6,
            f_P: 0.08,
            Y_PAO: 0.63,
            Y_PO4: 0.35,
            Y_PHA: 0.22,
            Y_A: 0.2,
            i_N_SI: 0.02,
            i_N_SF: 0.025,
            i_N_XI: 0.03,
            i_N_XS: 0.045,
            i_N_BM: 0.086,
            i_N_XP: 0.06,
            i_P_SI: 0.005,
            i_P_SF: 0.012,
            i_P_XI: 0.008,
            i_P_XS: 0.014,
            i_P_BM: 0.025,
            i_P_XP: 0.02,
        };
        let residuals =
            balance_residuals(&build_stoichiometric_matrix(&p), &conservation_weights(&p));
        assert!(residuals.amax() < 1e-12);
    }

    #[test]
    fn builder_is_pure() {
        let p = StoichiometricParameters::default();
        let first = build_stoichiometric_matrix(&p);
        let second = build_stoichiometric_matrix(&p);
        assert_eq!(first, second);
        assert_eq!(p, StoichiometricParameters::default());
    }

    #[test]
    fn placeholder_rows_are_zero_and_signs_are_physical() {
        let m = build_stoichiometric_matrix(&StoichiometricParameters::default());
        for process in [Process::Precipitation, Process::Redissolution] {
            assert!(m.row(process.index()).iter().all(|v| *v == 0.0));
        }
        let nitrification = Process::AerobicGrowthAUT.index();
        assert!(m[(nitrification, Component::SNH.index())] < 0.0);
        assert!(m[(nitrification, Component::SNO.index())] > 0.0);
        assert!(m[(nitrification, Component::SALK.index())] < 0.0);
        let release = Process::StoragePHA.index();
        assert!(m[(release, Component::SPO4.index())] > 0.0);
        assert!(m[(release, Component::XPP.index())] < 0.0);
        let denitrification = Process::AnoxicGrowthOnSA.index();
        assert!(m[(denitrification, Component::SNO.index())] < 0.0);
        assert!(m[(denitrification, Component::SN2.index())] > 0.0);
        assert!(m[(denitrification, Component::SALK.index())] > 0.0);
    }
}
