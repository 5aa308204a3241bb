use crate::ASM2d::derivatives::Biokinetics;
use crate::ASM2d::influent_fractionation::{ConventionalInfluent, FractionationRatios};
use crate::ASM2d::multi_zone::{NetworkConfig, ZoneConfig};
use crate::ASM2d::ode_integrators::IntegratorType;
use crate::ASM2d::reactor_zone::{ReactorZone, ZoneType};
use crate::ASM2d::simulation::{
    ASM2dSimulation, DynamicSettings, SimulationMode, run_temperature_sweep,
};
use crate::ASM2d::state_vector::{Component, StateAccess, zero_state};
use crate::ASM2d::steady_state_solver::SolverConfig;

fn municipal_influent() -> ConventionalInfluent {
    ConventionalInfluent {
        cod: 400.0,
        tkn: 45.0,
        nh4_n: 30.0,
        tp: 8.0,
        po4_p: 5.0,
        vfa: 40.0,
        alkalinity: 7.0,
        no3_n: 0.0,
    }
}

fn zone(zone_type: ZoneType, volume: f64) -> ZoneConfig {
    ZoneConfig {
        zone_type,
        volume,
        hrt_hours: None,
        do_setpoint: None,
    }
}

fn a2o_network() -> NetworkConfig {
    NetworkConfig {
        zones: vec![
            zone(ZoneType::Anaerobic, 1000.0),
            zone(ZoneType::Anoxic, 2000.0),
            zone(ZoneType::Aerobic, 4000.0),
        ],
        influent_flow: 10000.0,
        internal_recycle: 2.0,
        return_sludge: 0.8,
        max_outer_iterations: 30,
        network_tolerance: Some(1e-4),
        solver: SolverConfig::default(),
    }
}

pub fn asm2d_examples(task: usize) {
    match task {
        0 => {
            // PROCESS RATES of a typical aerobic mixed liquor at 12 and 20 C
            let zone = ReactorZone::new(ZoneType::Aerobic, 6.0, Some(2.0)).unwrap();
            let state = zone.default_initial_state();
            for t in [12.0, 20.0] {
                let bio = Biokinetics::at_temperature(t);
                println!("\n rates at {} C", t);
                crate::ASM2d::process_rates::pretty_print_rates(&bio.rates(&state));
            }
        }
        1 => {
            // STOICHIOMETRIC MATRIX and its balances
            use crate::ASM2d::parameters::StoichiometricParameters;
            use crate::ASM2d::stoichiometric_matrix::{
                balance_residuals, build_stoichiometric_matrix, conservation_weights,
            };
            let p = StoichiometricParameters::default();
            let matrix = build_stoichiometric_matrix(&p);
            let residuals = balance_residuals(&matrix, &conservation_weights(&p));
            println!("stoichiometric matrix {}", matrix);
            println!("COD, N, P, charge residuals of each process {}", residuals);
            assert!(residuals.amax() < 1e-12);
        }
        2 => {
            // A2O plant at 15 C, steady state; no clarifier, so XAUT and XPAO wash out
            let influent = municipal_influent()
                .fractionate(&FractionationRatios::default());
            let mut simulation = ASM2dSimulation::new();
            simulation.set_temperature(15.0).unwrap();
            simulation.set_influent(influent);
            simulation.set_network(a2o_network()).unwrap();
            simulation.solve().unwrap();
            simulation.pretty_print();
            simulation.process_rates_report().unwrap();
        }
        3 => {
            // MLE plant (anoxic + aerobic), two days of dynamic response
            let influent = municipal_influent()
                .fractionate(&FractionationRatios::default());
            let mut simulation = ASM2dSimulation::new();
            simulation.set_influent(influent);
            simulation
                .set_network(NetworkConfig {
                    zones: vec![
                        zone(ZoneType::Anoxic, 2500.0),
                        zone(ZoneType::Aerobic, 5000.0),
                    ],
                    ..a2o_network()
                })
                .unwrap();
            simulation
                .set_mode(SimulationMode::Dynamic(DynamicSettings {
                    t_end: 2.0,
                    step: 0.0005,
                    integrator: IntegratorType::RK4,
                }))
                .unwrap();
            simulation.solve().unwrap();
            simulation.pretty_print();
        }
        4 => {
            // effluent ammonium of the A2O plant between 10 and 25 C
            let mut base = ASM2dSimulation::new();
            base.set_influent(municipal_influent().fractionate(&FractionationRatios::default()));
            base.set_network(a2o_network()).unwrap();
            for (t, outcome) in run_temperature_sweep(&base, &[10.0, 15.0, 20.0, 25.0]) {
                match outcome {
                    Ok(result) => {
                        let effluent = result.effluent().unwrap_or_else(zero_state);
                        println!(
                            "T = {} C: SNH {:.2}, SNO {:.2}, SPO4 {:.2} g/m3",
                            t,
                            effluent.conc(Component::SNH),
                            effluent.conc(Component::SNO),
                            effluent.conc(Component::SPO4)
                        );
                    }
                    Err(e) => println!("T = {} C: {}", t, e),
                }
            }
        }
        _ => println!("no example with number {}", task),
    }
}
