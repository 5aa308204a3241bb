////////////////////////////////////////////////////////////////////////////////////////////////////
// TESTS
////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use crate::ASM2d::derivatives::{Biokinetics, flow_term};
    use crate::ASM2d::errors::ASMError;
    use crate::ASM2d::multi_zone::{
        MultiZoneSimulator, NetworkConfig, RecycleLayout, ZoneConfig, zone_ids,
    };
    use crate::ASM2d::ode_integrators::IntegratorType;
    use crate::ASM2d::parameters::StoichiometricParameters;
    use crate::ASM2d::process_rates::{Process, calculate_process_rates};
    use crate::ASM2d::reactor_zone::{ReactorZone, ZoneType};
    use crate::ASM2d::simulation::{
        ASM2dSimulation, DynamicSettings, SimulationMode, SimulationResult,
        run_temperature_sweep,
    };
    use crate::ASM2d::state_vector::{
        Component, StateAccess, StateVector, max_relative_change, state_from_pairs, zero_state,
    };
    use crate::ASM2d::steady_state_solver::{
        SolverConfig, euler_step, linearly_implicit_step, solve_zone,
    };
    use crate::ASM2d::stoichiometric_matrix::conservation_weights;
    use approx::assert_relative_eq;
    use strum::IntoEnumIterator;

    /// influent without any biomass or biodegradable COD: every process rate is zero
    fn inert_influent() -> StateVector {
        state_from_pairs(&[
            (Component::SI, 30.0),
            (Component::SNO, 1.0),
            (Component::SNH, 25.0),
            (Component::SPO4, 6.0),
            (Component::SALK, 7.0),
            (Component::XI, 40.0),
        ])
    }

    /// raw wastewater with substrate, nitrate and seed biomass of every group
    fn reacting_influent() -> StateVector {
        state_from_pairs(&[
            (Component::SI, 30.0),
            (Component::SF, 60.0),
            (Component::SA, 30.0),
            (Component::SNO, 10.0),
            (Component::SNH, 25.0),
            (Component::SND, 2.0),
            (Component::SPO4, 6.0),
            (Component::SALK, 7.0),
            (Component::XI, 40.0),
            (Component::XS, 150.0),
            (Component::XH, 30.0),
            (Component::XAUT, 2.0),
            (Component::XPAO, 10.0),
            (Component::XPHA, 1.0),
            (Component::XPP, 2.0),
            (Component::XND, 5.0),
        ])
    }

    fn a2o_zones() -> Vec<ZoneConfig> {
        vec![
            ZoneConfig {
                zone_type: ZoneType::Anaerobic,
                volume: 1000.0,
                hrt_hours: None,
                do_setpoint: None,
            },
            ZoneConfig {
                zone_type: ZoneType::Anoxic,
                volume: 2000.0,
                hrt_hours: None,
                do_setpoint: None,
            },
            ZoneConfig {
                zone_type: ZoneType::Aerobic,
                volume: 4000.0,
                hrt_hours: None,
                do_setpoint: Some(2.0),
            },
        ]
    }

    fn network(ir: f64, ras: f64) -> NetworkConfig {
        NetworkConfig {
            zones: a2o_zones(),
            influent_flow: 10000.0,
            internal_recycle: ir,
            return_sludge: ras,
            max_outer_iterations: 100,
            network_tolerance: None,
            solver: SolverConfig::default(),
        }
    }

    fn mixed_liquor(so: f64, sno: f64) -> StateVector {
        state_from_pairs(&[
            (Component::SI, 30.0),
            (Component::SF, 20.0),
            (Component::SA, 10.0),
            (Component::SO, so),
            (Component::SNO, sno),
            (Component::SNH, 15.0),
            (Component::SND, 2.0),
            (Component::SPO4, 8.0),
            (Component::SALK, 6.0),
            (Component::XI, 1000.0),
            (Component::XS, 150.0),
            (Component::XH, 2000.0),
            (Component::XAUT, 100.0),
            (Component::XPAO, 300.0),
            (Component::XPHA, 40.0),
            (Component::XPP, 60.0),
            (Component::XP, 400.0),
            (Component::XND, 6.0),
        ])
    }

    #[test]
    fn test_nitrification_only_state() {
        // the alkalinity switch of nitrification needs SALK > 0
        let state = state_from_pairs(&[
            (Component::SNH, 30.0),
            (Component::SO, 2.0),
            (Component::XAUT, 50.0),
            (Component::SALK, 5.0),
        ]);
        let bio = Biokinetics::at_temperature(20.0);
        let rates = calculate_process_rates(&state, &bio.kinetics);
        assert_eq!(rates.len(), 21);
        for record in &rates {
            match record.process {
                Process::AerobicGrowthAUT => {
                    assert!(record.rate > 0.0);
                    assert!(record.active);
                }
                Process::LysisXAUT => {
                    assert_relative_eq!(record.rate, bio.kinetics.b_AUT * 50.0);
                }
                _ => assert_eq!(record.rate, 0.0, "{} should be zero", record.process),
            }
        }
        // without alkalinity nitrification stops
        let mut no_alk = state;
        no_alk.set_conc(Component::SALK, 0.0);
        let rates = calculate_process_rates(&no_alk, &bio.kinetics);
        assert!(rates[Process::AerobicGrowthAUT.index()].rate < 1e-9);
    }

    #[test]
    fn test_anoxic_pao_processes_stop_at_oxygen_threshold() {
        let bio = Biokinetics::at_temperature(20.0);
        let k_o2 = bio.kinetics.K_O2_PAO;
        for so in [k_o2, 0.5, 2.0, 8.0] {
            for sno in [0.0, 5.0, 50.0] {
                let rates = calculate_process_rates(&mixed_liquor(so, sno), &bio.kinetics);
                assert_eq!(rates[Process::AnoxicStoragePP.index()].rate, 0.0);
                assert_eq!(rates[Process::AnoxicGrowthPAO.index()].rate, 0.0);
                assert!(!rates[Process::AnoxicStoragePP.index()].active);
            }
        }
        let rates = calculate_process_rates(&mixed_liquor(0.05, 10.0), &bio.kinetics);
        assert!(rates[Process::AnoxicStoragePP.index()].rate > 0.0);
        assert!(rates[Process::AnoxicGrowthPAO.index()].rate > 0.0);
    }

    #[test]
    fn test_rate_records_carry_labels_and_placeholders_are_zero() {
        let bio = Biokinetics::at_temperature(20.0);
        let rates = calculate_process_rates(&mixed_liquor(0.0, 0.0), &bio.kinetics);
        for (i, record) in rates.iter().enumerate() {
            assert_eq!(record.process.index(), i);
            assert_eq!(record.equation, record.process.equation());
            assert!(record.rate >= 0.0);
        }
        assert_eq!(rates[Process::Precipitation.index()].rate, 0.0);
        assert_eq!(rates[Process::Redissolution.index()].rate, 0.0);
        // anaerobic conditions: fermentation and PHA storage run, aerobic growth does not
        assert!(rates[Process::Fermentation.index()].rate > 0.0);
        assert!(rates[Process::StoragePHA.index()].rate > 0.0);
        assert_eq!(rates[Process::AerobicGrowthOnSA.index()].rate, 0.0);
    }

    #[test]
    fn test_washed_out_biomass_gives_zero_ratio_terms() {
        let bio = Biokinetics::at_temperature(20.0);
        let state = state_from_pairs(&[
            (Component::XS, 100.0),
            (Component::XH, 0.05),
            (Component::XPAO, 0.05),
            (Component::XPP, 10.0),
            (Component::XPHA, 10.0),
            (Component::SA, 20.0),
            (Component::SO, 2.0),
            (Component::SPO4, 5.0),
            (Component::SALK, 5.0),
        ]);
        let rates = calculate_process_rates(&state, &bio.kinetics);
        assert_eq!(rates[Process::AerobicHydrolysis.index()].rate, 0.0);
        assert_eq!(rates[Process::StoragePHA.index()].rate, 0.0);
        assert_eq!(rates[Process::AerobicGrowthPAO.index()].rate, 0.0);
        assert!(rates.iter().all(|r| r.rate.is_finite()));
    }

    #[test]
    fn test_batch_derivative_conserves_cod_n_p_and_charge() {
        let bio = Biokinetics::at_temperature(12.0);
        let weights = conservation_weights(&StoichiometricParameters::default());
        for state in [mixed_liquor(0.0, 0.0), mixed_liquor(0.1, 6.0), mixed_liquor(2.0, 8.0)] {
            let derivative = bio.batch_derivative(&state);
            let scale: f64 = bio.rates(&state).iter().map(|r| r.rate.abs()).sum();
            for w in [
                &weights.cod,
                &weights.nitrogen,
                &weights.phosphorus,
                &weights.charge,
            ] {
                assert!(w.dot(&derivative).abs() <= 1e-10 * scale.max(1.0));
            }
        }
    }

    #[test]
    fn test_flow_term_vanishes_when_influent_equals_state() {
        let anoxic = ReactorZone::new(ZoneType::Anoxic, 4.0, None).unwrap();
        let state = mixed_liquor(0.0, 5.0);
        assert_eq!(flow_term(&state, &state, &anoxic), zero_state());

        let aerobic = ReactorZone::new(ZoneType::Aerobic, 4.0, Some(2.0)).unwrap();
        let state = mixed_liquor(2.0, 5.0);
        assert_eq!(flow_term(&state, &state, &aerobic), zero_state());

        // DO is pulled toward the setpoint whatever the influent DO
        let influent = mixed_liquor(0.0, 5.0);
        let state = mixed_liquor(1.0, 5.0);
        let term = flow_term(&state, &influent, &aerobic);
        assert_relative_eq!(term.conc(Component::SO), (2.0 - 1.0) / aerobic.hrt_days());
        let term = flow_term(&state, &influent, &anoxic);
        assert_relative_eq!(term.conc(Component::SO), -1.0 / anoxic.hrt_days());

        // identical influent and state off the DO target: only the DO entry survives
        let state = mixed_liquor(0.5, 5.0);
        let term = flow_term(&state, &state, &aerobic);
        assert_relative_eq!(term.conc(Component::SO), 1.5 / aerobic.hrt_days());
        for c in Component::iter().filter(|c| *c != Component::SO) {
            assert_eq!(term.conc(c), 0.0, "{}", c);
        }
    }

    #[test]
    fn test_euler_steps_never_produce_negative_concentrations() {
        let bio = Biokinetics::at_temperature(20.0);
        let zone = ReactorZone::new(ZoneType::Aerobic, 2.0, Some(2.0)).unwrap();
        let influent = state_from_pairs(&[(Component::SA, 1.0), (Component::SNH, 0.5)]);
        let mut state = mixed_liquor(2.0, 0.2);
        let mut implicit = state;
        for _ in 0..2000 {
            state = euler_step(&bio, &zone, &state, &influent, 0.02);
            assert!(state.iter().all(|v| v.is_finite() && *v >= 0.0));
            implicit = linearly_implicit_step(&bio, &zone, &implicit, &influent, 0.02);
            assert!(implicit.iter().all(|v| v.is_finite() && *v >= 0.0));
        }
    }

    #[test]
    fn test_steady_state_is_independent_of_initial_state() {
        let bio = Biokinetics::at_temperature(20.0);
        let config = SolverConfig::default();
        let influent = inert_influent();
        let mut from_zero = ReactorZone::new(ZoneType::Aerobic, 8.0, Some(2.0))
            .unwrap()
            .with_state(zero_state());
        let mut from_other = from_zero.clone().with_state(state_from_pairs(&[
            (Component::SNH, 50.0),
            (Component::SI, 5.0),
            (Component::XI, 300.0),
            (Component::SO, 4.0),
        ]));
        let a = solve_zone(&bio, &mut from_zero, &influent, &config);
        let b = solve_zone(&bio, &mut from_other, &influent, &config);
        assert!(a.is_converged() && b.is_converged());
        for i in 0..19 {
            assert_relative_eq!(a.state()[i], b.state()[i], epsilon = 1e-3);
        }
        assert_relative_eq!(a.state().conc(Component::SO), 2.0, epsilon = 1e-3);
        assert_relative_eq!(a.state().conc(Component::SNH), 25.0, epsilon = 1e-3);
        assert_eq!(from_zero.state, *a.state());
    }

    #[test]
    fn test_reacting_zones_reach_the_same_steady_state_from_any_start() {
        let bio = Biokinetics::at_temperature(20.0);
        let config = SolverConfig::default();
        let influent = reacting_influent();
        for zone_type in [ZoneType::Anaerobic, ZoneType::Anoxic, ZoneType::Aerobic] {
            let zone = ReactorZone::new(zone_type, 8.0, None).unwrap();
            let mut from_seed = zone.clone();
            let mut from_zero = zone.clone().with_state(zero_state());
            let a = solve_zone(&bio, &mut from_seed, &influent, &config);
            let b = solve_zone(&bio, &mut from_zero, &influent, &config);
            assert!(a.is_converged(), "{} zone from seed state", zone_type);
            assert!(b.is_converged(), "{} zone from zero state", zone_type);
            for i in 0..19 {
                assert_relative_eq!(
                    a.state()[i],
                    b.state()[i],
                    epsilon = 1e-3,
                    max_relative = 1e-3
                );
            }
            // a converged state is a fixed point of the step, not one phase of a cycle
            let next = linearly_implicit_step(&bio, &zone, a.state(), &influent, config.time_step);
            assert!(max_relative_change(&next, a.state()) < 1e-5, "{} zone", zone_type);
        }
    }

    #[test]
    fn test_plain_euler_overshoots_the_aerated_do() {
        let bio = Biokinetics::at_temperature(20.0);
        let config = SolverConfig::default();
        let influent = reacting_influent();
        let mut zone = ReactorZone::new(ZoneType::Aerobic, 8.0, Some(2.0)).unwrap();
        let steady = *solve_zone(&bio, &mut zone, &influent, &config).state();
        assert!(steady.conc(Component::SO) < 2.0);
        // from an empty DO, aeration alone refills 2.0·dt/HRT in one step and the uptake
        // of the grown biomass drains it again in the next
        let mut empty = steady;
        empty.set_conc(Component::SO, 0.0);
        let first = euler_step(&bio, &zone, &empty, &influent, config.time_step);
        assert_relative_eq!(
            first.conc(Component::SO),
            2.0 * config.time_step / zone.hrt_days(),
            max_relative = 1e-9
        );
        let second = euler_step(&bio, &zone, &first, &influent, config.time_step);
        assert!(second.conc(Component::SO) < first.conc(Component::SO));
        // the linearly implicit step moves toward the steady DO without passing it twice
        let damped = linearly_implicit_step(&bio, &zone, &empty, &influent, config.time_step);
        assert!(damped.conc(Component::SO) < first.conc(Component::SO));
    }

    #[test]
    fn test_iteration_cap_is_reported_not_raised() {
        let bio = Biokinetics::at_temperature(20.0);
        let config = SolverConfig {
            max_iterations: 150,
            ..SolverConfig::default()
        };
        let mut zone = ReactorZone::new(ZoneType::Aerobic, 8.0, None).unwrap();
        let outcome = solve_zone(&bio, &mut zone, &inert_influent(), &config);
        assert!(!outcome.is_converged());
        assert_eq!(outcome.iterations(), 150);
        assert!(outcome.state().iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_recycle_blending() {
        let types = [ZoneType::Anaerobic, ZoneType::Anoxic, ZoneType::Aerobic];
        let layout = RecycleLayout::new(&types, 1.0, 2.0);
        assert_eq!(layout.first_anoxic, Some(1));
        assert_eq!(layout.last_aerobic, Some(2));
        let influent = StateVector::from_element(10.0);
        let states = vec![
            StateVector::from_element(1.0),
            StateVector::from_element(2.0),
            StateVector::from_element(4.0),
        ];
        let first = layout.zone_input(0, &influent, &influent, &states);
        assert_relative_eq!(first[0], 7.0);
        let anoxic = layout.zone_input(1, &first, &influent, &states);
        assert_relative_eq!(anoxic[0], 5.5);
        let aerobic = layout.zone_input(2, &states[1], &influent, &states);
        assert_relative_eq!(aerobic[0], 2.0);
        assert_eq!(
            zone_ids(&[ZoneType::Anoxic, ZoneType::Aerobic, ZoneType::Aerobic]),
            vec!["anoxic_1", "aerobic_1", "aerobic_2"]
        );
    }

    #[test]
    fn test_zero_recycles_equal_zones_solved_in_series() {
        let bio = Biokinetics::at_temperature(20.0);
        let mut config = network(0.0, 0.0);
        config.max_outer_iterations = 1;
        config.solver.max_iterations = 400;
        let influent = mixed_liquor(0.0, 0.0);

        let mut simulator = MultiZoneSimulator::new(config.clone()).unwrap();
        let result = simulator.solve_steady_state(&bio, &influent);

        let mut zones = config.build_zones().unwrap();
        let mut upstream = influent;
        for zone in zones.iter_mut() {
            upstream = *solve_zone(&bio, zone, &upstream, &config.solver).state();
        }
        assert_eq!(result.zone_order, vec!["anaerobic_1", "anoxic_1", "aerobic_1"]);
        for (id, zone) in result.zone_order.iter().zip(&zones) {
            assert_eq!(result.states[id], zone.state);
        }
    }

    #[test]
    fn test_zero_recycles_with_repeated_passes() {
        let bio = Biokinetics::at_temperature(20.0);
        let config = network(0.0, 0.0);
        let influent = inert_influent();
        let mut simulator = MultiZoneSimulator::new(config.clone()).unwrap();
        simulator.set_initial_states(&[zero_state(); 3]).unwrap();
        let result = simulator.solve_steady_state(&bio, &influent);
        assert_eq!(result.outer_iterations, 100);
        assert!(!result.network_converged);

        let mut zones: Vec<ReactorZone> = config
            .build_zones()
            .unwrap()
            .into_iter()
            .map(|z| z.with_state(zero_state()))
            .collect();
        let mut upstream = influent;
        for zone in zones.iter_mut() {
            upstream = *solve_zone(&bio, zone, &upstream, &config.solver).state();
        }
        for (id, zone) in result.zone_order.iter().zip(&zones) {
            for i in 0..19 {
                assert_relative_eq!(result.states[id][i], zone.state[i], epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn test_network_tolerance_stops_outer_loop() {
        let bio = Biokinetics::at_temperature(20.0);
        let mut config = network(2.0, 0.8);
        config.network_tolerance = Some(1e-5);
        let influent = inert_influent();
        let mut simulator = MultiZoneSimulator::new(config).unwrap();
        simulator.set_initial_states(&[zero_state(); 3]).unwrap();
        let result = simulator.solve_steady_state(&bio, &influent);
        assert!(result.network_converged);
        assert!(result.outer_iterations < 100);
        assert!(result.network_residual < 1e-5);
        assert!(result.all_zones_converged());
        // a non-reacting influent passes the recycles unchanged
        let effluent = result.effluent().unwrap();
        for c in [Component::SI, Component::SNH, Component::SPO4, Component::XI] {
            assert_relative_eq!(effluent.conc(c), influent.conc(c), epsilon = 1e-3);
        }
        assert_relative_eq!(effluent.conc(Component::SO), 2.0, epsilon = 1e-3);
        assert_relative_eq!(result.states["anoxic_1"].conc(Component::SO), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_network_validation() {
        let mut config = network(2.0, 0.8);
        config.zones.retain(|z| z.zone_type != ZoneType::Aerobic);
        assert!(matches!(
            MultiZoneSimulator::new(config),
            Err(ASMError::InvalidConfiguration(_))
        ));
        let mut config = network(0.0, -1.0);
        assert!(MultiZoneSimulator::new(config.clone()).is_err());
        config.return_sludge = 0.5;
        config.influent_flow = 0.0;
        assert!(matches!(
            MultiZoneSimulator::new(config),
            Err(ASMError::MissingData(_))
        ));
        let mut config = network(0.0, 0.0);
        config.zones[0].hrt_hours = Some(1.5);
        let simulator = MultiZoneSimulator::new(config).unwrap();
        assert_eq!(simulator.zones[0].hrt_hours, 1.5);
        assert_relative_eq!(simulator.zones[1].hrt_hours, 4.8);
    }

    #[test]
    fn test_dynamic_run_approaches_influent() {
        let mut simulation = ASM2dSimulation::new();
        simulation.set_influent(inert_influent());
        simulation
            .set_network(NetworkConfig {
                zones: vec![ZoneConfig {
                    zone_type: ZoneType::Aerobic,
                    volume: 0.0,
                    hrt_hours: Some(8.0),
                    do_setpoint: Some(2.0),
                }],
                ..network(0.0, 0.0)
            })
            .unwrap();
        simulation.set_initial_states(vec![zero_state()]);
        simulation
            .set_mode(SimulationMode::Dynamic(DynamicSettings {
                t_end: 5.0,
                step: 0.02,
                integrator: IntegratorType::RK4,
            }))
            .unwrap();
        simulation.solve().unwrap();
        let Some(SimulationResult::Dynamic(result)) = simulation.get_result() else {
            panic!("expected a dynamic result");
        };
        assert_eq!(result.times.len(), 251);
        let trajectory = &result.trajectories["aerobic_1"];
        assert_eq!(trajectory.len(), 251);
        assert!(trajectory.iter().all(|s| s.iter().all(|v| *v >= 0.0)));
        let last = trajectory.last().unwrap();
        assert_relative_eq!(last.conc(Component::SNH), 25.0, epsilon = 1e-3);
        assert_relative_eq!(last.conc(Component::SO), 2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_dynamic_run_with_biomass_stays_physical() {
        let mut simulation = ASM2dSimulation::new();
        simulation.set_influent(mixed_liquor(0.0, 0.0));
        simulation.set_network(network(2.0, 0.8)).unwrap();
        simulation
            .set_mode(SimulationMode::Dynamic(DynamicSettings {
                t_end: 0.2,
                step: 0.001,
                integrator: IntegratorType::Euler,
            }))
            .unwrap();
        simulation.solve().unwrap();
        let result = simulation.get_result().unwrap();
        assert_eq!(result.zone_order().len(), 3);
        for state in result.final_states().values() {
            assert!(state.iter().all(|v| v.is_finite() && *v >= 0.0));
        }
        assert!(result.effluent().is_some());
    }

    #[test]
    fn test_missing_task_data() {
        let mut simulation = ASM2dSimulation::new();
        assert!(matches!(simulation.solve(), Err(ASMError::MissingData(_))));
        simulation.set_influent(inert_influent());
        assert!(matches!(simulation.check_task(), Err(ASMError::MissingData(_))));
        simulation.set_network(network(0.0, 0.0)).unwrap();
        simulation.set_initial_states(vec![zero_state()]);
        assert!(matches!(
            simulation.check_task(),
            Err(ASMError::InvalidConfiguration(_))
        ));
        assert!(simulation.set_temperature(f64::NAN).is_err());
        assert!(
            simulation
                .set_mode(SimulationMode::Dynamic(DynamicSettings {
                    t_end: 0.0,
                    step: 0.1,
                    integrator: IntegratorType::Euler,
                }))
                .is_err()
        );
    }

    #[test]
    fn test_nitrification_speeds_up_with_temperature() {
        let state = mixed_liquor(2.0, 5.0);
        let rate = |t: f64| {
            let bio = Biokinetics::at_temperature(t);
            bio.rates(&state)[Process::AerobicGrowthAUT.index()].rate
        };
        assert!(rate(10.0) < rate(20.0));
        assert!(rate(20.0) < rate(30.0));
    }

    #[test]
    fn test_temperature_sweep_runs_independently() {
        let mut base = ASM2dSimulation::new();
        base.set_influent(inert_influent());
        let mut config = network(0.0, 0.5);
        config.max_outer_iterations = 3;
        base.set_network(config).unwrap();
        base.set_initial_states(vec![zero_state(); 3]);
        let temperatures = [10.0, 20.0, 30.0];
        let results = run_temperature_sweep(&base, &temperatures);
        assert_eq!(results.len(), 3);
        for ((t, outcome), expected) in results.iter().zip(temperatures) {
            assert_eq!(*t, expected);
            let result = outcome.as_ref().unwrap();
            assert_eq!(result.zone_order().len(), 3);
        }
        assert!(base.result.is_none());
    }
}
