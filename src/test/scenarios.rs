use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::api::SimApi;
use crate::error::{ConfigError, ScenarioError, SimError};
use crate::lte::LteSim;
use crate::scenario::layout::random_endpoint_positions;
use crate::scenario::{RunOutcome, ScenarioOptions, Technology, execute, run, run_with};

fn small_city(tech: &str) -> ScenarioOptions {
    ScenarioOptions {
        tech: tech.into(),
        n_ues: 1,
        n_enbs: 1,
        area_size: 1000.0,
        sim_time: 10.0,
        ..ScenarioOptions::single_cell()
    }
}

fn mean_delay(outcome: &RunOutcome) -> f64 {
    outcome.aggregate.mean_delay_ms
}

#[test]
fn one_endpoint_one_cell_delivers() {
    let out = run(&small_city("4g")).expect("run");
    assert_eq!(out.flows.len(), 1);
    assert_eq!(out.traffic.sources.len(), 1);
    let agg = &out.aggregate;
    assert_eq!(agg.rx_packets, 95);
    assert_eq!(agg.lost_packets, 0);
    assert!(agg.loss_rate_pct < 100.0);
    // 10ms 回传 + 上行授权与 TTI 对齐
    assert!((15.0..15.1).contains(&mean_delay(&out)), "{}", mean_delay(&out));
    assert!(agg.jitter_ms < 0.01, "{}", agg.jitter_ms);
    assert!(out.report().to_string().starts_with("================ RESULTADOS (4g)"));
}

#[test]
fn five_g_is_faster_than_four_g() {
    let lte = run(&small_city("4g")).expect("4g");
    let nr = run(&small_city("5g")).expect("5g");
    assert_eq!(nr.config.tech, Technology::FiveG);
    assert!(mean_delay(&nr) < mean_delay(&lte));
    assert!(mean_delay(&lte) - mean_delay(&nr) > 7.9);
    assert_eq!(nr.aggregate.rx_packets, lte.aggregate.rx_packets);
}

#[test]
fn same_seed_same_result() {
    let opts = ScenarioOptions {
        n_ues: 5,
        sim_time: 3.0,
        seed: 9,
        ..ScenarioOptions::multi_cell()
    };
    let a = run(&opts).expect("run");
    let b = run(&opts).expect("run");
    assert_eq!(a.aggregate, b.aggregate);
    assert_eq!(a.flows, b.flows);
}

#[test]
fn seven_cells_every_endpoint_attaches_to_nearest() {
    let cfg = ScenarioOptions {
        n_ues: 50,
        n_enbs: 7,
        area_size: 2000.0,
        sim_time: 30.0,
        ..ScenarioOptions::multi_cell()
    }
    .validate()
    .expect("valid");
    let mut api = LteSim::new(cfg.seed);
    let out = execute(&cfg, &mut api).expect("run");

    assert_eq!(out.world.cells.len(), 7);
    assert_eq!(out.world.cell_positions.len(), 7);
    for p in &out.world.cell_positions {
        assert!(p.x.abs() < 1000.0 && p.y.abs() < 1000.0);
    }

    // 接入发生在 t=0，按初始位置判断最近小区
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let starts = random_endpoint_positions(cfg.n_ues, cfg.area_size, &mut rng);
    for (dev, start) in out.world.endpoint_devices.iter().zip(&starts) {
        let serving = api.serving_cell(*dev).expect("serving").expect("attached");
        let nearest = out
            .world
            .cell_positions
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.distance(start).total_cmp(&b.distance(start)))
            .map(|(i, _)| out.world.cell_devices[i])
            .expect("cells");
        assert_eq!(serving, nearest);
    }

    assert_eq!(out.flows.len(), 50);
    assert!(out.aggregate.rx_packets > 0);
    assert!((0.0..=100.0).contains(&out.aggregate.loss_rate_pct));
}

#[test]
fn invalid_technology_never_builds_a_simulator() {
    let opts = ScenarioOptions {
        tech: "foo".into(),
        ..ScenarioOptions::single_cell()
    };
    let mut called = false;
    let err = run_with(&opts, |cfg| {
        called = true;
        LteSim::new(cfg.seed)
    })
    .expect_err("must fail");
    assert!(!called);
    assert_eq!(
        err,
        ScenarioError::InvalidConfig(ConfigError::UnknownTechnology("foo".into()))
    );
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn simulator_failure_aborts_the_run() {
    let err = run_with(&small_city("4g"), |cfg| {
        let mut api = LteSim::new(cfg.seed);
        api.run_until(crate::sim::SimTime::ZERO).expect("empty run");
        api
    })
    .expect_err("must fail");
    assert_eq!(err, ScenarioError::Simulator(SimError::AlreadyRan));
    assert_eq!(err.exit_code(), 1);
}
