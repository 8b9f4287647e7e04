use std::path::Path;

use pn_project::{ProjectError, RunOptions, run_scenario};

fn bundled(name: &str) -> pn_project::Scenario {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../scenarios")
        .join(name);
    pn_project::load(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e))
}

#[test]
fn merged_pool_condenses_the_plasma() {
    let run = run_scenario(&bundled("01_condensing_pool.yaml"), RunOptions::default()).unwrap();
    let summary = &run.summary;

    assert_eq!(summary.ticks, 2);
    assert_eq!(summary.events_applied, 1);
    assert_eq!(summary.unconverged, 0);
    assert_eq!(summary.networks.len(), 1);

    let net = &summary.networks[0];
    assert_eq!(net.segments, vec![1, 2]);
    assert_eq!(net.anchor, Some(0));
    assert_eq!(net.capacity_l, 100.0);
    assert!(!net.gas.contains_key("Plasma"));
    assert!((net.liquid["Plasma"] - 1200.0).abs() < 1e-9);
    assert!((net.liquid["H2O"] - 100.0).abs() < 1e-9);

    let h_gas = 10.0 * 30.0;
    let h_pool = 100.0 * 40.0 / 18.0;
    let expected = (h_gas * 300.0 + h_pool * 250.0) / (h_gas + h_pool);
    assert!(expected < 280.0);
    assert!((net.temperature_k - expected).abs() < 1e-6);
    assert_eq!(net.pressure_kpa, 0.0);
    assert!((net.gas_volume_l + net.liquid_volume_l - 100.0).abs() < 1e-9);
}

#[test]
fn split_leave_join_merge_lifecycle() {
    let run = run_scenario(&bundled("02_split_and_merge.yaml"), RunOptions::default()).unwrap();
    let summary = &run.summary;

    assert_eq!(summary.events_applied, 4);
    assert_eq!(summary.networks.len(), 1);

    let net = &summary.networks[0];
    assert_eq!(net.segments, vec![1, 2, 3, 5]);
    assert_eq!(net.anchor, Some(3));
    assert!((net.capacity_l - 85.0).abs() < 1e-9);
    // Destroying segment 4 took a quarter of everything with it.
    assert!((net.gas["O2"] - 21.0 * 0.75).abs() < 1e-9);
    assert!((net.gas["N2"] - 79.0 * 0.75).abs() < 1e-9);
    assert!((net.liquid["H2O"] - 150.0).abs() < 1e-9);
    assert!((net.temperature_k - 293.15).abs() < 1e-9);
    assert!(net.pressure_kpa > 0.0);
}

#[test]
fn parallel_run_matches_sequential() {
    let scenario = bundled("02_split_and_merge.yaml");
    let sequential = run_scenario(&scenario, RunOptions::default()).unwrap();
    let parallel = run_scenario(
        &scenario,
        RunOptions {
            parallel: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(sequential.summary, parallel.summary);
}

#[test]
fn tick_override_skips_late_events() {
    let run = run_scenario(
        &bundled("02_split_and_merge.yaml"),
        RunOptions {
            ticks: Some(2),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(run.summary.ticks, 2);
    assert_eq!(run.summary.events_applied, 1);
    assert_eq!(run.summary.networks.len(), 2);
}

#[test]
fn event_on_a_departed_segment_fails() {
    let mut scenario = bundled("02_split_and_merge.yaml");
    // Segment 4 is destroyed at tick 2; leaving again at tick 3 has nothing to resolve.
    scenario.events.push(pn_project::ScriptedEventDef {
        tick: 3,
        action: pn_project::EventActionDef::Leave {
            segment: 4,
            capacity_l: 25.0,
            destroying: true,
        },
    });
    let err = run_scenario(&scenario, RunOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::UnresolvedSegment {
            segment: 4,
            tick: 3
        }
    ));
}
