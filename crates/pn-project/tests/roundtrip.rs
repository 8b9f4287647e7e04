use std::collections::BTreeMap;

use pn_project::schema::*;
use pn_project::{load_json, load_yaml, save_json, save_yaml};

fn scenario() -> Scenario {
    Scenario {
        version: 1,
        name: "Roundtrip".to_string(),
        solver: SolverDef {
            max_iterations: Some(6),
            rel_tol: None,
        },
        catalog: BTreeMap::from([(
            "N2O".to_string(),
            PropsOverrideDef {
                boiling_point_k: Some(190.0),
                ..Default::default()
            },
        )]),
        networks: vec![NetworkDef {
            anchor: Some(2),
            segments: vec![
                SegmentDef {
                    id: 10,
                    capacity_l: 12.5,
                },
                SegmentDef {
                    id: 11,
                    capacity_l: 7.5,
                },
            ],
            gas: BTreeMap::from([("N2O".to_string(), 3.0)]),
            liquid: BTreeMap::from([("H2O".to_string(), 40.0)]),
            temperature_k: 260.0,
        }],
        events: vec![ScriptedEventDef {
            tick: 1,
            action: EventActionDef::Split {
                network_of: 10,
                groups: vec![vec![10], vec![11]],
            },
        }],
        ticks: 2,
    }
}

#[test]
fn roundtrip_yaml() {
    let path = std::env::temp_dir().join("pn_project_roundtrip.yaml");
    save_yaml(&path, &scenario()).unwrap();
    assert_eq!(load_yaml(&path).unwrap(), scenario());
}

#[test]
fn roundtrip_json() {
    let path = std::env::temp_dir().join("pn_project_roundtrip.json");
    save_json(&path, &scenario()).unwrap();
    assert_eq!(load_json(&path).unwrap(), scenario());
    assert_eq!(pn_project::load(&path).unwrap(), scenario());
}

#[test]
fn invalid_scenario_is_not_saved() {
    let mut bad = scenario();
    bad.networks[0].gas.insert("Kryptonite".to_string(), 1.0);
    let path = std::env::temp_dir().join("pn_project_invalid.yaml");
    let _ = std::fs::remove_file(&path);

    assert!(save_yaml(&path, &bad).is_err());
    assert!(!path.exists());
}
