use std::path::Path;

#[test]
fn bundled_scenarios_load_and_validate() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../scenarios");
    let scenarios = ["01_condensing_pool.yaml", "02_split_and_merge.yaml"];

    for name in scenarios {
        let path = root.join(name);
        let scenario =
            pn_project::load(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        pn_project::validate_scenario(&scenario)
            .unwrap_or_else(|e| panic!("Failed to validate {}: {}", name, e));
        assert!(!scenario.networks.is_empty());
    }
}

#[test]
fn scenario_without_optional_sections_uses_defaults() {
    let yaml = r#"
version: 1
name: bare
networks:
  - segments:
      - { id: 0, capacity_l: 10.0 }
"#;
    let scenario: pn_project::Scenario = serde_yaml::from_str(yaml).unwrap();
    pn_project::validate_scenario(&scenario).unwrap();

    assert_eq!(scenario.ticks, 1);
    assert_eq!(scenario.solver, pn_project::SolverDef::default());
    assert!(scenario.catalog.is_empty());
    assert_eq!(scenario.networks[0].anchor, None);
    assert_eq!(scenario.networks[0].temperature_k, 293.15);
}

#[test]
fn unknown_event_type_fails_to_parse() {
    let yaml = r#"
version: 1
name: bad
networks:
  - segments:
      - { id: 0, capacity_l: 10.0 }
events:
  - tick: 0
    action:
      type: Explode
      segment: 0
"#;
    assert!(serde_yaml::from_str::<pn_project::Scenario>(yaml).is_err());
}
