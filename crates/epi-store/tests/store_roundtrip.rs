use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use epi_model::registry::secihurd;
use epi_model::{
    Distribution, Node, Scenario, ScenarioNode, ScenarioParameter, ScenarioParameterGroup,
    Simulation,
};
use epi_store::{DataRow, DataStore, ReferenceData, StoreError};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn reference() -> ReferenceData {
    ReferenceData {
        nodes: vec![Node {
            key: "01001".to_string(),
            name: "Flensburg".to_string(),
            metadata: serde_json::Value::Null,
        }],
        ..Default::default()
    }
}

fn scenario(key: &str) -> Scenario {
    Scenario {
        key: key.to_string(),
        name: "Baseline".to_string(),
        description: String::new(),
        simulation_model: "secihurd".to_string(),
        number_of_groups: 1,
        number_of_nodes: 1,
        nodes: vec![ScenarioNode {
            node: "01001".to_string(),
            parameters: vec![ScenarioParameter {
                parameter: "incubation".to_string(),
                groups: vec![ScenarioParameterGroup {
                    groups: vec!["age_0".to_string()],
                    distribution: Distribution {
                        kind: Default::default(),
                        min: 4.0,
                        max: 7.0,
                        value: 0.0,
                    },
                }],
            }],
            interventions: Vec::new(),
        }],
    }
}

fn simulation(key: &str, scenario: &str) -> Simulation {
    Simulation {
        key: key.to_string(),
        name: "Run".to_string(),
        description: String::new(),
        scenario: scenario.to_string(),
        start_day: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        number_of_days: 5,
    }
}

fn row(day: u32, percentile: i32) -> DataRow {
    DataRow {
        node_key: "01001".to_string(),
        node_name: "Flensburg".to_string(),
        groups: "0-4".to_string(),
        day: NaiveDate::from_ymd_opt(2021, 1, day).unwrap(),
        percentile,
        data: BTreeMap::from([("infectious".to_string(), 5.0)]),
    }
}

#[test]
fn scenario_save_load_roundtrip() {
    let store = DataStore::init(
        unique_temp_dir("epi_store_scenario"),
        reference(),
        vec![secihurd()],
    )
    .unwrap();

    let original = scenario("baseline");
    store.save_scenario(&original).unwrap();

    let loaded = store.load_scenario("baseline").unwrap();
    assert_eq!(original, loaded);

    let listed = store.list_scenarios().unwrap();
    assert_eq!(listed.len(), 1);
}

#[test]
fn simulation_rows_append_and_reload() {
    let store = DataStore::init(
        unique_temp_dir("epi_store_sim"),
        reference(),
        vec![secihurd()],
    )
    .unwrap();

    store.save_scenario(&scenario("baseline")).unwrap();
    store
        .create_simulation(&simulation("run1", "baseline"))
        .unwrap();

    store
        .append_simulation_rows("run1", &[row(2, 25), row(3, 25)])
        .unwrap();
    store.append_simulation_rows("run1", &[row(2, 75)]).unwrap();

    let rows = store.load_simulation_rows("run1").unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(store.simulation_percentiles("run1").unwrap(), vec![25, 75]);
}

#[test]
fn duplicate_simulation_key_is_rejected() {
    let store = DataStore::init(
        unique_temp_dir("epi_store_dup"),
        reference(),
        vec![secihurd()],
    )
    .unwrap();

    store.save_scenario(&scenario("baseline")).unwrap();
    store
        .create_simulation(&simulation("run1", "baseline"))
        .unwrap();
    assert!(matches!(
        store.create_simulation(&simulation("run1", "baseline")),
        Err(StoreError::SimulationExists { .. })
    ));
}

#[test]
fn scenario_delete_is_restricted_while_referenced() {
    let store = DataStore::init(
        unique_temp_dir("epi_store_cascade"),
        reference(),
        vec![secihurd()],
    )
    .unwrap();

    store.save_scenario(&scenario("baseline")).unwrap();
    store
        .create_simulation(&simulation("run1", "baseline"))
        .unwrap();

    // referenced: refused
    assert!(matches!(
        store.delete_scenario("baseline"),
        Err(StoreError::ScenarioInUse { .. })
    ));

    // deleting the simulation leaves the scenario in place
    store.delete_simulation("run1").unwrap();
    assert!(store.has_scenario("baseline"));

    // now the scenario (and everything it owns) can go
    store.delete_scenario("baseline").unwrap();
    assert!(!store.has_scenario("baseline"));
}

#[test]
fn rki_rows_replace_per_node() {
    let store = DataStore::init(
        unique_temp_dir("epi_store_rki"),
        reference(),
        vec![secihurd()],
    )
    .unwrap();

    let mut other = row(1, 50);
    other.node_key = "02000".to_string();
    other.node_name = "Hamburg".to_string();

    store.replace_rki_rows(&[row(1, 50), other]).unwrap();
    assert_eq!(store.load_rki_rows().unwrap().len(), 2);

    // re-import for node 01001 replaces that node's rows only
    store.replace_rki_rows(&[row(2, 50), row(3, 50)]).unwrap();
    let rows = store.load_rki_rows().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows.iter().filter(|r| r.node_key == "02000").count(),
        1
    );
}
