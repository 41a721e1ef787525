use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use epi_core::EngineConfig;
use epi_import::ConflictPolicy;
use epi_model::{
    Compartment, Group, GroupCategory, Node, Parameter, Scenario, ScenarioNode, SimulationModel,
};
use epi_query::FilterParams;
use epi_store::{DataStore, ReferenceData};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    std::fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn node(key: &str, name: &str) -> Node {
    Node {
        key: key.to_string(),
        name: name.to_string(),
        metadata: serde_json::Value::Null,
    }
}

fn tiny_model() -> SimulationModel {
    SimulationModel {
        key: "tiny".to_string(),
        name: "Tiny".to_string(),
        description: String::new(),
        parameters: vec![Parameter {
            key: "beta".to_string(),
            name: "beta".to_string(),
            description: String::new(),
        }],
        compartments: vec![
            Compartment {
                key: "infectious".to_string(),
                name: "Infectious".to_string(),
                description: String::new(),
            },
            Compartment {
                key: "recovered".to_string(),
                name: "Recovered".to_string(),
                description: String::new(),
            },
        ],
    }
}

fn store(prefix: &str) -> DataStore {
    let reference = ReferenceData {
        nodes: vec![
            node("01001", "Flensburg"),
            node("01002", "Kiel"),
            node("00000", "Germany"),
        ],
        group_categories: vec![GroupCategory {
            key: "age".to_string(),
            name: "Age".to_string(),
            description: String::new(),
        }],
        groups: vec![Group {
            key: "G".to_string(),
            name: "G".to_string(),
            description: String::new(),
            category: "age".to_string(),
        }],
        restrictions: Vec::new(),
    };
    let store = DataStore::init(unique_temp_dir(prefix), reference, vec![tiny_model()]).unwrap();
    store
        .save_scenario(&Scenario {
            key: "baseline".to_string(),
            name: "Baseline".to_string(),
            description: String::new(),
            simulation_model: "tiny".to_string(),
            number_of_groups: 1,
            number_of_nodes: 3,
            nodes: vec![
                ScenarioNode {
                    node: "01001".to_string(),
                    parameters: Vec::new(),
                    interventions: Vec::new(),
                },
                ScenarioNode {
                    node: "01002".to_string(),
                    parameters: Vec::new(),
                    interventions: Vec::new(),
                },
                ScenarioNode {
                    node: "00000".to_string(),
                    parameters: Vec::new(),
                    interventions: Vec::new(),
                },
            ],
        })
        .unwrap();
    store
}

const SIMULATION_METADATA: &str = r#"{
    "key": "run1",
    "name": "Run 1",
    "description": "First run",
    "startDay": "2021-06-01",
    "numberOfDays": 3,
    "scenario": "baseline",
    "datasets": ["D"],
    "compartmentOrder": ["infectious", "recovered"],
    "groupMapping": {"D": "G"}
}"#;

fn write_simulation_folder() -> PathBuf {
    let dir = unique_temp_dir("epi_app_sim");
    std::fs::write(dir.join("metadata.json"), SIMULATION_METADATA).unwrap();
    write_percentile(&dir, "50");
    dir
}

fn write_percentile(dir: &Path, name: &str) {
    let folder = dir.join(name);
    std::fs::create_dir_all(&folder).unwrap();
    // seed row plus three days per node
    std::fs::write(
        folder.join("Results.json"),
        r#"{
            "1001": {"D": [[0, 0], [1, 10], [2, 20], [3, 30]]},
            "1002": {"D": [[0, 0], [5, 50], [6, 60], [7, 70]]}
        }"#,
    )
    .unwrap();
    std::fs::write(
        folder.join("Results_sum.json"),
        r#"{"0": {"D": [[0, 0], [6, 60], [8, 80], [10, 100]]}}"#,
    )
    .unwrap();
    std::fs::write(folder.join("GraphNode00"), r#"{"NodeId": 1001}"#).unwrap();
    std::fs::write(folder.join("GraphNode01"), r#"{"NodeId": 1002}"#).unwrap();
}

#[test]
fn imported_simulation_serves_series_by_node_and_day() {
    let store = store("epi_app_flow");
    let config = EngineConfig::default();

    let report = epi_app::import_simulation(&store, &config, &write_simulation_folder(), None)
        .unwrap();
    assert!(report.is_clean());

    // per-node series: three days ascending
    let page = epi_app::simulation_series_by_node(
        &store,
        &config,
        "run1",
        "01001",
        &FilterParams::default(),
    )
    .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items[0].day, NaiveDate::from_ymd_opt(2021, 6, 2).unwrap());
    assert_eq!(page.items[0].compartments["infectious"], 1.0);
    assert_eq!(page.items[2].compartments["infectious"], 3.0);

    // per-day cross-section: one record per node, ascending by name
    let params = FilterParams {
        day: Some("2021-06-02".to_string()),
        ..FilterParams::default()
    };
    let page = epi_app::simulation_series_by_day(&store, &config, "run1", &params).unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items[0].name, "Flensburg");
    assert_eq!(page.items[1].name, "Germany");
    assert_eq!(page.items[1].compartments["infectious"], 6.0);
    assert_eq!(page.items[2].name, "Kiel");

    // compartment subsetting at serialization
    let params = FilterParams {
        compartments: Some(vec!["recovered".to_string()]),
        ..FilterParams::default()
    };
    let page =
        epi_app::simulation_series_by_node(&store, &config, "run1", "01002", &params).unwrap();
    assert_eq!(page.items[0].compartments.len(), 1);
    assert_eq!(page.items[0].compartments["recovered"], 50.0);
}

#[test]
fn unknown_keys_are_not_found_and_empty_matches_are_not() {
    let store = store("epi_app_notfound");
    let config = EngineConfig::default();
    epi_app::import_simulation(&store, &config, &write_simulation_folder(), None).unwrap();

    let err = epi_app::simulation_series_by_node(
        &store,
        &config,
        "no-such-run",
        "01001",
        &FilterParams::default(),
    )
    .unwrap_err();
    assert!(matches!(err, epi_app::AppError::SimulationNotFound(_)));

    let err = epi_app::simulation_series_by_node(
        &store,
        &config,
        "run1",
        "99999",
        &FilterParams::default(),
    )
    .unwrap_err();
    assert!(matches!(err, epi_app::AppError::NodeNotFound(_)));

    // a day with no rows is an empty page
    let params = FilterParams {
        day: Some("2030-01-01".to_string()),
        ..FilterParams::default()
    };
    let page = epi_app::simulation_series_by_day(&store, &config, "run1", &params).unwrap();
    assert_eq!(page.total, 0);
}

#[test]
fn conflict_surfaces_then_replace_resolves() {
    let store = store("epi_app_conflict");
    let config = EngineConfig::default();
    let folder = write_simulation_folder();

    epi_app::import_simulation(&store, &config, &folder, None).unwrap();
    let err = epi_app::import_simulation(&store, &config, &folder, None).unwrap_err();
    assert!(matches!(err, epi_app::AppError::SimulationExists(ref key) if key == "run1"));

    epi_app::import_simulation(&store, &config, &folder, Some(ConflictPolicy::Replace)).unwrap();
    let summaries = epi_app::list_simulation_summaries(&store).unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].percentiles, vec![50]);
}

#[test]
fn scenario_deletion_is_blocked_while_referenced() {
    let store = store("epi_app_refdel");
    let config = EngineConfig::default();
    epi_app::import_simulation(&store, &config, &write_simulation_folder(), None).unwrap();

    let err = epi_app::delete_scenario(&store, "baseline").unwrap_err();
    assert!(matches!(err, epi_app::AppError::Store(_)));

    epi_app::delete_simulation(&store, "run1").unwrap();
    epi_app::delete_scenario(&store, "baseline").unwrap();
    assert!(epi_app::list_scenario_summaries(&store).unwrap().is_empty());
}

#[test]
fn catalog_lists_models_and_reference_entities() {
    let store = store("epi_app_catalog");

    let models = epi_app::list_models(&store);
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].compartment_count, 2);

    let detail = epi_app::get_model_detail(&store, "tiny").unwrap();
    assert_eq!(detail.parameters.len(), 1);
    assert!(matches!(
        epi_app::get_model_detail(&store, "huge").unwrap_err(),
        epi_app::AppError::ModelNotFound(_)
    ));

    assert_eq!(epi_app::list_nodes(&store).len(), 3);
    assert_eq!(epi_app::list_groups(&store).len(), 1);
    assert_eq!(epi_app::list_group_categories(&store).len(), 1);
    assert_eq!(
        epi_app::list_compartments(&store, "tiny").unwrap().len(),
        2
    );
}
