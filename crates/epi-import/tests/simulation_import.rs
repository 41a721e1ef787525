use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use epi_core::EngineConfig;
use epi_import::report::SkipReason;
use epi_import::{ConflictPolicy, ImportError, import_simulation};
use epi_model::{
    Compartment, Group, GroupCategory, Node, Parameter, Scenario, ScenarioNode, SimulationModel,
};
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

fn scenario_node(key: &str) -> ScenarioNode {
    ScenarioNode {
        node: key.to_string(),
        parameters: Vec::new(),
        interventions: Vec::new(),
    }
}

fn store(prefix: &str) -> DataStore {
    let reference = ReferenceData {
        nodes: vec![node("01001", "Flensburg"), node("00000", "Germany")],
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
            number_of_nodes: 2,
            nodes: vec![scenario_node("01001"), scenario_node("00000")],
        })
        .unwrap();
    store
}

const METADATA: &str = r#"{
    "key": "run1",
    "name": "Run 1",
    "description": "First run",
    "startDay": "2021-06-01",
    "numberOfDays": 5,
    "scenario": "baseline",
    "datasets": ["D"],
    "compartmentOrder": ["infectious", "recovered"],
    "groupMapping": {"D": "G"}
}"#;

/// Six rows per node: the seed state plus five simulated days.
fn six_rows(offset: f64) -> String {
    let rows: Vec<String> = (0..6)
        .map(|i| format!("[{}, {}]", offset + i as f64, offset + 10.0 + i as f64))
        .collect();
    format!("[{}]", rows.join(", "))
}

fn write_percentile(dir: &Path, name: &str, node_rows: &str, summary_rows: &str) {
    let folder = dir.join(name);
    std::fs::create_dir_all(&folder).unwrap();
    std::fs::write(
        folder.join("Results.json"),
        format!(r#"{{"1001": {{"D": {node_rows}}}}}"#),
    )
    .unwrap();
    std::fs::write(
        folder.join("Results_sum.json"),
        format!(r#"{{"0": {{"D": {summary_rows}}}}}"#),
    )
    .unwrap();
    std::fs::write(folder.join("GraphNode00"), r#"{"NodeId": 1001}"#).unwrap();
}

fn write_simulation_folder(metadata: &str) -> PathBuf {
    let dir = unique_temp_dir("epi_sim_data");
    std::fs::write(dir.join("metadata.json"), metadata).unwrap();
    write_percentile(&dir, "25", &six_rows(0.0), &six_rows(100.0));
    write_percentile(&dir, "p50", &six_rows(1.0), &six_rows(101.0));
    dir
}

#[test]
fn seed_row_is_dropped_and_days_start_after_start_day() {
    let store = store("epi_sim_seed");
    let dir = write_simulation_folder(METADATA);

    let report = import_simulation(&store, &EngineConfig::default(), &dir, None).unwrap();
    assert!(report.is_clean());
    // two nodes per percentile, two percentiles
    assert_eq!(report.nodes_imported, 4);

    let rows = store.load_simulation_rows("run1").unwrap();
    let node_rows: Vec<_> = rows
        .iter()
        .filter(|r| r.node_key == "01001" && r.percentile == 25)
        .collect();
    assert_eq!(node_rows.len(), 5);
    let days: Vec<NaiveDate> = node_rows.iter().map(|r| r.day).collect();
    assert_eq!(days[0], NaiveDate::from_ymd_opt(2021, 6, 2).unwrap());
    assert_eq!(days[4], NaiveDate::from_ymd_opt(2021, 6, 6).unwrap());
    // row 1 of the container, not row 0
    assert_eq!(node_rows[0].data.get("infectious"), Some(&1.0));
    assert_eq!(node_rows[0].data.get("recovered"), Some(&11.0));
}

#[test]
fn percentile_comes_from_the_folder_name() {
    let store = store("epi_sim_percentiles");
    let dir = write_simulation_folder(METADATA);

    import_simulation(&store, &EngineConfig::default(), &dir, None).unwrap();
    assert_eq!(store.simulation_percentiles("run1").unwrap(), vec![25, 50]);
}

#[test]
fn existing_simulation_requires_a_policy() {
    let store = store("epi_sim_conflict");
    let dir = write_simulation_folder(METADATA);
    let config = EngineConfig::default();

    import_simulation(&store, &config, &dir, None).unwrap();
    let baseline = store.load_simulation_rows("run1").unwrap().len();

    let err = import_simulation(&store, &config, &dir, None).unwrap_err();
    assert!(matches!(err, ImportError::SimulationExists { key } if key == "run1"));
    assert_eq!(store.load_simulation_rows("run1").unwrap().len(), baseline);

    import_simulation(&store, &config, &dir, Some(ConflictPolicy::Append)).unwrap();
    assert_eq!(
        store.load_simulation_rows("run1").unwrap().len(),
        2 * baseline
    );

    import_simulation(&store, &config, &dir, Some(ConflictPolicy::Replace)).unwrap();
    assert_eq!(store.load_simulation_rows("run1").unwrap().len(), baseline);
}

#[test]
fn row_count_mismatch_skips_the_node() {
    let store = store("epi_sim_rowskip");
    let dir = unique_temp_dir("epi_sim_rowskip_data");
    std::fs::write(dir.join("metadata.json"), METADATA).unwrap();
    // only four rows against numberOfDays 5
    let short = "[[0, 0], [1, 1], [2, 2], [3, 3]]";
    write_percentile(&dir, "50", short, &six_rows(100.0));

    let report = import_simulation(&store, &EngineConfig::default(), &dir, None).unwrap();
    assert_eq!(report.nodes_imported, 1);
    assert!(
        report
            .skips
            .iter()
            .any(|s| matches!(s.reason, SkipReason::RowMismatch { expected: 6, actual: 4 }))
    );

    let rows = store.load_simulation_rows("run1").unwrap();
    assert!(rows.iter().all(|r| r.node_key == "00000"));
}

#[test]
fn node_outside_the_scenario_is_skipped() {
    let store = store("epi_sim_foreign");
    store
        .save_scenario(&Scenario {
            key: "narrow".to_string(),
            name: "Narrow".to_string(),
            description: String::new(),
            simulation_model: "tiny".to_string(),
            number_of_groups: 1,
            number_of_nodes: 1,
            nodes: vec![scenario_node("00000")],
        })
        .unwrap();

    let metadata = METADATA.replace("\"baseline\"", "\"narrow\"");
    let dir = unique_temp_dir("epi_sim_foreign_data");
    std::fs::write(dir.join("metadata.json"), metadata).unwrap();
    write_percentile(&dir, "50", &six_rows(0.0), &six_rows(100.0));

    let report = import_simulation(&store, &EngineConfig::default(), &dir, None).unwrap();
    assert_eq!(report.nodes_imported, 1);
    assert!(
        report
            .skips
            .iter()
            .any(|s| s.unit == "01001"
                && matches!(&s.reason, SkipReason::NodeNotInScenario { scenario } if scenario == "narrow"))
    );
}

#[test]
fn compartment_order_must_match_the_model_exactly() {
    let store = store("epi_sim_order");
    let config = EngineConfig::default();

    // A model compartment missing from the order is fatal.
    let missing = METADATA.replace(r#"["infectious", "recovered"]"#, r#"["infectious"]"#);
    let dir = unique_temp_dir("epi_sim_order_a");
    std::fs::write(dir.join("metadata.json"), missing).unwrap();
    write_percentile(&dir, "50", &six_rows(0.0), &six_rows(100.0));
    let err = import_simulation(&store, &config, &dir, None).unwrap_err();
    assert!(
        matches!(err, ImportError::CompartmentNotInOrder { ref compartment, .. } if compartment == "recovered")
    );

    // So is a non-ignored column the model does not know.
    let extra = METADATA.replace(
        r#"["infectious", "recovered"]"#,
        r#"["infectious", "recovered", "extra"]"#,
    );
    let dir = unique_temp_dir("epi_sim_order_b");
    std::fs::write(dir.join("metadata.json"), extra).unwrap();
    write_percentile(&dir, "50", &six_rows(0.0), &six_rows(100.0));
    let err = import_simulation(&store, &config, &dir, None).unwrap_err();
    assert!(
        matches!(err, ImportError::CompartmentNotInOrder { ref compartment, .. } if compartment == "extra")
    );
    assert!(!store.has_simulation("run1"));
}

#[test]
fn missing_description_is_fatal_before_any_write() {
    let store = store("epi_sim_nodesc");
    let metadata = METADATA.replace(r#""description": "First run","#, "");
    let dir = unique_temp_dir("epi_sim_nodesc_data");
    std::fs::write(dir.join("metadata.json"), metadata).unwrap();
    write_percentile(&dir, "50", &six_rows(0.0), &six_rows(100.0));

    let err = import_simulation(&store, &EngineConfig::default(), &dir, None).unwrap_err();
    assert!(matches!(err, ImportError::MissingKey { key } if key == "description"));
    assert!(!store.has_simulation("run1"));
}

#[test]
fn missing_percentile_folders_are_fatal() {
    let store = store("epi_sim_nopct");
    let dir = unique_temp_dir("epi_sim_nopct_data");
    std::fs::write(dir.join("metadata.json"), METADATA).unwrap();

    let err = import_simulation(&store, &EngineConfig::default(), &dir, None).unwrap_err();
    assert!(matches!(err, ImportError::NoPercentiles));
}
