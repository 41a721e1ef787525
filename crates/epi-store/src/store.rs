//! Record storage API.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use epi_model::{Scenario, Simulation, SimulationModel};

use crate::types::{DataRow, ReferenceData, SimulationSummary};
use crate::{StoreError, StoreResult};

/// Directory-backed store for reference data, scenarios, simulations,
/// and their flattened data rows.
///
/// Layout:
/// ```text
/// root/
///   reference.json
///   models.json
///   scenarios/<key>.json
///   simulations/<key>/manifest.json
///   simulations/<key>/data.jsonl
///   rki/data.jsonl
/// ```
#[derive(Clone)]
pub struct DataStore {
    root_dir: PathBuf,
    reference: ReferenceData,
    models: Vec<SimulationModel>,
}

impl DataStore {
    /// Create a fresh store, seeding reference data and the model
    /// catalogue.
    pub fn init(
        root_dir: PathBuf,
        reference: ReferenceData,
        models: Vec<SimulationModel>,
    ) -> StoreResult<Self> {
        fs::create_dir_all(root_dir.join("scenarios"))?;
        fs::create_dir_all(root_dir.join("simulations"))?;
        fs::create_dir_all(root_dir.join("rki"))?;

        let store = Self {
            root_dir,
            reference,
            models,
        };
        store.save_reference()?;
        store.save_models()?;
        Ok(store)
    }

    /// Open an existing store.
    pub fn open(root_dir: PathBuf) -> StoreResult<Self> {
        let reference_path = root_dir.join("reference.json");
        if !reference_path.exists() {
            return Err(StoreError::NotInitialized {
                path: root_dir.display().to_string(),
            });
        }

        let reference: ReferenceData =
            serde_json::from_str(&fs::read_to_string(reference_path)?)?;
        let models: Vec<SimulationModel> =
            serde_json::from_str(&fs::read_to_string(root_dir.join("models.json"))?)?;

        Ok(Self {
            root_dir,
            reference,
            models,
        })
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn models(&self) -> &[SimulationModel] {
        &self.models
    }

    pub fn model(&self, key: &str) -> Option<&SimulationModel> {
        self.models.iter().find(|m| m.key == key)
    }

    /// Add a group created during scenario import. Existing keys are
    /// left untouched.
    pub fn add_group(&mut self, group: epi_model::Group) -> StoreResult<()> {
        if self.reference.group(&group.key).is_none() {
            self.reference.groups.push(group);
            self.save_reference()?;
        }
        Ok(())
    }

    fn save_reference(&self) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(&self.reference)?;
        fs::write(self.root_dir.join("reference.json"), json)?;
        Ok(())
    }

    fn save_models(&self) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(&self.models)?;
        fs::write(self.root_dir.join("models.json"), json)?;
        Ok(())
    }

    // ---- scenarios ----

    fn scenario_path(&self, key: &str) -> PathBuf {
        self.root_dir.join("scenarios").join(format!("{key}.json"))
    }

    pub fn has_scenario(&self, key: &str) -> bool {
        self.scenario_path(key).exists()
    }

    pub fn save_scenario(&self, scenario: &Scenario) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(scenario)?;
        fs::write(self.scenario_path(&scenario.key), json)?;
        Ok(())
    }

    pub fn load_scenario(&self, key: &str) -> StoreResult<Scenario> {
        let path = self.scenario_path(key);
        if !path.exists() {
            return Err(StoreError::ScenarioNotFound {
                key: key.to_string(),
            });
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn list_scenarios(&self) -> StoreResult<Vec<Scenario>> {
        let mut scenarios = Vec::new();
        for entry in fs::read_dir(self.root_dir.join("scenarios"))? {
            let entry = entry?;
            if entry.path().extension().is_some_and(|e| e == "json") {
                let scenario: Scenario =
                    serde_json::from_str(&fs::read_to_string(entry.path())?)?;
                scenarios.push(scenario);
            }
        }
        scenarios.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(scenarios)
    }

    /// Delete a scenario and everything it owns (its nodes and their
    /// parameters live inside the one document, so removal is atomic).
    /// Refused while any simulation still references the scenario.
    pub fn delete_scenario(&self, key: &str) -> StoreResult<()> {
        if !self.has_scenario(key) {
            return Err(StoreError::ScenarioNotFound {
                key: key.to_string(),
            });
        }

        for simulation in self.list_simulations()? {
            if simulation.scenario == key {
                return Err(StoreError::ScenarioInUse {
                    key: key.to_string(),
                    simulation: simulation.key,
                });
            }
        }

        fs::remove_file(self.scenario_path(key))?;
        Ok(())
    }

    // ---- simulations ----

    fn simulation_dir(&self, key: &str) -> PathBuf {
        self.root_dir.join("simulations").join(key)
    }

    pub fn has_simulation(&self, key: &str) -> bool {
        self.simulation_dir(key).join("manifest.json").exists()
    }

    /// Persist a new simulation manifest. The key must be free.
    pub fn create_simulation(&self, simulation: &Simulation) -> StoreResult<()> {
        if self.has_simulation(&simulation.key) {
            return Err(StoreError::SimulationExists {
                key: simulation.key.clone(),
            });
        }

        let dir = self.simulation_dir(&simulation.key);
        fs::create_dir_all(&dir)?;
        let json = serde_json::to_string_pretty(simulation)?;
        fs::write(dir.join("manifest.json"), json)?;
        Ok(())
    }

    pub fn load_simulation(&self, key: &str) -> StoreResult<Simulation> {
        let path = self.simulation_dir(key).join("manifest.json");
        if !path.exists() {
            return Err(StoreError::SimulationNotFound {
                key: key.to_string(),
            });
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn list_simulations(&self) -> StoreResult<Vec<Simulation>> {
        let mut simulations = Vec::new();
        for entry in fs::read_dir(self.root_dir.join("simulations"))? {
            let entry = entry?;
            if entry.path().is_dir() {
                let key = entry.file_name().to_string_lossy().to_string();
                if let Ok(simulation) = self.load_simulation(&key) {
                    simulations.push(simulation);
                }
            }
        }
        simulations.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(simulations)
    }

    pub fn simulation_summaries(&self) -> StoreResult<Vec<SimulationSummary>> {
        self.list_simulations()?
            .into_iter()
            .map(|s| {
                let percentiles = self.simulation_percentiles(&s.key)?;
                Ok(SimulationSummary {
                    key: s.key,
                    name: s.name,
                    description: s.description,
                    scenario: s.scenario,
                    start_day: s.start_day,
                    number_of_days: s.number_of_days,
                    percentiles,
                })
            })
            .collect()
    }

    /// Remove a simulation and all its data rows. The referenced
    /// scenario is left alone.
    pub fn delete_simulation(&self, key: &str) -> StoreResult<()> {
        let dir = self.simulation_dir(key);
        if !dir.join("manifest.json").exists() {
            return Err(StoreError::SimulationNotFound {
                key: key.to_string(),
            });
        }
        fs::remove_dir_all(dir)?;
        Ok(())
    }

    /// Append one batch of flattened rows (one percentile of one node,
    /// typically) to a simulation's data file.
    pub fn append_simulation_rows(&self, key: &str, rows: &[DataRow]) -> StoreResult<()> {
        if !self.has_simulation(key) {
            return Err(StoreError::SimulationNotFound {
                key: key.to_string(),
            });
        }
        let path = self.simulation_dir(key).join("data.jsonl");
        append_rows(&path, rows)
    }

    pub fn load_simulation_rows(&self, key: &str) -> StoreResult<Vec<DataRow>> {
        if !self.has_simulation(key) {
            return Err(StoreError::SimulationNotFound {
                key: key.to_string(),
            });
        }
        read_rows(&self.simulation_dir(key).join("data.jsonl"))
    }

    /// Distinct percentiles present in a simulation's rows, ascending.
    pub fn simulation_percentiles(&self, key: &str) -> StoreResult<Vec<i32>> {
        let rows = self.load_simulation_rows(key)?;
        let set: BTreeSet<i32> = rows.iter().map(|r| r.percentile).collect();
        Ok(set.into_iter().collect())
    }

    // ---- reference ("RKI") data ----

    fn rki_path(&self) -> PathBuf {
        self.root_dir.join("rki").join("data.jsonl")
    }

    pub fn load_rki_rows(&self) -> StoreResult<Vec<DataRow>> {
        read_rows(&self.rki_path())
    }

    /// Replace the stored rows of every node present in `rows`; rows of
    /// untouched nodes are kept. Mirrors per-node replace semantics on
    /// re-import.
    pub fn replace_rki_rows(&self, rows: &[DataRow]) -> StoreResult<()> {
        let touched: BTreeSet<&str> = rows.iter().map(|r| r.node_key.as_str()).collect();

        let mut kept: Vec<DataRow> = self
            .load_rki_rows()?
            .into_iter()
            .filter(|r| !touched.contains(r.node_key.as_str()))
            .collect();
        kept.extend_from_slice(rows);

        write_rows(&self.rki_path(), &kept)
    }
}

fn append_rows(path: &Path, rows: &[DataRow]) -> StoreResult<()> {
    let mut content = String::new();
    for row in rows {
        content.push_str(&serde_json::to_string(row)?);
        content.push('\n');
    }

    use std::io::Write;
    let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn write_rows(path: &Path, rows: &[DataRow]) -> StoreResult<()> {
    let mut content = String::new();
    for row in rows {
        content.push_str(&serde_json::to_string(row)?);
        content.push('\n');
    }
    fs::write(path, content)?;
    Ok(())
}

fn read_rows(path: &Path) -> StoreResult<Vec<DataRow>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    let mut rows = Vec::new();
    for line in content.lines() {
        if !line.trim().is_empty() {
            rows.push(serde_json::from_str(line)?);
        }
    }
    Ok(rows)
}
