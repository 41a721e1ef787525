use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use epi_app::{
    AppError, AppResult, ConflictPolicy, FilterParams, GroupParams, Page, SeriesRecord, catalog,
    import_service, scenario_service, series, simulation_service,
};
use epi_core::EngineConfig;
use epi_model::ModelRegistry;
use epi_store::{DataStore, ReferenceData};

#[derive(Parser)]
#[command(name = "epi-cli")]
#[command(about = "Epidemiological simulation data store - import and query tool", long_about = None)]
struct Cli {
    /// Path to the data store directory
    #[arg(short, long, default_value = "epidata")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a data store from a reference data JSON file
    Init {
        /// JSON file with nodes, groups, group categories, and restrictions
        reference_path: PathBuf,
    },
    /// Import a reference (RKI) results folder
    ImportRki {
        /// Folder with metadata.json, Results.json, and Results_sum.json
        data_path: PathBuf,
    },
    /// Build a scenario from a config file
    ImportScenario {
        /// Scenario config JSON
        config_path: PathBuf,
    },
    /// Import a simulation results folder
    ImportSimulation {
        /// Folder with metadata.json and one sub-folder per percentile
        data_path: PathBuf,
        /// Replace an existing simulation with the same key
        #[arg(long, conflicts_with = "append")]
        replace: bool,
        /// Append to an existing simulation with the same key
        #[arg(long)]
        append: bool,
    },
    /// Delete a scenario (refused while simulations reference it)
    DeleteScenario { key: String },
    /// Delete a simulation and all its data
    DeleteSimulation { key: String },
    /// List stored scenarios
    Scenarios,
    /// List stored simulations
    Simulations,
    /// List registered simulation models
    Models,
    /// List reference nodes
    Nodes,
    /// Time series for one node, one record per day
    SeriesNode {
        /// Node key (e.g. 01001)
        node: String,
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Cross-section over nodes for the filtered day range
    SeriesDay {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Simulation key to read from
    #[arg(long, conflicts_with = "rki")]
    simulation: Option<String>,
    /// Read the imported reference (RKI) data instead of a simulation
    #[arg(long)]
    rki: bool,
}

#[derive(Args)]
struct FilterArgs {
    /// Single day YYYY-MM-DD; overrides --from and --to
    #[arg(long)]
    day: Option<String>,
    /// First day, inclusive
    #[arg(long)]
    from: Option<String>,
    /// Last day, inclusive
    #[arg(long)]
    to: Option<String>,
    /// Comma-separated group names; a row matches if it carries any
    #[arg(long)]
    groups: Option<String>,
    /// CATEGORY=name1,name2 - repeatable; all categories must match
    #[arg(long = "group-category", value_name = "CATEGORY=NAMES")]
    group_categories: Vec<String>,
    /// Comma-separated compartments to keep in the output
    #[arg(long)]
    compartments: Option<String>,
    /// Percentile to select (default 50)
    #[arg(long)]
    percentile: Option<String>,
    /// Return everything in one page
    #[arg(long)]
    all: bool,
    #[arg(long)]
    page: Option<usize>,
    #[arg(long)]
    page_size: Option<usize>,
}

#[derive(Args)]
struct OutputArgs {
    /// Print the page as JSON instead of text
    #[arg(long)]
    json: bool,
    /// Write the records as CSV to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = EngineConfig::default();

    match cli.command {
        Commands::Init { reference_path } => cmd_init(&cli.store, &reference_path),
        Commands::ImportRki { data_path } => cmd_import_rki(&cli.store, &config, &data_path),
        Commands::ImportScenario { config_path } => cmd_import_scenario(&cli.store, &config_path),
        Commands::ImportSimulation {
            data_path,
            replace,
            append,
        } => cmd_import_simulation(&cli.store, &config, &data_path, replace, append),
        Commands::DeleteScenario { key } => {
            scenario_service::delete_scenario(&open(&cli.store)?, &key)?;
            println!("✓ Deleted scenario: {}", key);
            Ok(())
        }
        Commands::DeleteSimulation { key } => {
            simulation_service::delete_simulation(&open(&cli.store)?, &key)?;
            println!("✓ Deleted simulation: {}", key);
            Ok(())
        }
        Commands::Scenarios => cmd_scenarios(&cli.store),
        Commands::Simulations => cmd_simulations(&cli.store),
        Commands::Models => cmd_models(&cli.store),
        Commands::Nodes => cmd_nodes(&cli.store),
        Commands::SeriesNode {
            node,
            source,
            filter,
            output,
        } => cmd_series_node(&cli.store, &config, &node, &source, &filter, &output),
        Commands::SeriesDay {
            source,
            filter,
            output,
        } => cmd_series_day(&cli.store, &config, &source, &filter, &output),
    }
}

fn open(store_dir: &Path) -> AppResult<DataStore> {
    Ok(DataStore::open(store_dir.to_path_buf()).map_err(AppError::from)?)
}

fn cmd_init(store_dir: &Path, reference_path: &Path) -> AppResult<()> {
    println!("Initializing store: {}", store_dir.display());

    let raw = std::fs::read_to_string(reference_path)?;
    let reference: ReferenceData = serde_json::from_str(&raw)
        .map_err(|e| AppError::InvalidInput(format!("bad reference file: {e}")))?;
    let models = ModelRegistry::builtin().models().to_vec();

    let store = DataStore::init(store_dir.to_path_buf(), reference, models)?;
    println!(
        "✓ Store initialized ({} nodes, {} groups, {} models)",
        store.reference().nodes.len(),
        store.reference().groups.len(),
        store.models().len()
    );
    Ok(())
}

fn cmd_import_rki(store_dir: &Path, config: &EngineConfig, data_path: &Path) -> AppResult<()> {
    println!("Importing reference data: {}", data_path.display());

    let store = open(store_dir)?;
    let report = import_service::import_rki(&store, config, data_path)?;
    print_report(&report);
    Ok(())
}

fn cmd_import_scenario(store_dir: &Path, config_path: &Path) -> AppResult<()> {
    println!("Importing scenario: {}", config_path.display());

    let mut store = open(store_dir)?;
    let scenario = import_service::import_scenario(&mut store, config_path)?;
    println!(
        "✓ Scenario imported: {} ({} nodes, model {})",
        scenario.key,
        scenario.nodes.len(),
        scenario.simulation_model
    );
    Ok(())
}

fn cmd_import_simulation(
    store_dir: &Path,
    config: &EngineConfig,
    data_path: &Path,
    replace: bool,
    append: bool,
) -> AppResult<()> {
    println!("Importing simulation: {}", data_path.display());

    let store = open(store_dir)?;
    let policy = if replace {
        Some(ConflictPolicy::Replace)
    } else if append {
        Some(ConflictPolicy::Append)
    } else {
        None
    };

    let report = match import_service::import_simulation(&store, config, data_path, policy) {
        Err(AppError::SimulationExists(key)) => {
            let policy = prompt_conflict_policy(&key)?;
            import_service::import_simulation(&store, config, data_path, Some(policy))?
        }
        other => other?,
    };
    print_report(&report);
    Ok(())
}

/// Ask whether an existing simulation should be replaced or appended
/// to. Anything but "1" or "2" aborts the import.
fn prompt_conflict_policy(key: &str) -> AppResult<ConflictPolicy> {
    println!("Simulation '{}' already exists.", key);
    print!("Replace (1) or append (2)? ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    match answer.trim() {
        "1" => Ok(ConflictPolicy::Replace),
        "2" => Ok(ConflictPolicy::Append),
        other => Err(AppError::InvalidInput(format!(
            "expected 1 or 2, got '{other}'"
        ))),
    }
}

fn print_report(report: &import_service::ImportReport) {
    println!(
        "✓ Import finished: {} nodes, {} entries",
        report.nodes_imported, report.entries_created
    );
    if !report.skips.is_empty() {
        println!("  Skipped:");
        for skip in &report.skips {
            println!("    {}: {}", skip.unit, skip.reason);
        }
    }
}

fn cmd_scenarios(store_dir: &Path) -> AppResult<()> {
    let store = open(store_dir)?;
    let scenarios = scenario_service::list_scenario_summaries(&store)?;

    if scenarios.is_empty() {
        println!("No scenarios in store");
    } else {
        println!("Scenarios:");
        for s in scenarios {
            println!(
                "  {} - {} (model {}, {} nodes, {} groups)",
                s.key, s.name, s.simulation_model, s.number_of_nodes, s.number_of_groups
            );
        }
    }
    Ok(())
}

fn cmd_simulations(store_dir: &Path) -> AppResult<()> {
    let store = open(store_dir)?;
    let simulations = simulation_service::list_simulation_summaries(&store)?;

    if simulations.is_empty() {
        println!("No simulations in store");
    } else {
        println!("Simulations:");
        for s in simulations {
            let percentiles: Vec<String> = s.percentiles.iter().map(|p| p.to_string()).collect();
            println!(
                "  {} - {} (scenario {}, {} days from {}, percentiles [{}])",
                s.key,
                s.name,
                s.scenario,
                s.number_of_days,
                s.start_day,
                percentiles.join(", ")
            );
        }
    }
    Ok(())
}

fn cmd_models(store_dir: &Path) -> AppResult<()> {
    let store = open(store_dir)?;

    println!("Models:");
    for m in catalog::list_models(&store) {
        println!(
            "  {} - {} ({} parameters, {} compartments)",
            m.key, m.name, m.parameter_count, m.compartment_count
        );
    }
    Ok(())
}

fn cmd_nodes(store_dir: &Path) -> AppResult<()> {
    let store = open(store_dir)?;

    println!("Nodes:");
    for n in catalog::list_nodes(&store) {
        println!("  {} - {}", n.key, n.name);
    }
    Ok(())
}

fn cmd_series_node(
    store_dir: &Path,
    config: &EngineConfig,
    node: &str,
    source: &SourceArgs,
    filter: &FilterArgs,
    output: &OutputArgs,
) -> AppResult<()> {
    let store = open(store_dir)?;
    let params = filter.to_params()?;

    let page = if source.rki {
        series::rki_series_by_node(&store, config, node, &params)?
    } else {
        let simulation = source.require_simulation()?;
        series::simulation_series_by_node(&store, config, simulation, node, &params)?
    };

    write_page(&page, output)
}

fn cmd_series_day(
    store_dir: &Path,
    config: &EngineConfig,
    source: &SourceArgs,
    filter: &FilterArgs,
    output: &OutputArgs,
) -> AppResult<()> {
    let store = open(store_dir)?;
    let params = filter.to_params()?;

    let page = if source.rki {
        series::rki_series_by_day(&store, config, &params)?
    } else {
        let simulation = source.require_simulation()?;
        series::simulation_series_by_day(&store, config, simulation, &params)?
    };

    write_page(&page, output)
}

impl SourceArgs {
    fn require_simulation(&self) -> AppResult<&str> {
        self.simulation.as_deref().ok_or_else(|| {
            AppError::InvalidInput("either --simulation <KEY> or --rki is required".to_string())
        })
    }
}

impl FilterArgs {
    fn to_params(&self) -> AppResult<FilterParams> {
        let groups = if !self.group_categories.is_empty() {
            let mut by_category = std::collections::BTreeMap::new();
            for entry in &self.group_categories {
                let (category, names) = entry.split_once('=').ok_or_else(|| {
                    AppError::InvalidInput(format!(
                        "expected CATEGORY=NAMES, got '{entry}'"
                    ))
                })?;
                by_category.insert(category.to_string(), split_list(names));
            }
            Some(GroupParams::ByCategory(by_category))
        } else {
            self.groups
                .as_deref()
                .map(|flat| GroupParams::Flat(split_list(flat)))
        };

        Ok(FilterParams {
            day: self.day.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            nodes: None,
            compartments: self.compartments.as_deref().map(split_list),
            groups,
            percentile: self.percentile.clone(),
            all: self.all,
            page: self.page,
            page_size: self.page_size,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn write_page(page: &Page<SeriesRecord>, output: &OutputArgs) -> AppResult<()> {
    if let Some(path) = &output.output {
        // long format, one compartment value per line
        let mut csv = String::from("name,day,compartment,value\n");
        for record in &page.items {
            for (compartment, value) in &record.compartments {
                csv.push_str(&format!(
                    "{},{},{},{}\n",
                    record.name, record.day, compartment, value
                ));
            }
        }
        std::fs::write(path, csv)?;
        println!("✓ Exported {} records to {}", page.items.len(), path.display());
        return Ok(());
    }

    if output.json {
        let json = serde_json::to_string_pretty(&page.items)
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
        println!("{}", json);
        return Ok(());
    }

    println!(
        "Page {} ({} records of {} total):",
        page.page,
        page.items.len(),
        page.total
    );
    for record in &page.items {
        let values: Vec<String> = record
            .compartments
            .iter()
            .map(|(k, v)| format!("{k}={v:.1}"))
            .collect();
        println!("  {} {}  {}", record.day, record.name, values.join("  "));
    }
    Ok(())
}
