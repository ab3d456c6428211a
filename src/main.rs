use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use satpos::builder::open_store;
use satpos::time::parse_timestamp;
use satpos::{
    Config, LoadOutcome, PositionRecord, StoreBackend, TableAdmin, Timestamp, TrackerBuilder,
    ingest, provision,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Point-in-time satellite position queries", long_about = None)]
struct Args {
    /// Configuration file (.toml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Store backend, overriding the configuration file
    #[arg(long, value_enum, global = true)]
    store: Option<StoreKind>,

    /// Snapshot or SQLite file for the selected backend
    #[arg(long, global = true)]
    path: Option<PathBuf>,

    /// Starlink JSON snapshot to load into an empty table
    #[arg(short, long, global = true)]
    data_file: Option<PathBuf>,

    /// Positions table name
    #[arg(long, global = true)]
    table: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StoreKind {
    Memory,
    Snapshot,
    Sqlite,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the positions table and load the data file unless already populated
    Load,
    /// Drop the positions table and every record in it
    Drop,
    /// Print the number of stored records
    Count,
    /// Last known position of a satellite at or before CUTOFF (default: now)
    LastPosition {
        satellite_id: String,
        cutoff: Option<String>,
    },
    /// Satellite closest to LATITUDE, LONGITUDE at or before CUTOFF (default: now)
    #[command(allow_negative_numbers = true)]
    ClosestSatellite {
        latitude: f64,
        longitude: f64,
        cutoff: Option<String>,
    },
}

fn resolve_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(kind) = args.store {
        let path = || {
            args.path
                .clone()
                .or_else(|| match &config.store.backend {
                    StoreBackend::Snapshot { path } | StoreBackend::Sqlite { path } => {
                        Some(path.clone())
                    }
                    StoreBackend::Memory => None,
                })
                .context("--path is required for this store")
        };
        let backend = match kind {
            StoreKind::Memory => StoreBackend::Memory,
            StoreKind::Snapshot => StoreBackend::Snapshot { path: path()? },
            StoreKind::Sqlite => StoreBackend::Sqlite { path: path()? },
        };
        config = config.with_backend(backend);
    } else if let Some(path) = &args.path {
        match &mut config.store.backend {
            StoreBackend::Snapshot { path: current } | StoreBackend::Sqlite { path: current } => {
                *current = path.clone()
            }
            StoreBackend::Memory => bail!("--path needs --store snapshot or --store sqlite"),
        }
    }

    if let Some(table) = &args.table {
        config = config.with_table_name(table.clone());
    }
    if let Some(data_file) = &args.data_file {
        config = config.with_data_file(data_file.clone());
    }

    config.validate()?;
    Ok(config)
}

fn parse_cutoff(cutoff: Option<&str>) -> anyhow::Result<Option<Timestamp>> {
    Ok(cutoff.map(parse_timestamp).transpose()?)
}

fn print_record(record: &PositionRecord) {
    println!("{}", record);
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("satpos=info"))
        .init();

    let args = Args::parse();
    let config = resolve_config(&args)?;
    info!(
        "using {} store, table {}",
        config.store.backend.name(),
        config.store.table_name
    );

    match &args.command {
        Command::Load => {
            let data_file = config
                .ingest
                .data_file
                .as_ref()
                .context("load needs --data-file or ingest.data_file in the config")?;
            let store = open_store(&config.store)?;
            let records = ingest::read_snapshot(data_file)?;
            match provision(&store, records)? {
                LoadOutcome::Loaded(n) => println!("Loaded {} records", n),
                LoadOutcome::Skipped { existing } => {
                    println!("Table already holds {} records, nothing loaded", existing)
                }
            }
        }
        Command::Drop => {
            let store = open_store(&config.store)?;
            if store.teardown()? {
                println!("Dropped table {}", config.store.table_name);
            } else {
                println!("Table {} does not exist", config.store.table_name);
            }
        }
        Command::Count => {
            let tracker = TrackerBuilder::new().config(config).build()?;
            println!("{}", tracker.count()?);
        }
        Command::LastPosition {
            satellite_id,
            cutoff,
        } => {
            let cutoff = parse_cutoff(cutoff.as_deref())?;
            let tracker = TrackerBuilder::new().config(config).build()?;
            match tracker.last_position(satellite_id, cutoff)? {
                Some(record) => print_record(&record),
                None => println!("No results found"),
            }
        }
        Command::ClosestSatellite {
            latitude,
            longitude,
            cutoff,
        } => {
            let cutoff = parse_cutoff(cutoff.as_deref())?;
            let tracker = TrackerBuilder::new().config(config).build()?;
            match tracker.closest_satellite(*latitude, *longitude, cutoff)? {
                Some(closest) => {
                    println!("This is the record of the closest satellite found:");
                    print_record(&closest.record);
                    println!(
                        "--> Distance from the given location => {} KMs",
                        closest.distance_km
                    );
                }
                None => println!("No results found"),
            }
        }
    }

    Ok(())
}
