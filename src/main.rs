use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

// Use library instead of local modules
use swift_registry::{
    logging, Config, IngestionOutcome, IngestionPipeline, SqliteRegistry, SwiftCodeService,
};

fn main() -> Result<()> {
    logging::init_logging();

    let args: Vec<String> = env::args().collect();
    let config = Config::from_env()?;

    match args.get(1).map(String::as_str) {
        Some("import") => run_import(&config, args.get(2).map(PathBuf::from)),
        Some("lookup") => run_lookup(&config, required_arg(&args, "SWIFT code")?),
        Some("country") => run_country(&config, required_arg(&args, "country ISO2 code")?),
        Some("delete") => run_delete(&config, required_arg(&args, "SWIFT code")?),
        Some("stats") => run_stats(&config),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn required_arg<'a>(args: &'a [String], what: &str) -> Result<&'a str> {
    match args.get(2) {
        Some(value) => Ok(value.as_str()),
        None => bail!("Missing argument: {}", what),
    }
}

fn print_usage() {
    println!("swift-registry {}", swift_registry::VERSION);
    println!();
    println!("Usage:");
    println!("  swift-registry import [csv]     Load the dataset if the registry is empty");
    println!("  swift-registry lookup <code>    Show one code (headquarters include branches)");
    println!("  swift-registry country <iso2>   List all codes of a country");
    println!("  swift-registry delete <code>    Remove one code");
    println!("  swift-registry stats            Registry counts");
    println!();
    println!("Environment: DATABASE_PATH, SWIFT_DATA_CSV, INGEST_BATCH_SIZE, RUST_LOG");
}

fn open_registry(config: &Config) -> Result<SqliteRegistry> {
    SqliteRegistry::open(&config.database_path).with_context(|| {
        format!("Failed to open database {}", config.database_path.display())
    })
}

fn open_service(config: &Config) -> Result<SwiftCodeService> {
    Ok(SwiftCodeService::new(Arc::new(open_registry(config)?)))
}

fn run_import(config: &Config, csv_path: Option<PathBuf>) -> Result<()> {
    println!("🗄️  SWIFT code import - CSV → SQLite");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let csv_path = csv_path.unwrap_or_else(|| config.data_csv.clone());
    let registry = open_registry(config)?;
    println!("✓ Database ready: {}", config.database_path.display());

    let outcome = IngestionPipeline::new(&registry)
        .with_batch_size(config.batch_size)
        .ingest_if_empty(&csv_path)?;

    match outcome {
        IngestionOutcome::AlreadyPopulated { existing } => {
            println!("✓ Registry already holds {} codes, nothing imported", existing);
        }
        IngestionOutcome::Completed(report) => {
            println!("✓ Rows read:     {}", report.rows_seen);
            println!("✓ Rows loaded:   {}", report.rows_loaded);
            println!("✓ Rows skipped:  {}", report.rows_skipped);
            println!("✓ Duplicates:    {}", report.duplicates);
            for (reason, count) in &report.skip_reasons {
                println!("    {:?}: {}", reason, count);
            }
        }
    }

    Ok(())
}

fn run_lookup(config: &Config, code: &str) -> Result<()> {
    let view = open_service(config)?.get_details(code)?;
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn run_country(config: &Config, iso2: &str) -> Result<()> {
    let view = open_service(config)?.get_by_country(iso2)?;
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn run_delete(config: &Config, code: &str) -> Result<()> {
    let ack = open_service(config)?.delete(code)?;
    println!("✓ {}", ack.message);
    Ok(())
}

fn run_stats(config: &Config) -> Result<()> {
    let stats = open_registry(config)?.stats()?;
    println!("📊 Registry: {}", config.database_path.display());
    println!("   Total codes:   {}", stats.total);
    println!("   Headquarters:  {}", stats.headquarters);
    println!("   Branches:      {}", stats.branches);
    println!("   Countries:     {}", stats.countries);
    Ok(())
}
