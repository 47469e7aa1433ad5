//! PrefixSum - sum dimensions of scene objects by name prefix
//!
//! A CLI tool that loads a scene snapshot, aggregates a dimension, area, or
//! volume over the objects sharing a prefix, and exports the result to CSV.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid arguments, unreadable scene, failed export, etc.)

use anyhow::{Context, Result};
use prefixsum::cli::{Args, OutputFormat};
use prefixsum::config::{Config, CONFIG_FILE_NAME};
use prefixsum::report::{generate_json_report, CalculationReport};
use prefixsum::scene::load_snapshot;
use prefixsum::session::Session;
use std::io;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("PrefixSum v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .prefixsum.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set the default prefix, operation, separator, and export path.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so results on stdout can be piped.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the scene and run either one calculation or an interactive session.
fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let scene_path = args
        .scene
        .as_deref()
        .context("No scene file given (use --scene or PREFIXSUM_SCENE)")?;
    let entities = load_snapshot(scene_path)
        .with_context(|| format!("Failed to load scene {}", scene_path.display()))?;

    let mut session = Session::new(entities, &config);

    if let Some(ref name) = args.active {
        let status = session.use_entity(name);
        if status.is_error() {
            eprintln!("{}", status);
            return Ok(1);
        }
        debug!("{}", status);
    }

    if args.interactive {
        println!("Type 'help' for commands, 'quit' to leave.");
        let stdin = io::stdin();
        session
            .run(stdin.lock(), io::stdout().lock())
            .context("Failed to run interactive session")?;
        return Ok(0);
    }

    run_once(&mut session, &args)
}

/// Calculate once, print the result, and export if requested.
fn run_once(session: &mut Session, args: &Args) -> Result<i32> {
    let (result, entry) = session.calculate();

    if result.is_empty() {
        warn!("No visible objects start with '{}'", session.prefix());
    }

    match args.format {
        OutputFormat::Text => println!("{}", entry),
        OutputFormat::Json => {
            let report = CalculationReport::new(
                session.prefix(),
                session.operation(),
                session.decimal_style(),
                &result,
                session.history().recent(),
            );
            println!("{}", generate_json_report(&report)?);
        }
    }

    if let Some(ref export) = args.export {
        let status = session.export(export.clone());
        if status.is_error() {
            eprintln!("{}", status);
            return Ok(1);
        }
        eprintln!("{}", status);
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
