//! MajorMap - articulation agreement major discovery
//!
//! A CLI tool that, for a chosen receiving institution, discovers every
//! partner institution with an active articulation agreement, fetches
//! each partner's major reports concurrently, and prints one
//! deduplicated, sorted major list.
//!
//! Exit codes:
//!   0 - Success (including an empty major list)
//!   1 - Runtime error (connection, config, institution lookup failure)

mod api;
mod cancel;
mod catalog;
mod cli;
mod config;
mod models;
mod pipeline;
mod report;

use anyhow::{bail, Context, Result};
use api::ArticulationClient;
use cancel::{cancel_pair, CancelToken};
use catalog::InstitutionCatalog;
use cli::{Args, OutputFormat};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::Institution;
use report::MajorListReport;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
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

    // Initialize logging
    init_logging(&args);

    info!("MajorMap v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .majormap.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".majormap.toml");

    if path.exists() {
        eprintln!("⚠️  .majormap.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .majormap.toml")?;

    println!("✅ Created .majormap.toml with default settings.");
    println!("   Edit it to customize the API base URL, timeout, and retries.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete workflow for one receiving-institution selection.
async fn run(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let client = ArticulationClient::new(
        &config.api.base_url,
        config.api.timeout_seconds,
        config.api.retries,
    )
    .context("Failed to build API client")?;

    // One cancellation pair for this selection; Ctrl-C cancels every
    // in-flight fetch of both stages.
    let (handle, token) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    // Step 1: Fetch the institution catalog (once per session)
    let spinner = make_spinner(&args, "Fetching institution catalog...");
    let institutions = client
        .institutions(&token)
        .await
        .context("Failed to fetch institution catalog")?;
    finish_spinner(spinner);

    let catalog = InstitutionCatalog::new(institutions);
    info!("Institution catalog loaded: {} entries", catalog.len());

    // Handle --list-institutions: print the receiving view and exit
    if args.list_institutions {
        return list_institutions(&catalog);
    }

    // Step 2: Resolve the receiving institution from the CLI selection
    let selection = args.institution.as_deref().unwrap_or_default();
    let receiving = select_receiving(&catalog, selection)?;
    let receiving_id = receiving.id;
    let receiving_name = receiving.display_name().to_string();

    if !args.quiet {
        println!(
            "🏛️  Receiving institution: {} (id {})",
            receiving_name, receiving_id
        );
    }

    // Handle --dry-run: resolve agreements, show partners, exit
    if args.dry_run {
        return dry_run(&client, receiving_id, &catalog, &token).await;
    }

    // Step 3: Run the two-stage pipeline
    let spinner = make_spinner(&args, "Aggregating partner majors...");
    let result = pipeline::run(&client, receiving_id, &catalog, &token).await;
    finish_spinner(spinner);

    let major_catalog = match result {
        Ok(c) => c,
        Err(e) if e.is_cancelled() => {
            // A cancelled selection must not surface any results.
            info!("Selection cancelled; discarding stale results");
            if !args.quiet {
                println!("Cancelled.");
            }
            return Ok(());
        }
        Err(e) => return Err(e).context("Major aggregation failed"),
    };

    if major_catalog.is_empty() {
        warn!("No majors found for institution {}", receiving_id);
    }

    // Step 4: Render and emit
    let report = MajorListReport::new(
        receiving_name,
        receiving_id,
        &major_catalog,
        args.filter.as_deref(),
    );

    let rendered = match args.format {
        OutputFormat::Text => report::generate_text_report(&report),
        OutputFormat::Json => report::generate_json_report(&report)?,
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            if !args.quiet {
                println!("✅ Major list saved to: {}", path.display());
            }
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Resolve the CLI institution selection (numeric id or name substring)
/// against the catalog.
fn select_receiving<'a>(
    catalog: &'a InstitutionCatalog,
    selection: &str,
) -> Result<&'a Institution> {
    if let Ok(id) = selection.trim().parse::<i64>() {
        return match catalog.get(id) {
            Some(inst) => Ok(inst),
            None => bail!("No institution with id {} in the catalog", id),
        };
    }

    match catalog.find_by_name(selection) {
        Some(inst) => Ok(inst),
        None => bail!("No institution matching \"{}\" in the catalog", selection),
    }
}

/// Handle --list-institutions: print the receiving view of the catalog.
fn list_institutions(catalog: &InstitutionCatalog) -> Result<()> {
    let view = catalog.receiving_view();

    println!("📚 {} institutions:\n", view.len());
    for inst in view {
        let code = inst.code.as_deref().unwrap_or("");
        let kind = if inst.is_community_college {
            " [community college]"
        } else {
            ""
        };
        println!("  {:>6}  {:<8} {}{}", inst.id, code, inst.display_name(), kind);
    }

    Ok(())
}

/// Handle --dry-run: show per-partner resolution without fetching any
/// major reports.
async fn dry_run(
    client: &ArticulationClient,
    receiving_id: i64,
    catalog: &InstitutionCatalog,
    token: &CancelToken,
) -> Result<()> {
    println!("\n🔍 Dry run: resolving agreements (no major fetches)...\n");

    let agreements = pipeline::resolve_agreements(client, receiving_id, catalog, token)
        .await
        .context("Failed to resolve agreements")?;

    if agreements.is_empty() {
        println!("   No partner agreements found.");
        return Ok(());
    }

    for agreement in &agreements {
        let partner = agreement
            .source_institution_id
            .and_then(|id| catalog.get(id))
            .map(|inst| inst.display_name().to_string())
            .unwrap_or_else(|| "(unresolved partner)".to_string());
        let year = agreement
            .academic_year_id
            .map(|y| y.to_string())
            .unwrap_or_else(|| "-".to_string());
        let status = if agreement.is_viable() { "✔" } else { "✖" };
        let kind = if agreement.is_community_college {
            " [CC]"
        } else {
            ""
        };

        println!("   {} {}{}  (academic year {})", status, partner, kind, year);
    }

    let viable = agreements.iter().filter(|a| a.is_viable()).count();
    println!(
        "\n   {} agreements, {} would be fetched.",
        agreements.len(),
        viable
    );
    println!("\n✅ Dry run complete. No major reports were fetched.");

    Ok(())
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
            info!("Loaded default config from .majormap.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

/// Create a status spinner unless running quiet.
fn make_spinner(args: &Args, message: &'static str) -> Option<ProgressBar> {
    if args.quiet {
        return None;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

fn finish_spinner(spinner: Option<ProgressBar>) {
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
}
