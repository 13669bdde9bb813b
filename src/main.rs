mod cli;

use sheetcast::pipeline::{BatchDriver, PipelineContext};
use sheetcast_av::ToolRegistry;
use sheetcast_core::config::Config;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "sheetcast=trace,sheetcast_core=debug,sheetcast_av=debug".to_string()
        } else {
            "sheetcast=info,sheetcast_core=info,sheetcast_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { max_rows, dry_run } => {
            // Rows are processed strictly one at a time; a single thread is enough.
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(run_batch(cli.config.as_deref(), max_rows, dry_run))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate => validate_config(cli.config.as_deref()),
        Commands::Version => {
            println!("sheetcast {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_batch(
    config_path: Option<&Path>,
    max_rows: Option<usize>,
    dry_run: bool,
) -> Result<()> {
    let config = Config::resolve(config_path).context("Invalid configuration")?;
    for warning in config.warnings() {
        tracing::warn!("{}", warning);
    }

    let max_rows = max_rows.unwrap_or(config.batch.max_rows);
    let ctx = PipelineContext::from_config(&config)?;
    let driver = BatchDriver::new(&ctx, config.batch.pacing());

    if dry_run {
        let planned = driver.plan(max_rows).await.context("Failed to read the sheet")?;
        println!("{} row(s) would be attempted (quota {}):", planned.len(), max_rows);
        for row in planned {
            let identifier = row.identifier.as_deref().unwrap_or("<no identifier>");
            match row.last_status {
                Some(status) => println!("  row {}: {} (last status: {})", row.position, identifier, status),
                None => println!("  row {}: {}", row.position, identifier),
            }
        }
        return Ok(());
    }

    tracing::info!("Starting batch (quota {})", max_rows);
    let report = driver.run(max_rows).await.context("Batch aborted")?;

    println!(
        "Attempted {} row(s): {} done, {} failed, {} without identifier ({} skipped)",
        report.attempted(),
        report.done,
        report.failed,
        report.no_identifier,
        report.skipped
    );

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = Config::load(config_path)?;
    let tools = ToolRegistry::discover(&config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them before running a batch.");
    }

    Ok(())
}

fn validate_config(config_path: Option<&Path>) -> Result<()> {
    match config_path {
        Some(p) => println!("Validating config: {:?}", p),
        None => println!("Validating default config locations and environment"),
    }

    let config = Config::resolve(config_path)?;
    println!("✓ Configuration is valid");
    println!("  Sheet: {}", config.sheet.spreadsheet_id);
    println!(
        "  Worksheet: {}",
        config.sheet.tab.as_deref().unwrap_or("(first sheet)")
    );
    println!(
        "  Google token: {}",
        redact(config.google.access_token.as_deref().unwrap_or_default())
    );
    println!("  Telegram bot: {}", redact(&config.telegram.bot_token));
    println!("  Telegram chat: {}", config.telegram.chat_id);
    println!("  Row quota: {}", config.batch.max_rows);
    println!("  Pacing: {} ms", config.batch.pacing_ms);
    println!("  Work dir: {}", config.batch.work_dir.display());

    for warning in config.warnings() {
        println!("  ! {}", warning);
    }

    Ok(())
}

/// Keep the first few characters of a secret so operators can tell tokens
/// apart without printing them.
fn redact(secret: &str) -> String {
    let secret = secret.trim();
    if secret.is_empty() {
        return "(unset)".to_string();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}…")
}
