//! 🚀 railx-cli: the front door, the bouncer, the maitre d' of railx.
//!
//! 🎬 *[narrator voice]* "It all started with a simple main() function..."
//! 📦 This binary is the thin wrapper that parses args, sets up logging, loads config,
//! and then lets the library do the heavy lifting. Like a manager. 🦆

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use railx::transforms::ParserConfig;
use railx::{FlatIncidentRow, IncidentPipeline};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "railx", version, about = "🚆 UK rail incident ingestion pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 🚀 Run the pipeline: source → parse → notify → flatten → sink.
    Run {
        /// 🔧 TOML config file. Missing file means env vars (RAILX_*) only.
        #[arg(short, long, default_value = "railx.toml")]
        config: PathBuf,
    },
    /// 🔍 Parse one incident XML file and print its flattened rows.
    Inspect {
        file: PathBuf,
        /// 🐛 Use the historical first-operator-only extraction.
        #[arg(long)]
        legacy_duplicate_mode: bool,
    },
}

/// 🚀 main(): where it all begins. The "I pressed F5 and held my breath" moment.
#[tokio::main]
async fn main() {
    // 📡 println! debugging is a lifestyle choice we're trying to move past
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run { config } => run(&config).await,
        Command::Inspect {
            file,
            legacy_duplicate_mode,
        } => inspect(&file, legacy_duplicate_mode).await,
    };

    if let Err(err) = result {
        report(&err);
        // 🗑️ Exit with prejudice. Process exitus maximus.
        std::process::exit(1);
    }
}

async fn run(config_file: &Path) -> Result<()> {
    // 🔒 Validate the config file exists before we get too emotionally attached
    let config_file = match config_file.try_exists().with_context(|| {
        format!(
            "💀 Couldn't check whether the configuration file exists. If it's a relative path, \
             try an absolute one. Was checking here: '{}'",
            config_file.display()
        )
    })? {
        true => Some(config_file),
        false => {
            info!(
                "🔧 no config file at '{}', using RAILX_* environment variables only",
                config_file.display()
            );
            None
        }
    };

    let app_config = railx::app_config::load_config(config_file).context(
        "💀 Couldn't load the config. Take a look at the file and make sure the \
         source_config and sink_config sections are there.",
    )?;

    let stats = railx::run(app_config).await?;
    info!(
        "✅ done: {} processed, {} dropped, {} rows written",
        stats.messages_processed, stats.messages_dropped, stats.rows_written
    );
    Ok(())
}

async fn inspect(file: &Path, legacy_duplicate_mode: bool) -> Result<()> {
    let xml_text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("💀 Couldn't read the incident file '{}'", file.display()))?;

    let pipeline = IncidentPipeline::new(ParserConfig {
        legacy_duplicate_mode,
        ..ParserConfig::default()
    });
    let rows = pipeline
        .process_message(&xml_text)
        .with_context(|| format!("💀 '{}' is not an incident we can read", file.display()))?;

    println!("{}", rows_table(&rows));
    println!("🧱 {} row(s)", rows.len());
    Ok(())
}

fn rows_table(rows: &[FlatIncidentRow]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "incident", "version", "operator", "route", "priority", "planned", "start", "end",
        ]);

    let or_blank = |value: Option<&str>| value.unwrap_or("").to_string();
    for row in rows {
        table.add_row(vec![
            or_blank(row.incident_number.as_deref()),
            or_blank(row.version.as_deref()),
            format!(
                "{} ({})",
                row.affected_operator_ref.as_deref().unwrap_or("?"),
                row.affected_operator_name.as_deref().unwrap_or("?")
            ),
            row.route_affected.clone(),
            row.incident_priority.map(|p| p.to_string()).unwrap_or_default(),
            row.planned.map(|p| p.to_string()).unwrap_or_default(),
            or_blank(row.start_time.as_deref()),
            or_blank(row.end_time.as_deref()),
        ]);
    }
    table
}

/// 💀 Peel the onion of sadness one layer at a time, and say something useful
/// if it smells like a connection problem.
fn report(err: &anyhow::Error) {
    error!("💀 error: {}", err);
    let mut the_vibes_are_giving_connection_issues = false;
    for cause in err.chain().skip(1) {
        error!("⚠️  cause: {}", cause);
        let cause_str = cause.to_string();
        if cause_str.contains("error sending request")
            || cause_str.contains("connection refused")
            || cause_str.contains("Connection refused")
            || cause_str.contains("tcp connect error")
            || cause_str.contains("dns error")
        {
            the_vibes_are_giving_connection_issues = true;
        }
    }

    if the_vibes_are_giving_connection_issues {
        error!(
            "🔧 hint: looks like a service isn't reachable. Double-check that the STOMP \
             broker, Elasticsearch, or the notification webhook is actually running and \
             that the host and port in the config are right. If you're using Docker, \
             `docker ps` is your friend. ☕"
        );
    }
}
