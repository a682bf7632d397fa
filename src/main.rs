//! `erp-forensics` — forensic reconstruction of tabular ERP systems.
//!
//! Drives one end-to-end run (extraction, process mining, gap
//! analysis) and renders the resulting [`erp_forensics::ForensicReport`]
//! in one of its serialisations. The transport that actually reads
//! from a live source system is outside this workspace's scope (spec
//! §6); this CLI only ever drives the bundled offline fixtures unless
//! a future live transport is wired in via `--mode live`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use erp_forensics::{
    load_config, CancellationToken, NullCheckpointStore, OfflineTransport, Orchestrator, OrchestratorEvent,
};

#[derive(Parser)]
#[command(name = "erp-forensics")]
#[command(about = "Forensic reconstruction of tabular ERP systems")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to a TOML configuration file; defaults to
    /// `$HOME/.erp-forensics/config.toml` if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full extraction + process-mining + gap-analysis pipeline.
    Run {
        /// Output format for the rendered report.
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
        /// Write the report to a file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Restrict phase-3 extraction to these extractor ids; repeatable.
        #[arg(long = "module")]
        modules: Vec<String>,
        /// Maximum number of phase-3 extractors running concurrently.
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// List the reference process models this workspace ships.
    ListModels,
}

#[derive(Copy, Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
    ExecutiveSummary,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.or_else(erp_config::default_config_path);
    let mut config = load_config(config_path.as_deref())?;

    match cli.command {
        Command::ListModels => {
            for id in erp_process_mining::ReferenceModelCatalog::with_builtins().list_ids() {
                println!("{id}");
            }
            Ok(())
        }
        Command::Run { format, output, modules, concurrency } => {
            if !modules.is_empty() {
                config.modules = modules.into_iter().collect();
            }
            if let Some(concurrency) = concurrency {
                config.concurrency = concurrency;
            }

            let orchestrator = Orchestrator::new();
            let mut events = orchestrator.subscribe();
            tokio::spawn(async move {
                while let Ok(event) = events.recv().await {
                    match event {
                        OrchestratorEvent::Progress { phase, completed, total, current, .. } => {
                            tracing::info!(phase = %phase, completed, total, current = ?current, "progress");
                        }
                        OrchestratorEvent::ExtractorComplete { extractor_id, succeeded, .. } => {
                            tracing::info!(extractor_id = %extractor_id, succeeded, "extractor complete");
                        }
                        OrchestratorEvent::Error { extractor_id, message, .. } => {
                            tracing::warn!(extractor_id = ?extractor_id, message = %message, "extractor error");
                        }
                    }
                }
            });

            let transport: Option<Arc<dyn erp_forensics::Transport>> = match config.mode {
                erp_forensics::RunMode::Offline => Some(Arc::new(OfflineTransport::new())),
                erp_forensics::RunMode::Live => None,
            };

            let report = orchestrator
                .run(&config, transport, Arc::new(NullCheckpointStore), CancellationToken::new())
                .await;

            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&report.to_serializable())?,
                OutputFormat::Markdown => report.to_markdown(),
                OutputFormat::ExecutiveSummary => report.to_executive_summary(),
            };

            match output {
                Some(path) => std::fs::write(&path, rendered)?,
                None => println!("{rendered}"),
            }
            Ok(())
        }
    }
}
