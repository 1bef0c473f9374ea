//! `flowrunner` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`    — start the API server over an in-memory store.
//! - `validate` — validate a workflow definition JSON file.
//! - `run`      — execute a workflow file locally and print the report.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use api::AppState;
use engine::{validate_definition, ExecutionRunner, WorkflowDefinition};
use nodes::ActionRegistry;
use store::{MemoryStore, RecordStore};

#[derive(Parser)]
#[command(
    name = "flowrunner",
    about = "Declarative workflow execution engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080", env = "FLOWRUNNER_BIND")]
        bind: String,
    },
    /// Validate a workflow definition JSON file.
    Validate {
        /// Path to the workflow JSON file.
        path: std::path::PathBuf,
    },
    /// Execute a workflow definition file against an in-memory store.
    Run {
        /// Path to the workflow JSON file.
        path: std::path::PathBuf,
        /// Initial input payload as inline JSON.
        #[arg(long, default_value = "{}")]
        input: String,
    },
}

fn load_definition(path: &std::path::Path) -> anyhow::Result<WorkflowDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read file {}", path.display()))?;
    serde_json::from_str(&content).context("invalid workflow JSON")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind } => {
            info!("starting API server on {bind}");
            let store = Arc::new(MemoryStore::new()) as Arc<dyn RecordStore>;
            api::serve(&bind, AppState::new(store)).await?;
        }
        Command::Validate { path } => {
            let definition = load_definition(&path)?;
            match validate_definition(&definition) {
                Ok(()) => {
                    let triggers = definition.trigger_nodes().count();
                    println!(
                        "workflow is valid: {} nodes, {} edges, {triggers} trigger(s)",
                        definition.nodes.len(),
                        definition.edges.len()
                    );
                }
                Err(e) => {
                    eprintln!("validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Command::Run { path, input } => {
            let definition = load_definition(&path)?;
            let input: serde_json::Value =
                serde_json::from_str(&input).context("--input must be valid JSON")?;

            let store = Arc::new(MemoryStore::new()) as Arc<dyn RecordStore>;
            let runner = ExecutionRunner::new(
                Arc::clone(&store),
                ActionRegistry::with_builtins(Arc::clone(&store)),
            );

            let workflow_id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("local")
                .to_string();
            let report = runner.execute(&workflow_id, &definition, input).await?;

            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.error.is_some() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
