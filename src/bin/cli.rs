//! refgraph CLI - file reference graphs for project directories.
//!
//! Usage:
//!   refgraph build <path>            # Scan and save a snapshot
//!   refgraph build <path> --progress # Same, streaming progress to stderr
//!   refgraph reindex                 # Rebuild the recorded project
//!   refgraph show                    # Print the snapshot
//!   refgraph deps <id>               # References in both directions
//!   refgraph locate <id>             # Absolute path of a node
//!   refgraph stats                   # Graph statistics

use anyhow::Result;
use clap::Parser;
use refgraph::cli::{Cli, Commands};
use refgraph::{ErrorPayload, GraphError, GraphService, ProgressStatus, Subscription};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        let payload = match e.downcast_ref::<GraphError>() {
            Some(err) => ErrorPayload::from(err),
            None => ErrorPayload {
                error: "internal".to_string(),
                message: e.to_string(),
            },
        };
        println!("{}", serde_json::to_string(&payload).unwrap_or_else(|_| payload.message.clone()));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let service = Arc::new(GraphService::new(cli.resolve_config()));

    match cli.command {
        Commands::Build { path, progress, json, .. } => {
            // Subscribe before the build starts so no early state is missed.
            let printer = progress.then(|| {
                let subscription = service.subscribe();
                tokio::spawn(print_progress(subscription, service.keepalive()))
            });

            let build_service = Arc::clone(&service);
            let graph = tokio::task::spawn_blocking(move || build_service.build(&path)).await?;

            if let Some(printer) = printer {
                // The printer stops on its own once it sees `complete`; a
                // failed build never gets there.
                if graph.is_ok() {
                    printer.await?;
                } else {
                    printer.abort();
                }
            }
            let graph = graph?;

            if json {
                println!("{}", serde_json::to_string_pretty(&graph)?);
            } else {
                println!(
                    "Built {}: {} files, {} connections",
                    graph.metadata.project_name,
                    graph.metadata.file_count,
                    graph.metadata.connection_count
                );
                println!("Snapshot: {}", service.persistence().path().display());
            }
        }

        Commands::Reindex => {
            let service = Arc::clone(&service);
            let summary = tokio::task::spawn_blocking(move || service.reindex()).await??;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::Show => {
            println!("{}", serde_json::to_string_pretty(&service.load()?)?);
        }

        Commands::Deps { id } => {
            let deps = service.dependencies(&id)?;
            println!("{}", deps.id);
            println!("  references ({}):", deps.references.len());
            for r in &deps.references {
                println!("    → {}", r);
            }
            println!("  referenced by ({}):", deps.referenced_by.len());
            for r in &deps.referenced_by {
                println!("    ← {}", r);
            }
        }

        Commands::Locate { id } => {
            println!("{}", service.locate(&id)?.display());
        }

        Commands::Stats => {
            let stats = service.stats()?;
            println!("refgraph - Graph Statistics");
            println!("═══════════════════════════");
            println!("Files:        {}", stats.file_count);
            println!("Connections:  {}", stats.connection_count);
            println!("Isolated:     {}", stats.isolated_files);
            if let Some((id, count)) = &stats.most_referenced {
                println!("Most used:    {} ({})", id, count);
            }
        }
    }

    Ok(())
}

/// Write each progress state to stderr as a JSON line until the build
/// completes.
async fn print_progress(mut subscription: Subscription, wait: Duration) {
    while let Some(state) = subscription.next(wait).await {
        eprintln!("{}", state.to_json());
        if state.status == ProgressStatus::Complete {
            break;
        }
    }
    debug!(subscriber = %subscription.id(), "progress stream finished");
}
