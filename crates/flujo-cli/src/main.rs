//! flujo - runs a block pipeline described by a manifest file.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use flujo_engine::{CancelToken, Pipeline, TickRunner};
use flujo_loader::{BlockLibrary, LoaderError};
use flujo_manifest::PipelineManifest;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flujo")]
#[command(version, about = "Edge dataflow pipeline runtime", long_about = None)]
struct Cli {
    /// Path to the pipeline manifest (JSON)
    manifest: PathBuf,

    /// Directory searched for compiled block modules
    #[arg(long, default_value = "blocks")]
    block_path: PathBuf,

    /// Number of ticks to run (default: until Ctrl-C)
    #[arg(long)]
    iterations: Option<u64>,

    /// Tick rate in Hz
    #[arg(long, default_value_t = 10.0)]
    rate: f64,

    /// Parse, verify block availability, and build, then exit
    #[arg(long)]
    check: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    if !(cli.rate.is_finite() && cli.rate > 0.0) {
        anyhow::bail!("--rate must be a positive number of ticks per second");
    }

    let manifest = PipelineManifest::load(&cli.manifest)
        .with_context(|| format!("loading manifest '{}'", cli.manifest.display()))?;
    info!(
        "manifest '{}': {} block references, {} nodes, {} connections",
        manifest.pipeline_name,
        manifest.blocks.len(),
        manifest.pipeline.nodes.len(),
        manifest.pipeline.connections.len()
    );

    let mut library = BlockLibrary::new(&cli.block_path);
    ensure_blocks_available(&library, &manifest)?;

    let mut pipeline = Pipeline::new(manifest);
    pipeline
        .build(&mut library)
        .context("building pipeline graph")?;

    if cli.check {
        println!("ok: pipeline builds cleanly");
        return Ok(());
    }

    let report = pipeline.initialize().context("initializing pipeline")?;
    if report.is_total_failure() {
        anyhow::bail!("every node failed to initialize; nothing to run");
    }
    if !report.is_clean() {
        warn!(
            "continuing degraded: {} of {} nodes failed to initialize",
            report.degraded.len(),
            report.total
        );
    }

    // Ctrl-C trips the token; the tick in flight completes before exit.
    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        handler_token.cancel();
    })
    .context("installing Ctrl-C handler")?;

    let mut runner = TickRunner::new(cli.rate);
    if let Some(ticks) = cli.iterations {
        runner = runner.with_max_ticks(ticks);
    }

    let stats = runner.run(&mut pipeline, &cancel)?;
    pipeline.shutdown();

    println!(
        "total_executions={} total_errors={} avg_tick_ms={:.3}",
        stats.total_executions, stats.total_errors, stats.avg_tick_ms
    );
    Ok(())
}

/// Fails with the loader's not-found error for the first referenced block
/// that has no module in the search directory.
fn ensure_blocks_available(
    library: &BlockLibrary,
    manifest: &PipelineManifest,
) -> anyhow::Result<()> {
    for reference in &manifest.blocks {
        if !library.is_available(&reference.id, &reference.version) {
            let err = LoaderError::module_not_found(
                reference.id.clone(),
                reference.version.clone(),
                library.module_path(&reference.id, &reference.version),
            );
            return Err(err).context("pre-checking block availability");
        }
    }
    Ok(())
}
