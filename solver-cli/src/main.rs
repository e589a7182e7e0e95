mod config;

use anyhow::{Context, bail};
use clap::Parser;
use clap::builder::RangedU64ValueParser;
use heat_solver_core::{SimParams, available_threads, parallel_enabled, render_to_path, simulate};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Number of time steps
    #[arg(long, default_value_t = 10000, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    steps: usize,

    /// Worker threads for a single run
    #[arg(long, default_value_t = NonZeroUsize::MIN)]
    num_threads: NonZeroUsize,

    /// Time one run per thread count from 1 to the processor count, then exit without rendering
    #[arg(long)]
    investigate: bool,

    /// Gnuplot script to write the final field to
    #[arg(long, default_value = "heatmap.gnu")]
    out: PathBuf,

    /// JSON file overriding simulation parameters (missing fields keep their defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON-lines file receiving one timing row per thread count
    #[arg(long, requires = "investigate")]
    report: Option<PathBuf>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
struct SweepRow {
    threads: usize,
    steps: usize,
    n: usize,
    elapsed_secs: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let params = match &args.config {
        Some(path) => config::load_params(path)?,
        None => SimParams::default(),
    };
    if !params.is_stable() {
        warn!(
            stability = params.stability_number(),
            "time_step exceeds the explicit stability limit; the field will diverge"
        );
    }

    info!(
        processors = available_threads().get(),
        parallel = parallel_enabled(),
        "environment"
    );

    if args.investigate {
        let mut report = match &args.report {
            Some(path) => Some(BufWriter::new(
                File::create(path).with_context(|| format!("creating {}", path.display()))?,
            )),
            None => None,
        };

        let rows = sweep(args.steps, available_threads(), &params, report.as_mut())?;
        if let Some(w) = report.as_mut() {
            w.flush()?;
        }

        for row in &rows {
            println!("{}\t{:.6}", row.threads, row.elapsed_secs);
        }
        return Ok(());
    }

    run_single(&args, &params)
}

/// One simulation at `--num-threads`, rendered to `--out`.
fn run_single(args: &Args, params: &SimParams) -> anyhow::Result<()> {
    info!("Setting number of threads to {}", args.num_threads);

    let result = simulate(args.steps, args.num_threads, params)?;
    info!(
        "Time taken to complete: {:.6}s",
        result.elapsed.as_secs_f64()
    );

    render_to_path(&args.out, &result.grid)?;
    info!("Wrote heat map to: {}", args.out.display());

    Ok(())
}

/// Time a fresh run for every thread count in `1..=max_threads`.
fn sweep<W: Write>(
    steps: usize,
    max_threads: NonZeroUsize,
    params: &SimParams,
    mut report: Option<&mut W>,
) -> anyhow::Result<Vec<SweepRow>> {
    if !parallel_enabled() {
        bail!("built without the parallel backend, can't investigate parallel performance");
    }

    info!("Starting investigation");
    let mut rows = Vec::with_capacity(max_threads.get());

    for threads in (1..=max_threads.get()).filter_map(NonZeroUsize::new) {
        info!("Setting number of threads to {threads}");
        let result = simulate(steps, threads, params)?;

        let row = SweepRow {
            threads: threads.get(),
            steps,
            n: params.num_intervals,
            elapsed_secs: result.elapsed.as_secs_f64(),
        };
        info!(threads = row.threads, elapsed_secs = row.elapsed_secs, "run finished");

        if let Some(w) = report.as_mut() {
            serde_json::to_writer(&mut **w, &row)?;
            w.write_all(b"\n")?;
        }
        rows.push(row);
    }

    Ok(rows)
}
