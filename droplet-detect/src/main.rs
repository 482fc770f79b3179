mod droplet_detection;
mod error;
mod parameters;
mod processing;
mod report;

use aads_common::{TracerOptions, init_tracer};
use anyhow::{Context, Result};
use clap::Parser;
use droplet_detection::{Gate, PeakStrategy, loader::load_trace_file};
use parameters::{DetectorParameters, GateParameters, Mode};
use processing::Extraction;
use report::DetectionReport;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};
use tracing::{debug, info};

// cargo run --bin droplet-detect -- trace.txt --manual-gate 0.8,1.2 -o droplets.txt midpeak --edge 4.5
// cargo run --bin droplet-detect -- trace.txt -o reduced.txt rewrite

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Two column text file of time (ms) and detector signal (V).
    input: PathBuf,

    /// Destination of the report, or of the rewritten trace. Reports go to stdout if unset.
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Log at debug level, including the first peaks located and every event removed by the gate.
    #[clap(long)]
    verbose: bool,

    /// Allow rewrite mode to replace the input file without asking.
    #[clap(long)]
    overwrite: bool,

    #[clap(flatten)]
    detector: DetectorParameters,

    #[clap(flatten)]
    gate: GateParameters,

    #[command(subcommand)]
    mode: Mode,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let _tracer = init_tracer!(TracerOptions::new(args.verbose));

    args.detector.validate()?;
    let gate = args.gate.gate()?;

    let trace = load_trace_file(&args.input)
        .with_context(|| format!("Failed to load trace from {}", args.input.display()))?;
    info!("{} datapoints loaded", trace.len());
    info!(
        "Full dataset of {:.2}s",
        trace.last_time().unwrap_or_default() / 1000.0
    );

    let extraction = processing::extract(trace, &args.detector)?;

    match &args.mode {
        Mode::Rewrite(parameters) => rewrite(&args, &extraction, parameters.margin),
        mode => {
            let strategy = mode
                .strategy()
                .context("Detection modes must name a peak strategy")?;
            run_detection(&args, &extraction, &strategy, &gate)
        }
    }
}

fn run_detection(
    args: &Cli,
    extraction: &Extraction,
    strategy: &PeakStrategy,
    gate: &Gate,
) -> Result<()> {
    let detection = processing::detect(extraction, strategy, gate)?;
    debug!(statistics = ?detection.statistics, "Peak location finished");
    let report = DetectionReport::new(extraction, strategy, &detection);

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write!(writer, "{report}")?;
            writer.flush()?;
            info!("Droplet information written to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            write!(stdout, "{report}")?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Nothing is written, and the target is not touched, unless there are events to keep.
fn rewrite(args: &Cli, extraction: &Extraction, margin: usize) -> Result<()> {
    let reduced = processing::reduce(extraction, margin)?;
    let target = report::rewrite_target(
        &args.input,
        args.output.as_deref(),
        args.overwrite,
        &mut std::io::stdin().lock(),
        &mut std::io::stdout(),
    )?;

    let file = File::create(&target)
        .with_context(|| format!("Failed to create {}", target.display()))?;
    let count = report::write_rewrite(&reduced, &mut BufWriter::new(file))?;
    info!("Trace rewritten with {count} samples to {}", target.display());
    Ok(())
}
