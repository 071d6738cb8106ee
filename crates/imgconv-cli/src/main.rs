// crates/imgconv-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use imgconv_core::config::Topology;
use imgconv_core::{Mode, Operation, RunConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "imgconv",
    about = "Distributed image convolution",
    long_about = "Apply a convolution kernel to a 24-bit BMP using one of four execution strategies, or compare them for correctness and speedup.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run a single execution strategy over one input image.
    Run {
        /// Execution strategy.
        #[arg(value_enum)]
        mode: Mode,

        /// Kernel to apply.
        #[arg(value_enum)]
        operation: Operation,

        /// Input BMP path.
        input: PathBuf,

        /// Output BMP path.
        output: PathBuf,

        /// Treat the run as shared-filesystem (only meaningful with mode=sft).
        #[arg(long)]
        shared_file_tree: bool,

        /// Row chunk size (only meaningful with mode=master-worker).
        #[arg(long, default_value_t = 64)]
        chunk_size: u32,

        /// Total number of ranks.
        #[arg(long, default_value_t = 1)]
        processes: u32,

        /// CPU cores available per node.
        #[arg(long, default_value_t = 1)]
        cores_per_node: u32,

        /// Number of physical nodes.
        #[arg(long, default_value_t = 1)]
        nodes: u32,

        /// Override the tracing env filter (defaults to `RUST_LOG`, falling back to `info`).
        #[arg(long)]
        log_filter: Option<String>,
    },

    /// Run the serial reference and a parallel strategy over the same input,
    /// assert the outputs are pixel-identical, and report the speedup.
    Compare {
        /// Execution strategy to compare against the serial reference.
        #[arg(value_enum)]
        mode: Mode,

        /// Kernel to apply.
        #[arg(value_enum)]
        operation: Operation,

        /// Input BMP path.
        input: PathBuf,

        /// Row chunk size (only meaningful with mode=master-worker); ignored
        /// if `--sweep-chunk-size` is given.
        #[arg(long, default_value_t = 64)]
        chunk_size: u32,

        /// Sweep chunk_size from 1 up to this value (inclusive), reporting a
        /// speedup ratio per value. Only meaningful with mode=master-worker.
        #[arg(long)]
        sweep_chunk_size: Option<u32>,

        /// Total number of ranks.
        #[arg(long, default_value_t = 4)]
        processes: u32,

        /// CPU cores available per node.
        #[arg(long, default_value_t = 4)]
        cores_per_node: u32,

        /// Number of physical nodes.
        #[arg(long, default_value_t = 1)]
        nodes: u32,

        /// On mismatch, write the serial and parallel outputs here with
        /// `.serial.bmp` / `.mismatch.bmp` suffixes instead of just failing.
        #[arg(long)]
        save_mismatch_prefix: Option<PathBuf>,

        /// Override the tracing env filter.
        #[arg(long)]
        log_filter: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Run {
            mode,
            operation,
            input,
            output,
            shared_file_tree,
            chunk_size,
            processes,
            cores_per_node,
            nodes,
            log_filter,
        } => {
            init_tracing(log_filter.as_deref());
            if shared_file_tree && mode != Mode::Sft {
                bail!("--shared-file-tree is only meaningful with mode=sft");
            }
            let config = RunConfig {
                mode,
                input,
                output: output.clone(),
                operation,
                chunk_size,
                topology: Topology { processes, cores_per_node, nodes },
            };
            run(&config)?;
            println!("Wrote {}", output.display());
            Ok(())
        }

        Cmd::Compare {
            mode,
            operation,
            input,
            chunk_size,
            sweep_chunk_size,
            processes,
            cores_per_node,
            nodes,
            save_mismatch_prefix,
            log_filter,
        } => {
            init_tracing(log_filter.as_deref());
            let topology = Topology { processes, cores_per_node, nodes };
            match sweep_chunk_size {
                Some(max) => {
                    if mode != Mode::MasterWorker {
                        bail!("--sweep-chunk-size is only meaningful with mode=master-worker");
                    }
                    for cs in 1..=max {
                        compare_once(operation, &input, mode, cs, topology, save_mismatch_prefix.as_deref())?;
                    }
                }
                None => {
                    compare_once(operation, &input, mode, chunk_size, topology, save_mismatch_prefix.as_deref())?;
                }
            }
            Ok(())
        }
    }
}

fn run(config: &RunConfig) -> Result<()> {
    let image = imgconv_engine::run(config)?;
    imgconv_bmp::save(&config.output, &image)
        .with_context(|| format!("writing output to {}", config.output.display()))
}

/// Run the serial reference and `mode` over the same input/operation, assert
/// pixel-identical outputs, and print a speedup summary.
fn compare_once(
    operation: Operation,
    input: &std::path::Path,
    mode: Mode,
    chunk_size: u32,
    topology: Topology,
    save_mismatch_prefix: Option<&std::path::Path>,
) -> Result<()> {
    let serial_config = RunConfig {
        mode: Mode::Serial,
        input: input.to_path_buf(),
        output: PathBuf::new(),
        operation,
        chunk_size: 0,
        topology: Topology { processes: 1, cores_per_node: 1, nodes: 1 },
    };
    let parallel_config = RunConfig {
        mode,
        input: input.to_path_buf(),
        output: PathBuf::new(),
        operation,
        chunk_size,
        topology,
    };

    info!(?mode, chunk_size, "comparing serial reference against parallel strategy");

    let t0 = Instant::now();
    let serial = imgconv_engine::run(&serial_config).context("serial reference run failed")?;
    let serial_elapsed = t0.elapsed();

    let t1 = Instant::now();
    let parallel = imgconv_engine::run(&parallel_config).context("parallel strategy run failed")?;
    let parallel_elapsed = t1.elapsed();

    if serial != parallel {
        if let Some(prefix) = save_mismatch_prefix {
            let serial_path = prefix.with_extension("serial.bmp");
            let mismatch_path = prefix.with_extension("mismatch.bmp");
            imgconv_bmp::save(&serial_path, &serial).context("saving serial output for inspection")?;
            imgconv_bmp::save(&mismatch_path, &parallel).context("saving mismatching output for inspection")?;
            bail!(
                "outputs differ for mode={mode:?} chunk_size={chunk_size}; saved {} and {}",
                serial_path.display(),
                mismatch_path.display()
            );
        }
        bail!("outputs differ for mode={mode:?} chunk_size={chunk_size}");
    }

    let speedup = serial_elapsed.as_secs_f64() / parallel_elapsed.as_secs_f64().max(f64::EPSILON);
    println!(
        "OK mode={mode:?} chunk_size={chunk_size}: serial={:?} parallel={:?} speedup={speedup:.2}x",
        serial_elapsed, parallel_elapsed
    );
    Ok(())
}

/// Initialize tracing with an env-driven filter (default INFO), or the
/// explicit override from `--log-filter` when given.
fn init_tracing(log_filter: Option<&str>) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match log_filter {
        Some(spec) => EnvFilter::new(spec),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry().with(filter).with(fmt_layer).try_init();
}
