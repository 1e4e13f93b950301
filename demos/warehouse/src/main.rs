//! Warehouse fleet demo.
//!
//! Runs the 12-node reference warehouse with either driver and prints a
//! summary.  Settings come from an optional TOML file, then CLI flags.
//!
//! Run with:
//!   cargo run -p warehouse --release -- --mode concurrent --robots 5
//!   cargo run -p warehouse -- --config fleet.toml --output out/
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use fleet_agent::Trace;
use fleet_core::{SimConfig, Tick};
use fleet_output::{CsvTraceWriter, TraceOutputObserver};
use fleet_sim::{CountingObserver, SimBuilder, SimObserver};
use fleet_tasks::TaskBroker;
use fleet_topology::warehouse_layout;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// One thread, fixed number of iterations.
    Serial,
    /// One tokio task per robot plus a feeder, until all work is delivered.
    Concurrent,
}

#[derive(Debug, Parser)]
#[command(name = "warehouse", about = "Simulate a robot fleet in a small warehouse")]
struct Args {
    /// TOML file with `SimConfig` fields.  Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Mode::Serial)]
    mode: Mode,

    #[arg(long)]
    robots: Option<usize>,

    #[arg(long)]
    iterations: Option<u64>,

    #[arg(long)]
    seed: Option<u64>,

    /// Write `traces.csv` and `ticks.csv` into this directory.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Serial mode: before each iteration, decay edge weights this many hops
    /// out from the first robot's location.
    #[arg(long)]
    congestion: Option<u32>,
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Counts traces and optionally mirrors them to CSV.
struct Report {
    counts: CountingObserver,
    output: Option<TraceOutputObserver<CsvTraceWriter>>,
}

impl Report {
    fn new(output: Option<&Path>) -> Result<Self> {
        let output = output
            .map(|dir| {
                CsvTraceWriter::new(dir)
                    .with_context(|| format!("opening output directory {}", dir.display()))
                    .map(TraceOutputObserver::new)
            })
            .transpose()?;
        Ok(Self { counts: CountingObserver::new(), output })
    }

    fn print(&mut self, finished: usize, elapsed: std::time::Duration) -> Result<()> {
        let c = &self.counts;
        println!();
        println!("  deliveries : {}", c.deliveries);
        println!("  pickups    : {}", c.pickups);
        println!("  moves      : {}", c.moves);
        println!("  idle steps : {}", c.idles);
        println!("  finished   : {finished}");
        if let Some(tick) = c.final_tick {
            println!("  last tick  : {tick}");
        }
        println!("  elapsed    : {:.2?}", elapsed);

        if let Some(out) = self.output.as_mut() {
            if let Some(e) = out.take_error() {
                return Err(e).context("writing trace output");
            }
            println!("  rows       : {}", out.written());
        }
        Ok(())
    }
}

impl SimObserver for Report {
    fn on_trace(&mut self, trace: &Trace) {
        self.counts.on_trace(trace);
        if let Some(out) = self.output.as_mut() {
            out.on_trace(trace);
        }
    }

    fn on_tick_end(&mut self, tick: Tick) {
        self.counts.on_tick_end(tick);
        if let Some(out) = self.output.as_mut() {
            out.on_tick_end(tick);
        }
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.counts.on_sim_end(final_tick);
        if let Some(out) = self.output.as_mut() {
            out.on_sim_end(final_tick);
        }
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init();
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => SimConfig::default(),
    };

    if let Some(n) = args.robots {
        config.robot_count = n;
    }
    if let Some(n) = args.iterations {
        config.iterations = n;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

// ── Drivers ───────────────────────────────────────────────────────────────────

fn run_serial(config: SimConfig, args: &Args) -> Result<()> {
    let iterations = config.iterations;
    let mut sim = SimBuilder::new(config.clone(), warehouse_layout())
        .seed_tasks(config.feed_cap, config.feed_probability)
        .build()?;
    info!(
        robots = sim.world().robots().len(),
        tasks = sim.world().broker().pending_count(),
        iterations,
        "serial run starting"
    );

    let mut report = Report::new(args.output.as_deref())?;
    let t0 = Instant::now();

    match args.congestion {
        None => sim.run(&mut report)?,
        Some(steps) => {
            for _ in 0..iterations {
                let world = sim.world();
                world.topology().reset_weights();
                if let Some(first) = world.robots().first() {
                    world.topology().decay_from(first.location, steps);
                }
                sim.run_ticks(1, &mut report)?;
            }
            sim.world().topology().reset_weights();
            report.on_sim_end(Tick(sim.iteration()));
        }
    }

    let finished = sim.world().broker().finished_count();
    report.print(finished, t0.elapsed())
}

fn run_concurrent(config: SimConfig, args: &Args) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    runtime.block_on(async {
        let sim = SimBuilder::new(config.clone(), warehouse_layout()).build_concurrent()?;
        info!(
            robots = sim.world().robots().len(),
            feed_cap = config.feed_cap,
            feed_probability = config.feed_probability,
            "concurrent run starting"
        );

        let t0 = Instant::now();
        let mut handle = sim.start(Report::new(args.output.as_deref())?);

        let interrupted = tokio::select! {
            result = handle.run_until_drained() => {
                result?;
                false
            }
            _ = tokio::signal::ctrl_c() => true,
        };
        if interrupted {
            warn!("interrupted, stopping robots");
            handle.stop().await?;
        }

        let finished = handle.broker().finished();
        info!(fed = handle.fed(), finished, "concurrent run finished");
        let mut report = handle
            .take_observer()
            .context("observer was not returned by the drain task")?;
        report.print(finished, t0.elapsed())
    })
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let config = load_config(&args)?;
    println!("warehouse fleet: {:?} mode, seed {}", args.mode, config.seed);

    match args.mode {
        Mode::Serial => run_serial(config, &args),
        Mode::Concurrent => run_concurrent(config, &args),
    }
}
