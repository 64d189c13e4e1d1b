use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use memfit_model::{
    PolicyKind, ProcessSpec, SimConfig,
    loader::load_processes,
    sim::{WorkloadParams, bernoulli_processes},
    trace::{open_trace, run_traced},
};
use tracing::{Level, info};

/// Contiguous memory allocation simulator
#[derive(Parser, Debug)]
#[command(name = "memfit")]
#[command(about = "Simulate first-fit and best-fit placement of processes in contiguous memory")]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate the processes listed in a file
    Run(RunArgs),
    /// Simulate a seeded random workload
    Synth(SynthArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Process file: `name arrival memory duration` per line
    input: PathBuf,

    /// Per-tick memory map output
    output: PathBuf,

    #[command(flatten)]
    memory: MemoryArgs,
}

#[derive(Args, Debug)]
struct SynthArgs {
    /// Per-tick memory map output
    #[arg(long)]
    output: Option<PathBuf>,

    /// Ticks during which processes may arrive
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Arrival probability per tick
    #[arg(long, default_value_t = 0.4)]
    p_arrival: f64,

    /// Probability that an arrival is short-lived
    #[arg(long, default_value_t = 0.3)]
    p_short: f64,

    #[arg(long, default_value_t = 8)]
    min_size: u64,

    #[arg(long, default_value_t = 256)]
    max_size: u64,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[command(flatten)]
    memory: MemoryArgs,
}

#[derive(Args, Debug)]
struct MemoryArgs {
    /// Total memory size
    #[arg(allow_negative_numbers = true)]
    total_memory: i64,

    /// Use the first-fit algorithm
    #[arg(short = 'f', long = "first-fit", conflicts_with = "best_fit")]
    first_fit: bool,

    /// Use the best-fit algorithm
    #[arg(short = 'b', long = "best-fit")]
    best_fit: bool,

    /// Run both algorithms on the same input
    #[arg(long, conflicts_with_all = ["first_fit", "best_fit"])]
    compare: bool,
}

impl MemoryArgs {
    fn configs(&self) -> Result<Vec<SimConfig>> {
        let policies = if self.compare {
            PolicyKind::ALL.to_vec()
        } else if self.best_fit {
            vec![PolicyKind::BestFit]
        } else if self.first_fit {
            vec![PolicyKind::FirstFit]
        } else {
            bail!("select an algorithm with -f (first fit), -b (best fit) or --compare");
        };

        policies
            .into_iter()
            .map(|policy| {
                SimConfig::with_policy(self.total_memory, policy).map_err(anyhow::Error::from)
            })
            .collect()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run(args) => {
            let configs = args.memory.configs()?;
            let processes = load_processes(&args.input)?;
            println!("Selected input file: {}", args.input.display());
            println!("Selected dump file: {}", args.output.display());
            simulate_all(&configs, &processes, Some(args.output.as_path()))
        }
        Command::Synth(args) => {
            let configs = args.memory.configs()?;
            let params = WorkloadParams {
                ticks: args.ticks,
                p_arrival: args.p_arrival,
                p_short: args.p_short,
                min_size: args.min_size,
                max_size: args.max_size,
                seed: args.seed,
                ..WorkloadParams::default()
            };
            if params.min_size == 0 || params.min_size > params.max_size {
                bail!("invalid size range {}..={}", params.min_size, params.max_size);
            }
            let processes = bernoulli_processes(&params);
            println!(
                "Generated {} processes over {} ticks (seed {})",
                processes.len(),
                params.ticks,
                params.seed
            );
            simulate_all(&configs, &processes, args.output.as_deref())
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn simulate_all(
    configs: &[SimConfig],
    processes: &[ProcessSpec],
    output: Option<&Path>,
) -> Result<()> {
    let compare = configs.len() > 1;

    for config in configs {
        println!("Maximum processor capacity: {}", config.total_memory);
        println!("=========================================================");
        println!("You have selected the {} algorithm", config.policy.name().to_lowercase());

        let trace_path = output.map(|path| match compare {
            true => trace_path_for(path, config.policy),
            false => path.to_path_buf(),
        });
        simulate(config, processes.to_vec(), trace_path.as_deref())?;
    }

    Ok(())
}

fn simulate(
    config: &SimConfig,
    processes: Vec<ProcessSpec>,
    trace_path: Option<&Path>,
) -> Result<()> {
    info!(
        policy = %config.policy,
        total_memory = config.total_memory,
        processes = processes.len(),
        "starting"
    );
    let writer = trace_path.and_then(open_trace);
    let run = run_traced(config.policy, processes, config.total_memory, writer, |_| {});
    info!(
        policy = %config.policy,
        ticks = run.summary.simulation_time,
        completed = run.summary.processes_completed,
        "finished"
    );

    println!();
    println!("{}", run.summary);
    println!();
    println!("Algorithm finished");

    // Metrics are already out; a broken trace still fails the command
    if let Some(trace) = run.trace {
        trace.context("failed writing trace")?;
        info!(lines = run.lines, "trace written");
    }
    Ok(())
}

// out.txt -> out.first-fit.txt
fn trace_path_for(path: &Path, policy: PolicyKind) -> PathBuf {
    let slug = match policy {
        PolicyKind::FirstFit => "first-fit",
        PolicyKind::BestFit => "best-fit",
    };
    match path.extension() {
        Some(ext) => path.with_extension(format!("{slug}.{}", ext.to_string_lossy())),
        None => path.with_extension(slug),
    }
}
