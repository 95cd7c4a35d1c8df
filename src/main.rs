use anyhow::Context;
use clap::Parser;
use log::info;
use qmc_local_energy::{read_config, DriftDiffusionVmc};

/// Drift-diffusion VMC for the harmonic oscillator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(short, long, default_value = "config.yml")]
    config: String,

    /// Override the number of walkers
    #[arg(short, long)]
    walkers: Option<usize>,

    /// Override the number of steps
    #[arg(short, long)]
    steps: Option<usize>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = read_config(&args.config)
        .with_context(|| format!("loading {}", args.config))?;
    if let Some(walkers) = args.walkers {
        config.walkers = walkers;
    }
    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    info!("configuration: {:?}", config);

    let kernel = config.build_kernel().context("building harmonic kernel")?;
    let mut simulation = DriftDiffusionVmc::new(kernel, config.vmc_params(), config.seed)
        .context("setting up VMC")?;
    let results = simulation.run().context("running VMC")?;

    // exact ground state for comparison
    let exact = 0.5 * config.dimensions as f64 * config.omega;

    println!("Drift-Diffusion VMC Results for Harmonic Oscillator");
    println!("---------------------------------------------------");
    println!("Number of walkers: {}", config.walkers);
    println!("Number of steps: {}", config.steps);
    println!("Dimensions: {}", config.dimensions);
    println!("Final energy: {:.6} ± {:.6} Ha", results.energy, results.error);
    println!("Exact ground state: {:.6} Ha", exact);
    println!("Acceptance ratio: {:.4}", results.acceptance_ratio);
    println!("Autocorrelation time: {:.2} steps", results.autocorrelation_time);

    Ok(())
}
