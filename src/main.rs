use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use selfdrive::simulation::evolution::{SavedBrain, Trainer};
use selfdrive::simulation::network::MutationStrength;
use selfdrive::simulation::params::Params;
use tracing::{info, warn};

/// Evolve network-driven vehicles on a multi-lane road.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run generations and save the best network.
    Train {
        /// Number of generations to run.
        #[arg(long, default_value_t = 10)]
        generations: u32,
        /// Parameter file (JSON); defaults are used for missing fields.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Saved network to start from.
        #[arg(long)]
        brain: Option<PathBuf>,
        /// Where to write the best network.
        #[arg(long, default_value = "brain.json")]
        output: PathBuf,
        /// Override the population size.
        #[arg(long)]
        population: Option<usize>,
        /// Override the mutation strength, in [0, 1].
        #[arg(long)]
        mutation: Option<f64>,
        /// Override the random seed.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Mutate a saved network once.
    Mutate {
        /// Saved network to mutate.
        input: PathBuf,
        /// Where to write the result.
        output: PathBuf,
        /// Mutation strength, in [0, 1].
        #[arg(long)]
        strength: f64,
        /// Random seed.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Write the default parameters to a file.
    InitConfig {
        /// Destination file.
        #[arg(default_value = "params.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Train {
            generations,
            config,
            brain,
            output,
            population,
            mutation,
            seed,
        } => {
            let mut params = match config {
                Some(path) => Params::load_from_file(&path)
                    .with_context(|| format!("failed to load parameters from {}", path.display()))?,
                None => Params::default(),
            };
            if let Some(population) = population {
                params.population = population;
            }
            if let Some(mutation) = mutation {
                params.mutation_strength = MutationStrength::new(mutation)?;
            }
            if seed.is_some() {
                params.rng_seed = seed;
            }

            train(params, generations, brain, output)
        }
        Command::Mutate {
            input,
            output,
            strength,
            seed,
        } => {
            let saved = SavedBrain::load_from_file(&input)
                .with_context(|| format!("failed to load network from {}", input.display()))?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            let mutated = saved.mutated(&mut rng, strength)?;
            mutated.save_to_file(&output)?;
            info!(output = %output.display(), strength, "wrote mutated network");
            Ok(())
        }
        Command::InitConfig { output } => {
            Params::default().save_to_file(&output)?;
            info!(output = %output.display(), "wrote default parameters");
            Ok(())
        }
    }
}

fn train(
    params: Params,
    generations: u32,
    brain: Option<PathBuf>,
    output: PathBuf,
) -> Result<()> {
    info!(
        population = params.population,
        shape = ?params.network_shape(),
        generations,
        "starting training"
    );

    let mut trainer = Trainer::new(params);
    if let Some(path) = brain {
        let saved = SavedBrain::load_from_file(&path)
            .with_context(|| format!("failed to load network from {}", path.display()))?;
        info!(
            path = %path.display(),
            generation = saved.generation,
            progress = saved.progress,
            "seeding from saved network"
        );
        trainer = trainer.with_seed_network(saved.network);
    }

    for _ in 0..generations {
        trainer.run_generation()?;
    }

    match trainer.saved_brain() {
        Some(saved) => {
            saved.save_to_file(&output)?;
            info!(
                output = %output.display(),
                progress = saved.progress,
                "saved best network"
            );
        }
        None => warn!("no autonomous vehicles were simulated; nothing saved"),
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
