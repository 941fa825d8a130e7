use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    long_about = "Tabu search for the min-makespan drone-truck combined delivery problem",
    propagate_version = true,
    version
)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the algorithm
    Run {
        /// Path to the problem file, or "-" to read from stdin
        problem: String,

        /// Seed for the random number generator
        #[arg(long)]
        seed: Option<u64>,

        /// The directory to store results
        #[arg(long, default_value_t = String::from("outputs/"))]
        outputs: String,

        /// Disable CSV logging per iteration
        #[arg(long)]
        disable_logging: bool,
    },

    /// Re-evaluate an existing solution against a problem
    Evaluate {
        /// Path to the solution JSON file
        solution: String,

        /// Path to the problem file, or "-" to read from stdin
        problem: String,
    },
}
