//! CLI frontend for the Cosmic Excavator simulation.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cx",
    about = "Cosmic Excavator: an idle drilling and trading game in the terminal",
    version,
    propagate_version = true
)]
struct Cli {
    /// Debug logging, and the full event log for `simulate`
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a fresh save file
    New {
        /// Save file to create
        file: PathBuf,

        /// RNG seed stored in the save
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },

    /// Run the tick loop and print what happened
    Simulate {
        /// Continue from this save instead of a fresh game
        #[arg(long)]
        save: Option<PathBuf>,

        /// Number of ticks to run (10 ticks = 1 second)
        #[arg(short, long, default_value = "600")]
        ticks: u64,

        /// RNG seed for a fresh game (saves keep their own)
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Start the drill before running
        #[arg(long)]
        drill: bool,

        /// Resolve events and minigames automatically
        #[arg(long)]
        auto: bool,

        /// Write the resulting game to this save file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show the state stored in a save file
    Status {
        /// Save file
        file: PathBuf,
    },

    /// Apply one player command to a save file
    Act {
        /// Save file, updated in place
        file: PathBuf,

        /// The command, e.g. `drill start` or `buy iron 50`
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// List regions with zone colours and travel times
    Regions {
        /// Player level used for zone colours
        #[arg(short, long, default_value = "1")]
        level: u32,

        /// Region travel times are measured from
        #[arg(short, long, default_value = "rust_valley")]
        from: String,
    },

    /// Show market prices in a region
    Market {
        /// Region id
        #[arg(short, long, default_value = "rust_valley")]
        region: String,
    },

    /// Show caravan tiers, or loss chances for a route
    Caravans {
        /// Route start region
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Route end region
        #[arg(long, requires = "from")]
        to: Option<String>,
    },

    /// List the random event catalog
    Events {
        /// Only events reachable at this depth
        #[arg(short, long)]
        depth: Option<f64>,
    },

    /// Show active and available quests in a save file
    Quests {
        /// Save file
        file: PathBuf,
    },

    /// Print a save file as a Base64 string
    Export {
        /// Save file
        file: PathBuf,
    },

    /// Check a Base64 save string and write it to a file
    Import {
        /// Base64 save string
        blob: String,

        /// Save file to write
        #[arg(short, long)]
        out: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("CX_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::New { file, seed } => commands::new::run(&file, seed),
        Commands::Simulate {
            save,
            ticks,
            seed,
            drill,
            auto,
            out,
        } => commands::simulate::run(commands::simulate::Options {
            save,
            ticks,
            seed,
            drill,
            auto,
            verbose: cli.verbose,
            out,
        }),
        Commands::Status { file } => commands::status::run(&file),
        Commands::Act { file, command } => commands::act::run(&file, &command.join(" ")),
        Commands::Regions { level, from } => commands::regions::run(level, &from),
        Commands::Market { region } => commands::market::run(&region),
        Commands::Caravans { from, to } => commands::caravans::run(from.as_deref(), to.as_deref()),
        Commands::Events { depth } => commands::events::run(depth),
        Commands::Quests { file } => commands::quests::run(&file),
        Commands::Export { file } => commands::export::run(&file),
        Commands::Import { blob, out } => commands::import::run(&blob, &out),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
