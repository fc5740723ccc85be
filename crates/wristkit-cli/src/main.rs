//! wristkit CLI - Build tool for wearable apps
//!
//! Commands:
//! - `wristkit build` - Build a project into an `.fba` package
//! - `wristkit check` - Validate a project without building it
//! - `wristkit inspect` - Describe a built package

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use wristkit_core::LogLevel;

mod build;
mod check;
mod inspect;
mod project;

#[derive(Parser)]
#[command(name = "wristkit")]
#[command(author, version, about = "Build tool for wristkit apps", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable colored diagnostics
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the project into an .fba package
    Build(BuildArgs),

    /// Validate the project configuration and entry points
    Check {
        /// Path to the project (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// TOML file overriding or adding build targets
        #[arg(long)]
        targets_file: Option<PathBuf>,
    },

    /// Describe a built package
    Inspect {
        /// Path to the .fba file
        package: PathBuf,

        /// Also list the files inside every component
        #[arg(short, long)]
        files: bool,
    },
}

#[derive(Args)]
pub struct BuildArgs {
    /// Path to the project (default: current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Output directory for app.fba (default: <project>/build)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Compiler program invoked for each component
    #[arg(short, long, default_value = "wristkit-compile")]
    pub compiler: PathBuf,

    /// Extra argument passed to the compiler before the generated ones
    #[arg(long = "compiler-arg", allow_hyphen_values = true)]
    pub compiler_args: Vec<String>,

    /// TOML file overriding or adding build targets
    #[arg(long)]
    pub targets_file: Option<PathBuf>,

    /// Worker threads (default: single-threaded)
    #[arg(long)]
    pub jobs: Option<usize>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    wristkit_logging::init_logging(LogLevel::from_verbosity(cli.verbose));
    let colors = !cli.no_color;

    match cli.command {
        Commands::Build(args) => build::run(args, colors),
        Commands::Check { path, targets_file } => {
            check::run(path, targets_file, colors)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Inspect { package, files } => {
            inspect::run(&package, files)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
