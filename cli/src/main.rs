use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use propdispatch_compiler::driver::{self, Target};
use propdispatch_compiler::{SchemaError, StringTables};

#[derive(Parser)]
#[command(name = "propgen")]
#[command(about = "Validate property schemas and generate Rust dispatch code", long_about = None)]
struct Cli {
    /// Constant corpus used to resolve symbolic codes (e.g. `schemas/constants.txt`)
    #[arg(long, global = true)]
    constants: Option<PathBuf>,

    /// Log compile steps
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the accessor trait, host adapter and constants of one class schema
    Accessors {
        /// Input class schema (`.json`)
        #[arg(short, long)]
        input: PathBuf,

        /// Output `.rs` file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate bridge trampolines from a bridge table
    Bridge {
        /// Input bridge table (`.json`)
        #[arg(short, long)]
        input: PathBuf,

        /// Output `.rs` file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate code-to-name lookup functions from a constant corpus
    Strings {
        /// Input corpus of enum declarations
        #[arg(short, long)]
        input: PathBuf,

        /// Output `.rs` file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate class schemas and the hierarchy they form together, without generating anything
    Check {
        /// Input class schemas (`.json`, one class or an array of classes)
        inputs: Vec<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn emit(target: Target, input: &Path, output: Option<&Path>, symbols: &StringTables) -> Result<(), SchemaError> {
    match output {
        Some(out_path) => {
            driver::run(target, input, out_path, symbols)?;
            println!("Generated {} written to {}", target.name(), out_path.display());
        }
        None => {
            let rust_code = driver::generate(target, input, symbols)?;
            println!("{}", rust_code);
        }
    }
    Ok(())
}

fn main() -> Result<(), SchemaError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let symbols = driver::load_symbols(cli.constants.as_deref())?;

    match &cli.command {
        Commands::Accessors { input, output } => emit(Target::Accessors, input, output.as_deref(), &symbols),
        Commands::Bridge { input, output } => emit(Target::Bridge, input, output.as_deref(), &symbols),
        Commands::Strings { input, output } => emit(Target::Strings, input, output.as_deref(), &symbols),

        Commands::Check { inputs } => {
            let count = driver::check(inputs, &symbols)?;
            println!("{} class(es) ok across {} file(s)", count, inputs.len());
            Ok(())
        }
    }
}
