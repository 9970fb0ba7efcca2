use clap::{Args, Parser, Subcommand};
use colbuilder::core::models::crosslink::Terminal;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Colbuilder Development Team",
    version,
    about = "Colbuilder CLI - Builds collagen microfibril copy systems from a crystal unit and optimizes their cross-link geometry.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the copy system of a crystal unit and group its copies into connected components.
    Geometry(GeometryArgs),
    /// Refine the cross-link geometry of a structure until linked atoms are close enough.
    Optimize(OptimizeArgs),
}

/// Arguments for the `geometry` subcommand.
#[derive(Args, Debug)]
pub struct GeometryArgs {
    /// Path to the crystal unit (PDB with a CRYST1 record and cross-link marker residues).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to the contacts file holding the translation of every copy.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub contacts: PathBuf,

    /// Directory receiving the symmetrized contacts and the connect file.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the marker distance (Angstrom) below which two copies are connected.
    #[arg(long, value_name = "FLOAT")]
    pub cutoff: Option<f64>,

    /// Add the missing cells of the topmost layer before analysing connectivity.
    #[arg(long)]
    pub fill_top_layer: bool,

    /// Contacts file of the cut fibril; copies it does not list are dropped.
    #[arg(long, value_name = "PATH")]
    pub prune_with: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S connectivity.cutoff=2.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `optimize` subcommand.
#[derive(Args, Debug)]
pub struct OptimizeArgs {
    // --- Core Arguments ---
    /// Path to the structure whose cross-links are optimized.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the optimized structure.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path to the cross-link table (CSV).
    #[arg(short = 'x', long, required = true, value_name = "PATH")]
    pub crosslinks: PathBuf,

    /// Telopeptide end of the cross-links to optimize (N or C).
    #[arg(long, required = true, value_name = "N|C")]
    pub terminal: Terminal,

    /// Cross-link type as named in the table (e.g., 'D' or 'T').
    #[arg(long = "type", required = true, value_name = "TYPE")]
    pub link_type: String,

    /// Residue combination as named in the table (e.g., 'L4Y-L5Y').
    #[arg(long, required = true, value_name = "NAME")]
    pub combination: String,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Optimization Overrides ---
    /// Override the maximum number of optimization attempts.
    #[arg(long, value_name = "INT")]
    pub max_attempts: Option<usize>,

    /// Override the acceptance distance for divalent cross-links.
    #[arg(long, value_name = "FLOAT")]
    pub divalent_threshold: Option<f64>,

    /// Override the acceptance distance for trivalent cross-links.
    #[arg(long, value_name = "FLOAT")]
    pub trivalent_threshold: Option<f64>,

    /// Override the distance above which an exhausted run fails.
    #[arg(long, value_name = "FLOAT")]
    pub critical_threshold: Option<f64>,

    // --- Generator Overrides ---
    /// External program producing trial structures. When absent, residues are
    /// perturbed in-process.
    #[arg(long, value_name = "PATH")]
    pub generator_program: Option<PathBuf>,

    /// Argument passed to the external program. Can be used multiple times.
    #[arg(long = "generator-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub generator_args: Vec<String>,

    /// Working directory of the external program.
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Seed of the in-process perturbation generator.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Number of trial structures per attempt for the in-process generator.
    #[arg(long, value_name = "INT")]
    pub trials: Option<usize>,

    /// Largest residue displacement (Angstrom) of the in-process generator.
    #[arg(long, value_name = "FLOAT")]
    pub max_step: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S optimization.max-attempts=20
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
