use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "kira-qpcr",
    version,
    about = "Relative qPCR expression (ddCq), knockdown and significance"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Run(RunArgs),
    Validate(ValidateArgs),
    Stats(StatsArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, short = 'i', help = "Results sheet exported as CSV/TSV (optionally .gz)")]
    pub input: PathBuf,

    #[arg(long, short = 'c', help = "YAML run configuration")]
    pub config: PathBuf,

    #[arg(long, short = 'o')]
    pub out: PathBuf,

    #[arg(long, default_value_t = 0, help = "Lines to skip before the header row")]
    pub skiplines: usize,

    #[arg(long, default_value = "qpcr", help = "Output file name prefix")]
    pub prefix: String,

    #[arg(long, default_value_t = false)]
    pub no_chart: bool,

    #[arg(long, default_value_t = false)]
    pub no_json: bool,

    #[arg(long, default_value_t = 0, help = "Number of threads (0 = auto)")]
    pub threads: usize,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    #[arg(long, short = 'c')]
    pub config: PathBuf,

    #[arg(long, default_value_t = 0)]
    pub skiplines: usize,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[arg(long, help = "Results table written by `run`")]
    pub table: PathBuf,

    #[arg(long, short = 'o')]
    pub out: PathBuf,

    #[arg(long, default_value = "qpcr")]
    pub prefix: String,

    #[arg(long, default_value_t = false, help = "Welch t-test instead of pooled variance")]
    pub welch: bool,

    #[arg(long, value_enum, default_value_t = BasisArg::Summary)]
    pub basis: BasisArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BasisArg {
    Summary,
    Sample,
}
