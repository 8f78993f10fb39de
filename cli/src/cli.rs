use std::path::PathBuf;

/// Field-visit area planning CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "rodeplan", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Partition demand points into balanced areas (forbids stdout)
    Create(CreateArgs),

    /// Print the estimated number of areas for a points file
    Estimate(EstimateArgs),
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Input points CSV with columns id,x,y[,weight]
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub points: PathBuf,

    /// Output directory for points.csv and areas.geojson
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: PathBuf,

    /// Number of areas to create (0 = estimate from the points)
    #[arg(short, long)]
    pub areas: Option<usize>,

    /// Points per area used by the estimate
    #[arg(short, long)]
    pub factor: Option<f64>,

    /// Maximum points per area in the initial partition (0 = unconstrained)
    #[arg(short, long)]
    pub max_units: Option<usize>,

    /// TOML configuration file; flags override its values
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Seed for the built-in allocator
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

#[derive(clap::Args, Debug)]
pub struct EstimateArgs {
    /// Input points CSV with columns id,x,y[,weight]
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub points: PathBuf,

    /// Points per area used by the estimate
    #[arg(short, long)]
    pub factor: Option<f64>,

    /// TOML configuration file
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}
