mod cli;
mod commands;
mod logger;

use cli::{Cli, Commands};
use commands::{create, estimate};

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    logger::init(cli.verbose);

    match &cli.command {
        Commands::Create(args) => create::run(&cli, args),
        Commands::Estimate(args) => estimate::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
