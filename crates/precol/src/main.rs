mod cli;
mod logging;
mod run;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let config = args.load()?;
            run::prepare_dirs(&config)?;
            logging::init(Some(&config.log_path()))?;
            run::run(&config).await
        }
        Commands::Config(args) => {
            logging::init(None)?;
            run::show_config(&args.load()?)
        }
    }
}
