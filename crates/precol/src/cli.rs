use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use precol_core::Config;

#[derive(Parser)]
#[command(
    name = "precol",
    about = "Extract plant species with precolombian uses from PDF documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process every PDF in the input directory and write the spreadsheet
    Run(RunArgs),
    /// Print the effective configuration as JSON
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ConfigArgs {
    /// JSON config file (defaults to the per-user config when present)
    #[arg(short = 'c', long = "config")]
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Directory holding the PDF corpus
    #[arg(short = 'i', long)]
    pub input: Option<PathBuf>,
    /// Directory for the spreadsheet and the log file
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
    /// Spreadsheet file name inside the output directory
    #[arg(long)]
    pub output_file: Option<String>,
    /// Model identifier
    #[arg(short = 'm', long)]
    pub model: Option<String>,
    /// Base URL of the model service
    #[arg(long)]
    pub endpoint: Option<String>,
    /// Chunk size in characters
    #[arg(long)]
    pub chunk_size: Option<usize>,
}

impl ConfigArgs {
    /// Defaults, then config file, then environment.
    pub fn load(&self) -> anyhow::Result<Config> {
        let mut config = Config::discover(self.path.as_deref())?;
        config.apply_env()?;
        Ok(config)
    }
}

impl RunArgs {
    /// Layered configuration with command line flags on top.
    pub fn load(&self) -> anyhow::Result<Config> {
        let mut config = self.config.load()?;

        if let Some(ref dir) = self.input {
            config.input_dir.clone_from(dir);
        }
        if let Some(ref dir) = self.output {
            config.output_dir.clone_from(dir);
        }
        if let Some(ref name) = self.output_file {
            config.output_file.clone_from(name);
        }
        if let Some(ref model) = self.model {
            config.model.model.clone_from(model);
        }
        if let Some(ref endpoint) = self.endpoint {
            config.model.endpoint.clone_from(endpoint);
        }
        if let Some(size) = self.chunk_size {
            config.chunk_size = size;
        }

        config.validate()?;
        Ok(config)
    }
}
