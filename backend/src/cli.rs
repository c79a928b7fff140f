use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[clap(name = "cartwatch", version)]
pub struct Cli {
    /// Run a single cycle and exit
    #[clap(long)]
    pub once: bool,

    /// Load environment from this file instead of `./.env`
    #[clap(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,
}
