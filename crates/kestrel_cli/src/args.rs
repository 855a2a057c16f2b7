use clap::Parser;
use std::path::PathBuf;

/// kestrel — KestrelDB interactive record-store client
#[derive(Debug, Parser)]
#[command(
    name = "kestrel",
    about = "KestrelDB interactive record store client",
    version
)]
pub struct Args {
    /// Data directory holding db_meta.json and per-table data files
    #[arg(short = 'D', long, env = "KESTREL_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Execute a single command and exit
    #[arg(short = 'c', long)]
    pub command: Option<String>,

    /// Skip interactive confirmation prompts (drop_table, delete)
    #[arg(long)]
    pub yes: bool,

    /// Print select results as JSON instead of an aligned table
    #[arg(long)]
    pub json: bool,
}
