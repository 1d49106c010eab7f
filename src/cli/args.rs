use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "streamer")]
#[command(about = "Stream items through a producer thread and a worker pool")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream the integers 0..COUNT and print each one
    Range {
        /// Number of integers to stream
        #[arg(short, long)]
        count: u64,

        /// Number of worker threads (defaults to the CPU count)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Capacity of each bounded queue
        #[arg(short, long, default_value = "128")]
        depth: usize,

        /// Print a JSON summary after the last item
        #[arg(short, long)]
        summary: bool,
    },

    /// Walk a directory and print a digest line per file
    Digest {
        /// Directory to walk
        directory: PathBuf,

        /// Number of worker threads (defaults to the CPU count)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Capacity of each bounded queue
        #[arg(short, long, default_value = "128")]
        depth: usize,

        /// Write JSON lines to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
