use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Rank feed items by similarity to the reference library
    Rank {
        /// Reference library (JSON mapping id -> item)
        #[clap(short, long)]
        library: PathBuf,

        /// Feed item files, merged in the given order
        #[clap(short, long = "feed", required = true, num_args = 1..)]
        feeds: Vec<PathBuf>,

        /// Number of pairs to report
        #[clap(short)]
        k: Option<NonZeroUsize>,

        /// Minimum number of library documents a term must appear in
        #[clap(long)]
        min_df: Option<usize>,

        /// Maximum fraction of library documents a term may appear in
        #[clap(long)]
        max_df: Option<f32>,

        /// Print the report as JSON
        #[clap(long, default_value = "false")]
        json: bool,
    },

    /// Display every item of a collection
    Show {
        /// Item collection (JSON mapping id -> item)
        file: PathBuf,
    },

    /// Print the effective configuration
    Config {},
}
