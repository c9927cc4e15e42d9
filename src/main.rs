use anyhow::{Context, Result};
use clap::Parser;
use homedir::my_home;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod display;
mod items;
mod ranking;
mod sources;
mod storage;

use config::Config;
use items::ItemCollection;
use ranking::Ranker;
use sources::{ItemSource, JsonFileSource};

fn get_base_path() -> Result<String> {
    if let Ok(base_path) = std::env::var("NEOZOT_BASE_PATH") {
        return Ok(base_path);
    }

    let home = my_home()
        .context("Could not determine home directory")?
        .context("Home directory path is empty")?;
    Ok(format!("{}/.local/share/neozot", home.to_string_lossy()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    let base_path = get_base_path()?;
    let config = Config::load_with(&base_path).context("failed to load config")?;

    match args.command {
        cli::Command::Rank {
            library,
            feeds,
            k,
            min_df,
            max_df,
            json,
        } => {
            let mut ranking_config = config.ranking.clone();
            if let Some(k) = k {
                ranking_config.top_k = k;
            }
            if let Some(min_df) = min_df {
                ranking_config.min_df = min_df;
            }
            if let Some(max_df) = max_df {
                ranking_config.max_df = max_df;
            }
            ranking_config.validate()?;

            let library = JsonFileSource::new(library).load()?;
            let feed_sources: Vec<JsonFileSource> =
                feeds.into_iter().map(JsonFileSource::new).collect();
            let feed_items = sources::load_all(&feed_sources)?;

            let report = Ranker::new(ranking_config)
                .rank(&library, feed_items)
                .context("ranking failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", display::format_report(&report, &library));
            }
            Ok(())
        }

        cli::Command::Show { file } => {
            let items: ItemCollection = JsonFileSource::new(file).load()?;
            println!("{}", display::format_items(&items));
            Ok(())
        }

        cli::Command::Config {} => {
            print!("{}", serde_yml::to_string(&config)?);
            Ok(())
        }
    }
}
