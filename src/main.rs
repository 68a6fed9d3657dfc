mod cli;
mod config;
mod feed;
mod models;
mod progress;
mod utils;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::Parser;
use log::debug;
use std::path::Path;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use feed::{HabitQuery, read_habits};
use models::Habit;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    // One clock read per invocation so every number agrees on what "today" is.
    let today = Local::now().date_naive();
    debug!("Reference day {}", today);

    match cli.command.unwrap_or(Commands::Overview) {
        Commands::Config { write } => {
            handlers::handle_config(&config, write)?;
        }
        Commands::Overview => {
            let habits = load_feed(cli.file.as_deref(), &config)?;
            handlers::handle_overview(&habits, &config, today)?;
        }
        Commands::Show { id } => {
            let habits = load_feed(cli.file.as_deref(), &config)?;
            handlers::handle_show(&habits, &config, today, &id)?;
        }
        Commands::Chart { id, days } => {
            let habits = load_feed(cli.file.as_deref(), &config)?;
            handlers::handle_chart(&habits, &config, today, &id, days)?;
        }
        Commands::List {
            search,
            categories,
            public,
            sort,
            page,
            per_page,
        } => {
            let habits = load_feed(cli.file.as_deref(), &config)?;
            let query = HabitQuery {
                search,
                categories,
                public_only: public,
                sort,
                page,
                per_page,
            };
            handlers::handle_list(&habits, &query)?;
        }
        Commands::Export => {
            let habits = load_feed(cli.file.as_deref(), &config)?;
            handlers::handle_export(&habits, &config, today)?;
        }
    }

    Ok(())
}

fn load_feed(cli_file: Option<&Path>, config: &AppConfig) -> Result<Vec<Habit>> {
    let Some(path) = config.resolve_feed(cli_file) else {
        bail!(
            "No habits feed given. Pass --file <PATH> (or `-` for stdin), or set [feed].path in {:?}",
            AppConfig::config_path()?
        );
    };
    read_habits(&path)
}
