use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::feed::SortOrder;

#[derive(Parser, Debug)]
#[command(name = "habitline", version, author, about = "Terminal progress dashboards for your daily habits")]
pub struct Cli {
    /// Habits feed exported from the API (`-` reads stdin)
    #[arg(long, short, global = true)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Totals, category breakdown, weekly trend and top streaks
    Overview,
    /// Progress for a single habit
    Show {
        /// Habit id
        id: String,
    },
    /// Day-by-day completion chart for a habit
    Chart {
        /// Habit id
        id: String,
        /// Number of days to show, ending today
        #[arg(long)]
        days: Option<u32>,
    },
    /// Search, filter and page through habits
    List {
        /// Match against title and description
        #[arg(long)]
        search: Option<String>,
        /// Only these categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Only public habits
        #[arg(long)]
        public: bool,
        #[arg(long, value_enum, default_value_t = SortOrder::Newest)]
        sort: SortOrder,
        #[arg(long, default_value = "1")]
        page: usize,
        #[arg(long, default_value = "10")]
        per_page: usize,
    },
    /// Print every habit's progress as JSON to stdout
    Export,
    /// Show the resolved configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        write: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_flags_parse() {
        let cli = Cli::parse_from([
            "habitline",
            "list",
            "--category",
            "Work",
            "--category",
            "Study",
            "--sort",
            "streak",
            "--per-page",
            "5",
            "--file",
            "habits.json",
        ]);
        assert_eq!(cli.file, Some(PathBuf::from("habits.json")));
        match cli.command {
            Some(Commands::List {
                categories,
                sort,
                per_page,
                page,
                ..
            }) => {
                assert_eq!(categories, vec!["Work", "Study"]);
                assert_eq!(sort, SortOrder::Streak);
                assert_eq!(per_page, 5);
                assert_eq!(page, 1);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
