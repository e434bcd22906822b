use clap::{Parser, Subcommand, ValueEnum};
use tasklist_core::error::AppError;
use tasklist_core::model::Filter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: tasklist add "Buy milk"
    Add {
        text: Option<String>,
    },
    /// Flip a task between active and completed
    ///
    /// Example: tasklist toggle 1734652800000
    Toggle {
        id: String,
    },
    /// Delete a task
    ///
    /// Example: tasklist delete 1734652800000
    Delete {
        id: String,
    },
    /// Edit a task's text
    ///
    /// Example: tasklist edit 1734652800000 "Buy organic milk"
    ///
    /// In interactive mode, omit the new text to edit in place.
    Edit {
        id: String,
        new_text: Option<String>,
    },
    /// Remove all completed tasks
    ///
    /// Example: tasklist clear
    Clear,
    /// List tasks under the active filter
    ///
    /// Example: tasklist list --filter active
    List {
        #[arg(long, value_enum)]
        filter: Option<FilterArg>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterArg {
    All,
    Active,
    Completed,
}

impl From<FilterArg> for Filter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => Filter::All,
            FilterArg::Active => Filter::Active,
            FilterArg::Completed => Filter::Completed,
        }
    }
}

/// Parse a task id argument. Ids are the numeric values the store
/// assigns; anything else is user error at this boundary.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }

    trimmed
        .parse::<i64>()
        .map_err(|_| AppError::invalid_input("id must be a number"))
}
