use clap::{Parser, Subcommand, ValueEnum};
use spellbook_core::query::SortMode;

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
    /// Example: spellbook add "Practice Lumos"
    Add {
        text: Option<String>,
    },
    /// Toggle a task between pending and completed
    ///
    /// Example: spellbook toggle 3
    Toggle {
        id: u64,
    },
    /// Delete a task
    ///
    /// Example: spellbook delete 3
    Delete {
        id: u64,
    },
    /// Mark every task as completed
    ///
    /// Example: spellbook mark-all
    MarkAll,
    /// Remove every completed task
    ///
    /// Example: spellbook remove-completed
    RemoveCompleted,
    /// Remove every task (asks for confirmation unless --yes is given)
    ///
    /// Example: spellbook clear --yes
    Clear {
        #[arg(long)]
        yes: bool,
    },
    /// List tasks with optional search and sort
    ///
    /// Example: spellbook list
    /// Example: spellbook list --sort status --search lum
    List {
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show the task counts
    ///
    /// Example: spellbook stats
    Stats,
    /// Import sample tasks from the demo API
    ///
    /// Example: spellbook import
    /// Example: spellbook import --url http://localhost:8080/todos
    Import {
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Date,
    Status,
}

impl From<SortArg> for SortMode {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Date => SortMode::Date,
            SortArg::Status => SortMode::Status,
        }
    }
}
