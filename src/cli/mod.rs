pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "weir")]
#[command(about = "A keyword-filtering RSS/Atom reader", long_about = None)]
pub struct Cli {
    /// Unlock Pro-tier limits (unlimited global allow keywords)
    #[arg(long, global = true)]
    pub pro: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Subscribe to a feed
    Add {
        /// URL of the feed to add
        url: String,
        /// Display name (defaults to the feed's own title)
        #[arg(long)]
        title: Option<String>,
    },
    /// Probe a site for its feed URL
    Detect {
        /// Base URL of the site
        url: String,
    },
    /// Unsubscribe from a feed
    Remove {
        /// URL of the feed to remove
        url: String,
    },
    /// Fetch all feeds and prune old articles
    Sync,
    /// List feeds or articles
    List {
        /// Show articles instead of feeds
        #[arg(long)]
        articles: bool,
        /// Include articles suppressed by filters
        #[arg(long)]
        all: bool,
    },
    /// Toggle an article's read state
    Read {
        /// Article id
        id: i64,
    },
    /// Toggle an article's star
    Star {
        /// Article id
        id: i64,
    },
    /// Delete a single article
    Delete {
        /// Article id
        id: i64,
    },
    /// Manage block rules
    Filter {
        #[command(subcommand)]
        action: FilterAction,
    },
    /// Manage the global allow-list
    Allow {
        #[command(subcommand)]
        action: AllowAction,
    },
    /// Delete old articles
    Prune {
        /// Age cutoff in days; omit to delete everything
        #[arg(long)]
        days: Option<u32>,
        /// Also delete starred articles
        #[arg(long)]
        include_starred: bool,
        /// Show what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
pub enum FilterAction {
    /// Add a block rule
    Add {
        /// Keyword that suppresses matching articles
        block_keyword: String,
        /// Comma-separated exception keywords for this rule
        #[arg(long)]
        allow: Option<String>,
        /// Fields the rule matches against
        #[arg(long, value_delimiter = ',', default_value = "title")]
        targets: Vec<FilterTarget>,
    },
    /// Remove a block rule
    Remove {
        /// Rule id
        id: i64,
    },
    /// List block rules
    List,
}

#[derive(Subcommand)]
pub enum AllowAction {
    /// Add a global allow keyword
    Add { keyword: String },
    /// Remove a global allow keyword
    Remove {
        /// Keyword id
        id: i64,
    },
    /// List global allow keywords
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterTarget {
    Title,
    Description,
}
