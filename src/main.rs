#![forbid(unsafe_code)]
//! Comment Craft Command Line Interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use commentcraft::commands::{
    execute_check, execute_export, execute_index, execute_remind, execute_scan, execute_search,
    execute_stats, execute_tags, execute_watch, CheckOptions, ExportOptions, IndexCommandOptions,
    RemindOptions, ScanOptions, SearchOptions, StatsOptions, TagsOptions, WatchOptions,
};
use commentcraft::lifecycle::DEFAULT_MAX_FILES;
use commentcraft::config::CONFIG_FILE;
use commentcraft::{Config, TagFilter};

#[derive(Parser)]
#[command(name = "commentcraft")]
#[command(about = "Find TODO/FIXME/BUG style tags in source comments")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Highlight tags in files with the comment-aware engine
    Scan {
        /// Files to scan
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Language identifier (default: from the file extension)
        #[arg(short, long)]
        language: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Index the workspace
    Index {
        /// Root directory to index
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Write the index as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Export tags as JSON, CSV or Markdown
    Export {
        /// Output file; its extension picks the format
        output: PathBuf,

        /// Root directory to index
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Format (json, csv, markdown)
        #[arg(short, long)]
        format: Option<String>,

        /// Read tags from a JSON export instead of scanning
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Search and filter indexed tags
    Search {
        /// Regex matched against the tag line (case-insensitive)
        query: Option<String>,

        /// Root directory to index
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Read tags from a JSON export instead of scanning
        #[arg(long)]
        from: Option<PathBuf>,

        /// Only these tags (can specify multiple)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Regex matched against the file path
        #[arg(long)]
        file: Option<String>,

        /// Regex matched against the full line
        #[arg(long)]
        regex: Option<String>,

        /// Only tags mentioning @NAME
        #[arg(long)]
        assignee: Option<String>,

        /// Start from a saved filter
        #[arg(long)]
        filter: Option<String>,

        /// Save the effective filter under this name
        #[arg(long)]
        save: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show tag statistics
    Stats {
        /// Root directory to index
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Read tags from a JSON export instead of scanning
        #[arg(long)]
        from: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Watch for changes and keep the index current
    Watch {
        /// Root directory to watch
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Rewrite this JSON export after every change
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report URGENT tags and dated TODOs past the reminder threshold
    Remind {
        /// Root directory to index
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Read tags from a JSON export instead of scanning
        #[arg(long)]
        from: Option<PathBuf>,

        /// Report even when reminders are disabled in config
        #[arg(long)]
        force: bool,

        /// Report again every reminder interval until interrupted
        #[arg(long)]
        repeat: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check comment hygiene: undocumented declarations, unowned TODOs, commented-out code
    Check {
        /// Files to check (default: the workspace under --root)
        files: Vec<PathBuf>,

        /// Root directory to walk when no files are given
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Maximum number of workspace files to check
        #[arg(long, default_value_t = DEFAULT_MAX_FILES)]
        max_files: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List configured tags
    Tags {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "commentcraft=debug" } else { "commentcraft=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load config
    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Scan { files, language, json } => {
            execute_scan(ScanOptions { files, language, json }, config)
        }
        Commands::Index { root, output, quiet } => {
            execute_index(IndexCommandOptions { root, output, quiet }, config)
        }
        Commands::Export {
            output,
            root,
            format,
            from,
        } => execute_export(
            ExportOptions {
                root,
                output,
                format,
                from,
            },
            config,
        ),
        Commands::Search {
            query,
            root,
            from,
            tags,
            file,
            regex,
            assignee,
            filter,
            save,
            json,
        } => execute_search(
            SearchOptions {
                root,
                from,
                query,
                filter: TagFilter {
                    tag_names: tags,
                    file_pattern: file,
                    regex,
                    assignee,
                },
                saved: filter,
                save_as: save,
                config_path: cli.config,
                json,
            },
            config,
        ),
        Commands::Stats { root, from, json } => execute_stats(StatsOptions { root, from, json }, config),
        Commands::Watch { root, output } => execute_watch(WatchOptions { root, output }, config),
        Commands::Remind {
            root,
            from,
            force,
            repeat,
            json,
        } => execute_remind(
            RemindOptions {
                root,
                from,
                force,
                repeat,
                json,
            },
            config,
        ),
        Commands::Check {
            files,
            root,
            max_files,
            json,
        } => execute_check(
            CheckOptions {
                files,
                root,
                max_files,
                json,
            },
            config,
        ),
        Commands::Tags { json } => execute_tags(TagsOptions { json }, config),
    };

    if let Err(e) = &result {
        eprintln!("{} {:#}", style("✗").red(), e);
        std::process::exit(1);
    }
    Ok(())
}
