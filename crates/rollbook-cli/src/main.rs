//! rollbook CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use rollbook_core::model::SortKey;
use rollbook_core::preferences::Theme;
use rollbook_core::transfer::ExportFormat;

mod commands;

use commands::{add::RecordArgs, update::UpdateArgs, Context, ListFormat, StatsFormat};

#[derive(Parser)]
#[command(name = "rollbook", version, about = "Local student record keeper")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides config and ROLLBOOK_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config file
    Init,

    /// Add a student record
    Add(RecordArgs),

    /// Update fields of an existing record
    Update {
        /// Internal ID or student ID
        id: String,

        #[command(flatten)]
        fields: UpdateArgs,
    },

    /// Delete one record
    Delete {
        /// Internal ID or student ID
        id: String,
    },

    /// Delete several records at once; unknown IDs are ignored
    Remove {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show every field of one record
    Show {
        /// Internal ID or student ID
        id: String,
    },

    /// List records, optionally searched and filtered
    List {
        /// Case-insensitive substring of name, email or student ID, or part of the phone number
        #[arg(long)]
        search: Option<String>,

        /// Exact course name
        #[arg(long)]
        course: Option<String>,

        /// Year of study
        #[arg(long)]
        year: Option<u8>,

        /// Reorder the stored collection before listing: name, gpa
        #[arg(long)]
        sort: Option<SortKey>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Output format: table, json
        #[arg(long, value_enum, default_value = "table")]
        format: ListFormat,
    },

    /// Reorder the stored collection
    Sort {
        /// name or gpa
        key: SortKey,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Print summary statistics and distributions
    Stats {
        /// Output format: text, json
        #[arg(long, value_enum, default_value = "text")]
        format: StatsFormat,
    },

    /// Export the collection to a dated file
    Export {
        /// json or csv
        #[arg(long)]
        format: ExportFormat,

        /// Output directory
        #[arg(long, default_value = ".")]
        output: PathBuf,
    },

    /// Replace the collection with the records in a JSON file
    Import { file: PathBuf },

    /// Show or set the dashboard theme
    Theme {
        /// light or dark
        #[arg(conflicts_with = "toggle")]
        theme: Option<Theme>,

        /// Switch to the other theme
        #[arg(long)]
        toggle: bool,
    },

    /// Write the HTML dashboard
    Report {
        /// Output file
        #[arg(long, default_value = "./rollbook-dashboard.html")]
        output: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rollbook=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let context = || Context::load(cli.config.as_deref(), cli.data_dir.as_deref());

    match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Add(args) => commands::add::execute(&context()?, args),
        Commands::Update { id, fields } => commands::update::execute(&context()?, &id, fields),
        Commands::Delete { id } => commands::delete::execute(&context()?, &id),
        Commands::Remove { ids } => commands::delete::execute_many(&context()?, &ids),
        Commands::Show { id } => commands::show::execute(&context()?, &id),
        Commands::List {
            search,
            course,
            year,
            sort,
            desc,
            format,
        } => commands::list::execute(&context()?, search, course, year, sort, desc, format),
        Commands::Sort { key, desc } => commands::list::sort(&context()?, key, desc),
        Commands::Stats { format } => commands::stats::execute(&context()?, format),
        Commands::Export { format, output } => {
            commands::transfer::export(&context()?, format, output)
        }
        Commands::Import { file } => commands::transfer::import(&context()?, file),
        Commands::Theme { theme, toggle } => commands::theme::execute(&context()?, theme, toggle),
        Commands::Report { output } => commands::report::execute(&context()?, output),
    }
}
