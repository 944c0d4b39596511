//! unitrack CLI - university application tracking store
//!
//! Entry point for the `unitrack` command-line tool:
//! - Schema export and migrations (SQLite and PostgreSQL)
//! - University catalog management and Hipo Labs imports
//! - Profiles for students, parents and teachers
//! - Parent/student and teacher/student links
//!
//! Every data command prints JSON on stdout; logs and progress go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use unitrack_core::UnitrackConfig;
use unitrack_db::pool::redact;

mod commands;
mod config;
mod tracing_setup;
mod ui;

use commands::AppContext;

#[derive(Parser, Debug)]
#[command(
    name = "unitrack",
    author,
    version,
    about = "Store and query university application data",
    long_about = "Manage the university catalog, role-typed profiles (student, parent, teacher) \
                  and the links between them. Backed by SQLite, with PostgreSQL DDL for deployment."
)]
struct Cli {
    /// Database URL (overrides config file and DATABASE_URL)
    #[arg(long, global = true, env = "UNITRACK_DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress progress spinners and bars
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending migrations to the configured database
    Migrate,
    /// Print the schema DDL
    Schema(commands::schema::SchemaArgs),
    /// University catalog (add, find, search, list, import)
    University(commands::university::UniversityArgs),
    /// Profiles and their roles
    Profile(commands::profile::ProfileArgs),
    /// Student academic records
    Student(commands::student::StudentArgs),
    /// Teacher details
    Teacher(commands::teacher::TeacherArgs),
    /// Parent and teacher links to students
    Link(commands::link::LinkArgs),
    /// Manage unitrack configuration (init, show, path)
    Config(config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    ui::init_quiet_mode(cli.quiet);

    // Commands that never touch the database
    let command = match cli.command {
        Commands::Schema(args) => return commands::run_schema(args),
        Commands::Config(args) => return config::run_config(args),
        Commands::Completions(args) => return run_completions(args),
        command => command,
    };

    let ctx = load_context(cli.database_url, cli.debug)?;

    match command {
        Commands::Migrate => commands::run_migrate(&ctx).await?,
        Commands::University(args) => commands::run_university(&ctx, args).await?,
        Commands::Profile(args) => commands::run_profile(&ctx, args).await?,
        Commands::Student(args) => commands::run_student(&ctx, args).await?,
        Commands::Teacher(args) => commands::run_teacher(&ctx, args).await?,
        Commands::Link(args) => commands::run_link(&ctx, args).await?,
        Commands::Schema(_) | Commands::Config(_) | Commands::Completions(_) => {}
    }
    Ok(())
}

fn load_context(database_url: Option<String>, debug: bool) -> Result<AppContext> {
    let mut config = UnitrackConfig::load().context("Failed to load config")?;
    if let Some(url) = database_url {
        config.database.url = url;
    }

    tracing_setup::init(&tracing_setup::TracingConfig {
        debug,
        level: config.logging.level.clone(),
    })
    .ok();
    debug!(url = %redact(&config.database.url), "resolved database");

    Ok(AppContext { config })
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
