mod commands;
mod context;
mod examples;
mod help;
mod output;
mod theme;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    init::{handle_init, InitArgs},
    migrate::{handle_migrate_commands, MigrateCommands},
    schema::{handle_schema_commands, SchemaCommands},
};
use output::{GlobalOptions, OutputFormat, OutputManager};
use weaviate_migrate::MigrateError;

#[derive(Parser, Debug)]
#[command(name = "weaviate-migrate")]
#[command(version)]
#[command(
    about = "Schema migrations for Weaviate class stores",
    long_about = r#"Schema migrations for Weaviate class stores:

• Diff a declared target schema against the live store
• Record each difference as a numbered migration file
• Replay migrations in order, creating missing classes and properties

Commands:
  init      Write weaviate-migrate.toml and create the migration folder
  migrate   Create, deploy and list migrations
  schema    Show the live schema and pending changes
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write weaviate-migrate.toml and create the migration folder
    Init(InitArgs),

    /// Create, deploy and list migrations
    #[command(subcommand)]
    Migrate(MigrateCommands),

    /// Show the live schema and pending changes
    #[command(subcommand)]
    Schema(SchemaCommands),
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = help::parse();
    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let global_options = GlobalOptions {
        output_format: cli.output.clone(),
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    };
    let output = OutputManager::new(global_options);

    match execute(cli.command, &output) {
        Ok(()) => {}
        Err(err) => {
            output.error(&format!("{err:#}"));
            std::process::exit(exit_code_for(&err));
        }
    }
}

/// Exit code for the first migration error in the chain, 1 otherwise.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<MigrateError>())
        .map_or(1, MigrateError::exit_code)
}

fn execute(command: Commands, output: &OutputManager) -> Result<()> {
    match command {
        Commands::Init(args) => handle_init(args, output),
        Commands::Migrate(migrate_cmd) => handle_migrate_commands(migrate_cmd, output),
        Commands::Schema(schema_cmd) => handle_schema_commands(schema_cmd, output),
    }
}
