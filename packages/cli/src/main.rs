mod commands;

use clap::{Parser, Subcommand};
use commands::{check, json, tex, InputArgs};

/// Manuscript CLI - parse, compile and regenerate markup documents
#[derive(Parser, Debug)]
#[command(name = "manuscript")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and compile a document, reporting diagnostics
    Check(InputArgs),

    /// Regenerate markup from the compiled document tree
    Tex(InputArgs),

    /// Print the serialized document tree as JSON
    Json(InputArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Check(args) => check(&args),
        Command::Tex(args) => tex(&args),
        Command::Json(args) => json(&args),
    }
}
