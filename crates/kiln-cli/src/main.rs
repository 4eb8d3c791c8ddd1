//! Kiln CLI - Command-line interface for the Kiln asset resolver

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{query, seal};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "Layered asset resolution over loose directories and sealed packs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List assets visible through the configured sources
    List {
        #[command(flatten)]
        sources: query::SourceArgs,

        /// Filter by asset type (texture, audio, font, config, binary)
        #[arg(long)]
        r#type: Option<String>,
    },

    /// Show an asset's metadata record
    Info {
        #[command(flatten)]
        sources: query::SourceArgs,

        /// Asset name
        name: String,

        /// Asset type (texture, audio, font, config, binary)
        #[arg(long, default_value = "binary")]
        r#type: String,
    },

    /// Write an asset's bytes to a file or stdout
    Cat {
        #[command(flatten)]
        sources: query::SourceArgs,

        /// Asset name
        name: String,

        /// Asset type (texture, audio, font, config, binary)
        #[arg(long, default_value = "binary")]
        r#type: String,

        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Seal a directory of loose assets into a pack archive
    Pack {
        /// Directory to scan
        input: PathBuf,

        /// Pack file to write
        output: PathBuf,

        /// Scramble the pack with this key
        #[arg(long)]
        key: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::List { sources, r#type } => query::list(&sources, r#type.as_deref()),
        Commands::Info {
            sources,
            name,
            r#type,
        } => query::info(&sources, &name, &r#type),
        Commands::Cat {
            sources,
            name,
            r#type,
            output,
        } => query::cat(&sources, &name, &r#type, output.as_deref()),
        Commands::Pack { input, output, key } => seal::pack(&input, &output, key.as_deref()),
    }
}
