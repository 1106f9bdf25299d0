//! sitemapgen — render sitemap documents from a content export.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use sitemap_cli::commands::{emit, load_manager, render, stats};
use sitemap_core::ContentKind;

#[derive(Parser)]
#[command(
    name = "sitemapgen",
    about = "Render sitemap XML documents from a content export",
    version
)]
struct Cli {
    /// Path to the JSON content export.
    #[arg(short, long)]
    content: Option<String>,

    /// Absolute site URL, e.g. https://example.com/.
    #[arg(long)]
    site_url: Option<String>,

    /// Path to a JSON sitemap config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the sitemap for one content kind (pages, posts, authors, tags).
    Render {
        kind: ContentKind,

        /// Write to a file instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Render the sitemap index linking every resource sitemap.
    Index {
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print per-kind entry counts and last-modified times as JSON.
    Stats,

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let load = || {
        load_manager(
            cli.content.as_deref(),
            cli.site_url.as_deref(),
            cli.config.as_deref(),
        )
    };

    match cli.command {
        Commands::Render { kind, out } => {
            let (_, mut manager) = load()?;
            let xml = render(&mut manager, kind)?;
            emit(&xml, out, &mut std::io::stdout())?;
        }

        Commands::Index { out } => {
            let (_, mut manager) = load()?;
            let xml = manager.index_xml()?;
            emit(&xml, out, &mut std::io::stdout())?;
        }

        Commands::Stats => {
            let (config, manager) = load()?;
            println!("{}", serde_json::to_string_pretty(&stats(&config, &manager))?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "sitemapgen", &mut std::io::stdout());
        }
    }

    Ok(())
}
