//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(author = "Yukang Chen")]
#[command(version = "0.1.0")]
#[command(about = "Query and serve a directory of markdown blog posts", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every post, newest first
    #[command(alias = "ls")]
    List,

    /// Show one post's metadata, or its rendered HTML
    Show {
        /// Slug of the post
        slug: String,

        /// Print the rendered HTML body
        #[arg(long)]
        html: bool,
    },

    /// Search posts by title, excerpt, tags and body
    Search {
        /// Text to look for; empty matches everything
        #[arg(default_value = "")]
        query: String,

        /// Only posts carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// List the newest posts
    Recent {
        /// How many posts to show
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },

    /// Show trending tags among recent posts
    Tags {
        /// How many recent posts to sample
        #[arg(short, long, allow_negative_numbers = true)]
        window: Option<i64>,

        /// List every tag instead
        #[arg(short, long)]
        all: bool,
    },

    /// Write the post catalog as JSON
    Export {
        /// Output file (defaults to posts-data.json in the base directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the JSON query server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to
        #[arg(short, long)]
        ip: Option<String>,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::List => {
            let blog = folio::Blog::new(&base_dir)?;
            folio::commands::list::run(&blog)?;
        }

        Commands::Show { slug, html } => {
            let blog = folio::Blog::new(&base_dir)?;
            folio::commands::show::run(&blog, &slug, html)?;
        }

        Commands::Search { query, tag } => {
            let blog = folio::Blog::new(&base_dir)?;
            folio::commands::search::run(&blog, &query, tag.as_deref())?;
        }

        Commands::Recent { limit } => {
            let blog = folio::Blog::new(&base_dir)?;
            folio::commands::list::recent(&blog, limit)?;
        }

        Commands::Tags { window, all } => {
            let blog = folio::Blog::new(&base_dir)?;
            folio::commands::tags::run(&blog, window, all)?;
        }

        Commands::Export { output } => {
            let blog = folio::Blog::new(&base_dir)?;
            tracing::info!("Exporting post catalog...");
            let path = folio::commands::export::run(&blog, output.as_deref())?;
            println!("Exported to {}", path.display());
        }

        Commands::Serve { port, ip, r#static } => {
            let blog = folio::Blog::new(&base_dir)?;
            let port = port.unwrap_or(blog.config.server.port);
            let ip = ip.unwrap_or_else(|| blog.config.server.ip.clone());

            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio::server::start(&blog, &ip, port, !r#static).await?;
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
