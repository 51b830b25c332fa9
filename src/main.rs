use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gqlmirror::config::DEFAULT_CONFIG_FILE;

mod cli;

#[derive(Parser)]
#[command(name = "gqlmirror")]
#[command(version)]
#[command(about = "Mirror a GraphQL schema and its operations as typed client code", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an example configuration
    Init {
        /// Output config file path (if not specified, outputs to stdout)
        #[arg(long)]
        output: Option<String>,

        /// Overwrite the output file if it already exists
        #[arg(long)]
        force: bool,
    },

    /// Generate typed client code for every configured output
    Generate {
        /// Config file path
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: String,

        /// Write nothing; fail if any generated file is out of date
        #[arg(long)]
        check: bool,
    },

    /// Validate operations, round-trip them through the mock and report drift
    Check {
        /// Config file path
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: String,

        /// SDL file or endpoint URL to compare the configured schema with
        #[arg(long)]
        against: Option<String>,
    },

    /// Introspect a live endpoint and save its schema as SDL
    Pull {
        /// GraphQL endpoint URL
        #[arg(long)]
        url: String,

        /// Extra request header as Name=Value (repeatable)
        #[arg(long = "header")]
        headers: Vec<String>,

        /// Output SDL file path (if not specified, outputs to stdout)
        #[arg(long)]
        output: Option<String>,
    },

    /// Start the mock GraphQL server
    Serve {
        /// Config file path
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: String,

        /// Server port (overrides the config)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { output, force } => {
            cli::init::run(output, force).await.context("init failed")?;
        }
        Commands::Generate { config, check } => {
            cli::generate::run(config, check).await.context("generate failed")?;
        }
        Commands::Check { config, against } => {
            cli::check::run(config, against).await.context("check failed")?;
        }
        Commands::Pull { url, headers, output } => {
            cli::pull::run(url, headers, output).await.context("pull failed")?;
        }
        Commands::Serve { config, port } => {
            cli::serve::run(config, port).await.context("serve failed")?;
        }
    }

    Ok(())
}
