//! pixf CLI - extract, deduplicate and re-encode document images.
//!
//! pixf takes the raw images pulled out of a document, drops byte-identical
//! duplicates and writes the unique set either verbatim or re-encoded.
//!
//! # Usage
//!
//! ```bash
//! # Keep unique images in their original format
//! pixf extract ./raw_images
//!
//! # Re-encode to lossless WebP with 8 workers
//! pixf extract ./raw_images --format webp --workers 8 -o ./images
//!
//! # View configuration
//! pixf config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// pixf - extract, deduplicate and re-encode document images.
#[derive(Parser, Debug)]
#[command(name = "pixf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Deduplicate raw images and write them to an output directory
    Extract(cli::extract::ExtractArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match pixf_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `pixf config path`."
            );
            pixf_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("pixf v{}", pixf_core::VERSION);

    match cli.command {
        Commands::Extract(args) => cli::extract::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parses_extract_command() {
        let cli = Cli::try_parse_from([
            "pixf", "extract", "raw", "-f", "webp", "-w", "2", "-o", "out", "--json",
        ])
        .unwrap();

        let Commands::Extract(args) = cli.command else {
            panic!("expected extract command");
        };
        assert_eq!(args.input, PathBuf::from("raw"));
        assert_eq!(args.format.as_deref(), Some("webp"));
        assert_eq!(args.workers, Some(2));
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        assert!(args.json);
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["pixf", "config", "show", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(!cli.json_logs);
    }

    #[test]
    fn extract_requires_input() {
        assert!(Cli::try_parse_from(["pixf", "extract"]).is_err());
    }
}
