use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use verifier::cli::{self, RunOptions};
use verifier::exit_codes;
use verifier::io::config::DEFAULT_CONFIG_PATH;

#[derive(Parser)]
#[command(
    name = "verifier",
    version,
    about = "Run the annotated code blocks in a document and record the outcome as badges"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute every verifiable step, save results, and update badges.
    Run {
        #[arg(default_value = "README.md")]
        document: PathBuf,
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        /// Write the result record here instead of the configured path.
        #[arg(long)]
        results: Option<PathBuf>,
        /// Leave the document untouched.
        #[arg(long)]
        no_update: bool,
    },
    /// Print the steps that `run` would execute.
    List {
        #[arg(default_value = "README.md")]
        document: PathBuf,
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
    /// Merge result files from several hosts into one combined record.
    Combine {
        #[arg(long)]
        output: PathBuf,
        #[arg(required = true)]
        results: Vec<PathBuf>,
    },
    /// Write multi-OS badges from a combined record into the document.
    Badges {
        #[arg(default_value = "README.md")]
        document: PathBuf,
        #[arg(long)]
        combined: PathBuf,
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

fn main() {
    verifier::logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::FAILED);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            document,
            config,
            results,
            no_update,
        } => cli::run_document(&RunOptions {
            document,
            config,
            results,
            no_update,
        }),
        Command::List { document, config } => {
            cli::list_steps(&document, &config)?;
            Ok(exit_codes::OK)
        }
        Command::Combine { output, results } => {
            cli::combine_results(&results, &output)?;
            Ok(exit_codes::OK)
        }
        Command::Badges {
            document,
            combined,
            config,
        } => {
            cli::update_multi_os_badges(&document, &combined, &config)?;
            Ok(exit_codes::OK)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults_to_readme() {
        let cli = Cli::parse_from(["verifier", "run"]);
        match cli.command {
            Command::Run {
                document,
                config,
                results,
                no_update,
            } => {
                assert_eq!(document, PathBuf::from("README.md"));
                assert_eq!(config, PathBuf::from(DEFAULT_CONFIG_PATH));
                assert!(results.is_none());
                assert!(!no_update);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn parse_run_with_overrides() {
        let cli = Cli::parse_from([
            "verifier",
            "run",
            "docs/SETUP.md",
            "--results",
            "out.json",
            "--no-update",
        ]);
        assert!(matches!(
            cli.command,
            Command::Run { no_update: true, results: Some(_), .. }
        ));
    }

    #[test]
    fn combine_requires_inputs() {
        assert!(Cli::try_parse_from(["verifier", "combine", "--output", "c.json"]).is_err());
    }
}
