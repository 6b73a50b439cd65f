//! Binary entry point: parses the command line, configures logging, and
//! dispatches to the build or train handlers.

mod command_line;

use clap::{CommandFactory, Parser};
use crate::command_line::cli::{build_and_report, label_source, train_corpus, Cli, Commands};
use sat_gnn::sat::dimacs::CORPUS_LABEL_POSITION;
use sat_gnn::train::SweepConfig;
use tracing_subscriber::EnvFilter;

/// Installs the global log subscriber. `RUST_LOG` wins when set; otherwise
/// the debug flag picks between `debug` and `info`.
fn init_tracing(debug: bool) {
    let fallback = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(cli: Cli) -> Result<(), String> {
    // A global path without a subcommand encodes the file with defaults.
    if let Some(path) = cli.path.clone() {
        if cli.command.is_none() {
            init_tracing(cli.common.debug);
            return build_and_report(
                &path,
                sat_gnn::graph::schema::GraphVariant::Refactored,
                None,
                CORPUS_LABEL_POSITION,
                &cli.common,
            );
        }
    }

    match cli.command {
        Some(Commands::Build {
            path,
            variant,
            label,
            label_position,
            common,
        }) => {
            init_tracing(common.debug);
            build_and_report(&path, variant.into(), label, label_position, &common)
        }

        Some(Commands::Train {
            data,
            variant,
            label,
            label_position,
            train_fraction,
            epochs,
            batch_size,
            seed,
            common,
        }) => {
            init_tracing(common.debug);
            let mut sweep = SweepConfig {
                seed,
                ..SweepConfig::default()
            };
            if let Some(epochs) = epochs {
                sweep.epochs = epochs;
            }
            if let Some(batch_size) = batch_size {
                sweep.batch_size = batch_size;
            }
            train_corpus(
                &data,
                variant.into(),
                label_source(label, label_position),
                &sweep,
                train_fraction,
                &common,
            )
        }

        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }

        None => Err("No command provided. Use --help for more information.".to_string()),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(message) = run(cli) {
        eprintln!("{message}");
        std::process::exit(1);
    }
}
