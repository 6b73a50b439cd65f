//! Command-line surface: argument definitions and the command handlers.

#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use clap::{Args, Parser, Subcommand, ValueEnum};
use sat_gnn::graph::hetero::HeteroGraph;
use sat_gnn::graph::schema::GraphVariant;
use sat_gnn::sat::cnf::Label;
use sat_gnn::sat::dimacs::{parse_file, parse_file_with_convention, CORPUS_LABEL_POSITION};
use sat_gnn::train::dataset::{Dataset, LabelSource};
use sat_gnn::train::{run_sweep, SweepConfig, TrainHistory};
use std::path::PathBuf;
use std::time::Instant;

/// Defines the command-line interface for the graph encoder and classifier.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(
    name = "sat_gnn",
    version,
    about = "Encodes CNF formulas as heterogeneous graphs and trains a sat/unsat classifier"
)]
pub(crate) struct Cli {
    /// An optional global path argument. If provided without a subcommand,
    /// it's treated as the path to a DIMACS .cnf file to encode with the
    /// default variant.
    #[arg(global = true)]
    pub path: Option<PathBuf>,

    /// Specifies the subcommand to execute (e.g. `build`, `train`).
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable to all commands.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Encode one DIMACS .cnf file as a heterogeneous graph and report its
    /// structure.
    Build {
        /// Path to the DIMACS .cnf file.
        #[arg(long)]
        path: PathBuf,

        /// Which graph encoding to build.
        #[arg(long, value_enum, default_value = "refactored")]
        variant: VariantArg,

        /// Explicit satisfiability label. When omitted, the label is read
        /// from the file name.
        #[arg(long, value_enum)]
        label: Option<LabelArg>,

        /// Character position of the label in the file name, counted from
        /// the end. Used only when `--label` is omitted.
        #[arg(long, default_value_t = CORPUS_LABEL_POSITION)]
        label_position: usize,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Train the classifier over a directory of DIMACS .cnf files, sweeping
    /// the hyperparameter grid.
    Train {
        /// Directory scanned recursively for .cnf files.
        #[arg(long)]
        data: PathBuf,

        /// Which graph encoding to train on.
        #[arg(long, value_enum, default_value = "refactored")]
        variant: VariantArg,

        /// Explicit satisfiability label applied to every file. When
        /// omitted, labels are read from file names.
        #[arg(long, value_enum)]
        label: Option<LabelArg>,

        /// Character position of the label in file names, counted from the
        /// end. Used only when `--label` is omitted.
        #[arg(long, default_value_t = CORPUS_LABEL_POSITION)]
        label_position: usize,

        /// Fraction of the corpus used for training; the rest evaluates.
        #[arg(long, default_value_t = 0.8)]
        train_fraction: f32,

        /// Override the epoch count of every sweep run.
        #[arg(long)]
        epochs: Option<usize>,

        /// Override the batch size of every sweep run.
        #[arg(long)]
        batch_size: Option<usize>,

        /// Seed for shuffling and weight initialization.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct CommonOptions {
    /// Enable debug output, raising the log filter to `debug`.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Enable printing of graph and training statistics.
    #[arg(short, long, default_value_t = true)]
    pub(crate) stats: bool,
}

/// Graph encoding selector.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub(crate) enum VariantArg {
    /// One operator node per negative literal occurrence.
    Original,
    /// One operator node per literal polarity pair.
    SatSpecific,
    /// One operator node per base variable, with a meta summary node.
    Refactored,
}

impl From<VariantArg> for GraphVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Original => Self::Original,
            VariantArg::SatSpecific => Self::SatSpecific,
            VariantArg::Refactored => Self::Refactored,
        }
    }
}

/// Explicit label selector.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub(crate) enum LabelArg {
    /// The formula is satisfiable.
    Sat,
    /// The formula is unsatisfiable.
    Unsat,
}

impl From<LabelArg> for Label {
    fn from(arg: LabelArg) -> Self {
        match arg {
            LabelArg::Sat => Self::Sat,
            LabelArg::Unsat => Self::Unsat,
        }
    }
}

/// Resolves the label flags into a label source for corpus loading.
pub(crate) fn label_source(label: Option<LabelArg>, position: usize) -> LabelSource {
    label.map_or(
        LabelSource::Filename { position },
        |arg| LabelSource::Fixed(arg.into()),
    )
}

/// Parses one file, builds the requested encoding, and reports its structure.
pub(crate) fn build_and_report(
    path: &PathBuf,
    variant: GraphVariant,
    label: Option<LabelArg>,
    label_position: usize,
    common: &CommonOptions,
) -> Result<(), String> {
    let time = Instant::now();
    let cnf = match label {
        Some(arg) => parse_file(path, arg.into()),
        None => parse_file_with_convention(path, label_position),
    }
    .map_err(|e| format!("{}: {e}", path.display()))?;
    let parse_time = time.elapsed().as_secs_f64();

    let time = Instant::now();
    let graph = cnf.to_graph(variant);
    let build_time = time.elapsed().as_secs_f64();

    println!("Encoded: {} ({variant})", path.display());
    if common.stats {
        print_graph_stats(&graph, parse_time, build_time);
    }
    Ok(())
}

/// Loads a corpus, splits it, and sweeps the hyperparameter grid.
pub(crate) fn train_corpus(
    data: &PathBuf,
    variant: GraphVariant,
    source: LabelSource,
    sweep: &SweepConfig,
    train_fraction: f32,
    common: &CommonOptions,
) -> Result<(), String> {
    let mut dataset =
        Dataset::load_dir(data, variant, source).map_err(|e| e.to_string())?;
    if dataset.is_empty() {
        return Err(format!("no usable .cnf files under {}", data.display()));
    }

    dataset.shuffle(sweep.seed);
    let split = ((dataset.len() as f32 * train_fraction).round() as usize).min(dataset.len());
    let (train, test) = dataset.split_at(split);
    println!(
        "Corpus: {} training / {} test graphs ({variant})",
        train.len(),
        test.len()
    );

    let best = run_sweep(sweep, variant, &train, &test)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "sweep grid is empty".to_string())?;

    if common.stats {
        print_sweep_stats(&best);
    }
    Ok(())
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Prints node and edge counts of a freshly built graph.
pub(crate) fn print_graph_stats(graph: &HeteroGraph, parse_time: f64, build_time: f64) {
    println!("\n========================[ Graph Statistics ]=========================");
    stat_line("Parse time (s)", format!("{parse_time:.3}"));
    stat_line("Build time (s)", format!("{build_time:.3}"));
    for (ty, table) in graph.node_tables() {
        stat_line(&format!("Nodes: {ty}"), table.len());
    }
    for (relation, pairs) in graph.relations() {
        stat_line(&format!("Edges: {relation}"), pairs.len());
    }
    if let Some(label) = graph.label_one_hot() {
        stat_line("Label", if label[1] > label[0] { "sat" } else { "unsat" });
    }
    println!("=====================================================================");
}

/// Prints the hyperparameters and final metrics of the best sweep run.
pub(crate) fn print_sweep_stats(best: &TrainHistory) {
    println!("\n=========================[ Best Sweep Run ]==========================");
    stat_line("Hidden width", best.run.hidden);
    stat_line("Learning rate", best.run.lr);
    stat_line("Layers", best.run.layers);
    stat_line("Dropout", best.run.dropout);
    stat_line("Heads", best.run.heads);
    stat_line("Epochs", best.run.epochs);
    if let Some(last) = best.epochs.last() {
        stat_line("Final train loss", format!("{:.4}", last.train_loss));
        stat_line("Final train accuracy", format!("{:.4}", last.train_accuracy));
        stat_line("Final test loss", format!("{:.4}", last.test_loss));
        stat_line("Final test accuracy", format!("{:.4}", last.test_accuracy));
    }
    println!("=====================================================================");
}
