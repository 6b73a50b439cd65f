//! Error types for CNF parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that can occur while reading a CNF instance.
///
/// All variants are terminal for the input that produced them: the parser
/// never skips a malformed line, and a failed file never affects the
/// construction of sibling inputs.
#[derive(Debug, Error)]
pub enum ParseError {
    /// I/O error reading the input.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The input contained no clause lines at all.
    #[error("empty input: no clauses found")]
    EmptyInput,

    /// A token on a clause line was not a signed integer.
    #[error("invalid literal '{token}' on line {line}")]
    InvalidLiteral {
        /// The offending token.
        token: String,
        /// One-based line number in the input.
        line: usize,
    },

    /// A clause line contained no literals after dropping the terminator.
    #[error("empty clause on line {line}")]
    EmptyClause {
        /// One-based line number in the input.
        line: usize,
    },

    /// The file name is too short to carry the label character at the
    /// expected position.
    #[error("file name '{}' too short for label at position {position} from the end", path.display())]
    LabelPosition {
        /// Path whose name was inspected.
        path: PathBuf,
        /// Expected label offset, counted from the end of the file name.
        position: usize,
    },

    /// The label character in the file name was neither '0' nor '1'.
    #[error("invalid label character '{found}' in file name '{}'", path.display())]
    InvalidLabel {
        /// Path whose name was inspected.
        path: PathBuf,
        /// The character found at the label position.
        found: char,
    },

    /// The formula references base variables with gaps in their numbering.
    ///
    /// Direct-mode domain edges address variable nodes by base-variable
    /// index, so the index set must be exactly `0..count`.
    #[error("sparse variable numbering: {count} base variables but highest index is {highest}")]
    SparseVariables {
        /// Number of distinct base variables.
        count: usize,
        /// Highest base-variable index referenced.
        highest: usize,
    },
}
