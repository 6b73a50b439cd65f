//! A parser for DIMACS-like CNF text.
//!
//! The format:
//! - Comment lines starting with `c`.
//! - A problem line starting with `p cnf <num_variables> <num_clauses>`.
//!   (The declared counts are ignored; the actual clauses are authoritative.)
//! - Clause lines of whitespace-separated signed integers, terminated by `0`.
//! - An optional `%` line marking end-of-data.
//!
//! Unlike the corpus this format originates from, the satisfiability label is
//! an explicit parameter of every parse entry point. The corpus convention —
//! a fixed character position in the file name encodes the label — survives
//! only as the validated helper [`label_from_filename`], and malformed names
//! surface as a [`ParseError`] instead of being read blindly.

use crate::sat::clause::Clause;
use crate::sat::cnf::{Cnf, Label};
use crate::sat::error::{ParseError, Result};
use itertools::Itertools;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Label position used by the original corpus naming scheme, counted from the
/// end of the file name (`uf50-03-sat=1.00.cnf`-style names carry the label
/// character eight positions from the end).
pub const CORPUS_LABEL_POSITION: usize = 8;

/// Parses DIMACS formatted data from a `BufRead` source.
///
/// Reads the input line by line:
/// - Lines starting with `c` or `p`, and blank lines, are skipped.
/// - A line starting with `%` ends the input.
/// - Every other line is a clause: each token is parsed as an `i32`, the
///   terminating `0` tokens are dropped, and duplicate literals collapse.
///
/// # Errors
///
/// - [`ParseError::InvalidLiteral`] for a non-integer token on a clause line.
/// - [`ParseError::EmptyClause`] for a clause line that holds no literals
///   after the terminator is dropped (for example a bare `0`).
/// - [`ParseError::EmptyInput`] if no clause line was found at all.
/// - [`ParseError::SparseVariables`] if the clauses leave gaps in the
///   base-variable numbering.
pub fn parse_dimacs<R: BufRead>(reader: R, label: Label) -> Result<Cnf> {
    let mut clauses = Vec::new();

    for (line_no, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let trimmed = line.trim_start();

        if trimmed.starts_with('%') {
            break;
        }
        if trimmed.is_empty() || trimmed.starts_with('c') || trimmed.starts_with('p') {
            continue;
        }

        let literals: Vec<i32> = trimmed
            .split_whitespace()
            .map(|token| {
                token.parse::<i32>().map_err(|_| ParseError::InvalidLiteral {
                    token: token.to_string(),
                    line: line_no + 1,
                })
            })
            .filter_ok(|&lit| lit != 0) // Drop the terminating '0'.
            .try_collect()?;

        if literals.is_empty() {
            return Err(ParseError::EmptyClause { line: line_no + 1 });
        }
        clauses.push(Clause::new(literals));
    }

    if clauses.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    Cnf::new(clauses, label)
}

/// Parses a DIMACS CNF file with an explicitly supplied label.
///
/// # Errors
///
/// Returns a [`ParseError`] if the file cannot be opened or its content is
/// malformed; see [`parse_dimacs`].
pub fn parse_file(path: impl AsRef<Path>, label: Label) -> Result<Cnf> {
    let file = std::fs::File::open(path.as_ref())?;
    parse_dimacs(io::BufReader::new(file), label)
}

/// Parses a DIMACS CNF file, deriving the label from the file name.
///
/// `position` is counted from the end of the file name; see
/// [`label_from_filename`].
///
/// # Errors
///
/// Returns a [`ParseError`] for an unreadable label convention or malformed
/// file content.
pub fn parse_file_with_convention(path: impl AsRef<Path>, position: usize) -> Result<Cnf> {
    let label = label_from_filename(path.as_ref(), position)?;
    parse_file(path, label)
}

/// Reads the satisfiability label from a fixed character position in the file
/// name, counted from the end: `'1'` means satisfiable, `'0'` unsatisfiable.
///
/// # Errors
///
/// - [`ParseError::LabelPosition`] if the file name is shorter than
///   `position` characters or has no final component.
/// - [`ParseError::InvalidLabel`] if the character at that position is
///   neither `'0'` nor `'1'`.
pub fn label_from_filename(path: &Path, position: usize) -> Result<Label> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ParseError::LabelPosition {
            path: path.to_path_buf(),
            position,
        })?;

    let chars: Vec<char> = name.chars().collect();
    if position == 0 || chars.len() < position {
        return Err(ParseError::LabelPosition {
            path: path.to_path_buf(),
            position,
        });
    }

    match chars[chars.len() - position] {
        '1' => Ok(Label::Sat),
        '0' => Ok(Label::Unsat),
        found => Err(ParseError::InvalidLabel {
            path: path.to_path_buf(),
            found,
        }),
    }
}

/// Recursively collects all `.cnf` files under a directory, sorted by path.
///
/// # Errors
///
/// Returns an I/O [`ParseError`] if the directory walk fails.
pub fn collect_cnf_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir.as_ref()) {
        let entry = entry.map_err(io::Error::from)?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "cnf") {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}
