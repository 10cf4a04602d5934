//! Command-line interface definition for namemask
//!
//! Argument parsing and validation for the scanner (`namemask`) and the
//! candidate expander (`namemask-expand`).

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::mask::DEFAULT_PLACEHOLDER;

/// Mask person names in password wordlists
///
/// Scans a wordlist for person names, writes one masked line per match,
/// and ranks how often each name occurred.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "namemask",
    author = "m0h1nd4",
    version,
    about = "Mask person names in password wordlists and rank name frequency",
    long_about = r#"
╔══════════════════════════════════════════════════════════════════════════════╗
║                               NAMEMASK v1.0.0                                ║
║                  Person-Name Masking For Password Research                   ║
╚══════════════════════════════════════════════════════════════════════════════╝

Scans huge password wordlists for person names. Every match becomes one line
in the mask file with the name replaced by a placeholder run, and every name
is counted for the frequency report. Nested and overlapping matches each
produce their own line, so "Annabelle" with "ann" and "anna" indexed yields
both "|||abelle" and "||||belle".

EXAMPLES:
    # Scan rockyou with a first-name list
    namemask firstnames.txt rockyou.txt

    # Everything into a custom output directory
    namemask firstnames.txt rockyou.txt -o run1

    # Mask with '#' instead of '|'
    namemask firstnames.txt rockyou.txt -m '#'

    # Single-threaded reference engine, useful for verification
    namemask firstnames.txt rockyou.txt --engine trie -t 1

WORKFLOW:
    Rank recurring mask structures with coreutils, then expand the ranked
    file back into password candidates:

        sort masks/masks.raw | uniq -c | sort -rn > masks/masks.ranked
        namemask-expand firstnames.txt masks/masks.ranked > candidates.txt
"#,
    after_help = "For more information, visit: https://github.com/m0h1nd4/namemask"
)]
pub struct Args {
    /// Pattern file: one person name per line, ASCII letters only
    #[arg(value_name = "PATTERNS")]
    pub patterns: PathBuf,

    /// Wordlist to scan
    #[arg(value_name = "WORDLIST")]
    pub wordlist: PathBuf,

    /// Output directory for the mask and statistics files
    #[arg(short, long, value_name = "DIR", default_value = "masks")]
    pub output: PathBuf,

    /// Mask output filename
    #[arg(long, value_name = "NAME", default_value = "masks.raw")]
    pub masks_name: String,

    /// Statistics output filename
    #[arg(long, value_name = "NAME", default_value = "most_used_names.txt")]
    pub stats_name: String,

    /// Character that replaces matched name spans
    #[arg(short = 'm', long, value_name = "CHAR", default_value_t = DEFAULT_PLACEHOLDER)]
    pub placeholder: char,

    /// Match engine
    #[arg(long, value_enum, default_value_t = EngineKind::Automaton)]
    pub engine: EngineKind,

    /// Number of threads (default: auto-detect)
    #[arg(short = 't', long, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Corpus lines per work unit handed to a worker
    #[arg(long, value_name = "LINES", default_value_t = 8192)]
    pub batch_size: usize,

    /// Buffer size for mask output (default: 64MB)
    #[arg(long, value_name = "SIZE", default_value = "64MB")]
    pub buffer_size: String,

    /// Quiet mode - minimal output
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Verbose mode - detailed logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Match engine backing the scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// Prefix-walk the name trie from every line offset
    Trie,
    /// Single-pass failure-link automaton compiled from the trie
    Automaton,
}

impl Args {
    /// Parse buffer size string to bytes
    pub fn parse_buffer_size(&self) -> anyhow::Result<usize> {
        parse_size(&self.buffer_size)
    }

    /// Check the placeholder against the character class the scan relies on
    pub fn validate_placeholder(&self) -> anyhow::Result<()> {
        validate_placeholder(self.placeholder)
    }
}

/// Expand ranked mask lines back into password candidates
///
/// Reads mask lines, optionally prefixed by a `sort | uniq -c` count
/// column detected from the first line, and substitutes every name of
/// matching length into the first placeholder run.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "namemask-expand",
    author = "m0h1nd4",
    version,
    about = "Expand ranked mask lines back into password candidates",
    long_about = r#"
Turns mask lines back into password candidates: the first placeholder run
in each line is replaced by every indexed name of the same length. Input
may be the raw mask file or a ranked one; a leading count column in the
style of `sort | uniq -c` is detected on the first line and stripped from
all of them.

EXAMPLES:
    # Candidates to stdout, ranked input
    namemask-expand firstnames.txt masks/masks.ranked

    # Raw (unranked) mask file into an output file
    namemask-expand firstnames.txt masks/masks.raw -o candidates.txt
"#,
    after_help = "For more information, visit: https://github.com/m0h1nd4/namemask"
)]
pub struct ExpandArgs {
    /// Pattern file: one person name per line, ASCII letters only
    #[arg(value_name = "PATTERNS")]
    pub patterns: PathBuf,

    /// Mask file to expand, ranked or raw
    #[arg(value_name = "MASKS")]
    pub masks: PathBuf,

    /// Write candidates to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Placeholder character used in the mask file
    #[arg(short = 'm', long, value_name = "CHAR", default_value_t = DEFAULT_PLACEHOLDER)]
    pub placeholder: char,

    /// Quiet mode - minimal output
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Verbose mode - detailed logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// A placeholder must be printable ASCII and must not collide with the
/// letters and digits passwords are made of.
pub fn validate_placeholder(placeholder: char) -> anyhow::Result<()> {
    if !placeholder.is_ascii_graphic() || placeholder.is_ascii_alphanumeric() {
        anyhow::bail!(
            "Invalid placeholder {:?}: use a printable non-alphanumeric ASCII character such as '|'",
            placeholder
        );
    }
    Ok(())
}

/// Parse human-readable size string to bytes
fn parse_size(size_str: &str) -> anyhow::Result<usize> {
    let size_str = size_str.trim().to_uppercase();

    let (num_str, multiplier) = if size_str.ends_with("GB") {
        (&size_str[..size_str.len() - 2], 1024 * 1024 * 1024)
    } else if size_str.ends_with("MB") {
        (&size_str[..size_str.len() - 2], 1024 * 1024)
    } else if size_str.ends_with("KB") {
        (&size_str[..size_str.len() - 2], 1024)
    } else if size_str.ends_with("B") {
        (&size_str[..size_str.len() - 1], 1)
    } else {
        (size_str.as_str(), 1)
    };

    let num: usize = num_str
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid size format: '{}'", size_str))?;

    Ok(num * multiplier)
}
