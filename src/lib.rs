//! # namemask
//!
//! Find person names in password wordlists, mask every match, and rank
//! how often each name occurs. The outputs answer one research question:
//! how much of a leaked corpus is "a name with decorations"?
//!
//! ## How it works
//!
//! - **Name index**: names live in a case-folded character trie;
//!   matching is case-insensitive, offsets stay byte-exact
//! - **Scan**: a failure-link automaton compiled from the trie reads each
//!   line once and reports every occurrence, nested and overlapping ones
//!   included; each hit becomes one masked output line
//! - **Masks**: the matched span is replaced by a placeholder run
//!   (`Annabelle` with `ann`/`anna` indexed yields `|||abelle` and
//!   `||||belle`)
//! - **Statistics**: per-name counts, rendered most frequent first
//! - **Hygiene**: corpus lines already containing the placeholder are
//!   never re-scanned, so the tool can chew its own output safely
//!
//! ## Usage
//!
//! ```bash
//! # Mask and rank
//! namemask firstnames.txt rockyou.txt
//!
//! # Reference trie engine, single-threaded
//! namemask firstnames.txt rockyou.txt --engine trie -t 1
//!
//! # Turn ranked masks back into candidates
//! sort masks/masks.raw | uniq -c | sort -rn > masks/masks.ranked
//! namemask-expand firstnames.txt masks/masks.ranked > candidates.txt
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use namemask::cli::EngineKind;
//! use namemask::processor::{Processor, ProcessorConfig};
//! use std::path::PathBuf;
//!
//! let config = ProcessorConfig {
//!     engine: EngineKind::Automaton,
//!     placeholder: '|',
//!     output_dir: PathBuf::from("masks"),
//!     masks_name: "masks.raw".to_string(),
//!     stats_name: "most_used_names.txt".to_string(),
//!     threads: 4,
//!     batch_lines: 8192,
//!     buffer_size: 64 * 1024 * 1024,
//!     quiet: true,
//!     verbose: false,
//! };
//!
//! let processor = Processor::new(config);
//! // processor.process(&PathBuf::from("names.txt"), &PathBuf::from("rockyou.txt")).unwrap();
//! ```

pub mod automaton;
pub mod cli;
pub mod corpus;
pub mod expand;
pub mod mask;
pub mod output;
pub mod processor;
pub mod progress;
pub mod scanner;
pub mod stats;
pub mod trie;

pub use cli::{Args, EngineKind};
pub use processor::{CancelToken, Processor, ProcessorConfig};
pub use scanner::{Hit, MatchEngine};
pub use trie::{NameTrie, PatternError};
