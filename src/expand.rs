//! Candidate expansion from ranked masks
//!
//! The inverse of scanning: the first placeholder run in each mask line
//! is substituted with every indexed name of the same length, producing
//! password candidates. Input is either the raw mask file or a ranked
//! one; a leading `sort | uniq -c` count column is detected from the
//! first line and stripped from all of them.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ahash::RandomState;
use anyhow::Context;
use hashbrown::{HashMap, HashSet};

use crate::corpus::LineReader;
use crate::trie::validate_pattern;

/// Names grouped by length, canonical lower-case, pattern-file order
/// within each group.
pub struct NameIndex {
    by_len: HashMap<usize, Vec<String>, RandomState>,
    count: usize,
}

impl NameIndex {
    /// Loads the same pattern file format the scanner uses; repeated
    /// names collapse to their first occurrence.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pattern file {:?}", path))?;
        let mut by_len: HashMap<usize, Vec<String>, RandomState> =
            HashMap::with_hasher(RandomState::new());
        let mut seen: HashSet<String, RandomState> = HashSet::with_hasher(RandomState::new());
        let mut count = 0usize;
        for (lineno, raw) in text.lines().enumerate() {
            if raw.is_empty() {
                continue;
            }
            validate_pattern(raw)
                .with_context(|| format!("Invalid pattern on line {} of {:?}", lineno + 1, path))?;
            let name = raw.to_ascii_lowercase();
            if !seen.insert(name.clone()) {
                continue;
            }
            by_len.entry(name.len()).or_default().push(name);
            count += 1;
        }
        Ok(Self { by_len, count })
    }

    /// Names whose length matches a placeholder run of `len` characters.
    pub fn names_of_len(&self, len: usize) -> &[String] {
        self.by_len.get(&len).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct names indexed.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Detects the ranked-file count column on the first line: optional
/// leading spaces, digits, one separating space. Returns the byte offset
/// where the mask text starts, `None` when the line has no count column.
pub fn count_column_offset(first_line: &str) -> Option<usize> {
    let bytes = first_line.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i] == b' ' {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == digits_start {
        return None;
    }
    if bytes.get(i) != Some(&b' ') {
        return None;
    }
    Some(i + 1)
}

/// First run of placeholder characters in `mask` as a byte span.
pub fn placeholder_run(mask: &str, placeholder: char) -> Option<(usize, usize)> {
    let start = mask.find(placeholder)?;
    let end = mask[start..]
        .find(|ch| ch != placeholder)
        .map(|i| start + i)
        .unwrap_or(mask.len());
    Some((start, end))
}

/// Expands one mask line into `out`, one candidate per name whose length
/// matches the first placeholder run. Returns the number of candidates.
pub fn expand_mask<W: Write>(
    mask: &str,
    index: &NameIndex,
    placeholder: char,
    out: &mut W,
) -> anyhow::Result<u64> {
    let Some((start, end)) = placeholder_run(mask, placeholder) else {
        return Ok(0);
    };
    let run_len = mask[start..end].chars().count();
    let mut written = 0u64;
    for name in index.names_of_len(run_len) {
        out.write_all(mask[..start].as_bytes())?;
        out.write_all(name.as_bytes())?;
        out.write_all(mask[end..].as_bytes())?;
        out.write_all(b"\n")?;
        written += 1;
    }
    Ok(written)
}

/// Expansion settings for one run.
pub struct ExpandOptions {
    pub patterns: PathBuf,
    pub masks: PathBuf,
    /// Candidates go to this file, or to stdout when `None`.
    pub output: Option<PathBuf>,
}

/// What one expansion run did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExpandSummary {
    pub mask_lines: u64,
    pub candidates: u64,
    pub skipped: u64,
}

/// Runs a full expansion. Candidates stream to the selected sink;
/// diagnostics go through the log facade so stdout stays clean for
/// piping.
pub fn run_expand(options: &ExpandOptions, placeholder: char) -> anyhow::Result<ExpandSummary> {
    let index = NameIndex::load(&options.patterns)?;
    if index.is_empty() {
        log::warn!("pattern file holds no names; nothing can be expanded");
    } else {
        log::debug!("indexed {} names", index.len());
    }

    let mut reader = LineReader::open(&options.masks)?;
    let mut sink: Box<dyn Write> = match &options.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {:?}", path))?;
            Box::new(BufWriter::with_capacity(1 << 20, file))
        }
        None => Box::new(BufWriter::with_capacity(1 << 20, std::io::stdout().lock())),
    };

    // The count column layout is fixed for the whole file; detect it once.
    let mut offset: Option<usize> = None;
    let mut summary = ExpandSummary::default();
    while let Some((line, _)) = reader.next_line() {
        summary.mask_lines += 1;
        let at = *offset.get_or_insert_with(|| match count_column_offset(&line) {
            Some(at) => at,
            None => {
                log::info!("no count column detected; reading raw mask lines");
                0
            }
        });
        let Some(mask) = line.get(at..) else {
            // Shorter than the count column, nothing to expand.
            summary.skipped += 1;
            continue;
        };
        let produced = expand_mask(mask, &index, placeholder, &mut sink)
            .with_context(|| format!("Failed to write candidates for mask {:?}", mask))?;
        if produced == 0 {
            summary.skipped += 1;
        } else {
            summary.candidates += produced;
        }
    }
    sink.flush().context("Failed to flush candidate output")?;
    Ok(summary)
}
