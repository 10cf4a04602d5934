//! Core scan engine
//!
//! Drives a full run: build the pattern engine, stream the corpus in line
//! batches, write one mask line per hit in corpus order, and render the
//! ranked-name report. A single-thread path and a bounded channel
//! pipeline share the same batch scan, so their outputs are
//! byte-identical and a parallel run stays reproducible.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use colored::*;
use crossbeam_channel::bounded;
use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::cli::{Args, EngineKind};
use crate::corpus::{Batch, CorpusReader};
use crate::mask;
use crate::output::{ensure_output_dir, OutputWriter};
use crate::progress::{
    create_bytes_progress_bar, print_header, print_info, print_success, print_warning, ScanStats,
};
use crate::scanner::{build_engine, Hit, MatchEngine};
use crate::stats::FrequencyTable;
use crate::trie::load_patterns;

/// Cooperative cancellation flag, checked between line batches. In-flight
/// batches finish and get written, so a cancelled run still leaves a
/// consistent prefix of the corpus in both output files.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop at the next batch boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Processor configuration
pub struct ProcessorConfig {
    pub engine: EngineKind,
    pub placeholder: char,
    pub output_dir: PathBuf,
    pub masks_name: String,
    pub stats_name: String,
    pub threads: usize,
    pub batch_lines: usize,
    pub buffer_size: usize,
    pub quiet: bool,
    pub verbose: bool,
}

impl ProcessorConfig {
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        Ok(Self {
            engine: args.engine,
            placeholder: args.placeholder,
            output_dir: args.output.clone(),
            masks_name: args.masks_name.clone(),
            stats_name: args.stats_name.clone(),
            threads: args.threads.unwrap_or_else(num_cpus::get).max(1),
            batch_lines: args.batch_size.max(1),
            buffer_size: args.parse_buffer_size()?,
            quiet: args.quiet,
            verbose: args.verbose,
        })
    }

    /// Path of the mask output file.
    pub fn masks_path(&self) -> PathBuf {
        self.output_dir.join(&self.masks_name)
    }

    /// Path of the statistics file.
    pub fn stats_path(&self) -> PathBuf {
        self.output_dir.join(&self.stats_name)
    }
}

/// Everything one scanned batch produces: pre-rendered mask lines and the
/// batch-local frequency counts, merged downstream.
struct ScannedBatch {
    masks: String,
    counts: FrequencyTable,
    hits: u64,
}

/// Scans one batch of lines: one mask line and one count per hit.
fn scan_batch(engine: &dyn MatchEngine, batch: &Batch, placeholder: char) -> ScannedBatch {
    let mut out = ScannedBatch {
        masks: String::new(),
        counts: FrequencyTable::new(),
        hits: 0,
    };
    let mut hits: Vec<Hit> = Vec::with_capacity(8);
    for line in &batch.lines {
        engine.find_hits(line, &mut hits);
        for &hit in &hits {
            mask::push_masked_line(&mut out.masks, line, hit, placeholder);
            out.counts.record_span(line, hit);
        }
        out.hits += hits.len() as u64;
    }
    out
}

/// Main processor
pub struct Processor {
    config: ProcessorConfig,
    stats: Arc<ScanStats>,
    cancel: CancelToken,
}

impl Processor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            config,
            stats: Arc::new(ScanStats::new()),
            cancel: CancelToken::new(),
        }
    }

    /// Run a full scan: `patterns` holds one name per line, `wordlist` is
    /// the corpus. Both output files exist when this returns `Ok`, even if
    /// nothing matched.
    pub fn process(&self, patterns: &Path, wordlist: &Path) -> anyhow::Result<()> {
        // A malformed pattern set cannot be partially trusted: load and
        // validate everything before any output file is touched.
        let trie = load_patterns(patterns)?;
        if trie.is_empty() {
            print_warning("Pattern file holds no names; the scan cannot match anything");
        }
        if !self.config.quiet && self.config.verbose {
            print_info(&format!(
                "Indexed {} names (longest {} chars)",
                trie.pattern_count(),
                trie.max_pattern_len()
            ));
        }
        let engine = build_engine(self.config.engine, trie);

        let mut reader = CorpusReader::open(wordlist, self.config.placeholder)?;
        self.stats.set_total_bytes(reader.len() as u64);

        ensure_output_dir(&self.config.output_dir)?;
        let mut masks = OutputWriter::new(self.config.masks_path(), self.config.buffer_size)?;

        if !self.config.quiet {
            print_header("Scanning wordlist...");
        }
        let pb = if self.config.quiet {
            ProgressBar::hidden()
        } else {
            create_bytes_progress_bar(reader.len() as u64, "Scanning...")
        };

        let table = if self.config.threads <= 1 {
            self.run_sequential(&mut reader, engine.as_ref(), &mut masks, &pb)?
        } else {
            self.run_pipelined(&mut reader, engine.as_ref(), &mut masks, &pb)?
        };
        masks.flush()?;

        if self.cancel.is_cancelled() {
            pb.abandon_with_message("Cancelled".yellow().to_string());
        } else {
            pb.finish_with_message("Complete".green().to_string());
        }

        // Reader counters are only final once scanning has stopped.
        self.stats.add_lines(reader.lines_read());
        self.stats.add_skipped(reader.lines_skipped());
        self.stats.add_damaged(reader.lines_damaged());
        self.stats.set_distinct_names(table.len() as u64);

        let stats_path = self.config.stats_path();
        fs::write(&stats_path, table.render_report())
            .with_context(|| format!("Failed to write statistics file {:?}", stats_path))?;

        if !self.config.quiet {
            if self.cancel.is_cancelled() {
                print_warning("Scan cancelled; outputs cover the processed prefix only");
            }
            self.stats.print_summary();
            print_success(&format!("Masks written to: {:?}", masks.path()));
            print_success(&format!("Statistics written to: {:?}", stats_path));
        }

        Ok(())
    }

    /// One thread does everything. Also the reference semantics the
    /// pipelined path is tested against.
    fn run_sequential(
        &self,
        reader: &mut CorpusReader,
        engine: &dyn MatchEngine,
        masks: &mut OutputWriter,
        pb: &ProgressBar,
    ) -> anyhow::Result<FrequencyTable> {
        let mut table = FrequencyTable::new();
        while !self.cancel.is_cancelled() {
            let Some(batch) = reader.next_batch(self.config.batch_lines) else {
                break;
            };
            let scanned = scan_batch(engine, &batch, self.config.placeholder);
            self.absorb(scanned, batch.bytes, masks, &mut table, pb)?;
        }
        Ok(table)
    }

    /// Reader thread feeds indexed batches through a bounded channel into
    /// rayon workers; this thread reassembles results in corpus order.
    /// Bounded channels on both sides keep memory flat no matter how far
    /// the reader runs ahead.
    fn run_pipelined(
        &self,
        reader: &mut CorpusReader,
        engine: &dyn MatchEngine,
        masks: &mut OutputWriter,
        pb: &ProgressBar,
    ) -> anyhow::Result<FrequencyTable> {
        let queue_depth = self.config.threads * 2;
        let (batch_tx, batch_rx) = bounded::<(u64, Batch)>(queue_depth);
        let (scan_tx, scan_rx) = bounded::<(u64, usize, ScannedBatch)>(queue_depth);

        let batch_lines = self.config.batch_lines;
        let placeholder = self.config.placeholder;
        let cancel = self.cancel.clone();

        std::thread::scope(|scope| {
            scope.spawn(move || {
                let mut index = 0u64;
                while !cancel.is_cancelled() {
                    let Some(batch) = reader.next_batch(batch_lines) else {
                        break;
                    };
                    // Send fails only when the writer side bailed out.
                    if batch_tx.send((index, batch)).is_err() {
                        break;
                    }
                    index += 1;
                }
            });

            scope.spawn(move || {
                batch_rx
                    .into_iter()
                    .par_bridge()
                    .for_each_with(scan_tx, |tx, (index, batch)| {
                        let scanned = scan_batch(engine, &batch, placeholder);
                        let _ = tx.send((index, batch.bytes, scanned));
                    });
            });

            let mut table = FrequencyTable::new();
            let mut pending: BTreeMap<u64, (usize, ScannedBatch)> = BTreeMap::new();
            let mut next_index = 0u64;
            let mut failure: Option<anyhow::Error> = None;
            for (index, bytes, scanned) in scan_rx {
                if failure.is_some() {
                    // Keep draining so no worker blocks on a full channel.
                    continue;
                }
                pending.insert(index, (bytes, scanned));
                while let Some((bytes, scanned)) = pending.remove(&next_index) {
                    if let Err(err) = self.absorb(scanned, bytes, masks, &mut table, pb) {
                        self.cancel.cancel();
                        failure = Some(err);
                        break;
                    }
                    next_index += 1;
                }
            }
            match failure {
                Some(err) => Err(err),
                None => Ok(table),
            }
        })
    }

    /// Folds one scanned batch into the run outputs. Callers invoke this
    /// in corpus order.
    fn absorb(
        &self,
        scanned: ScannedBatch,
        bytes: usize,
        masks: &mut OutputWriter,
        table: &mut FrequencyTable,
        pb: &ProgressBar,
    ) -> anyhow::Result<()> {
        masks.write_chunk(&scanned.masks, scanned.hits)?;
        table.merge(scanned.counts);
        self.stats.add_hits(scanned.hits);
        self.stats.add_processed_bytes(bytes as u64);
        pb.inc(bytes as u64);
        Ok(())
    }

    /// Get scan statistics
    pub fn stats(&self) -> Arc<ScanStats> {
        Arc::clone(&self.stats)
    }

    /// Token for requesting a cooperative stop.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}
