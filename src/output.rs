//! Output management module
//!
//! Buffered writers for the two artifacts of a scan: the mask stream and
//! the statistics report. Mask output is reassembled in corpus order by a
//! single thread, so the writer is plain mutable state with no lock.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

/// Output file writer with buffering and line/byte accounting.
pub struct OutputWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    lines_written: u64,
    bytes_written: u64,
}

impl OutputWriter {
    /// Create a new output writer, truncating any previous file.
    pub fn new(path: PathBuf, buffer_size: usize) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("Failed to create output file {:?}", path))?;

        let writer = BufWriter::with_capacity(buffer_size, file);

        Ok(Self {
            writer,
            path,
            lines_written: 0,
            bytes_written: 0,
        })
    }

    /// Write a line to the output
    pub fn write_line(&mut self, line: &str) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", line)
            .with_context(|| format!("Failed to write to {:?}", self.path))?;
        self.lines_written += 1;
        self.bytes_written += line.len() as u64 + 1; // +1 for newline
        Ok(())
    }

    /// Write a pre-rendered chunk as-is; `lines` is the number of
    /// terminated lines it contains.
    pub fn write_chunk(&mut self, data: &str, lines: u64) -> anyhow::Result<()> {
        self.writer
            .write_all(data.as_bytes())
            .with_context(|| format!("Failed to write to {:?}", self.path))?;
        self.lines_written += lines;
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush {:?}", self.path))?;
        Ok(())
    }

    /// Get the output path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get number of lines written
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Get bytes written
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl Drop for OutputWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Ensure output directory exists
pub fn ensure_output_dir(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create output directory {:?}", path))?;
    }
    Ok(())
}
