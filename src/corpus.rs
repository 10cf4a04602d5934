//! Corpus access
//!
//! Streams a wordlist as decoded line records: memory-mapped input, `\n`
//! and `\r\n` terminators, invalid UTF-8 byte sequences dropped. Password
//! dumps are hostile data and a damaged line must not stop a multi-hour
//! scan. Lines that already contain the placeholder character are
//! discarded here, before the scanner ever sees them, so previously
//! masked output can never be re-masked.

use std::borrow::Cow;
use std::fs::File;
use std::path::Path;

use anyhow::Context;
use memmap2::Mmap;

/// Raw line records over a byte source, terminators stripped. End of
/// input is known up front, which is what lets a run finalize its report.
pub struct LineReader {
    source: Source,
    pos: usize,
}

enum Source {
    Mapped(Mmap),
    Memory(Vec<u8>),
}

impl Source {
    #[inline]
    fn bytes(&self) -> &[u8] {
        match self {
            Source::Mapped(map) => map,
            Source::Memory(buf) => buf,
        }
    }
}

impl LineReader {
    /// Memory-maps a file. The page cache backs the scan directly and
    /// re-runs over a warm corpus skip the read syscalls entirely.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        // Safety: read-only mapping; the corpus is not expected to be
        // truncated while a scan is running.
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("Failed to memory-map {:?}", path))?;
        Ok(Self::new(Source::Mapped(mmap)))
    }

    /// Reads from an in-memory buffer. Test seam, also handy for piping
    /// small corpora through the library.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(Source::Memory(bytes.into()))
    }

    fn new(source: Source) -> Self {
        // Skip a UTF-8 BOM so it cannot pollute the first record.
        let pos = if source.bytes().starts_with(&[0xEF, 0xBB, 0xBF]) {
            3
        } else {
            0
        };
        Self { source, pos }
    }

    /// Total input size in bytes.
    pub fn len(&self) -> usize {
        self.source.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes consumed so far, suitable for progress reporting.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Next raw record with its terminator stripped, `None` at end of
    /// input. A final line without a terminator still counts as a record.
    pub fn next_raw(&mut self) -> Option<&[u8]> {
        let bytes = self.source.bytes();
        if self.pos >= bytes.len() {
            return None;
        }
        let rest = &bytes[self.pos..];
        let (line_end, advance) = match memchr::memchr(b'\n', rest) {
            Some(i) => (i, i + 1),
            None => (rest.len(), rest.len()),
        };
        self.pos += advance;
        let line = &rest[..line_end];
        Some(line.strip_suffix(b"\r").unwrap_or(line))
    }

    /// Next record decoded as UTF-8 with invalid sequences dropped. The
    /// flag is true when bytes had to be dropped.
    pub fn next_line(&mut self) -> Option<(String, bool)> {
        let raw = self.next_raw()?;
        Some(match decode_dropping(raw) {
            Cow::Borrowed(s) => (s.to_owned(), false),
            Cow::Owned(s) => (s, true),
        })
    }
}

/// Decodes bytes as UTF-8, dropping invalid sequences entirely rather
/// than substituting U+FFFD. A replacement char would otherwise be
/// indistinguishable from one genuinely present in the corpus. Borrowed
/// output means the input was clean.
pub fn decode_dropping(bytes: &[u8]) -> Cow<'_, str> {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(tail) => {
                out.push_str(tail);
                break;
            }
            Err(err) => {
                let valid = err.valid_up_to();
                out.push_str(std::str::from_utf8(&rest[..valid]).unwrap_or_default());
                match err.error_len() {
                    Some(skip) => rest = &rest[valid + skip..],
                    // Truncated sequence at the end of the record.
                    None => break,
                }
            }
        }
    }
    Cow::Owned(out)
}

/// A unit of scan work: decoded lines plus the byte span consumed to
/// assemble them, skipped lines included, for progress accounting.
#[derive(Debug)]
pub struct Batch {
    pub lines: Vec<String>,
    pub bytes: usize,
}

/// Line records ready for scanning, with the placeholder filter applied
/// and per-category counters kept as the read position advances.
pub struct CorpusReader {
    reader: LineReader,
    placeholder: u8,
    lines_read: u64,
    lines_skipped: u64,
    lines_damaged: u64,
}

impl CorpusReader {
    pub fn open(path: &Path, placeholder: char) -> anyhow::Result<Self> {
        Ok(Self::with_reader(LineReader::open(path)?, placeholder))
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>, placeholder: char) -> Self {
        Self::with_reader(LineReader::from_bytes(bytes), placeholder)
    }

    fn with_reader(reader: LineReader, placeholder: char) -> Self {
        // The CLI only admits ASCII placeholders; the raw-byte filter
        // below depends on that.
        debug_assert!(placeholder.is_ascii());
        Self {
            reader,
            placeholder: placeholder as u8,
            lines_read: 0,
            lines_skipped: 0,
            lines_damaged: 0,
        }
    }

    /// Next scannable line. Placeholder-bearing lines are counted and
    /// skipped, never returned.
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let raw = self.reader.next_raw()?;
            // Filtering on raw bytes is exact: the placeholder is ASCII,
            // so it can never appear inside a multi-byte sequence, and
            // dropped invalid bytes cannot create or destroy it.
            if memchr::memchr(self.placeholder, raw).is_some() {
                self.lines_skipped += 1;
                continue;
            }
            let decoded = decode_dropping(raw);
            self.lines_read += 1;
            return Some(match decoded {
                Cow::Borrowed(s) => s.to_owned(),
                Cow::Owned(s) => {
                    self.lines_damaged += 1;
                    s
                }
            });
        }
    }

    /// Reads up to `max_lines` scannable lines as one work unit, `None`
    /// once the input is exhausted. A batch can come back with no lines
    /// when the tail of the corpus was all skipped; its byte span still
    /// advances progress.
    pub fn next_batch(&mut self, max_lines: usize) -> Option<Batch> {
        let max_lines = max_lines.max(1);
        let start = self.reader.position();
        let mut lines = Vec::with_capacity(max_lines);
        while lines.len() < max_lines {
            match self.next_line() {
                Some(line) => lines.push(line),
                None => break,
            }
        }
        let consumed = self.reader.position() - start;
        if lines.is_empty() && consumed == 0 {
            return None;
        }
        Some(Batch {
            lines,
            bytes: consumed,
        })
    }

    /// Total input size in bytes.
    pub fn len(&self) -> usize {
        self.reader.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reader.is_empty()
    }

    /// Lines handed to the scanner so far.
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Lines discarded because they already contained the placeholder.
    pub fn lines_skipped(&self) -> u64 {
        self.lines_skipped
    }

    /// Lines that lost bytes to UTF-8 repair.
    pub fn lines_damaged(&self) -> u64 {
        self.lines_damaged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn collect_lines(mut reader: CorpusReader) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(line) = reader.next_line() {
            out.push(line);
        }
        out
    }

    #[test]
    fn splits_lines_and_strips_terminators() {
        let reader = CorpusReader::from_bytes("one\ntwo\r\nthree", '|');
        assert_eq!(collect_lines(reader), vec!["one", "two", "three"]);
    }

    #[test]
    fn empty_lines_are_records_too() {
        let reader = CorpusReader::from_bytes("a\n\nb\n", '|');
        assert_eq!(collect_lines(reader), vec!["a", "", "b"]);
    }

    #[test]
    fn trailing_newline_does_not_add_a_record() {
        let reader = CorpusReader::from_bytes("a\nb\n", '|');
        assert_eq!(collect_lines(reader).len(), 2);
    }

    #[test]
    fn skips_lines_carrying_the_placeholder() {
        let mut reader = CorpusReader::from_bytes("clean\nal|ready\n|||\nmore\n", '|');
        let mut out = Vec::new();
        while let Some(line) = reader.next_line() {
            out.push(line);
        }
        assert_eq!(out, vec!["clean", "more"]);
        assert_eq!(reader.lines_skipped(), 2);
        assert_eq!(reader.lines_read(), 2);
    }

    #[test]
    fn custom_placeholder_drives_the_filter() {
        let reader = CorpusReader::from_bytes("a#b\nplain\n", '#');
        assert_eq!(collect_lines(reader), vec!["plain"]);
    }

    #[test]
    fn invalid_bytes_are_dropped_not_replaced() {
        let mut reader = CorpusReader::from_bytes(b"pa\xFFss\nok\n".to_vec(), '|');
        assert_eq!(reader.next_line().unwrap(), "pass");
        assert_eq!(reader.next_line().unwrap(), "ok");
        assert_eq!(reader.lines_damaged(), 1);
    }

    #[test]
    fn genuine_replacement_char_survives() {
        let reader = CorpusReader::from_bytes("pa\u{FFFD}ss\n", '|');
        assert_eq!(collect_lines(reader), vec!["pa\u{FFFD}ss"]);
    }

    #[test]
    fn multibyte_text_decodes_intact() {
        let mut reader = CorpusReader::from_bytes("héllo\npässwörter\n", '|');
        assert_eq!(reader.next_line().unwrap(), "héllo");
        assert_eq!(reader.next_line().unwrap(), "pässwörter");
        assert_eq!(reader.lines_damaged(), 0);
    }

    #[test]
    fn bom_is_invisible_to_the_first_record() {
        let reader = CorpusReader::from_bytes(b"\xEF\xBB\xBFfirst\nsecond\n".to_vec(), '|');
        assert_eq!(collect_lines(reader), vec!["first", "second"]);
    }

    #[test]
    fn batches_cover_every_byte_once() {
        let data = "aaaa\nbb\ncccccc\nd\nee\n";
        let mut reader = CorpusReader::from_bytes(data, '|');
        let mut lines = 0usize;
        let mut bytes = 0usize;
        while let Some(batch) = reader.next_batch(2) {
            assert!(batch.lines.len() <= 2);
            lines += batch.lines.len();
            bytes += batch.bytes;
        }
        assert_eq!(lines, 5);
        assert_eq!(bytes, data.len());
    }

    #[test]
    fn skipped_tail_still_advances_progress() {
        let mut reader = CorpusReader::from_bytes("keep\nsk|ip\nsk|ip\n", '|');
        let first = reader.next_batch(8).unwrap();
        assert_eq!(first.lines, vec!["keep".to_string()]);
        assert_eq!(first.bytes, "keep\nsk|ip\nsk|ip\n".len());
        assert!(reader.next_batch(8).is_none());
    }

    #[test]
    fn empty_input_yields_nothing() {
        let mut reader = CorpusReader::from_bytes("", '|');
        assert!(reader.next_line().is_none());
        assert!(reader.next_batch(4).is_none());
        assert!(reader.is_empty());
    }

    #[test]
    fn open_maps_a_real_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "alpha\nbeta\n").unwrap();

        let mut reader = CorpusReader::open(file.path(), '|').unwrap();
        assert_eq!(reader.len(), 11);
        assert_eq!(reader.next_line().unwrap(), "alpha");
        assert_eq!(reader.next_line().unwrap(), "beta");
        assert!(reader.next_line().is_none());
    }

    #[test]
    fn open_fails_for_missing_file() {
        assert!(CorpusReader::open(Path::new("/nonexistent/words.txt"), '|').is_err());
    }

    #[test]
    fn decode_dropping_borrows_clean_input() {
        assert!(matches!(decode_dropping(b"clean"), Cow::Borrowed("clean")));
    }

    #[test]
    fn decode_dropping_skips_each_bad_sequence() {
        assert_eq!(decode_dropping(b"a\xFF\xFEb"), "ab");
        assert_eq!(decode_dropping(b"caf\xE9 au lait"), "caf au lait");
        // Truncated multi-byte tail.
        assert_eq!(decode_dropping(b"abc\xE2\x82"), "abc");
    }

    #[test]
    fn raw_reader_reports_position() {
        let mut reader = LineReader::from_bytes("ab\ncd\n");
        assert_eq!(reader.position(), 0);
        reader.next_raw().unwrap();
        assert_eq!(reader.position(), 3);
        reader.next_raw().unwrap();
        assert_eq!(reader.position(), 6);
        assert!(reader.next_raw().is_none());
    }
}
