//! Pattern index over person names
//!
//! A 26-way character trie holding the canonical (lower-case) form of every
//! name to search for. Matching is case-insensitive: lookups fold each line
//! byte before descending, while the line itself is never rewritten.

use std::path::Path;

use anyhow::Context;
use thiserror::Error;

use crate::scanner::Hit;

/// Number of characters a node can branch on (`a`-`z`).
pub const ALPHABET_SIZE: usize = 26;

/// Error raised when a name cannot be indexed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// Empty names are not representable: the root node is never terminal.
    #[error("pattern is empty")]
    Empty,

    /// The name holds a character outside the ASCII letter alphabet.
    #[error("pattern {pattern:?} contains unsupported character {found:?} (only ASCII letters are allowed)")]
    InvalidChar { pattern: String, found: char },
}

/// Checks that `pattern` is a valid name: non-empty, ASCII letters only.
pub fn validate_pattern(pattern: &str) -> Result<(), PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }
    for ch in pattern.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(PatternError::InvalidChar {
                pattern: pattern.to_string(),
                found: ch,
            });
        }
    }
    Ok(())
}

/// Maps a line byte onto a child slot, case-folded. Bytes outside the
/// ASCII letter range have no slot and end any descent.
#[inline]
fn slot_of(byte: u8) -> Option<usize> {
    if byte.is_ascii_alphabetic() {
        Some((byte.to_ascii_lowercase() - b'a') as usize)
    } else {
        None
    }
}

const NO_CHILD: Option<Box<TrieNode>> = None;

#[derive(Debug)]
struct TrieNode {
    /// Children keyed by lower-case letter; the fixed table keeps
    /// iteration order deterministic without any sorting.
    children: [Option<Box<TrieNode>>; ALPHABET_SIZE],
    /// True when the path from the root to this node spells a complete
    /// indexed name.
    terminal: bool,
}

impl TrieNode {
    fn new() -> Self {
        Self {
            children: [NO_CHILD; ALPHABET_SIZE],
            terminal: false,
        }
    }

    #[inline]
    fn child(&self, slot: usize) -> Option<&TrieNode> {
        self.children[slot].as_deref()
    }
}

/// The indexed name set. Built once before a scan, immutable afterwards,
/// safe to share read-only across worker threads.
#[derive(Debug)]
pub struct NameTrie {
    root: TrieNode,
    pattern_count: usize,
    max_len: usize,
}

impl NameTrie {
    pub fn new() -> Self {
        Self {
            root: TrieNode::new(),
            pattern_count: 0,
            max_len: 0,
        }
    }

    /// Indexes one name, folding it to lower case. Inserting a name twice
    /// is a no-op. The whole name is validated before any node is touched,
    /// so a failed insert never leaves a partial path behind.
    pub fn insert(&mut self, pattern: &str) -> Result<(), PatternError> {
        validate_pattern(pattern)?;
        let mut node = &mut self.root;
        for byte in pattern.bytes() {
            let slot = (byte.to_ascii_lowercase() - b'a') as usize;
            node = node.children[slot].get_or_insert_with(|| Box::new(TrieNode::new()));
        }
        if !node.terminal {
            node.terminal = true;
            self.pattern_count += 1;
            self.max_len = self.max_len.max(pattern.len());
        }
        Ok(())
    }

    /// Lazily yields a hit for every complete name found while descending
    /// from byte offset `start`, shortest first. The descent keeps going
    /// after a hit, so nested names ("ann" inside "anna") are all reported.
    pub fn walk<'t, 'l>(&'t self, line: &'l str, start: usize) -> Walk<'t, 'l> {
        Walk {
            node: Some(&self.root),
            line: line.as_bytes(),
            start,
            pos: start,
        }
    }

    /// True when the canonical form of `pattern` is indexed.
    pub fn contains(&self, pattern: &str) -> bool {
        let mut node = &self.root;
        for byte in pattern.bytes() {
            match slot_of(byte).and_then(|slot| node.child(slot)) {
                Some(child) => node = child,
                None => return false,
            }
        }
        node.terminal
    }

    /// Number of distinct names indexed.
    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }

    /// Length of the longest indexed name.
    pub fn max_pattern_len(&self) -> usize {
        self.max_len
    }

    pub fn is_empty(&self) -> bool {
        self.pattern_count == 0
    }

    /// Every indexed name in canonical form, alphabetically ordered.
    /// Explicit-stack traversal; names are short but the discipline is
    /// uniform with the walk.
    pub fn patterns(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.pattern_count);
        let mut prefix = String::new();
        let mut stack: Vec<(&TrieNode, usize)> = vec![(&self.root, 0)];
        while let Some(frame) = stack.last_mut() {
            let (node, slot) = *frame;
            if slot < ALPHABET_SIZE {
                frame.1 += 1;
                if let Some(child) = node.child(slot) {
                    prefix.push((b'a' + slot as u8) as char);
                    if child.terminal {
                        out.push(prefix.clone());
                    }
                    stack.push((child, 0));
                }
            } else {
                stack.pop();
                prefix.pop();
            }
        }
        out
    }
}

impl Default for NameTrie {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator state of one trie descent. Ends silently at the line end or at
/// the first byte with no matching child.
pub struct Walk<'t, 'l> {
    node: Option<&'t TrieNode>,
    line: &'l [u8],
    start: usize,
    pos: usize,
}

impl Iterator for Walk<'_, '_> {
    type Item = Hit;

    fn next(&mut self) -> Option<Hit> {
        loop {
            let node = self.node?;
            let byte = *self.line.get(self.pos)?;
            let slot = slot_of(byte)?;
            match node.child(slot) {
                Some(child) => {
                    self.node = Some(child);
                    self.pos += 1;
                    if child.terminal {
                        return Some(Hit {
                            start: self.start,
                            len: self.pos - self.start,
                        });
                    }
                }
                None => {
                    self.node = None;
                    return None;
                }
            }
        }
    }
}

/// Builds the index from a pattern file: one name per line, terminators
/// stripped, blank lines skipped. Any invalid name aborts the load before
/// scanning can start.
pub fn load_patterns(path: &Path) -> anyhow::Result<NameTrie> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pattern file {:?}", path))?;
    let mut trie = NameTrie::new();
    for (lineno, name) in text.lines().enumerate() {
        if name.is_empty() {
            continue;
        }
        trie.insert(name)
            .with_context(|| format!("Invalid pattern on line {} of {:?}", lineno + 1, path))?;
    }
    Ok(trie)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn collect_walk(trie: &NameTrie, line: &str, start: usize) -> Vec<(usize, usize)> {
        trie.walk(line, start).map(|h| (h.start, h.len)).collect()
    }

    #[test]
    fn insert_folds_case() {
        let mut trie = NameTrie::new();
        trie.insert("Anna").unwrap();

        assert!(trie.contains("anna"));
        assert!(trie.contains("ANNA"));
        assert_eq!(trie.pattern_count(), 1);
        assert_eq!(trie.max_pattern_len(), 4);
    }

    #[test]
    fn insert_rejects_empty() {
        let mut trie = NameTrie::new();
        assert_eq!(trie.insert(""), Err(PatternError::Empty));
    }

    #[test]
    fn insert_rejects_non_letters() {
        let mut trie = NameTrie::new();
        let err = trie.insert("ann3").unwrap_err();
        assert_eq!(
            err,
            PatternError::InvalidChar {
                pattern: "ann3".to_string(),
                found: '3',
            }
        );
    }

    #[test]
    fn failed_insert_leaves_trie_untouched() {
        let mut trie = NameTrie::new();
        trie.insert("max").unwrap();

        assert!(trie.insert("ann-marie").is_err());
        assert_eq!(trie.pattern_count(), 1);
        assert!(!trie.contains("ann"));
        assert!(collect_walk(&trie, "annmarie", 0).is_empty());
    }

    #[test]
    fn insert_is_idempotent() {
        let mut trie = NameTrie::new();
        trie.insert("lee").unwrap();
        trie.insert("lee").unwrap();
        trie.insert("LEE").unwrap();

        assert_eq!(trie.pattern_count(), 1);
        assert_eq!(trie.patterns(), vec!["lee".to_string()]);
    }

    #[test]
    fn walk_reports_nested_names() {
        let mut trie = NameTrie::new();
        trie.insert("ann").unwrap();
        trie.insert("anna").unwrap();

        assert_eq!(collect_walk(&trie, "Annabelle", 0), vec![(0, 3), (0, 4)]);
    }

    #[test]
    fn walk_starts_mid_line() {
        let mut trie = NameTrie::new();
        trie.insert("max").unwrap();

        assert_eq!(collect_walk(&trie, "xxmaxwell", 2), vec![(2, 3)]);
        assert!(collect_walk(&trie, "xxmaxwell", 0).is_empty());
        assert!(collect_walk(&trie, "max", 3).is_empty());
    }

    #[test]
    fn walk_stops_at_non_letters() {
        let mut trie = NameTrie::new();
        trie.insert("anna").unwrap();

        assert!(collect_walk(&trie, "an-na", 0).is_empty());
        assert!(collect_walk(&trie, "ann", 0).is_empty());
    }

    #[test]
    fn patterns_list_is_alphabetical() {
        let mut trie = NameTrie::new();
        for name in ["zoe", "anna", "bob", "ann"] {
            trie.insert(name).unwrap();
        }

        assert_eq!(trie.patterns(), vec!["ann", "anna", "bob", "zoe"]);
    }

    #[test]
    fn load_patterns_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "Ann\nmax\n\nlee\n").unwrap();

        let trie = load_patterns(file.path()).unwrap();
        assert_eq!(trie.pattern_count(), 3);
        assert!(trie.contains("ann"));
        assert!(trie.contains("lee"));
    }

    #[test]
    fn load_patterns_fails_on_invalid_name() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "ann\nb0b\n").unwrap();

        let err = load_patterns(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn load_patterns_fails_on_missing_file() {
        assert!(load_patterns(Path::new("/nonexistent/names.txt")).is_err());
    }
}
