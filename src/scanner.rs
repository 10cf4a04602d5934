//! Per-line match discovery
//!
//! A [`MatchEngine`] call yields every case-insensitive occurrence of an
//! indexed name inside one line: nested and overlapping occurrences
//! included, each destined to become its own mask line. Hits come back in
//! canonical order, ascending start offset with shorter spans first, so
//! every engine produces byte-identical downstream output.

use crate::automaton::MaskAutomaton;
use crate::cli::EngineKind;
use crate::trie::NameTrie;

/// One occurrence of an indexed name inside a line.
///
/// `start` and `len` are byte offsets into the original line. Matched
/// spans consist of ASCII letters only, so both boundaries are always
/// valid char boundaries and `len` equals the number of characters to
/// replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hit {
    pub start: usize,
    pub len: usize,
}

impl Hit {
    /// Byte range of the matched span.
    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.len
    }

    /// The matched text exactly as it appears in the line.
    #[inline]
    pub fn text<'l>(&self, line: &'l str) -> &'l str {
        &line[self.range()]
    }
}

/// A scan backend. Built once per run and shared read-only across worker
/// threads.
pub trait MatchEngine: Send + Sync {
    /// Clears `hits` and fills it with every occurrence in `line`,
    /// canonically ordered. The buffer is caller-owned so a scan loop can
    /// reuse one allocation across millions of lines.
    fn find_hits(&self, line: &str, hits: &mut Vec<Hit>);
}

impl MatchEngine for NameTrie {
    fn find_hits(&self, line: &str, hits: &mut Vec<Hit>) {
        hits.clear();
        // One descent per start offset. Each descent reports its own hits
        // shortest first, so the combined sequence is already canonical.
        for start in 0..line.len() {
            hits.extend(self.walk(line, start));
        }
    }
}

/// Builds the engine selected on the command line, consuming the index.
/// The automaton visits each byte once; the per-offset trie walk is kept
/// as the reference backend the automaton is checked against.
pub fn build_engine(kind: EngineKind, trie: NameTrie) -> Box<dyn MatchEngine> {
    match kind {
        EngineKind::Trie => Box::new(trie),
        EngineKind::Automaton => Box::new(MaskAutomaton::compile(&trie)),
    }
}

/// Restores canonical order for engines that discover hits end-first.
pub(crate) fn sort_canonical(hits: &mut [Hit]) {
    hits.sort_unstable_by_key(|hit| (hit.start, hit.len));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trie_of(names: &[&str]) -> NameTrie {
        let mut trie = NameTrie::new();
        for name in names {
            trie.insert(name).unwrap();
        }
        trie
    }

    fn hits_of(engine: &dyn MatchEngine, line: &str) -> Vec<(usize, usize)> {
        let mut hits = Vec::new();
        engine.find_hits(line, &mut hits);
        hits.iter().map(|h| (h.start, h.len)).collect()
    }

    #[test]
    fn nested_names_produce_one_hit_each() {
        let trie = trie_of(&["ann", "anna"]);
        assert_eq!(hits_of(&trie, "Annabelle"), vec![(0, 3), (0, 4)]);
    }

    #[test]
    fn overlapping_starts_are_independent() {
        let trie = trie_of(&["ann", "anna", "nanna"]);
        // "annanna": ann@0, anna@0, nanna@2, ann@3, anna@3
        assert_eq!(
            hits_of(&trie, "annanna"),
            vec![(0, 3), (0, 4), (2, 5), (3, 3), (3, 4)]
        );
    }

    #[test]
    fn canonical_order_is_start_major_then_shortest() {
        let trie = trie_of(&["ab", "b"]);
        assert_eq!(hits_of(&trie, "ab"), vec![(0, 2), (1, 1)]);
    }

    #[test]
    fn multibyte_prefix_offsets_are_byte_accurate() {
        let trie = trie_of(&["ann"]);
        let line = "héllo ann";
        let hits = hits_of(&trie, line);
        assert_eq!(hits, vec![(7, 3)]);

        let hit = Hit { start: 7, len: 3 };
        assert_eq!(hit.text(line), "ann");
        assert_eq!(hit.range(), 7..10);
    }

    #[test]
    fn hit_buffer_is_cleared_between_lines() {
        let trie = trie_of(&["max"]);
        let mut hits = Vec::new();
        trie.find_hits("maxmax", &mut hits);
        assert_eq!(hits.len(), 2);
        trie.find_hits("nothing here", &mut hits);
        assert!(hits.is_empty());
    }

    #[test]
    fn engine_factory_backends_agree() {
        let lines = ["Annabelle", "maxwell", "abcd", "no names", ""];
        let build = |kind| build_engine(kind, trie_of(&["ann", "anna", "max", "abcd", "bc"]));
        let trie_engine = build(EngineKind::Trie);
        let automaton_engine = build(EngineKind::Automaton);
        for line in lines {
            assert_eq!(
                hits_of(trie_engine.as_ref(), line),
                hits_of(automaton_engine.as_ref(), line),
                "line {:?}",
                line
            );
        }
    }
}
