//! Failure-link automaton over the pattern index
//!
//! Compiles the name trie into an Aho-Corasick automaton so a single pass
//! over each line finds every occurrence the per-offset trie walk would
//! find, at a cost independent of the number of indexed names. Output
//! links chain suffix matches, which is how nested names surface from one
//! scan position.

use std::collections::VecDeque;

use crate::scanner::{sort_canonical, Hit, MatchEngine};
use crate::trie::{NameTrie, ALPHABET_SIZE};

/// The root state. Doubles as the "no link" sentinel for output chains,
/// which is sound because the root is never terminal.
const ROOT: u32 = 0;

#[derive(Debug, Clone)]
struct State {
    /// Total transition row after linking: one successor per folded letter.
    next: [u32; ALPHABET_SIZE],
    /// Longest proper suffix of this state's path that is also a path.
    fail: u32,
    /// Nearest terminal state along the fail chain, `ROOT` when none.
    output: u32,
    /// Distance from the root; the matched name length when terminal.
    depth: u32,
    terminal: bool,
}

impl State {
    fn new(depth: u32) -> Self {
        Self {
            next: [ROOT; ALPHABET_SIZE],
            fail: ROOT,
            output: ROOT,
            depth,
            terminal: false,
        }
    }
}

/// Flattened scan engine. Shares the trie's match semantics exactly; only
/// the discovery order differs, and [`MatchEngine::find_hits`] restores
/// the canonical order before returning.
#[derive(Debug)]
pub struct MaskAutomaton {
    states: Vec<State>,
    pattern_count: usize,
}

impl MaskAutomaton {
    /// Compiles the automaton from an already-validated name set.
    pub fn compile(trie: &NameTrie) -> Self {
        let mut automaton = Self {
            states: vec![State::new(0)],
            pattern_count: trie.pattern_count(),
        };
        for name in trie.patterns() {
            automaton.add(&name);
        }
        automaton.link();
        automaton
    }

    /// Extends the goto structure with one canonical (lower-case) name.
    /// Before linking, `ROOT` in a transition row means "no edge".
    fn add(&mut self, name: &str) {
        let mut state = ROOT as usize;
        for byte in name.bytes() {
            let slot = (byte - b'a') as usize;
            let existing = self.states[state].next[slot];
            state = if existing == ROOT {
                let id = self.states.len() as u32;
                let depth = self.states[state].depth + 1;
                self.states.push(State::new(depth));
                self.states[state].next[slot] = id;
                id as usize
            } else {
                existing as usize
            };
        }
        self.states[state].terminal = true;
    }

    /// Breadth-first pass that fills failure links, output links, and
    /// closes every transition row into a total function. Parents are
    /// always finished before their children, so each state can read its
    /// fail state's completed row.
    fn link(&mut self) {
        let mut queue = VecDeque::new();
        for slot in 0..ALPHABET_SIZE {
            let child = self.states[ROOT as usize].next[slot];
            if child != ROOT {
                self.states[child as usize].fail = ROOT;
                queue.push_back(child);
            }
        }
        while let Some(id) = queue.pop_front() {
            let fail = self.states[id as usize].fail as usize;
            self.states[id as usize].output = if self.states[fail].terminal {
                fail as u32
            } else {
                self.states[fail].output
            };
            for slot in 0..ALPHABET_SIZE {
                let child = self.states[id as usize].next[slot];
                if child != ROOT {
                    self.states[child as usize].fail = self.states[fail].next[slot];
                    queue.push_back(child);
                } else {
                    self.states[id as usize].next[slot] = self.states[fail].next[slot];
                }
            }
        }
    }

    /// Number of distinct names the automaton was compiled from.
    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }

    /// Number of automaton states including the root.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }
}

impl MatchEngine for MaskAutomaton {
    fn find_hits(&self, line: &str, hits: &mut Vec<Hit>) {
        hits.clear();
        let mut state = ROOT as usize;
        for (pos, byte) in line.bytes().enumerate() {
            state = if byte.is_ascii_alphabetic() {
                let slot = (byte.to_ascii_lowercase() - b'a') as usize;
                self.states[state].next[slot] as usize
            } else {
                // No name crosses a non-letter byte.
                ROOT as usize
            };
            let end = pos + 1;
            let current = &self.states[state];
            if current.terminal {
                let len = current.depth as usize;
                hits.push(Hit {
                    start: end - len,
                    len,
                });
            }
            let mut out = current.output;
            while out != ROOT {
                let suffix = &self.states[out as usize];
                let len = suffix.depth as usize;
                hits.push(Hit {
                    start: end - len,
                    len,
                });
                out = suffix.output;
            }
        }
        // Discovery order is by end offset; callers expect start-major.
        sort_canonical(hits);
    }
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
    fn matches_trie_walk_on_tricky_inputs() {
        let cases: &[(&[&str], &[&str])] = &[
            (&["ann", "anna"], &["Annabelle", "xanna x", "annann"]),
            (&["abcd", "bc"], &["abcd", "zabcdz"]),
            (&["a", "aa", "aaa"], &["aaaa", "a", ""]),
            (&["b", "ab"], &["ab", "bab"]),
            (&["max"], &["maxwell", "MAXWELL", "mamax"]),
            (&["anna"], &["an-na", "ann"]),
        ];
        for (names, lines) in cases {
            let trie = trie_of(names);
            let automaton = MaskAutomaton::compile(&trie);
            for line in *lines {
                assert_eq!(
                    hits_of(&automaton, line),
                    hits_of(&trie, line),
                    "names {:?} line {:?}",
                    names,
                    line
                );
            }
        }
    }

    #[test]
    fn output_links_surface_suffix_matches() {
        let automaton = MaskAutomaton::compile(&trie_of(&["anna", "nn"]));
        assert_eq!(hits_of(&automaton, "anna"), vec![(0, 4), (1, 2)]);
    }

    #[test]
    fn non_letters_reset_the_state() {
        let automaton = MaskAutomaton::compile(&trie_of(&["anna"]));
        assert!(hits_of(&automaton, "an!na").is_empty());
        assert_eq!(hits_of(&automaton, "x7anna").len(), 1);
    }

    #[test]
    fn empty_pattern_set_matches_nothing() {
        let automaton = MaskAutomaton::compile(&NameTrie::new());
        assert_eq!(automaton.state_count(), 1);
        assert!(hits_of(&automaton, "anything at all").is_empty());
    }

    #[test]
    fn shared_prefixes_share_states() {
        let automaton = MaskAutomaton::compile(&trie_of(&["ann", "anna", "ANNA"]));
        // root, a, an, ann, anna
        assert_eq!(automaton.state_count(), 5);
        assert_eq!(automaton.pattern_count(), 2);
    }
}
