//! Frequency aggregation and the ranked-name report
//!
//! Counts how often each canonical name matched across the corpus and
//! renders the statistics file, most frequent first. Tables are plain
//! values: each worker fills its own and the pipeline merges them once,
//! so nothing here needs a lock.

use std::fmt::Write;

use ahash::RandomState;
use hashbrown::HashMap;

use crate::scanner::Hit;

/// Per-run occurrence counts keyed by canonical (lower-case) name.
#[derive(Debug, Default)]
pub struct FrequencyTable {
    counts: HashMap<String, u64, RandomState>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self {
            counts: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Records one hit: the matched span, lower-cased, is the counted key.
    pub fn record_span(&mut self, line: &str, hit: Hit) {
        self.record(&hit.text(line).to_ascii_lowercase());
    }

    /// Bumps the count for an already-canonical name. Only allocates the
    /// key on first sight.
    pub fn record(&mut self, name: &str) {
        if let Some(count) = self.counts.get_mut(name) {
            *count += 1;
        } else {
            self.counts.insert(name.to_owned(), 1);
        }
    }

    /// Folds another table into this one.
    pub fn merge(&mut self, other: FrequencyTable) {
        for (name, count) in other.counts {
            *self.counts.entry(name).or_insert(0) += count;
        }
    }

    pub fn get(&self, name: &str) -> u64 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Total hits recorded; equals the number of mask lines written.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries sorted for the report: descending count, ties broken
    /// alphabetically so sequential and parallel runs render identically.
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self
            .counts
            .iter()
            .map(|(name, &count)| (name.as_str(), count))
            .collect();
        entries.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Renders the statistics file: one `"<count> <name>"` line per entry
    /// with counts right-aligned to the widest count. An empty table
    /// renders an empty string; the file still gets created.
    pub fn render_report(&self) -> String {
        let entries = self.ranked();
        let Some(&(_, max_count)) = entries.first() else {
            return String::new();
        };
        let width = decimal_width(max_count);
        let mut out = String::with_capacity(entries.len() * (width + 12));
        for (name, count) in entries {
            let _ = writeln!(out, "{count:>width$} {name}");
        }
        out
    }
}

/// Digits needed to print `n` in decimal.
fn decimal_width(n: u64) -> usize {
    let mut width = 1;
    let mut n = n / 10;
    while n > 0 {
        width += 1;
        n /= 10;
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_span_counts_canonical_names() {
        let mut table = FrequencyTable::new();
        table.record_span("Annabelle", Hit { start: 0, len: 3 });
        table.record_span("XANNAX", Hit { start: 1, len: 4 });
        table.record_span("ann2000", Hit { start: 0, len: 3 });

        assert_eq!(table.get("ann"), 2);
        assert_eq!(table.get("anna"), 1);
        assert_eq!(table.get("Ann"), 0);
        assert_eq!(table.total(), 3);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn merge_sums_overlapping_names() {
        let mut left = FrequencyTable::new();
        left.record("ann");
        left.record("ann");
        left.record("max");

        let mut right = FrequencyTable::new();
        right.record("ann");
        right.record("zoe");

        left.merge(right);
        assert_eq!(left.get("ann"), 3);
        assert_eq!(left.get("max"), 1);
        assert_eq!(left.get("zoe"), 1);
        assert_eq!(left.total(), 5);
    }

    #[test]
    fn ranked_breaks_count_ties_alphabetically() {
        let mut table = FrequencyTable::new();
        for _ in 0..5 {
            table.record("zoe");
        }
        for _ in 0..2 {
            table.record("bob");
            table.record("ann");
        }

        assert_eq!(
            table.ranked(),
            vec![("zoe", 5), ("ann", 2), ("bob", 2)]
        );
    }

    #[test]
    fn report_right_aligns_counts() {
        let mut table = FrequencyTable::new();
        for _ in 0..100 {
            table.record("ann");
        }
        table.record("max");
        table.record("max");

        assert_eq!(table.render_report(), "100 ann\n  2 max\n");
    }

    #[test]
    fn empty_table_renders_empty_report() {
        assert_eq!(FrequencyTable::new().render_report(), "");
    }

    #[test]
    fn single_entry_report_has_no_padding() {
        let mut table = FrequencyTable::new();
        table.record("lee");
        assert_eq!(table.render_report(), "1 lee\n");
    }

    #[test]
    fn decimal_width_handles_powers_of_ten() {
        assert_eq!(decimal_width(0), 1);
        assert_eq!(decimal_width(9), 1);
        assert_eq!(decimal_width(10), 2);
        assert_eq!(decimal_width(99), 2);
        assert_eq!(decimal_width(100), 3);
        assert_eq!(decimal_width(1_000_000), 7);
    }
}
