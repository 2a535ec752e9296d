// src/tally.rs
use indexmap::IndexMap;
use std::io::{self, Write};

/// Occurrence counts of distinct rendered outputs.
///
/// Insertion order is kept, so equal counts report in first-seen order.
#[derive(Debug, Default, Clone)]
pub struct TallyTable {
    counts: IndexMap<String, usize>,
}

impl TallyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rendered: String) {
        *self.counts.entry(rendered).or_insert(0) += 1;
    }

    /// Number of distinct outputs
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count(&self, rendered: &str) -> usize {
        self.counts.get(rendered).copied().unwrap_or(0)
    }

    /// Entries in ascending order of count
    pub fn sorted(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> =
            self.counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by_key(|(_, count)| *count);
        entries
    }

    /// Write `count text` lines, counts right-aligned to one more column than
    /// the widest count needs
    pub fn write_report<W: Write>(&self, output: &mut W) -> io::Result<()> {
        let max = self.counts.values().copied().max().unwrap_or(0);
        let width = max.to_string().len() + 1;
        for (text, count) in self.sorted() {
            writeln!(output, "{:>width$} {}", count, text, width = width)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascending_by_count() {
        let mut tally = TallyTable::new();
        tally.add("a".to_string());
        tally.add("a".to_string());
        tally.add("b".to_string());

        assert_eq!(tally.sorted(), vec![("b", 1), ("a", 2)]);

        let mut out = Vec::new();
        tally.write_report(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), " 1 b\n 2 a\n");
    }

    #[test]
    fn test_width_tracks_largest_count() {
        let mut tally = TallyTable::new();
        for _ in 0..12 {
            tally.add("GET /sync".to_string());
        }
        tally.add("PUT /send".to_string());

        let mut out = Vec::new();
        tally.write_report(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "  1 PUT /send\n 12 GET /sync\n"
        );
        assert_eq!(tally.count("GET /sync"), 12);
        assert_eq!(tally.count("missing"), 0);
    }

    #[test]
    fn test_empty_report() {
        let tally = TallyTable::new();
        let mut out = Vec::new();
        tally.write_report(&mut out).unwrap();
        assert!(out.is_empty());
        assert!(tally.is_empty());
    }
}
