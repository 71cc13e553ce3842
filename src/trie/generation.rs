//------------ Generation ------------------------------------------------------
//!
//! An immutable, fully-built trie published by the builder. Readers hold
//! `Arc<Generation>` clones for the duration of one query; the old
//! generation is reclaimed by ordinary `Arc` drop once the last clone
//! goes away, satisfying the "shared reference valid for one query,
//! destroyed only when none remain" lifecycle rule in §3.

use crate::phrase::{Suggestion, SnapshotRecord};
use crate::trie::node::Node;

/// A fully-built, read-only trie generation for one shard.
#[derive(Debug, Clone)]
pub struct Generation {
    pub(crate) nodes: Vec<Node>,
    pub version: u64,
}

impl Generation {
    /// An empty generation, the initial state of every shard before its
    /// first rebuild.
    pub fn empty(version: u64) -> Self {
        Self { nodes: vec![Node::empty()], version }
    }

    /// Builds a generation from a snapshot already sorted by
    /// (count desc, phrase asc), per §4.7 step 1. Callers that cannot
    /// guarantee the sort should use `build_unsorted` instead.
    pub fn build_from_sorted(snapshot: &[SnapshotRecord], top_k: usize, version: u64) -> Self {
        let mut gen = Self::empty(version);
        for record in snapshot {
            gen.insert_sorted(record, top_k);
        }
        gen
    }

    /// Sorts a snapshot by (count desc, phrase asc) and builds from it.
    /// This is what `IndexBuilder` calls; `build_from_sorted` is exposed
    /// separately so tests can assert on the sort step independently.
    pub fn build_unsorted(snapshot: &mut [SnapshotRecord], top_k: usize, version: u64) -> Self {
        snapshot.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.phrase.cmp(&b.phrase)));
        Self::build_from_sorted(snapshot, top_k, version)
    }

    fn insert_sorted(&mut self, record: &SnapshotRecord, top_k: usize) {
        let suggestion = Suggestion {
            phrase: record.phrase.clone(),
            count: record.count,
            last_updated_ms: record.last_updated_ms,
            category: record.category.clone(),
        };

        let mut current = 0u32;
        self.nodes[current as usize].push_sorted(&suggestion, top_k);
        for c in record.phrase.chars() {
            let next = match self.nodes[current as usize].children.get(&c) {
                Some(&idx) => idx,
                None => {
                    let idx = self.nodes.len() as u32;
                    self.nodes.push(Node::empty());
                    self.nodes[current as usize].children.insert(c, idx);
                    idx
                }
            };
            current = next;
            self.nodes[current as usize].push_sorted(&suggestion, top_k);
        }
        self.nodes[current as usize].is_terminal = true;
        self.nodes[current as usize].terminal_count = record.count;
    }

    /// Walks `prefix` and returns the node's cached top-k list, or an
    /// empty slice if the path doesn't exist. `prefix` must already be
    /// normalized by the caller (see `normalize::normalize`).
    pub fn lookup(&self, prefix: &str) -> &[Suggestion] {
        let mut current = 0u32;
        for c in prefix.chars() {
            match self.nodes[current as usize].children.get(&c) {
                Some(&idx) => current = idx,
                None => return &[],
            }
        }
        &self.nodes[current as usize].top_k
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(phrase: &str, count: u64) -> SnapshotRecord {
        SnapshotRecord { phrase: phrase.to_string(), count, last_updated_ms: 0, category: None }
    }

    #[test]
    fn s1_simple_top_k() {
        let snapshot = vec![
            rec("apple", 100),
            rec("application", 80),
            rec("apply", 60),
            rec("apricot", 40),
            rec("banana", 50),
        ];
        let gen = Generation::build_from_sorted(&snapshot, 10, 1);

        let ap: Vec<_> = gen.lookup("ap").iter().map(|s| (s.phrase.clone(), s.count)).collect();
        assert_eq!(
            ap,
            vec![
                ("apple".to_string(), 100),
                ("application".to_string(), 80),
                ("apply".to_string(), 60),
                ("apricot".to_string(), 40),
            ]
        );

        let b: Vec<_> = gen.lookup("b").iter().map(|s| (s.phrase.clone(), s.count)).collect();
        assert_eq!(b, vec![("banana".to_string(), 50)]);

        assert!(gen.lookup("z").is_empty());
    }

    #[test]
    fn determinism_same_snapshot_twice() {
        let snapshot = vec![rec("apple", 100), rec("apply", 60), rec("apricot", 40)];
        let g1 = Generation::build_from_sorted(&snapshot, 10, 1);
        let g2 = Generation::build_from_sorted(&snapshot, 10, 2);
        assert_eq!(g1.lookup("ap"), g2.lookup("ap"));
        assert_eq!(g1.node_count(), g2.node_count());
    }

    #[test]
    fn tie_break_by_phrase_ascending() {
        let mut snapshot = vec![rec("zeta", 10), rec("alpha", 10), rec("mid", 10)];
        let gen = Generation::build_unsorted(&mut snapshot, 10, 1);
        let names: Vec<_> = gen.lookup("").iter().map(|s| s.phrase.clone()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }
}
