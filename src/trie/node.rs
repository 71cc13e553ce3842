//------------ TrieNode -------------------------------------------------------
//!
//! Nodes live in a per-generation arena (`Vec<Node>`) addressed by index
//! rather than by pointer, mirroring the teacher's bit-level stride tree
//! but generalized from fixed-width binary strides to arbitrary `char`
//! keys. A whole generation is then one contiguous allocation that can
//! be hung off an `Arc` and handed to readers as a unit (see
//! `trie::generation`).

use std::collections::HashMap;

use crate::phrase::Suggestion;

/// One node of the arena-backed trie.
#[derive(Debug, Clone)]
pub struct Node {
    /// Single normalized scalar-value keys to child arena indices.
    /// `char` is always a full Unicode scalar value, so non-BMP code
    /// points bucket the same as any other (see the routing decision in
    /// `router.rs` for the analogous point on shard selection).
    pub(crate) children: HashMap<char, u32>,
    pub(crate) is_terminal: bool,
    pub(crate) terminal_count: u64,
    /// I-TOPK: the K highest-count phrases in this node's subtree,
    /// ordered by count descending then phrase ascending.
    pub(crate) top_k: Vec<Suggestion>,
}

impl Node {
    pub(crate) fn empty() -> Self {
        Self {
            children: HashMap::new(),
            is_terminal: false,
            terminal_count: 0,
            top_k: Vec::new(),
        }
    }

    /// Rebuild-path insert (§4.7): `suggestion` arrives in global
    /// (count desc, phrase asc) order, so once the list has reached `k`
    /// entries no later phrase can be promoted into it: push while
    /// there's room, otherwise the phrase is already excluded from this
    /// node's cache.
    pub(crate) fn push_sorted(&mut self, suggestion: &Suggestion, k: usize) {
        if self.top_k.len() < k {
            self.top_k.push(suggestion.clone());
        }
    }
}
