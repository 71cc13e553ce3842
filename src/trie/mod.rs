//! The sharded prefix index (C1): an in-memory, arena-backed trie with
//! per-node pre-computed top-K completions, published generation by
//! generation via an atomic handle swap (C7's rebuild path).

pub mod generation;
pub mod node;
pub mod shard;

pub use generation::Generation;
pub use shard::Shard;
