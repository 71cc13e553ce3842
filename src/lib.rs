//------------ suggest-store ----------------------------------------------------
//!
//! A sharded prefix index with multi-factor ranking and streaming
//! aggregation, for an interactive autocomplete service: given a text
//! prefix, return the best-ranked completions right now, while being
//! continuously updated from live query traffic.
//!
//! The top-level entry point is [`engine::Engine`]. It composes:
//! a per-shard prefix trie ([`trie`]) behind a deterministic router
//! ([`router`]), a multi-signal ranking engine ([`ranking`]), sliding-
//! window trending counters ([`trending`]) and per-user personalization
//! ([`personalization`]), a short-TTL result cache ([`cache`]), a
//! streaming event aggregation pipeline ([`aggregation`]), and an
//! offline rebuild/swap path ([`builder`]).

pub mod admin;
pub mod aggregation;
pub mod builder;
pub mod cache;
pub mod config;
pub mod engine;
pub mod errors;
pub mod normalize;
pub mod personalization;
pub mod phrase;
pub mod ranking;
pub mod router;
pub mod stats;
pub mod trending;
pub mod trie;

pub use admin::Admin;
pub use config::EngineConfig;
pub use engine::Engine;
pub use errors::{BuildError, IngestError, QueryError, RejectReason};
pub use phrase::{ScoredSuggestion, SnapshotRecord, Suggestion, TimestampMs};
