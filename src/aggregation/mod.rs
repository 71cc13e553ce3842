//! The streaming aggregation pipeline (C6): consumes raw query events,
//! filters them (§4.6), maintains trending/personalization inline, and
//! batches shard-update dispatch.

pub mod filter;
pub mod pipeline;

pub use pipeline::{AggregationPipeline, RejectCounts};
