//! The multi-factor ranking engine (C3): composes popularity, recency,
//! trending, personalization and match-quality signals into a single
//! score per candidate completion.

pub mod engine;
pub mod signal;

pub use engine::{RankContext, RankingEngine};
pub use signal::Signal;
