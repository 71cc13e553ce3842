//------------ Admin Control Plane (C9) ------------------------------------------
//!
//! A thin wrapper over [`Engine`] exposing exactly the operator surface
//! named in the specification: rebuild, cache invalidation, stats,
//! trending top-N, user-history sweep. No novel algorithms live here;
//! every method forwards to the component that owns the behavior.
//! Authentication/authorization of these calls is an external
//! collaborator (the admin HTTP surface, say), not this crate's concern.

use crate::engine::Engine;
use crate::errors::BuildError;
use crate::phrase::{SnapshotRecord, TimestampMs};
use crate::stats::EngineStats;

/// Operator-facing view over an [`Engine`]. Cheap to construct; holds
/// only a reference.
pub struct Admin<'a> {
    engine: &'a Engine,
}

impl<'a> Admin<'a> {
    pub fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    pub fn rebuild(&self, snapshot: &[SnapshotRecord]) -> Result<(), BuildError> {
        self.engine.rebuild(snapshot)
    }

    pub fn rebuild_from_file(&self, path: impl AsRef<std::path::Path>) -> Result<(), BuildError> {
        self.engine.rebuild_from_file(path)
    }

    pub fn clear_cache(&self) {
        self.engine.clear_cache()
    }

    pub fn stats(&self) -> EngineStats {
        self.engine.dump_stats()
    }

    /// §4.9: the N currently-trending phrases, discovered by the engine
    /// itself from its trending counter's active window.
    pub fn trending_top(&self, now_ms: TimestampMs, n: usize) -> Vec<(String, u64)> {
        self.engine.trending_top(now_ms, n)
    }

    pub fn sweep_expired_users(&self, now_ms: TimestampMs) -> usize {
        self.engine.sweep_expired_users(now_ms)
    }
}
