//------------ Index Builder & Swapper (C7) ------------------------------------
//!
//! Offline/periodic full rebuild with atomic hand-off. Routes a global
//! snapshot into per-shard groups and publishes each shard's new
//! generation independently; a failure building one shard's group
//! leaves every shard's previous generation live (§4.1 "a rebuild that
//! fails mid-stream leaves the previously-published generation intact").

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use crate::errors::BuildError;
use crate::phrase::SnapshotRecord;
use crate::router;
use crate::trie::Shard;

/// Drives full rebuilds across a fixed set of shards.
pub struct IndexBuilder {
    shard_count: u32,
}

impl IndexBuilder {
    pub fn new(shard_count: u32) -> Self {
        Self { shard_count }
    }

    /// §4.7: groups `snapshot` by `route(phrase)` and rebuilds each
    /// shard from its group. Shards with no assigned phrases are
    /// rebuilt from an empty group rather than left stale, so a
    /// rebuild is always a full, deterministic replacement.
    pub fn rebuild_all(
        &self,
        shards: &[Arc<Shard>],
        snapshot: &[SnapshotRecord],
    ) -> Result<(), BuildError> {
        if shards.len() != self.shard_count as usize {
            return Err(BuildError::Fatal(format!(
                "expected {} shards, got {}",
                self.shard_count,
                shards.len()
            )));
        }

        log::info!("rebuild_all starting: {} shards, {} snapshot records", shards.len(), snapshot.len());
        let mut groups: HashMap<u32, Vec<SnapshotRecord>> = HashMap::new();
        for record in snapshot {
            match router::route(&record.phrase, self.shard_count) {
                Some(shard_id) => groups.entry(shard_id).or_default().push(record.clone()),
                None => {
                    return Err(BuildError::SnapshotInvalid(format!(
                        "phrase {:?} does not route to any shard",
                        record.phrase
                    )))
                }
            }
        }

        for shard in shards {
            let group = groups.remove(&shard.shard_id).unwrap_or_default();
            shard.rebuild_from(&group);
            log::info!(
                "shard {} rebuilt: version={} nodes={}",
                shard.shard_id,
                shard.current_version(),
                shard.node_count()
            );
        }
        Ok(())
    }

    /// Loads a deterministic snapshot (§3.1: `serde_json`-encoded
    /// `Vec<SnapshotRecord>`) from a cold-start file.
    pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Vec<SnapshotRecord>, BuildError> {
        let file = File::open(path.as_ref())
            .map_err(|e| BuildError::SnapshotInvalid(format!("cannot open snapshot: {e}")))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| BuildError::SnapshotInvalid(format!("cannot parse snapshot: {e}")))
    }

    /// Writes a snapshot for cold-start reloads.
    pub fn save_snapshot(
        path: impl AsRef<Path>,
        records: &[SnapshotRecord],
    ) -> Result<(), BuildError> {
        let file = File::create(path.as_ref())
            .map_err(|e| BuildError::Fatal(format!("cannot create snapshot file: {e}")))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, records)
            .map_err(|e| BuildError::Fatal(format!("cannot write snapshot: {e}")))
    }
}
