//! Durable engine snapshots.
//!
//! The aggregate (roster, history sequence, committees, finality records)
//! is persisted at least once per finalized height so a restart resumes
//! without re-deriving already-finalized state. Snapshot bytes never feed a
//! hash, so the encoding only needs to be stable, not canonical — the
//! history proof's canonical codec lives in [`crate::block`].

use {
    crate::{committee::Committee, engine::FinalityRecord, validator::Validator},
    log::*,
    serde::{Deserialize, Serialize},
    solana_hash::Hash,
    std::{
        collections::BTreeMap,
        fs, io,
        path::{Path, PathBuf},
    },
    thiserror::Error,
    zen_history::HistoryEntry,
};

/// File name the store writes under its directory.
pub const SNAPSHOT_FILE: &str = "consensus-snapshot.bin";

/// A serializable image of the engine aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub chain_id: String,
    pub current_height: u64,
    pub last_block_digest: Hash,
    pub validators: Vec<Validator>,
    pub committees: Vec<Committee>,
    pub history: Vec<HistoryEntry>,
    pub finality: BTreeMap<u64, FinalityRecord>,
    pub treasury_accrued: u64,
    pub burned: u64,
}

/// Errors from snapshot persistence.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] io::Error),
    #[error("snapshot encoding error: {0}")]
    Codec(String),
}

/// Writes and reads snapshots under a directory, atomically replacing the
/// previous image via a temp file + rename.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    pub fn persist(&self, snapshot: &EngineSnapshot) -> Result<(), SnapshotError> {
        fs::create_dir_all(&self.dir)?;
        let bytes =
            bincode::serialize(snapshot).map_err(|err| SnapshotError::Codec(err.to_string()))?;
        let tmp = self.dir.join(format!("{SNAPSHOT_FILE}.tmp"));
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, self.path())?;
        debug!(
            "snapshot persisted at height {} ({} bytes)",
            snapshot.current_height,
            bytes.len()
        );
        Ok(())
    }

    /// Load the latest snapshot; `None` when no snapshot exists yet.
    pub fn load(&self) -> Result<Option<EngineSnapshot>, SnapshotError> {
        let path = self.path();
        if !Path::new(&path).exists() {
            return Ok(None);
        }
        let bytes = fs::read(path)?;
        let snapshot =
            bincode::deserialize(&bytes).map_err(|err| SnapshotError::Codec(err.to_string()))?;
        Ok(Some(snapshot))
    }
}
