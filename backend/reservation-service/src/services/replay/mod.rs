//! Offline collaborators for dry runs
//!
//! `FileSnapshotSource` re-reads a JSON departure board on every acquisition,
//! so the file can be edited while the loop is running. `DryRunGateway`
//! pretends every commit succeeds without touching any booking system.

use crate::error::SnapshotError;
use crate::models::{CommitResult, Snapshot};
use crate::services::polling::{CommitGateway, SnapshotSource};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshotSource {
    /// Train identifier as written in the fixture
    type Handle = String;

    async fn acquire_snapshot(&self) -> Result<Snapshot<String>, SnapshotError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SnapshotError::Transient(format!("{}: {}", self.path.display(), e))
        })?;

        // A half-written file is worth another look; a structurally wrong one is not
        serde_json::from_str(&raw).map_err(|e| {
            if e.is_eof() {
                SnapshotError::Transient(e.to_string())
            } else {
                SnapshotError::Fatal(e.to_string())
            }
        })
    }
}

#[derive(Debug, Default)]
pub struct DryRunGateway {
    committed: AtomicBool,
}

impl DryRunGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommitGateway<String> for DryRunGateway {
    async fn attempt_commit(&self, handle: &String) -> CommitResult {
        info!(train = %handle, "Dry run: pretending to book");
        self.committed.store(true, Ordering::SeqCst);
        CommitResult::Accepted
    }

    async fn confirm_commit(&self) -> bool {
        self.committed.load(Ordering::SeqCst)
    }
}
