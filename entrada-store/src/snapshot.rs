use std::fs;
use std::io;
use std::path::PathBuf;

use entrada_ticket::models::{PendingTicket, Ticket};
use entrada_ticket::registry::TicketRegistry;
use serde::{Deserialize, Serialize};

/// On-disk layout of the ticket store
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub tickets: Vec<Ticket>,
    pub pending: Vec<PendingTicket>,
}

impl StoreSnapshot {
    pub fn of(registry: &TicketRegistry) -> Self {
        Self {
            tickets: registry.all_tickets(),
            pending: registry.pending_tickets(),
        }
    }

    pub fn into_registry(self) -> TicketRegistry {
        TicketRegistry::from_records(self.tickets, self.pending)
    }
}

/// Reads and writes store snapshots as JSON files
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the snapshot. A missing file is an empty store; unreadable or
    /// unparsable data is surfaced, never papered over.
    pub fn load(&self) -> Result<StoreSnapshot, SnapshotError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(StoreSnapshot::default())
            }
            Err(e) => return Err(SnapshotError::Unavailable(e)),
        };
        serde_json::from_slice(&raw).map_err(SnapshotError::Corrupted)
    }

    /// Write the snapshot through a sibling temp file and rename it into
    /// place, so a failed write never leaves a torn store on disk
    pub fn save(&self, snapshot: &StoreSnapshot) -> Result<(), SnapshotError> {
        let raw = serde_json::to_vec_pretty(snapshot).map_err(SnapshotError::Corrupted)?;

        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(SnapshotError::Unavailable)?;
            }
        }

        let staging = self.path.with_extension("tmp");
        fs::write(&staging, &raw).map_err(SnapshotError::Unavailable)?;
        fs::rename(&staging, &self.path).map_err(SnapshotError::Unavailable)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Snapshot file unavailable: {0}")]
    Unavailable(#[source] io::Error),

    #[error("Snapshot data corrupted: {0}")]
    Corrupted(#[source] serde_json::Error),
}
