use std::path::PathBuf;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use async_trait::async_trait;
use entrada_ticket::models::{PendingTicket, PurchaseRequest, Ticket, Validation};
use entrada_ticket::registry::{RegistryError, TicketRegistry};
use entrada_ticket::search::UsageTally;

use crate::snapshot::{SnapshotError, SnapshotFile, StoreSnapshot};

/// Failures surfaced by the ticket store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A referenced record is absent, or the request itself is malformed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Underlying persistence unavailable or corrupted; the in-memory
    /// state is left exactly as it was
    #[error("Store persistence failed: {0}")]
    Snapshot(#[from] SnapshotError),
}

impl StoreError {
    /// Whether the failure names a record absent from the store
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::Registry(RegistryError::PendingNotFound(_))
        )
    }
}

/// Operation surface of the ticket store
///
/// Presentation layers hold an explicit `Arc<dyn TicketStore>` rather than
/// an ambient singleton, so implementations can be swapped for test doubles.
#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError>;
    async fn get_ticket(&self, ticket_id: &str) -> Result<Option<Ticket>, StoreError>;
    async fn list_pending(&self) -> Result<Vec<PendingTicket>, StoreError>;
    async fn tickets_for_customer(&self, email: &str) -> Result<Vec<Ticket>, StoreError>;
    async fn submit_pending(&self, request: PurchaseRequest)
        -> Result<PendingTicket, StoreError>;
    async fn approve_pending(&self, pending_id: &str) -> Result<Vec<Ticket>, StoreError>;
    async fn reject_pending(&self, pending_id: &str) -> Result<(), StoreError>;
    async fn clear_payment_proof(&self, pending_id: &str) -> Result<(), StoreError>;
    async fn delete_ticket(&self, ticket_id: &str) -> Result<bool, StoreError>;
    async fn validate_ticket(&self, ticket_id: &str) -> Result<Validation, StoreError>;
    async fn search(&self, term: &str) -> Result<Vec<Ticket>, StoreError>;
    async fn usage_tally(&self) -> Result<UsageTally, StoreError>;
}

/// Concurrency-safe ticket store: a registry behind a read/write lock with
/// an optional JSON snapshot.
///
/// Mutations are staged on a clone of the registry, the snapshot is written
/// from the clone, and only then is the clone committed under the write
/// lock. A failed snapshot write therefore rolls the whole operation back,
/// and the write lock strictly orders racing validations of one tag: the
/// loser of the race observes the ticket already used.
pub struct SharedTicketStore {
    inner: RwLock<TicketRegistry>,
    snapshot: Option<SnapshotFile>,
}

impl SharedTicketStore {
    /// Fresh store with no persistence
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(TicketRegistry::new()),
            snapshot: None,
        }
    }

    /// Open a store backed by a snapshot file, loading any existing state
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let snapshot = SnapshotFile::new(path);
        let loaded = snapshot.load()?;
        tracing::info!(
            tickets = loaded.tickets.len(),
            pending = loaded.pending.len(),
            "Loaded ticket store snapshot"
        );
        Ok(Self {
            inner: RwLock::new(loaded.into_registry()),
            snapshot: Some(snapshot),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, TicketRegistry> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stage `op` on a copy of the registry, persist, then commit.
    /// `mutated` decides whether the outcome changed anything; read-shaped
    /// outcomes (failed scans, no-op deletes) skip the snapshot write.
    fn commit_if<T>(
        &self,
        op: impl FnOnce(&mut TicketRegistry) -> Result<T, RegistryError>,
        mutated: impl FnOnce(&T) -> bool,
    ) -> Result<T, StoreError> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let mut staged = guard.clone();
        let outcome = op(&mut staged)?;
        if mutated(&outcome) {
            if let Some(snapshot) = &self.snapshot {
                snapshot.save(&StoreSnapshot::of(&staged))?;
            }
            *guard = staged;
        }
        Ok(outcome)
    }

    fn commit<T>(
        &self,
        op: impl FnOnce(&mut TicketRegistry) -> Result<T, RegistryError>,
    ) -> Result<T, StoreError> {
        self.commit_if(op, |_| true)
    }
}

impl Default for SharedTicketStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[async_trait]
impl TicketStore for SharedTicketStore {
    async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError> {
        Ok(self.read().all_tickets())
    }

    async fn get_ticket(&self, ticket_id: &str) -> Result<Option<Ticket>, StoreError> {
        Ok(self.read().ticket(ticket_id).cloned())
    }

    async fn list_pending(&self) -> Result<Vec<PendingTicket>, StoreError> {
        Ok(self.read().pending_tickets())
    }

    async fn tickets_for_customer(&self, email: &str) -> Result<Vec<Ticket>, StoreError> {
        Ok(self.read().tickets_for(email))
    }

    async fn submit_pending(
        &self,
        request: PurchaseRequest,
    ) -> Result<PendingTicket, StoreError> {
        let pending = self.commit(|registry| registry.submit_pending(request))?;
        tracing::info!(
            pending_id = %pending.id,
            quantity = pending.quantity,
            "Recorded purchase request"
        );
        Ok(pending)
    }

    async fn approve_pending(&self, pending_id: &str) -> Result<Vec<Ticket>, StoreError> {
        let (resolved, tickets) = self.commit(|registry| registry.approve(pending_id))?;
        tracing::info!(
            pending_id = %resolved.id,
            status = ?resolved.status,
            generated = tickets.len(),
            "Approved pending ticket"
        );
        Ok(tickets)
    }

    async fn reject_pending(&self, pending_id: &str) -> Result<(), StoreError> {
        let resolved = self.commit(|registry| registry.reject(pending_id))?;
        tracing::info!(
            pending_id = %resolved.id,
            status = ?resolved.status,
            "Rejected pending ticket"
        );
        Ok(())
    }

    async fn clear_payment_proof(&self, pending_id: &str) -> Result<(), StoreError> {
        self.commit(|registry| registry.clear_payment_proof(pending_id))
    }

    async fn delete_ticket(&self, ticket_id: &str) -> Result<bool, StoreError> {
        self.commit_if(
            |registry| Ok(registry.delete_ticket(ticket_id)),
            |deleted| *deleted,
        )
    }

    async fn validate_ticket(&self, ticket_id: &str) -> Result<Validation, StoreError> {
        self.commit_if(
            |registry| Ok(registry.validate(ticket_id)),
            Validation::valid,
        )
    }

    async fn search(&self, term: &str) -> Result<Vec<Ticket>, StoreError> {
        Ok(self.read().search(term))
    }

    async fn usage_tally(&self) -> Result<UsageTally, StoreError> {
        Ok(self.read().usage_tally())
    }
}
