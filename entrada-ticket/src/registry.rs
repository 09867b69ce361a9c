use std::collections::HashMap;

use chrono::Utc;

use crate::models::{PendingStatus, PendingTicket, PurchaseRequest, Ticket, Validation, Verdict};
use crate::search::{self, UsageTally};
use crate::tag;

/// How many re-mints a colliding tag gets before the approval aborts
const TAG_RETRY_LIMIT: usize = 8;

/// The authoritative collections of confirmed tickets and pending purchase
/// requests, plus every lifecycle transition over them.
///
/// Listing order is unspecified. Tags are unique across the registry for
/// its whole lifetime.
#[derive(Debug, Clone, Default)]
pub struct TicketRegistry {
    tickets: HashMap<String, Ticket>,
    pending: HashMap<String, PendingTicket>,
}

impl TicketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted records
    pub fn from_records(tickets: Vec<Ticket>, pending: Vec<PendingTicket>) -> Self {
        Self {
            tickets: tickets.into_iter().map(|t| (t.id.clone(), t)).collect(),
            pending: pending.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    pub fn all_tickets(&self) -> Vec<Ticket> {
        self.tickets.values().cloned().collect()
    }

    pub fn pending_tickets(&self) -> Vec<PendingTicket> {
        self.pending.values().cloned().collect()
    }

    pub fn ticket(&self, ticket_id: &str) -> Option<&Ticket> {
        self.tickets.get(ticket_id)
    }

    /// All confirmed tickets held by one customer. Email matching is
    /// case-insensitive; callers never match emails themselves.
    pub fn tickets_for(&self, email: &str) -> Vec<Ticket> {
        self.tickets
            .values()
            .filter(|t| t.customer_email.eq_ignore_ascii_case(email))
            .cloned()
            .collect()
    }

    /// Record a new purchase request. The request must cover at least one
    /// ticket.
    pub fn submit_pending(
        &mut self,
        request: PurchaseRequest,
    ) -> Result<PendingTicket, RegistryError> {
        if request.quantity == 0 {
            return Err(RegistryError::EmptyRequest);
        }
        let pending = PendingTicket::new(request);
        self.pending.insert(pending.id.clone(), pending.clone());
        Ok(pending)
    }

    /// Convert a pending request into `quantity` confirmed tickets.
    ///
    /// All-or-nothing: tags are minted before anything is inserted, and a
    /// collision that survives the retry budget aborts the whole approval,
    /// leaving the pending record untouched. Returns the resolved request
    /// together with the generated tickets.
    pub fn approve(
        &mut self,
        pending_id: &str,
    ) -> Result<(PendingTicket, Vec<Ticket>), RegistryError> {
        let request = self
            .pending
            .get(pending_id)
            .cloned()
            .ok_or_else(|| RegistryError::PendingNotFound(pending_id.to_string()))?;

        let approved_at = Utc::now();
        let mut generated: Vec<Ticket> = Vec::with_capacity(request.quantity as usize);
        for _ in 0..request.quantity {
            let tag = self.mint_unique_tag(&generated)?;
            generated.push(Ticket::issue(
                tag,
                request.event_name.clone(),
                request.customer_name.clone(),
                request.customer_email.clone(),
                approved_at,
            ));
        }

        // Nothing above touched the collections; commit both sides together.
        self.pending.remove(pending_id);
        for ticket in &generated {
            self.tickets.insert(ticket.id.clone(), ticket.clone());
        }

        let mut resolved = request;
        resolved.status = PendingStatus::Approved;
        Ok((resolved, generated))
    }

    /// Discard a pending request without producing tickets. Confirmed
    /// tickets are never affected. Returns the resolved request.
    pub fn reject(&mut self, pending_id: &str) -> Result<PendingTicket, RegistryError> {
        let mut resolved = self
            .pending
            .remove(pending_id)
            .ok_or_else(|| RegistryError::PendingNotFound(pending_id.to_string()))?;
        resolved.status = PendingStatus::Rejected;
        Ok(resolved)
    }

    /// Clear the payment-proof reference of a pending request, leaving the
    /// rest of the record intact
    pub fn clear_payment_proof(&mut self, pending_id: &str) -> Result<(), RegistryError> {
        let pending = self
            .pending
            .get_mut(pending_id)
            .ok_or_else(|| RegistryError::PendingNotFound(pending_id.to_string()))?;
        pending.payment_proof = None;
        Ok(())
    }

    /// Remove a confirmed ticket. A missing tag is a reported outcome, not
    /// an error.
    pub fn delete_ticket(&mut self, ticket_id: &str) -> bool {
        self.tickets.remove(ticket_id).is_some()
    }

    /// Check a presented tag and, when it is unused, consume it.
    ///
    /// At most one call ever observes the unused state for a given tag;
    /// every later attempt reports AlreadyUsed with the matched ticket
    /// still attached for display.
    pub fn validate(&mut self, ticket_id: &str) -> Validation {
        match self.tickets.get_mut(ticket_id) {
            None => Validation {
                verdict: Verdict::NotFound,
                ticket: None,
            },
            Some(ticket) if ticket.used => Validation {
                verdict: Verdict::AlreadyUsed,
                ticket: Some(ticket.clone()),
            },
            Some(ticket) => {
                ticket.mark_used();
                Validation {
                    verdict: Verdict::Admitted,
                    ticket: Some(ticket.clone()),
                }
            }
        }
    }

    pub fn search(&self, term: &str) -> Vec<Ticket> {
        self.tickets
            .values()
            .filter(|t| search::matches(t, term))
            .cloned()
            .collect()
    }

    pub fn usage_tally(&self) -> UsageTally {
        UsageTally::over(self.tickets.values())
    }

    fn mint_unique_tag(&self, staged: &[Ticket]) -> Result<String, RegistryError> {
        for _ in 0..TAG_RETRY_LIMIT {
            let tag = tag::ticket_tag();
            if !self.tickets.contains_key(&tag) && !staged.iter().any(|t| t.id == tag) {
                return Ok(tag);
            }
        }
        Err(RegistryError::TagExhausted)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Pending ticket not found: {0}")]
    PendingNotFound(String),

    #[error("Purchase request must cover at least one ticket")]
    EmptyRequest,

    #[error("Could not mint a unique ticket tag")]
    TagExhausted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn request(event: &str, name: &str, email: &str, quantity: u32) -> PurchaseRequest {
        PurchaseRequest {
            event_name: event.to_string(),
            customer_name: name.to_string(),
            customer_email: email.to_string(),
            quantity,
            payment_proof: None,
        }
    }

    fn seed_pending(registry: &mut TicketRegistry, email: &str, quantity: u32) -> String {
        registry
            .submit_pending(request("Noche Magica", "Ana Torres", email, quantity))
            .unwrap()
            .id
    }

    #[test]
    fn test_approval_quantity_law() {
        let mut registry = TicketRegistry::new();
        let pending_id = seed_pending(&mut registry, "a@x.com", 2);

        let (resolved, tickets) = registry.approve(&pending_id).unwrap();

        assert_eq!(resolved.status, PendingStatus::Approved);
        assert_eq!(tickets.len(), 2);
        assert!(tickets.iter().all(|t| !t.used));
        assert!(tickets.iter().all(|t| t.customer_email == "a@x.com"));
        assert!(registry.pending_tickets().is_empty());
        assert_eq!(registry.all_tickets().len(), 2);
    }

    #[test]
    fn test_approve_missing_pending() {
        let mut registry = TicketRegistry::new();
        let result = registry.approve("PEND-missing");
        assert!(matches!(result, Err(RegistryError::PendingNotFound(_))));
    }

    #[test]
    fn test_generated_tags_are_unique() {
        let mut registry = TicketRegistry::new();
        for n in 0..10 {
            let pending_id = seed_pending(&mut registry, &format!("c{}@x.com", n), 5);
            registry.approve(&pending_id).unwrap();
        }

        let tags: HashSet<String> =
            registry.all_tickets().into_iter().map(|t| t.id).collect();
        assert_eq!(tags.len(), 50);
    }

    #[test]
    fn test_validate_at_most_once() {
        let mut registry = TicketRegistry::new();
        let pending_id = seed_pending(&mut registry, "b@x.com", 1);
        let (_, tickets) = registry.approve(&pending_id).unwrap();
        let tag = tickets[0].id.clone();

        let first = registry.validate(&tag);
        assert_eq!(first.verdict, Verdict::Admitted);
        assert!(first.valid());
        assert!(first.ticket.unwrap().used);

        let second = registry.validate(&tag);
        assert_eq!(second.verdict, Verdict::AlreadyUsed);
        assert!(!second.valid());
        // The matched ticket is still returned so the operator can see
        // who bought it.
        assert_eq!(second.ticket.unwrap().id, tag);

        let third = registry.validate(&tag);
        assert_eq!(third.verdict, Verdict::AlreadyUsed);
    }

    #[test]
    fn test_validate_unknown_tag_mutates_nothing() {
        let mut registry = TicketRegistry::new();
        let pending_id = seed_pending(&mut registry, "b@x.com", 1);
        registry.approve(&pending_id).unwrap();

        let result = registry.validate("does-not-exist");
        assert_eq!(result.verdict, Verdict::NotFound);
        assert!(result.ticket.is_none());
        assert_eq!(registry.usage_tally().used, 0);
    }

    #[test]
    fn test_delete_reports_idempotently() {
        let mut registry = TicketRegistry::new();
        let pending_id = seed_pending(&mut registry, "d@x.com", 1);
        let (_, tickets) = registry.approve(&pending_id).unwrap();
        let tag = tickets[0].id.clone();

        assert!(registry.delete_ticket(&tag));
        assert!(registry.all_tickets().is_empty());
        assert!(!registry.delete_ticket(&tag));
        assert!(!registry.delete_ticket("ENT-never-existed"));
    }

    #[test]
    fn test_reject_leaves_confirmed_tickets_alone() {
        let mut registry = TicketRegistry::new();
        let approved = seed_pending(&mut registry, "keep@x.com", 2);
        registry.approve(&approved).unwrap();
        let rejected = seed_pending(&mut registry, "drop@x.com", 3);

        let resolved = registry.reject(&rejected).unwrap();

        assert_eq!(resolved.status, PendingStatus::Rejected);
        assert!(registry.pending_tickets().is_empty());
        assert_eq!(registry.all_tickets().len(), 2);
        assert!(matches!(
            registry.reject(&rejected),
            Err(RegistryError::PendingNotFound(_))
        ));
    }

    #[test]
    fn test_clear_payment_proof() {
        let mut registry = TicketRegistry::new();
        let pending = registry
            .submit_pending(PurchaseRequest {
                payment_proof: Some("proof-7.png".to_string()),
                ..request("Gala", "Luis Vega", "luis@x.com", 1)
            })
            .unwrap();

        registry.clear_payment_proof(&pending.id).unwrap();

        let stored = registry.pending_tickets();
        assert_eq!(stored[0].payment_proof, None);
        // Rest of the record is intact
        assert_eq!(stored[0].quantity, 1);
        assert_eq!(stored[0].customer_name, "Luis Vega");

        assert!(matches!(
            registry.clear_payment_proof("PEND-missing"),
            Err(RegistryError::PendingNotFound(_))
        ));
    }

    #[test]
    fn test_submit_rejects_zero_quantity() {
        let mut registry = TicketRegistry::new();
        let result = registry.submit_pending(request("Gala", "Luis", "luis@x.com", 0));
        assert!(matches!(result, Err(RegistryError::EmptyRequest)));
        assert!(registry.pending_tickets().is_empty());
    }

    #[test]
    fn test_customer_lookup_ignores_case() {
        let mut registry = TicketRegistry::new();
        let pending_id = seed_pending(&mut registry, "Ana@Example.com", 2);
        registry.approve(&pending_id).unwrap();

        assert_eq!(registry.tickets_for("ana@example.com").len(), 2);
        assert_eq!(registry.tickets_for("ANA@EXAMPLE.COM").len(), 2);
        assert!(registry.tickets_for("other@example.com").is_empty());
    }

    #[test]
    fn test_search_over_registry() {
        let mut registry = TicketRegistry::new();
        let first = seed_pending(&mut registry, "ana@x.com", 1);
        registry.approve(&first).unwrap();
        let second = registry
            .submit_pending(request("Feria de Verano", "Mar Solis", "mar@x.com", 1))
            .unwrap();
        registry.approve(&second.id).unwrap();

        assert_eq!(registry.search("").len(), 2);
        assert_eq!(registry.search("feria").len(), 1);
        assert_eq!(registry.search("ana@").len(), 1);
        assert!(registry.search("no-such-term").is_empty());
    }

    #[test]
    fn test_tally_tracks_validations() {
        let mut registry = TicketRegistry::new();
        let pending_id = seed_pending(&mut registry, "t@x.com", 3);
        let (_, tickets) = registry.approve(&pending_id).unwrap();

        registry.validate(&tickets[0].id);
        registry.validate(&tickets[1].id);

        let tally = registry.usage_tally();
        assert_eq!(tally.used, 2);
        assert_eq!(tally.unused, 1);
    }
}
