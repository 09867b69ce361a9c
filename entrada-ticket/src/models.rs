use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tag;

/// Status of a pending purchase request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PendingStatus {
    Pending,
    Approved,
    Rejected,
}

/// A confirmed admission record
///
/// The tag is the store's primary key and the value encoded for scanning.
/// `used` starts false and flips to true exactly once; it never reverts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub event_name: String,
    pub customer_name: String,
    pub customer_email: String,
    pub purchase_date: DateTime<Utc>,
    pub used: bool,
}

impl Ticket {
    /// Issue a fresh unused ticket under an already-minted tag
    pub fn issue(
        id: String,
        event_name: String,
        customer_name: String,
        customer_email: String,
        purchase_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            event_name,
            customer_name,
            customer_email,
            purchase_date,
            used: false,
        }
    }

    /// Consume the ticket (entry granted). Irreversible.
    pub fn mark_used(&mut self) {
        self.used = true;
    }
}

/// Payload of a new purchase request, before a tag or status is assigned
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub event_name: String,
    pub customer_name: String,
    pub customer_email: String,
    pub quantity: u32,
    #[serde(default)]
    pub payment_proof: Option<String>,
}

/// An unconfirmed purchase request awaiting administrative review
///
/// `payment_proof` is an opaque reference owned by the file-handling
/// collaborator; the store only keeps or clears it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTicket {
    pub id: String,
    pub event_name: String,
    pub customer_name: String,
    pub customer_email: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payment_proof: Option<String>,
    pub status: PendingStatus,
    pub submitted_at: DateTime<Utc>,
}

impl PendingTicket {
    pub fn new(request: PurchaseRequest) -> Self {
        Self {
            id: tag::pending_tag(),
            event_name: request.event_name,
            customer_name: request.customer_name,
            customer_email: request.customer_email,
            quantity: request.quantity,
            payment_proof: request.payment_proof,
            status: PendingStatus::Pending,
            submitted_at: Utc::now(),
        }
    }
}

/// Why a scan was or was not accepted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Admitted,
    AlreadyUsed,
    NotFound,
}

impl Verdict {
    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Admitted => "Ticket validated successfully",
            Verdict::AlreadyUsed => "Ticket already used",
            Verdict::NotFound => "Ticket not found",
        }
    }
}

/// Outcome of a validation attempt
///
/// Never an error: a rejected scan is a normal business result. The matched
/// ticket is carried even when already used, so the operator can see who
/// bought it and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validation {
    pub verdict: Verdict,
    pub ticket: Option<Ticket>,
}

impl Validation {
    pub fn valid(&self) -> bool {
        self.verdict == Verdict::Admitted
    }
}
