use serde::Serialize;

use crate::models::Ticket;

/// A ticket matches when the term appears case-insensitively in its tag,
/// holder name, holder email, or event name. An empty term matches all.
pub fn matches(ticket: &Ticket, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    ticket.id.to_lowercase().contains(&needle)
        || ticket.customer_name.to_lowercase().contains(&needle)
        || ticket.customer_email.to_lowercase().contains(&needle)
        || ticket.event_name.to_lowercase().contains(&needle)
}

/// Validated vs outstanding counts over a ticket collection
///
/// Always recomputed from the authoritative set; there are no stored
/// counters to drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageTally {
    pub used: usize,
    pub unused: usize,
}

impl UsageTally {
    pub fn over<'a>(tickets: impl IntoIterator<Item = &'a Ticket>) -> Self {
        let mut tally = Self { used: 0, unused: 0 };
        for ticket in tickets {
            if ticket.used {
                tally.used += 1;
            } else {
                tally.unused += 1;
            }
        }
        tally
    }
}
