pub mod models;
pub mod registry;
pub mod search;
pub mod tag;

pub use models::{PendingStatus, PendingTicket, PurchaseRequest, Ticket, Validation, Verdict};
pub use registry::{RegistryError, TicketRegistry};
pub use search::UsageTally;
