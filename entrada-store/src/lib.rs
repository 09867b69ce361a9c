pub mod app_config;
pub mod snapshot;
pub mod store;

pub use store::{SharedTicketStore, StoreError, TicketStore};
