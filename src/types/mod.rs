//! Record types accepted by the HTTP front end.
//!
//! Relays and service records are batched; sessions and regions are written
//! directly. Every type that enters a batch implements
//! [`Validate`](crate::batch::Validate).

mod pocket_session;
mod relay;
mod service_record;
#[cfg(test)]
pub(crate) mod test_helpers;
mod validation;

pub use pocket_session::{PocketSession, PortalRegion};
pub use relay::{ErrorSource, Relay};
pub use service_record::ServiceRecord;
