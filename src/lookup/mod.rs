//! Two-stage Steam lookup and its presentation
pub mod reply;
pub mod service;

pub use reply::{Reply, ReplyError};
pub use service::{Classification, EnrichmentOutcome, LookupOutcome, LookupService};
