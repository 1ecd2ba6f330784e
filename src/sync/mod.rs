pub mod plan;
pub mod worker;

pub use worker::{reconcile, SyncReport, SyncSettings};
