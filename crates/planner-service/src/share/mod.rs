//! Share links for planner records.

pub mod service;

pub use service::{OpenedShare, ShareService};
