//! # planner-service
//!
//! Application services for Research Planner. [`PlannerStore`] owns every
//! record collection and writes each mutation through to a key-value
//! backend before returning; [`ShareService`] turns stored records into
//! share links and opens links back into records.
//!
//! Services follow constructor injection: backends and clocks are passed
//! in as `Arc` references.

pub mod share;
pub mod store;

pub use share::{OpenedShare, ShareService};
pub use store::{PlannerStore, Snapshot};
