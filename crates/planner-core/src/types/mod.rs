//! Shared value types.

pub mod id;

pub use id::{OrderId, ProtocolId, ScheduleEntryId, VendorId};
