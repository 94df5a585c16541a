//! # planner-entity
//!
//! Domain records for Research Planner. Every struct in this crate is a
//! record kept in one of the planner collections or a value derived from
//! them. Records serialize as camelCase JSON, which is also the flattened
//! shape handed to the share codec.

pub mod order;
pub mod protocol;
pub mod schedule;
pub mod share;
pub mod stockpile;
pub mod validation;
pub mod vendor;

pub use order::{CreateOrder, Order, OrderStatus, UpdateOrder};
pub use protocol::{CreateProtocol, Frequency, Protocol, UpdateProtocol};
pub use schedule::ScheduleEntry;
pub use share::{ShareKind, SharedRecord};
pub use stockpile::StockpileItem;
pub use vendor::{CreateVendor, UpdateVendor, Vendor};
