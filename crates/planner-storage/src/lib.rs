//! # planner-storage
//!
//! Key-value backends for planner records. The local provider keeps one
//! JSON document per key on disk; the memory provider is used for
//! throwaway sessions and tests.

pub mod manager;
pub mod providers;

pub use manager::create_store;
