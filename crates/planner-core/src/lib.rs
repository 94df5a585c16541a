//! # planner-core
//!
//! Core crate for Research Planner. Contains the configuration schema,
//! typed identifiers, the key-value storage and clock traits, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other planner crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
