//! # bookstore-core
//!
//! Core crate for the Bookstore platform. Contains configuration schemas,
//! typed identifiers, logging initialization, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Bookstore crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
