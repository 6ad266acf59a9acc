//! Error handling.
//!
//! This module provides the error types for:
//! - Initialization (logger setup)
//! - Storage operations
//! - Per-request load failures
//! - Configuration validation

mod types;

// Re-export public API
pub use types::{ConfigValidationError, DatabaseError, InitializationError, LoadError};
