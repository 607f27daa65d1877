//! Utility modules for common functionality

pub mod error_helpers;

// Re-export commonly used helpers
pub use error_helpers::{parse_with_context, require_some};
