//! Error handling helper functions
//!
//! Provides safe alternatives to unwrap() for common patterns

use crate::error::{ComplianceError, Result};
use std::fmt::Display;
use std::str::FromStr;

/// Parse a string with context information for better error messages
pub fn parse_with_context<T, S>(value: S, context: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    S: AsRef<str>,
{
    value.as_ref().parse().map_err(|e: T::Err| {
        ComplianceError::invalid_input(format!(
            "Failed to parse {} - {}: {}",
            context,
            value.as_ref(),
            e
        ))
    })
}

/// Convert Option to Result with a not-found error naming what was looked up
pub fn require_some<T>(option: Option<T>, context: &str) -> Result<T> {
    option.ok_or_else(|| ComplianceError::not_found(context.to_string()))
}
