//! Common test utilities
#![allow(dead_code)]

pub mod test_fixtures;

pub use test_fixtures::*;
