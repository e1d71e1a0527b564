//! Core types and trait definitions for the nutrishe nutrition tracker.
//!
//! No HTTP or database dependencies live here. All other crates depend on
//! this one.

pub mod calorie;
pub mod error;
pub mod food;
pub mod meal;
pub mod plan;
pub mod store;
pub mod user;

pub use error::{Classify, Error, ErrorKind, Result};
