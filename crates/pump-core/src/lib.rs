//! Shared building blocks for the pump dashboard.
//!
//! Holds the care-log record models, the error type, duration / volume /
//! timestamp parsing, number formatting and the command-line settings.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{DashboardError, Result};
