//! Data layer for the pump dashboard.
//!
//! Loads care-log CSV exports from a date-labelled store, classifies rows
//! into pumping sessions and nursing feeds, and aggregates them into the
//! series the charts draw.

pub mod aggregator;
pub mod analysis;
pub mod classifier;
pub mod normalizer;
pub mod reader;
pub mod store;

pub use pump_core as core;
