//! Terminal UI layer for the pump dashboard.
//!
//! Turns analysis results into renderer-neutral figures, draws them with
//! [`ratatui`], exports them for Plotly, and runs the interactive event loop.

pub mod app;
pub mod chart_view;
pub mod components;
pub mod composer;
pub mod export;
pub mod themes;

pub use pump_core as core;
