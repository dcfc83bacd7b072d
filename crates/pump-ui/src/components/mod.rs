//! Reusable line builders for the dashboard chrome.

pub mod header;
pub mod indicators;
