//! Philippines maternal death dashboard.
//!
//! Loads the PSA 2021 maternal death tables (deaths by place and by cause,
//! each broken down by age group), normalizes them to long form and runs the
//! filter and aggregate pipeline behind the dashboard and its export.

pub mod charts;
pub mod config;
pub mod data;
pub mod export;
pub mod gui;
