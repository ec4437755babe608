//! regstats - vehicle-registration statistics aggregation
//!
//! Loads pre-generated country / state / RTO metrics documents, derives
//! year and month views from them, and computes totals, trends and rankings.

pub mod cli;
pub mod config;
pub mod logging;
pub mod services;
pub mod types;
