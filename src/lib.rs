//! Comparative analytics core for flight-ticket sales.
//!
//! Runs the same analysis pipeline in two modes against an embedded
//! SurrealDB instance that holds both the order documents and the
//! airport/route graph: a baseline mode (no indexes, one query per route)
//! and an optimized mode (indexes plus a single batch aggregation), and
//! turns the two result bundles into business insights.

pub mod aggregates;
pub mod config;
pub mod db;
pub mod insights;
pub mod models;
pub mod scenario;
