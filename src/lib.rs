//! Inventory liquidity engine.
//!
//! Pricing calculators, CSV ingestion with SKU-keyed merging, and the
//! in-memory session model behind the liquidity dashboard.

pub mod app;
pub mod domain;
pub mod infra;
pub mod util;

pub use app::{ImportSummary, Session, SessionError};
