//! Core types and traits for the analysis system.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BarSeries)
//! - Recommendation signals and position lifecycle types
//! - The consolidated analysis snapshot
//! - Traits for data sources, the sentiment feed, the reasoning oracle,
//!   and position persistence

pub mod types;
pub mod traits;
pub mod error;

pub use error::{AnalysisError, AnalysisResult};
pub use types::*;
pub use traits::*;
