//! Core domain types, persistence, and the aggregation/merge engines for
//! the fish-telemetry interval pipeline.

pub mod aggregator;
pub mod error;
pub mod merger;
pub mod model;
pub mod store;

pub use aggregator::{aggregate, TimeFormat};
pub use error::{FishtrackError, Result};
pub use merger::{merge_sorted_intervals, MergeResult};
pub use model::Interval;
pub use store::DbPool;
