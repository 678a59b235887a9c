//! Batch comparison
//!
//! [`compare_batches`] turns one positional batch pair into a [`BatchResult`].
//! It touches no shared state, which is what lets the coordinator run many
//! comparisons in parallel.

pub mod comparator;
pub mod result;

pub use comparator::{compare_batches, shared_columns};
pub use result::BatchResult;
