//! Shortlisting over the stored candidate pool: filters, CSV export, search
//! and aggregate statistics.

pub mod export;
pub mod filter;
pub mod handlers;
pub mod search;
pub mod stats;

pub use filter::FilterMode;
