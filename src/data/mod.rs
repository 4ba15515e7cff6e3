//! Series type and retrieval capability.

mod series;
mod source;

pub use series::Series;
pub use source::{CsvSource, FailingSource, InMemorySource, SeriesSource};
