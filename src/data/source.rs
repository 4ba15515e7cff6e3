//! Series retrieval capability.
//!
//! Market-data retrieval is an external collaborator: the pipeline only
//! needs something that yields a [`Series`] or fails. A retrieval
//! failure is fatal and aborts the pipeline before any stage runs.

use std::path::PathBuf;

use crate::data::Series;
use crate::error::{PipelineError, Result};

/// Capability that produces the raw input series.
pub trait SeriesSource {
    /// Fetch the series. Failures map to
    /// [`PipelineError::UpstreamData`].
    fn fetch(&self) -> Result<Series>;
}

/// Source backed by a CSV file with `timestamp,value` rows.
///
/// Timestamps are RFC 3339. Parse and I/O failures are upstream
/// failures, not core input errors: the file plays the role of the
/// external market-data service.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SeriesSource for CsvSource {
    fn fetch(&self) -> Result<Series> {
        let mut reader = csv::Reader::from_path(&self.path)
            .map_err(|e| PipelineError::UpstreamData(format!("{}: {}", self.path.display(), e)))?;

        let mut timestamps = Vec::new();
        let mut values = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record
                .map_err(|e| PipelineError::UpstreamData(format!("row {}: {}", row, e)))?;
            let ts = record
                .get(0)
                .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
                .ok_or_else(|| {
                    PipelineError::UpstreamData(format!("row {}: bad timestamp", row))
                })?;
            let value: f64 = record
                .get(1)
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| PipelineError::UpstreamData(format!("row {}: bad value", row)))?;
            timestamps.push(ts.with_timezone(&chrono::Utc));
            values.push(value);
        }

        Series::new(timestamps, values)
    }
}

/// Source that returns a pre-built series. Used in tests and demos.
pub struct InMemorySource {
    series: Series,
}

impl InMemorySource {
    pub fn new(series: Series) -> Self {
        Self { series }
    }
}

impl SeriesSource for InMemorySource {
    fn fetch(&self) -> Result<Series> {
        Ok(self.series.clone())
    }
}

/// Source that always fails. Models an unreachable upstream in tests.
pub struct FailingSource;

impl SeriesSource for FailingSource {
    fn fetch(&self) -> Result<Series> {
        Err(PipelineError::UpstreamData(
            "data source unavailable".to_string(),
        ))
    }
}
