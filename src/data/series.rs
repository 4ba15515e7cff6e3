//! Timestamped scalar series.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// An ordered sequence of (timestamp, value) pairs.
///
/// Timestamps are strictly increasing and every value is finite; both
/// are enforced at construction. A `Series` is immutable once built:
/// each pipeline stage that transforms one returns a new `Series`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl Series {
    /// Create a new series, validating shape and contents.
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(PipelineError::InvalidInput(format!(
                "timestamp/value length mismatch: {} vs {}",
                timestamps.len(),
                values.len()
            )));
        }
        for (i, pair) in timestamps.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(PipelineError::InvalidInput(format!(
                    "timestamps not strictly increasing at index {}",
                    i + 1
                )));
            }
        }
        for (i, &v) in values.iter().enumerate() {
            if !v.is_finite() {
                return Err(PipelineError::InvalidInput(format!(
                    "non-finite value {} at index {}",
                    v, i
                )));
            }
        }
        Ok(Self { timestamps, values })
    }

    /// Build a series from raw values with evenly spaced timestamps.
    ///
    /// Convenient for demos and tests where only the values matter.
    pub fn from_values(values: Vec<f64>) -> Result<Self> {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let timestamps = (0..values.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        Self::new(timestamps, values)
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the series holds no observations.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values in order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// All timestamps in order.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// A contiguous window of `len` values starting at `start`, or
    /// `None` if it would run past the end.
    pub fn window(&self, start: usize, len: usize) -> Option<&[f64]> {
        if start + len <= self.values.len() {
            Some(&self.values[start..start + len])
        } else {
            None
        }
    }

    /// A new series with the same timestamps and the given values.
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self> {
        Self::new(self.timestamps.clone(), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values() {
        let series = Series::from_values(vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(series.len(), 3);
        assert!(series.timestamps()[0] < series.timestamps()[1]);
    }

    #[test]
    fn test_rejects_non_finite() {
        let err = Series::from_values(vec![1.0, f64::NAN, 3.0]).unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn test_rejects_unordered_timestamps() {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let result = Series::new(vec![start, start], vec![1.0, 2.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_window() {
        let series = Series::from_values((1..=20).map(|v| v as f64).collect()).unwrap();
        let window = series.window(0, 10).unwrap();
        assert_eq!(window[0], 1.0);
        assert_eq!(window[9], 10.0);
        assert!(series.window(11, 10).is_none());
        assert!(series.window(10, 10).is_some());
    }
}
