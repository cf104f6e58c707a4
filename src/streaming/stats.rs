// Copyright 2026 StreamLight Project Authors. Licensed under Apache-2.0.

use std::collections::HashMap;

use serde::Serialize;

/// Running statistics for one column of the row buffer.
///
/// All fields are folded in online as cells are appended; fields with no
/// observation stay `None`. Integer minima and maxima are kept as `i128`,
/// which covers every value a decimal column of precision ≤ 38 can hold.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RowBufferStats {
    null_count: u64,
    max_length: u64,
    min_int: Option<i128>,
    max_int: Option<i128>,
    min_str: Option<String>,
    max_str: Option<String>,
}

impl RowBufferStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_null(&mut self) {
        self.null_count += 1;
    }

    /// Fold an integer observation into the running min/max.
    pub fn add_int(&mut self, value: i128) {
        self.min_int = Some(self.min_int.map_or(value, |v| v.min(value)));
        self.max_int = Some(self.max_int.map_or(value, |v| v.max(value)));
    }

    /// Fold a string observation into the running min/max, ordered by
    /// unicode codepoint.
    pub fn add_str(&mut self, value: &str) {
        if self.min_str.as_deref().map_or(true, |v| value < v) {
            self.min_str = Some(value.to_owned());
        }
        if self.max_str.as_deref().map_or(true, |v| value > v) {
            self.max_str = Some(value.to_owned());
        }
    }

    /// Raise the observed maximum byte length.
    pub fn set_max_length(&mut self, len: u64) {
        self.max_length = self.max_length.max(len);
    }

    pub fn null_count(&self) -> u64 {
        self.null_count
    }

    pub fn max_length(&self) -> u64 {
        self.max_length
    }

    pub fn min_int(&self) -> Option<i128> {
        self.min_int
    }

    pub fn max_int(&self) -> Option<i128> {
        self.max_int
    }

    pub fn min_str(&self) -> Option<&str> {
        self.min_str.as_deref()
    }

    pub fn max_str(&self) -> Option<&str> {
        self.max_str.as_deref()
    }
}

/// Statistics of one column of a flushed batch, as consumed by the
/// downstream min/max indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileColumnProperties {
    pub min_int_value: Option<i128>,
    pub max_int_value: Option<i128>,
    pub min_str_value: Option<String>,
    pub max_str_value: Option<String>,
    pub max_length: u64,
    pub null_count: u64,
    /// Distinct values are not computed by the buffer.
    pub distinct_values: i64,
}

impl From<&RowBufferStats> for FileColumnProperties {
    fn from(stats: &RowBufferStats) -> Self {
        Self {
            min_int_value: stats.min_int(),
            max_int_value: stats.max_int(),
            min_str_value: stats.min_str().map(str::to_owned),
            max_str_value: stats.max_str().map(str::to_owned),
            max_length: stats.max_length(),
            null_count: stats.null_count(),
            distinct_values: -1,
        }
    }
}

/// The derived statistics payload of one flush, keyed by normalized column
/// name. This is the sole communication from the buffer to the downstream
/// indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpInfo {
    pub row_count: u64,
    pub column_eps: HashMap<String, FileColumnProperties>,
}

impl EpInfo {
    /// Build the payload from the per-column stats of one flush.
    pub fn from_stats<'a>(
        row_count: u64,
        columns: impl IntoIterator<Item = (&'a str, &'a RowBufferStats)>,
    ) -> Self {
        EpInfo {
            row_count,
            column_eps: columns
                .into_iter()
                .map(|(name, stats)| (name.to_owned(), FileColumnProperties::from(stats)))
                .collect(),
        }
    }
}
