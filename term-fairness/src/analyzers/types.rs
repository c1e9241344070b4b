//! Value types produced by the moment engine.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A mean or variance, typed according to the distribution it summarizes.
///
/// Continuous data yields scalars, datetime data a timestamp (mean) and a
/// duration (spread), categorical data one value per observed category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum MomentValue {
    /// A real-valued statistic.
    Scalar(f64),

    /// A point on the timeline (datetime mean).
    Timestamp(DateTime<Utc>),

    /// A span in nanoseconds (datetime spread).
    Duration(i64),

    /// One statistic per observed category, sorted by category.
    Categorical(BTreeMap<String, f64>),
}

impl MomentValue {
    /// Returns the scalar value, if this is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MomentValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the timestamp, if this is one.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            MomentValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Returns the duration, if this is one.
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            MomentValue::Duration(nanos) => Some(Duration::nanoseconds(*nanos)),
            _ => None,
        }
    }

    /// Returns the per-category map, if this is one.
    pub fn as_categories(&self) -> Option<&BTreeMap<String, f64>> {
        match self {
            MomentValue::Categorical(map) => Some(map),
            _ => None,
        }
    }

    /// Returns a human-readable string representation.
    pub fn to_string_pretty(&self) -> String {
        match self {
            MomentValue::Scalar(v) => {
                if v.fract() == 0.0 {
                    format!("{v:.0}")
                } else {
                    format!("{v:.4}")
                }
            }
            MomentValue::Timestamp(ts) => ts.to_rfc3339(),
            MomentValue::Duration(nanos) => {
                let duration = Duration::nanoseconds(*nanos);
                format!("{}s", duration.num_milliseconds() as f64 / 1000.0)
            }
            MomentValue::Categorical(map) => map
                .iter()
                .map(|(k, v)| format!("{k}: {v:.4}"))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl fmt::Display for MomentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_pretty())
    }
}

impl From<f64> for MomentValue {
    fn from(value: f64) -> Self {
        MomentValue::Scalar(value)
    }
}

impl From<DateTime<Utc>> for MomentValue {
    fn from(value: DateTime<Utc>) -> Self {
        MomentValue::Timestamp(value)
    }
}
