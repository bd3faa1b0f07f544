//! Data models for Health Auto Export documents
//!
//! Plain data contracts only. Metric records arrive untyped and are turned
//! into [`Metric`] by the classifier; workouts decode directly.

pub mod metadata;
pub mod metrics;
pub mod workout;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

pub use metadata::MetadataValue;
pub use metrics::{
    BloodGlucoseSample, BloodPressureSample, EcgRecord, HeartRateNotification,
    HeartRateSample, HeartRateVariationSample, HygieneSample, InsulinDeliverySample, Interval,
    Metric, MetricKind, MetricSeries, NotificationHeartRate, QuantitySample,
    SexualActivitySample, SleepAnalysisSample, StateOfMindSample, SymptomSample,
    TimestampInterval, VoltageMeasurement,
};
pub use workout::{Elevation, HeartRatePoint, Quantity, RoutePoint, Workout};

/// Top-level export document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Export {
    pub data: HealthData,
}

/// Container for metrics and workouts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthData {
    /// Untyped metric records, classified at ingestion time
    #[serde(default, deserialize_with = "array_or_empty")]
    pub metrics: Vec<serde_json::Value>,
    #[serde(default)]
    pub workouts: Vec<Workout>,
}

impl Export {
    /// Decode an export document from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::decode(e.to_string()))
    }
}

/// Anything other than an array under `metrics` counts as no metrics at all.
fn array_or_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => Ok(items),
        _ => Ok(Vec::new()),
    }
}

/// Response returned across the ingestion boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IngestResponse {
    #[serde(rename_all = "camelCase")]
    Success {
        metrics_processed: usize,
        workouts_processed: usize,
        metrics_dropped: usize,
        rows_written: usize,
    },
    Error { message: String },
}

impl IngestResponse {
    pub fn error(message: impl Into<String>) -> Self {
        IngestResponse::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, IngestResponse::Success { .. })
    }
}
