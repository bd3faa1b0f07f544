//! Metric classifier
//!
//! Export metric records carry no type tag. The variant is inferred from the
//! field names present on the record and on its samples, using an ordered
//! precedence list where the first match wins. Several variants share field
//! names (`qty`, `date`, `severity`), so the order is part of the contract.
//!
//! A record that matches a predicate but does not decode under that
//! variant's shape is dropped, as is one that fails the CommonMetric
//! fallback. Drops never fail the batch; they are counted and logged.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{Metric, MetricKind, MetricSeries};

/// Field names visible to the predicates
pub struct FieldSet<'a> {
    keys: HashSet<&'a str>,
    name: Option<&'a str>,
}

impl<'a> FieldSet<'a> {
    /// Top-level keys plus the keys of every sample object in `data`
    pub fn from_record(record: &'a Map<String, Value>) -> Self {
        let mut keys: HashSet<&'a str> = record.keys().map(String::as_str).collect();
        if let Some(Value::Array(samples)) = record.get("data") {
            for sample in samples {
                if let Value::Object(fields) = sample {
                    keys.extend(fields.keys().map(String::as_str));
                }
            }
        }

        Self {
            keys,
            name: record.get("name").and_then(Value::as_str),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    fn named(&self, name: &str) -> bool {
        self.name == Some(name)
    }
}

type Predicate = fn(&FieldSet<'_>) -> bool;

/// Ordered precedence list. Anything unmatched falls back to CommonMetric.
pub const PRECEDENCE: &[(MetricKind, Predicate)] = &[
    (MetricKind::BloodPressure, |f| f.has("systolic") && f.has("diastolic")),
    (MetricKind::HeartRate, |f| f.has("Min") && f.has("Avg") && f.has("Max")),
    (MetricKind::SleepAnalysis, |f| f.has("sleepStart") && f.has("sleepEnd")),
    (MetricKind::BloodGlucose, |f| f.has("mealTime")),
    (MetricKind::SexualActivity, |f| {
        f.has("Protection Used") || f.has("Protection Not Used")
    }),
    (MetricKind::Handwashing, |f| f.has("value") && f.named("Handwashing")),
    (MetricKind::Toothbrushing, |f| f.has("value") && f.named("Toothbrushing")),
    (MetricKind::InsulinDelivery, |f| f.has("reason")),
    (MetricKind::Ecg, |f| f.has("voltageMeasurements")),
    (MetricKind::HeartRateNotifications, |f| {
        f.has("heartRate") || f.has("heartRateVariation") || f.has("threshold")
    }),
    (MetricKind::StateOfMind, |f| f.has("valence")),
    (MetricKind::Symptoms, |f| f.has("severity") && f.has("userEntered")),
];

/// Pick the variant for a record without decoding it
pub fn detect_kind(fields: &FieldSet<'_>) -> MetricKind {
    PRECEDENCE
        .iter()
        .find(|(_, matches)| matches(fields))
        .map(|(kind, _)| *kind)
        .unwrap_or(MetricKind::Common)
}

/// Why a record was not kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DropReason {
    NotAnObject,
    Malformed { kind: MetricKind, message: String },
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::NotAnObject => write!(f, "record is not a JSON object"),
            DropReason::Malformed { kind, message } => {
                write!(f, "does not decode as {}: {}", kind, message)
            }
        }
    }
}

/// A record the classifier discarded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedRecord {
    /// Position in the export's metric list
    pub index: usize,
    pub name: Option<String>,
    pub reason: DropReason,
}

/// Outcome of classifying a whole metric list
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub metrics: Vec<Metric>,
    pub dropped: Vec<DroppedRecord>,
}

impl Classification {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

fn decode<T: DeserializeOwned>(
    record: &Value,
    kind: MetricKind,
) -> Result<MetricSeries<T>, DropReason> {
    MetricSeries::<T>::deserialize(record).map_err(|e| DropReason::Malformed {
        kind,
        message: e.to_string(),
    })
}

/// Classify and decode one untyped record
pub fn classify(record: &Value) -> Result<Metric, DropReason> {
    let fields = match record {
        Value::Object(map) => FieldSet::from_record(map),
        _ => return Err(DropReason::NotAnObject),
    };

    let kind = detect_kind(&fields);
    let metric = match kind {
        MetricKind::BloodPressure => Metric::BloodPressure(decode(record, kind)?),
        MetricKind::HeartRate => Metric::HeartRate(decode(record, kind)?),
        MetricKind::SleepAnalysis => Metric::SleepAnalysis(decode(record, kind)?),
        MetricKind::BloodGlucose => Metric::BloodGlucose(decode(record, kind)?),
        MetricKind::SexualActivity => Metric::SexualActivity(decode(record, kind)?),
        MetricKind::Handwashing => Metric::Handwashing(decode(record, kind)?),
        MetricKind::Toothbrushing => Metric::Toothbrushing(decode(record, kind)?),
        MetricKind::InsulinDelivery => Metric::InsulinDelivery(decode(record, kind)?),
        MetricKind::Ecg => Metric::Ecg(decode(record, kind)?),
        MetricKind::HeartRateNotifications => {
            Metric::HeartRateNotifications(decode(record, kind)?)
        }
        MetricKind::StateOfMind => Metric::StateOfMind(decode(record, kind)?),
        MetricKind::Symptoms => Metric::Symptoms(decode(record, kind)?),
        MetricKind::Common => {
            let series = decode(record, kind)?;
            // The generic table keys rows by metric name
            if series.name.trim().is_empty() {
                return Err(DropReason::Malformed {
                    kind,
                    message: "missing metric name".to_string(),
                });
            }
            Metric::Common(series)
        }
    };

    Ok(metric)
}

/// Classify every record, keeping order and counting drops
pub fn classify_all(records: &[Value]) -> Classification {
    let mut classification = Classification::default();

    for (index, record) in records.iter().enumerate() {
        match classify(record) {
            Ok(metric) => {
                log::debug!(
                    "[classifier] #{} '{}' -> {} ({} samples)",
                    index,
                    metric.name(),
                    metric.kind(),
                    metric.sample_count()
                );
                classification.metrics.push(metric);
            }
            Err(reason) => {
                let name = record.get("name").and_then(Value::as_str).map(String::from);
                log::warn!(
                    "[classifier] Dropped metric record #{} ({}): {}",
                    index,
                    name.as_deref().unwrap_or("unnamed"),
                    reason
                );
                classification.dropped.push(DroppedRecord {
                    index,
                    name,
                    reason,
                });
            }
        }
    }

    classification
}
