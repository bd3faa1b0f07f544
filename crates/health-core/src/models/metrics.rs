//! Metric record variants
//!
//! Each variant is a [`MetricSeries`] over its own sample shape. Field names
//! follow the export format, which mixes camelCase with a few capitalized and
//! space-separated keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::metadata::MetadataValue;

/// One metric record: a named signal with its ordered samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries<T> {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub units: Option<String>,
    pub data: Vec<T>,
}

/// Explicit tag for each metric variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Common,
    BloodPressure,
    HeartRate,
    SleepAnalysis,
    BloodGlucose,
    SexualActivity,
    Handwashing,
    Toothbrushing,
    InsulinDelivery,
    HeartRateNotifications,
    Symptoms,
    StateOfMind,
    Ecg,
}

impl MetricKind {
    pub const ALL: [MetricKind; 13] = [
        MetricKind::Common,
        MetricKind::BloodPressure,
        MetricKind::HeartRate,
        MetricKind::SleepAnalysis,
        MetricKind::BloodGlucose,
        MetricKind::SexualActivity,
        MetricKind::Handwashing,
        MetricKind::Toothbrushing,
        MetricKind::InsulinDelivery,
        MetricKind::HeartRateNotifications,
        MetricKind::Symptoms,
        MetricKind::StateOfMind,
        MetricKind::Ecg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Common => "common",
            MetricKind::BloodPressure => "blood_pressure",
            MetricKind::HeartRate => "heart_rate",
            MetricKind::SleepAnalysis => "sleep_analysis",
            MetricKind::BloodGlucose => "blood_glucose",
            MetricKind::SexualActivity => "sexual_activity",
            MetricKind::Handwashing => "handwashing",
            MetricKind::Toothbrushing => "toothbrushing",
            MetricKind::InsulinDelivery => "insulin_delivery",
            MetricKind::HeartRateNotifications => "heart_rate_notifications",
            MetricKind::Symptoms => "symptoms",
            MetricKind::StateOfMind => "state_of_mind",
            MetricKind::Ecg => "ecg",
        }
    }

    /// Name used when a record does not carry one
    pub fn display_name(&self) -> &'static str {
        match self {
            MetricKind::Common => "Common",
            MetricKind::BloodPressure => "Blood Pressure",
            MetricKind::HeartRate => "Heart Rate",
            MetricKind::SleepAnalysis => "Sleep Analysis",
            MetricKind::BloodGlucose => "Blood Glucose",
            MetricKind::SexualActivity => "Sexual Activity",
            MetricKind::Handwashing => "Handwashing",
            MetricKind::Toothbrushing => "Toothbrushing",
            MetricKind::InsulinDelivery => "Insulin Delivery",
            MetricKind::HeartRateNotifications => "Heart Rate Notifications",
            MetricKind::Symptoms => "Symptoms",
            MetricKind::StateOfMind => "State of Mind",
            MetricKind::Ecg => "ECG",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified metric record. Only the classifier builds these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Metric {
    Common(MetricSeries<QuantitySample>),
    BloodPressure(MetricSeries<BloodPressureSample>),
    HeartRate(MetricSeries<HeartRateSample>),
    SleepAnalysis(MetricSeries<SleepAnalysisSample>),
    BloodGlucose(MetricSeries<BloodGlucoseSample>),
    SexualActivity(MetricSeries<SexualActivitySample>),
    Handwashing(MetricSeries<HygieneSample>),
    Toothbrushing(MetricSeries<HygieneSample>),
    InsulinDelivery(MetricSeries<InsulinDeliverySample>),
    HeartRateNotifications(MetricSeries<HeartRateNotification>),
    Symptoms(MetricSeries<SymptomSample>),
    StateOfMind(MetricSeries<StateOfMindSample>),
    Ecg(MetricSeries<EcgRecord>),
}

impl Metric {
    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::Common(_) => MetricKind::Common,
            Metric::BloodPressure(_) => MetricKind::BloodPressure,
            Metric::HeartRate(_) => MetricKind::HeartRate,
            Metric::SleepAnalysis(_) => MetricKind::SleepAnalysis,
            Metric::BloodGlucose(_) => MetricKind::BloodGlucose,
            Metric::SexualActivity(_) => MetricKind::SexualActivity,
            Metric::Handwashing(_) => MetricKind::Handwashing,
            Metric::Toothbrushing(_) => MetricKind::Toothbrushing,
            Metric::InsulinDelivery(_) => MetricKind::InsulinDelivery,
            Metric::HeartRateNotifications(_) => MetricKind::HeartRateNotifications,
            Metric::Symptoms(_) => MetricKind::Symptoms,
            Metric::StateOfMind(_) => MetricKind::StateOfMind,
            Metric::Ecg(_) => MetricKind::Ecg,
        }
    }

    /// Record name, falling back to the variant's display name when empty
    pub fn name(&self) -> &str {
        let name = match self {
            Metric::Common(m) => &m.name,
            Metric::BloodPressure(m) => &m.name,
            Metric::HeartRate(m) => &m.name,
            Metric::SleepAnalysis(m) => &m.name,
            Metric::BloodGlucose(m) => &m.name,
            Metric::SexualActivity(m) => &m.name,
            Metric::Handwashing(m) => &m.name,
            Metric::Toothbrushing(m) => &m.name,
            Metric::InsulinDelivery(m) => &m.name,
            Metric::HeartRateNotifications(m) => &m.name,
            Metric::Symptoms(m) => &m.name,
            Metric::StateOfMind(m) => &m.name,
            Metric::Ecg(m) => &m.name,
        };
        if name.is_empty() {
            self.kind().display_name()
        } else {
            name
        }
    }

    pub fn sample_count(&self) -> usize {
        match self {
            Metric::Common(m) => m.data.len(),
            Metric::BloodPressure(m) => m.data.len(),
            Metric::HeartRate(m) => m.data.len(),
            Metric::SleepAnalysis(m) => m.data.len(),
            Metric::BloodGlucose(m) => m.data.len(),
            Metric::SexualActivity(m) => m.data.len(),
            Metric::Handwashing(m) => m.data.len(),
            Metric::Toothbrushing(m) => m.data.len(),
            Metric::InsulinDelivery(m) => m.data.len(),
            Metric::HeartRateNotifications(m) => m.data.len(),
            Metric::Symptoms(m) => m.data.len(),
            Metric::StateOfMind(m) => m.data.len(),
            Metric::Ecg(m) => m.data.len(),
        }
    }
}

/// Generic quantity + timestamp sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantitySample {
    pub qty: f64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodPressureSample {
    pub date: String,
    pub systolic: f64,
    pub diastolic: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    pub date: String,
    #[serde(rename = "Min")]
    pub min: f64,
    #[serde(rename = "Avg")]
    pub avg: f64,
    #[serde(rename = "Max")]
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepAnalysisSample {
    /// Calendar day; only the first 10 characters are meaningful
    pub date: String,
    pub asleep: f64,
    pub sleep_start: String,
    pub sleep_end: String,
    pub sleep_source: String,
    pub in_bed: f64,
    pub in_bed_start: String,
    pub in_bed_end: String,
    pub in_bed_source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodGlucoseSample {
    pub date: String,
    pub qty: f64,
    /// "Before Meal" | "After Meal" | "Unspecified"
    pub meal_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SexualActivitySample {
    pub date: String,
    #[serde(rename = "Unspecified")]
    pub unspecified: f64,
    #[serde(rename = "Protection Used")]
    pub protection_used: f64,
    #[serde(rename = "Protection Not Used")]
    pub protection_not_used: f64,
}

/// Shared by handwashing and toothbrushing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HygieneSample {
    pub date: String,
    pub qty: f64,
    /// "Complete" | "Incomplete"
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsulinDeliverySample {
    pub date: String,
    pub qty: f64,
    /// "Bolus" | "Basal"
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartRateNotification {
    pub start: String,
    pub end: String,
    /// Only set for high/low heart rate notifications
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub heart_rate: Vec<NotificationHeartRate>,
    #[serde(default)]
    pub heart_rate_variation: Vec<HeartRateVariationSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationHeartRate {
    pub hr: f64,
    #[serde(default = "bpm")]
    pub units: String,
    pub timestamp: TimestampInterval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateVariationSample {
    pub hrv: f64,
    #[serde(default = "milliseconds")]
    pub units: String,
    pub timestamp: TimestampInterval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampInterval {
    pub start: String,
    pub end: String,
    pub interval: Interval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub duration: f64,
    #[serde(default = "seconds")]
    pub units: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomSample {
    pub start: String,
    pub end: String,
    pub name: String,
    pub severity: String,
    pub user_entered: bool,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateOfMindSample {
    pub id: String,
    pub start: String,
    pub end: String,
    pub kind: String,
    pub labels: Vec<String>,
    pub associations: Vec<String>,
    pub valence: f64,
    pub valence_classification: i32,
    #[serde(default)]
    pub metadata: BTreeMap<String, MetadataValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcgRecord {
    pub start: String,
    pub end: String,
    /// "Sinus Rhythm" | "Atrial Fibrillation" | ...
    pub classification: String,
    pub severity: String,
    pub average_heart_rate: f64,
    pub number_of_voltage_measurements: i32,
    pub voltage_measurements: Vec<VoltageMeasurement>,
    /// Hz
    pub sampling_frequency: f64,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageMeasurement {
    pub date: String,
    pub voltage: f64,
    pub units: String,
}

fn bpm() -> String {
    "bpm".to_string()
}

fn milliseconds() -> String {
    "ms".to_string()
}

fn seconds() -> String {
    "s".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_kind_as_str_unique() {
        let mut names: Vec<&str> = MetricKind::ALL.iter().map(|k| k.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), MetricKind::ALL.len());
    }

    #[test]
    fn test_metric_name_falls_back_to_display_name() {
        let metric = Metric::BloodPressure(MetricSeries {
            name: String::new(),
            units: None,
            data: vec![],
        });
        assert_eq!(metric.name(), "Blood Pressure");
        assert_eq!(metric.kind(), MetricKind::BloodPressure);
        assert_eq!(metric.sample_count(), 0);
    }

    #[test]
    fn test_heart_rate_sample_capitalized_fields() {
        let sample: HeartRateSample = serde_json::from_str(
            r#"{"date": "2024-01-01 08:00:00 +0000", "Min": 55, "Avg": 70.5, "Max": 120}"#,
        )
        .unwrap();
        assert_eq!(sample.min, 55.0);
        assert_eq!(sample.avg, 70.5);
        assert_eq!(sample.max, 120.0);
    }

    #[test]
    fn test_notification_defaults() {
        let notification: HeartRateNotification = serde_json::from_str(
            r#"{
                "start": "2024-01-01 08:00:00 +0000",
                "end": "2024-01-01 08:10:00 +0000",
                "heartRate": [{
                    "hr": 130,
                    "timestamp": {
                        "start": "2024-01-01 08:00:00 +0000",
                        "end": "2024-01-01 08:01:00 +0000",
                        "interval": {"duration": 60}
                    }
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(notification.threshold, None);
        assert_eq!(notification.heart_rate[0].units, "bpm");
        assert_eq!(notification.heart_rate[0].timestamp.interval.units, "s");
        assert!(notification.heart_rate_variation.is_empty());
    }

    #[test]
    fn test_state_of_mind_metadata_defaults_empty() {
        let sample: StateOfMindSample = serde_json::from_str(
            r#"{
                "id": "som-1",
                "start": "2024-01-01 08:00:00 +0000",
                "end": "2024-01-01 08:00:00 +0000",
                "kind": "momentary_emotion",
                "labels": ["calm"],
                "associations": ["work"],
                "valence": 0.4,
                "valenceClassification": 5
            }"#,
        )
        .unwrap();
        assert!(sample.metadata.is_empty());
        assert_eq!(sample.valence_classification, 5);
    }
}
