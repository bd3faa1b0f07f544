//! Record mapper
//!
//! Turns classified metrics and workouts into storage rows and pushes them
//! into a [`RowSink`] one at a time. Parents are written before their
//! children are mapped, so a failure part way through leaves a consistent
//! prefix behind.

use std::collections::BTreeMap;

use uuid::Uuid;

use super::timestamp::{storage_date, storage_timestamp};
use crate::db::{Row, RowSink, SqlValue, Table};
use crate::error::Result;
use crate::models::metadata::encode_metadata;
use crate::models::{HeartRatePoint, HygieneSample, Metric, MetricSeries, Quantity, Workout};

/// Recorded as `source` for rows whose input carries none
pub const SOURCE: &str = "Health Auto Export";

fn new_id() -> Uuid {
    Uuid::new_v4()
}

fn qty(value: &Option<Quantity>) -> Option<f64> {
    value.as_ref().map(|q| q.qty)
}

fn unit(value: &Option<Quantity>) -> Option<String> {
    value.as_ref().map(|q| q.units.clone())
}

pub struct RowMapper<'s, S: RowSink + ?Sized> {
    sink: &'s mut S,
    user_id: String,
    written: BTreeMap<Table, usize>,
}

impl<'s, S: RowSink + ?Sized> RowMapper<'s, S> {
    pub fn new(sink: &'s mut S, user_id: impl Into<String>) -> Self {
        Self {
            sink,
            user_id: user_id.into(),
            written: BTreeMap::new(),
        }
    }

    /// Rows written so far, per table
    pub fn written(&self) -> &BTreeMap<Table, usize> {
        &self.written
    }

    pub fn rows_written(&self) -> usize {
        self.written.values().sum()
    }

    pub fn into_written(self) -> BTreeMap<Table, usize> {
        self.written
    }

    async fn emit(&mut self, row: Row) -> Result<()> {
        let table = row.table();
        self.sink.write(row).await?;
        *self.written.entry(table).or_insert(0) += 1;
        Ok(())
    }

    fn parent_row(&self, table: Table, id: impl Into<SqlValue>) -> Row {
        Row::new(table)
            .with("id", id)
            .with("user_id", self.user_id.as_str())
    }

    pub async fn write_metric(&mut self, metric: &Metric) -> Result<()> {
        match metric {
            Metric::Common(series) => {
                for sample in &series.data {
                    let row = self
                        .parent_row(Table::CommonMetrics, new_id())
                        .with("metric_name", series.name.as_str())
                        .with("units", series.units.clone())
                        .with("qty", sample.qty)
                        .with("timestamp", storage_timestamp(&sample.date)?)
                        .with("source", SOURCE);
                    self.emit(row).await?;
                }
            }
            Metric::BloodPressure(series) => {
                for sample in &series.data {
                    let row = self
                        .parent_row(Table::BloodPressure, new_id())
                        .with("systolic", sample.systolic)
                        .with("diastolic", sample.diastolic)
                        .with("timestamp", storage_timestamp(&sample.date)?)
                        .with("source", SOURCE);
                    self.emit(row).await?;
                }
            }
            Metric::HeartRate(series) => {
                for sample in &series.data {
                    let row = self
                        .parent_row(Table::HeartRate, new_id())
                        .with("min_rate", sample.min)
                        .with("avg_rate", sample.avg)
                        .with("max_rate", sample.max)
                        .with("timestamp", storage_timestamp(&sample.date)?)
                        .with("source", SOURCE);
                    self.emit(row).await?;
                }
            }
            Metric::SleepAnalysis(series) => {
                for sample in &series.data {
                    let row = self
                        .parent_row(Table::SleepAnalysis, new_id())
                        .with("date", storage_date(&sample.date)?)
                        .with("asleep", sample.asleep)
                        .with("sleep_start", storage_timestamp(&sample.sleep_start)?)
                        .with("sleep_end", storage_timestamp(&sample.sleep_end)?)
                        .with("sleep_source", sample.sleep_source.as_str())
                        .with("in_bed", sample.in_bed)
                        .with("in_bed_start", storage_timestamp(&sample.in_bed_start)?)
                        .with("in_bed_end", storage_timestamp(&sample.in_bed_end)?)
                        .with("in_bed_source", sample.in_bed_source.as_str());
                    self.emit(row).await?;
                }
            }
            Metric::BloodGlucose(series) => {
                for sample in &series.data {
                    let row = self
                        .parent_row(Table::BloodGlucose, new_id())
                        .with("qty", sample.qty)
                        .with("meal_time", sample.meal_time.as_str())
                        .with("timestamp", storage_timestamp(&sample.date)?)
                        .with("source", SOURCE);
                    self.emit(row).await?;
                }
            }
            Metric::SexualActivity(series) => {
                for sample in &series.data {
                    let row = self
                        .parent_row(Table::SexualActivity, new_id())
                        .with("unspecified", sample.unspecified)
                        .with("protection_used", sample.protection_used)
                        .with("protection_not_used", sample.protection_not_used)
                        .with("timestamp", storage_timestamp(&sample.date)?)
                        .with("source", SOURCE);
                    self.emit(row).await?;
                }
            }
            Metric::Handwashing(series) => self.write_hygiene(Table::Handwashing, series).await?,
            Metric::Toothbrushing(series) => {
                self.write_hygiene(Table::Toothbrushing, series).await?
            }
            Metric::InsulinDelivery(series) => {
                for sample in &series.data {
                    let row = self
                        .parent_row(Table::InsulinDelivery, new_id())
                        .with("qty", sample.qty)
                        .with("reason", sample.reason.as_str())
                        .with("timestamp", storage_timestamp(&sample.date)?)
                        .with("source", SOURCE);
                    self.emit(row).await?;
                }
            }
            Metric::HeartRateNotifications(series) => {
                for notification in &series.data {
                    let notification_id = new_id();
                    let parent = self
                        .parent_row(Table::HeartRateNotifications, notification_id)
                        .with("start_time", storage_timestamp(&notification.start)?)
                        .with("end_time", storage_timestamp(&notification.end)?)
                        .with("threshold", notification.threshold)
                        .with("source", SOURCE);
                    self.emit(parent).await?;

                    for sample in &notification.heart_rate {
                        let row = Row::new(Table::HeartRateNotificationDetails)
                            .with("id", new_id())
                            .with("notification_id", notification_id)
                            .with("hr", Some(sample.hr))
                            .with("hrv", None::<f64>)
                            .with("start_time", storage_timestamp(&sample.timestamp.start)?)
                            .with("end_time", storage_timestamp(&sample.timestamp.end)?)
                            .with("duration", sample.timestamp.interval.duration);
                        self.emit(row).await?;
                    }

                    for sample in &notification.heart_rate_variation {
                        let row = Row::new(Table::HeartRateNotificationDetails)
                            .with("id", new_id())
                            .with("notification_id", notification_id)
                            .with("hr", None::<f64>)
                            .with("hrv", Some(sample.hrv))
                            .with("start_time", storage_timestamp(&sample.timestamp.start)?)
                            .with("end_time", storage_timestamp(&sample.timestamp.end)?)
                            .with("duration", sample.timestamp.interval.duration);
                        self.emit(row).await?;
                    }
                }
            }
            Metric::Symptoms(series) => {
                for sample in &series.data {
                    let row = self
                        .parent_row(Table::Symptoms, new_id())
                        .with("symptom_name", sample.name.as_str())
                        .with("severity", sample.severity.as_str())
                        .with("start_time", storage_timestamp(&sample.start)?)
                        .with("end_time", storage_timestamp(&sample.end)?)
                        .with("user_entered", sample.user_entered)
                        .with("source", sample.source.as_str());
                    self.emit(row).await?;
                }
            }
            Metric::StateOfMind(series) => {
                for sample in &series.data {
                    let row = self
                        .parent_row(Table::StateOfMind, sample.id.as_str())
                        .with("start_time", storage_timestamp(&sample.start)?)
                        .with("end_time", storage_timestamp(&sample.end)?)
                        .with("kind", sample.kind.as_str())
                        .with("labels", serde_json::to_string(&sample.labels)?)
                        .with("associations", serde_json::to_string(&sample.associations)?)
                        .with("valence", sample.valence)
                        .with("valence_classification", sample.valence_classification)
                        .with("metadata", encode_metadata(&sample.metadata)?);
                    self.emit(row).await?;
                }
            }
            Metric::Ecg(series) => {
                for record in &series.data {
                    let ecg_id = new_id();
                    let parent = self
                        .parent_row(Table::Ecg, ecg_id)
                        .with("start_time", storage_timestamp(&record.start)?)
                        .with("end_time", storage_timestamp(&record.end)?)
                        .with("classification", record.classification.as_str())
                        .with("severity", record.severity.as_str())
                        .with("average_heart_rate", record.average_heart_rate)
                        .with(
                            "number_of_voltage_measurements",
                            record.number_of_voltage_measurements,
                        )
                        .with("sampling_frequency", record.sampling_frequency)
                        .with("source", record.source.as_str());
                    self.emit(parent).await?;

                    for measurement in &record.voltage_measurements {
                        let row = Row::new(Table::EcgVoltageMeasurements)
                            .with("id", new_id())
                            .with("ecg_id", ecg_id)
                            .with("timestamp", storage_timestamp(&measurement.date)?)
                            .with("voltage", measurement.voltage)
                            .with("units", measurement.units.as_str());
                        self.emit(row).await?;
                    }
                }
            }
        }

        Ok(())
    }

    async fn write_hygiene(
        &mut self,
        table: Table,
        series: &MetricSeries<HygieneSample>,
    ) -> Result<()> {
        for sample in &series.data {
            let row = self
                .parent_row(table, new_id())
                .with("qty", sample.qty)
                .with("value", sample.value.as_str())
                .with("timestamp", storage_timestamp(&sample.date)?)
                .with("source", SOURCE);
            self.emit(row).await?;
        }
        Ok(())
    }

    pub async fn write_workout(&mut self, workout: &Workout) -> Result<()> {
        let workout_id = new_id();
        let elevation = workout.elevation.as_ref();

        let parent = self
            .parent_row(Table::Workouts, workout_id)
            .with("name", workout.name.as_str())
            .with("start_time", storage_timestamp(&workout.start)?)
            .with("end_time", storage_timestamp(&workout.end)?)
            .with("total_energy", qty(&workout.total_energy))
            .with("total_energy_unit", unit(&workout.total_energy))
            .with("active_energy", qty(&workout.active_energy))
            .with("active_energy_unit", unit(&workout.active_energy))
            .with("max_heart_rate", qty(&workout.max_heart_rate))
            .with("avg_heart_rate", qty(&workout.avg_heart_rate))
            .with("step_count", qty(&workout.step_count))
            .with("step_cadence", qty(&workout.step_cadence))
            .with(
                "total_swimming_stroke_count",
                qty(&workout.total_swimming_stroke_count),
            )
            .with("swim_cadence", qty(&workout.swim_cadence))
            .with("distance", qty(&workout.distance))
            .with("distance_unit", unit(&workout.distance))
            .with("speed", qty(&workout.speed))
            .with("speed_unit", unit(&workout.speed))
            .with("flights_climbed", qty(&workout.flights_climbed))
            .with("intensity", qty(&workout.intensity))
            .with("temperature", qty(&workout.temperature))
            .with("temperature_unit", unit(&workout.temperature))
            .with("humidity", qty(&workout.humidity))
            .with("elevation_ascent", elevation.map(|e| e.ascent))
            .with("elevation_descent", elevation.map(|e| e.descent))
            .with("elevation_unit", elevation.map(|e| e.units.clone()))
            .with("source", SOURCE);
        self.emit(parent).await?;

        if let Some(points) = &workout.heart_rate_data {
            self.write_workout_heart_rate(workout_id, points, false).await?;
        }
        if let Some(points) = &workout.heart_rate_recovery {
            self.write_workout_heart_rate(workout_id, points, true).await?;
        }
        if let Some(route) = &workout.route {
            for point in route {
                let row = Row::new(Table::WorkoutRoute)
                    .with("id", new_id())
                    .with("workout_id", workout_id)
                    .with("timestamp", storage_timestamp(&point.timestamp)?)
                    .with("latitude", point.lat)
                    .with("longitude", point.lon)
                    .with("altitude", point.altitude);
                self.emit(row).await?;
            }
        }

        Ok(())
    }

    async fn write_workout_heart_rate(
        &mut self,
        workout_id: Uuid,
        points: &[HeartRatePoint],
        is_recovery: bool,
    ) -> Result<()> {
        for point in points {
            let row = Row::new(Table::WorkoutHeartRate)
                .with("id", new_id())
                .with("workout_id", workout_id)
                .with("timestamp", storage_timestamp(&point.date)?)
                .with("qty", point.qty)
                .with("is_recovery", is_recovery);
            self.emit(row).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemorySink;
    use crate::error::Error;
    use crate::models::{
        BloodGlucoseSample, BloodPressureSample, EcgRecord, Elevation, HeartRateNotification,
        HeartRateSample, HeartRateVariationSample, InsulinDeliverySample, Interval,
        MetadataValue, NotificationHeartRate, QuantitySample, RoutePoint, SexualActivitySample,
        SleepAnalysisSample, StateOfMindSample, SymptomSample, TimestampInterval,
        VoltageMeasurement,
    };

    const TS: &str = "2024-01-01 08:00:00 +0000";
    const STORED: &str = "2024-01-01 08:00:00.000";

    fn series<T>(name: &str, data: Vec<T>) -> MetricSeries<T> {
        MetricSeries {
            name: name.to_string(),
            units: None,
            data,
        }
    }

    fn interval() -> TimestampInterval {
        TimestampInterval {
            start: TS.to_string(),
            end: "2024-01-01 08:01:00 +0000".to_string(),
            interval: Interval {
                duration: 60.0,
                units: "s".to_string(),
            },
        }
    }

    async fn map_metric(metric: &Metric) -> (Result<()>, Vec<Row>) {
        let mut sink = MemorySink::new();
        let result = RowMapper::new(&mut sink, "user-1").write_metric(metric).await;
        (result, sink.rows)
    }

    #[tokio::test]
    async fn test_common_metric_one_row_per_sample() {
        let metric = Metric::Common(MetricSeries {
            name: "step_count".to_string(),
            units: None,
            data: vec![
                QuantitySample { qty: 100.0, date: TS.to_string() },
                QuantitySample { qty: 0.0, date: TS.to_string() },
            ],
        });
        let (result, rows) = map_metric(&metric).await;
        result.unwrap();

        assert_eq!(rows.len(), 2);
        let row = &rows[0];
        assert_eq!(row.table(), Table::CommonMetrics);
        assert_eq!(row.get("metric_name").unwrap().as_text(), Some("step_count"));
        assert_eq!(row.get("units"), Some(&SqlValue::Null));
        assert_eq!(row.get("timestamp").unwrap().as_text(), Some(STORED));
        assert_eq!(row.get("source").unwrap().as_text(), Some(SOURCE));
        assert_eq!(row.get("user_id").unwrap().as_text(), Some("user-1"));
        // zero is a value, not an absence
        assert_eq!(rows[1].get("qty"), Some(&SqlValue::Real(0.0)));
    }

    #[tokio::test]
    async fn test_blood_pressure_row() {
        let metric = Metric::BloodPressure(series(
            "blood_pressure",
            vec![BloodPressureSample {
                date: "2024-01-01 10:00:00 +0200".to_string(),
                systolic: 120.0,
                diastolic: 80.0,
            }],
        ));
        let (result, rows) = map_metric(&metric).await;
        result.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("systolic").unwrap().as_real(), Some(120.0));
        assert_eq!(rows[0].get("diastolic").unwrap().as_real(), Some(80.0));
        assert_eq!(rows[0].get("timestamp").unwrap().as_text(), Some(STORED));
    }

    #[tokio::test]
    async fn test_heart_rate_row() {
        let metric = Metric::HeartRate(series(
            "heart_rate",
            vec![HeartRateSample {
                date: TS.to_string(),
                min: 52.0,
                avg: 68.5,
                max: 121.0,
            }],
        ));
        let (result, rows) = map_metric(&metric).await;
        result.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].table(), Table::HeartRate);
        assert_eq!(rows[0].get("min_rate").unwrap().as_real(), Some(52.0));
        assert_eq!(rows[0].get("avg_rate").unwrap().as_real(), Some(68.5));
        assert_eq!(rows[0].get("max_rate").unwrap().as_real(), Some(121.0));
        assert_eq!(rows[0].get("timestamp").unwrap().as_text(), Some(STORED));
        assert_eq!(rows[0].get("source").unwrap().as_text(), Some(SOURCE));
    }

    #[tokio::test]
    async fn test_blood_glucose_meal_time() {
        let metric = Metric::BloodGlucose(series(
            "blood_glucose",
            vec![BloodGlucoseSample {
                date: TS.to_string(),
                qty: 5.4,
                meal_time: "Before Meal".to_string(),
            }],
        ));
        let (result, rows) = map_metric(&metric).await;
        result.unwrap();

        assert_eq!(rows[0].table(), Table::BloodGlucose);
        assert_eq!(rows[0].get("qty").unwrap().as_real(), Some(5.4));
        assert_eq!(rows[0].get("meal_time").unwrap().as_text(), Some("Before Meal"));
        assert_eq!(rows[0].get("timestamp").unwrap().as_text(), Some(STORED));
    }

    #[tokio::test]
    async fn test_sexual_activity_counts() {
        let metric = Metric::SexualActivity(series(
            "sexual_activity",
            vec![SexualActivitySample {
                date: TS.to_string(),
                unspecified: 1.0,
                protection_used: 2.0,
                protection_not_used: 0.0,
            }],
        ));
        let (result, rows) = map_metric(&metric).await;
        result.unwrap();

        assert_eq!(rows[0].table(), Table::SexualActivity);
        assert_eq!(rows[0].get("unspecified").unwrap().as_real(), Some(1.0));
        assert_eq!(rows[0].get("protection_used").unwrap().as_real(), Some(2.0));
        assert_eq!(rows[0].get("protection_not_used").unwrap().as_real(), Some(0.0));
        assert_eq!(rows[0].get("source").unwrap().as_text(), Some(SOURCE));
    }

    #[tokio::test]
    async fn test_insulin_delivery_reason() {
        let metric = Metric::InsulinDelivery(series(
            "insulin_delivery",
            vec![InsulinDeliverySample {
                date: TS.to_string(),
                qty: 3.5,
                reason: "Bolus".to_string(),
            }],
        ));
        let (result, rows) = map_metric(&metric).await;
        result.unwrap();

        assert_eq!(rows[0].table(), Table::InsulinDelivery);
        assert_eq!(rows[0].get("qty").unwrap().as_real(), Some(3.5));
        assert_eq!(rows[0].get("reason").unwrap().as_text(), Some("Bolus"));
        assert_eq!(rows[0].get("timestamp").unwrap().as_text(), Some(STORED));
    }

    #[tokio::test]
    async fn test_hygiene_tables_and_values() {
        let sample = |value: &str| HygieneSample {
            date: TS.to_string(),
            qty: 20.0,
            value: value.to_string(),
        };

        let (result, rows) =
            map_metric(&Metric::Handwashing(series("handwashing", vec![sample("Complete")]))).await;
        result.unwrap();
        assert_eq!(rows[0].table(), Table::Handwashing);
        assert_eq!(rows[0].get("qty").unwrap().as_real(), Some(20.0));
        assert_eq!(rows[0].get("value").unwrap().as_text(), Some("Complete"));

        let (result, rows) = map_metric(&Metric::Toothbrushing(series(
            "toothbrushing",
            vec![sample("Incomplete")],
        )))
        .await;
        result.unwrap();
        assert_eq!(rows[0].table(), Table::Toothbrushing);
        assert_eq!(rows[0].get("value").unwrap().as_text(), Some("Incomplete"));
        assert_eq!(rows[0].get("timestamp").unwrap().as_text(), Some(STORED));
    }

    #[tokio::test]
    async fn test_sleep_date_truncated() {
        let metric = Metric::SleepAnalysis(series(
            "sleep_analysis",
            vec![SleepAnalysisSample {
                date: "2024-03-05 00:00:00 +0000".to_string(),
                asleep: 7.5,
                sleep_start: TS.to_string(),
                sleep_end: TS.to_string(),
                sleep_source: "Watch".to_string(),
                in_bed: 8.0,
                in_bed_start: TS.to_string(),
                in_bed_end: TS.to_string(),
                in_bed_source: "Phone".to_string(),
            }],
        ));
        let (result, rows) = map_metric(&metric).await;
        result.unwrap();
        assert_eq!(rows[0].get("date").unwrap().as_text(), Some("2024-03-05"));
        assert_eq!(rows[0].get("sleep_start").unwrap().as_text(), Some(STORED));
    }

    #[tokio::test]
    async fn test_symptoms_keep_own_source() {
        let metric = Metric::Symptoms(series(
            "Symptoms",
            vec![SymptomSample {
                start: TS.to_string(),
                end: TS.to_string(),
                name: "Headache".to_string(),
                severity: "Mild".to_string(),
                user_entered: true,
                source: "Health".to_string(),
            }],
        ));
        let (result, rows) = map_metric(&metric).await;
        result.unwrap();
        assert_eq!(rows[0].get("source").unwrap().as_text(), Some("Health"));
        assert_eq!(rows[0].get("user_entered"), Some(&SqlValue::Integer(1)));
        assert_eq!(rows[0].get("symptom_name").unwrap().as_text(), Some("Headache"));
    }

    #[tokio::test]
    async fn test_heart_rate_notification_fan_out() {
        let metric = Metric::HeartRateNotifications(series(
            "Heart Rate Notifications",
            vec![HeartRateNotification {
                start: TS.to_string(),
                end: TS.to_string(),
                threshold: None,
                heart_rate: vec![
                    NotificationHeartRate { hr: 130.0, units: "bpm".to_string(), timestamp: interval() },
                    NotificationHeartRate { hr: 135.0, units: "bpm".to_string(), timestamp: interval() },
                ],
                heart_rate_variation: vec![HeartRateVariationSample {
                    hrv: 42.0,
                    units: "ms".to_string(),
                    timestamp: interval(),
                }],
            }],
        ));
        let (result, rows) = map_metric(&metric).await;
        result.unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].table(), Table::HeartRateNotifications);
        assert_eq!(rows[0].get("threshold"), Some(&SqlValue::Null));
        let parent_id = rows[0].get("id").unwrap().as_text().unwrap();

        let details = &rows[1..];
        for detail in details {
            assert_eq!(detail.table(), Table::HeartRateNotificationDetails);
            assert_eq!(detail.get("notification_id").unwrap().as_text(), Some(parent_id));
            assert_eq!(detail.get("duration").unwrap().as_real(), Some(60.0));
        }
        assert_eq!(details[0].get("hr").unwrap().as_real(), Some(130.0));
        assert_eq!(details[0].get("hrv"), Some(&SqlValue::Null));
        assert_eq!(details[2].get("hr"), Some(&SqlValue::Null));
        assert_eq!(details[2].get("hrv").unwrap().as_real(), Some(42.0));
    }

    fn ecg(voltages: usize) -> EcgRecord {
        EcgRecord {
            start: TS.to_string(),
            end: TS.to_string(),
            classification: "Sinus Rhythm".to_string(),
            severity: "None".to_string(),
            average_heart_rate: 72.0,
            number_of_voltage_measurements: voltages as i32,
            voltage_measurements: (0..voltages)
                .map(|i| VoltageMeasurement {
                    date: TS.to_string(),
                    voltage: i as f64 * 0.1,
                    units: "mV".to_string(),
                })
                .collect(),
            sampling_frequency: 512.0,
            source: "Apple Watch".to_string(),
        }
    }

    #[tokio::test]
    async fn test_ecg_parent_and_voltages() {
        let (result, rows) = map_metric(&Metric::Ecg(series("ECG", vec![ecg(3)]))).await;
        result.unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].table(), Table::Ecg);
        assert_eq!(rows[0].get("source").unwrap().as_text(), Some("Apple Watch"));
        let ecg_id = rows[0].get("id").unwrap().as_text().unwrap();
        assert!(rows[1..]
            .iter()
            .all(|r| r.get("ecg_id").unwrap().as_text() == Some(ecg_id)));

        let (result, rows) = map_metric(&Metric::Ecg(series("ECG", vec![ecg(0)]))).await;
        result.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("number_of_voltage_measurements"), Some(&SqlValue::Integer(0)));
    }

    #[tokio::test]
    async fn test_state_of_mind_json_columns() {
        let mut metadata = BTreeMap::new();
        metadata.insert("b".to_string(), MetadataValue::Integer(2));
        metadata.insert("a".to_string(), MetadataValue::String("x".to_string()));

        let metric = Metric::StateOfMind(series(
            "State of Mind",
            vec![StateOfMindSample {
                id: "som-1".to_string(),
                start: TS.to_string(),
                end: TS.to_string(),
                kind: "daily_mood".to_string(),
                labels: vec!["calm".to_string(), "content".to_string()],
                associations: vec![],
                valence: 0.4,
                valence_classification: 5,
                metadata,
            }],
        ));
        let (result, rows) = map_metric(&metric).await;
        result.unwrap();

        let row = &rows[0];
        assert_eq!(row.get("id").unwrap().as_text(), Some("som-1"));
        assert_eq!(row.get("labels").unwrap().as_text(), Some(r#"["calm","content"]"#));
        assert_eq!(row.get("associations").unwrap().as_text(), Some("[]"));
        assert_eq!(row.get("metadata").unwrap().as_text(), Some(r#"{"a":"x","b":2}"#));
        assert_eq!(row.get("valence_classification"), Some(&SqlValue::Integer(5)));
    }

    #[tokio::test]
    async fn test_minimal_workout_single_row() {
        let mut sink = MemorySink::new();
        let mut mapper = RowMapper::new(&mut sink, "user-1");
        mapper
            .write_workout(&Workout::new("Walk", TS, "2024-01-01 09:00:00 +0000"))
            .await
            .unwrap();
        assert_eq!(mapper.rows_written(), 1);

        let row = &sink.rows[0];
        assert_eq!(row.table(), Table::Workouts);
        let nulls = row.values().iter().filter(|(_, v)| v.is_null()).count();
        assert_eq!(nulls, 22);
        assert_eq!(row.get("end_time").unwrap().as_text(), Some("2024-01-01 09:00:00.000"));
    }

    #[tokio::test]
    async fn test_workout_children() {
        let point = |qty: f64| HeartRatePoint {
            date: TS.to_string(),
            qty,
            units: "bpm".to_string(),
        };
        let mut workout = Workout::new("Run", TS, TS);
        workout.heart_rate_data = Some(vec![point(120.0), point(150.0)]);
        workout.heart_rate_recovery = Some(vec![point(100.0)]);
        workout.route = Some(vec![RoutePoint {
            lat: 51.5,
            lon: -0.12,
            altitude: 11.0,
            timestamp: TS.to_string(),
        }]);
        workout.distance = Some(Quantity { qty: 5.2, units: "km".to_string() });
        workout.elevation = Some(Elevation { ascent: 40.0, descent: 38.0, units: "m".to_string() });

        let mut sink = MemorySink::new();
        let mut mapper = RowMapper::new(&mut sink, "user-1");
        mapper.write_workout(&workout).await.unwrap();
        let written = mapper.into_written();
        assert_eq!(written[&Table::Workouts], 1);
        assert_eq!(written[&Table::WorkoutHeartRate], 3);
        assert_eq!(written[&Table::WorkoutRoute], 1);

        let parent = &sink.rows[0];
        assert_eq!(parent.get("distance_unit").unwrap().as_text(), Some("km"));
        assert_eq!(parent.get("elevation_ascent").unwrap().as_real(), Some(40.0));
        let workout_id = parent.get("id").unwrap().as_text().unwrap();

        let recovery: Vec<i64> = sink.rows[1..4]
            .iter()
            .map(|r| r.get("is_recovery").unwrap().as_integer().unwrap())
            .collect();
        assert_eq!(recovery, vec![0, 0, 1]);
        assert!(sink.rows[1..]
            .iter()
            .all(|r| r.get("workout_id").unwrap().as_text() == Some(workout_id)));
    }

    #[tokio::test]
    async fn test_bad_timestamp_stops_mid_series() {
        let metric = Metric::Common(series(
            "step_count",
            vec![
                QuantitySample { qty: 1.0, date: TS.to_string() },
                QuantitySample { qty: 2.0, date: "yesterday".to_string() },
                QuantitySample { qty: 3.0, date: TS.to_string() },
            ],
        ));
        let (result, rows) = map_metric(&metric).await;

        assert!(matches!(result, Err(Error::Timestamp { .. })));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("qty").unwrap().as_real(), Some(1.0));
    }

    #[tokio::test]
    async fn test_short_sleep_date_fails_row() {
        let metric = Metric::SleepAnalysis(series(
            "sleep_analysis",
            vec![SleepAnalysisSample {
                date: "2024-3-5".to_string(),
                asleep: 1.0,
                sleep_start: TS.to_string(),
                sleep_end: TS.to_string(),
                sleep_source: "s".to_string(),
                in_bed: 1.0,
                in_bed_start: TS.to_string(),
                in_bed_end: TS.to_string(),
                in_bed_source: "s".to_string(),
            }],
        ));
        let (result, rows) = map_metric(&metric).await;
        assert!(matches!(result, Err(Error::Date { .. })));
        assert!(rows.is_empty());
    }
}
