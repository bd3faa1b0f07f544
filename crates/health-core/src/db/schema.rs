//! Storage schema contract
//!
//! One parent table per metric variant and for workouts, plus the child
//! tables that hang off a parent's generated id. Every table is indexed for
//! time-range scans: `(user_id, <timestamp>)` for parents and
//! `(<parent>_id, <timestamp>)` for children.

/// Logical column type; SQLite storage class in parentheses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// TEXT
    Text,
    /// REAL
    Real,
    /// INTEGER
    Integer,
    /// TEXT, UTC `YYYY-MM-DD HH:MM:SS.mmm`
    Timestamp,
    /// TEXT, `YYYY-MM-DD`
    Date,
    /// TEXT holding a JSON document
    Json,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Real => "REAL",
            ColumnType::Integer => "INTEGER",
            ColumnType::Text | ColumnType::Timestamp | ColumnType::Date | ColumnType::Json => {
                "TEXT"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
}

const fn col(name: &'static str, ty: ColumnType) -> Column {
    Column { name, ty, nullable: false }
}

const fn opt(name: &'static str, ty: ColumnType) -> Column {
    Column { name, ty, nullable: true }
}

use ColumnType::{Date, Integer, Json, Real, Text, Timestamp};

const COMMON_METRICS: &[Column] = &[
    col("id", Text),
    col("user_id", Text),
    col("metric_name", Text),
    opt("units", Text),
    col("qty", Real),
    col("timestamp", Timestamp),
    col("source", Text),
];

const BLOOD_PRESSURE: &[Column] = &[
    col("id", Text),
    col("user_id", Text),
    col("systolic", Real),
    col("diastolic", Real),
    col("timestamp", Timestamp),
    col("source", Text),
];

const HEART_RATE: &[Column] = &[
    col("id", Text),
    col("user_id", Text),
    col("min_rate", Real),
    col("avg_rate", Real),
    col("max_rate", Real),
    col("timestamp", Timestamp),
    col("source", Text),
];

const SLEEP_ANALYSIS: &[Column] = &[
    col("id", Text),
    col("user_id", Text),
    col("date", Date),
    col("asleep", Real),
    col("sleep_start", Timestamp),
    col("sleep_end", Timestamp),
    col("sleep_source", Text),
    col("in_bed", Real),
    col("in_bed_start", Timestamp),
    col("in_bed_end", Timestamp),
    col("in_bed_source", Text),
];

const BLOOD_GLUCOSE: &[Column] = &[
    col("id", Text),
    col("user_id", Text),
    col("qty", Real),
    col("meal_time", Text),
    col("timestamp", Timestamp),
    col("source", Text),
];

const SEXUAL_ACTIVITY: &[Column] = &[
    col("id", Text),
    col("user_id", Text),
    col("unspecified", Real),
    col("protection_used", Real),
    col("protection_not_used", Real),
    col("timestamp", Timestamp),
    col("source", Text),
];

// handwashing and toothbrushing share a layout
const HYGIENE: &[Column] = &[
    col("id", Text),
    col("user_id", Text),
    col("qty", Real),
    col("value", Text),
    col("timestamp", Timestamp),
    col("source", Text),
];

const INSULIN_DELIVERY: &[Column] = &[
    col("id", Text),
    col("user_id", Text),
    col("qty", Real),
    col("reason", Text),
    col("timestamp", Timestamp),
    col("source", Text),
];

const HEART_RATE_NOTIFICATIONS: &[Column] = &[
    col("id", Text),
    col("user_id", Text),
    col("start_time", Timestamp),
    col("end_time", Timestamp),
    opt("threshold", Real),
    col("source", Text),
];

const HEART_RATE_NOTIFICATION_DETAILS: &[Column] = &[
    col("id", Text),
    col("notification_id", Text),
    opt("hr", Real),
    opt("hrv", Real),
    col("start_time", Timestamp),
    col("end_time", Timestamp),
    col("duration", Real),
];

const SYMPTOMS: &[Column] = &[
    col("id", Text),
    col("user_id", Text),
    col("symptom_name", Text),
    col("severity", Text),
    col("start_time", Timestamp),
    col("end_time", Timestamp),
    col("user_entered", Integer),
    col("source", Text),
];

const STATE_OF_MIND: &[Column] = &[
    col("id", Text),
    col("user_id", Text),
    col("start_time", Timestamp),
    col("end_time", Timestamp),
    col("kind", Text),
    col("labels", Json),
    col("associations", Json),
    col("valence", Real),
    col("valence_classification", Integer),
    col("metadata", Json),
];

const ECG: &[Column] = &[
    col("id", Text),
    col("user_id", Text),
    col("start_time", Timestamp),
    col("end_time", Timestamp),
    col("classification", Text),
    col("severity", Text),
    col("average_heart_rate", Real),
    col("number_of_voltage_measurements", Integer),
    col("sampling_frequency", Real),
    col("source", Text),
];

const ECG_VOLTAGE_MEASUREMENTS: &[Column] = &[
    col("id", Text),
    col("ecg_id", Text),
    col("timestamp", Timestamp),
    col("voltage", Real),
    col("units", Text),
];

const WORKOUTS: &[Column] = &[
    col("id", Text),
    col("user_id", Text),
    col("name", Text),
    col("start_time", Timestamp),
    col("end_time", Timestamp),
    opt("total_energy", Real),
    opt("total_energy_unit", Text),
    opt("active_energy", Real),
    opt("active_energy_unit", Text),
    opt("max_heart_rate", Real),
    opt("avg_heart_rate", Real),
    opt("step_count", Real),
    opt("step_cadence", Real),
    opt("total_swimming_stroke_count", Real),
    opt("swim_cadence", Real),
    opt("distance", Real),
    opt("distance_unit", Text),
    opt("speed", Real),
    opt("speed_unit", Text),
    opt("flights_climbed", Real),
    opt("intensity", Real),
    opt("temperature", Real),
    opt("temperature_unit", Text),
    opt("humidity", Real),
    opt("elevation_ascent", Real),
    opt("elevation_descent", Real),
    opt("elevation_unit", Text),
    col("source", Text),
];

const WORKOUT_HEART_RATE: &[Column] = &[
    col("id", Text),
    col("workout_id", Text),
    col("timestamp", Timestamp),
    col("qty", Real),
    col("is_recovery", Integer),
];

const WORKOUT_ROUTE: &[Column] = &[
    col("id", Text),
    col("workout_id", Text),
    col("timestamp", Timestamp),
    col("latitude", Real),
    col("longitude", Real),
    col("altitude", Real),
];

/// Destination tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    CommonMetrics,
    BloodPressure,
    HeartRate,
    SleepAnalysis,
    BloodGlucose,
    SexualActivity,
    Handwashing,
    Toothbrushing,
    InsulinDelivery,
    HeartRateNotifications,
    HeartRateNotificationDetails,
    Symptoms,
    StateOfMind,
    Ecg,
    EcgVoltageMeasurements,
    Workouts,
    WorkoutHeartRate,
    WorkoutRoute,
}

impl Table {
    pub const ALL: [Table; 18] = [
        Table::CommonMetrics,
        Table::BloodPressure,
        Table::HeartRate,
        Table::SleepAnalysis,
        Table::BloodGlucose,
        Table::SexualActivity,
        Table::Handwashing,
        Table::Toothbrushing,
        Table::InsulinDelivery,
        Table::HeartRateNotifications,
        Table::HeartRateNotificationDetails,
        Table::Symptoms,
        Table::StateOfMind,
        Table::Ecg,
        Table::EcgVoltageMeasurements,
        Table::Workouts,
        Table::WorkoutHeartRate,
        Table::WorkoutRoute,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::CommonMetrics => "common_metrics",
            Table::BloodPressure => "blood_pressure",
            Table::HeartRate => "heart_rate",
            Table::SleepAnalysis => "sleep_analysis",
            Table::BloodGlucose => "blood_glucose",
            Table::SexualActivity => "sexual_activity",
            Table::Handwashing => "handwashing",
            Table::Toothbrushing => "toothbrushing",
            Table::InsulinDelivery => "insulin_delivery",
            Table::HeartRateNotifications => "heart_rate_notifications",
            Table::HeartRateNotificationDetails => "heart_rate_notification_details",
            Table::Symptoms => "symptoms",
            Table::StateOfMind => "state_of_mind",
            Table::Ecg => "ecg",
            Table::EcgVoltageMeasurements => "ecg_voltage_measurements",
            Table::Workouts => "workouts",
            Table::WorkoutHeartRate => "workout_heart_rate",
            Table::WorkoutRoute => "workout_route",
        }
    }

    pub fn columns(&self) -> &'static [Column] {
        match self {
            Table::CommonMetrics => COMMON_METRICS,
            Table::BloodPressure => BLOOD_PRESSURE,
            Table::HeartRate => HEART_RATE,
            Table::SleepAnalysis => SLEEP_ANALYSIS,
            Table::BloodGlucose => BLOOD_GLUCOSE,
            Table::SexualActivity => SEXUAL_ACTIVITY,
            Table::Handwashing | Table::Toothbrushing => HYGIENE,
            Table::InsulinDelivery => INSULIN_DELIVERY,
            Table::HeartRateNotifications => HEART_RATE_NOTIFICATIONS,
            Table::HeartRateNotificationDetails => HEART_RATE_NOTIFICATION_DETAILS,
            Table::Symptoms => SYMPTOMS,
            Table::StateOfMind => STATE_OF_MIND,
            Table::Ecg => ECG,
            Table::EcgVoltageMeasurements => ECG_VOLTAGE_MEASUREMENTS,
            Table::Workouts => WORKOUTS,
            Table::WorkoutHeartRate => WORKOUT_HEART_RATE,
            Table::WorkoutRoute => WORKOUT_ROUTE,
        }
    }

    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns().iter().find(|c| c.name == name)
    }

    /// Parent table and the column holding the parent's id, for child tables
    pub fn parent(&self) -> Option<(Table, &'static str)> {
        match self {
            Table::HeartRateNotificationDetails => {
                Some((Table::HeartRateNotifications, "notification_id"))
            }
            Table::EcgVoltageMeasurements => Some((Table::Ecg, "ecg_id")),
            Table::WorkoutHeartRate | Table::WorkoutRoute => Some((Table::Workouts, "workout_id")),
            _ => None,
        }
    }

    /// Clustering key for time-range scans
    pub fn order_by(&self) -> &'static [&'static str] {
        match self {
            Table::CommonMetrics => &["user_id", "metric_name", "timestamp"],
            Table::SleepAnalysis => &["user_id", "date"],
            Table::Symptoms => &["user_id", "symptom_name", "start_time"],
            Table::HeartRateNotifications
            | Table::StateOfMind
            | Table::Ecg
            | Table::Workouts => &["user_id", "start_time"],
            Table::HeartRateNotificationDetails => &["notification_id", "start_time"],
            Table::EcgVoltageMeasurements => &["ecg_id", "timestamp"],
            Table::WorkoutHeartRate | Table::WorkoutRoute => &["workout_id", "timestamp"],
            Table::BloodPressure
            | Table::HeartRate
            | Table::BloodGlucose
            | Table::SexualActivity
            | Table::Handwashing
            | Table::Toothbrushing
            | Table::InsulinDelivery => &["user_id", "timestamp"],
        }
    }

    pub fn create_table_sql(&self) -> String {
        let mut lines: Vec<String> = self
            .columns()
            .iter()
            .map(|c| {
                let null = if c.nullable { "" } else { " NOT NULL" };
                format!("    {} {}{}", c.name, c.ty.sql_type(), null)
            })
            .collect();
        lines.push(
            "    insert_time TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))"
                .to_string(),
        );

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            self.name(),
            lines.join(",\n")
        )
    }

    pub fn create_index_sql(&self) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_order ON {}({})",
            self.name(),
            self.name(),
            self.order_by().join(", ")
        )
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// All DDL statements, tables first then indexes
pub fn ddl() -> Vec<String> {
    Table::ALL
        .iter()
        .map(Table::create_table_sql)
        .chain(Table::ALL.iter().map(Table::create_index_sql))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_has_id_first() {
        for table in Table::ALL {
            assert_eq!(table.columns()[0].name, "id", "{} should start with id", table);
        }
    }

    #[test]
    fn test_parent_tables_carry_user_id_and_children_carry_link() {
        for table in Table::ALL {
            match table.parent() {
                Some((parent, link)) => {
                    assert!(table.column(link).is_some(), "{} missing {}", table, link);
                    assert!(table.column("user_id").is_none());
                    assert!(parent.column("user_id").is_some());
                    assert_eq!(table.order_by()[0], link);
                }
                None => {
                    assert!(table.column("user_id").is_some(), "{} missing user_id", table);
                    assert_eq!(table.order_by()[0], "user_id");
                }
            }
        }
    }

    #[test]
    fn test_order_by_columns_exist() {
        for table in Table::ALL {
            for name in table.order_by() {
                assert!(table.column(name).is_some(), "{}.{} not declared", table, name);
            }
        }
    }

    #[test]
    fn test_workout_optional_columns() {
        let optional = WORKOUTS.iter().filter(|c| c.nullable).count();
        assert_eq!(optional, 22);
    }

    #[test]
    fn test_create_table_sql_shape() {
        let sql = Table::HeartRateNotificationDetails.create_table_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS heart_rate_notification_details ("));
        assert!(sql.contains("hr REAL,"));
        assert!(sql.contains("hrv REAL,"));
        assert!(sql.contains("notification_id TEXT NOT NULL"));
        assert!(sql.contains("insert_time TEXT NOT NULL DEFAULT"));
    }

    #[test]
    fn test_ddl_covers_all_tables() {
        let statements = ddl();
        assert_eq!(statements.len(), Table::ALL.len() * 2);
        assert!(statements
            .iter()
            .any(|s| s == "CREATE INDEX IF NOT EXISTS idx_workout_route_order ON workout_route(workout_id, timestamp)"));
    }
}
