//! Workout model and values with units

use serde::{Deserialize, Serialize};

/// A quantity paired with its unit; present or absent as a whole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub qty: f64,
    pub units: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Elevation {
    pub ascent: f64,
    pub descent: f64,
    pub units: String,
}

/// Workout session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub name: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub heart_rate_data: Option<Vec<HeartRatePoint>>,
    #[serde(default)]
    pub heart_rate_recovery: Option<Vec<HeartRatePoint>>,
    #[serde(default)]
    pub route: Option<Vec<RoutePoint>>,
    #[serde(default)]
    pub total_energy: Option<Quantity>,
    #[serde(default)]
    pub active_energy: Option<Quantity>,
    #[serde(default, deserialize_with = "units::bpm")]
    pub max_heart_rate: Option<Quantity>,
    #[serde(default, deserialize_with = "units::bpm")]
    pub avg_heart_rate: Option<Quantity>,
    #[serde(default, deserialize_with = "units::steps")]
    pub step_count: Option<Quantity>,
    #[serde(default, deserialize_with = "units::spm")]
    pub step_cadence: Option<Quantity>,
    #[serde(default, deserialize_with = "units::count")]
    pub total_swimming_stroke_count: Option<Quantity>,
    #[serde(default, deserialize_with = "units::spm")]
    pub swim_cadence: Option<Quantity>,
    #[serde(default)]
    pub distance: Option<Quantity>,
    #[serde(default)]
    pub speed: Option<Quantity>,
    #[serde(default, deserialize_with = "units::count")]
    pub flights_climbed: Option<Quantity>,
    #[serde(default, deserialize_with = "units::met")]
    pub intensity: Option<Quantity>,
    #[serde(default)]
    pub temperature: Option<Quantity>,
    #[serde(default, deserialize_with = "units::percent")]
    pub humidity: Option<Quantity>,
    #[serde(default)]
    pub elevation: Option<Elevation>,
}

impl Workout {
    /// Workout with only the required fields set
    pub fn new(name: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: start.into(),
            end: end.into(),
            heart_rate_data: None,
            heart_rate_recovery: None,
            route: None,
            total_energy: None,
            active_energy: None,
            max_heart_rate: None,
            avg_heart_rate: None,
            step_count: None,
            step_cadence: None,
            total_swimming_stroke_count: None,
            swim_cadence: None,
            distance: None,
            speed: None,
            flights_climbed: None,
            intensity: None,
            temperature: None,
            humidity: None,
            elevation: None,
        }
    }
}

/// Heart rate sample recorded during (or after) a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRatePoint {
    pub date: String,
    pub qty: f64,
    #[serde(default = "count_units")]
    pub units: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub lat: f64,
    pub lon: f64,
    /// Meters
    pub altitude: f64,
    pub timestamp: String,
}

fn count_units() -> String {
    "count".to_string()
}

/// Deserializers for quantities whose unit the exporter may leave out.
mod units {
    use serde::{Deserialize, Deserializer};

    use super::Quantity;

    #[derive(Deserialize)]
    struct PartialQuantity {
        qty: f64,
        #[serde(default)]
        units: Option<String>,
    }

    fn with_default<'de, D>(deserializer: D, unit: &str) -> Result<Option<Quantity>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let partial = Option::<PartialQuantity>::deserialize(deserializer)?;
        Ok(partial.map(|p| Quantity {
            qty: p.qty,
            units: p.units.unwrap_or_else(|| unit.to_string()),
        }))
    }

    macro_rules! default_units {
        ($($name:ident => $unit:literal),* $(,)?) => {
            $(
                pub(super) fn $name<'de, D>(deserializer: D) -> Result<Option<Quantity>, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    with_default(deserializer, $unit)
                }
            )*
        };
    }

    default_units! {
        bpm => "bpm",
        steps => "steps",
        spm => "spm",
        count => "count",
        met => "MET",
        percent => "%",
    }
}
