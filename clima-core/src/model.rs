use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A resolved geocode candidate: a concrete place with coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: String,
    pub country_code: String,
    pub admin1: Option<String>,
}

/// Current conditions at a location, in the units described by
/// [`CurrentUnits`]. Timestamps come through as the upstream's local
/// ISO 8601 strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub time: String,
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub wind_speed_10m: f64,
    pub wind_direction_10m: f64,
    pub visibility: f64,
    pub weather_code: u8,
}

/// Units for the current-conditions fields, as reported by the upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentUnits {
    pub temperature_2m: String,
    pub relative_humidity_2m: String,
    pub wind_speed_10m: String,
    pub visibility: String,
}

/// Hourly forecast series as parallel arrays, all indexed identically by
/// position. Invariant: every array has the same length at all times.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature_2m: Vec<f64>,
    pub relative_humidity_2m: Vec<f64>,
    pub wind_speed_10m: Vec<f64>,
}

impl HourlySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Cut every parallel array to `n` elements in one step, so the
    /// equal-length invariant holds afterwards.
    fn truncate(&mut self, n: usize) {
        self.time.truncate(n);
        self.temperature_2m.truncate(n);
        self.relative_humidity_2m.truncate(n);
        self.wind_speed_10m.truncate(n);
    }
}

/// Units for the hourly series fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HourlyUnits {
    pub time: String,
    pub temperature_2m: String,
    pub relative_humidity_2m: String,
    pub wind_speed_10m: String,
}

/// The payload served to callers: current conditions plus a possibly-empty
/// hourly series, echoing the upstream's resolved grid coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub latitude: f64,
    pub longitude: f64,
    pub current: CurrentConditions,
    pub current_units: CurrentUnits,
    #[serde(default)]
    pub hourly: HourlySeries,
    #[serde(default)]
    pub hourly_units: HourlyUnits,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherReport {
    /// Trim the hourly series to at most `horizon` entries.
    ///
    /// No-op when `horizon` is zero or the series is already empty; otherwise
    /// the cut is clamped to the data actually present, and the same index is
    /// applied to every parallel array. Idempotent.
    pub fn truncate_hours(&mut self, horizon: usize) {
        if horizon == 0 || self.hourly.is_empty() {
            return;
        }

        let n = horizon.min(self.hourly.len());
        self.hourly.truncate(n);
    }
}
