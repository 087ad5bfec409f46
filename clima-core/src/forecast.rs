use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;
use crate::model::{CurrentConditions, CurrentUnits, HourlySeries, HourlyUnits, WeatherReport};

/// Current-conditions fields requested on every call.
const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,wind_speed_10m,wind_direction_10m,visibility,weather_code";

/// Hourly fields requested only when a positive horizon was asked for.
const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m";

/// Failures while fetching or decoding a forecast.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("forecast request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("forecast service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to decode forecast response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("forecast response is inconsistent: {0}")]
    Shape(String),
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    latitude: f64,
    longitude: f64,
    current: OmCurrent,
    #[serde(default)]
    current_units: OmCurrentUnits,
    // Absent unless hourly fields were requested.
    hourly: Option<OmHourly>,
    #[serde(default)]
    hourly_units: OmHourlyUnits,
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    time: String,
    temperature_2m: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
    wind_direction_10m: f64,
    visibility: f64,
    weather_code: u8,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OmCurrentUnits {
    temperature_2m: String,
    relative_humidity_2m: String,
    wind_speed_10m: String,
    visibility: String,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<f64>,
    relative_humidity_2m: Vec<f64>,
    wind_speed_10m: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OmHourlyUnits {
    time: String,
    temperature_2m: String,
    relative_humidity_2m: String,
    wind_speed_10m: String,
}

/// Client for the forecast upstream. One call per inbound request; clamping
/// the hourly horizon is the trimmer's job, not this client's.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    http: Client,
    base_url: String,
    timezone: String,
}

impl ForecastClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.forecast_url.clone(),
            timezone: config.timezone.clone(),
        }
    }

    /// Fetch current conditions for the coordinates, plus the hourly series
    /// when `hours > 0`. The upstream's default span (7 days) covers any
    /// sane horizon; the caller trims afterwards.
    pub async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        hours: u32,
    ) -> Result<WeatherReport, ForecastError> {
        let lat = latitude.to_string();
        let lon = longitude.to_string();

        let mut params: Vec<(&str, &str)> = vec![
            ("latitude", lat.as_str()),
            ("longitude", lon.as_str()),
            ("current", CURRENT_FIELDS),
            ("timezone", self.timezone.as_str()),
        ];
        if hours > 0 {
            params.push(("hourly", HOURLY_FIELDS));
        }

        let res = self.http.get(&self.base_url).query(&params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ForecastError::Status(status));
        }

        let parsed: ForecastResponse = serde_json::from_str(&body)?;

        let hourly = match parsed.hourly {
            Some(block) => {
                let len = block.time.len();
                if block.temperature_2m.len() != len
                    || block.relative_humidity_2m.len() != len
                    || block.wind_speed_10m.len() != len
                {
                    return Err(ForecastError::Shape(
                        "hourly arrays have inconsistent lengths".to_string(),
                    ));
                }

                HourlySeries {
                    time: block.time,
                    temperature_2m: block.temperature_2m,
                    relative_humidity_2m: block.relative_humidity_2m,
                    wind_speed_10m: block.wind_speed_10m,
                }
            }
            None => HourlySeries::default(),
        };

        tracing::debug!(
            latitude,
            longitude,
            hourly_len = hourly.len(),
            "forecast fetched"
        );

        Ok(WeatherReport {
            latitude: parsed.latitude,
            longitude: parsed.longitude,
            current: CurrentConditions {
                time: parsed.current.time,
                temperature_2m: parsed.current.temperature_2m,
                relative_humidity_2m: parsed.current.relative_humidity_2m,
                wind_speed_10m: parsed.current.wind_speed_10m,
                wind_direction_10m: parsed.current.wind_direction_10m,
                visibility: parsed.current.visibility,
                weather_code: parsed.current.weather_code,
            },
            current_units: CurrentUnits {
                temperature_2m: parsed.current_units.temperature_2m,
                relative_humidity_2m: parsed.current_units.relative_humidity_2m,
                wind_speed_10m: parsed.current_units.wind_speed_10m,
                visibility: parsed.current_units.visibility,
            },
            hourly,
            hourly_units: HourlyUnits {
                time: parsed.hourly_units.time,
                temperature_2m: parsed.hourly_units.temperature_2m,
                relative_humidity_2m: parsed.hourly_units.relative_humidity_2m,
                wind_speed_10m: parsed.hourly_units.wind_speed_10m,
            },
            fetched_at: Utc::now(),
        })
    }
}
