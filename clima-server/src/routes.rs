use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{Method, StatusCode, header};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use clima_core::{Config, ForecastClient, GeocodeClient, WeatherReport};

use crate::error::ApiError;

/// Immutable per-process state: the two upstream clients, sharing one pooled
/// HTTP client. Nothing here mutates between requests.
pub struct AppState {
    pub geocoder: GeocodeClient,
    pub forecast: ForecastClient,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }
        let http = builder.build()?;

        Ok(Self {
            geocoder: GeocodeClient::new(http.clone(), config),
            forecast: ForecastClient::new(http, config),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub ciudad: Option<String>,
    pub pais: Option<String>,
    // Kept as raw text so a non-numeric value maps to our own 400 message.
    pub horas: Option<String>,
}

/// `GET /weather?ciudad=<city>&pais=<cc>&horas=<n>`
///
/// Validate, resolve the city, fetch the forecast, trim the hourly series,
/// serve JSON. Any upstream failure ends the request with a 500 carrying the
/// reason text.
pub async fn get_weather(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WeatherQuery>,
) -> Result<Json<WeatherReport>, ApiError> {
    let city = match params.ciudad.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() => c,
        _ => return Err(ApiError::bad_request("Debe enviar el parámetro ?ciudad=")),
    };

    let hours: u32 = match params.horas.as_deref() {
        None | Some("") => 0,
        Some(raw) => raw.parse().map_err(|_| {
            ApiError::bad_request("El parámetro 'horas' debe ser un número válido")
        })?,
    };

    let place = state.geocoder.resolve(city, params.pais.as_deref()).await?;
    tracing::info!(
        city = %place.name,
        country = %place.country_code,
        latitude = place.latitude,
        longitude = place.longitude,
        hours,
        "city resolved"
    );

    let mut report = state
        .forecast
        .fetch(place.latitude, place.longitude, hours)
        .await?;
    report.truncate_hours(hours as usize);

    Ok(Json(report))
}

// Bare OPTIONS outside the CORS preflight path still answers 200 with no body.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Build the application router.
pub fn routes(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/weather", get(get_weather).options(preflight))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
