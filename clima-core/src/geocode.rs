use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::{config::Config, model::Place};

/// Failures while resolving a city name to coordinates.
///
/// `CityNotFound` and `CountryMismatch` carry the Spanish reason text served
/// to callers; the remaining variants wrap transport and decode failures.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("no se encontró la ciudad: {city}")]
    CityNotFound { city: String },

    #[error("no se encontró {city} en {country}")]
    CountryMismatch { city: String, country: String },

    #[error("geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("geocoding service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to decode geocoding response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    // The upstream omits `results` entirely when nothing matched.
    results: Option<Vec<GeoCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeoCandidate {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    country: String,
    #[serde(default)]
    country_code: String,
    admin1: Option<String>,
}

impl From<GeoCandidate> for Place {
    fn from(c: GeoCandidate) -> Self {
        Place {
            name: c.name,
            latitude: c.latitude,
            longitude: c.longitude,
            country: c.country,
            country_code: c.country_code,
            admin1: c.admin1,
        }
    }
}

/// Client for the geocoding upstream: free-text place name in, best-matching
/// candidate out. Holds no state between calls.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    http: Client,
    base_url: String,
    language: String,
    count: u32,
}

impl GeocodeClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.geocoding_url.clone(),
            language: config.language.clone(),
            count: config.geocode_count,
        }
    }

    /// Resolve `city` to a [`Place`].
    ///
    /// With a country code, the first candidate whose `country_code` matches
    /// it (case-insensitively) wins, wherever it sits in the provider's
    /// relevance ranking. Without one, the first candidate wins.
    pub async fn resolve(
        &self,
        city: &str,
        country_code: Option<&str>,
    ) -> Result<Place, GeocodeError> {
        let count = self.count.to_string();
        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("name", city),
                ("count", count.as_str()),
                ("language", self.language.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(GeocodeError::Status(status));
        }

        let parsed: GeoResponse = serde_json::from_str(&body)?;
        let candidates = parsed.results.unwrap_or_default();

        if candidates.is_empty() {
            return Err(GeocodeError::CityNotFound {
                city: city.to_string(),
            });
        }

        let chosen = if let Some(cc) = country_code {
            candidates
                .into_iter()
                .find(|c| c.country_code.eq_ignore_ascii_case(cc))
                .ok_or_else(|| GeocodeError::CountryMismatch {
                    city: city.to_string(),
                    country: cc.to_uppercase(),
                })?
        } else {
            candidates
                .into_iter()
                .next()
                .ok_or_else(|| GeocodeError::CityNotFound {
                    city: city.to_string(),
                })?
        };

        tracing::debug!(
            name = %chosen.name,
            latitude = chosen.latitude,
            longitude = chosen.longitude,
            "geocode candidate chosen"
        );

        Ok(chosen.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeocodeClient {
        let config = Config {
            geocoding_url: server.uri(),
            ..Config::default()
        };
        GeocodeClient::new(Client::new(), &config)
    }

    fn two_candidates() -> serde_json::Value {
        json!({
            "results": [
                {
                    "name": "Bogota",
                    "latitude": 40.8876,
                    "longitude": -74.0299,
                    "country": "United States",
                    "country_code": "US",
                    "admin1": "New Jersey"
                },
                {
                    "name": "Bogotá",
                    "latitude": 4.6097,
                    "longitude": -74.0817,
                    "country": "Colombia",
                    "country_code": "CO",
                    "admin1": "Bogota D.C."
                }
            ]
        })
    }

    #[tokio::test]
    async fn picks_first_candidate_without_country_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(two_candidates()))
            .mount(&server)
            .await;

        let place = client_for(&server)
            .resolve("Bogota", None)
            .await
            .expect("should resolve");

        assert_eq!(place.country_code, "US");
        assert_eq!(place.latitude, 40.8876);
    }

    #[tokio::test]
    async fn country_filter_selects_later_candidate_case_insensitively() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(two_candidates()))
            .mount(&server)
            .await;

        let place = client_for(&server)
            .resolve("Bogota", Some("co"))
            .await
            .expect("should resolve");

        assert_eq!(place.country_code, "CO");
        assert_eq!(place.latitude, 4.6097);
        assert_eq!(place.admin1.as_deref(), Some("Bogota D.C."));
    }

    #[tokio::test]
    async fn country_filter_with_no_match_is_country_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(two_candidates()))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .resolve("Bogota", Some("FR"))
            .await
            .unwrap_err();

        assert!(matches!(err, GeocodeError::CountryMismatch { .. }));
        assert!(err.to_string().contains("FR"));
    }

    #[tokio::test]
    async fn absent_results_is_city_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"generationtime_ms": 0.3})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .resolve("Xyzzyville", None)
            .await
            .unwrap_err();

        assert!(matches!(err, GeocodeError::CityNotFound { .. }));
        assert!(err.to_string().contains("Xyzzyville"));
    }

    #[tokio::test]
    async fn sends_configured_query_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("name", "Bogota"))
            .and(query_param("count", "6"))
            .and(query_param("language", "es"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(two_candidates()))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .resolve("Bogota", None)
            .await
            .expect("should resolve");
    }

    #[tokio::test]
    async fn city_name_is_url_escaped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("name", "San José del Guaviare"))
            .respond_with(ResponseTemplate::new(200).set_body_json(two_candidates()))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .resolve("San José del Guaviare", None)
            .await
            .expect("should resolve");
    }

    #[tokio::test]
    async fn upstream_error_status_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).resolve("Bogota", None).await.unwrap_err();
        assert!(matches!(err, GeocodeError::Status(_)));
    }

    #[tokio::test]
    async fn undecodable_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).resolve("Bogota", None).await.unwrap_err();
        assert!(matches!(err, GeocodeError::Decode(_)));
    }
}
