//! Mapbox reverse geocoding backend
//!
//! `GET {base}/geocoding/v5/mapbox.places/{lng},{lat}.json?access_token=...`
//!
//! The best feature's `place_name` becomes the street address; city,
//! neighborhood and country come from the first matching entry of that
//! feature's `context` list.

use crate::config::GeocoderConfig;
use crate::constants::api::MAPBOX_PLACES_PATH;
use crate::error::Result;
use crate::geocode::{AddressInfo, GeocodeResult, ReverseGeocoder};
use crate::geometry::Point;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("facility-geo/", env!("CARGO_PKG_VERSION"));

/// Mapbox geocoding backend
#[derive(Debug, Clone)]
pub struct MapboxGeocoder {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
    language: Option<String>,
}

/// Places endpoint response
///
/// Only the first feature is read, so the rest stay untyped.
#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    features: Option<Vec<serde_json::Value>>,
}

/// A single matched feature
#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    place_name: Option<String>,
    #[serde(default)]
    context: Option<Vec<ContextEntry>>,
}

/// Enclosing area of a feature, e.g. `{"id": "place.123", "text": "Bogotá"}`
#[derive(Debug, Deserialize)]
struct ContextEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl Feature {
    /// Text of the first context entry whose id contains `kind`
    fn context_text(&self, kind: &str) -> Option<String> {
        self.context
            .iter()
            .flatten()
            .find(|entry| entry.id.as_deref().is_some_and(|id| id.contains(kind)))
            .and_then(|entry| entry.text.clone())
    }

    fn into_address(self) -> AddressInfo {
        AddressInfo {
            ciudad: self.context_text("place"),
            zona: self.context_text("neighborhood"),
            pais: self.context_text("country"),
            direccion: self.place_name,
        }
    }
}

/// Reduce a places response body to a [`GeocodeResult`]
pub(crate) fn parse_places(body: &str) -> GeocodeResult {
    let response: PlacesResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(e) => {
            return GeocodeResult::NetworkError(format!(
                "Failed to parse geocoding response: {}",
                e
            ))
        }
    };

    let Some(first) = response.features.and_then(|f| f.into_iter().next()) else {
        return GeocodeResult::Empty;
    };

    match serde_json::from_value::<Feature>(first) {
        Ok(feature) => GeocodeResult::Found(feature.into_address()),
        Err(e) => GeocodeResult::NetworkError(format!(
            "Failed to parse geocoding feature: {}",
            e
        )),
    }
}

impl MapboxGeocoder {
    /// Create a backend from geocoder settings
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.resolved_token(),
            language: config.language.clone(),
        })
    }

    /// Whether an access token is available
    pub fn has_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// Build the lookup URL for a point
    fn request_url(&self, point: Point, token: &str) -> String {
        let mut url = format!(
            "{}/{}/{},{}.json?access_token={}",
            self.base_url,
            MAPBOX_PLACES_PATH,
            point.lng(),
            point.lat(),
            urlencoding::encode(token)
        );
        if let Some(language) = &self.language {
            url.push_str(&format!("&language={}", urlencoding::encode(language)));
        }
        url
    }

    async fn fetch(&self, point: Point) -> GeocodeResult {
        let Some(token) = &self.access_token else {
            return GeocodeResult::NetworkError("No geocoding access token configured".to_string());
        };

        let url = self.request_url(point, token);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                return GeocodeResult::NetworkError(format!("Geocoding request failed: {}", e))
            }
        };

        if !response.status().is_success() {
            return GeocodeResult::NetworkError(format!(
                "Geocoding provider returned status: {}",
                response.status()
            ));
        }

        match response.text().await {
            Ok(body) => parse_places(&body),
            Err(e) => GeocodeResult::NetworkError(format!(
                "Failed to read geocoding response: {}",
                e
            )),
        }
    }
}

impl ReverseGeocoder for MapboxGeocoder {
    fn name(&self) -> &'static str {
        "mapbox"
    }

    async fn reverse_geocode(&self, point: Point) -> GeocodeResult {
        let result = self.fetch(point).await;
        match &result {
            GeocodeResult::Found(_) => debug!("Reverse geocoded {}", point),
            GeocodeResult::Empty => debug!("No features at {}", point),
            GeocodeResult::NetworkError(reason) => {
                warn!("Reverse geocoding {} failed: {}", point, reason)
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    const BOGOTA_RESPONSE: &str = r#"{
        "type": "FeatureCollection",
        "query": [-74.08, 4.6],
        "features": [
            {
                "id": "address.1",
                "place_name": "Carrera 7 #26-20, Bogotá, Colombia",
                "context": [
                    {"id": "neighborhood.10", "text": "Santa Fe"},
                    {"id": "postcode.20", "text": "110311"},
                    {"id": "place.30", "text": "Bogotá"},
                    {"id": "region.40", "text": "Bogotá D.C."},
                    {"id": "country.50", "text": "Colombia"}
                ]
            },
            {
                "id": "place.30",
                "place_name": "Bogotá, Colombia",
                "context": []
            }
        ]
    }"#;

    fn point() -> Point {
        Point::new(-74.08, 4.6).unwrap()
    }

    /// Serve a fake places endpoint and return its base URL
    async fn fake_provider(status: StatusCode, body: &'static str) -> String {
        let app = Router::new().route(
            "/geocoding/v5/mapbox.places/:coords",
            get(
                move |Path(coords): Path<String>, Query(query): Query<HashMap<String, String>>| async move {
                    if query.get("access_token").map(String::as_str) != Some("pk.test") {
                        return (StatusCode::UNAUTHORIZED, "{}".to_string());
                    }
                    if coords != "-74.08,4.6.json" {
                        return (StatusCode::NOT_FOUND, "{}".to_string());
                    }
                    (status, body.to_string())
                },
            ),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn geocoder(base_url: String, token: &str) -> MapboxGeocoder {
        let config = GeocoderConfig {
            base_url,
            access_token: token.to_string(),
            language: None,
            timeout_secs: Some(5),
        };
        MapboxGeocoder::new(&config).unwrap()
    }

    #[test]
    fn test_parse_full_response() {
        let result = parse_places(BOGOTA_RESPONSE);
        assert_eq!(
            result,
            GeocodeResult::Found(AddressInfo {
                direccion: Some("Carrera 7 #26-20, Bogotá, Colombia".to_string()),
                ciudad: Some("Bogotá".to_string()),
                pais: Some("Colombia".to_string()),
                zona: Some("Santa Fe".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_empty_features() {
        assert_eq!(parse_places(r#"{"features": []}"#), GeocodeResult::Empty);
        assert_eq!(parse_places(r#"{"type": "FeatureCollection"}"#), GeocodeResult::Empty);
        assert_eq!(parse_places(r#"{"features": null}"#), GeocodeResult::Empty);
    }

    #[test]
    fn test_parse_partial_context() {
        let body = r#"{"features": [{"place_name": "Somewhere", "context": [{"id": "country.1", "text": "Perú"}]}]}"#;
        let address = parse_places(body).into_address_info();
        assert_eq!(address.direccion.as_deref(), Some("Somewhere"));
        assert_eq!(address.pais.as_deref(), Some("Perú"));
        assert!(address.ciudad.is_none());
        assert!(address.zona.is_none());
    }

    #[test]
    fn test_parse_first_matching_context_wins() {
        let body = r#"{"features": [{"context": [
            {"id": "place.1", "text": "First"},
            {"id": "place.2", "text": "Second"}
        ]}]}"#;
        let address = parse_places(body).into_address_info();
        assert_eq!(address.ciudad.as_deref(), Some("First"));
        assert!(address.direccion.is_none());
    }

    #[test]
    fn test_parse_ignores_shape_of_later_features() {
        let body = r#"{"features":[{"place_name":"A","context":[]},{"place_name":"B","context":null}]}"#;
        assert_eq!(
            parse_places(body),
            GeocodeResult::Found(AddressInfo {
                direccion: Some("A".to_string()),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_parse_null_context() {
        let address = parse_places(r#"{"features":[{"place_name":"Colombia","context":null}]}"#)
            .into_address_info();
        assert_eq!(address.direccion.as_deref(), Some("Colombia"));
        assert!(address.pais.is_none());
    }

    #[test]
    fn test_parse_skips_context_without_id() {
        let body = r#"{"features":[{"context":[
            {"id": null, "text": "Nowhere"},
            {"text": "Anonymous"},
            {"id": "country.7", "text": "Chile"}
        ]}]}"#;
        let address = parse_places(body).into_address_info();
        assert_eq!(address.pais.as_deref(), Some("Chile"));
        assert!(address.ciudad.is_none());
    }

    #[test]
    fn test_parse_malformed_first_feature() {
        assert!(matches!(
            parse_places(r#"{"features":[{"place_name": 5}]}"#),
            GeocodeResult::NetworkError(_)
        ));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_places("<html>oops</html>"),
            GeocodeResult::NetworkError(_)
        ));
    }

    #[test]
    fn test_request_url() {
        let mut backend = geocoder("https://example.test/".to_string(), "pk.a b");
        assert_eq!(
            backend.request_url(point(), "pk.a b"),
            "https://example.test/geocoding/v5/mapbox.places/-74.08,4.6.json?access_token=pk.a%20b"
        );

        backend.language = Some("es".to_string());
        assert!(backend.request_url(point(), "t").ends_with("&language=es"));
    }

    #[tokio::test]
    async fn test_reverse_geocode_found() {
        let base = fake_provider(StatusCode::OK, BOGOTA_RESPONSE).await;
        let result = geocoder(base, "pk.test").reverse_geocode(point()).await;

        let address = result.found().expect("address");
        assert_eq!(address.ciudad.as_deref(), Some("Bogotá"));
    }

    #[tokio::test]
    async fn test_reverse_geocode_empty() {
        let base = fake_provider(StatusCode::OK, r#"{"features": []}"#).await;
        let result = geocoder(base, "pk.test").reverse_geocode(point()).await;
        assert_eq!(result, GeocodeResult::Empty);
    }

    #[tokio::test]
    async fn test_reverse_geocode_server_error() {
        let base = fake_provider(StatusCode::INTERNAL_SERVER_ERROR, "{}").await;
        let result = geocoder(base, "pk.test").reverse_geocode(point()).await;
        assert!(matches!(result, GeocodeResult::NetworkError(reason) if reason.contains("500")));
    }

    #[tokio::test]
    async fn test_reverse_geocode_wrong_token() {
        let base = fake_provider(StatusCode::OK, BOGOTA_RESPONSE).await;
        let result = geocoder(base, "pk.wrong").reverse_geocode(point()).await;
        assert!(matches!(result, GeocodeResult::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_reverse_geocode_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = geocoder(format!("http://{}", addr), "pk.test")
            .reverse_geocode(point())
            .await;
        assert!(matches!(result, GeocodeResult::NetworkError(_)));
    }
}
