//! Nearby-hospital lookup for the result screen.
//!
//! Purely a display aid: analysis never depends on it.

use std::time::Duration;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Search radius around the guardian's position, in meters.
pub const SEARCH_RADIUS_METERS: u32 = 5000;
pub const PLACE_TYPE: &str = "hospital";
const NEARBY_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// Map center when no position is available (Tokyo Station).
pub const DEFAULT_COORDINATE: Coordinate = Coordinate {
    lat: 35.6812,
    lng: 139.7671,
};

impl Coordinate {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceRecord {
    pub name: String,
    pub vicinity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    pub coordinate: Coordinate,
}

#[derive(Error, Debug)]
pub enum PlacesError {
    #[error("Department must not be empty")]
    EmptyDepartment,

    #[error("Coordinate out of range: {lat}, {lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("Places HTTP error: {0}")]
    Http(String),

    #[error("Places service returned {status}: {message}")]
    Service { status: String, message: String },

    #[error("Unexpected places response: {0}")]
    Malformed(String),
}

pub trait PlacesLookup: Send + Sync {
    fn nearby<'a>(
        &'a self,
        department: &'a str,
        center: Coordinate,
    ) -> BoxFuture<'a, Result<Vec<PlaceRecord>, PlacesError>>;
}

/// Google Places Nearby Search client.
pub struct GooglePlacesClient {
    api_key: String,
    client: reqwest::Client,
}

impl GooglePlacesClient {
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PlacesError::Http(e.to_string()))?;
        Ok(Self {
            api_key: api_key.to_string(),
            client,
        })
    }

    async fn search(
        &self,
        department: &str,
        center: Coordinate,
    ) -> Result<Vec<PlaceRecord>, PlacesError> {
        let department = department.trim();
        if department.is_empty() {
            return Err(PlacesError::EmptyDepartment);
        }
        if !center.is_valid() {
            return Err(PlacesError::InvalidCoordinate {
                lat: center.lat,
                lng: center.lng,
            });
        }

        let location = format!("{},{}", center.lat, center.lng);
        let radius = SEARCH_RADIUS_METERS.to_string();
        let response = self
            .client
            .get(NEARBY_SEARCH_URL)
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("type", PLACE_TYPE),
                ("keyword", department),
                ("language", "ja"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PlacesError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::Service {
                status: status.as_u16().to_string(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| PlacesError::Http(e.to_string()))?;
        let places = parse_nearby_response(&body)?;
        tracing::debug!(department, results = places.len(), "Nearby search complete");
        Ok(places)
    }
}

impl PlacesLookup for GooglePlacesClient {
    fn nearby<'a>(
        &'a self,
        department: &'a str,
        center: Coordinate,
    ) -> BoxFuture<'a, Result<Vec<PlaceRecord>, PlacesError>> {
        Box::pin(self.search(department, center))
    }
}

#[derive(Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawPlace {
    name: String,
    #[serde(default)]
    vicinity: String,
    #[serde(default)]
    rating: Option<f32>,
    geometry: RawGeometry,
}

#[derive(Deserialize)]
struct RawGeometry {
    location: Coordinate,
}

/// Parse a Nearby Search body. `ZERO_RESULTS` is an empty list; results
/// that lack a name or location are skipped.
pub fn parse_nearby_response(body: &str) -> Result<Vec<PlaceRecord>, PlacesError> {
    let parsed: NearbyResponse =
        serde_json::from_str(body).map_err(|e| PlacesError::Malformed(e.to_string()))?;

    match parsed.status.as_str() {
        "OK" | "ZERO_RESULTS" => {}
        _ => {
            return Err(PlacesError::Service {
                message: parsed.error_message.unwrap_or_default(),
                status: parsed.status,
            })
        }
    }

    Ok(parsed
        .results
        .into_iter()
        .filter_map(|v| serde_json::from_value::<RawPlace>(v).ok())
        .map(|p| PlaceRecord {
            name: p.name,
            vicinity: p.vicinity,
            rating: p.rating,
            coordinate: p.geometry.location,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_results_and_skips_incomplete() {
        let body = r#"{
            "status": "OK",
            "results": [
                {"name": "さくら小児科", "vicinity": "千代田区1-1", "rating": 4.5,
                 "geometry": {"location": {"lat": 35.68, "lng": 139.76}}},
                {"name": "位置なし医院"},
                {"name": "みどり病院", "geometry": {"location": {"lat": 35.69, "lng": 139.77}}}
            ]
        }"#;
        let places = parse_nearby_response(body).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "さくら小児科");
        assert_eq!(places[0].rating, Some(4.5));
        assert_eq!(places[1].vicinity, "");
        assert!(places[1].rating.is_none());
    }

    #[test]
    fn zero_results_is_empty() {
        let places = parse_nearby_response(r#"{"status":"ZERO_RESULTS","results":[]}"#).unwrap();
        assert!(places.is_empty());
    }

    #[test]
    fn error_status_is_reported() {
        let err = parse_nearby_response(
            r#"{"status":"REQUEST_DENIED","error_message":"The provided API key is invalid."}"#,
        )
        .unwrap_err();
        match err {
            PlacesError::Service { status, message } => {
                assert_eq!(status, "REQUEST_DENIED");
                assert!(message.contains("API key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn default_center_is_valid() {
        assert!(DEFAULT_COORDINATE.is_valid());
        assert!(!Coordinate { lat: 91.0, lng: 0.0 }.is_valid());
    }

    #[tokio::test]
    async fn blank_department_rejected_without_request() {
        let client = GooglePlacesClient::new("key", 5).unwrap();
        let err = client.nearby("  ", DEFAULT_COORDINATE).await.unwrap_err();
        assert!(matches!(err, PlacesError::EmptyDepartment));
    }
}
