//! Google Geocoding and Places Nearby Search client

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::PlacesProvider;
use crate::config::PlacesConfig;
use crate::models::{Location, PlaceRecord};
use crate::{PlannerError, Result, http};

const SERVICE: &str = "Google Places";

/// Google Maps platform client
pub struct GooglePlacesClient {
    client: ClientWithMiddleware,
    api_key: String,
    geocode_url: String,
    nearby_url: String,
    radius_meters: u32,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: Option<String>,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<NearbyResult>,
}

#[derive(Debug, Deserialize)]
struct NearbyResult {
    name: Option<String>,
    vicinity: Option<String>,
    rating: Option<f32>,
    geometry: Option<Geometry>,
    #[serde(default)]
    types: Vec<String>,
}

impl NearbyResult {
    /// Results without a usable name are dropped
    fn into_record(self) -> Option<PlaceRecord> {
        let name = self.name?.trim().to_string();
        if name.is_empty() {
            return None;
        }
        let location = self
            .geometry
            .map(|g| Location::new(g.location.lat, g.location.lng, name.clone()));

        Some(PlaceRecord {
            name,
            address: self.vicinity,
            rating: self.rating,
            location,
            types: self.types,
        })
    }
}

impl GooglePlacesClient {
    /// Create a new client from configuration
    pub fn new(config: &PlacesConfig, api_key: &str) -> Result<Self> {
        Ok(Self {
            client: http::build_client(config.timeout_seconds, config.max_retries)?,
            api_key: api_key.to_string(),
            geocode_url: config.geocode_url.clone(),
            nearby_url: config.nearby_url.clone(),
            radius_meters: config.radius_meters,
        })
    }

    fn geocode_request_url(&self, address: &str) -> String {
        format!(
            "{}?address={}&key={}",
            self.geocode_url,
            urlencoding::encode(address),
            self.api_key
        )
    }

    fn nearby_request_url(&self, center: &Location, keyword: &str) -> String {
        format!(
            "{}?location={},{}&radius={}&type=tourist_attraction&keyword={}&key={}",
            self.nearby_url,
            center.latitude,
            center.longitude,
            self.radius_meters,
            urlencoding::encode(keyword),
            self.api_key
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("Places request: {}", http::redact_key(url));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| {
                PlannerError::upstream(SERVICE, format!("Request failed: {}", http::send_error(e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Places request failed with HTTP {}", status);
            return Err(PlannerError::upstream(SERVICE, format!("HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| {
                PlannerError::upstream(SERVICE, format!("Malformed response: {}", http::read_error(e)))
            })
    }
}

/// Map a Google `status` field to "has results" / "no results" / error
fn check_status(status: &str, error_message: Option<&str>) -> Result<bool> {
    match status {
        "OK" => Ok(true),
        "ZERO_RESULTS" => Ok(false),
        other => Err(PlannerError::upstream(
            SERVICE,
            match error_message {
                Some(message) => format!("{other}: {message}"),
                None => other.to_string(),
            },
        )),
    }
}

fn first_location(response: GeocodeResponse, address: &str) -> Result<Option<Location>> {
    if !check_status(&response.status, response.error_message.as_deref())? {
        return Ok(None);
    }

    Ok(response.results.into_iter().next().map(|result| {
        Location::new(
            result.geometry.location.lat,
            result.geometry.location.lng,
            result.formatted_address.unwrap_or_else(|| address.to_string()),
        )
    }))
}

fn place_records(response: NearbyResponse) -> Result<Vec<PlaceRecord>> {
    if !check_status(&response.status, response.error_message.as_deref())? {
        return Ok(Vec::new());
    }

    Ok(response
        .results
        .into_iter()
        .filter_map(NearbyResult::into_record)
        .collect())
}

#[async_trait]
impl PlacesProvider for GooglePlacesClient {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Option<Location>> {
        let response: GeocodeResponse = self.get_json(&self.geocode_request_url(address)).await?;
        let location = first_location(response, address)?;

        match &location {
            Some(location) => info!(
                "Geocoded '{}' to {} ({})",
                address,
                location.name,
                location.format_coordinates()
            ),
            None => warn!("Geocoding found no results for '{}'", address),
        }
        Ok(location)
    }

    #[instrument(skip(self, center), fields(center = %center.format_coordinates()))]
    async fn nearby_attractions(
        &self,
        center: &Location,
        keyword: &str,
    ) -> Result<Vec<PlaceRecord>> {
        let response: NearbyResponse = self
            .get_json(&self.nearby_request_url(center, keyword))
            .await?;
        let records = place_records(response)?;
        info!("Nearby search returned {} places", records.len());
        Ok(records)
    }

    fn provider_name(&self) -> &'static str {
        SERVICE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlannerConfig;

    fn client() -> GooglePlacesClient {
        GooglePlacesClient::new(&PlannerConfig::default().places, "places_key_123").unwrap()
    }

    #[test]
    fn test_request_urls() {
        let client = client();
        assert_eq!(
            client.geocode_request_url("Fort Kochi, Kerala"),
            "https://maps.googleapis.com/maps/api/geocode/json?address=Fort%20Kochi%2C%20Kerala&key=places_key_123"
        );

        let center = Location::new(9.93, 76.26, "Kochi".to_string());
        let url = client.nearby_request_url(&center, "tourist attraction food");
        assert!(url.contains("location=9.93,76.26"));
        assert!(url.contains("radius=10000"));
        assert!(url.contains("type=tourist_attraction"));
        assert!(url.contains("keyword=tourist%20attraction%20food"));
    }

    #[test]
    fn test_check_status() {
        assert!(check_status("OK", None).unwrap());
        assert!(!check_status("ZERO_RESULTS", None).unwrap());

        let err = check_status("REQUEST_DENIED", Some("The provided API key is invalid.")).unwrap_err();
        assert!(err.is_upstream());
        assert!(err.to_string().contains("REQUEST_DENIED: The provided API key is invalid."));
    }

    #[test]
    fn test_first_location() {
        let response: GeocodeResponse = serde_json::from_str(
            r#"{
                "status": "OK",
                "results": [{
                    "formatted_address": "Kerala, India",
                    "geometry": {"location": {"lat": 10.8505, "lng": 76.2711}}
                }]
            }"#,
        )
        .unwrap();
        let location = first_location(response, "Kerala").unwrap().unwrap();
        assert_eq!(location.name, "Kerala, India");
        assert_eq!(location.latitude, 10.8505);

        let empty: GeocodeResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS", "results": []}"#).unwrap();
        assert!(first_location(empty, "Nowhere").unwrap().is_none());
    }

    #[test]
    fn test_place_records() {
        let response: NearbyResponse = serde_json::from_str(
            r#"{
                "status": "OK",
                "results": [
                    {
                        "name": "Mattancherry Palace",
                        "vicinity": "Palace Rd, Kochi",
                        "rating": 4.3,
                        "geometry": {"location": {"lat": 9.958, "lng": 76.259}},
                        "types": ["museum", "tourist_attraction"]
                    },
                    {"name": "  ", "vicinity": "ignored"},
                    {"name": "Fort Kochi Beach"}
                ]
            }"#,
        )
        .unwrap();
        let records = place_records(response).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Mattancherry Palace");
        assert_eq!(records[0].rating, Some(4.3));
        assert!(records[0].location.is_some());
        assert_eq!(records[1].address, None);
        assert_eq!(records[1].rating_label(), "N/A");
    }

    async fn serve(app: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn client_for(base: &str, geocode: &str, nearby: &str, key: &str) -> GooglePlacesClient {
        let mut config = PlannerConfig::default().places;
        config.geocode_url = format!("{base}{geocode}");
        config.nearby_url = format!("{base}{nearby}");
        config.max_retries = 0;
        config.timeout_seconds = 5;
        GooglePlacesClient::new(&config, key).unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_host_keeps_key_out_of_error() {
        let client = client_for(
            "http://127.0.0.1:1",
            "/geocode/json",
            "/nearby/json",
            "SECRET_PLACES_KEY_123",
        );
        let err = client.geocode("Kerala").await.unwrap_err();

        assert!(err.is_upstream());
        assert!(err.to_string().contains("Request failed"));
        assert!(!err.to_string().contains("SECRET_PLACES_KEY_123"));
        assert!(!format!("{err:?}").contains("SECRET_PLACES_KEY_123"));
    }

    #[tokio::test]
    async fn test_geocode_and_nearby_over_http() {
        use axum::extract::Query;
        use axum::routing::get;
        use std::collections::HashMap;

        let app = axum::Router::new()
            .route(
                "/geocode/json",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    assert_eq!(params.get("key").map(String::as_str), Some("places_key_123"));
                    assert_eq!(params.get("address").map(String::as_str), Some("Fort Kochi"));
                    axum::Json(serde_json::json!({
                        "status": "OK",
                        "results": [{
                            "formatted_address": "Fort Kochi, Kerala",
                            "geometry": {"location": {"lat": 9.9658, "lng": 76.2421}}
                        }]
                    }))
                }),
            )
            .route(
                "/nearby/json",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    assert_eq!(params.get("type").map(String::as_str), Some("tourist_attraction"));
                    axum::Json(serde_json::json!({
                        "status": "OK",
                        "results": [{"name": "Santa Cruz Basilica", "rating": 4.6}]
                    }))
                }),
            );
        let base = serve(app).await;
        let client = client_for(&base, "/geocode/json", "/nearby/json", "places_key_123");

        let center = client.geocode("Fort Kochi").await.unwrap().unwrap();
        assert_eq!(center.name, "Fort Kochi, Kerala");

        let records = client.nearby_attractions(&center, "church").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Santa Cruz Basilica");
    }

    #[tokio::test]
    async fn test_http_failures_map_to_upstream() {
        use axum::http::StatusCode;
        use axum::routing::get;

        let app = axum::Router::new()
            .route("/unavailable", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
            .route("/garbage", get(|| async { "<html>not json</html>" }));
        let base = serve(app).await;

        let client = client_for(&base, "/unavailable", "/garbage", "SECRET_PLACES_KEY_123");
        let err = client.geocode("Kerala").await.unwrap_err();
        assert!(err.is_upstream());
        assert!(err.to_string().contains("HTTP 503"));

        let center = Location::new(9.93, 76.26, "Kochi".to_string());
        let err = client.nearby_attractions(&center, "museum").await.unwrap_err();
        assert!(err.is_upstream());
        assert!(err.to_string().contains("Malformed response"));
        assert!(!err.to_string().contains("SECRET_PLACES_KEY_123"));
    }

    #[test]
    fn test_place_records_denied() {
        let response: NearbyResponse = serde_json::from_str(
            r#"{"status": "OVER_QUERY_LIMIT", "results": []}"#,
        )
        .unwrap();
        assert!(place_records(response).unwrap_err().is_upstream());
    }
}
