use serde::Deserialize;

use crate::config;
use crate::error::ApiError;

/// A resolved street address.
#[derive(Debug, Clone)]
pub struct Location {
    pub formatted_address: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

/// Thin client over a Nominatim-compatible geocoding endpoint.
pub struct Geocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    display_name: Option<String>,
    address: Option<SearchAddress>,
}

#[derive(Debug, Deserialize)]
struct SearchAddress {
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country_code: Option<String>,
}

impl Geocoder {
    pub fn from_config() -> Self {
        let geocoder_config = &config::config().geocoder;
        Self {
            client: reqwest::Client::new(),
            base_url: geocoder_config.base_url.clone(),
            api_key: geocoder_config.api_key.clone(),
        }
    }

    /// Resolve a free-form address or zipcode to a location.
    pub async fn geocode(&self, query: &str) -> Result<Location, ApiError> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let mut request = self.client.get(&url).query(&[
            ("q", query),
            ("format", "json"),
            ("addressdetails", "1"),
            ("limit", "1"),
        ]);
        if !self.api_key.is_empty() {
            request = request.query(&[("key", self.api_key.as_str())]);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Geocoder request failed: {}", e);
            ApiError::bad_gateway("Geocoding service unavailable")
        })?;

        if !response.status().is_success() {
            tracing::error!("Geocoder returned status {}", response.status());
            return Err(ApiError::bad_gateway("Geocoding service unavailable"));
        }

        let results: Vec<SearchResult> = response.json().await.map_err(|e| {
            tracing::error!("Geocoder response unreadable: {}", e);
            ApiError::bad_gateway("Geocoding service unavailable")
        })?;

        let Some(first) = results.into_iter().next() else {
            return Err(ApiError::bad_request(format!("Could not geocode address: {}", query)));
        };

        let lat = first.lat.parse::<f64>();
        let lng = first.lon.parse::<f64>();
        let (Ok(lat), Ok(lng)) = (lat, lng) else {
            tracing::error!("Geocoder returned non-numeric coordinates");
            return Err(ApiError::bad_gateway("Geocoding service unavailable"));
        };

        let address = first.address;
        Ok(Location {
            formatted_address: first.display_name,
            street: address.as_ref().and_then(|a| a.road.clone()),
            city: address
                .as_ref()
                .and_then(|a| a.city.clone().or_else(|| a.town.clone())),
            state: address.as_ref().and_then(|a| a.state.clone()),
            zipcode: address.as_ref().and_then(|a| a.postcode.clone()),
            country: address
                .as_ref()
                .and_then(|a| a.country_code.as_ref().map(|c| c.to_uppercase())),
            lat,
            lng,
        })
    }
}
