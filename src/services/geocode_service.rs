use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

use crate::services::upstream;

/// Shown wherever a place name could not be resolved.
pub const PLACEHOLDER: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeocodeError {
    #[error("no results")]
    NoResults,
    #[error("geocoding request failed")]
    RequestFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Nominatim `address` object: component name to value.
pub type Address = HashMap<String, String>;

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn forward(&self, query: &str) -> Result<GeoPoint, GeocodeError>;

    /// An address without components is `Ok` with an empty map.
    async fn reverse(&self, lat: f64, lng: f64) -> Result<Address, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: Option<String>,
    lon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<HashMap<String, Value>>,
}

pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: upstream::http_client(),
            base_url: base_url.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(upstream::env_url(
            "NOMINATIM_URL",
            "https://nominatim.openstreetmap.org",
        ))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn forward(&self, query: &str) -> Result<GeoPoint, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let resp = match self
            .client
            .get(&url)
            .query(&[("format", "json"), ("q", query)])
            .header("Accept", "application/json")
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("🗺️ Geocode upstream unreachable: {}", e);
                return Err(GeocodeError::RequestFailed);
            }
        };

        if !resp.status().is_success() {
            warn!("🗺️ Geocode upstream non-OK: {}", resp.status());
            return Err(GeocodeError::RequestFailed);
        }

        let hits: Vec<SearchHit> = match resp.json().await {
            Ok(data) => data,
            Err(e) => {
                warn!("🗺️ Geocode upstream JSON parse failed: {}", e);
                return Err(GeocodeError::RequestFailed);
            }
        };

        let first = hits.into_iter().next().ok_or(GeocodeError::NoResults)?;
        let lat = first.lat.and_then(|v| v.trim().parse::<f64>().ok());
        let lng = first.lon.and_then(|v| v.trim().parse::<f64>().ok());
        match (lat, lng) {
            (Some(lat), Some(lng)) => Ok(GeoPoint { lat, lng }),
            _ => Err(GeocodeError::NoResults),
        }
    }

    async fn reverse(&self, lat: f64, lng: f64) -> Result<Address, GeocodeError> {
        let url = format!("{}/reverse", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", lat.to_string()),
                ("lon", lng.to_string()),
            ])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!("🗺️ Reverse geocode upstream unreachable: {}", e);
                GeocodeError::RequestFailed
            })?;

        if !resp.status().is_success() {
            warn!("🗺️ Reverse geocode upstream non-OK: {}", resp.status());
            return Err(GeocodeError::RequestFailed);
        }

        let parsed: ReverseResponse = resp.json().await.map_err(|e| {
            warn!("🗺️ Reverse geocode JSON parse failed: {}", e);
            GeocodeError::RequestFailed
        })?;

        Ok(parsed
            .address
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
            .collect())
    }
}

/// City and district for the location card and the news query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Place {
    pub city: String,
    pub district: String,
    /// False when the reverse lookup failed; not-found and failed are not
    /// told apart.
    pub resolved: bool,
}

impl Place {
    pub fn unresolved() -> Self {
        Self {
            city: PLACEHOLDER.to_string(),
            district: PLACEHOLDER.to_string(),
            resolved: false,
        }
    }

    pub fn from_address(address: &Address) -> Self {
        let pick = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| address.get(*k))
                .map(|v| v.trim())
                .find(|v| !v.is_empty())
                .unwrap_or(PLACEHOLDER)
                .to_string()
        };
        Self {
            city: pick(&["city", "town", "village"]),
            district: pick(&["state_district", "county", "suburb"]),
            resolved: true,
        }
    }

    pub fn title(&self) -> String {
        if self.resolved {
            format!("{}, {}", self.city, self.district)
        } else {
            "Your Current Location".to_string()
        }
    }
}

pub async fn resolve_place(geocoder: &dyn Geocoder, lat: f64, lng: f64) -> Place {
    match geocoder.reverse(lat, lng).await {
        Ok(address) => Place::from_address(&address),
        Err(e) => {
            warn!("🗺️ Reverse geocode for {:.4}, {:.4} failed: {}", lat, lng, e);
            Place::unresolved()
        }
    }
}

/// Query used to place a new camp.
pub fn camp_query(district: &str, city: &str) -> String {
    format!("{}, {}, India", district.trim(), city.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingGeocoder;

    #[async_trait]
    impl Geocoder for FailingGeocoder {
        async fn forward(&self, _query: &str) -> Result<GeoPoint, GeocodeError> {
            Err(GeocodeError::RequestFailed)
        }

        async fn reverse(&self, _lat: f64, _lng: f64) -> Result<Address, GeocodeError> {
            Err(GeocodeError::RequestFailed)
        }
    }

    fn address(pairs: &[(&str, &str)]) -> Address {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn reverse_failure_yields_placeholders() {
        let place = resolve_place(&FailingGeocoder, 28.6, 77.2).await;
        assert_eq!(place.city, "--");
        assert_eq!(place.district, "--");
        assert!(!place.resolved);
        assert_eq!(place.title(), "Your Current Location");
    }

    #[test]
    fn place_falls_back_through_address_components() {
        let place = Place::from_address(&address(&[
            ("town", "Sonipat"),
            ("county", "Sonipat District"),
            ("suburb", "Model Town"),
        ]));
        assert_eq!(place.city, "Sonipat");
        assert_eq!(place.district, "Sonipat District");
        assert_eq!(place.title(), "Sonipat, Sonipat District");
    }

    #[test]
    fn empty_address_resolves_to_placeholders() {
        let place = Place::from_address(&address(&[("city", "  ")]));
        assert_eq!(place.city, "--");
        assert_eq!(place.district, "--");
        assert!(place.resolved);
    }

    #[test]
    fn camp_query_appends_country() {
        assert_eq!(camp_query(" Pune ", "Pune"), "Pune, Pune, India");
    }
}
