use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::services::upstream::{self, UpstreamError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeather {
    pub summary: String,
    pub temp_c: Option<f64>,
    pub wind_kmh: Option<f64>,
}

#[async_trait]
pub trait WeatherFeed: Send + Sync {
    async fn current_weather(&self, lat: f64, lng: f64) -> Result<CurrentWeather, UpstreamError>;
}

/// WMO weather interpretation codes as reported by Open-Meteo.
pub fn weather_summary(code: Option<i64>) -> &'static str {
    match code {
        Some(0) => "Clear sky",
        Some(1) => "Mainly clear",
        Some(2) => "Partly cloudy",
        Some(3) => "Overcast",
        Some(45) => "Fog",
        Some(48) => "Depositing rime fog",
        Some(51) => "Light drizzle",
        Some(53) => "Moderate drizzle",
        Some(55) => "Dense drizzle",
        Some(56) | Some(57) => "Freezing drizzle",
        Some(61) => "Light rain",
        Some(63) => "Moderate rain",
        Some(65) => "Heavy rain",
        Some(66) | Some(67) => "Freezing rain",
        Some(71) => "Light snow",
        Some(73) => "Moderate snow",
        Some(75) => "Heavy snow",
        Some(77) => "Snow grains",
        Some(80) | Some(81) => "Rain showers",
        Some(82) => "Heavy rain showers",
        Some(85) => "Snow showers",
        Some(86) => "Heavy snow showers",
        Some(95) => "Thunderstorm",
        Some(96) | Some(99) => "Thunderstorm w/ hail",
        _ => "Weather",
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeatherJson>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherJson {
    temperature: Option<f64>,
    windspeed: Option<f64>,
    weathercode: Option<i64>,
}

pub struct OpenMeteoWeather {
    client: reqwest::Client,
    base_url: String,
}

impl OpenMeteoWeather {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: upstream::http_client(),
            base_url: base_url.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(upstream::env_url(
            "WEATHER_API_URL",
            "https://api.open-meteo.com",
        ))
    }
}

#[async_trait]
impl WeatherFeed for OpenMeteoWeather {
    async fn current_weather(&self, lat: f64, lng: f64) -> Result<CurrentWeather, UpstreamError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lng.to_string()),
                ("current_weather", "true".to_string()),
                ("windspeed_unit", "kmh".to_string()),
            ])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| UpstreamError::Unreachable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(UpstreamError::Status(resp.status().as_u16()));
        }

        let parsed: ForecastResponse = resp
            .json()
            .await
            .map_err(|e| UpstreamError::Payload(e.to_string()))?;

        let current = parsed.current_weather;
        Ok(CurrentWeather {
            summary: weather_summary(current.as_ref().and_then(|c| c.weathercode)).to_string(),
            temp_c: current.as_ref().and_then(|c| c.temperature),
            wind_kmh: current.as_ref().and_then(|c| c.windspeed),
        })
    }
}

/// Weather widget contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherView {
    pub available: bool,
    pub summary: String,
    pub location: String,
    pub temperature: String,
    pub wind: String,
}

impl WeatherView {
    pub fn from_result(result: Result<CurrentWeather, UpstreamError>, location: &str) -> Self {
        match result {
            Ok(weather) => Self {
                available: true,
                summary: weather.summary,
                location: location.to_string(),
                temperature: weather
                    .temp_c
                    .map(|t| format!("{}°C", t.round()))
                    .unwrap_or_else(|| "--°C".to_string()),
                wind: weather
                    .wind_kmh
                    .map(|w| format!("{} km/h", w.round()))
                    .unwrap_or_else(|| "-- km/h".to_string()),
            },
            Err(e) => {
                warn!("🌦️ Weather unavailable for {}: {}", location, e);
                Self::unavailable(location)
            }
        }
    }

    pub fn unavailable(location: &str) -> Self {
        Self {
            available: false,
            summary: "Weather unavailable".to_string(),
            location: location.to_string(),
            temperature: "--°C".to_string(),
            wind: "-- km/h".to_string(),
        }
    }
}
