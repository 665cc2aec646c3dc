use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::seed_shelters;
use crate::services::area_service::AreaReporter;
use crate::services::camp_registry_service::{CampRegistry, HttpCampRegistry};
use crate::services::dashboard_service::{DashboardStats, SharedStats};
use crate::services::geocode_service::{Geocoder, NominatimGeocoder};
use crate::services::location_service::ClientLocationProvider;
use crate::services::news_service::{GoogleNewsRss, NewsFeed};
use crate::services::proximity_service::{ProximityEngine, ProximityHandle};
use crate::services::tracker_service::LocationTracker;
use crate::services::weather_service::{OpenMeteoWeather, WeatherFeed};

/// Third-party services the app talks to. Swapped for stubs in tests.
#[derive(Clone)]
pub struct Collaborators {
    pub geocoder: Arc<dyn Geocoder>,
    pub weather: Arc<dyn WeatherFeed>,
    pub news: Arc<dyn NewsFeed>,
    pub registry: Arc<dyn CampRegistry>,
}

impl Collaborators {
    pub fn from_env() -> Self {
        Self {
            geocoder: Arc::new(NominatimGeocoder::from_env()),
            weather: Arc::new(OpenMeteoWeather::from_env()),
            news: Arc::new(GoogleNewsRss::from_env()),
            registry: Arc::new(HttpCampRegistry::from_env()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub proximity: ProximityHandle,
    pub location: Arc<ClientLocationProvider>,
    pub tracker: Arc<LocationTracker>,
    pub area: AreaReporter,
    pub geocoder: Arc<dyn Geocoder>,
    pub weather: Arc<dyn WeatherFeed>,
    pub news: Arc<dyn NewsFeed>,
    pub registry: Arc<dyn CampRegistry>,
    pub stats: SharedStats,
}

impl AppState {
    /// Builds the engine from the seed list and wires the tracker to it.
    pub fn new(pool: SqlitePool, collaborators: Collaborators) -> Self {
        let shelters = seed_shelters();
        let stats = Arc::new(RwLock::new(DashboardStats::from_shelters(&shelters)));
        let proximity = ProximityHandle::new(ProximityEngine::new(shelters));

        let location = Arc::new(ClientLocationProvider::new());
        let area = AreaReporter::new(
            collaborators.geocoder.clone(),
            collaborators.weather.clone(),
            collaborators.news.clone(),
        );
        let tracker = Arc::new(LocationTracker::new(
            location.clone(),
            proximity.clone(),
            area.clone(),
        ));

        Self {
            pool,
            proximity,
            location,
            tracker,
            area,
            geocoder: collaborators.geocoder,
            weather: collaborators.weather,
            news: collaborators.news,
            registry: collaborators.registry,
            stats,
        }
    }
}
