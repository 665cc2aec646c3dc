use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::UserLocation;
use crate::services::geocode_service::{self, Geocoder, Place};
use crate::services::news_service::{NewsFeed, NewsView};
use crate::services::weather_service::{WeatherFeed, WeatherView};

/// Everything shown about the user's surroundings for one fix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaReport {
    pub seq: u64,
    pub location: UserLocation,
    pub accuracy: String,
    pub place: Place,
    pub title: String,
    pub weather: WeatherView,
    /// Only loaded once the place resolved.
    pub news: Option<NewsView>,
}

#[derive(Clone)]
pub struct AreaReporter {
    geocoder: Arc<dyn Geocoder>,
    weather: Arc<dyn WeatherFeed>,
    news: Arc<dyn NewsFeed>,
    latest: Arc<RwLock<Option<AreaReport>>>,
    seq: Arc<AtomicU64>,
}

impl AreaReporter {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        weather: Arc<dyn WeatherFeed>,
        news: Arc<dyn NewsFeed>,
    ) -> Self {
        Self {
            geocoder,
            weather,
            news,
            latest: Arc::new(RwLock::new(None)),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn latest(&self) -> Option<AreaReport> {
        self.latest.read().await.clone()
    }

    /// Fire-and-forget refresh for a new fix. Returns the report's sequence
    /// number.
    pub fn refresh_in_background(&self, location: UserLocation) -> u64 {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let reporter = self.clone();
        tokio::spawn(async move {
            let report = reporter.build_report(seq, location).await;
            reporter.store(report).await;
        });
        seq
    }

    /// Runs the lookups for one fix. Each lookup is attempted once and a
    /// failure only blanks its own part of the report.
    pub async fn build_report(&self, seq: u64, location: UserLocation) -> AreaReport {
        let (place, weather) = tokio::join!(
            geocode_service::resolve_place(self.geocoder.as_ref(), location.lat, location.lng),
            self.weather.current_weather(location.lat, location.lng),
        );

        let title = place.title();
        let news = if place.resolved {
            let headlines = self
                .news
                .recent_headlines(&place.city, &place.district)
                .await;
            Some(NewsView::from_result(headlines))
        } else {
            None
        };

        AreaReport {
            seq,
            location,
            accuracy: format!("{}m", location.accuracy.round()),
            weather: WeatherView::from_result(weather, &title),
            title,
            place,
            news,
        }
    }

    /// Keeps the newest report; a slow lookup for an older fix is dropped.
    pub async fn store(&self, report: AreaReport) -> bool {
        let mut latest = self.latest.write().await;
        if latest.as_ref().is_some_and(|current| current.seq > report.seq) {
            debug!(
                "📍 Dropping stale area report #{} (have #{})",
                report.seq,
                latest.as_ref().map(|r| r.seq).unwrap_or_default()
            );
            return false;
        }
        *latest = Some(report);
        true
    }
}
