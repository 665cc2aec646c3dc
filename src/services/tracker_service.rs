use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::models::{NearbySnapshot, UserLocation};
use crate::services::area_service::AreaReporter;
use crate::services::location_service::{
    LocationError, LocationOptions, LocationProvider, WatchCancel,
};
use crate::services::proximity_service::ProximityHandle;

struct ActiveWatch {
    cancel: WatchCancel,
    task: JoinHandle<()>,
}

/// Connects the location provider to the proximity engine. Holds at most one
/// continuous watch.
pub struct LocationTracker {
    provider: Arc<dyn LocationProvider>,
    proximity: ProximityHandle,
    area: AreaReporter,
    active: Mutex<Option<ActiveWatch>>,
}

impl LocationTracker {
    pub fn new(
        provider: Arc<dyn LocationProvider>,
        proximity: ProximityHandle,
        area: AreaReporter,
    ) -> Self {
        Self {
            provider,
            proximity,
            area,
            active: Mutex::new(None),
        }
    }

    /// Applies one fix: engine write, recompute, publish, area refresh.
    pub async fn apply_fix(&self, location: UserLocation) -> Arc<NearbySnapshot> {
        apply_fix(&self.proximity, &self.area, location).await
    }

    /// Starts the continuous watch. No-op if one already exists.
    pub async fn start(&self) -> bool {
        let mut active = self.active.lock().await;
        if active.is_some() {
            return false;
        }

        let (mut updates, cancel) = self.provider.watch(LocationOptions::watch());
        let proximity = self.proximity.clone();
        let area = self.area.clone();
        let task = tokio::spawn(async move {
            while let Some(update) = updates.next().await {
                match update {
                    Ok(location) => {
                        apply_fix(&proximity, &area, location).await;
                    }
                    Err(e) => debug!("📍 Watch update ignored: {:?}", e),
                }
            }
            debug!("📍 Location watch ended");
        });

        *active = Some(ActiveWatch { cancel, task });
        info!("📍 Location watch started");
        true
    }

    pub async fn is_watching(&self) -> bool {
        self.active.lock().await.is_some()
    }

    /// Cancels the watch and waits for its task to finish.
    pub async fn stop(&self) -> bool {
        let Some(watch) = self.active.lock().await.take() else {
            return false;
        };
        watch.cancel.cancel();
        let _ = watch.task.await;
        info!("📍 Location watch stopped");
        true
    }

    /// "Find nearby": reuse the known fix, otherwise take a one-shot fix and
    /// start watching.
    pub async fn find_nearby(&self) -> Result<Arc<NearbySnapshot>, LocationError> {
        if self.proximity.location().await.is_some() {
            return Ok(self.proximity.refresh().await);
        }

        let location = self.provider.get_once(LocationOptions::one_shot()).await?;
        let snapshot = self.apply_fix(location).await;
        self.start().await;
        Ok(snapshot)
    }
}

async fn apply_fix(
    proximity: &ProximityHandle,
    area: &AreaReporter,
    location: UserLocation,
) -> Arc<NearbySnapshot> {
    let snapshot = proximity.set_user_location(Some(location)).await;
    area.refresh_in_background(location);
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed_shelters;
    use crate::services::geocode_service::{Address, GeoPoint, GeocodeError, Geocoder};
    use crate::services::location_service::ClientLocationProvider;
    use crate::services::news_service::{Headline, NewsFeed};
    use crate::services::proximity_service::{DistanceFilter, ProximityEngine};
    use crate::services::upstream::UpstreamError;
    use crate::services::weather_service::{CurrentWeather, WeatherFeed};
    use async_trait::async_trait;
    use std::time::Duration;

    struct Offline;

    #[async_trait]
    impl Geocoder for Offline {
        async fn forward(&self, _q: &str) -> Result<GeoPoint, GeocodeError> {
            Err(GeocodeError::RequestFailed)
        }
        async fn reverse(&self, _lat: f64, _lng: f64) -> Result<Address, GeocodeError> {
            Err(GeocodeError::RequestFailed)
        }
    }

    #[async_trait]
    impl WeatherFeed for Offline {
        async fn current_weather(&self, _lat: f64, _lng: f64) -> Result<CurrentWeather, UpstreamError> {
            Err(UpstreamError::Unreachable("offline".to_string()))
        }
    }

    #[async_trait]
    impl NewsFeed for Offline {
        async fn recent_headlines(&self, _c: &str, _d: &str) -> Result<Vec<Headline>, UpstreamError> {
            Err(UpstreamError::Unreachable("offline".to_string()))
        }
    }

    fn setup() -> (Arc<ClientLocationProvider>, ProximityHandle, LocationTracker) {
        let provider = Arc::new(ClientLocationProvider::new());
        let proximity = ProximityHandle::new(ProximityEngine::new(seed_shelters()));
        let area = AreaReporter::new(Arc::new(Offline), Arc::new(Offline), Arc::new(Offline));
        let tracker = LocationTracker::new(provider.clone(), proximity.clone(), area);
        (provider, proximity, tracker)
    }

    fn fix(lat: f64, lng: f64) -> UserLocation {
        UserLocation {
            lat,
            lng,
            accuracy: 10.0,
        }
    }

    #[tokio::test]
    async fn second_start_is_a_no_op() {
        let (_provider, _proximity, tracker) = setup();
        assert!(tracker.start().await);
        assert!(!tracker.start().await);
        assert!(tracker.is_watching().await);
        assert!(tracker.stop().await);
        assert!(!tracker.is_watching().await);
        assert!(!tracker.stop().await);
    }

    #[tokio::test]
    async fn find_nearby_uses_a_cached_fix_then_watches() {
        let (provider, proximity, tracker) = setup();
        proximity.set_distance_filter(DistanceFilter::Km5).await;
        provider.push_fix(fix(28.60, 77.20));

        let snapshot = tracker.find_nearby().await.unwrap();
        assert_eq!(snapshot.nearby.len(), 1);
        assert!(tracker.is_watching().await);

        // later fixes flow through the watch
        let mut rx = proximity.subscribe();
        rx.borrow_and_update();
        provider.push_fix(fix(22.5726, 88.3639));
        tokio::time::timeout(Duration::from_secs(2), rx.changed())
            .await
            .unwrap()
            .unwrap();
        let names: Vec<String> = rx
            .borrow()
            .nearby
            .entries()
            .iter()
            .map(|(s, _)| s.name.clone())
            .collect();
        assert_eq!(names, vec!["Kolkata Emergency Center"]);

        tracker.stop().await;
    }

    #[tokio::test]
    async fn each_watched_fix_publishes_its_own_snapshot() {
        let (provider, proximity, tracker) = setup();
        assert!(tracker.start().await);
        let start = proximity.snapshot().version;

        for i in 1..=5 {
            provider.push_fix(fix(28.0 + f64::from(i) * 0.01, 77.2));
        }

        let mut rx = proximity.subscribe();
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let version = rx.borrow_and_update().version;
                if version >= start + 5 {
                    break;
                }
                rx.changed().await.unwrap();
            }
        })
        .await
        .unwrap();

        let snapshot = proximity.snapshot();
        assert_eq!(snapshot.version, start + 5);
        assert_eq!(snapshot.location, Some(fix(28.0 + 5.0 * 0.01, 77.2)));
        tracker.stop().await;
    }

    #[tokio::test]
    async fn find_nearby_surfaces_provider_errors() {
        let (provider, proximity, tracker) = setup();
        provider.push_error(LocationError::PermissionDenied);
        // a cached error is not a fix, so the one-shot waits for the next reading
        let waiter = tokio::spawn(async move { tracker.find_nearby().await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        provider.push_error(LocationError::PermissionDenied);

        assert_eq!(waiter.await.unwrap(), Err(LocationError::PermissionDenied));
        assert!(proximity.location().await.is_none());
    }
}
