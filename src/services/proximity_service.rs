use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::debug;

use crate::models::{NearbySet, NearbyShelter, NearbySnapshot, NewShelter, Shelter, UserLocation};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in km on a spherical earth.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Radius presets offered by the distance buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum DistanceFilter {
    #[default]
    Km1,
    Km2,
    Km5,
    Km10,
    Km25,
    Km50,
}

impl DistanceFilter {
    pub const PRESETS: [DistanceFilter; 6] = [
        DistanceFilter::Km1,
        DistanceFilter::Km2,
        DistanceFilter::Km5,
        DistanceFilter::Km10,
        DistanceFilter::Km25,
        DistanceFilter::Km50,
    ];

    pub fn km(&self) -> f64 {
        match self {
            DistanceFilter::Km1 => 1.0,
            DistanceFilter::Km2 => 2.0,
            DistanceFilter::Km5 => 5.0,
            DistanceFilter::Km10 => 10.0,
            DistanceFilter::Km25 => 25.0,
            DistanceFilter::Km50 => 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("{0} km is not a supported radius")]
pub struct UnsupportedRadius(pub f64);

impl TryFrom<f64> for DistanceFilter {
    type Error = UnsupportedRadius;

    fn try_from(km: f64) -> Result<Self, Self::Error> {
        Self::PRESETS
            .into_iter()
            .find(|preset| preset.km() == km)
            .ok_or(UnsupportedRadius(km))
    }
}

impl From<DistanceFilter> for f64 {
    fn from(filter: DistanceFilter) -> f64 {
        filter.km()
    }
}

/// Location, radius and the session's shelters. Never fails; an unknown
/// location just disables filtering.
#[derive(Debug, Clone)]
pub struct ProximityEngine {
    location: Option<UserLocation>,
    filter: DistanceFilter,
    shelters: Vec<Shelter>,
}

impl ProximityEngine {
    pub fn new(shelters: Vec<Shelter>) -> Self {
        Self {
            location: None,
            filter: DistanceFilter::default(),
            shelters,
        }
    }

    pub fn location(&self) -> Option<UserLocation> {
        self.location
    }

    pub fn filter(&self) -> DistanceFilter {
        self.filter
    }

    pub fn shelters(&self) -> &[Shelter] {
        &self.shelters
    }

    pub fn set_user_location(&mut self, location: Option<UserLocation>) {
        self.location = location;
    }

    pub fn set_distance_filter(&mut self, filter: DistanceFilter) {
        self.filter = filter;
    }

    /// Appends with id = current count + 1.
    pub fn register_shelter(&mut self, new: NewShelter) -> Shelter {
        let id = self.shelters.len() as u32 + 1;
        let shelter = new.with_id(id);
        self.shelters.push(shelter.clone());
        shelter
    }

    pub fn recompute_nearby(&self) -> NearbySet {
        let Some(loc) = self.location else {
            return NearbySet::Unfiltered(self.shelters.clone());
        };

        let radius = self.filter.km();
        let mut nearby: Vec<NearbyShelter> = self
            .shelters
            .iter()
            .map(|s| NearbyShelter {
                distance: haversine_km(loc.lat, loc.lng, s.lat, s.lng),
                shelter: s.clone(),
            })
            .filter(|n| n.distance <= radius)
            .collect();

        // sort_by is stable: equal distances keep list order
        nearby.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        NearbySet::Filtered(nearby)
    }
}

/// Shared owner of the engine. Every write recomputes and publishes a
/// snapshot before releasing the lock, so subscribers see writes in order.
#[derive(Clone)]
pub struct ProximityHandle {
    engine: Arc<RwLock<ProximityEngine>>,
    snapshots: Arc<watch::Sender<Arc<NearbySnapshot>>>,
}

impl ProximityHandle {
    pub fn new(engine: ProximityEngine) -> Self {
        let first = Arc::new(snapshot_of(&engine, 0));
        let (tx, _rx) = watch::channel(first);
        Self {
            engine: Arc::new(RwLock::new(engine)),
            snapshots: Arc::new(tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<NearbySnapshot>> {
        self.snapshots.subscribe()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<NearbySnapshot> {
        self.snapshots.borrow().clone()
    }

    pub async fn location(&self) -> Option<UserLocation> {
        self.engine.read().await.location()
    }

    pub async fn filter(&self) -> DistanceFilter {
        self.engine.read().await.filter()
    }

    pub async fn shelter_count(&self) -> usize {
        self.engine.read().await.shelters().len()
    }

    pub async fn set_user_location(&self, location: Option<UserLocation>) -> Arc<NearbySnapshot> {
        let mut engine = self.engine.write().await;
        engine.set_user_location(location);
        self.publish(&engine)
    }

    pub async fn set_distance_filter(&self, filter: DistanceFilter) -> Arc<NearbySnapshot> {
        let mut engine = self.engine.write().await;
        engine.set_distance_filter(filter);
        self.publish(&engine)
    }

    pub async fn register_shelter(&self, new: NewShelter) -> (Shelter, Arc<NearbySnapshot>) {
        let mut engine = self.engine.write().await;
        let shelter = engine.register_shelter(new);
        let snapshot = self.publish(&engine);
        (shelter, snapshot)
    }

    /// Recompute and republish with no state change, e.g. a manual "find
    /// nearby" with a known fix. Takes the write lock so the publish is
    /// ordered with writes.
    pub async fn refresh(&self) -> Arc<NearbySnapshot> {
        let engine = self.engine.write().await;
        self.publish(&engine)
    }

    fn publish(&self, engine: &ProximityEngine) -> Arc<NearbySnapshot> {
        let version = self.snapshots.borrow().version + 1;
        let snapshot = Arc::new(snapshot_of(engine, version));
        debug!(
            "🧭 Nearby snapshot v{}: {} shelter(s), filtered={}",
            version,
            snapshot.nearby.len(),
            snapshot.nearby.is_filtered()
        );
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }
}

fn snapshot_of(engine: &ProximityEngine, version: u64) -> NearbySnapshot {
    NearbySnapshot {
        version,
        location: engine.location(),
        radius_km: engine.filter().km(),
        total_shelters: engine.shelters().len(),
        nearby: engine.recompute_nearby(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{seed_shelters, ShelterStatus};

    fn at(lat: f64, lng: f64) -> UserLocation {
        UserLocation {
            lat,
            lng,
            accuracy: 20.0,
        }
    }

    fn camp(name: &str, lat: f64, lng: f64) -> NewShelter {
        NewShelter {
            name: name.to_string(),
            lat,
            lng,
            food_level: 100,
            water_level: 100,
            occupancy: 0,
            max_capacity: 50,
            status: ShelterStatus::Available,
            contact: "+91-00-00000000".to_string(),
            amenities: vec!["Food".to_string()],
            created_by: None,
            professional_details: None,
        }
    }

    fn filtered_names(set: &NearbySet) -> Vec<String> {
        set.entries().iter().map(|(s, _)| s.name.clone()).collect()
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let points = [
            (28.6139, 77.2090),
            (19.0760, 72.8777),
            (-33.8688, 151.2093),
            (0.0, 0.0),
            (89.9, -179.9),
        ];
        for &(lat1, lng1) in &points {
            assert_eq!(haversine_km(lat1, lng1, lat1, lng1), 0.0);
            for &(lat2, lng2) in &points {
                assert_eq!(
                    haversine_km(lat1, lng1, lat2, lng2),
                    haversine_km(lat2, lng2, lat1, lng1)
                );
            }
        }
    }

    #[test]
    fn distance_matches_known_city_pair() {
        // Delhi -> Mumbai is roughly 1150 km great-circle
        let d = haversine_km(28.6139, 77.2090, 19.0760, 72.8777);
        assert!((d - 1153.0).abs() < 5.0, "got {}", d);
    }

    #[test]
    fn delhi_shelter_enters_between_one_and_five_km() {
        let mut engine = ProximityEngine::new(seed_shelters());
        engine.set_user_location(Some(at(28.6000, 77.2000)));

        let d = haversine_km(28.6000, 77.2000, 28.6139, 77.2090);
        assert!(d > 1.0 && d < 2.0, "got {}", d);

        assert!(engine.recompute_nearby().is_empty());

        engine.set_distance_filter(DistanceFilter::Km5);
        let set = engine.recompute_nearby();
        assert_eq!(filtered_names(&set), vec!["Delhi Relief Shelter"]);
    }

    #[test]
    fn unknown_location_returns_everything_for_any_filter() {
        let mut engine = ProximityEngine::new(seed_shelters());
        for preset in DistanceFilter::PRESETS {
            engine.set_distance_filter(preset);
            let set = engine.recompute_nearby();
            assert!(!set.is_filtered());
            assert_eq!(set.len(), 4);
            assert_eq!(
                filtered_names(&set),
                seed_shelters().into_iter().map(|s| s.name).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn result_is_exactly_the_in_range_subset_sorted() {
        let mut engine = ProximityEngine::new(seed_shelters());
        let loc = at(28.60, 77.20);
        engine.register_shelter(camp("Far", 28.90, 77.20));
        engine.register_shelter(camp("Close", 28.601, 77.201));
        engine.register_shelter(camp("Middle", 28.65, 77.25));
        engine.set_user_location(Some(loc));
        engine.set_distance_filter(DistanceFilter::Km10);

        let NearbySet::Filtered(nearby) = engine.recompute_nearby() else {
            panic!("expected a filtered set");
        };

        let expected: Vec<u32> = engine
            .shelters()
            .iter()
            .filter(|s| haversine_km(loc.lat, loc.lng, s.lat, s.lng) <= 10.0)
            .map(|s| s.id)
            .collect();
        let mut got: Vec<u32> = nearby.iter().map(|n| n.shelter.id).collect();
        assert_eq!(
            nearby
                .iter()
                .map(|n| n.shelter.name.as_str())
                .collect::<Vec<_>>(),
            vec!["Close", "Delhi Relief Shelter", "Middle"]
        );
        assert!(nearby.windows(2).all(|w| w[0].distance <= w[1].distance));
        got.sort();
        assert_eq!(got, expected);
    }

    #[test]
    fn widening_the_radius_never_drops_a_shelter() {
        let mut engine = ProximityEngine::new(seed_shelters());
        engine.register_shelter(camp("Gurugram Camp", 28.4595, 77.0266));
        engine.register_shelter(camp("Noida Camp", 28.5355, 77.3910));
        engine.set_user_location(Some(at(28.60, 77.20)));

        let mut previous: Vec<u32> = Vec::new();
        for preset in DistanceFilter::PRESETS {
            engine.set_distance_filter(preset);
            let ids: Vec<u32> = engine
                .recompute_nearby()
                .entries()
                .iter()
                .map(|(s, _)| s.id)
                .collect();
            assert!(previous.iter().all(|id| ids.contains(id)));
            previous = ids;
        }
        assert_eq!(previous.len(), 3);
    }

    #[test]
    fn equal_distances_keep_list_order() {
        let mut engine = ProximityEngine::new(Vec::new());
        engine.register_shelter(camp("Zeta Camp", 28.61, 77.21));
        engine.register_shelter(camp("Alpha Camp", 28.61, 77.21));
        engine.set_user_location(Some(at(28.60, 77.20)));
        engine.set_distance_filter(DistanceFilter::Km5);

        let set = engine.recompute_nearby();
        assert_eq!(filtered_names(&set), vec!["Zeta Camp", "Alpha Camp"]);
        let entries = set.entries();
        assert_eq!(entries[0].1, entries[1].1);
    }

    #[test]
    fn registration_assigns_next_id_and_joins_the_nearby_set() {
        let mut engine = ProximityEngine::new(seed_shelters());
        engine.set_user_location(Some(at(19.08, 72.88)));
        let shelter = engine.register_shelter(camp("Andheri Camp", 19.0790, 72.8810));
        assert_eq!(shelter.id, 5);
        assert_eq!(shelter.max_capacity, 50);

        let ids: Vec<u32> = engine
            .recompute_nearby()
            .entries()
            .iter()
            .map(|(s, _)| s.id)
            .collect();
        assert_eq!(ids, vec![5, 2]);
    }

    #[test]
    fn last_location_wins() {
        let mut engine = ProximityEngine::new(seed_shelters());
        engine.set_user_location(Some(at(28.6139, 77.2090)));
        engine.set_user_location(Some(at(22.5726, 88.3639)));
        let set = engine.recompute_nearby();
        assert_eq!(filtered_names(&set), vec!["Kolkata Emergency Center"]);

        engine.set_user_location(None);
        assert!(!engine.recompute_nearby().is_filtered());
    }

    #[test]
    fn radius_presets_parse_from_km() {
        assert_eq!(DistanceFilter::try_from(5.0), Ok(DistanceFilter::Km5));
        assert_eq!(DistanceFilter::try_from(3.0), Err(UnsupportedRadius(3.0)));
        let parsed: DistanceFilter = serde_json::from_str("25").unwrap();
        assert_eq!(parsed, DistanceFilter::Km25);
        assert!(serde_json::from_str::<DistanceFilter>("7").is_err());
    }

    #[tokio::test]
    async fn handle_publishes_one_snapshot_per_write() {
        let handle = ProximityHandle::new(ProximityEngine::new(seed_shelters()));
        let mut rx = handle.subscribe();
        assert_eq!(rx.borrow().version, 0);

        handle.set_user_location(Some(at(28.60, 77.20))).await;
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().version, 1);
        assert!(rx.borrow().nearby.is_empty());

        let snap = handle.set_distance_filter(DistanceFilter::Km5).await;
        assert_eq!(snap.version, 2);
        assert_eq!(snap.radius_km, 5.0);
        assert_eq!(snap.nearby.len(), 1);
        assert_eq!(handle.snapshot().version, 2);
    }

    #[tokio::test]
    async fn refresh_republishes_the_same_set_in_order() {
        let handle = ProximityHandle::new(ProximityEngine::new(seed_shelters()));
        let first = handle.set_user_location(Some(at(22.57, 88.36))).await;
        let again = handle.refresh().await;
        assert_eq!(again.version, first.version + 1);
        assert_eq!(again.nearby, first.nearby);
        assert_eq!(handle.snapshot().version, again.version);
    }
}
