use serde::Serialize;

use crate::models::{NearbySet, NearbySnapshot, Shelter, UserLocation};
use crate::services::geocode_service::{Place, PLACEHOLDER};

const INDIA_CENTER: (f64, f64) = (20.5937, 78.9629);

pub fn directions_url(lat: f64, lng: f64) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&destination={},{}",
        lat, lng
    )
}

pub fn distance_label(km: f64) -> String {
    format!("{:.1}km", km)
}

// ---- map layer ----

#[derive(Debug, Clone, Serialize)]
pub struct MapCenter {
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapMarker {
    pub id: u32,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub status: String,
    pub color: &'static str,
    pub occupancy: String,
    pub food_level: String,
    pub water_level: String,
    pub contact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserMarker {
    pub lat: f64,
    pub lng: f64,
    pub accuracy_m: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapLayerView {
    pub version: u64,
    pub center: MapCenter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserMarker>,
    pub markers: Vec<MapMarker>,
}

fn marker(shelter: &Shelter) -> MapMarker {
    MapMarker {
        id: shelter.id,
        name: shelter.name.clone(),
        lat: shelter.lat,
        lng: shelter.lng,
        status: shelter.status.as_str().to_uppercase(),
        color: shelter.status.color(),
        occupancy: format!("{}/{}", shelter.occupancy, shelter.max_capacity),
        food_level: format!("{}%", shelter.food_level),
        water_level: format!("{}%", shelter.water_level),
        contact: shelter.contact.clone(),
        created_by: shelter
            .created_by
            .as_ref()
            .map(|c| format!("{} ({})", c.name, c.role.as_str())),
    }
}

pub fn map_layer(snapshot: &NearbySnapshot) -> MapLayerView {
    let center = match snapshot.location {
        Some(UserLocation { lat, lng, .. }) => MapCenter { lat, lng, zoom: 13 },
        None => MapCenter {
            lat: INDIA_CENTER.0,
            lng: INDIA_CENTER.1,
            zoom: 5,
        },
    };

    MapLayerView {
        version: snapshot.version,
        center,
        user: snapshot.location.map(|loc| UserMarker {
            lat: loc.lat,
            lng: loc.lng,
            accuracy_m: loc.accuracy.round(),
        }),
        markers: snapshot
            .nearby
            .entries()
            .into_iter()
            .map(|(shelter, _)| marker(shelter))
            .collect(),
    }
}

// ---- shelter list ----

#[derive(Debug, Clone, Serialize)]
pub struct ShelterCard {
    pub id: u32,
    pub name: String,
    pub status: String,
    pub status_class: &'static str,
    pub food: String,
    pub water: String,
    pub occupancy: String,
    pub amenities: Vec<String>,
    pub call_url: String,
    pub directions_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationCard {
    pub city: String,
    pub district: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShelterListView {
    pub version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_card: Option<LocationCard>,
    pub cards: Vec<ShelterCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

fn card(shelter: &Shelter, distance: Option<f64>) -> ShelterCard {
    ShelterCard {
        id: shelter.id,
        name: shelter.name.clone(),
        status: shelter.status.as_str().to_uppercase(),
        status_class: shelter.status.as_str(),
        food: format!("{}%", shelter.food_level),
        water: format!("{}%", shelter.water_level),
        occupancy: format!("{}/{} occupants", shelter.occupancy, shelter.max_capacity),
        amenities: shelter.amenities.clone(),
        call_url: format!("tel:{}", shelter.contact),
        directions_url: directions_url(shelter.lat, shelter.lng),
        distance: distance.map(distance_label),
    }
}

/// `place` is the latest reverse-geocoded area, if any.
pub fn shelter_list(snapshot: &NearbySnapshot, place: Option<&Place>) -> ShelterListView {
    let cards: Vec<ShelterCard> = snapshot
        .nearby
        .entries()
        .into_iter()
        .map(|(shelter, distance)| card(shelter, distance))
        .collect();

    if snapshot.location.is_none() {
        return ShelterListView {
            version: snapshot.version,
            prompt: Some("Click \"My Location\" to see nearby shelters.".to_string()),
            location_card: None,
            cards,
            empty_message: None,
        };
    }

    let location_card = match place {
        Some(place) => LocationCard {
            city: place.city.clone(),
            district: place.district.clone(),
        },
        None => LocationCard {
            city: PLACEHOLDER.to_string(),
            district: PLACEHOLDER.to_string(),
        },
    };

    let empty_message = cards
        .is_empty()
        .then(|| "No nearby shelters in current radius.".to_string());

    ShelterListView {
        version: snapshot.version,
        prompt: None,
        location_card: Some(location_card),
        cards,
        empty_message,
    }
}

// ---- nearby panel ----

#[derive(Debug, Clone, Serialize)]
pub struct NearbyItem {
    pub id: u32,
    pub name: String,
    pub summary: String,
    pub contact: String,
    pub distance: String,
    pub directions_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmptyNotice {
    pub message: String,
    pub hint: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyPanelView {
    pub version: u64,
    pub location_known: bool,
    pub radius_km: f64,
    pub count: usize,
    pub items: Vec<NearbyItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty: Option<EmptyNotice>,
}

/// Without a fix the panel is empty and waits for one.
pub fn nearby_panel(snapshot: &NearbySnapshot) -> NearbyPanelView {
    let items: Vec<NearbyItem> = match &snapshot.nearby {
        NearbySet::Filtered(nearby) => nearby
            .iter()
            .map(|n| NearbyItem {
                id: n.shelter.id,
                name: n.shelter.name.clone(),
                summary: format!(
                    "{}/{} occupants • {}",
                    n.shelter.occupancy,
                    n.shelter.max_capacity,
                    n.shelter.status.label()
                ),
                contact: n.shelter.contact.clone(),
                distance: distance_label(n.distance),
                directions_url: directions_url(n.shelter.lat, n.shelter.lng),
            })
            .collect(),
        NearbySet::Unfiltered(_) => Vec::new(),
    };

    let empty = (snapshot.location.is_some() && items.is_empty()).then(|| EmptyNotice {
        message: format!("No relief centers found within {}km", snapshot.radius_km),
        hint: "Try increasing the distance filter".to_string(),
    });

    NearbyPanelView {
        version: snapshot.version,
        location_known: snapshot.location.is_some(),
        radius_km: snapshot.radius_km,
        count: items.len(),
        items,
        empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed_shelters;
    use crate::services::proximity_service::{DistanceFilter, ProximityEngine};

    fn snapshot(location: Option<(f64, f64)>, filter: DistanceFilter) -> NearbySnapshot {
        let mut engine = ProximityEngine::new(seed_shelters());
        engine.set_user_location(location.map(|(lat, lng)| UserLocation {
            lat,
            lng,
            accuracy: 24.4,
        }));
        engine.set_distance_filter(filter);
        NearbySnapshot {
            version: 3,
            location: engine.location(),
            radius_km: engine.filter().km(),
            total_shelters: engine.shelters().len(),
            nearby: engine.recompute_nearby(),
        }
    }

    #[test]
    fn without_location_all_surfaces_show_everything() {
        let snap = snapshot(None, DistanceFilter::Km1);

        let map = map_layer(&snap);
        assert_eq!(map.markers.len(), 4);
        assert_eq!(map.center.zoom, 5);
        assert!(map.user.is_none());

        let list = shelter_list(&snap, None);
        assert!(list.prompt.is_some());
        assert_eq!(list.cards.len(), 4);
        assert!(list.cards.iter().all(|c| c.distance.is_none()));

        let panel = nearby_panel(&snap);
        assert!(!panel.location_known);
        assert_eq!(panel.count, 0);
        assert!(panel.empty.is_none());
    }

    #[test]
    fn surfaces_agree_on_the_filtered_set() {
        let snap = snapshot(Some((28.60, 77.20)), DistanceFilter::Km5);

        let map = map_layer(&snap);
        let list = shelter_list(&snap, None);
        let panel = nearby_panel(&snap);

        let map_ids: Vec<u32> = map.markers.iter().map(|m| m.id).collect();
        let list_ids: Vec<u32> = list.cards.iter().map(|c| c.id).collect();
        let panel_ids: Vec<u32> = panel.items.iter().map(|i| i.id).collect();
        assert_eq!(map_ids, vec![1]);
        assert_eq!(list_ids, map_ids);
        assert_eq!(panel_ids, map_ids);

        assert_eq!(map.center.zoom, 13);
        assert_eq!(map.user.as_ref().unwrap().accuracy_m, 24.0);
        assert_eq!(panel.items[0].distance, "1.8km");
        assert_eq!(panel.items[0].summary, "120/150 occupants • Available");
        assert_eq!(
            panel.items[0].directions_url,
            "https://www.google.com/maps/dir/?api=1&destination=28.6139,77.209"
        );
        let card = list.location_card.unwrap();
        assert_eq!(card.city, "--");
    }

    #[test]
    fn empty_radius_messages() {
        let snap = snapshot(Some((28.60, 77.20)), DistanceFilter::Km1);

        let panel = nearby_panel(&snap);
        let empty = panel.empty.unwrap();
        assert_eq!(empty.message, "No relief centers found within 1km");
        assert_eq!(empty.hint, "Try increasing the distance filter");

        let list = shelter_list(
            &snap,
            Some(&Place {
                city: "New Delhi".to_string(),
                district: "Central Delhi".to_string(),
                resolved: true,
            }),
        );
        assert_eq!(
            list.empty_message.as_deref(),
            Some("No nearby shelters in current radius.")
        );
        assert_eq!(list.location_card.unwrap().district, "Central Delhi");
        assert!(map_layer(&snap).markers.is_empty());
    }

    #[test]
    fn registrant_shows_on_the_marker() {
        let mut shelter = seed_shelters().remove(0);
        shelter.created_by = Some(crate::models::CreatedBy {
            name: "Asha Rao".to_string(),
            role: crate::models::RegistrantRole::Ngo,
            email: "asha@example.org".to_string(),
            phone: "1".to_string(),
        });
        assert_eq!(marker(&shelter).created_by.as_deref(), Some("Asha Rao (ngo)"));
        assert_eq!(marker(&shelter).status, "AVAILABLE");
    }
}
