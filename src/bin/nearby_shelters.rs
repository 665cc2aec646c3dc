use dotenvy::dotenv;
use std::env;

use relief_map::models::{seed_shelters, NearbySet, UserLocation};
use relief_map::services::geocode_service::{Geocoder, NominatimGeocoder};
use relief_map::services::proximity_service::{DistanceFilter, ProximityEngine};
use relief_map::services::shelter_view_service;

fn env_f64(key: &str) -> Option<f64> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let radius = env_f64("RADIUS_KM").unwrap_or(DistanceFilter::default().km());
    let filter = match DistanceFilter::try_from(radius) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("nearby shelters: {}", e);
            std::process::exit(2);
        }
    };

    let location = match (env::var("PLACE").ok(), env_f64("LAT"), env_f64("LNG")) {
        (Some(place), _, _) => {
            let geocoder = NominatimGeocoder::from_env();
            match geocoder.forward(&place).await {
                Ok(point) => UserLocation {
                    lat: point.lat,
                    lng: point.lng,
                    accuracy: 0.0,
                },
                Err(e) => {
                    eprintln!("nearby shelters: could not locate '{}': {}", place, e);
                    std::process::exit(1);
                }
            }
        }
        (None, Some(lat), Some(lng)) => UserLocation {
            lat,
            lng,
            accuracy: 0.0,
        },
        _ => {
            eprintln!("nearby shelters: set PLACE, or LAT and LNG");
            std::process::exit(2);
        }
    };

    let mut engine = ProximityEngine::new(seed_shelters());
    engine.set_user_location(Some(location));
    engine.set_distance_filter(filter);

    let nearby = match engine.recompute_nearby() {
        NearbySet::Filtered(nearby) => nearby,
        NearbySet::Unfiltered(_) => {
            eprintln!("nearby shelters: no location applied");
            std::process::exit(1);
        }
    };

    println!(
        "nearby shelters: {:.4},{:.4} radius={}km found={}",
        location.lat,
        location.lng,
        filter.km(),
        nearby.len()
    );
    for n in &nearby {
        println!(
            "  #{} {} [{}] {} {}",
            n.shelter.id,
            n.shelter.name,
            n.shelter.status,
            shelter_view_service::distance_label(n.distance),
            shelter_view_service::directions_url(n.shelter.lat, n.shelter.lng)
        );
    }
}
