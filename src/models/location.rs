use serde::{Deserialize, Serialize};

use crate::models::shelter::Shelter;

/// A single geolocation fix. Accuracy is in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub lat: f64,
    pub lng: f64,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyShelter {
    #[serde(flatten)]
    pub shelter: Shelter,
    pub distance: f64,
}

/// Result of one recomputation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "shelters", rename_all = "snake_case")]
pub enum NearbySet {
    /// No location known: every shelter, list order, no distances.
    Unfiltered(Vec<Shelter>),
    /// Shelters inside the radius, nearest first.
    Filtered(Vec<NearbyShelter>),
}

impl NearbySet {
    pub fn len(&self) -> usize {
        match self {
            NearbySet::Unfiltered(all) => all.len(),
            NearbySet::Filtered(nearby) => nearby.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_filtered(&self) -> bool {
        matches!(self, NearbySet::Filtered(_))
    }

    /// Shelters paired with their distance, if one was computed.
    pub fn entries(&self) -> Vec<(&Shelter, Option<f64>)> {
        match self {
            NearbySet::Unfiltered(all) => all.iter().map(|s| (s, None)).collect(),
            NearbySet::Filtered(nearby) => nearby
                .iter()
                .map(|n| (&n.shelter, Some(n.distance)))
                .collect(),
        }
    }
}

/// What the presentation surfaces render from. Published after every write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbySnapshot {
    pub version: u64,
    pub location: Option<UserLocation>,
    pub radius_km: f64,
    pub total_shelters: usize,
    pub nearby: NearbySet,
}
