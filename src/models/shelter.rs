use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShelterStatus {
    Available,
    Warning,
    Critical,
    #[serde(other)]
    Unknown,
}

impl ShelterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShelterStatus::Available => "available",
            ShelterStatus::Warning => "warning",
            ShelterStatus::Critical => "critical",
            ShelterStatus::Unknown => "unknown",
        }
    }

    /// Marker / badge colour used by every surface.
    pub fn color(&self) -> &'static str {
        match self {
            ShelterStatus::Available => "#28a745",
            ShelterStatus::Warning => "#ffc107",
            ShelterStatus::Critical => "#dc3545",
            ShelterStatus::Unknown => "#6c757d",
        }
    }

    /// "Available", "Critical", ...
    pub fn label(&self) -> String {
        let s = self.as_str();
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for ShelterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrantRole {
    Army,
    Government,
    Ngo,
}

impl RegistrantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrantRole::Army => "army",
            RegistrantRole::Government => "government",
            RegistrantRole::Ngo => "ngo",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedBy {
    pub name: String,
    #[serde(rename = "type")]
    pub role: RegistrantRole,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ProfessionalDetails {
    Army {
        rank: String,
        regiment: String,
        #[serde(rename = "armyId")]
        army_id: String,
        deployment: String,
    },
    Government {
        department: String,
        designation: String,
        #[serde(rename = "employeeId")]
        employee_id: String,
        #[serde(rename = "officeAddress")]
        office_address: String,
    },
    Ngo {
        #[serde(rename = "ngoName")]
        ngo_name: String,
        registration: String,
        position: String,
        #[serde(rename = "ngoAddress")]
        ngo_address: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shelter {
    pub id: u32,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub food_level: u8,
    pub water_level: u8,
    pub occupancy: u32,
    pub max_capacity: u32,
    pub status: ShelterStatus,
    pub contact: String,
    pub amenities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<CreatedBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_details: Option<ProfessionalDetails>,
}

/// A shelter that has not been given an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShelter {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub food_level: u8,
    pub water_level: u8,
    pub occupancy: u32,
    pub max_capacity: u32,
    pub status: ShelterStatus,
    pub contact: String,
    pub amenities: Vec<String>,
    pub created_by: Option<CreatedBy>,
    pub professional_details: Option<ProfessionalDetails>,
}

impl NewShelter {
    pub fn with_id(self, id: u32) -> Shelter {
        Shelter {
            id,
            name: self.name,
            lat: self.lat,
            lng: self.lng,
            food_level: self.food_level,
            water_level: self.water_level,
            occupancy: self.occupancy,
            max_capacity: self.max_capacity,
            status: self.status,
            contact: self.contact,
            amenities: self.amenities,
            created_by: self.created_by,
            professional_details: self.professional_details,
        }
    }
}

fn amenities(list: &[&str]) -> Vec<String> {
    list.iter().map(|a| a.to_string()).collect()
}

/// The shelters every session starts with.
pub fn seed_shelters() -> Vec<Shelter> {
    vec![
        Shelter {
            id: 1,
            name: "Delhi Relief Shelter".to_string(),
            lat: 28.6139,
            lng: 77.2090,
            food_level: 75,
            water_level: 90,
            occupancy: 120,
            max_capacity: 150,
            status: ShelterStatus::Available,
            contact: "+91-11-12345678".to_string(),
            amenities: amenities(&["Medical", "Food", "Water", "Power"]),
            created_by: None,
            professional_details: None,
        },
        Shelter {
            id: 2,
            name: "Mumbai Relief Center".to_string(),
            lat: 19.0760,
            lng: 72.8777,
            food_level: 25,
            water_level: 45,
            occupancy: 200,
            max_capacity: 200,
            status: ShelterStatus::Critical,
            contact: "+91-22-12345678".to_string(),
            amenities: amenities(&["Medical", "Food", "Water"]),
            created_by: None,
            professional_details: None,
        },
        Shelter {
            id: 3,
            name: "Bengaluru Community Center".to_string(),
            lat: 12.9716,
            lng: 77.5946,
            food_level: 60,
            water_level: 80,
            occupancy: 85,
            max_capacity: 120,
            status: ShelterStatus::Warning,
            contact: "+91-80-12345678".to_string(),
            amenities: amenities(&["Medical", "Food", "Water", "Power", "Internet"]),
            created_by: None,
            professional_details: None,
        },
        Shelter {
            id: 4,
            name: "Kolkata Emergency Center".to_string(),
            lat: 22.5726,
            lng: 88.3639,
            food_level: 95,
            water_level: 88,
            occupancy: 95,
            max_capacity: 180,
            status: ShelterStatus::Available,
            contact: "+91-33-12345678".to_string(),
            amenities: amenities(&["Medical", "Food", "Water", "Power"]),
            created_by: None,
            professional_details: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_strings_deserialize_to_unknown() {
        let status: ShelterStatus = serde_json::from_str("\"evacuated\"").unwrap();
        assert_eq!(status, ShelterStatus::Unknown);
        assert_eq!(status.color(), "#6c757d");
    }

    #[test]
    fn status_label_is_capitalized() {
        assert_eq!(ShelterStatus::Critical.label(), "Critical");
    }

    #[test]
    fn seed_ids_are_sequential() {
        let ids: Vec<u32> = seed_shelters().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn shelter_serializes_camel_case_without_registrant() {
        let json = serde_json::to_value(&seed_shelters()[0]).unwrap();
        assert_eq!(json["maxCapacity"], 150);
        assert_eq!(json["foodLevel"], 75);
        assert!(json.get("createdBy").is_none());
    }
}
