use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{
    CampForm, CampRecord, CreatedBy, NewShelter, ProfessionalDetails, RegistrantRole, Shelter,
    ShelterStatus,
};
use crate::services::camp_registry_service::CampRegistry;
use crate::services::draft_service;
use crate::services::geocode_service::{self, Geocoder};
use crate::services::proximity_service::ProximityHandle;

pub const REQUIRED_FIELDS: [&str; 11] = [
    "firstName",
    "lastName",
    "email",
    "phone",
    "campName",
    "campType",
    "maxCapacity",
    "contactPhone",
    "campAddress",
    "district",
    "city",
];

pub fn role_fields(role: RegistrantRole) -> [&'static str; 4] {
    match role {
        RegistrantRole::Army => ["rank", "regiment", "armyId", "deployment"],
        RegistrantRole::Government => ["department", "designation", "employeeId", "officeAddress"],
        RegistrantRole::Ngo => ["ngoName", "ngoRegistration", "position", "ngoAddress"],
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CampError {
    #[error("{0}")]
    Validation(String),
    #[error("Unable to locate that district/city. Please check the names.")]
    GeocodeMiss,
}

/// "maxCapacity" -> "max capacity"
pub fn humanize_field(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push(' ');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Fields checked in form order; the first problem wins.
pub fn validate_form(form: &CampForm) -> Result<RegistrantRole, CampError> {
    let role = form.user_type.ok_or_else(|| {
        CampError::Validation(
            "Please select your user type (Army, Government, or NGO)".to_string(),
        )
    })?;

    let missing = |field: &str| {
        CampError::Validation(format!("Please fill in the {} field", humanize_field(field)))
    };

    for field in REQUIRED_FIELDS {
        if form.text(field).is_empty() {
            return Err(missing(field));
        }
    }

    if !form.amenities.iter().any(|a| !a.trim().is_empty()) {
        return Err(CampError::Validation(
            "Please select at least one amenity".to_string(),
        ));
    }

    for field in role_fields(role) {
        if form.text(field).is_empty() {
            return Err(missing(field));
        }
    }

    parse_capacity(&form.text("maxCapacity"))?;
    Ok(role)
}

fn parse_capacity(raw: &str) -> Result<u32, CampError> {
    raw.parse::<u32>().map_err(|_| {
        CampError::Validation("Please enter a valid max capacity".to_string())
    })
}

pub fn professional_details(form: &CampForm, role: RegistrantRole) -> ProfessionalDetails {
    match role {
        RegistrantRole::Army => ProfessionalDetails::Army {
            rank: form.text("rank"),
            regiment: form.text("regiment"),
            army_id: form.text("armyId"),
            deployment: form.text("deployment"),
        },
        RegistrantRole::Government => ProfessionalDetails::Government {
            department: form.text("department"),
            designation: form.text("designation"),
            employee_id: form.text("employeeId"),
            office_address: form.text("officeAddress"),
        },
        RegistrantRole::Ngo => ProfessionalDetails::Ngo {
            ngo_name: form.text("ngoName"),
            registration: form.text("ngoRegistration"),
            position: form.text("position"),
            ngo_address: form.text("ngoAddress"),
        },
    }
}

fn amenities(form: &CampForm) -> Vec<String> {
    form.amenities
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct CampCreated {
    pub shelter: Shelter,
    pub persisted: bool,
    pub total_shelters: usize,
    pub message: String,
}

pub struct CampDeps<'a> {
    pub pool: &'a SqlitePool,
    pub proximity: &'a ProximityHandle,
    pub geocoder: &'a dyn Geocoder,
    pub registry: &'a dyn CampRegistry,
}

/// Validate, place, register locally, then persist best-effort.
pub async fn submit_camp(deps: CampDeps<'_>, form: &CampForm) -> Result<CampCreated, CampError> {
    let role = validate_form(form)?;
    let max_capacity = parse_capacity(&form.text("maxCapacity"))?;

    let query = geocode_service::camp_query(&form.text("district"), &form.text("city"));
    let point = deps.geocoder.forward(&query).await.map_err(|e| {
        warn!("🏕️ Could not place camp at '{}': {}", query, e);
        CampError::GeocodeMiss
    })?;

    let created_by = CreatedBy {
        name: format!("{} {}", form.text("firstName"), form.text("lastName")),
        role,
        email: form.text("email"),
        phone: form.text("phone"),
    };

    let new = NewShelter {
        name: form.text("campName"),
        lat: point.lat,
        lng: point.lng,
        food_level: 100,
        water_level: 100,
        occupancy: 0,
        max_capacity,
        status: ShelterStatus::Available,
        contact: form.text("contactPhone"),
        amenities: amenities(form),
        created_by: Some(created_by.clone()),
        professional_details: Some(professional_details(form, role)),
    };

    let (shelter, snapshot) = deps.proximity.register_shelter(new).await;
    info!(
        "🏕️ Registered camp #{} '{}' at {:.4}, {:.4}",
        shelter.id, shelter.name, shelter.lat, shelter.lng
    );

    let record = CampRecord {
        request_id: Uuid::new_v4(),
        camp_name: shelter.name.clone(),
        camp_type: form.text("campType"),
        max_capacity,
        contact_phone: shelter.contact.clone(),
        camp_address: form.text("campAddress"),
        district: form.text("district"),
        city: form.text("city"),
        amenities: shelter.amenities.clone(),
        lat: shelter.lat,
        lng: shelter.lng,
        created_by,
    };

    let persisted = match deps.registry.create(&record).await {
        Ok(()) => true,
        Err(e) => {
            warn!("🏕️ {} (camp #{} kept locally)", e, shelter.id);
            false
        }
    };

    if let Err(e) = draft_service::clear_draft(deps.pool).await {
        warn!("🏕️ Could not clear camp draft: {}", e);
    }

    Ok(CampCreated {
        shelter,
        persisted,
        total_shelters: snapshot.total_shelters,
        message: "Relief camp created successfully!".to_string(),
    })
}
