use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::shelter::{CreatedBy, RegistrantRole};

/// Camp registration form as submitted by the browser. Field names match the
/// form inputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampForm {
    pub user_type: Option<RegistrantRole>,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,

    pub camp_name: Option<String>,
    pub camp_type: Option<String>,
    pub max_capacity: Option<String>,
    pub contact_phone: Option<String>,
    pub camp_address: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,

    // army
    pub rank: Option<String>,
    pub regiment: Option<String>,
    pub army_id: Option<String>,
    pub deployment: Option<String>,
    // government
    pub department: Option<String>,
    pub designation: Option<String>,
    pub employee_id: Option<String>,
    pub office_address: Option<String>,
    // ngo
    pub ngo_name: Option<String>,
    pub ngo_registration: Option<String>,
    pub position: Option<String>,
    pub ngo_address: Option<String>,
}

impl CampForm {
    /// Looks a field up by its form name.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "firstName" => &self.first_name,
            "lastName" => &self.last_name,
            "email" => &self.email,
            "phone" => &self.phone,
            "campName" => &self.camp_name,
            "campType" => &self.camp_type,
            "maxCapacity" => &self.max_capacity,
            "contactPhone" => &self.contact_phone,
            "campAddress" => &self.camp_address,
            "district" => &self.district,
            "city" => &self.city,
            "rank" => &self.rank,
            "regiment" => &self.regiment,
            "armyId" => &self.army_id,
            "deployment" => &self.deployment,
            "department" => &self.department,
            "designation" => &self.designation,
            "employeeId" => &self.employee_id,
            "officeAddress" => &self.office_address,
            "ngoName" => &self.ngo_name,
            "ngoRegistration" => &self.ngo_registration,
            "position" => &self.position,
            "ngoAddress" => &self.ngo_address,
            _ => return None,
        };
        value.as_deref()
    }

    /// Trimmed, possibly empty.
    pub fn text(&self, name: &str) -> String {
        self.field(name).map(|v| v.trim().to_string()).unwrap_or_default()
    }
}

/// Payload sent to the remote camp store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampRecord {
    pub request_id: Uuid,
    pub camp_name: String,
    pub camp_type: String,
    pub max_capacity: u32,
    pub contact_phone: String,
    pub camp_address: String,
    pub district: String,
    pub city: String,
    pub amenities: Vec<String>,
    pub lat: f64,
    pub lng: f64,
    pub created_by: CreatedBy,
}
