pub mod camp;
pub mod form_drafts;
pub mod location;
pub mod shelter;

pub use camp::{CampForm, CampRecord};
pub use form_drafts::FormDraftRow;
pub use location::{NearbySet, NearbyShelter, NearbySnapshot, UserLocation};
pub use shelter::{
    seed_shelters, CreatedBy, NewShelter, ProfessionalDetails, RegistrantRole, Shelter,
    ShelterStatus,
};
