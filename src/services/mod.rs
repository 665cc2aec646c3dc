pub mod area_service;
pub mod camp_registry_service;
pub mod camp_service;
pub mod dashboard_service;
pub mod draft_service;
pub mod geocode_service;
pub mod location_service;
pub mod news_service;
pub mod proximity_service;
pub mod shelter_view_service;
pub mod tracker_service;
pub mod upstream;
pub mod weather_service;
