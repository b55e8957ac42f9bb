pub mod app_settings;
pub mod routes;
pub mod startup;
pub mod telemetry;
