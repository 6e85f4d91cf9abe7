pub mod app;
pub mod auth;
pub mod dashboard;
pub mod offices;
