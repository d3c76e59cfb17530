pub mod app;
pub mod config;
pub mod db;
pub mod errors;
pub mod extract;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;
