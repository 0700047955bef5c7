//! Pet roast relay
//!
//! Relays video generation requests from client apps to the external AI
//! generation service, caches job state, and applies the service's
//! completion webhooks.

pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
