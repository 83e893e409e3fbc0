pub mod api;
pub mod auth;
pub mod config;
pub mod domain_events;
pub mod error;
pub mod extract;
pub mod models;
mod main_lib;

pub use main_lib::{build_state, build_state_with_gateway, init_tracing, AppState};
