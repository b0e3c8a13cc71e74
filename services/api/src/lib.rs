//! Users and slogans HTTP API
//!
//! Registration and login issue HS256 bearer tokens; slogans are created by
//! the authenticated user and listed publicly.

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;

pub use routes::create_router;
pub use state::AppState;
