//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    jwt::JwtService,
    password::PasswordService,
    repositories::{HealthProbe, SloganRepository, UserRepository},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository>,
    pub slogan_repository: Arc<dyn SloganRepository>,
    pub health_probe: Arc<dyn HealthProbe>,
    pub jwt_service: JwtService,
    pub password_service: PasswordService,
}
