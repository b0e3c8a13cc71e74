//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult, StoreError},
    middleware::{AuthUser, auth_middleware},
    models::{
        CreateSloganRequest, LoginRequest, LoginResponse, NewUser, RegisterRequest,
        RegisterResponse, UserSlogansResponse,
        user::{EMAIL_MAX_LEN, PET_FIELD_MAX_LEN, USERNAME_MAX_LEN},
    },
    state::AppState,
    validation::{JsonBody, max_length, required},
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    Router::new()
        .route("/health", get(health_check))
        .route("/health/db", get(database_health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/users", get(list_users))
        .route("/users/me", get(get_current_user).route_layer(auth.clone()))
        .route("/users/:username", get(get_user_by_username))
        .route("/users/:username/slogans", get(get_user_slogans))
        .route(
            "/slogans",
            get(list_slogans).merge(post(create_slogan).route_layer(auth)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

/// Health check that also probes the database
pub async fn database_health(State(state): State<AppState>) -> Response {
    match state.health_probe.ping().await {
        Ok(()) => Json(json!({ "status": "healthy", "database": "ok" })).into_response(),
        Err(e) => {
            error!("Database health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "unhealthy", "error": "Database unavailable" })),
            )
                .into_response()
        }
    }
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let username = required(payload.username, "username")?;
    let email = required(payload.email, "email")?;
    let password = required(payload.password, "password")?;

    max_length(&username, "username", USERNAME_MAX_LEN)?;
    max_length(&email, "email", EMAIL_MAX_LEN)?;
    for (field, value) in [("pet_name", &payload.pet_name), ("pet_species", &payload.pet_species)] {
        if let Some(value) = value {
            max_length(value, field, PET_FIELD_MAX_LEN)?;
        }
    }

    info!("Registration attempt for user: {}", username);

    let password_hash = state.password_service.hash(&password).map_err(|e| {
        error!("Error during registration: {}", e);
        ApiError::Internal("Registration failed")
    })?;

    let new_user = NewUser {
        username,
        email,
        password_hash,
        pet_name: payload.pet_name,
        pet_species: payload.pet_species,
    };

    let user = state
        .user_repository
        .create_user(&new_user)
        .await
        .map_err(|e| match e {
            StoreError::DuplicateKey(constraint) => {
                info!("Registration rejected, {} already in use", constraint);
                ApiError::DuplicateKey
            }
            e => {
                error!("Error during registration, transaction rolled back: {}", e);
                ApiError::Internal("Registration failed")
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            user,
        }),
    ))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(username), Some(password)) = (payload.username, payload.password) else {
        return Err(ApiError::Validation(
            "Username and password are required".to_string(),
        ));
    };

    info!("Login attempt for user: {}", username);

    let user = state
        .user_repository
        .find_user_by_username(&username)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::Internal("Login failed")
        })?;

    let user = match user {
        Some(user) if state.password_service.verify(&password, &user.password_hash) => user,
        Some(_) => return Err(ApiError::InvalidCredentials),
        None => {
            state.password_service.verify_dummy(&password);
            return Err(ApiError::InvalidCredentials);
        }
    };

    let token = state.jwt_service.issue(user.id).map_err(|e| {
        error!("Failed to generate access token: {}", e);
        ApiError::Internal("Login failed")
    })?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in: state.jwt_service.access_token_expiry(),
        user,
    }))
}

/// Get the authenticated user
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_user_by_id(auth.id)
        .await
        .map_err(|e| {
            error!("Failed to get user: {}", e);
            ApiError::Internal("Failed to get user")
        })?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(user))
}

/// Get all users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users = state.user_repository.list_all_users().await.map_err(|e| {
        error!("Failed to get users: {}", e);
        ApiError::Internal("Failed to get users")
    })?;

    Ok(Json(users))
}

/// Get a user by username
pub async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_user_by_username(&username)
        .await
        .map_err(|e| {
            error!("Failed to get user: {}", e);
            ApiError::Internal("Failed to get user")
        })?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(user))
}

/// Get a user together with their slogans
pub async fn get_user_slogans(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_user_by_username(&username)
        .await
        .map_err(|e| {
            error!("Failed to get user: {}", e);
            ApiError::Internal("Failed to get slogans")
        })?
        .ok_or(ApiError::NotFound("User not found"))?;

    let slogans = state
        .slogan_repository
        .list_slogans_by_user(user.id)
        .await
        .map_err(|e| {
            error!("Failed to get slogans for {}: {}", user.username, e);
            ApiError::Internal("Failed to get slogans")
        })?;

    Ok(Json(UserSlogansResponse { user, slogans }))
}

/// Create a slogan owned by the authenticated user
pub async fn create_slogan(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(payload): JsonBody<CreateSloganRequest>,
) -> ApiResult<impl IntoResponse> {
    let text = payload
        .slogan
        .ok_or_else(|| ApiError::Validation("Slogan text is required".to_string()))?;

    let slogan = state
        .slogan_repository
        .create_slogan(auth.id, &text)
        .await
        .map_err(|e| {
            error!("Error creating slogan, transaction rolled back: {}", e);
            ApiError::Internal("Failed to create slogan")
        })?;

    Ok((StatusCode::CREATED, Json(slogan)))
}

/// Get all slogans
pub async fn list_slogans(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let slogans = state
        .slogan_repository
        .list_all_slogans()
        .await
        .map_err(|e| {
            error!("Failed to get slogans: {}", e);
            ApiError::Internal("Failed to get slogans")
        })?;

    Ok(Json(slogans))
}
