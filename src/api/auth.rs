use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::info;

use crate::db::{AuthResponse, LoginRequest, RegisterRequest, User, UserResponse};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::extract::Payload;
use super::validation::{clean_string, normalize_email, password_present, validate_email};

/// Same answer for unknown email and wrong password
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Register a new user
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Payload(request): Payload<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let name = clean_string(request.name.as_deref());
    let email = normalize_email(request.email.as_deref());
    let phone = Some(clean_string(request.phone.as_deref())).filter(|p| !p.is_empty());

    let mut errors = ValidationErrorBuilder::new();
    if name.is_empty() {
        errors.add("name", "Name is required");
    }
    if email.is_empty() {
        errors.add("email", "Email is required");
    }
    if !password_present(request.password.as_deref()) {
        errors.add("password", "Password is required");
    }
    errors.finish_with_message("Name, email and password are required")?;

    if let Err(e) = validate_email(&email) {
        return Err(ApiError::validation_field("email", e));
    }

    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    // Password is hashed exactly as sent, surrounding whitespace included
    let password = request.password.unwrap_or_default();
    let password_hash = state.hasher.hash(password).await?;

    sqlx::query("INSERT INTO users (name, email, password, phone) VALUES (?, ?, ?, ?)")
        .bind(&name)
        .bind(&email)
        .bind(&password_hash)
        .bind(&phone)
        .execute(&state.db)
        .await?;

    let user: UserResponse = sqlx::query_as(
        "SELECT id, name, email, phone, created_at FROM users WHERE email = ? LIMIT 1",
    )
    .bind(&email)
    .fetch_one(&state.db)
    .await?;

    info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

/// Check credentials and return the user
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Payload(request): Payload<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = normalize_email(request.email.as_deref());
    if email.is_empty() || !password_present(request.password.as_deref()) {
        return Err(ApiError::bad_request("Email and password are required"));
    }
    let password = request.password.unwrap_or_default();

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ? LIMIT 1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    let user = user.ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    if !state.hasher.verify(password, user.password.clone()).await {
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: UserResponse::from(user),
    }))
}
