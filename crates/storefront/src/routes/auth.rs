//! Sign-up, sign-in and sign-out.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use kala_connect_core::{AuthUser, UserRole};

use crate::error::{ApiJson, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::Visitor;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to a buyer account.
    #[serde(default)]
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/signup
///
/// Creates the account without signing in.
#[instrument(skip_all, fields(email = %body.email))]
pub async fn signup(State(state): State<AppState>, ApiJson(body): ApiJson<SignupRequest>) -> Result<(StatusCode, Json<AuthUser>)> {
    let role = body.role.unwrap_or(UserRole::Buyer);
    let user = state
        .auth()
        .signup(&body.name, &body.email, &body.password, role)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/auth/login
#[instrument(skip_all, fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Visitor(visitor): Visitor,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AuthUser>> {
    let user = state.auth().login(visitor, &body.email, &body.password).await?;

    // New session id on privilege change; the visitor id carries over.
    session.cycle_id().await?;
    set_sentry_user(user.email.as_str());
    info!(role = %user.role, "Signed in");
    Ok(Json(user))
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>, Visitor(visitor): Visitor) -> Result<StatusCode> {
    state.auth().logout(visitor).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}
