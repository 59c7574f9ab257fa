//! Visitor and account extractors.
//!
//! Every browser is identified by a [`VisitorId`] kept in its session. The
//! first request that asks for it creates one, which also makes the session
//! layer set the cookie.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;
use tracing::debug;

use kala_connect_core::{AuthUser, SellerId};

use crate::error::AppError;
use crate::fixtures::DASHBOARD_SELLER_ID;
use crate::models::VisitorId;
use crate::models::session::keys;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// The calling visitor, created on first use.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Visitor(visitor): Visitor) -> String {
///     visitor.to_string()
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Visitor(pub VisitorId);

impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        if let Some(visitor) = session.get::<VisitorId>(keys::VISITOR_ID).await? {
            return Ok(Self(visitor));
        }

        let visitor = VisitorId::generate();
        session.insert(keys::VISITOR_ID, visitor).await?;
        debug!(visitor = %visitor, "New visitor");
        Ok(Self(visitor))
    }
}

/// A signed-in account. Rejects with 401 otherwise.
pub struct RequireUser {
    pub visitor: VisitorId,
    pub user: AuthUser,
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Visitor(visitor) = Visitor::from_request_parts(parts, state).await?;
        let user = state
            .auth()
            .current(visitor)
            .await?
            .ok_or(AuthError::NotAuthenticated)?;
        Ok(Self { visitor, user })
    }
}

/// A signed-in seller account. Rejects with 401 or 403.
///
/// Seller dashboards manage the demo storefront's own catalog, so every
/// seller account acts as [`DASHBOARD_SELLER_ID`].
pub struct RequireSeller {
    pub user: AuthUser,
    pub seller_id: SellerId,
}

impl FromRequestParts<AppState> for RequireSeller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let RequireUser { user, .. } = RequireUser::from_request_parts(parts, state).await?;
        if !user.is_seller() {
            return Err(AppError::Forbidden("A seller account is required.".to_string()));
        }
        Ok(Self {
            user,
            seller_id: SellerId::new(DASHBOARD_SELLER_ID),
        })
    }
}
