//! HTTP middleware and extractors.
//!
//! # Layer Order (outermost first)
//!
//! 1. Sentry hub and HTTP transaction
//! 2. `TraceLayer` (request span)
//! 3. Request ID
//! 4. Session (tower-sessions)
//!
//! Handlers identify the caller with the [`Visitor`], [`RequireUser`] and
//! [`RequireSeller`] extractors.

pub mod request_id;
pub mod session;
pub mod visitor;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
pub use visitor::{RequireSeller, RequireUser, Visitor};
