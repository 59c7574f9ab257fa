//! Authentication error types.

use thiserror::Error;

use kala_connect_core::{InvalidTransition, OrderId, OrderStatus};

use crate::storage::StorageError;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] kala_connect_core::EmailError),

    /// Wrong password or unknown account. Deliberately the same message for both.
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// An account already exists for the email.
    #[error("An account with this email already exists.")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// A required profile field is missing.
    #[error("{0}")]
    Validation(String),

    /// No account is signed in for this visitor.
    #[error("not signed in")]
    NotAuthenticated,

    /// The account has no order with this id.
    #[error("Order not found")]
    OrderNotFound(OrderId),

    /// The caller's role may not move an order to this status.
    #[error("You cannot mark this order {0}.")]
    StatusNotPermitted(OrderStatus),

    /// The requested order status change is not allowed.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// The user snapshot could not be written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
