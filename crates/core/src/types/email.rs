//! Account email addresses.
//!
//! Accounts are looked up by email, so `Seller@Gmail.com` and
//! `seller@gmail.com` must be the same key. [`Email`] lowercases and trims on
//! the way in and never holds anything else.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Longest address accepted (RFC 5321 path limit).
const MAX_EMAIL_LEN: usize = 254;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most 254 characters")]
    TooLong,
    #[error("email must look like name@domain")]
    Malformed,
}

/// A trimmed, lowercased `name@domain` address.
///
/// ```
/// use kala_connect_core::Email;
///
/// let email: Email = " Seller@Gmail.com ".parse().unwrap();
/// assert_eq!(email.as_str(), "seller@gmail.com");
/// assert!("seller@".parse::<Email>().is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// # Errors
    ///
    /// Returns [`EmailError`] when the trimmed input is blank, too long, or
    /// lacks text on either side of an `@`.
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let trimmed = raw.trim();
        match trimmed.split_once('@') {
            _ if trimmed.is_empty() => Err(EmailError::Empty),
            _ if trimmed.len() > MAX_EMAIL_LEN => Err(EmailError::TooLong),
            Some((name, domain)) if !name.is_empty() && !domain.is_empty() => {
                Ok(Self(trimmed.to_lowercase()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}
