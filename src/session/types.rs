//! Request and response types for the auth endpoints. Credentials carry the
//! password, so they must never be logged or serialized outside the sign-in body.

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::SessionError;

/// Identity returned by `/profile` and kept in the persisted mirror.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UserRecord {
    /// Minimal identity used when the profile cannot be fetched after sign-in.
    #[must_use]
    pub fn from_email(email: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            name: None,
        }
    }
}

/// Sign-in form input, validated the way the sign-in form validates it.
#[derive(Clone, Debug)]
pub struct Credentials {
    email: String,
    password: SecretString,
}

impl Credentials {
    /// # Errors
    /// Returns [`SessionError::InvalidCredentials`] if the email is missing or
    /// malformed, or the password is empty.
    pub fn new(email: &str, password: SecretString) -> Result<Self, SessionError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(SessionError::InvalidCredentials(
                "Email is required.".to_string(),
            ));
        }
        if !valid_email(email) {
            return Err(SessionError::InvalidCredentials(
                "Email is not a valid address.".to_string(),
            ));
        }
        if password.expose_secret().is_empty() {
            return Err(SessionError::InvalidCredentials(
                "Password is required.".to_string(),
            ));
        }

        Ok(Self {
            email: email.to_string(),
            password,
        })
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    pub(crate) fn sign_in_request(&self) -> SignInRequest<'_> {
        SignInRequest {
            email: &self.email,
            password: self.password.expose_secret(),
        }
    }
}

/// Basic email format check.
fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

#[derive(Serialize)]
pub struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}
