//! Sign-up / sign-in form types and their validation.
//!
//! Handlers call `validate()` first and return `AppError::InvalidForm` on failure,
//! so a malformed form never reaches the auth backend.

pub mod validators;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use validators::{validate_email, validate_name, validate_password, validate_phone};

/// Field name → user-facing message for every field that failed validation.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.0.entry(field.to_string()).or_insert(message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.check("full_name", validate_name(&self.full_name));
        errors.check("email", validate_email(&self.email));
        errors.check("mobile", validate_phone(&self.mobile));
        errors.check("password", validate_password(&self.password));
        if self.password != self.confirm_password {
            errors.check(
                "confirm_password",
                Err("Passwords do not match".to_string()),
            );
        }
        errors.into_result()
    }
}

/// How the user identifies themselves at sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Credential {
    Email(String),
    Phone(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInForm {
    /// Either an email address or a 10-digit mobile number.
    pub identifier: String,
    pub password: String,
}

impl SignInForm {
    /// Validates the form and resolves the identifier into a `Credential`.
    /// Anything without an `@` is treated as a mobile number.
    pub fn validate(&self) -> Result<Credential, FieldErrors> {
        let identifier = self.identifier.trim();
        let mut errors = FieldErrors::default();

        let credential = if identifier.contains('@') {
            errors.check("identifier", validate_email(identifier));
            Credential::Email(identifier.to_lowercase())
        } else {
            errors.check("identifier", validate_phone(identifier));
            Credential::Phone(identifier.to_string())
        };

        if self.password.is_empty() {
            errors.check("password", Err("Password is required".to_string()));
        }

        errors.into_result().map(|_| credential)
    }
}
