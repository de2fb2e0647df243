use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{check, required};
use crate::auth::PasswordHasher;
use crate::error::AppError;
use crate::models::{NewUser, User, UserChanges};

pub const REGISTERED: &str = "Registration completed successfully.";
pub const LOGGED_IN: &str = "Login successful.";
pub const MISSING_CREDENTIALS: &str = "Please provide both username and password.";
pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";

lazy_static! {
    // Letters, digits and @ . + - _
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[\w.@+-]+$").unwrap();
}

fn email_or_blank(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || validator::validate_email(value) {
        return Ok(());
    }
    let mut error = ValidationError::new("email");
    error.message = Some("Enter a valid email address.".into());
    Err(error)
}

/// Writable user fields. The password is write-only and arrives in plain text.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UserPayload {
    #[validate(
        length(
            min = 1,
            max = 150,
            message = "Ensure this field has between 1 and 150 characters."
        ),
        regex(
            path = "USERNAME_REGEX",
            message = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
        )
    )]
    pub username: Option<String>,
    #[validate(custom = "email_or_blank")]
    pub email: Option<String>,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub last_name: Option<String>,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Ensure this field has between 8 and 128 characters."
    ))]
    pub password: Option<String>,
}

impl UserPayload {
    /// Validates a new account and hashes its password.
    pub fn into_new_user(self, hasher: &PasswordHasher) -> Result<NewUser, AppError> {
        let mut errors = check(&self);
        let username = required(&mut errors, "username", self.username);
        let password = required(&mut errors, "password", self.password);
        match (username, password) {
            (Some(username), Some(password)) if errors.is_empty() => Ok(NewUser {
                username,
                email: self.email.unwrap_or_default(),
                first_name: self.first_name.unwrap_or_default(),
                last_name: self.last_name.unwrap_or_default(),
                password_hash: hasher.hash(&password)?,
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }

    /// Validates an update. A full update (`partial == false`) needs username
    /// and password like a new account; optional fields left out stay as they are.
    pub fn into_changes(
        self,
        hasher: &PasswordHasher,
        partial: bool,
    ) -> Result<UserChanges, AppError> {
        let mut errors = check(&self);
        if !partial {
            if self.username.is_none() {
                errors.add("username", super::REQUIRED);
            }
            if self.password.is_none() {
                errors.add("password", super::REQUIRED);
            }
        }
        errors.into_result()?;

        let password_hash = match self.password {
            Some(password) => Some(hasher.hash(&password)?),
            None => None,
        };
        Ok(UserChanges {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            password_hash,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginPayload {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginPayload {
    /// Both fields, or a 400 before any credential check happens.
    pub fn credentials(self) -> Result<(String, String), AppError> {
        match (self.username, self.password) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(AppError::BadRequest(MISSING_CREDENTIALS.into())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user: User,
    pub token: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    pub message: String,
}
