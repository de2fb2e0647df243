//! Inbound payload validation.
//!
//! Each payload type deserializes with every field optional, so a missing
//! field is reported as a field error instead of a generic parse failure.
//! `into_*` methods run the `validator` rules, add the required-field checks
//! for the operation at hand, and hand back typed values for the store.
//! Outbound representation is the models' `Serialize` impls.

pub mod comment;
pub mod post;
pub mod user;

use validator::Validate;

use crate::error::FieldErrors;

pub use comment::CommentPayload;
pub use post::PostPayload;
pub use user::{LoginPayload, LoginResponse, RegisterResponse, UserPayload};

pub const REQUIRED: &str = "This field is required.";

/// Runs the payload's `validator` rules.
fn check<T: Validate>(payload: &T) -> FieldErrors {
    match payload.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors.into(),
    }
}

/// Passes `value` through, recording a required-field error when it is absent.
fn required<T>(errors: &mut FieldErrors, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        errors.add(field, REQUIRED);
    }
    value
}
