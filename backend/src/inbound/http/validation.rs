//! Request parsing helpers shared by handlers.
//!
//! Each failure becomes `400 invalid_request` with
//! `details: {field, code, value?}` so clients can highlight the field.

use serde_json::json;

use crate::domain::{
    CredentialsValidationError, Error, ImageValidationError, TitleId, TitleIdError, UserId,
};

pub(crate) fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

pub(crate) fn missing_field_error(field: &str) -> Error {
    field_error(field, "missing_field", format!("missing required field: {field}"))
}

/// Parse a path or body user id.
pub(crate) fn parse_user_id(raw: &str, field: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|_| {
        Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
            "field": field,
            "code": "invalid_uuid",
            "value": raw,
        }))
    })
}

/// Parse a catalog title id.
pub(crate) fn parse_title_id(raw: &str, field: &str) -> Result<TitleId, Error> {
    TitleId::new(raw).map_err(|error: TitleIdError| {
        Error::invalid_request(error.to_string()).with_details(json!({
            "field": field,
            "code": "invalid_title_id",
            "value": raw,
        }))
    })
}

pub(crate) fn map_credentials_error(error: CredentialsValidationError) -> Error {
    let (field, code) = match error {
        CredentialsValidationError::InvalidEmail => ("email", "invalid_email"),
        CredentialsValidationError::EmptyPassword => ("password", "missing_field"),
        CredentialsValidationError::WeakPassword { .. } => ("password", "weak_password"),
    };
    field_error(field, code, error.to_string())
}

/// Map an image check failure onto the form field that carried the image.
pub(crate) fn map_image_error(field: &str, error: ImageValidationError) -> Error {
    let mut details = json!({ "field": field, "code": error.code() });
    if let ImageValidationError::UnsupportedType(raw) = &error {
        details["value"] = json!(raw);
    }
    Error::invalid_request(error.to_string()).with_details(details)
}
