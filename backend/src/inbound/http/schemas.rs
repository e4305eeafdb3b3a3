//! OpenAPI schema for the error payload.
//!
//! [`crate::domain::Error`] keeps its fields private, so the documented shape
//! is declared here and registered under the domain type's name.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// No session, or the credentials were wrong.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "forbidden")]
    Forbidden,
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with the current relationship state.
    #[schema(rename = "conflict")]
    Conflict,
    /// A dependency such as the database is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    #[schema(example = "status is not recognised")]
    message: String,
    /// Correlation id, also sent in the `trace-id` header.
    #[schema(rename = "traceId", example = "0f6c1c1e-6a55-4a51-9a47-4d8b8f1d2a10")]
    trace_id: Option<String>,
    /// `{field, code, value?}` for validation failures.
    details: Option<serde_json::Value>,
}
