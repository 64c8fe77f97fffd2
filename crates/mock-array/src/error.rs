use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::ErrorEnvelope;
use thiserror::Error;

pub const INVALID_RA_GROUP: &str = "specified RA group is not valid";
pub const ALREADY_IN_DESIRED_STATE: &str = "devices already in desired state";

/// Failures a mock handler reports back to the caller.
///
/// Conflicts are always 409 regardless of the resource involved, and induced
/// faults carry whatever status the fault registry assigned them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MockError {
    /// Missing or malformed input.
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate creation or an operation blocked by dependents.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Fault injected through the registry.
    #[error("{message}")]
    Induced { status: u16, message: String },

    #[error("{0}")]
    Internal(String),
}

impl MockError {
    pub fn invalid(message: impl Into<String>) -> Self {
        MockError::InvalidInput(message.into())
    }

    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        MockError::NotFound(format!("{kind} {id} not found"))
    }

    pub fn already_exists(kind: &str, id: impl std::fmt::Display) -> Self {
        MockError::Conflict(format!("{kind} {id} already exists"))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        MockError::Conflict(message.into())
    }

    /// Unknown RDF group number or action on an SRDF call.
    pub fn invalid_ra_group() -> Self {
        MockError::NotFound(INVALID_RA_GROUP.to_string())
    }

    /// Link or unlink that would not change anything.
    pub fn already_in_desired_state() -> Self {
        MockError::Conflict(ALREADY_IN_DESIRED_STATE.to_string())
    }

    pub fn status(&self) -> u16 {
        match self {
            MockError::InvalidInput(_) => 400,
            MockError::NotFound(_) => 404,
            MockError::Conflict(_) => 409,
            MockError::Unauthorized(_) => 401,
            MockError::Induced { status, .. } => *status,
            MockError::Internal(_) => 500,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope::new(self.status(), self.to_string())
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.envelope())).into_response()
    }
}

pub type MockResult<T> = std::result::Result<T, MockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(MockError::invalid("bad").status(), 400);
        assert_eq!(MockError::not_found("Volume", "00001").status(), 404);
        assert_eq!(MockError::already_exists("Host", "h1").status(), 409);
        assert_eq!(
            MockError::Induced {
                status: 408,
                message: "slow".into()
            }
            .status(),
            408
        );
    }

    #[test]
    fn envelope_mirrors_status() {
        let env = MockError::not_found("Storage Group", "sg1").envelope();
        assert_eq!(env.message, "Storage Group sg1 not found");
        assert_eq!(env.http_status_code, 404);
        assert_eq!(env.error_code, 404);
    }
}
