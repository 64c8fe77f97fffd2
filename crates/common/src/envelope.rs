use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message the array returns while its role cache is still warming up.
/// The client retries a job lookup once when it sees this.
pub const ROLE_LOOKUP_FAILURE: &str = "Cannot find role for user";

/// Error body written by Unisphere on every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message} (status {http_status_code})")]
pub struct ErrorEnvelope {
    pub message: String,
    #[serde(rename = "httpStatusCode")]
    pub http_status_code: u16,
    #[serde(rename = "errorCode")]
    pub error_code: u16,
}

impl ErrorEnvelope {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            http_status_code: status,
            error_code: status,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_status(self.http_status_code)
    }
}

/// Typed discriminant for REST failures, shared by client and mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Server,
    Other,
}

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::BadRequest,
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Other,
        }
    }

    /// Canonical status for this kind. `Other` maps to 500.
    pub fn status(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Server | ErrorKind::Other => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_uses_unisphere_field_names() {
        let env = ErrorEnvelope::new(404, "Volume 00001 not found");
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["message"], "Volume 00001 not found");
        assert_eq!(json["httpStatusCode"], 404);
        assert_eq!(json["errorCode"], 404);
        assert_eq!(env.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn status_mapping() {
        assert_eq!(ErrorKind::from_status(409), ErrorKind::Conflict);
        assert_eq!(ErrorKind::from_status(503), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(418), ErrorKind::Other);
        assert_eq!(ErrorKind::Conflict.status(), 409);
    }
}
