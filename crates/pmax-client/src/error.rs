use common::{ErrorEnvelope, ErrorKind, JobStatus};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Everything a client call can fail with.
///
/// Failures the array reports come back as [`ClientError::Api`] carrying the
/// typed [`ErrorKind`], so callers match on the kind instead of message text.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The array is not in the configured allow-list. No request was sent.
    #[error("array {0} is not in the list of allowed arrays")]
    ArrayNotAllowed(String),

    #[error("{message} (status {status})")]
    Api {
        kind: ErrorKind,
        status: u16,
        message: String,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("job {job_id} still {status} after {attempts} polls")]
    JobTimedOut {
        job_id: String,
        status: JobStatus,
        attempts: u32,
    },

    #[error("job failed: {0}")]
    JobFailed(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Build an API error from a non-2xx status and its raw body.
    ///
    /// Unisphere normally answers with an [`ErrorEnvelope`]; anything else is
    /// kept as the message so nothing the server said is lost.
    pub(crate) fn from_response(status: u16, body: &[u8]) -> Self {
        let message = match serde_json::from_slice::<ErrorEnvelope>(body) {
            Ok(envelope) => envelope.message,
            Err(_) if body.is_empty() => format!("request failed with status {status}"),
            Err(_) => String::from_utf8_lossy(body).into_owned(),
        };
        ClientError::Api {
            kind: ErrorKind::from_status(status),
            status,
            message,
        }
    }

    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout {
                url: url.to_string(),
            }
        } else {
            ClientError::Transport(err)
        }
    }

    /// Kind of the array-side failure, if this is one.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ClientError::Api { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(ErrorKind::NotFound)
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == Some(ErrorKind::Conflict)
    }

    /// The array's message for API errors.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_message_is_kept() {
        let body = serde_json::to_vec(&ErrorEnvelope::new(409, "Storage group sg1 already exists"))
            .unwrap();
        let err = ClientError::from_response(409, &body);
        assert!(err.is_conflict());
        assert_eq!(err.api_message(), Some("Storage group sg1 already exists"));
        assert_eq!(err.to_string(), "Storage group sg1 already exists (status 409)");
    }

    #[test]
    fn non_envelope_bodies_become_the_message() {
        let err = ClientError::from_response(502, b"upstream went away");
        assert_eq!(err.kind(), Some(ErrorKind::Server));
        assert_eq!(err.api_message(), Some("upstream went away"));

        let err = ClientError::from_response(404, b"");
        assert!(err.is_not_found());
        assert_eq!(err.api_message(), Some("request failed with status 404"));
    }

    #[test]
    fn local_errors_have_no_kind() {
        assert_eq!(ClientError::ArrayNotAllowed("000197900099".into()).kind(), None);
        assert!(!ClientError::InvalidArgument("x".into()).is_not_found());
    }
}
