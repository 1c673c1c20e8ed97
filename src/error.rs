// Error types returned by the ONTAP client. The binary glue in `main.rs`
// uses `anyhow`; the library surface keeps a typed error so callers (and
// tests) can tell transport problems apart from API refusals.

use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;

/// Body of the `error` object ONTAP returns with a non-2xx status.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct OntapError {
    pub message: String,
    pub code: String,
    pub target: Option<String>,
}

impl fmt::Display for OntapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.message.is_empty(), &self.target) {
            (true, _) => write!(f, "code={}", self.code),
            (false, Some(target)) => {
                write!(f, "{} (code={}, target={})", self.message, self.code, target)
            }
            (false, None) => write!(f, "{} (code={})", self.message, self.code),
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: OntapError,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid cluster address: {0}")]
    InvalidCluster(String),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("API request failed with status {status}: {error}")]
    Api { status: StatusCode, error: OntapError },
    #[error("job {uuid} failed: {message}")]
    JobFailed { uuid: String, message: String },
    #[error("job {0} did not finish in time")]
    JobTimeout(String),
}

impl ApiError {
    /// Builds an `Api` error from a response status and its raw body.
    /// Bodies that are not an ONTAP error envelope are kept as the message.
    pub(crate) fn from_body(status: StatusCode, body: &str) -> Self {
        let error = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => envelope.error,
            Err(_) => OntapError {
                message: body.trim().to_string(),
                code: status.as_u16().to_string(),
                target: None,
            },
        };
        ApiError::Api { status, error }
    }

    /// HTTP status of an API refusal, if this error is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Http(err) => err.status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_ontap_error_envelope() {
        let body = r#"{"error":{"message":"duplicate entry","code":"917927","target":"name"}}"#;
        let err = ApiError::from_body(StatusCode::CONFLICT, body);
        match &err {
            ApiError::Api { status, error } => {
                assert_eq!(*status, StatusCode::CONFLICT);
                assert_eq!(error.message, "duplicate entry");
                assert_eq!(error.code, "917927");
                assert_eq!(error.target.as_deref(), Some("name"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "API request failed with status 409 Conflict: duplicate entry (code=917927, target=name)"
        );
    }

    #[test]
    fn keeps_plain_body_as_message() {
        let err = ApiError::from_body(StatusCode::BAD_GATEWAY, "  upstream down\n");
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert!(err.to_string().contains("upstream down (code=502)"));
    }

    #[test]
    fn wrapped_errors_print_once_in_chain() {
        let err = ApiError::from(url::Url::parse("https://10.0.0.1:99999").unwrap_err());
        let chain = format!("{:#}", anyhow::Error::new(err));
        assert_eq!(chain, "invalid port number");
    }

    #[test]
    fn empty_message_shows_code_only() {
        let error = OntapError {
            message: String::new(),
            code: "4".into(),
            target: None,
        };
        assert_eq!(error.to_string(), "code=4");
    }
}
