//! Remote generation errors.

use thiserror::Error;

/// Failure of one generation attempt, or of every attempt.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{model}: network error: {message}")]
    Network { model: String, message: String },

    #[error("{model}: API error {status}: {message}")]
    Api {
        model: String,
        status: u16,
        message: String,
    },

    #[error("{model}: unexpected response structure: {reason}")]
    MalformedResponse { model: String, reason: String },

    #[error("No working model found ({} attempts): {}", .failures.len(), join_failures(.failures))]
    AllCandidatesExhausted { failures: Vec<GenerationError> },
}

impl GenerationError {
    /// Model the failure belongs to, `None` for the aggregate.
    pub fn model(&self) -> Option<&str> {
        match self {
            GenerationError::Network { model, .. }
            | GenerationError::Api { model, .. }
            | GenerationError::MalformedResponse { model, .. } => Some(model),
            GenerationError::AllCandidatesExhausted { .. } => None,
        }
    }
}

fn join_failures(failures: &[GenerationError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = GenerationError::Api {
            model: "gemini-pro".to_string(),
            status: 404,
            message: "model not found".to_string(),
        };
        assert_eq!(err.to_string(), "gemini-pro: API error 404: model not found");
        assert_eq!(err.model(), Some("gemini-pro"));
    }

    #[test]
    fn test_exhausted_aggregates_failures() {
        let err = GenerationError::AllCandidatesExhausted {
            failures: vec![
                GenerationError::Network {
                    model: "a".to_string(),
                    message: "refused".to_string(),
                },
                GenerationError::MalformedResponse {
                    model: "b".to_string(),
                    reason: "no candidates".to_string(),
                },
            ],
        };
        let display = err.to_string();
        assert!(display.contains("2 attempts"));
        assert!(display.contains("a: network error: refused"));
        assert!(display.contains("b: unexpected response structure: no candidates"));
        assert_eq!(err.model(), None);
    }
}
