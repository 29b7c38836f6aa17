use thiserror::Error;

/// Maximum length for error messages carried in a `NetworkError`
const MAX_ERROR_MESSAGE_LENGTH: usize = 300;

/// A failed network fetch. Any variant means "the network is unreachable"
/// as far as the cache fallback is concerned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request failed: {0}")]
    Other(String),
}

impl NetworkError {
    /// Truncate a message to avoid logging excessive data
    fn truncate(message: String) -> String {
        if message.len() <= MAX_ERROR_MESSAGE_LENGTH {
            return message;
        }
        let mut end = MAX_ERROR_MESSAGE_LENGTH;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated)", &message[..end])
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        let message = Self::truncate(err.to_string());
        if err.is_timeout() {
            NetworkError::Timeout(message)
        } else if err.is_connect() {
            NetworkError::Connect(message)
        } else {
            NetworkError::Other(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_message_untouched() {
        assert_eq!(NetworkError::truncate("dns failure".into()), "dns failure");
    }

    #[test]
    fn test_truncate_long_message() {
        let long = "x".repeat(1000);
        let truncated = NetworkError::truncate(long);
        assert!(truncated.ends_with("... (truncated)"));
        assert!(truncated.len() < 400);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let long = "é".repeat(400);
        let truncated = NetworkError::truncate(long);
        assert!(truncated.ends_with("... (truncated)"));
    }
}
