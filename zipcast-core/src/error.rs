use serde::Deserialize;
use thiserror::Error;

/// Shown when the upstream gave no usable message.
pub const GENERIC_FETCH_MESSAGE: &str = "Failed to fetch weather data";

/// The one failure kind of a fetch cycle: network down, unknown postal code,
/// bad key, rate limit and malformed body all end up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct WeatherError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    message: Option<String>,
}

impl WeatherError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn generic() -> Self {
        Self::new(GENERIC_FETCH_MESSAGE)
    }

    /// Build from an error response body, using its `message` field when present.
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str::<UpstreamError>(body)
            .ok()
            .and_then(|e| e.message)
            .filter(|m| !m.trim().is_empty())
            .map(Self::new)
            .unwrap_or_else(Self::generic)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_upstream_message() {
        let err = WeatherError::from_body(r#"{"cod":"404","message":"city not found"}"#);
        assert_eq!(err.message(), "city not found");
        assert_eq!(err.to_string(), "city not found");
    }

    #[test]
    fn falls_back_to_generic_message() {
        for body in ["", "<html>502 Bad Gateway</html>", r#"{"cod":500}"#, r#"{"message":""}"#] {
            assert_eq!(WeatherError::from_body(body).message(), GENERIC_FETCH_MESSAGE);
        }
    }
}
