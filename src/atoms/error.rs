// ── Kindred Atoms: Error Types ─────────────────────────────────────────────
// Single canonical error enum for the crate, built with `thiserror`.
//
// Design rules:
//   • Policy operations are total and never return errors. Only config
//     loading and snapshot (de)serialization produce a `PolicyError`.
//   • The `#[from]` attribute wires std/external error conversions.
//   • `PolicyError` → `String` conversion is provided via `Display` so host
//     boundaries that speak `Result<T, String>` stay boilerplate-free.
//   • No variant carries user message text.

use thiserror::Error;

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PolicyError {
    /// Reading a config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML config could not be parsed.
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON snapshot serialization / deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration parsed but is invalid (zero capacity, unknown timezone…).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catch-all. Prefer adding a specific variant over using this in new code.
    #[error("{0}")]
    Other(String),
}

impl From<String> for PolicyError {
    fn from(s: String) -> Self {
        PolicyError::Other(s)
    }
}

impl From<&str> for PolicyError {
    fn from(s: &str) -> Self {
        PolicyError::Other(s.to_string())
    }
}

// ── Convenience alias ──────────────────────────────────────────────────────

pub type PolicyResult<T> = Result<T, PolicyError>;

impl From<PolicyError> for String {
    fn from(e: PolicyError) -> Self {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_detail() {
        let e = PolicyError::Config("trajectory_window must be > 0".into());
        assert_eq!(e.to_string(), "Configuration error: trajectory_window must be > 0");
    }

    #[test]
    fn converts_into_string() {
        let s: String = PolicyError::from("boom").into();
        assert_eq!(s, "boom");
    }
}
