// Kindred Engine: Policy configuration loading
//
// `PolicyConfig` lives in atoms (pure data with defaults). This module adds
// the I/O and validation: TOML parsing, range checks, and timezone parsing.

use crate::atoms::error::{PolicyError, PolicyResult};
use crate::atoms::policy_types::PolicyConfig;
use chrono_tz::Tz;
use log::{info, warn};
use std::path::Path;

impl PolicyConfig {
    /// Parse TOML. Omitted keys keep their defaults. The result is validated.
    pub fn from_toml_str(raw: &str) -> PolicyResult<Self> {
        let config: PolicyConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> PolicyResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        info!(
            "[policy-config] Loaded {} (window={}, max_daily={}, tz={})",
            path.display(),
            config.trajectory_window,
            config.max_daily_proactive,
            config.timezone
        );
        Ok(config)
    }

    /// Reject values that would silently disable a safety rule or panic later.
    pub fn validate(&self) -> PolicyResult<()> {
        let fail = |msg: String| {
            warn!("[policy-config] Invalid config: {}", msg);
            Err(PolicyError::Config(msg))
        };

        if self.trajectory_window == 0 {
            return fail("trajectory_window must be at least 1".into());
        }
        if self.max_daily_proactive == 0 {
            return fail("max_daily_proactive must be at least 1".into());
        }
        if self.min_inactivity_hours < 0 {
            return fail(format!(
                "min_inactivity_hours must not be negative (got {})",
                self.min_inactivity_hours
            ));
        }
        if self.session_gap_minutes <= 0 {
            return fail(format!(
                "session_gap_minutes must be positive (got {})",
                self.session_gap_minutes
            ));
        }
        if let Err(e) = self.tz() {
            return fail(e.to_string());
        }
        Ok(())
    }

    /// The configured IANA timezone.
    pub fn tz(&self) -> PolicyResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| PolicyError::Config(format!("unknown timezone '{}': {}", self.timezone, e)))
    }
}
