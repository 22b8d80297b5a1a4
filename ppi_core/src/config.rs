//! Startup defaults with validation.
//!
//! The host applies these once at plugin initialization; afterwards the
//! rate and pulse length are owned by the machine commands. Both fields
//! fit the 16-bit range the command surface accepts.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Default pulse density [pulses/inch].
pub const DEFAULT_RATE: u32 = 600;

/// Default pulse length [µs].
pub const DEFAULT_PULSE_LENGTH_US: u32 = 1500;

/// Upper bound for rate and pulse length values.
pub const VALUE_MAX: u32 = u16::MAX as u32;

/// Configuration loading/validation error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("config I/O error: {0}")]
    Io(String),

    /// TOML parse error.
    #[error("config parse error: {0}")]
    Parse(String),

    /// Parameter bounds error.
    #[error("config validation: {0}")]
    Validation(String),
}

/// Startup defaults for the pulse core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PpiDefaults {
    /// Initial pulse density [pulses/inch]. 0 leaves pulsing disabled
    /// until a rate command arrives.
    pub rate: u32,
    /// Initial pulse length [µs].
    pub pulse_length_us: u32,
}

impl Default for PpiDefaults {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            pulse_length_us: DEFAULT_PULSE_LENGTH_US,
        }
    }
}

impl PpiDefaults {
    /// Check parameter bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate > VALUE_MAX {
            return Err(ConfigError::Validation(format!(
                "rate {} exceeds maximum {}",
                self.rate, VALUE_MAX
            )));
        }
        if self.pulse_length_us > VALUE_MAX {
            return Err(ConfigError::Validation(format!(
                "pulse_length_us {} exceeds maximum {}",
                self.pulse_length_us, VALUE_MAX
            )));
        }
        Ok(())
    }
}

/// Parse defaults from a TOML string and validate them.
pub fn defaults_from_toml(toml_str: &str) -> Result<PpiDefaults, ConfigError> {
    let defaults: PpiDefaults =
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
    defaults.validate()?;
    Ok(defaults)
}

/// Load defaults from a TOML file and validate them.
pub fn load_defaults(path: &Path) -> Result<PpiDefaults, ConfigError> {
    let toml_str = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("failed to read {}: {e}", path.display())))?;
    defaults_from_toml(&toml_str)
}
