use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a loopback configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A field holds a value the fabric cannot run with.
	#[error("invalid value for '{field}': {reason}")]
	InvalidValue {
		/// The offending field.
		field: &'static str,
		/// Why the value was rejected.
		reason: &'static str,
	},
}

/// Tunables for the in-process loopback fabric.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopbackConfig {
	/// Sends up to this many bytes complete inline without a tracking record.
	pub eager_threshold: usize,
	/// Upper bound on live tracking records per worker.
	pub max_records: usize,
}

impl Default for LoopbackConfig {
	fn default() -> Self {
		Self {
			eager_threshold: 8192,
			max_records: 4096,
		}
	}
}

impl LoopbackConfig {
	/// Parses a configuration from TOML, filling omitted fields with defaults.
	pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Checks that the configuration is usable.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.max_records == 0 {
			return Err(ConfigError::InvalidValue {
				field: "max_records",
				reason: "must be greater than zero",
			});
		}
		Ok(())
	}
}
