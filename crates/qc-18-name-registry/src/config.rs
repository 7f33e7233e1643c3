//! Configuration for the Name Registry subsystem.
//!
//! All values have production defaults and may be overridden from TOML:
//!
//! ```toml
//! max_name_length = 10
//! lease_term_secs = 31536000
//! controller = "0x1111111111111111111111111111111111111111"
//!
//! [pricing]
//! short_max_len = 3
//! short_price = 10000000000000000
//! ```

use crate::domain::value_objects::{Address, Amount, U256};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default maximum name length in characters.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 10;

/// Default maximum data payload length in characters.
pub const DEFAULT_MAX_DATA_LENGTH: usize = 256;

/// Default lease term: 365 days.
pub const DEFAULT_LEASE_TERM_SECS: u64 = 365 * 24 * 60 * 60;

/// Default top-level domain shown in rendered images.
pub const DEFAULT_TLD: &str = "qns";

/// Length-tiered registration prices, in the smallest currency unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceTiers {
    /// Names up to this many characters pay `short_price`.
    pub short_max_len: usize,
    /// Names up to this many characters (and above `short_max_len`) pay `medium_price`.
    pub medium_max_len: usize,
    /// Price for the shortest tier (0.01 × 10^18 by default).
    pub short_price: u64,
    /// Price for the middle tier (0.005 × 10^18 by default).
    pub medium_price: u64,
    /// Price for every longer name (0.001 × 10^18 by default).
    pub long_price: u64,
}

impl Default for PriceTiers {
    fn default() -> Self {
        Self {
            short_max_len: 3,
            medium_max_len: 6,
            short_price: 10_000_000_000_000_000,
            medium_price: 5_000_000_000_000_000,
            long_price: 1_000_000_000_000_000,
        }
    }
}

impl PriceTiers {
    /// Short-tier price as an [`Amount`].
    #[must_use]
    pub fn short(&self) -> Amount {
        U256::from(self.short_price)
    }

    /// Medium-tier price as an [`Amount`].
    #[must_use]
    pub fn medium(&self) -> Amount {
        U256::from(self.medium_price)
    }

    /// Long-tier price as an [`Amount`].
    #[must_use]
    pub fn long(&self) -> Amount {
        U256::from(self.long_price)
    }
}

/// Registry configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum name length in characters.
    pub max_name_length: usize,
    /// Maximum data payload length in characters.
    pub max_data_length: usize,
    /// Lease term granted at registration and added per renewal.
    pub lease_term_secs: u64,
    /// Renewal cost as a percentage of the registration price.
    pub renewal_percent: u32,
    /// Top-level domain appended in rendered images.
    pub tld: String,
    /// The only identity allowed to withdraw the treasury.
    pub controller: Address,
    /// Registration price schedule.
    pub pricing: PriceTiers,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            max_data_length: DEFAULT_MAX_DATA_LENGTH,
            lease_term_secs: DEFAULT_LEASE_TERM_SECS,
            renewal_percent: 100,
            tld: DEFAULT_TLD.to_string(),
            controller: Address::ZERO,
            pricing: PriceTiers::default(),
        }
    }
}

impl RegistryConfig {
    /// Default configuration with the given treasury controller.
    #[must_use]
    pub fn with_controller(controller: Address) -> Self {
        Self {
            controller,
            ..Self::default()
        }
    }

    /// Parse from a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// `Parse` for malformed TOML, `Invalid` if validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Check value ranges and price monotonicity.
    ///
    /// # Errors
    ///
    /// `Invalid` describing the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pricing;
        if self.max_name_length == 0 {
            return Err(ConfigError::Invalid("max_name_length must be > 0".into()));
        }
        if self.lease_term_secs == 0 {
            return Err(ConfigError::Invalid("lease_term_secs must be > 0".into()));
        }
        if p.short_max_len >= p.medium_max_len {
            return Err(ConfigError::Invalid(format!(
                "pricing.short_max_len ({}) must be below pricing.medium_max_len ({})",
                p.short_max_len, p.medium_max_len
            )));
        }
        if p.medium_max_len > self.max_name_length {
            return Err(ConfigError::Invalid(format!(
                "pricing.medium_max_len ({}) exceeds max_name_length ({})",
                p.medium_max_len, self.max_name_length
            )));
        }
        // Shorter names must never be cheaper.
        if p.short_price < p.medium_price || p.medium_price < p.long_price {
            return Err(ConfigError::Invalid(
                "prices must be non-increasing from short to long tier".into(),
            ));
        }
        if self.tld.is_empty() || !self.tld.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Invalid(format!("invalid tld {:?}", self.tld)));
        }
        Ok(())
    }

    /// Stricter check for deployments: a zero controller would lock the treasury.
    ///
    /// # Errors
    ///
    /// `Invalid` if the controller is unset, or any [`Self::validate`] error.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.controller.is_zero() {
            return Err(ConfigError::Invalid(
                "controller is the zero address; treasury would be unwithdrawable".into(),
            ));
        }
        Ok(())
    }
}
