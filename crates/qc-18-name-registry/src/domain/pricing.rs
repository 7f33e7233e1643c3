//! # Price Table
//!
//! Length-tiered registration pricing. Pure: the same name always costs the
//! same under the same table, and shorter names never cost less.

use crate::config::{PriceTiers, RegistryConfig};
use crate::domain::value_objects::Amount;
use crate::errors::RegistryError;

/// Maps a candidate name to its minimum registration payment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceTable {
    max_len: usize,
    tiers: PriceTiers,
}

impl PriceTable {
    /// Build from explicit tiers.
    #[must_use]
    pub fn new(max_len: usize, tiers: PriceTiers) -> Self {
        Self { max_len, tiers }
    }

    /// Build from registry configuration.
    #[must_use]
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(config.max_name_length, config.pricing.clone())
    }

    /// Maximum name length accepted.
    #[must_use]
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Price for a name of `length` characters.
    ///
    /// # Errors
    ///
    /// `NameTooLong` if `length > max_len`.
    pub fn price_for_length(&self, length: usize) -> Result<Amount, RegistryError> {
        if length > self.max_len {
            return Err(RegistryError::NameTooLong {
                length,
                max: self.max_len,
            });
        }
        let price = if length <= self.tiers.short_max_len {
            self.tiers.short()
        } else if length <= self.tiers.medium_max_len {
            self.tiers.medium()
        } else {
            self.tiers.long()
        };
        Ok(price)
    }

    /// Price for `name`, counted in characters.
    ///
    /// # Errors
    ///
    /// `NameTooLong` if the name exceeds `max_len`.
    pub fn price(&self, name: &str) -> Result<Amount, RegistryError> {
        self.price_for_length(name.chars().count())
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::from_config(&RegistryConfig::default())
    }
}
