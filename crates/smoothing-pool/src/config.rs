//! Pool configuration.
//!
//! Initial parameters are read from a TOML file. Only the two addresses are
//! required; everything else falls back to the defaults below.
//!
//! ```toml
//! governance = "0x1111111111111111111111111111111111111111"
//! pool_fee_recipient = "0x2222222222222222222222222222222222222222"
//! subscription_collateral = "10000000000000000"
//! pool_fee = 1000
//! checkpoint_slot_size = 7200
//! quorum = 1
//! ```
//!
//! Collateral is a decimal string because TOML integers stop at `i64`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use smoothing_types::hex::PrefixedHex;
use smoothing_types::{Address, Wei, WEI_PER_ETHER};

use crate::params::PoolParameters;
use crate::{PoolError, Result};

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "SMOOTHING_POOL_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "smoothing-pool.toml";

/// Initial pool configuration.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Initial governance address.
    #[serde_as(as = "PrefixedHex")]
    pub governance: Address,
    /// Collateral per validator, in wei.
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_subscription_collateral")]
    pub subscription_collateral: Wei,
    /// Pool fee in basis points.
    #[serde(default = "default_pool_fee")]
    pub pool_fee: u16,
    #[serde_as(as = "PrefixedHex")]
    pub pool_fee_recipient: Address,
    #[serde(default = "default_checkpoint_slot_size")]
    pub checkpoint_slot_size: u64,
    #[serde(default = "default_quorum")]
    pub quorum: u32,
}

// Default value functions

fn default_subscription_collateral() -> Wei {
    WEI_PER_ETHER / 100
}

fn default_pool_fee() -> u16 {
    1000
}

fn default_checkpoint_slot_size() -> u64 {
    7200
}

fn default_quorum() -> u32 {
    1
}

impl PoolConfig {
    /// Configuration with default parameters for the given role holders.
    pub fn new(governance: Address, pool_fee_recipient: Address) -> Self {
        Self {
            governance,
            subscription_collateral: default_subscription_collateral(),
            pool_fee: default_pool_fee(),
            pool_fee_recipient,
            checkpoint_slot_size: default_checkpoint_slot_size(),
            quorum: default_quorum(),
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: PoolConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Serialize to a TOML document.
    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Load and validate configuration from `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded pool config");
        Ok(config)
    }

    /// Config file location: `$SMOOTHING_POOL_CONFIG`, else
    /// `smoothing-pool.toml` in the working directory.
    pub fn config_path() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Check the values the pool would reject at initialization.
    ///
    /// # Errors
    ///
    /// - [`PoolError::FeeTooHigh`] if `pool_fee` exceeds 10000
    /// - [`PoolError::CheckpointSlotSizeZero`] if `checkpoint_slot_size` is 0
    /// - [`PoolError::Oracle`] if `quorum` is 0
    pub fn validate(&self) -> Result<()> {
        self.parameters()?;
        if self.quorum == 0 {
            return Err(smoothing_oracle::OracleError::QuorumZero.into());
        }
        Ok(())
    }

    /// The economic parameters in this configuration.
    ///
    /// # Errors
    ///
    /// Same as [`PoolParameters::new`].
    pub fn parameters(&self) -> Result<PoolParameters> {
        PoolParameters::new(
            self.subscription_collateral,
            self.pool_fee,
            self.pool_fee_recipient,
            self.checkpoint_slot_size,
        )
    }
}

impl TryFrom<&PoolConfig> for PoolParameters {
    type Error = PoolError;

    fn try_from(config: &PoolConfig) -> Result<Self> {
        config.parameters()
    }
}
