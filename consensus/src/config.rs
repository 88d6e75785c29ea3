//! Consensus engine configuration and genesis inputs.
//!
//! Supplied by the node's configuration/genesis loader at startup and never
//! mutated after engine construction.

use {
    solana_pubkey::Pubkey,
    thiserror::Error,
    zen_rewards::RemainderPolicy,
};

/// 1_000 ZEN in base units — the admission floor.
pub const DEFAULT_MIN_STAKE: u64 = 1_000 * 1_000_000_000;
/// One committee per execution shard.
pub const DEFAULT_SHARD_COUNT: u32 = 64;
/// Target block production interval.
pub const DEFAULT_BLOCK_TIME_MS: u64 = 3_000;
pub const DEFAULT_CHAIN_ID: &str = "zen-mainnet";

/// Static consensus parameters.
#[derive(Debug, Clone)]
pub struct ConsensusConfig {
    /// Seeds the genesis history entry; distinct networks derive distinct
    /// chains.
    pub chain_id: String,
    /// Minimum stake (base units) for roster admission.
    pub min_stake: u64,
    /// Number of shard committees the roster is partitioned into.
    pub shard_count: u32,
    /// Block production cadence for the driving service.
    pub block_time_ms: u64,
    /// Disposal rule for the reward-division remainder. Network-pinned to
    /// `Treasury`.
    pub remainder_policy: RemainderPolicy,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID.to_string(),
            min_stake: DEFAULT_MIN_STAKE,
            shard_count: DEFAULT_SHARD_COUNT,
            block_time_ms: DEFAULT_BLOCK_TIME_MS,
            remainder_policy: RemainderPolicy::Treasury,
        }
    }
}

impl ConsensusConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_id.is_empty() {
            return Err(ConfigError::EmptyChainId);
        }
        if self.min_stake == 0 {
            return Err(ConfigError::InvalidMinStake);
        }
        if self.shard_count == 0 {
            return Err(ConfigError::InvalidShardCount);
        }
        if self.block_time_ms == 0 {
            return Err(ConfigError::InvalidBlockTime);
        }
        Ok(())
    }
}

/// A genesis roster entry; admission rules apply to genesis validators too.
#[derive(Debug, Clone)]
pub struct GenesisValidator {
    pub address: Pubkey,
    /// Opaque verification key material.
    pub verification_key: Vec<u8>,
    pub stake: u64,
}

/// Errors in consensus configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("chain_id must not be empty")]
    EmptyChainId,
    #[error("min_stake must be > 0")]
    InvalidMinStake,
    #[error("shard_count must be > 0")]
    InvalidShardCount,
    #[error("block_time_ms must be > 0")]
    InvalidBlockTime,
    #[error("snapshot chain id {snapshot} does not match configured chain id {configured}")]
    ChainIdMismatch { snapshot: String, configured: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ConsensusConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_stake, 1_000_000_000_000);
        assert_eq!(config.shard_count, 64);
        assert_eq!(config.block_time_ms, 3_000);
        assert_eq!(config.remainder_policy, RemainderPolicy::Treasury);
    }

    #[test]
    fn test_empty_chain_id_rejected() {
        let config = ConsensusConfig {
            chain_id: String::new(),
            ..ConsensusConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyChainId));
    }

    #[test]
    fn test_zero_shard_count_rejected() {
        let config = ConsensusConfig {
            shard_count: 0,
            ..ConsensusConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidShardCount));
    }

    #[test]
    fn test_zero_block_time_rejected() {
        let config = ConsensusConfig {
            block_time_ms: 0,
            ..ConsensusConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidBlockTime));
    }

    #[test]
    fn test_zero_min_stake_rejected() {
        let config = ConsensusConfig {
            min_stake: 0,
            ..ConsensusConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidMinStake));
    }
}
