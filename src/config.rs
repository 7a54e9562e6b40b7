//! Network and orchestration configuration for the Learna SDK

use crate::constants::{
    CELO_MAINNET_CHAIN_ID, CELO_TESTNET_CHAIN_ID, DEFAULT_CONFIRMATION_TIMEOUT,
    ERROR_SETTLE_DELAY, REQUIRED_CONFIRMATIONS, SUCCESS_SETTLE_DELAY,
};
use alloy::primitives::Address;
use eyre::{Context, Result};
use std::time::Duration;

/// Network configuration containing the RPC URL and contract addresses of one chain
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Chain ID (42220 for Celo mainnet)
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: String,
    /// Learna campaign contract address
    pub learna: Address,
    /// ERC-20 token campaigns are funded with
    pub token: Address,
}

impl NetworkConfig {
    /// Celo mainnet with the public Forno endpoint; contract addresses must be set
    pub fn celo_mainnet() -> Self {
        Self {
            chain_id: CELO_MAINNET_CHAIN_ID,
            rpc_url: "https://forno.celo.org".to_string(),
            learna: Address::ZERO,
            token: Address::ZERO,
        }
    }

    /// Celo Alfajores testnet; contract addresses must be set
    pub fn celo_testnet() -> Self {
        Self {
            chain_id: CELO_TESTNET_CHAIN_ID,
            rpc_url: "https://alfajores-forno.celo-testnet.org".to_string(),
            learna: Address::ZERO,
            token: Address::ZERO,
        }
    }

    /// Load from `LEARNA_CHAIN_ID`, `RPC_URL`, `LEARNA_CONTRACT` and `LEARNA_TOKEN`
    ///
    /// The chain id defaults to Celo mainnet and the RPC URL to that chain's
    /// public endpoint.
    pub fn from_env() -> Result<Self> {
        let chain_id = match std::env::var("LEARNA_CHAIN_ID") {
            Ok(raw) => raw.parse().context("Invalid LEARNA_CHAIN_ID")?,
            Err(_) => CELO_MAINNET_CHAIN_ID,
        };
        let mut config = if chain_id == CELO_TESTNET_CHAIN_ID {
            Self::celo_testnet()
        } else {
            Self {
                chain_id,
                ..Self::celo_mainnet()
            }
        };

        if let Ok(rpc_url) = std::env::var("RPC_URL") {
            config.rpc_url = rpc_url;
        }
        config.learna = env_address("LEARNA_CONTRACT")?;
        config.token = env_address("LEARNA_TOKEN")?;
        Ok(config)
    }

    /// Set a custom RPC URL
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    /// Set the Learna contract address
    pub fn with_learna(mut self, learna: Address) -> Self {
        self.learna = learna;
        self
    }

    /// Set the campaign token address
    pub fn with_token(mut self, token: Address) -> Self {
        self.token = token;
        self
    }
}

fn env_address(key: &str) -> Result<Address> {
    let raw = std::env::var(key).with_context(|| format!("{key} environment variable must be set"))?;
    raw.parse().with_context(|| format!("Invalid address in {key}"))
}

/// Referral attribution identity attached to primary-chain transactions
#[derive(Debug, Clone)]
pub struct ReferralConfig {
    /// Consumer (the app) being credited
    pub consumer: Address,
    /// Reward providers the consumer is registered with
    pub providers: Vec<Address>,
}

/// Settings for the transaction runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Chain on which referral suffixes are attached
    pub primary_chain_id: u64,
    /// Receipt depth awaited after every submission
    pub confirmations: u64,
    /// Upper bound on each confirmation wait
    pub confirmation_timeout: Duration,
    /// Referral identity; `None` disables attribution entirely
    pub referral: Option<ReferralConfig>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            primary_chain_id: CELO_MAINNET_CHAIN_ID,
            confirmations: REQUIRED_CONFIRMATIONS,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            referral: None,
        }
    }
}

impl RunnerConfig {
    /// Set the referral identity
    pub fn with_referral(mut self, referral: ReferralConfig) -> Self {
        self.referral = Some(referral);
        self
    }

    /// Set the confirmation timeout
    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }
}

/// Settings for completion side effects
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Delay before teardown after a completed batch
    pub success_settle: Duration,
    /// Delay before teardown after a failed batch
    pub error_settle: Duration,
    /// Link embedded in social broadcasts
    pub app_url: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            success_settle: SUCCESS_SETTLE_DELAY,
            error_settle: ERROR_SETTLE_DELAY,
            app_url: "https://learna.vercel.app".to_string(),
        }
    }
}
