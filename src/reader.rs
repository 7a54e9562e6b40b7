//! Read-only chain access: state refetch and argument refreshers

use crate::config::NetworkConfig;
use crate::contracts::{IERC20, ILearna};
use crate::types::{ArgRefresher, Call, Refreshed};
use alloy::network::{Ethereum, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::sol_types::SolCall;
use alloy::transports::http::reqwest::Url;
use eyre::{Context, Result};
use futures::future::BoxFuture;
use std::sync::Arc;

/// Latest on-chain values the app displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadSnapshot {
    /// Current week counter of the Learna contract
    pub week_id: u64,
    pub block_number: u64,
}

/// Read/refetch collaborator, invoked once per completed batch
pub trait StateReader: Send + Sync {
    fn refetch(&self) -> impl std::future::Future<Output = Result<ReadSnapshot>> + Send;
}

/// eth_call reader for the Learna and token contracts
#[derive(Clone)]
pub struct LearnaReader {
    provider: Arc<RootProvider<Ethereum>>,
    learna: Address,
    token: Address,
}

impl LearnaReader {
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let url: Url = config.rpc_url.parse().context("Invalid RPC URL")?;
        // Read-only provider without fillers (we only do eth_call operations)
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .network::<Ethereum>()
            .connect_http(url);

        Ok(Self::with_provider(provider, config.learna, config.token))
    }

    /// Reader over an existing provider
    pub fn with_provider(provider: RootProvider<Ethereum>, learna: Address, token: Address) -> Self {
        Self {
            provider: Arc::new(provider),
            learna,
            token,
        }
    }

    async fn call<C: SolCall + Send>(&self, to: Address, call: C) -> Result<C::Return> {
        let result: Bytes = self
            .provider
            .call(
                alloy::rpc::types::TransactionRequest::default()
                    .with_to(to)
                    .with_input(call.abi_encode()),
            )
            .await
            .with_context(|| format!("Failed to call {}", C::SIGNATURE))?;

        C::abi_decode_returns(&result).with_context(|| format!("Failed to decode {}", C::SIGNATURE))
    }

    /// Current week counter
    pub async fn week_id(&self) -> Result<u64> {
        let week = self.call(self.learna, ILearna::getWeekIdCall {}).await?;
        u64::try_from(week).with_context(|| format!("Week id {week} does not fit in u64"))
    }

    /// Whether `user` already holds a pass key for the campaign
    pub async fn has_pass_key(&self, user: Address, campaign_hash: B256) -> Result<bool> {
        self.call(
            self.learna,
            ILearna::hasPassKeyCall {
                user,
                campaignHash: campaign_hash,
            },
        )
        .await
    }

    /// Campaign token allowance granted by `owner` to `spender`
    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        self.call(self.token, IERC20::allowanceCall { owner, spender })
            .await
    }
}

impl StateReader for LearnaReader {
    async fn refetch(&self) -> Result<ReadSnapshot> {
        let block_number = self
            .provider
            .get_block_number()
            .await
            .context("Failed to get block number")?;
        let week_id = self.week_id().await?;

        Ok(ReadSnapshot {
            week_id,
            block_number,
        })
    }
}

/// Skips `generateKey` when the user already holds a pass key
pub struct PassKeyCheck {
    reader: LearnaReader,
}

impl PassKeyCheck {
    pub fn new(reader: LearnaReader) -> Self {
        Self { reader }
    }
}

impl ArgRefresher for PassKeyCheck {
    fn refresh<'a>(&'a self, call: &'a Call, value: U256) -> BoxFuture<'a, Result<Refreshed>> {
        Box::pin(async move {
            if let Call::GenerateKey {
                user,
                campaign_hash,
            } = call
            {
                if self.reader.has_pass_key(*user, *campaign_hash).await? {
                    tracing::info!(%user, "pass key already held, skipping generateKey");
                    return Ok(Refreshed::skip(call.clone(), value));
                }
            }
            Ok(Refreshed::proceed(call.clone(), value))
        })
    }
}

/// Skips `approve` when the existing allowance already covers the amount
pub struct AllowanceCheck {
    reader: LearnaReader,
    owner: Address,
}

impl AllowanceCheck {
    pub fn new(reader: LearnaReader, owner: Address) -> Self {
        Self { reader, owner }
    }
}

impl ArgRefresher for AllowanceCheck {
    fn refresh<'a>(&'a self, call: &'a Call, value: U256) -> BoxFuture<'a, Result<Refreshed>> {
        Box::pin(async move {
            if let Call::Approve { spender, amount } = call {
                let allowance = self.reader.allowance(self.owner, *spender).await?;
                if allowance >= *amount {
                    tracing::info!(%spender, %allowance, "allowance sufficient, skipping approve");
                    return Ok(Refreshed::skip(call.clone(), value));
                }
            }
            Ok(Refreshed::proceed(call.clone(), value))
        })
    }
}
