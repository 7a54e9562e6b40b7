//! Local private key signer backed by an HTTP provider

use super::{TransactionSigner, TxReceipt, TxRequest};
use crate::constants::RECEIPT_POLL_INTERVAL;
use alloy::network::{Ethereum, EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use eyre::{Context, Result};
use std::sync::Arc;

/// Signer holding a raw EVM private key
///
/// Used for the admin key on the server, and for user wallets in scripts and
/// backend jobs.
pub struct LocalSigner {
    /// Provider with wallet filler - handles nonce, gas, chain_id, and signing
    provider: Arc<dyn Provider<Ethereum>>,
    address: Address,
}

impl LocalSigner {
    /// Create a new LocalSigner from a private key hex string
    ///
    /// # Arguments
    ///
    /// * `private_key` - Hex-encoded private key (with or without 0x prefix)
    /// * `rpc_url` - RPC endpoint URL
    pub async fn from_private_key(
        private_key: impl AsRef<str>,
        rpc_url: impl AsRef<str>,
    ) -> Result<Self> {
        let key = private_key.as_ref();
        let key = key.strip_prefix("0x").unwrap_or(key);

        let signer: PrivateKeySigner = key.parse().context("Failed to parse private key")?;

        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let url: Url = rpc_url.as_ref().parse().context("Invalid RPC URL")?;

        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        Ok(Self {
            provider: Arc::new(provider),
            address,
        })
    }

    /// Load the key from an environment variable, e.g. `ADMIN_PRIVATE_KEY`
    ///
    /// Only call this in a server process; the admin key must never reach a
    /// client bundle.
    pub async fn from_env(var: &str, rpc_url: impl AsRef<str>) -> Result<Self> {
        let key = std::env::var(var).with_context(|| format!("{var} must be set"))?;
        Self::from_private_key(key, rpc_url).await
    }
}

impl TransactionSigner for LocalSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_and_send(&self, tx: TxRequest) -> Result<TxHash> {
        let mut tx_request = alloy::rpc::types::TransactionRequest::default()
            .with_to(tx.to)
            .with_value(tx.value)
            .with_input(tx.data);

        if let Some(gas_limit) = tx.gas_limit {
            tx_request = tx_request.with_gas_limit(gas_limit);
        }

        let pending_tx = self
            .provider
            .send_transaction(tx_request)
            .await
            .context("Failed to send transaction")?;

        Ok(*pending_tx.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash, confirmations: u64) -> Result<TxReceipt> {
        // Callers bound the total wait; this loop only polls
        let receipt = loop {
            let receipt: Option<TransactionReceipt> = self
                .provider
                .get_transaction_receipt(tx_hash)
                .await
                .context("Failed to get transaction receipt")?;

            match receipt {
                Some(receipt) if receipt.block_number.is_some() => break receipt,
                _ => tokio::time::sleep(RECEIPT_POLL_INTERVAL).await,
            }
        };

        let block_number = receipt.block_number.unwrap_or_default();
        let target = block_number + confirmations.saturating_sub(1);

        loop {
            let head = self
                .provider
                .get_block_number()
                .await
                .context("Failed to get block number")?;
            if head >= target {
                break;
            }
            tracing::debug!(%tx_hash, head, target, "waiting for confirmations");
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }

        Ok(TxReceipt {
            tx_hash,
            block_number,
            success: receipt.status(),
        })
    }

    async fn get_balance(&self) -> Result<U256> {
        let balance: U256 = self
            .provider
            .get_balance(self.address)
            .await
            .context("Failed to get balance")?;

        Ok(balance)
    }
}
