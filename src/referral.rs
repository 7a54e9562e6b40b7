//! Referral attribution (Divvi)
//!
//! Primary-chain transactions carry a data suffix identifying the consumer
//! app and its reward providers. Once the batch confirms, the transaction
//! hash is reported to the attribution API so the referral can be credited.

use alloy::primitives::{Address, Bytes, TxHash};
use alloy::sol_types::SolValue;
use eyre::{Context, Result};
use serde::Serialize;
use std::time::Duration;

const DIVVI_API_BASE: &str = "https://api.divvi.xyz";

/// Trailing marker that lets indexers locate the suffix in calldata
pub const SUFFIX_MARKER: [u8; 4] = [0x6d, 0xec, 0xb8, 0x5d];

/// Outcome of a referral submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferralStatus {
    /// HTTP status returned by the attribution service
    pub code: u16,
}

impl ReferralStatus {
    pub fn is_success(&self) -> bool {
        self.code == 200
    }
}

/// Referral attribution collaborator
pub trait ReferralService: Send + Sync {
    /// Bytes to append to every primary-chain submission
    fn data_suffix(&self, consumer: Address, providers: &[Address]) -> Result<Bytes>;

    /// Report a confirmed transaction for attribution
    fn submit_referral(
        &self,
        tx_hash: TxHash,
        chain_id: u64,
    ) -> impl std::future::Future<Output = Result<ReferralStatus>> + Send;
}

/// Encode the attribution suffix
///
/// Layout: ABI-encoded `(consumer, providers)`, then the payload length as a
/// big-endian `u16`, then [`SUFFIX_MARKER`]. Parsers read it from the end.
pub fn encode_data_suffix(consumer: Address, providers: &[Address]) -> Result<Bytes> {
    let payload = (consumer, providers.to_vec()).abi_encode_params();
    let len = u16::try_from(payload.len()).context("Too many referral providers")?;

    let mut suffix = payload;
    suffix.extend_from_slice(&len.to_be_bytes());
    suffix.extend_from_slice(&SUFFIX_MARKER);
    Ok(suffix.into())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitReferralRequest {
    tx_hash: String,
    chain_id: u64,
}

/// HTTP client for the Divvi attribution API
pub struct DivviClient {
    base_url: String,
    client: reqwest::Client,
}

impl DivviClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DIVVI_API_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("LearnaRustSDK/0.1.0")
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }
}

impl ReferralService for DivviClient {
    fn data_suffix(&self, consumer: Address, providers: &[Address]) -> Result<Bytes> {
        encode_data_suffix(consumer, providers)
    }

    async fn submit_referral(&self, tx_hash: TxHash, chain_id: u64) -> Result<ReferralStatus> {
        let url = format!("{}/submitReferral", self.base_url);
        let request = SubmitReferralRequest {
            tx_hash: tx_hash.to_string(),
            chain_id,
        };

        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to submit referral")?;

        let status = ReferralStatus {
            code: resp.status().as_u16(),
        };
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%tx_hash, code = status.code, body = %body, "referral rejected");
        }

        Ok(status)
    }
}
