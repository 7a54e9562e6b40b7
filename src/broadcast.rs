//! Social broadcasts (Farcaster casts via Neynar)

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const NEYNAR_API_BASE: &str = "https://api.neynar.com/v2/farcaster";

/// Social broadcast collaborator
pub trait SocialBroadcaster: Send + Sync {
    /// Publish a post, returning its hash
    fn publish(
        &self,
        text: &str,
        embeds: &[String],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Post templates keyed by what just happened
pub mod templates {
    /// Announcement for a week whose rewards were just sorted
    pub fn week_closed(week_id: u64) -> String {
        format!(
            "Week {week_id} on Learna is closed and its rewards are sorted. \
             Learners, your payouts for week {week_id} are ready to claim!"
        )
    }

    /// Acknowledgement after a referral was attributed
    pub fn referral_recorded() -> String {
        "Another learner joined Learna through a referral. Learn, earn, repeat!".to_string()
    }
}

#[derive(Debug, Serialize)]
struct CastEmbed<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct PublishCastRequest<'a> {
    signer_uuid: &'a str,
    text: &'a str,
    embeds: Vec<CastEmbed<'a>>,
}

#[derive(Debug, Deserialize)]
struct PublishCastResponse {
    cast: PublishedCast,
}

#[derive(Debug, Deserialize)]
struct PublishedCast {
    hash: String,
}

/// Neynar API client publishing casts as the app account
pub struct NeynarClient {
    api_key: String,
    signer_uuid: String,
    client: reqwest::Client,
}

impl NeynarClient {
    pub fn new(api_key: impl Into<String>, signer_uuid: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            api_key: api_key.into(),
            signer_uuid: signer_uuid.into(),
            client,
        })
    }

    /// Load credentials from `NEYNAR_API_KEY` and `NEYNAR_SIGNER_UUID`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("NEYNAR_API_KEY").context("NEYNAR_API_KEY must be set")?;
        let signer_uuid =
            std::env::var("NEYNAR_SIGNER_UUID").context("NEYNAR_SIGNER_UUID must be set")?;
        Self::new(api_key, signer_uuid)
    }
}

impl SocialBroadcaster for NeynarClient {
    async fn publish(&self, text: &str, embeds: &[String]) -> Result<String> {
        let request = PublishCastRequest {
            signer_uuid: &self.signer_uuid,
            text,
            embeds: embeds
                .iter()
                .map(|url| CastEmbed { url: url.as_str() })
                .collect(),
        };

        let resp = self
            .client
            .post(format!("{}/cast", NEYNAR_API_BASE))
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to publish cast")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            eyre::bail!("Failed to publish cast: {} - {}", status, body);
        }

        let published: PublishCastResponse = resp
            .json()
            .await
            .context("Failed to parse cast response")?;

        Ok(published.cast.hash)
    }
}
