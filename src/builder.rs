//! Per-feature transaction builders
//!
//! Each builder translates a feature-level intent into a [`TxBatch`] for the
//! active chain. Signer roles and fee delegation are decided here, so the
//! runner only follows what the descriptors say.

use crate::constants::DEFAULT_DELEGATION_FEE;
use crate::registry::Registry;
use crate::types::{Call, Delegation, FunctionId, SignerRole, TxBatch, TxDescriptor};
use alloy::primitives::{Address, B256, U256};
use eyre::{ensure, Result};
use std::sync::Arc;

/// Parameters for creating a campaign
#[derive(Debug, Clone)]
pub struct SetUpCampaignParams {
    pub campaign_hash: B256,
    /// ERC-20 funding; `None` or a zero amount funds in native CELO only
    pub token_funding: Option<U256>,
    /// Native CELO sent with the call
    pub native_funding: U256,
}

impl SetUpCampaignParams {
    pub fn new(campaign_hash: B256) -> Self {
        Self {
            campaign_hash,
            token_funding: None,
            native_funding: U256::ZERO,
        }
    }

    pub fn with_token_funding(mut self, amount: U256) -> Self {
        self.token_funding = Some(amount);
        self
    }

    pub fn with_native_funding(mut self, amount: U256) -> Self {
        self.native_funding = amount;
        self
    }

    fn token_amount(&self) -> U256 {
        self.token_funding.unwrap_or(U256::ZERO)
    }
}

/// Parameters for closing a week and sorting its rewards
#[derive(Debug, Clone, Copy)]
pub struct SortWeeklyRewardParams {
    pub growth_token_amount: U256,
    pub minimum_token: U256,
}

/// Builds batches for one chain
#[derive(Debug, Clone)]
pub struct TxBuilder {
    registry: Arc<Registry>,
    chain_id: u64,
    /// Address of the server-held admin key
    admin: Address,
    delegation_fee: U256,
}

impl TxBuilder {
    pub fn new(registry: Arc<Registry>, chain_id: u64, admin: Address) -> Self {
        Self {
            registry,
            chain_id,
            admin,
            delegation_fee: U256::from(DEFAULT_DELEGATION_FEE),
        }
    }

    /// Override the fee forwarded to the admin before `recordPoints`
    pub fn with_delegation_fee(mut self, fee: U256) -> Self {
        self.delegation_fee = fee;
        self
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Resolve a call against the registry
    pub fn descriptor(&self, call: Call) -> Result<TxDescriptor> {
        let entry = self.registry.lookup(self.chain_id, call.function_id())?;
        Ok(TxDescriptor::new(call, entry.contract_address, entry.signature))
    }

    /// Address of the Learna contract on the active chain
    fn learna(&self) -> Result<Address> {
        Ok(self
            .registry
            .lookup(self.chain_id, FunctionId::SetUpCampaign)?
            .contract_address)
    }

    /// Approve `spender` to pull campaign tokens
    pub fn approve(&self, spender: Address, amount: U256) -> Result<TxBatch> {
        let approve = self.descriptor(Call::Approve { spender, amount })?;
        Ok(TxBatch::new(FunctionId::Approve, vec![approve]))
    }

    /// Create a campaign, approving the token first when it is ERC-20 funded
    pub fn set_up_campaign(&self, params: &SetUpCampaignParams) -> Result<TxBatch> {
        let mut descriptors = Vec::with_capacity(2);
        let token_amount = params.token_amount();

        let token = if token_amount.is_zero() {
            Address::ZERO
        } else {
            let approve = self.descriptor(Call::Approve {
                spender: self.learna()?,
                amount: token_amount,
            })?;
            let token = approve.contract;
            descriptors.push(approve);
            token
        };

        let setup = self
            .descriptor(Call::SetUpCampaign {
                campaign_hash: params.campaign_hash,
                token,
                fund_amount: token_amount,
            })?
            .with_value(params.native_funding);
        descriptors.push(setup);

        Ok(TxBatch::new(FunctionId::SetUpCampaign, descriptors))
    }

    /// Mint a pass key for the user, paying `fee` in CELO
    pub fn generate_key(&self, user: Address, campaign_hash: B256, fee: U256) -> Result<TxBatch> {
        let key = self
            .descriptor(Call::GenerateKey {
                user,
                campaign_hash,
            })?
            .with_value(fee);
        Ok(TxBatch::new(FunctionId::GenerateKey, vec![key]))
    }

    /// Record quiz points, signed by the admin after the user forwards the gas fee
    ///
    /// Points are bound from the run context at submission time.
    pub fn record_points(&self, user: Address, campaign_hash: B256) -> Result<TxBatch> {
        let record = self
            .descriptor(Call::RecordPoints {
                user,
                points: 0,
                campaign_hash,
            })?
            .with_signer(SignerRole::Admin)
            .with_delegation(Delegation {
                to: self.admin,
                amount: self.delegation_fee,
            });
        Ok(TxBatch::new(FunctionId::RecordPoints, vec![record]))
    }

    /// `generateKey` (user) immediately followed by `recordPoints` (admin)
    ///
    /// The key fee covers the admin's gas, so no separate delegation is sent.
    pub fn run_all(&self, user: Address, campaign_hash: B256, fee: U256) -> Result<TxBatch> {
        let key = self
            .descriptor(Call::GenerateKey {
                user,
                campaign_hash,
            })?
            .with_value(fee);
        let record = self
            .descriptor(Call::RecordPoints {
                user,
                points: 0,
                campaign_hash,
            })?
            .with_signer(SignerRole::Admin);

        Ok(TxBatch::new(FunctionId::RunAll, vec![key, record]))
    }

    /// Claim the user's reward for a closed week
    pub fn claim_reward(&self, user: Address, campaign_hash: B256, week_id: u64) -> Result<TxBatch> {
        let claim = self.descriptor(Call::ClaimReward {
            user,
            week_id: U256::from(week_id),
            campaign_hash,
        })?;
        Ok(TxBatch::new(FunctionId::ClaimReward, vec![claim]))
    }

    /// Close the current week; admin only
    pub fn sort_weekly_reward(&self, params: SortWeeklyRewardParams) -> Result<TxBatch> {
        let sort = self
            .descriptor(Call::SortWeeklyReward {
                growth_token_amount: params.growth_token_amount,
                minimum_token: params.minimum_token,
            })?
            .with_signer(SignerRole::Admin);
        Ok(TxBatch::new(FunctionId::SortWeeklyReward, vec![sort]))
    }

    /// Tip the platform
    pub fn tip(&self, amount: U256) -> Result<TxBatch> {
        ensure!(!amount.is_zero(), "Tip amount must be positive");
        let tip = self.descriptor(Call::Tip)?.with_value(amount);
        Ok(TxBatch::new(FunctionId::Tip, vec![tip]))
    }
}
