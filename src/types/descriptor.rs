//! Transaction descriptors: one on-chain call each

use crate::contracts::{IERC20, ILearna};
use crate::state::Destination;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolCall;
use eyre::Result;
use futures::future::BoxFuture;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Identifier of an on-chain operation
///
/// `RunAll` is a composite action (`generateKey` then `recordPoints`) and is
/// never registered against a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionId {
    Approve,
    SetUpCampaign,
    GenerateKey,
    RecordPoints,
    ClaimReward,
    SortWeeklyReward,
    Tip,
    RunAll,
}

impl FunctionId {
    /// On-chain name of the function
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::SetUpCampaign => "setUpCampaign",
            Self::GenerateKey => "generateKey",
            Self::RecordPoints => "recordPoints",
            Self::ClaimReward => "claimReward",
            Self::SortWeeklyReward => "sortWeeklyReward",
            Self::Tip => "tip",
            Self::RunAll => "runall",
        }
    }

    /// Screen the user lands on once a batch for this action settles
    pub fn destination(&self) -> Destination {
        match self {
            Self::SetUpCampaign | Self::SortWeeklyReward => Destination::Stats,
            Self::RecordPoints | Self::RunAll | Self::ClaimReward | Self::GenerateKey => {
                Destination::Profile
            }
            Self::Approve | Self::Tip => Destination::Home,
        }
    }

    /// Status line shown once a batch for this action completes
    pub fn success_message(&self) -> &'static str {
        match self {
            Self::Approve => "Spending approved",
            Self::SetUpCampaign => "Campaign set up successfully",
            Self::GenerateKey => "Pass key generated",
            Self::RecordPoints | Self::RunAll => "Quiz points recorded",
            Self::ClaimReward => "Reward claimed",
            Self::SortWeeklyReward => "Weekly rewards sorted",
            Self::Tip => "Thanks for the tip!",
        }
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FunctionId {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "approve" => Self::Approve,
            "setUpCampaign" => Self::SetUpCampaign,
            "generateKey" => Self::GenerateKey,
            "recordPoints" => Self::RecordPoints,
            "claimReward" => Self::ClaimReward,
            "sortWeeklyReward" => Self::SortWeeklyReward,
            "tip" => Self::Tip,
            "runall" => Self::RunAll,
            other => eyre::bail!("Unknown function identifier: {}", other),
        })
    }
}

/// A call with its typed arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Approve {
        spender: Address,
        amount: U256,
    },
    SetUpCampaign {
        campaign_hash: B256,
        token: Address,
        fund_amount: U256,
    },
    GenerateKey {
        user: Address,
        campaign_hash: B256,
    },
    RecordPoints {
        user: Address,
        /// Overwritten with the live quiz result right before submission
        points: u32,
        campaign_hash: B256,
    },
    ClaimReward {
        user: Address,
        week_id: U256,
        campaign_hash: B256,
    },
    SortWeeklyReward {
        growth_token_amount: U256,
        minimum_token: U256,
    },
    Tip,
}

impl Call {
    pub fn function_id(&self) -> FunctionId {
        match self {
            Self::Approve { .. } => FunctionId::Approve,
            Self::SetUpCampaign { .. } => FunctionId::SetUpCampaign,
            Self::GenerateKey { .. } => FunctionId::GenerateKey,
            Self::RecordPoints { .. } => FunctionId::RecordPoints,
            Self::ClaimReward { .. } => FunctionId::ClaimReward,
            Self::SortWeeklyReward { .. } => FunctionId::SortWeeklyReward,
            Self::Tip => FunctionId::Tip,
        }
    }

    /// ABI-encoded calldata
    pub fn encode(&self) -> Bytes {
        let data = match self {
            Self::Approve { spender, amount } => IERC20::approveCall {
                spender: *spender,
                amount: *amount,
            }
            .abi_encode(),
            Self::SetUpCampaign {
                campaign_hash,
                token,
                fund_amount,
            } => ILearna::setUpCampaignCall {
                campaignHash: *campaign_hash,
                fundsErc20: *token,
                fundAmount: *fund_amount,
            }
            .abi_encode(),
            Self::GenerateKey {
                user,
                campaign_hash,
            } => ILearna::generateKeyCall {
                user: *user,
                campaignHash: *campaign_hash,
            }
            .abi_encode(),
            Self::RecordPoints {
                user,
                points,
                campaign_hash,
            } => ILearna::recordPointsCall {
                user: *user,
                points: *points,
                campaignHash: *campaign_hash,
            }
            .abi_encode(),
            Self::ClaimReward {
                user,
                week_id,
                campaign_hash,
            } => ILearna::claimRewardCall {
                user: *user,
                weekId: *week_id,
                campaignHash: *campaign_hash,
            }
            .abi_encode(),
            Self::SortWeeklyReward {
                growth_token_amount,
                minimum_token,
            } => ILearna::sortWeeklyRewardCall {
                growthTokenAmount: *growth_token_amount,
                minimumToken: *minimum_token,
            }
            .abi_encode(),
            Self::Tip => ILearna::tipCall {}.abi_encode(),
        };
        Bytes::from(data)
    }
}

/// Which key signs a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerRole {
    /// The end user's connected wallet
    User,
    /// The platform key held by the server
    Admin,
}

/// Native fee the user forwards to the admin before an admin-signed step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delegation {
    pub to: Address,
    pub amount: U256,
}

/// Result of re-deriving a call from fresh on-chain state
#[derive(Debug, Clone)]
pub struct Refreshed {
    pub call: Call,
    pub value: U256,
    /// `false` makes the step redundant; it is skipped without submission
    pub proceed: bool,
}

impl Refreshed {
    pub fn proceed(call: Call, value: U256) -> Self {
        Self {
            call,
            value,
            proceed: true,
        }
    }

    pub fn skip(call: Call, value: U256) -> Self {
        Self {
            call,
            value,
            proceed: false,
        }
    }
}

/// Late binding of a descriptor's arguments, run immediately before submission
pub trait ArgRefresher: Send + Sync {
    fn refresh<'a>(&'a self, call: &'a Call, value: U256) -> BoxFuture<'a, Result<Refreshed>>;
}

/// One on-chain call, ready to be run
#[derive(Clone)]
pub struct TxDescriptor {
    pub call: Call,
    /// Target contract on the active chain
    pub contract: Address,
    /// Solidity signature resolved from the registry
    pub signature: &'static str,
    /// Native value attached to the call
    pub value: U256,
    pub signer: SignerRole,
    pub delegation: Option<Delegation>,
    refresher: Option<Arc<dyn ArgRefresher>>,
}

impl TxDescriptor {
    pub fn new(call: Call, contract: Address, signature: &'static str) -> Self {
        Self {
            call,
            contract,
            signature,
            value: U256::ZERO,
            signer: SignerRole::User,
            delegation: None,
            refresher: None,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_signer(mut self, signer: SignerRole) -> Self {
        self.signer = signer;
        self
    }

    pub fn with_delegation(mut self, delegation: Delegation) -> Self {
        self.delegation = Some(delegation);
        self
    }

    pub fn with_refresher(mut self, refresher: Arc<dyn ArgRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    pub fn function_id(&self) -> FunctionId {
        self.call.function_id()
    }

    pub fn requires_arg_refresh(&self) -> bool {
        self.refresher.is_some()
    }

    pub(crate) fn refresher(&self) -> Option<&Arc<dyn ArgRefresher>> {
        self.refresher.as_ref()
    }
}

impl fmt::Debug for TxDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxDescriptor")
            .field("call", &self.call)
            .field("contract", &self.contract)
            .field("signature", &self.signature)
            .field("value", &self.value)
            .field("signer", &self.signer)
            .field("delegation", &self.delegation)
            .field("requires_arg_refresh", &self.requires_arg_refresh())
            .finish()
    }
}
