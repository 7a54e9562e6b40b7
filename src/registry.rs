//! Chain-indexed function registry
//!
//! Resolves `(chain_id, FunctionId)` to the contract that implements the
//! function on that chain and its Solidity signature.

use crate::config::NetworkConfig;
use crate::contracts::{IERC20, ILearna};
use crate::error::OrchestrationError;
use crate::types::FunctionId;
use alloy::primitives::Address;
use alloy::sol_types::SolCall;
use std::collections::HashMap;

/// Where a function lives on one chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionEntry {
    pub contract_address: Address,
    pub signature: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<(u64, FunctionId), FunctionEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the full Learna function set for each network
    pub fn from_networks(networks: &[NetworkConfig]) -> Self {
        let mut registry = Self::new();
        for network in networks {
            registry.register_network(network);
        }
        registry
    }

    fn register_network(&mut self, network: &NetworkConfig) {
        let learna = [
            (FunctionId::SetUpCampaign, ILearna::setUpCampaignCall::SIGNATURE),
            (FunctionId::GenerateKey, ILearna::generateKeyCall::SIGNATURE),
            (FunctionId::RecordPoints, ILearna::recordPointsCall::SIGNATURE),
            (FunctionId::ClaimReward, ILearna::claimRewardCall::SIGNATURE),
            (FunctionId::SortWeeklyReward, ILearna::sortWeeklyRewardCall::SIGNATURE),
            (FunctionId::Tip, ILearna::tipCall::SIGNATURE),
        ];
        for (function, signature) in learna {
            self.register(
                network.chain_id,
                function,
                FunctionEntry {
                    contract_address: network.learna,
                    signature,
                },
            );
        }

        self.register(
            network.chain_id,
            FunctionId::Approve,
            FunctionEntry {
                contract_address: network.token,
                signature: IERC20::approveCall::SIGNATURE,
            },
        );
    }

    /// Add or replace one entry
    pub fn register(&mut self, chain_id: u64, function: FunctionId, entry: FunctionEntry) {
        self.entries.insert((chain_id, function), entry);
    }

    /// Look up a function on a chain
    ///
    /// A miss is fatal for the batch being built.
    pub fn lookup(&self, chain_id: u64, function: FunctionId) -> eyre::Result<&FunctionEntry> {
        self.entries
            .get(&(chain_id, function))
            .ok_or_else(|| OrchestrationError::FunctionNotSupported { function, chain_id }.into())
    }

    pub fn supports(&self, chain_id: u64, function: FunctionId) -> bool {
        self.entries.contains_key(&(chain_id, function))
    }
}
