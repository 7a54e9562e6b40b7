//! Chain ids, timing defaults and fees for the Learna SDK

use std::time::Duration;

/// Celo mainnet, the production network where referral attribution applies
pub const CELO_MAINNET_CHAIN_ID: u64 = 42220;

/// Celo Alfajores testnet
pub const CELO_TESTNET_CHAIN_ID: u64 = 44787;

/// Receipt depth awaited before the next step or completion
pub const REQUIRED_CONFIRMATIONS: u64 = 2;

/// Upper bound on a single confirmation wait
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Receipt polling interval for RPC-backed signers
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Settling delay before run state is torn down after success
pub const SUCCESS_SETTLE_DELAY: Duration = Duration::from_secs(6);

/// Settling delay before run state is torn down after an error
pub const ERROR_SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Native fee (0.01 CELO) the user forwards to the admin before `recordPoints`
pub const DEFAULT_DELEGATION_FEE: u128 = 10_000_000_000_000_000;

/// Message shown to the user when a batch fails
pub const SUPPORT_MESSAGE: &str =
    "Transaction failed. Please try again or contact support if the problem persists.";
