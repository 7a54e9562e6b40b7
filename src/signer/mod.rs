//! Transaction signer abstraction for the Learna SDK
//!
//! The same trait backs both keys a batch can use: the end user's wallet and
//! the platform's admin key. The admin key is only ever loaded server-side.

mod local;

pub use local::LocalSigner;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use eyre::Result;

/// Transaction request parameters
#[derive(Debug, Clone)]
pub struct TxRequest {
    /// Target contract or recipient address
    pub to: Address,
    /// Transaction value in wei
    pub value: U256,
    /// Encoded calldata
    pub data: Bytes,
    /// Optional gas limit override
    pub gas_limit: Option<u64>,
}

impl TxRequest {
    /// Create a new contract call request
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            value: U256::ZERO,
            data: data.into(),
            gas_limit: None,
        }
    }

    /// Plain native-currency transfer
    pub fn transfer(to: Address, value: U256) -> Self {
        Self::new(to, Bytes::new()).with_value(value)
    }

    /// Set transaction value
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Set gas limit
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    /// Append opaque bytes (e.g. a referral suffix) to the calldata
    pub fn with_suffix(mut self, suffix: &[u8]) -> Self {
        if !suffix.is_empty() {
            let mut data = self.data.to_vec();
            data.extend_from_slice(suffix);
            self.data = data.into();
        }
        self
    }
}

/// Receipt of a transaction that reached the requested depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// False when the transaction reverted
    pub success: bool,
}

/// Trait for signing and sending EVM transactions
pub trait TransactionSigner: Send + Sync {
    /// Returns the signer's EVM address
    fn address(&self) -> Address;

    /// Signs and sends a transaction, returning the transaction hash
    fn sign_and_send(
        &self,
        tx: TxRequest,
    ) -> impl std::future::Future<Output = Result<TxHash>> + Send;

    /// Waits until the transaction is `confirmations` blocks deep
    fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
    ) -> impl std::future::Future<Output = Result<TxReceipt>> + Send;

    /// Gets the native token balance (CELO)
    fn get_balance(&self) -> impl std::future::Future<Output = Result<U256>> + Send;
}
