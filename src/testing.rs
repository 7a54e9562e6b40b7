//! In-memory collaborators for unit tests

use crate::broadcast::SocialBroadcaster;
use crate::config::NetworkConfig;
use crate::constants::{CELO_MAINNET_CHAIN_ID, CELO_TESTNET_CHAIN_ID};
use crate::reader::{ReadSnapshot, StateReader};
use crate::referral::{encode_data_suffix, ReferralService, ReferralStatus};
use crate::registry::Registry;
use crate::signer::{TransactionSigner, TxReceipt, TxRequest};
use alloy::primitives::{keccak256, Address, Bytes, TxHash, U256};
use eyre::Result;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

pub const LEARNA: Address = Address::repeat_byte(0x01);
pub const TOKEN: Address = Address::repeat_byte(0x02);
pub const TEST_LEARNA: Address = Address::repeat_byte(0x03);
pub const TEST_TOKEN: Address = Address::repeat_byte(0x04);
pub const USER: Address = Address::repeat_byte(0x05);
pub const ADMIN: Address = Address::repeat_byte(0xad);

pub fn registry() -> Arc<Registry> {
    Arc::new(Registry::from_networks(&[
        NetworkConfig::celo_mainnet()
            .with_learna(LEARNA)
            .with_token(TOKEN),
        NetworkConfig::celo_testnet()
            .with_learna(TEST_LEARNA)
            .with_token(TEST_TOKEN),
    ]))
}

pub fn mainnet_builder() -> crate::builder::TxBuilder {
    crate::builder::TxBuilder::new(registry(), CELO_MAINNET_CHAIN_ID, ADMIN)
}

pub fn testnet_builder() -> crate::builder::TxBuilder {
    crate::builder::TxBuilder::new(registry(), CELO_TESTNET_CHAIN_ID, ADMIN)
}

/// What the mock chain saw, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Sent {
        signer: &'static str,
        to: Address,
        value: U256,
        data: Bytes,
        tx_hash: TxHash,
    },
    Confirmed {
        signer: &'static str,
        tx_hash: TxHash,
        confirmations: u64,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    /// Sent transactions only
    pub fn sent(&self) -> Vec<(&'static str, Address, U256, Bytes)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Sent {
                    signer,
                    to,
                    value,
                    data,
                    ..
                } => Some((signer, to, value, data)),
                Event::Confirmed { .. } => None,
            })
            .collect()
    }

    fn data_of(&self, tx_hash: TxHash) -> Option<Bytes> {
        self.events().into_iter().find_map(|event| match event {
            Event::Sent {
                tx_hash: hash,
                data,
                ..
            } if hash == tx_hash => Some(data),
            _ => None,
        })
    }
}

pub struct MockSigner {
    name: &'static str,
    address: Address,
    journal: Journal,
    nonce: AtomicU64,
    fail_selector: Option<[u8; 4]>,
    fail_transfers: bool,
    revert_selector: Option<[u8; 4]>,
    hang_receipts: bool,
    on_confirm_points: Option<(watch::Sender<u32>, u32)>,
}

impl MockSigner {
    pub fn new(name: &'static str, address: Address, journal: Journal) -> Self {
        Self {
            name,
            address,
            journal,
            nonce: AtomicU64::new(0),
            fail_selector: None,
            fail_transfers: false,
            revert_selector: None,
            hang_receipts: false,
            on_confirm_points: None,
        }
    }

    pub fn user(journal: &Journal) -> Self {
        Self::new("user", USER, journal.clone())
    }

    pub fn admin(journal: &Journal) -> Self {
        Self::new("admin", ADMIN, journal.clone())
    }

    /// Reject any call whose calldata starts with `selector`
    pub fn failing_on(mut self, selector: [u8; 4]) -> Self {
        self.fail_selector = Some(selector);
        self
    }

    pub fn failing_transfers(mut self) -> Self {
        self.fail_transfers = true;
        self
    }

    pub fn reverting_on(mut self, selector: [u8; 4]) -> Self {
        self.revert_selector = Some(selector);
        self
    }

    /// Publish a new quiz result while waiting for a receipt
    pub fn updating_points_on_confirm(mut self, points: watch::Sender<u32>, value: u32) -> Self {
        self.on_confirm_points = Some((points, value));
        self
    }

    /// Receipts never arrive
    pub fn hanging(mut self) -> Self {
        self.hang_receipts = true;
        self
    }
}

fn has_selector(data: &[u8], selector: Option<[u8; 4]>) -> bool {
    selector.is_some_and(|selector| data.starts_with(&selector))
}

impl TransactionSigner for MockSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_and_send(&self, tx: TxRequest) -> Result<TxHash> {
        if has_selector(&tx.data, self.fail_selector) {
            eyre::bail!("user rejected the request");
        }
        if self.fail_transfers && tx.data.is_empty() {
            eyre::bail!("insufficient funds for transfer");
        }

        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let tx_hash = keccak256(format!("{}-{}", self.name, nonce));
        self.journal.push(Event::Sent {
            signer: self.name,
            to: tx.to,
            value: tx.value,
            data: tx.data,
            tx_hash,
        });
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash, confirmations: u64) -> Result<TxReceipt> {
        if self.hang_receipts {
            std::future::pending::<()>().await;
        }

        if let Some((points, value)) = &self.on_confirm_points {
            points.send_replace(*value);
        }

        let data = self.journal.data_of(tx_hash).unwrap_or_default();
        self.journal.push(Event::Confirmed {
            signer: self.name,
            tx_hash,
            confirmations,
        });
        Ok(TxReceipt {
            tx_hash,
            block_number: 100,
            success: !has_selector(&data, self.revert_selector),
        })
    }

    async fn get_balance(&self) -> Result<U256> {
        Ok(U256::from(10u64).pow(U256::from(18u64)))
    }
}

pub struct MockReferral {
    pub submitted: Arc<Mutex<Vec<(TxHash, u64)>>>,
    code: u16,
    unreachable: bool,
}

impl MockReferral {
    pub fn new(code: u16) -> Self {
        Self {
            submitted: Arc::default(),
            code,
            unreachable: false,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::new(0)
        }
    }

    pub fn submissions(&self) -> Vec<(TxHash, u64)> {
        self.submitted.lock().unwrap().clone()
    }
}

impl ReferralService for MockReferral {
    fn data_suffix(&self, consumer: Address, providers: &[Address]) -> Result<Bytes> {
        encode_data_suffix(consumer, providers)
    }

    async fn submit_referral(&self, tx_hash: TxHash, chain_id: u64) -> Result<ReferralStatus> {
        if self.unreachable {
            eyre::bail!("connection refused");
        }
        self.submitted.lock().unwrap().push((tx_hash, chain_id));
        Ok(ReferralStatus { code: self.code })
    }
}

#[derive(Clone, Default)]
pub struct MockBroadcaster {
    pub posts: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl MockBroadcaster {
    pub fn posts(&self) -> Vec<(String, Vec<String>)> {
        self.posts.lock().unwrap().clone()
    }
}

impl SocialBroadcaster for MockBroadcaster {
    async fn publish(&self, text: &str, embeds: &[String]) -> Result<String> {
        let mut posts = self.posts.lock().unwrap();
        posts.push((text.to_string(), embeds.to_vec()));
        Ok(format!("0xcast{}", posts.len()))
    }
}

#[derive(Clone)]
pub struct MockReader {
    week_id: u64,
    pub refetches: Arc<AtomicUsize>,
}

impl MockReader {
    pub fn at_week(week_id: u64) -> Self {
        Self {
            week_id,
            refetches: Arc::default(),
        }
    }

    pub fn refetch_count(&self) -> usize {
        self.refetches.load(Ordering::SeqCst)
    }
}

impl StateReader for MockReader {
    async fn refetch(&self) -> Result<ReadSnapshot> {
        self.refetches.fetch_add(1, Ordering::SeqCst);
        Ok(ReadSnapshot {
            week_id: self.week_id,
            block_number: 100,
        })
    }
}
