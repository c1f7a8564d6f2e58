//! In-memory ledger and registry used by the unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::domain::traits::{LedgerSource, StakeRegistry};
use crate::shared::errors::AppError;
use crate::shared::types::{
    SignatureStatus, SlotLeaderMap, StakeRecord, TokenBalance, TransactionEffects, ValidatorInfo,
};

pub const AMM_PROGRAM: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";
pub const AMM_AUTHORITY: &str = "5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1";
pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";

#[derive(Default)]
pub struct MockLedger {
    pub pages: Vec<Vec<SignatureStatus>>,
    pub transactions: HashMap<String, TransactionEffects>,
    pub broken: Vec<String>,
    /// Epoch length used to answer leader schedule queries; 0 fails them
    pub epoch_len: u64,
    pub leaders: HashMap<u64, String>,
    pub page_requests: AtomicUsize,
    pub schedule_requests: Mutex<Vec<u64>>,
}

impl MockLedger {
    pub fn page_requests(&self) -> usize {
        self.page_requests.load(Ordering::SeqCst)
    }

    /// A successful pool swap moving `pre - post` of `mint` out of the authority
    pub fn add_swap(&mut self, signature: &str, slot: u64, mint: &str, pre: u64, post: u64) {
        self.transactions.insert(signature.to_string(), swap(slot, mint, pre, post));
    }
}

pub fn status(signature: &str, slot: u64, failed: bool) -> SignatureStatus {
    SignatureStatus {
        signature: signature.to_string(),
        slot,
        failed,
    }
}

pub fn balance(mint: &str, owner: &str, amount: u64) -> TokenBalance {
    TokenBalance {
        mint: mint.to_string(),
        owner: Some(owner.to_string()),
        amount: amount.to_string(),
    }
}

pub fn swap(slot: u64, mint: &str, pre: u64, post: u64) -> TransactionEffects {
    TransactionEffects {
        slot,
        account_keys: vec!["Trader1111111111111111111111111111111111111".to_string(), AMM_PROGRAM.to_string()],
        pre_token_balances: vec![
            balance(WSOL_MINT, AMM_AUTHORITY, 5_000),
            balance(mint, AMM_AUTHORITY, pre),
        ],
        post_token_balances: vec![
            balance(WSOL_MINT, AMM_AUTHORITY, 6_000),
            balance(mint, AMM_AUTHORITY, post),
        ],
        failed: false,
    }
}

#[async_trait]
impl LedgerSource for MockLedger {
    async fn signatures_for_address(
        &self,
        _address: &str,
        before: Option<&str>,
    ) -> Result<Vec<SignatureStatus>, AppError> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        let index = match before {
            None => 0,
            Some(cursor) => self
                .pages
                .iter()
                .position(|page| page.last().map(|s| s.signature.as_str()) == Some(cursor))
                .map(|i| i + 1)
                .ok_or_else(|| AppError::BlockchainError(format!("unknown cursor {}", cursor)))?,
        };
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }

    async fn transaction_effects(&self, signature: &str) -> Result<Option<TransactionEffects>, AppError> {
        if self.broken.iter().any(|s| s == signature) {
            return Err(AppError::BlockchainError("connection reset".to_string()));
        }
        Ok(self.transactions.get(signature).cloned())
    }

    async fn leader_schedule(&self, slot: u64) -> Result<SlotLeaderMap, AppError> {
        if self.epoch_len == 0 {
            return Err(AppError::BlockchainError("leader schedule unavailable".to_string()));
        }
        self.schedule_requests.lock().unwrap().push(slot);
        let first = slot - slot % self.epoch_len;
        Ok((first..first + self.epoch_len)
            .filter_map(|s| self.leaders.get(&s).map(|leader| (s, leader.clone())))
            .collect())
    }
}

#[derive(Default)]
pub struct MockRegistry {
    pub validators: Vec<ValidatorInfo>,
    pub stakes: HashMap<String, Vec<StakeRecord>>,
    pub failing_votes: Vec<String>,
    pub stake_requests: AtomicUsize,
}

#[async_trait]
impl StakeRegistry for MockRegistry {
    async fn validator_stakes(&self, vote_account: &str) -> Result<Vec<StakeRecord>, AppError> {
        self.stake_requests.fetch_add(1, Ordering::SeqCst);
        if self.failing_votes.iter().any(|v| v == vote_account) {
            return Err(AppError::RegistryError("503 Service Unavailable".to_string()));
        }
        Ok(self.stakes.get(vote_account).cloned().unwrap_or_default())
    }

    async fn validators_by_activated_stake(&self) -> Result<Vec<ValidatorInfo>, AppError> {
        Ok(self.validators.clone())
    }
}
