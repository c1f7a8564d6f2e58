//! Common types used across the application

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Collected signature universe: signature -> slot it landed in
pub type SignatureSlots = BTreeMap<String, u64>;

/// Absolute slot -> validator identity that produced it
pub type SlotLeaderMap = BTreeMap<u64, String>;

/// One entry of a reverse-chronological "signatures for address" page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureStatus {
    pub signature: String,
    pub slot: u64,
    /// The transaction landed but its execution failed
    pub failed: bool,
}

/// Token balance snapshot as reported in transaction meta
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
    pub mint: String,
    pub owner: Option<String>,
    /// Raw amount in base units, as the RPC returns it
    pub amount: String,
}

impl TokenBalance {
    pub fn raw_amount(&self) -> Result<u64, std::num::ParseIntError> {
        self.amount.parse::<u64>()
    }

    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.owner.as_deref() == Some(owner)
    }
}

/// The parts of a confirmed transaction the extractor looks at
#[derive(Debug, Clone, Default)]
pub struct TransactionEffects {
    pub slot: u64,
    pub account_keys: Vec<String>,
    pub pre_token_balances: Vec<TokenBalance>,
    pub post_token_balances: Vec<TokenBalance>,
    pub failed: bool,
}

/// Stake account backing a vote account, as the registry reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeRecord {
    pub stake_authority: String,
    /// Active stake in lamports
    pub active_stake: u64,
}

/// Validator directory entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorInfo {
    pub identity: String,
    pub vote_identity: String,
    /// Total activated stake, in SOL
    pub activated_stake: f64,
}
