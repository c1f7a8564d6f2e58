use async_trait::async_trait;

use crate::shared::errors::AppError;
use crate::shared::types::{
    SignatureStatus, SlotLeaderMap, StakeRecord, TransactionEffects, ValidatorInfo,
};

/// Block-data transport the detection engine reads from
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// One reverse-chronological page of signatures touching `address`,
    /// strictly older than `before` when given
    async fn signatures_for_address(
        &self,
        address: &str,
        before: Option<&str>,
    ) -> Result<Vec<SignatureStatus>, AppError>;

    /// Effects of a confirmed transaction; `None` if the node does not know it
    async fn transaction_effects(&self, signature: &str) -> Result<Option<TransactionEffects>, AppError>;

    /// Leader schedule of the epoch containing `slot`, keyed by absolute slot
    async fn leader_schedule(&self, slot: u64) -> Result<SlotLeaderMap, AppError>;
}

/// External registry of validators and the stake accounts behind them
#[async_trait]
pub trait StakeRegistry: Send + Sync {
    /// All stake accounts delegated to a vote account
    async fn validator_stakes(&self, vote_account: &str) -> Result<Vec<StakeRecord>, AppError>;

    /// Validator directory ordered by activated stake, largest first
    async fn validators_by_activated_stake(&self) -> Result<Vec<ValidatorInfo>, AppError>;
}
