//! Per-transaction balance flow of the monitored pool authority

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::flow_index::{FlowIndex, FlowKey, FlowObservation};
use crate::domain::traits::LedgerSource;
use crate::shared::errors::AppError;
use crate::shared::types::{TokenBalance, TransactionEffects};

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Accounts identifying the exchange pool whose trades are examined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredPool {
    /// AMM program that must appear in a transaction's account keys
    pub program: String,
    /// Authority owning the pool's token vaults
    pub authority: String,
    /// Quote-side mint, ignored when picking the traded asset
    pub wrapped_native_mint: String,
}

/// Outcome of inspecting one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowDecision {
    Record(FlowKey),
    NotPoolTrade,
    Failed,
    MissingLeg,
    ZeroDelta,
}

/// Decide where, if anywhere, a transaction lands in the flow index
pub fn classify(effects: &TransactionEffects, pool: &MonitoredPool) -> Result<FlowDecision, AppError> {
    if !effects.account_keys.iter().any(|key| key == &pool.program) {
        return Ok(FlowDecision::NotPoolTrade);
    }
    if effects.failed {
        return Ok(FlowDecision::Failed);
    }

    let pre = effects
        .pre_token_balances
        .iter()
        .find(|b| b.mint != pool.wrapped_native_mint && b.is_owned_by(&pool.authority));
    let Some(pre) = pre else {
        return Ok(FlowDecision::MissingLeg);
    };
    let post = effects
        .post_token_balances
        .iter()
        .find(|b| b.mint == pre.mint && b.is_owned_by(&pool.authority));
    let Some(post) = post else {
        return Ok(FlowDecision::MissingLeg);
    };

    let raw = |balance: &TokenBalance| {
        balance
            .raw_amount()
            .map_err(|e| AppError::ParseError(format!("token amount {:?}: {}", balance.amount, e)))
    };
    let magnitude = raw(pre)?.abs_diff(raw(post)?);
    if magnitude == 0 {
        return Ok(FlowDecision::ZeroDelta);
    }

    Ok(FlowDecision::Record(FlowKey {
        slot: effects.slot,
        mint: pre.mint.clone(),
        magnitude,
    }))
}

/// Fetches transaction effects in bounded batches and builds the flow index
pub struct BalanceFlowExtractor {
    ledger: Arc<dyn LedgerSource>,
    pool: MonitoredPool,
    batch_size: usize,
}

impl BalanceFlowExtractor {
    pub fn new(ledger: Arc<dyn LedgerSource>, pool: MonitoredPool, batch_size: usize) -> Self {
        Self {
            ledger,
            pool,
            batch_size: batch_size.max(1),
        }
    }

    /// Build the flow index for `signatures`.
    ///
    /// At most `batch_size` fetches are in flight; the next batch starts once
    /// every fetch of the current one resolved. Each batch's observations are
    /// merged serially afterwards, so no lock guards the index.
    pub async fn extract(&self, signatures: &[String]) -> FlowIndex {
        let mut index = FlowIndex::new();
        let total = signatures.len();
        let mut processed = 0;

        for chunk in signatures.chunks(self.batch_size) {
            let observations = join_all(chunk.iter().map(|signature| self.observe(signature))).await;
            index.merge(observations.into_iter().flatten());

            processed += chunk.len();
            info!("Processed {}/{} transactions", processed, total);
        }

        debug!(
            "Flow index holds {} observations in {} buckets",
            index.observation_count(),
            index.len()
        );
        index
    }

    async fn observe(&self, signature: &str) -> Option<FlowObservation> {
        match self.inspect(signature).await {
            Ok(FlowDecision::Record(key)) => Some(FlowObservation {
                key,
                signature: signature.to_string(),
            }),
            Ok(decision) => {
                debug!("Skipping {}: {:?}", signature, decision);
                None
            }
            Err(e) => {
                warn!("Error processing transaction {}: {}", signature, e);
                None
            }
        }
    }

    async fn inspect(&self, signature: &str) -> Result<FlowDecision, AppError> {
        let effects = self
            .ledger
            .transaction_effects(signature)
            .await?
            .ok_or_else(|| AppError::BlockchainError("transaction not found".to_string()))?;
        classify(&effects, &self.pool)
    }
}
