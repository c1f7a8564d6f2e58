//! Solana RPC client for reading transaction history and leader schedules

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_client::rpc_response::RpcLeaderSchedule;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiMessage, UiTransactionEncoding,
    UiTransactionTokenBalance,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::domain::traits::LedgerSource;
use crate::shared::errors::AppError;
use crate::shared::types::{SignatureStatus, SlotLeaderMap, TokenBalance, TransactionEffects};

/// Solana RPC client wrapper
pub struct SolanaRpcClient {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl SolanaRpcClient {
    /// Create new RPC client
    pub fn new(rpc_url: String, commitment: CommitmentConfig, timeout: Duration) -> Self {
        Self {
            client: RpcClient::new_with_timeout_and_commitment(rpc_url, timeout, commitment),
            commitment,
        }
    }
}

#[async_trait]
impl LedgerSource for SolanaRpcClient {
    async fn signatures_for_address(
        &self,
        address: &str,
        before: Option<&str>,
    ) -> Result<Vec<SignatureStatus>, AppError> {
        let address = Pubkey::from_str(address)
            .map_err(|e| AppError::ParseError(format!("Invalid address {}: {}", address, e)))?;
        let before = before.map(parse_signature).transpose()?;

        let config = GetConfirmedSignaturesForAddress2Config {
            before,
            until: None,
            limit: None,
            commitment: Some(self.commitment),
        };
        let page = self
            .client
            .get_signatures_for_address_with_config(&address, config)
            .await
            .map_err(|e| AppError::BlockchainError(format!("Failed to get signatures: {}", e)))?;

        Ok(page
            .into_iter()
            .map(|entry| SignatureStatus {
                signature: entry.signature,
                slot: entry.slot,
                failed: entry.err.is_some(),
            })
            .collect())
    }

    async fn transaction_effects(&self, signature: &str) -> Result<Option<TransactionEffects>, AppError> {
        let signature = parse_signature(signature)?;
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Base64),
            commitment: Some(self.commitment),
            max_supported_transaction_version: Some(0),
        };

        let transaction = self
            .client
            .get_transaction_with_config(&signature, config)
            .await
            .map_err(|e| AppError::BlockchainError(format!("Failed to get transaction: {}", e)))?;

        effects_from_encoded(transaction).map(Some)
    }

    async fn leader_schedule(&self, slot: u64) -> Result<SlotLeaderMap, AppError> {
        let schedule = self
            .client
            .get_leader_schedule_with_commitment(Some(slot), self.commitment)
            .await
            .map_err(|e| AppError::BlockchainError(format!("Failed to get leader schedule: {}", e)))?
            .ok_or_else(|| AppError::BlockchainError(format!("No leader schedule for slot {}", slot)))?;

        let epoch_schedule = self
            .client
            .get_epoch_schedule()
            .await
            .map_err(|e| AppError::BlockchainError(format!("Failed to get epoch schedule: {}", e)))?;
        let first_slot = epoch_schedule.get_first_slot_in_epoch(epoch_schedule.get_epoch(slot));
        debug!("Epoch of slot {} starts at {}", slot, first_slot);

        Ok(absolute_leader_slots(first_slot, schedule))
    }
}

fn parse_signature(signature: &str) -> Result<Signature, AppError> {
    Signature::from_str(signature)
        .map_err(|e| AppError::ParseError(format!("Invalid signature {}: {}", signature, e)))
}

/// Leader schedules index slots relative to the epoch start
pub fn absolute_leader_slots(first_slot_in_epoch: u64, schedule: RpcLeaderSchedule) -> SlotLeaderMap {
    let mut leaders = SlotLeaderMap::new();
    for (identity, indices) in schedule {
        for index in indices {
            leaders.insert(first_slot_in_epoch + index as u64, identity.clone());
        }
    }
    leaders
}

fn effects_from_encoded(
    transaction: EncodedConfirmedTransactionWithStatusMeta,
) -> Result<TransactionEffects, AppError> {
    let EncodedConfirmedTransactionWithStatusMeta { slot, transaction, .. } = transaction;

    let account_keys = account_keys(&transaction.transaction)?;
    let meta = transaction
        .meta
        .ok_or_else(|| AppError::ParseError("Transaction has no status meta".to_string()))?;

    Ok(TransactionEffects {
        slot,
        account_keys,
        pre_token_balances: token_balances(meta.pre_token_balances),
        post_token_balances: token_balances(meta.post_token_balances),
        failed: meta.err.is_some(),
    })
}

/// Static account keys; lookup-table addresses are not resolved
fn account_keys(transaction: &EncodedTransaction) -> Result<Vec<String>, AppError> {
    if let EncodedTransaction::Json(ui) = transaction {
        return Ok(match &ui.message {
            UiMessage::Raw(raw) => raw.account_keys.clone(),
            UiMessage::Parsed(parsed) => parsed.account_keys.iter().map(|k| k.pubkey.clone()).collect(),
        });
    }

    let decoded = transaction
        .decode()
        .ok_or_else(|| AppError::ParseError("Undecodable transaction payload".to_string()))?;
    Ok(decoded
        .message
        .static_account_keys()
        .iter()
        .map(Pubkey::to_string)
        .collect())
}

fn token_balances(balances: OptionSerializer<Vec<UiTransactionTokenBalance>>) -> Vec<TokenBalance> {
    Option::<Vec<UiTransactionTokenBalance>>::from(balances)
        .unwrap_or_default()
        .into_iter()
        .map(|balance| TokenBalance {
            mint: balance.mint,
            owner: balance.owner.into(),
            amount: balance.ui_token_amount.amount,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_absolute_leader_slots() {
        let mut schedule: RpcLeaderSchedule = HashMap::new();
        schedule.insert("ValidatorA".to_string(), vec![0, 1, 2, 3]);
        schedule.insert("ValidatorB".to_string(), vec![4, 5, 6, 7]);

        let leaders = absolute_leader_slots(432_000, schedule);

        assert_eq!(leaders.len(), 8);
        assert_eq!(leaders[&432_000], "ValidatorA");
        assert_eq!(leaders[&432_007], "ValidatorB");
        assert!(!leaders.contains_key(&7));
    }

    #[test]
    fn test_invalid_signature_is_parse_error() {
        assert!(matches!(parse_signature("not-a-signature"), Err(AppError::ParseError(_))));
    }
}
