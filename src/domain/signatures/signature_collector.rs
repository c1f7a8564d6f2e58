//! Backward pagination over an account's transaction history

use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::traits::LedgerSource;
use crate::shared::errors::AppError;
use crate::shared::types::SignatureSlots;

pub const DEFAULT_MAX_SIGNATURES: usize = 100;

/// Builds the bounded signature universe examined by the extractor
pub struct SignatureCollector {
    ledger: Arc<dyn LedgerSource>,
}

impl SignatureCollector {
    pub fn new(ledger: Arc<dyn LedgerSource>) -> Self {
        Self { ledger }
    }

    /// Collect up to `max_count` successful signatures of `target`, newest first.
    ///
    /// Failed transactions are skipped. A transport error aborts the whole
    /// collection.
    pub async fn collect(&self, target: &str, max_count: usize) -> Result<SignatureSlots, AppError> {
        let mut collected = SignatureSlots::new();
        if max_count == 0 {
            return Ok(collected);
        }

        info!("Collecting up to {} transactions for {}", max_count, target);
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .ledger
                .signatures_for_address(target, cursor.as_deref())
                .await?;

            let Some(oldest) = page.last() else {
                debug!("History exhausted");
                break;
            };
            cursor = Some(oldest.signature.clone());

            for entry in page.iter().filter(|entry| !entry.failed) {
                collected.insert(entry.signature.clone(), entry.slot);
                if collected.len() >= max_count {
                    break;
                }
            }

            info!(
                "Page ending at {} (slot {}), collected {}",
                oldest.signature,
                oldest.slot,
                collected.len()
            );

            if collected.len() >= max_count {
                break;
            }
        }

        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testing::{status, MockLedger};

    fn paged_ledger() -> MockLedger {
        MockLedger {
            pages: vec![
                vec![status("s1", 30, false), status("s2", 30, true), status("s3", 29, false)],
                vec![status("s4", 28, false), status("s5", 27, false)],
                vec![status("s6", 20, true), status("s7", 19, false)],
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_collects_all_successful_until_history_ends() {
        let ledger = Arc::new(paged_ledger());
        let collector = SignatureCollector::new(ledger.clone());

        let collected = collector.collect("Sandwicher", 100).await.unwrap();

        let signatures: Vec<&str> = collected.keys().map(String::as_str).collect();
        assert_eq!(signatures, vec!["s1", "s3", "s4", "s5", "s7"]);
        assert_eq!(collected["s7"], 19);
        // three data pages plus the empty terminating page
        assert_eq!(ledger.page_requests(), 4);
    }

    #[tokio::test]
    async fn test_stops_at_cap_without_fetching_more_pages() {
        let ledger = Arc::new(paged_ledger());
        let collector = SignatureCollector::new(ledger.clone());

        let collected = collector.collect("Sandwicher", 3).await.unwrap();

        assert_eq!(collected.len(), 3);
        assert!(collected.contains_key("s1"));
        assert!(collected.contains_key("s3"));
        assert!(collected.contains_key("s4"));
        assert_eq!(ledger.page_requests(), 2);
    }

    #[tokio::test]
    async fn test_zero_cap_makes_no_requests() {
        let ledger = Arc::new(paged_ledger());
        let collector = SignatureCollector::new(ledger.clone());

        let collected = collector.collect("Sandwicher", 0).await.unwrap();

        assert!(collected.is_empty());
        assert_eq!(ledger.page_requests(), 0);
    }

    #[tokio::test]
    async fn test_transport_error_aborts_collection() {
        let ledger = Arc::new(MockLedger {
            pages: vec![vec![status("s1", 30, false)]],
            ..Default::default()
        });
        let broken = Arc::new(BrokenPaging { inner: ledger });
        let collector = SignatureCollector::new(broken);

        let result = collector.collect("Sandwicher", 10).await;
        assert!(matches!(result, Err(AppError::BlockchainError(_))));
    }

    struct BrokenPaging {
        inner: Arc<MockLedger>,
    }

    #[async_trait::async_trait]
    impl LedgerSource for BrokenPaging {
        async fn signatures_for_address(
            &self,
            address: &str,
            before: Option<&str>,
        ) -> Result<Vec<crate::shared::types::SignatureStatus>, AppError> {
            if before.is_some() {
                return Err(AppError::BlockchainError("429 Too Many Requests".to_string()));
            }
            self.inner.signatures_for_address(address, before).await
        }

        async fn transaction_effects(
            &self,
            signature: &str,
        ) -> Result<Option<crate::shared::types::TransactionEffects>, AppError> {
            self.inner.transaction_effects(signature).await
        }

        async fn leader_schedule(&self, slot: u64) -> Result<crate::shared::types::SlotLeaderMap, AppError> {
            self.inner.leader_schedule(slot).await
        }
    }
}
