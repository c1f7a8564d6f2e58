//! Mapping sandwiched slots to the validators that produced them

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::sandwich::SandwichesBySlot;
use crate::domain::traits::LedgerSource;
use crate::shared::errors::AppError;
use crate::shared::types::SlotLeaderMap;

/// Resolves the leader of every sandwiched slot through the ledger's
/// leader schedule, one request per epoch touched
pub struct LeaderResolver {
    ledger: Arc<dyn LedgerSource>,
}

impl LeaderResolver {
    pub fn new(ledger: Arc<dyn LedgerSource>) -> Self {
        Self { ledger }
    }

    /// Leader map covering the sandwiched range, from its lowest slot onward.
    ///
    /// Fails when a schedule cannot be fetched or a sandwiched slot has no
    /// scheduled leader.
    pub async fn resolve(&self, sandwiches: &SandwichesBySlot) -> Result<SlotLeaderMap, AppError> {
        let (Some(&min_slot), Some(&max_slot)) =
            (sandwiches.keys().next(), sandwiches.keys().next_back())
        else {
            return Ok(SlotLeaderMap::new());
        };

        let mut leaders = SlotLeaderMap::new();
        let mut cursor = min_slot;
        while cursor <= max_slot {
            let schedule = self.ledger.leader_schedule(cursor).await?;
            let last = *schedule.keys().next_back().ok_or_else(|| {
                AppError::BlockchainError(format!("Empty leader schedule for slot {}", cursor))
            })?;
            leaders.extend(schedule.into_iter().filter(|(slot, _)| *slot >= min_slot));

            // Nothing scheduled from the cursor onward in this epoch
            if last < cursor {
                let missing = sandwiches.range(cursor..).next().map_or(cursor, |(slot, _)| *slot);
                return Err(AppError::MissingLeader(missing));
            }
            info!("Fetched leader schedule for slots up to {}", last);
            cursor = last + 1;
        }

        if let Some(missing) = sandwiches.keys().find(|slot| !leaders.contains_key(*slot)) {
            return Err(AppError::MissingLeader(*missing));
        }

        Ok(leaders)
    }
}

/// Brackets per validator identity. Sparse: identities that led no
/// sandwiched slot are absent.
pub fn count_by_leader(
    sandwiches: &SandwichesBySlot,
    leaders: &SlotLeaderMap,
) -> Result<BTreeMap<String, usize>, AppError> {
    let mut counts = BTreeMap::new();

    for (slot, brackets) in sandwiches {
        if brackets.is_empty() {
            continue;
        }
        let leader = leaders.get(slot).ok_or(AppError::MissingLeader(*slot))?;
        *counts.entry(leader.clone()).or_insert(0) += brackets.len();
    }

    Ok(counts)
}
