//! Cross-referencing implicated validators with delegated stake

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::traits::StakeRegistry;
use crate::report::{ValidatorAnalysis, ValidatorDetails};
use crate::shared::errors::AppError;
use crate::shared::pacing::RequestPacer;
use crate::shared::utils::{format_sol, lamports_to_sol};

pub const DEFAULT_MIN_DELEGATED_STAKE: f64 = 1.0;

/// Stake authority and materiality threshold applied to the report
#[derive(Debug, Clone)]
pub struct DelegationFilter {
    pub stake_authority: String,
    /// Validators below this many SOL from the authority are dropped
    pub min_delegated_stake: f64,
}

pub struct StakeCorrelator {
    registry: Arc<dyn StakeRegistry>,
    pacer: Arc<dyn RequestPacer>,
    filter: DelegationFilter,
}

impl StakeCorrelator {
    pub fn new(registry: Arc<dyn StakeRegistry>, pacer: Arc<dyn RequestPacer>, filter: DelegationFilter) -> Self {
        Self { registry, pacer, filter }
    }

    /// SOL delegated to `vote_account` by `stake_authority`; a registry
    /// failure is logged and counts as no delegation
    pub async fn lookup_delegated_stake(&self, vote_account: &str, stake_authority: &str) -> f64 {
        match self.registry.validator_stakes(vote_account).await {
            Ok(stakes) => {
                let lamports: u64 = stakes
                    .iter()
                    .filter(|stake| stake.stake_authority == stake_authority)
                    .map(|stake| stake.active_stake)
                    .sum();
                lamports_to_sol(lamports)
            }
            Err(e) => {
                warn!("Error checking stake for vote account {}: {}", vote_account, e);
                0.0
            }
        }
    }

    /// Build the report for validators with at least one sandwiched block.
    ///
    /// Fails only if the validator directory itself is unavailable.
    pub async fn analyze(&self, sandwich_counts: &BTreeMap<String, usize>) -> Result<ValidatorAnalysis, AppError> {
        let validators = self.registry.validators_by_activated_stake().await?;
        let mut analysis = ValidatorAnalysis::new(self.filter.stake_authority.clone());
        let mut first_lookup = true;

        let implicated = validators.iter().filter_map(|validator| {
            sandwich_counts
                .get(&validator.identity)
                .filter(|count| **count > 0)
                .map(|count| (validator, *count))
        });

        for (validator, sandwich_count) in implicated {
            if !first_lookup {
                self.pacer.pause().await;
            }
            first_lookup = false;

            let delegated_stake = self
                .lookup_delegated_stake(&validator.vote_identity, &self.filter.stake_authority)
                .await;
            if delegated_stake < self.filter.min_delegated_stake {
                debug!(
                    "Dropping {}: {} SOL delegated is below threshold",
                    validator.identity, delegated_stake
                );
                continue;
            }

            info!(
                "{} {} {} {}",
                validator.identity,
                validator.vote_identity,
                format_sol(delegated_stake),
                sandwich_count
            );
            analysis.include(
                &validator.identity,
                ValidatorDetails {
                    vote_account: validator.vote_identity.clone(),
                    delegated_stake,
                    sandwich_count,
                },
                validator.activated_stake,
            );
        }

        for identity in sandwich_counts.keys() {
            if !validators.iter().any(|v| &v.identity == identity) {
                warn!("Leader {} is missing from the validator directory", identity);
            }
        }

        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testing::MockRegistry;
    use crate::shared::pacing::NoDelay;
    use crate::shared::types::{StakeRecord, ValidatorInfo};
    use std::sync::atomic::Ordering;

    const AUTH: &str = "6iQKfEyhr3bZMotVkW6beNZz5CPAkiwvgV2CTje9pVSS";

    fn validator(identity: &str, vote: &str, activated: f64) -> ValidatorInfo {
        ValidatorInfo {
            identity: identity.to_string(),
            vote_identity: vote.to_string(),
            activated_stake: activated,
        }
    }

    fn stake(authority: &str, lamports: u64) -> StakeRecord {
        StakeRecord { stake_authority: authority.to_string(), active_stake: lamports }
    }

    fn correlator(registry: Arc<MockRegistry>) -> StakeCorrelator {
        StakeCorrelator::new(
            registry,
            Arc::new(NoDelay),
            DelegationFilter {
                stake_authority: AUTH.to_string(),
                min_delegated_stake: DEFAULT_MIN_DELEGATED_STAKE,
            },
        )
    }

    fn counts(entries: &[(&str, usize)]) -> BTreeMap<String, usize> {
        entries.iter().map(|(id, n)| (id.to_string(), *n)).collect()
    }

    #[tokio::test]
    async fn test_lookup_sums_only_tracked_authority() {
        let mut registry = MockRegistry::default();
        registry.stakes.insert(
            "VoteA".to_string(),
            vec![stake(AUTH, 1_500_000_000), stake("Other", 9_000_000_000), stake(AUTH, 500_000_000)],
        );
        let correlator = correlator(Arc::new(registry));

        assert_eq!(correlator.lookup_delegated_stake("VoteA", AUTH).await, 2.0);
        assert_eq!(correlator.lookup_delegated_stake("VoteZ", AUTH).await, 0.0);
    }

    #[tokio::test]
    async fn test_materiality_threshold_boundary() {
        let mut registry = MockRegistry::default();
        registry.validators = vec![validator("Below", "VoteBelow", 100.0), validator("Exact", "VoteExact", 200.0)];
        registry.stakes.insert("VoteBelow".to_string(), vec![stake(AUTH, 999_999_000)]);
        registry.stakes.insert("VoteExact".to_string(), vec![stake(AUTH, 1_000_000_000)]);
        let correlator = correlator(Arc::new(registry));

        let analysis = correlator.analyze(&counts(&[("Below", 4), ("Exact", 2)])).await.unwrap();

        assert!(!analysis.validator_details.contains_key("Below"));
        assert_eq!(analysis.validator_details["Exact"].delegated_stake, 1.0);
        assert_eq!(analysis.total_sandwiches, 2);
        assert_eq!(analysis.total_activated_stake, 200.0);
        assert_eq!(analysis.total_delegated_stake, 1.0);
    }

    #[tokio::test]
    async fn test_only_implicated_validators_are_looked_up() {
        let mut registry = MockRegistry::default();
        registry.validators = vec![
            validator("Big", "VoteBig", 1e6),
            validator("Leader", "VoteLeader", 5e5),
            validator("Idle", "VoteIdle", 1e5),
        ];
        registry.stakes.insert("VoteLeader".to_string(), vec![stake(AUTH, 3_000_000_000)]);
        registry.stakes.insert("VoteIdle".to_string(), vec![stake(AUTH, 3_000_000_000)]);
        let registry = Arc::new(registry);
        let correlator = correlator(registry.clone());

        let analysis = correlator.analyze(&counts(&[("Leader", 3), ("Idle", 0)])).await.unwrap();

        assert_eq!(registry.stake_requests.load(Ordering::SeqCst), 1);
        assert_eq!(analysis.validator_details.len(), 1);
        assert_eq!(
            analysis.validator_details["Leader"],
            ValidatorDetails { vote_account: "VoteLeader".to_string(), delegated_stake: 3.0, sandwich_count: 3 }
        );
    }

    #[tokio::test]
    async fn test_registry_failure_is_isolated_per_validator() {
        let mut registry = MockRegistry::default();
        registry.validators = vec![validator("Flaky", "VoteFlaky", 10.0), validator("Good", "VoteGood", 20.0)];
        registry.failing_votes.push("VoteFlaky".to_string());
        registry.stakes.insert("VoteGood".to_string(), vec![stake(AUTH, 7_000_000_000)]);
        let correlator = correlator(Arc::new(registry));

        let analysis = correlator.analyze(&counts(&[("Flaky", 1), ("Good", 1)])).await.unwrap();

        assert_eq!(analysis.validator_details.len(), 1);
        assert_eq!(analysis.total_delegated_stake, 7.0);
    }
}
