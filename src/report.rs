// src/report.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::shared::utils::format_sol;

/// Per-validator line of the final report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorDetails {
    pub vote_account: String,
    /// Stake delegated by the tracked authority, in SOL
    pub delegated_stake: f64,
    pub sandwich_count: usize,
}

/// Validators that led sandwiched blocks and hold material stake from the
/// tracked authority
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorAnalysis {
    pub validator_details: BTreeMap<String, ValidatorDetails>,
    pub total_sandwiches: usize,
    pub total_activated_stake: f64,
    pub total_delegated_stake: f64,

    // Metadata
    pub stake_authority: String,
    pub generated_at: DateTime<Utc>,
}

impl ValidatorAnalysis {
    pub fn new(stake_authority: impl Into<String>) -> Self {
        Self {
            validator_details: BTreeMap::new(),
            total_sandwiches: 0,
            total_activated_stake: 0.0,
            total_delegated_stake: 0.0,
            stake_authority: stake_authority.into(),
            generated_at: Utc::now(),
        }
    }

    /// Add a validator and fold it into the run totals
    pub fn include(&mut self, identity: &str, details: ValidatorDetails, activated_stake: f64) {
        self.total_sandwiches += details.sandwich_count;
        self.total_activated_stake += activated_stake;
        self.total_delegated_stake += details.delegated_stake;
        self.validator_details.insert(identity.to_string(), details);
    }

    pub fn log_summary(&self) {
        info!("Analysis Summary:");
        info!("  Validators:            {}", self.validator_details.len());
        info!("  Total sandwiches:      {}", self.total_sandwiches);
        info!("  Total activated stake: {} SOL", format_sol(self.total_activated_stake));
        info!(
            "  Total delegated by {}: {} SOL",
            self.stake_authority,
            format_sol(self.total_delegated_stake)
        );
    }
}
