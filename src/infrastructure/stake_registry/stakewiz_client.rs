use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::domain::traits::StakeRegistry;
use crate::shared::errors::AppError;
use crate::shared::types::{StakeRecord, ValidatorInfo};

pub const DEFAULT_STAKEWIZ_API: &str = "https://api.stakewiz.com/";

/// Stake account entry of `validator_stakes/{vote}`
#[derive(Debug, Deserialize)]
struct StakewizStake {
    stake_authority: Option<String>,
    /// Lamports; the API sometimes renders large values as floats
    active_stake: Option<serde_json::Number>,
}

/// Exact for integer amounts; floats are truncated and negatives count as zero
fn lamports(amount: &serde_json::Number) -> u64 {
    amount
        .as_u64()
        .or_else(|| amount.as_f64().filter(|v| *v > 0.0).map(|v| v as u64))
        .unwrap_or(0)
}

/// Entry of `validators?sort=-activated_stake`
#[derive(Debug, Deserialize)]
struct StakewizValidator {
    identity: String,
    vote_identity: String,
    #[serde(default)]
    activated_stake: f64,
}

/// Stakewiz HTTP API client
pub struct StakewizClient {
    http_client: Client,
    base_url: String,
}

impl StakewizClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("🔍 Fetching {}", url);

        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::RegistryError(format!(
                "Stakewiz request {} failed with status: {}",
                path,
                response.status()
            )));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl StakeRegistry for StakewizClient {
    async fn validator_stakes(&self, vote_account: &str) -> Result<Vec<StakeRecord>, AppError> {
        let stakes: Vec<StakewizStake> = self
            .get_json(&format!("validator_stakes/{}", vote_account))
            .await?;

        Ok(stakes
            .into_iter()
            .filter_map(|stake| {
                Some(StakeRecord {
                    stake_authority: stake.stake_authority?,
                    active_stake: stake.active_stake.as_ref().map_or(0, lamports),
                })
            })
            .collect())
    }

    async fn validators_by_activated_stake(&self) -> Result<Vec<ValidatorInfo>, AppError> {
        let validators: Vec<StakewizValidator> = self.get_json("validators?sort=-activated_stake").await?;

        Ok(validators
            .into_iter()
            .map(|v| ValidatorInfo {
                identity: v.identity,
                vote_identity: v.vote_identity,
                activated_stake: v.activated_stake,
            })
            .collect())
    }
}
