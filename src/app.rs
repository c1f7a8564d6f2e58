// src/app.rs
use serde::Serialize;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::config::Config;
use crate::domain::flow::{BalanceFlowExtractor, MonitoredPool};
use crate::domain::sandwich::{bracket_count, identify, SandwichesBySlot};
use crate::domain::signatures::SignatureCollector;
use crate::domain::traits::{LedgerSource, StakeRegistry};
use crate::domain::validators::{count_by_leader, DelegationFilter, LeaderResolver, StakeCorrelator};
use crate::infrastructure::blockchain::SolanaRpcClient;
use crate::infrastructure::stake_registry::StakewizClient;
use crate::infrastructure::storage::{
    ArtifactStore, ANALYSIS_FILE, SANDWICHES_FILE, SIGNATURES_FILE, SLOT_LEADERS_FILE,
};
use crate::report::ValidatorAnalysis;
use crate::shared::errors::AppError;
use crate::shared::pacing::{pacer_for_delay, RequestPacer};
use crate::shared::types::{SignatureSlots, SlotLeaderMap};
use crate::shared::utils::validate_pubkey;

/// Values that take precedence over the config file (CLI flags, then env)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub rpc_url: Option<String>,
    pub sandwicher: Option<String>,
    pub max_signatures: Option<usize>,
    pub data_dir: Option<PathBuf>,
}

/// Fully resolved run configuration
#[derive(Debug, Clone, Serialize)]
pub struct AppCfg {
    pub rpc_url: String,
    pub commitment: String,
    pub rpc_timeout_secs: u64,
    pub sandwicher: String,
    pub max_signatures: usize,

    // Monitored pool
    pub amm_program: String,
    pub amm_authority: String,
    pub wrapped_native_mint: String,
    pub batch_size: usize,

    // Stake registry
    pub stake_api_url: String,
    pub stake_authority: String,
    pub min_delegated_stake: f64,
    pub request_delay_ms: u64,
    pub stake_timeout_secs: u64,

    pub data_dir: PathBuf,
}

impl AppCfg {
    /// Layer overrides on top of the file, then validate the result
    pub fn from_config(cfg: Config, overrides: Overrides) -> Result<Self, AppError> {
        let rpc_url = overrides
            .rpc_url
            .or(cfg.rpc.url)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| AppError::ConfigError("RPC URL is required (--rpc-url, RPC_URL or [rpc] url)".to_string()))?;
        let sandwicher = overrides
            .sandwicher
            .or(cfg.target.sandwicher)
            .filter(|address| !address.trim().is_empty())
            .ok_or_else(|| {
                AppError::ConfigError(
                    "Sandwicher address is required (--sandwicher, SANDWICHER_ADDRESS or [target] sandwicher)"
                        .to_string(),
                )
            })?;

        let app_cfg = Self {
            rpc_url,
            commitment: cfg.rpc.commitment,
            rpc_timeout_secs: cfg.rpc.timeout_secs,
            sandwicher,
            max_signatures: overrides.max_signatures.unwrap_or(cfg.target.max_signatures),
            amm_program: cfg.programs.amm_program,
            amm_authority: cfg.programs.amm_authority,
            wrapped_native_mint: cfg.programs.wrapped_native_mint,
            batch_size: cfg.extraction.batch_size,
            stake_api_url: cfg.stake.api_url,
            stake_authority: cfg.stake.stake_authority,
            min_delegated_stake: cfg.stake.min_delegated_stake,
            request_delay_ms: cfg.stake.request_delay_ms,
            stake_timeout_secs: cfg.stake.timeout_secs,
            data_dir: overrides.data_dir.unwrap_or(cfg.output.data_dir),
        };
        app_cfg.validate()?;
        Ok(app_cfg)
    }

    fn validate(&self) -> Result<(), AppError> {
        let addresses = [
            ("sandwicher", &self.sandwicher),
            ("AMM program", &self.amm_program),
            ("AMM authority", &self.amm_authority),
            ("wrapped native mint", &self.wrapped_native_mint),
            ("stake authority", &self.stake_authority),
        ];
        for (label, address) in addresses {
            if let Err(e) = validate_pubkey(label, address) {
                error!("❌ {}", e);
                return Err(e);
            }
        }

        if self.batch_size == 0 {
            return Err(AppError::ConfigError("extraction.batch_size must be at least 1".to_string()));
        }
        if !self.min_delegated_stake.is_finite() || self.min_delegated_stake < 0.0 {
            return Err(AppError::ConfigError(format!(
                "Invalid stake.min_delegated_stake: {}",
                self.min_delegated_stake
            )));
        }
        self.commitment_config()?;
        Ok(())
    }

    pub fn commitment_config(&self) -> Result<CommitmentConfig, AppError> {
        let commitment = CommitmentLevel::from_str(&self.commitment)
            .map_err(|_| AppError::ConfigError(format!("Invalid commitment level: {}", self.commitment)))?;
        Ok(CommitmentConfig { commitment })
    }

    pub fn monitored_pool(&self) -> MonitoredPool {
        MonitoredPool {
            program: self.amm_program.clone(),
            authority: self.amm_authority.clone(),
            wrapped_native_mint: self.wrapped_native_mint.clone(),
        }
    }

    pub fn delegation_filter(&self) -> DelegationFilter {
        DelegationFilter {
            stake_authority: self.stake_authority.clone(),
            min_delegated_stake: self.min_delegated_stake,
        }
    }

    pub fn to_toml(&self) -> Result<String, AppError> {
        toml::to_string_pretty(self).map_err(|e| AppError::ConfigError(format!("Failed to render config: {}", e)))
    }
}

/// The four detection stages, each persisting its output
pub struct Pipeline {
    cfg: AppCfg,
    ledger: Arc<dyn LedgerSource>,
    registry: Arc<dyn StakeRegistry>,
    pacer: Arc<dyn RequestPacer>,
    store: ArtifactStore,
}

impl Pipeline {
    pub fn new(
        cfg: AppCfg,
        ledger: Arc<dyn LedgerSource>,
        registry: Arc<dyn StakeRegistry>,
        pacer: Arc<dyn RequestPacer>,
    ) -> Self {
        let store = ArtifactStore::new(cfg.data_dir.clone());
        Self {
            cfg,
            ledger,
            registry,
            pacer,
            store,
        }
    }

    /// Wire the pipeline to the live RPC endpoint and stake registry
    pub fn connect(cfg: AppCfg) -> Result<Self, AppError> {
        let ledger = SolanaRpcClient::new(
            cfg.rpc_url.clone(),
            cfg.commitment_config()?,
            Duration::from_secs(cfg.rpc_timeout_secs),
        );
        let registry = StakewizClient::new(&cfg.stake_api_url, Duration::from_secs(cfg.stake_timeout_secs))?;
        let pacer = pacer_for_delay(cfg.request_delay_ms);

        Ok(Self::new(cfg, Arc::new(ledger), Arc::new(registry), pacer))
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub async fn collect(&self) -> Result<SignatureSlots, AppError> {
        let collector = SignatureCollector::new(Arc::clone(&self.ledger));
        let signatures = collector.collect(&self.cfg.sandwicher, self.cfg.max_signatures).await?;

        self.store.save(SIGNATURES_FILE, &signatures)?;
        Ok(signatures)
    }

    pub async fn detect(&self, signatures: &SignatureSlots) -> Result<SandwichesBySlot, AppError> {
        let mut ordered: Vec<(&String, &u64)> = signatures.iter().collect();
        ordered.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));
        let ordered: Vec<String> = ordered.into_iter().map(|(signature, _)| signature.clone()).collect();

        info!("Extracting balance flows from {} transactions", ordered.len());
        let extractor = BalanceFlowExtractor::new(Arc::clone(&self.ledger), self.cfg.monitored_pool(), self.cfg.batch_size);
        let index = extractor.extract(&ordered).await;
        let sandwiches = identify(&index);

        info!(
            "Identified {} sandwiches across {} slots",
            bracket_count(&sandwiches),
            sandwiches.len()
        );
        self.store.save(SANDWICHES_FILE, &sandwiches)?;
        Ok(sandwiches)
    }

    pub async fn resolve_leaders(&self, sandwiches: &SandwichesBySlot) -> Result<SlotLeaderMap, AppError> {
        let resolver = LeaderResolver::new(Arc::clone(&self.ledger));
        let leaders = resolver.resolve(sandwiches).await?;

        info!("Resolved leaders for {} slots", leaders.len());
        self.store.save(SLOT_LEADERS_FILE, &leaders)?;
        Ok(leaders)
    }

    pub async fn analyze(
        &self,
        sandwiches: &SandwichesBySlot,
        leaders: &SlotLeaderMap,
    ) -> Result<ValidatorAnalysis, AppError> {
        let counts = count_by_leader(sandwiches, leaders)?;
        info!("Sandwiches attributed to {} validators", counts.len());

        let correlator = StakeCorrelator::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.pacer),
            self.cfg.delegation_filter(),
        );
        let analysis = correlator.analyze(&counts).await?;

        analysis.log_summary();
        self.store.save(ANALYSIS_FILE, &analysis)?;
        Ok(analysis)
    }

    /// All stages in order; `None` when no sandwich was found
    pub async fn run(&self) -> Result<Option<ValidatorAnalysis>, AppError> {
        let signatures = self.collect().await?;
        let sandwiches = self.detect(&signatures).await?;

        if sandwiches.is_empty() {
            info!("No sandwiches found, skipping validator analysis");
            return Ok(None);
        }

        let leaders = self.resolve_leaders(&sandwiches).await?;
        let analysis = self.analyze(&sandwiches, &leaders).await?;
        Ok(Some(analysis))
    }

    /// Detection from a previously saved signature artifact
    pub async fn detect_saved(&self) -> Result<SandwichesBySlot, AppError> {
        let signatures: SignatureSlots = self.store.load(SIGNATURES_FILE)?;
        self.detect(&signatures).await
    }

    pub async fn resolve_saved(&self) -> Result<SlotLeaderMap, AppError> {
        let sandwiches: SandwichesBySlot = self.store.load(SANDWICHES_FILE)?;
        self.resolve_leaders(&sandwiches).await
    }

    pub async fn analyze_saved(&self) -> Result<Option<ValidatorAnalysis>, AppError> {
        let sandwiches: SandwichesBySlot = self.store.load(SANDWICHES_FILE)?;
        if sandwiches.is_empty() {
            info!("No sandwiches found, skipping validator analysis");
            return Ok(None);
        }
        let leaders: SlotLeaderMap = self.store.load(SLOT_LEADERS_FILE)?;
        self.analyze(&sandwiches, &leaders).await.map(Some)
    }
}
