use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::{fs, path::Path};

use crate::domain::flow::DEFAULT_BATCH_SIZE;
use crate::domain::signatures::DEFAULT_MAX_SIGNATURES;
use crate::domain::validators::DEFAULT_MIN_DELEGATED_STAKE;
use crate::infrastructure::stake_registry::DEFAULT_STAKEWIZ_API;

pub const RAYDIUM_AMM_V4: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";
pub const RAYDIUM_AMM_AUTHORITY: &str = "5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1";
pub const WRAPPED_SOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const DEFAULT_STAKE_AUTHORITY: &str = "6iQKfEyhr3bZMotVkW6beNZz5CPAkiwvgV2CTje9pVSS";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcCfg {
    pub url: Option<String>,
    pub commitment: String,
    pub timeout_secs: u64,
}

impl Default for RpcCfg {
    fn default() -> Self {
        Self {
            url: None,
            commitment: "confirmed".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetCfg {
    pub sandwicher: Option<String>,
    pub max_signatures: usize,
}

impl Default for TargetCfg {
    fn default() -> Self {
        Self {
            sandwicher: None,
            max_signatures: DEFAULT_MAX_SIGNATURES,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProgramsCfg {
    pub amm_program: String,
    pub amm_authority: String,
    pub wrapped_native_mint: String,
}

impl Default for ProgramsCfg {
    fn default() -> Self {
        Self {
            amm_program: RAYDIUM_AMM_V4.to_string(),
            amm_authority: RAYDIUM_AMM_AUTHORITY.to_string(),
            wrapped_native_mint: WRAPPED_SOL_MINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionCfg {
    pub batch_size: usize,
}

impl Default for ExtractionCfg {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StakeCfg {
    pub api_url: String,
    pub stake_authority: String,
    /// SOL; validators below this are left out of the report
    pub min_delegated_stake: f64,
    /// Pause between per-validator registry lookups, 0 disables it
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for StakeCfg {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_STAKEWIZ_API.to_string(),
            stake_authority: DEFAULT_STAKE_AUTHORITY.to_string(),
            min_delegated_stake: DEFAULT_MIN_DELEGATED_STAKE,
            request_delay_ms: 100,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputCfg {
    pub data_dir: PathBuf,
}

impl Default for OutputCfg {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

/// Contents of the optional TOML configuration file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub rpc: RpcCfg,
    pub target: TargetCfg,
    pub programs: ProgramsCfg,
    pub extraction: ExtractionCfg,
    pub stake: StakeCfg,
    pub output: OutputCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read {}", path.as_ref().display()))?;
        let cfg: Self = toml::from_str(&s).context("parse config TOML")?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[rpc]
url = "http://127.0.0.1:8899"

[target]
max_signatures = 250

[stake]
request_delay_ms = 0
"#
        )
        .unwrap();

        let cfg = Config::from_file(file.path()).unwrap();

        assert_eq!(cfg.rpc.url.as_deref(), Some("http://127.0.0.1:8899"));
        assert_eq!(cfg.rpc.commitment, "confirmed");
        assert_eq!(cfg.target.max_signatures, 250);
        assert_eq!(cfg.target.sandwicher, None);
        assert_eq!(cfg.programs.amm_program, RAYDIUM_AMM_V4);
        assert_eq!(cfg.extraction.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(cfg.stake.request_delay_ms, 0);
        assert_eq!(cfg.stake.min_delegated_stake, 1.0);
        assert_eq!(cfg.output.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_malformed_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[target]\nmax_signatures = \"many\"").unwrap();

        assert!(Config::from_file(file.path()).is_err());
    }
}
