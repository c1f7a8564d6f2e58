//! Utility functions and helpers

use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::shared::errors::AppError;

pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Convert base units (lamports) to SOL
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL
}

/// Format a SOL amount with thousands separators, two decimals
pub fn format_sol(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Ensure a configured address is a valid base58 pubkey
pub fn validate_pubkey(label: &str, address: &str) -> Result<Pubkey, AppError> {
    Pubkey::from_str(address)
        .map_err(|e| AppError::ConfigError(format!("Invalid {} address {}: {}", label, address, e)))
}
