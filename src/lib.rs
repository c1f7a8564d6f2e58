//! Sandwatch - Solana sandwich detection and validator stake correlation
//! Built with Domain-Driven Design principles

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod report;
pub mod shared;

// Re-export main types for convenience
pub use app::{AppCfg, Pipeline};
pub use domain::flow::BalanceFlowExtractor;
pub use domain::sandwich::identify;
pub use domain::signatures::SignatureCollector;
pub use domain::validators::{LeaderResolver, StakeCorrelator};
pub use report::ValidatorAnalysis;
