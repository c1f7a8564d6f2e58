//! HTTP clients for external stake registries

pub mod stakewiz_client;

pub use stakewiz_client::{StakewizClient, DEFAULT_STAKEWIZ_API};
