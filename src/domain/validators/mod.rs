//! Block-producer attribution and stake correlation

pub mod leader_attribution;
pub mod stake_correlator;

pub use leader_attribution::{count_by_leader, LeaderResolver};
pub use stake_correlator::{DelegationFilter, StakeCorrelator, DEFAULT_MIN_DELEGATED_STAKE};
