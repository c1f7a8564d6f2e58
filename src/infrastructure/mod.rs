//! Infrastructure layer - RPC, HTTP and filesystem adapters

pub mod blockchain;
pub mod stake_registry;
pub mod storage;
