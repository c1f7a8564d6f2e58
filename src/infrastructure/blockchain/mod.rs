//! Direct blockchain reading over Solana JSON-RPC

pub mod rpc_client;

pub use rpc_client::SolanaRpcClient;
