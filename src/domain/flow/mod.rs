//! Balance-flow extraction and the flow index

pub mod balance_flow_extractor;
pub mod flow_index;

pub use balance_flow_extractor::{
    classify, BalanceFlowExtractor, FlowDecision, MonitoredPool, DEFAULT_BATCH_SIZE,
};
pub use flow_index::{FlowIndex, FlowKey, FlowObservation};
