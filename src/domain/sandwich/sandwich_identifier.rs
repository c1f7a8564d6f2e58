//! Exact-pair bracket detection over the flow index

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::flow::FlowIndex;

/// The two legs sharing one (slot, mint, magnitude) bucket, serialized as a
/// two-element array. Leg order follows the extractor's input order, not
/// execution order within the block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandwichBracket(pub String, pub String);

/// Detected brackets per block
pub type SandwichesBySlot = BTreeMap<u64, Vec<SandwichBracket>>;

/// Extract every bucket holding exactly two signatures.
///
/// A single entry is an ordinary trade. Three or more are ambiguous (several
/// back-runners, or an unrelated trade colliding on magnitude) and are dropped
/// rather than split. This is a structural heuristic: two unrelated trades of
/// identical size in one block also match.
pub fn identify(index: &FlowIndex) -> SandwichesBySlot {
    let mut sandwiches = SandwichesBySlot::new();

    for (key, signatures) in index.sorted_buckets() {
        if let [first, second] = signatures {
            sandwiches
                .entry(key.slot)
                .or_default()
                .push(SandwichBracket(first.clone(), second.clone()));
        }
    }

    sandwiches
}

/// Total brackets across all slots
pub fn bracket_count(sandwiches: &SandwichesBySlot) -> usize {
    sandwiches.values().map(Vec::len).sum()
}
