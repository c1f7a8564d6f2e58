use std::collections::HashMap;

/// Bucket key: same block, same traded mint, same absolute balance delta
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowKey {
    pub slot: u64,
    pub mint: String,
    pub magnitude: u64,
}

/// One transaction's contribution to the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowObservation {
    pub key: FlowKey,
    pub signature: String,
}

/// Pool-authority balance deltas of the examined transactions, bucketed by
/// (slot, mint, magnitude). Append-only.
#[derive(Debug, Clone, Default)]
pub struct FlowIndex {
    buckets: HashMap<FlowKey, Vec<String>>,
}

impl FlowIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, observation: FlowObservation) {
        self.buckets
            .entry(observation.key)
            .or_default()
            .push(observation.signature);
    }

    /// Fold a finished batch in, keeping the batch's order inside each bucket
    pub fn merge<I>(&mut self, observations: I)
    where
        I: IntoIterator<Item = FlowObservation>,
    {
        for observation in observations {
            self.record(observation);
        }
    }

    pub fn bucket(&self, key: &FlowKey) -> Option<&[String]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// Buckets sorted by key, so consumers see a stable order
    pub fn sorted_buckets(&self) -> Vec<(&FlowKey, &[String])> {
        let mut buckets: Vec<_> = self
            .buckets
            .iter()
            .map(|(key, signatures)| (key, signatures.as_slice()))
            .collect();
        buckets.sort_by(|a, b| a.0.cmp(b.0));
        buckets
    }

    /// Number of distinct buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of recorded signatures across all buckets
    pub fn observation_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}
