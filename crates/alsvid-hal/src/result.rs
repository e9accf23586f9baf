//! Execution results and outcome counts.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Measurement outcome counts: bitstring → number of shots.
///
/// Bitstrings follow the little-endian convention: the rightmost character
/// is classical bit 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts(FxHashMap<String, u64>);

impl Counts {
    /// Create an empty counts map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` shots for a bitstring outcome.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.0.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Get the count for a bitstring (0 if absent).
    pub fn get(&self, bitstring: &str) -> u64 {
        self.0.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of shots recorded.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// The most frequent outcome, if any.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.0
            .iter()
            .max_by_key(|(bitstring, count)| (*count, std::cmp::Reverse(bitstring.as_str())))
            .map(|(b, c)| (b.as_str(), *c))
    }

    /// Iterate over (bitstring, count) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(b, c)| (b.as_str(), *c))
    }

    /// Marginalize onto a subset of classical bits.
    ///
    /// `clbits` selects which classical bit indices to keep; the result's
    /// bitstrings contain those bits in the given order, last entry becoming
    /// the new bit 0. Counts for outcomes that agree on the kept bits are
    /// summed.
    pub fn marginal(&self, clbits: &[u32]) -> Counts {
        let mut out = Counts::new();
        for (bitstring, count) in self.iter() {
            let chars: Vec<char> = bitstring.chars().collect();
            let n = chars.len();
            let kept: String = clbits
                .iter()
                .rev()
                .map(|&c| {
                    // Rightmost char is clbit 0.
                    let idx = n.checked_sub(1 + c as usize);
                    idx.map_or('0', |i| chars[i])
                })
                .collect();
            out.insert(kept, count);
        }
        out
    }
}

impl FromIterator<(String, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (bitstring, count) in iter {
            counts.insert(bitstring, count);
        }
        counts
    }
}

/// Result of executing a circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Outcome counts.
    pub counts: Counts,
    /// Number of shots executed.
    pub shots: u32,
    /// Wall-clock execution time in milliseconds, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    /// Per-job metadata reported by the boundary (e.g. timing resolution).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ExecutionResult {
    /// Create a new execution result.
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            shots,
            execution_time_ms: None,
            metadata: serde_json::Map::new(),
        }
    }

    /// Set the execution time.
    pub fn with_execution_time(mut self, millis: u64) -> Self {
        self.execution_time_ms = Some(millis);
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
