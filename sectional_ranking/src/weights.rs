use log::{debug, warn};
use std::collections::HashMap;

pub use crate::config::*;

/// The weights of one session.
///
/// Entries keep the order in which indicators were first registered. The store
/// is meant to be owned by a single session and is never shared.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct WeightStore {
    range: WeightRange,
    entries: Vec<(String, u32)>,
}

impl WeightStore {
    pub fn new(range: WeightRange) -> WeightStore {
        WeightStore {
            range,
            entries: Vec::new(),
        }
    }

    pub fn range(&self) -> WeightRange {
        self.range
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers the indicators of a table.
    ///
    /// Each indicator takes its default weight, or 1 when it has none. Indicators
    /// that are already present keep their current weight, so calling this again
    /// never undoes an adjustment.
    pub fn initialize(&mut self, indicators: &[String], defaults: &HashMap<String, u32>) {
        for indicator in indicators.iter() {
            if self.position(indicator).is_some() {
                debug!("initialize: keeping current weight for {:?}", indicator);
                continue;
            }
            let requested = defaults.get(indicator).cloned().unwrap_or(1) as i64;
            let w = self.range.clamp(requested);
            if w as i64 != requested {
                warn!(
                    "initialize: default weight {} for {:?} clamped to {}",
                    requested, indicator, w
                );
            }
            self.entries.push((indicator.clone(), w));
        }
    }

    pub fn get(&self, indicator: &str) -> Result<u32, RankingErrors> {
        self.position(indicator)
            .map(|idx| self.entries[idx].1)
            .ok_or_else(|| RankingErrors::UnknownIndicator(indicator.to_string()))
    }

    /// Updates one weight. On error the previous weight is kept.
    pub fn set(&mut self, indicator: &str, value: i64) -> Result<(), RankingErrors> {
        let idx = self
            .position(indicator)
            .ok_or_else(|| RankingErrors::UnknownIndicator(indicator.to_string()))?;
        if !self.range.contains(value) {
            return Err(RankingErrors::InvalidWeight {
                indicator: indicator.to_string(),
                value,
                range: self.range,
            });
        }
        debug!("set: {:?} {} -> {}", indicator, self.entries[idx].1, value);
        self.entries[idx].1 = value as u32;
        Ok(())
    }

    pub fn snapshot(&self) -> WeightSnapshot {
        WeightSnapshot {
            entries: self.entries.clone(),
        }
    }

    fn position(&self, indicator: &str) -> Option<usize> {
        self.entries.iter().position(|(name, _)| name == indicator)
    }
}

/// A frozen copy of the weights, shared by one ranking pass and the formula
/// that documents it.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct WeightSnapshot {
    entries: Vec<(String, u32)>,
}

impl WeightSnapshot {
    pub fn from_pairs(pairs: &[(&str, u32)]) -> WeightSnapshot {
        WeightSnapshot {
            entries: pairs.iter().map(|(n, w)| (n.to_string(), *w)).collect(),
        }
    }

    pub fn get(&self, indicator: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(name, _)| name == indicator)
            .map(|(_, w)| *w)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, u32)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, w)| *w as u64).sum()
    }
}
