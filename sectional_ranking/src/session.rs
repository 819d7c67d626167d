use log::info;
use std::collections::HashMap;
use std::sync::Arc;

use crate::formula::{render_formula, FormulaLayout};
use crate::weights::WeightStore;
use crate::*;

/// What the presentation layer receives after each weight change.
#[derive(PartialEq, Debug, Clone)]
pub struct SessionView {
    pub ranked: RankedTable,
    pub formula: String,
}

/// One user session: a shared, read-only table and a private weight store.
///
/// Two sessions built from the same table never see each other's weight
/// adjustments.
pub struct RankingSession {
    table: Arc<ProviderTable>,
    sections: SectionSchema,
    weights: WeightStore,
    layout: FormulaLayout,
}

impl RankingSession {
    pub fn new(
        table: Arc<ProviderTable>,
        sections: SectionSchema,
        range: WeightRange,
        defaults: &HashMap<String, u32>,
        layout: FormulaLayout,
    ) -> RankingSession {
        let mut weights = WeightStore::new(range);
        weights.initialize(&table.indicators, defaults);
        info!(
            "RankingSession: {:?} providers, {:?} weights",
            table.rows.len(),
            weights.snapshot().len()
        );
        RankingSession {
            table,
            sections,
            weights,
            layout,
        }
    }

    pub fn table(&self) -> &ProviderTable {
        &self.table
    }

    pub fn weights(&self) -> &WeightStore {
        &self.weights
    }

    pub fn get_weight(&self, indicator: &str) -> Result<u32, RankingErrors> {
        self.weights.get(indicator)
    }

    pub fn set_weight(&mut self, indicator: &str, value: i64) -> Result<(), RankingErrors> {
        self.weights.set(indicator, value)
    }

    /// Ranks the table and renders the formula from one snapshot of the weights.
    pub fn recompute(&self) -> Result<SessionView, RankingErrors> {
        let snapshot = self.weights.snapshot();
        let ranked = run_ranking(&self.table, &snapshot, &self.sections)?;
        let formula = render_formula(&snapshot, &self.layout);
        Ok(SessionView { ranked, formula })
    }
}
