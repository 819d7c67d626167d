pub mod builder;
mod config;
pub mod formula;
pub mod manual;
pub mod schema;
pub mod session;
pub mod views;
pub mod weights;

use log::{debug, info, warn};

use std::cmp::Ordering;

pub use crate::config::*;
pub use crate::formula::{render_formula, Formula, FormulaLayout};
pub use crate::weights::{WeightSnapshot, WeightStore};

// **** Private structures ****

// A section resolved against the table: (column index, weight) pairs.
// Invariant: never empty, so the weight sum is strictly positive.
#[derive(PartialEq, Debug, Clone)]
struct ResolvedSection {
    name: String,
    columns: Vec<(usize, u32)>,
}

fn weighted_mean(values: &[f64], columns: &[(usize, u32)]) -> f64 {
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (idx, w) in columns.iter() {
        numerator += values[*idx] * (*w as f64);
        denominator += *w as f64;
    }
    numerator / denominator
}

// Every indicator of the table must have a weight and every weight must name an
// indicator of the table.
fn resolve_overall(
    table: &ProviderTable,
    weights: &WeightSnapshot,
) -> Result<Vec<(usize, u32)>, RankingErrors> {
    if table.indicators.is_empty() {
        return Err(RankingErrors::NoIndicators);
    }
    for (pos, (name, _)) in weights.iter().enumerate() {
        if table.indicator_index(name).is_none() {
            return Err(RankingErrors::UnknownIndicator(name.clone()));
        }
        // The formula renders every entry: a repeated name would not match the score.
        if weights.iter().take(pos).any(|(n, _)| n == name) {
            return Err(RankingErrors::DuplicateWeight(name.clone()));
        }
    }
    let mut res: Vec<(usize, u32)> = Vec::new();
    for (idx, name) in table.indicators.iter().enumerate() {
        let w = weights
            .get(name)
            .ok_or_else(|| RankingErrors::MissingWeight(name.clone()))?;
        res.push((idx, w));
    }
    if res.iter().all(|(_, w)| *w == 0) {
        return Err(RankingErrors::ZeroTotalWeight);
    }
    Ok(res)
}

fn resolve_sections(
    table: &ProviderTable,
    weights: &WeightSnapshot,
    sections: &SectionSchema,
) -> Result<Vec<ResolvedSection>, RankingErrors> {
    let mut res: Vec<ResolvedSection> = Vec::new();
    for section in sections.sections() {
        let mut columns: Vec<(usize, u32)> = Vec::new();
        for indicator in section.indicators.iter() {
            match (table.indicator_index(indicator), weights.get(indicator)) {
                (Some(idx), Some(w)) => columns.push((idx, w)),
                _ => {
                    warn!(
                        "resolve_sections: section {:?}: skipping indicator {:?} without weight",
                        section.name, indicator
                    );
                }
            }
        }
        let total: u64 = columns.iter().map(|(_, w)| *w as u64).sum();
        if total == 0 {
            return Err(RankingErrors::EmptySection(section.name.clone()));
        }
        debug!(
            "resolve_sections: section {:?} -> columns {:?}",
            section.name, columns
        );
        res.push(ResolvedSection {
            name: section.name.clone(),
            columns,
        });
    }
    Ok(res)
}

/// Ranks the providers of a table.
///
/// Arguments:
/// * `table` the providers, with their indicator columns
/// * `weights` one weight per indicator column of the table
/// * `sections` the sections to report as sub-scores
///
/// The overall score of a row is the weighted mean of all its indicators, and
/// each section score is the weighted mean of the indicators of that section,
/// using only the weights of that section. Rows are sorted by decreasing
/// overall score; rows with equal scores keep their input order.
pub fn run_ranking(
    table: &ProviderTable,
    weights: &WeightSnapshot,
    sections: &SectionSchema,
) -> Result<RankedTable, RankingErrors> {
    info!(
        "Ranking {:?} providers over {:?} indicators and {:?} sections",
        table.rows.len(),
        table.indicators.len(),
        sections.sections().len()
    );

    let overall = resolve_overall(table, weights)?;
    let resolved_sections = resolve_sections(table, weights, sections)?;

    let mut rows: Vec<RankedRow> = Vec::with_capacity(table.rows.len());
    for (position, provider) in table.rows.iter().enumerate() {
        if provider.values.len() != table.indicators.len() {
            return Err(RankingErrors::RowLength {
                provider: provider.name.clone(),
                expected: table.indicators.len(),
                found: provider.values.len(),
            });
        }
        if let Some(idx) = provider.values.iter().position(|v| !v.is_finite()) {
            return Err(RankingErrors::NonFiniteValue {
                provider: provider.name.clone(),
                indicator: table.indicators[idx].clone(),
            });
        }
        let ranking = weighted_mean(&provider.values, &overall);
        let section_scores: Vec<(String, f64)> = resolved_sections
            .iter()
            .map(|s| (s.name.clone(), weighted_mean(&provider.values, &s.columns)))
            .collect();
        debug!(
            "run_ranking: {:?} ranking: {:?} sections: {:?}",
            provider.name, ranking, section_scores
        );
        rows.push(RankedRow {
            provider: provider.clone(),
            input_position: position,
            ranking,
            section_scores,
        });
    }

    // sort_by is stable: ties keep the input order.
    rows.sort_by(|a, b| {
        b.ranking
            .partial_cmp(&a.ranking)
            .unwrap_or(Ordering::Equal)
    });

    Ok(RankedTable {
        indicators: table.indicators.clone(),
        sections: sections.names(),
        weights: weights.clone(),
        rows,
    })
}
