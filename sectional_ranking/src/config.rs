// ********* Input data structures ***********

use log::warn;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;

/// One provider (one row of the source table).
///
/// `values[i]` is the value of the indicator `indicators[i]` of the table that
/// owns this row.
#[derive(PartialEq, Debug, Clone)]
pub struct ProviderRow {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    /// The operating entity, when the source has a group column.
    pub group: Option<String>,
    pub values: Vec<f64>,
}

/// The projected table produced by a loader: providers and the ordered list of
/// indicator columns present in the source.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ProviderTable {
    pub indicators: Vec<String>,
    pub rows: Vec<ProviderRow>,
}

impl ProviderTable {
    pub fn indicator_index(&self, indicator: &str) -> Option<usize> {
        self.indicators.iter().position(|c| c == indicator)
    }

    pub fn value(&self, row: usize, indicator: &str) -> Option<f64> {
        let idx = self.indicator_index(indicator)?;
        self.rows.get(row).and_then(|r| r.values.get(idx)).cloned()
    }
}

/// A named group of indicators, reported as its own sub-score.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Section {
    pub name: String,
    pub indicators: Vec<String>,
}

impl Section {
    pub fn new(name: &str, indicators: &[&str]) -> Section {
        Section {
            name: name.to_string(),
            indicators: indicators.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// What to do when one indicator is listed in more than one section.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SharedIndicatorPolicy {
    /// The indicator contributes to every section that lists it.
    Allow,
    /// Building the schema fails.
    Reject,
}

/// The ordered list of sections.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SectionSchema {
    sections: Vec<Section>,
}

impl SectionSchema {
    pub fn new(
        sections: Vec<Section>,
        policy: SharedIndicatorPolicy,
    ) -> Result<SectionSchema, RankingErrors> {
        let mut names: HashSet<&str> = HashSet::new();
        for s in sections.iter() {
            if s.name.trim().is_empty() {
                return Err(RankingErrors::EmptySectionName);
            }
            if !names.insert(s.name.as_str()) {
                return Err(RankingErrors::DuplicateSectionName(s.name.clone()));
            }
        }

        for (idx, s) in sections.iter().enumerate() {
            for other in sections[idx + 1..].iter() {
                for indicator in s.indicators.iter() {
                    if !other.indicators.contains(indicator) {
                        continue;
                    }
                    match policy {
                        SharedIndicatorPolicy::Allow => {
                            warn!(
                                "SectionSchema: indicator {:?} is shared by sections {:?} and {:?}",
                                indicator,
                                s.name,
                                other.name
                            );
                        }
                        SharedIndicatorPolicy::Reject => {
                            return Err(RankingErrors::DuplicateSectionIndicator {
                                indicator: indicator.clone(),
                                first: s.name.clone(),
                                second: other.name.clone(),
                            });
                        }
                    }
                }
            }
        }
        Ok(SectionSchema { sections })
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn names(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.name.clone()).collect()
    }
}

/// The inclusive range of accepted weights.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct WeightRange {
    pub min: u32,
    pub max: u32,
}

impl WeightRange {
    /// The range of the main dashboard.
    pub const STANDARD: WeightRange = WeightRange { min: 1, max: 10 };
    /// The range of the reduced dashboard variant.
    pub const NARROW: WeightRange = WeightRange { min: 1, max: 5 };

    pub fn new(min: u32, max: u32) -> Result<WeightRange, RankingErrors> {
        if min == 0 || min > max {
            return Err(RankingErrors::InvalidWeightRange { min, max });
        }
        Ok(WeightRange { min, max })
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.min as i64 && value <= self.max as i64
    }

    pub fn clamp(&self, value: i64) -> u32 {
        value.clamp(self.min as i64, self.max as i64) as u32
    }
}

impl Default for WeightRange {
    fn default() -> Self {
        WeightRange::STANDARD
    }
}

// ******** Output data structures *********

#[derive(PartialEq, Debug, Clone)]
pub struct RankedRow {
    pub provider: ProviderRow,
    /// Position of the row in the input table.
    pub input_position: usize,
    /// The overall score.
    pub ranking: f64,
    /// One score per section, in schema order.
    pub section_scores: Vec<(String, f64)>,
}

impl RankedRow {
    pub fn section_score(&self, section: &str) -> Option<f64> {
        self.section_scores
            .iter()
            .find(|(name, _)| name == section)
            .map(|(_, v)| *v)
    }
}

/// The result of one ranking pass. Never modified once built.
#[derive(PartialEq, Debug, Clone)]
pub struct RankedTable {
    pub indicators: Vec<String>,
    pub sections: Vec<String>,
    /// The weights this table was computed with.
    pub weights: crate::weights::WeightSnapshot,
    /// Sorted by descending overall score.
    pub rows: Vec<RankedRow>,
}

/// Errors that prevent a ranking or a weight update from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RankingErrors {
    InvalidWeight {
        indicator: String,
        value: i64,
        range: WeightRange,
    },
    InvalidWeightRange {
        min: u32,
        max: u32,
    },
    UnknownIndicator(String),
    MissingWeight(String),
    DuplicateWeight(String),
    EmptySection(String),
    EmptySectionName,
    DuplicateSectionName(String),
    DuplicateSectionIndicator {
        indicator: String,
        first: String,
        second: String,
    },
    NoIndicators,
    ZeroTotalWeight,
    RowLength {
        provider: String,
        expected: usize,
        found: usize,
    },
    NonFiniteValue {
        provider: String,
        indicator: String,
    },
}

impl RankingErrors {
    /// True for the errors that reject a weight update.
    pub fn is_invalid_weight(&self) -> bool {
        matches!(
            self,
            RankingErrors::InvalidWeight { .. } | RankingErrors::UnknownIndicator(_)
        )
    }
}

impl Error for RankingErrors {}

impl Display for RankingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingErrors::InvalidWeight {
                indicator,
                value,
                range,
            } => write!(
                f,
                "weight {} for {:?} is outside of the range {}..={}",
                value, indicator, range.min, range.max
            ),
            RankingErrors::InvalidWeightRange { min, max } => {
                write!(f, "invalid weight range {}..={}", min, max)
            }
            RankingErrors::UnknownIndicator(name) => write!(f, "unknown indicator {:?}", name),
            RankingErrors::MissingWeight(name) => {
                write!(f, "indicator {:?} has no weight", name)
            }
            RankingErrors::DuplicateWeight(name) => {
                write!(f, "indicator {:?} has more than one weight", name)
            }
            RankingErrors::EmptySection(name) => write!(
                f,
                "section {:?} does not contain any weighted indicator",
                name
            ),
            RankingErrors::EmptySectionName => write!(f, "a section has an empty name"),
            RankingErrors::DuplicateSectionName(name) => {
                write!(f, "section {:?} is declared twice", name)
            }
            RankingErrors::DuplicateSectionIndicator {
                indicator,
                first,
                second,
            } => write!(
                f,
                "indicator {:?} appears in both sections {:?} and {:?}",
                indicator, first, second
            ),
            RankingErrors::NoIndicators => write!(f, "the table has no indicator columns"),
            RankingErrors::ZeroTotalWeight => write!(f, "the weights sum to zero"),
            RankingErrors::RowLength {
                provider,
                expected,
                found,
            } => write!(
                f,
                "provider {:?} has {} indicator values, expected {}",
                provider, found, expected
            ),
            RankingErrors::NonFiniteValue {
                provider,
                indicator,
            } => write!(
                f,
                "provider {:?} has a non-finite value for {:?}",
                provider, indicator
            ),
        }
    }
}
