pub use crate::config::*;

/// A builder for provider tables.
///
/// Loaders go through it, and it is the simplest way to build a table by hand.
///
/// ```
/// pub use sectional_ranking::builder::TableBuilder;
/// # use sectional_ranking::RankingErrors;
///
/// let mut builder = TableBuilder::new(&["A".to_string(), "B".to_string()])?;
///
/// builder.add_provider("Alpha", -79.8, -6.7, Some("EPSEL"), &[10.0, 20.0])?;
///
/// let table = builder.build();
/// assert_eq!(table.rows.len(), 1);
/// # Ok::<(), RankingErrors>(())
/// ```
pub struct TableBuilder {
    pub(crate) _indicators: Vec<String>,
    pub(crate) _rows: Vec<ProviderRow>,
}

impl TableBuilder {
    pub fn new(indicators: &[String]) -> Result<TableBuilder, RankingErrors> {
        if indicators.is_empty() {
            return Err(RankingErrors::NoIndicators);
        }
        Ok(TableBuilder {
            _indicators: indicators.to_vec(),
            _rows: Vec::new(),
        })
    }

    /// Adds a provider.
    ///
    /// `values` must hold one value per indicator, in the order given to `new`.
    pub fn add_provider(
        &mut self,
        name: &str,
        longitude: f64,
        latitude: f64,
        group: Option<&str>,
        values: &[f64],
    ) -> Result<(), RankingErrors> {
        self.add_row(&ProviderRow {
            name: name.to_string(),
            longitude,
            latitude,
            group: group.map(|g| g.to_string()),
            values: values.to_vec(),
        })
    }

    pub fn add_row(&mut self, row: &ProviderRow) -> Result<(), RankingErrors> {
        if row.values.len() != self._indicators.len() {
            return Err(RankingErrors::RowLength {
                provider: row.name.clone(),
                expected: self._indicators.len(),
                found: row.values.len(),
            });
        }
        if let Some(idx) = row.values.iter().position(|v| !v.is_finite()) {
            return Err(RankingErrors::NonFiniteValue {
                provider: row.name.clone(),
                indicator: self._indicators[idx].clone(),
            });
        }
        self._rows.push(row.clone());
        Ok(())
    }

    pub fn build(self) -> ProviderTable {
        ProviderTable {
            indicators: self._indicators,
            rows: self._rows,
        }
    }
}
