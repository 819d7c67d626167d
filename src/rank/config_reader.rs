use crate::rank::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::collections::HashMap;

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    pub title: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "groupFilter")]
    pub group_filter: Option<String>,
    #[serde(rename = "topN")]
    pub top_n: Option<usize>,
    /// Highlights the markers at or above this overall score instead of the top N.
    #[serde(rename = "highlightThreshold")]
    pub highlight_threshold: Option<f64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
pub struct DataSource {
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "identifierColumn")]
    pub identifier_column: Option<String>,
    #[serde(rename = "longitudeColumn")]
    pub longitude_column: Option<String>,
    #[serde(rename = "latitudeColumn")]
    pub latitude_column: Option<String>,
    /// An empty string means that the source has no group column.
    #[serde(rename = "groupColumn")]
    pub group_column: Option<String>,
    #[serde(rename = "firstIndicator")]
    pub first_indicator: Option<String>,
    #[serde(rename = "lastIndicator")]
    pub last_indicator: Option<String>,
    #[serde(rename = "treatBlankAsZero")]
    pub treat_blank_as_zero: Option<bool>,
}

impl DataSource {
    pub fn from_path(file_path: &str) -> DataSource {
        DataSource {
            provider: None,
            file_path: file_path.to_string(),
            excel_worksheet_name: None,
            identifier_column: None,
            longitude_column: None,
            latitude_column: None,
            group_column: None,
            first_indicator: None,
            last_indicator: None,
            treat_blank_as_zero: None,
        }
    }

    pub fn provider(&self) -> &str {
        self.provider.as_deref().unwrap_or("xlsx")
    }

    pub fn identifier_column(&self) -> &str {
        self.identifier_column.as_deref().unwrap_or("Prestador")
    }

    pub fn longitude_column(&self) -> &str {
        self.longitude_column.as_deref().unwrap_or("LONGITUD")
    }

    pub fn latitude_column(&self) -> &str {
        self.latitude_column.as_deref().unwrap_or("LATITUD")
    }

    pub fn group_column(&self) -> Option<&str> {
        match self.group_column.as_deref() {
            None => Some("EPS"),
            Some("") => None,
            Some(s) => Some(s),
        }
    }

    pub fn first_indicator(&self) -> &str {
        self.first_indicator
            .as_deref()
            .unwrap_or(schema::FIRST_INDICATOR)
    }

    pub fn last_indicator(&self) -> &str {
        self.last_indicator
            .as_deref()
            .unwrap_or(schema::LAST_INDICATOR)
    }

    pub fn treat_blank_as_zero(&self) -> bool {
        self.treat_blank_as_zero.unwrap_or(false)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightSettings {
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub defaults: Option<HashMap<String, u32>>,
}

impl WeightSettings {
    pub fn range(&self) -> RankResult<WeightRange> {
        let min = self.min.unwrap_or(WeightRange::STANDARD.min);
        let max = self.max.unwrap_or(WeightRange::STANDARD.max);
        WeightRange::new(min, max).context(RankingSnafu {})
    }

    pub fn defaults(&self) -> HashMap<String, u32> {
        self.defaults.clone().unwrap_or_else(schema::default_weights)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SectionSettings {
    pub name: String,
    pub indicators: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormulaSettings {
    #[serde(rename = "termsPerLine")]
    pub terms_per_line: Option<usize>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RankConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "dataSource")]
    pub data_source: DataSource,
    #[serde(default)]
    pub weights: WeightSettings,
    pub sections: Option<Vec<SectionSettings>>,
    #[serde(rename = "sharedIndicators")]
    pub shared_indicators: Option<String>,
    #[serde(default)]
    pub formula: FormulaSettings,
}

impl RankConfig {
    pub fn from_source(data_source: DataSource) -> RankConfig {
        RankConfig {
            output_settings: OutputSettings::default(),
            data_source,
            weights: WeightSettings::default(),
            sections: None,
            shared_indicators: None,
            formula: FormulaSettings::default(),
        }
    }

    pub fn shared_indicator_policy(&self) -> RankResult<SharedIndicatorPolicy> {
        match self.shared_indicators.as_deref() {
            None | Some("allow") => Ok(SharedIndicatorPolicy::Allow),
            Some("reject") => Ok(SharedIndicatorPolicy::Reject),
            Some(x) => InvalidSettingSnafu {
                name: "sharedIndicators",
                value: x,
            }
            .fail(),
        }
    }

    pub fn section_schema(&self) -> RankResult<SectionSchema> {
        let policy = self.shared_indicator_policy()?;
        let sections: Vec<Section> = match &self.sections {
            Some(l) => l
                .iter()
                .map(|s| Section {
                    name: s.name.clone(),
                    indicators: s.indicators.clone(),
                })
                .collect(),
            None => schema::default_sections(),
        };
        SectionSchema::new(sections, policy).context(RankingSnafu {})
    }

    pub fn formula_layout(&self) -> FormulaLayout {
        match self.formula.terms_per_line {
            Some(terms_per_line) => FormulaLayout { terms_per_line },
            None => FormulaLayout::default(),
        }
    }
}

pub fn read_config(path: &str) -> RankResult<RankConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: RankConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> RankResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config: RankConfig =
            serde_json::from_str(r#"{"dataSource": {"filePath": "base.xlsx"}}"#).unwrap();
        let source = &config.data_source;
        assert_eq!(source.provider(), "xlsx");
        assert_eq!(source.identifier_column(), "Prestador");
        assert_eq!(source.group_column(), Some("EPS"));
        assert_eq!(source.first_indicator(), schema::FIRST_INDICATOR);
        assert_eq!(config.weights.range().unwrap(), WeightRange::STANDARD);
        assert_eq!(config.weights.defaults(), schema::default_weights());
        assert_eq!(config.section_schema().unwrap().sections().len(), 8);
        assert_eq!(config.formula_layout(), FormulaLayout::default());
    }

    #[test]
    fn full_config() {
        let js = r#"{
            "outputSettings": {"title": "Lambayeque", "topN": 5, "groupFilter": "EPSEL"},
            "dataSource": {"provider": "csv", "filePath": "p.csv", "groupColumn": ""},
            "weights": {"min": 1, "max": 5, "defaults": {"A": 3}},
            "sections": [{"name": "S", "indicators": ["A"]}],
            "sharedIndicators": "reject",
            "formula": {"termsPerLine": 2}
        }"#;
        let config: RankConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.output_settings.top_n, Some(5));
        assert_eq!(config.data_source.group_column(), None);
        assert_eq!(config.weights.range().unwrap(), WeightRange::NARROW);
        assert_eq!(config.weights.defaults().get("A"), Some(&3));
        assert_eq!(config.section_schema().unwrap().names(), vec!["S"]);
        assert_eq!(config.formula_layout().terms_per_line, 2);
    }

    #[test]
    fn group_column_null_keeps_default() {
        let config: RankConfig = serde_json::from_str(
            r#"{"dataSource": {"filePath": "p.csv", "groupColumn": null}}"#,
        )
        .unwrap();
        assert_eq!(config.data_source.group_column(), Some("EPS"));
        let config: RankConfig =
            serde_json::from_str(r#"{"dataSource": {"filePath": "p.csv", "groupColumn": ""}}"#)
                .unwrap();
        assert_eq!(config.data_source.group_column(), None);
    }

    #[test]
    fn bad_settings_are_rejected() {
        let mut config = RankConfig::from_source(DataSource::from_path("x.xlsx"));
        config.shared_indicators = Some("sometimes".to_string());
        assert!(matches!(
            config.section_schema(),
            Err(RankError::InvalidSetting { .. })
        ));
        config.shared_indicators = Some("reject".to_string());
        // The built-in schema shares one indicator between two sections.
        assert!(matches!(
            config.section_schema(),
            Err(RankError::Ranking { .. })
        ));
        config.weights.min = Some(6);
        config.weights.max = Some(2);
        assert!(config.weights.range().is_err());
    }
}
