use log::{debug, info, warn};

use sectional_ranking::session::{RankingSession, SessionView};
use sectional_ranking::views::{map_center, map_markers, radar_series, MarkerHighlight};
use sectional_ranking::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Reader, Xlsx};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::rank::config_reader::*;
pub use crate::rank::io_common::DatasetCache;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;

const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Snafu)]
pub enum RankError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet or no header row"))]
    EmptyExcel { path: String },
    #[snafu(display("The workbook has no worksheet named {name:?}"))]
    MissingWorksheet { name: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("The file {path} has no header line"))]
    EmptyCsv { path: String },
    #[snafu(display("Error reading line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: u64 },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Missing column {column:?}"))]
    MissingColumn { column: String },
    #[snafu(display("Column {column:?} appears twice in the indicator range"))]
    DuplicateColumn { column: String },
    #[snafu(display("Indicator {first:?} comes after {last:?}"))]
    InvertedIndicatorRange { first: String, last: String },
    #[snafu(display("Line {lineno}, column {column:?}: unexpected cell {content}"))]
    WrongCellType {
        lineno: u64,
        column: String,
        content: String,
    },
    #[snafu(display("Line {lineno}, column {column:?}: blank indicator value"))]
    BlankIndicatorCell { lineno: u64, column: String },
    #[snafu(display("Input type not implemented {provider:?}"))]
    UnknownProvider { provider: String },
    #[snafu(display("Invalid value {value:?} for setting {name}"))]
    InvalidSetting { name: String, value: String },
    #[snafu(display("Could not understand weight {arg:?}, expected NAME=VALUE"))]
    WeightArgument { arg: String },
    #[snafu(display("{source}"))]
    Ranking { source: RankingErrors },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between computed summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

impl RankError {
    /// True when the source data could not be loaded. No ranking is produced
    /// in that case.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            RankError::OpeningExcel { .. }
                | RankError::EmptyExcel { .. }
                | RankError::MissingWorksheet { .. }
                | RankError::OpeningCsv { .. }
                | RankError::EmptyCsv { .. }
                | RankError::CsvLineParse { .. }
                | RankError::MissingColumn { .. }
                | RankError::DuplicateColumn { .. }
                | RankError::InvertedIndicatorRange { .. }
                | RankError::WrongCellType { .. }
                | RankError::BlankIndicatorCell { .. }
                | RankError::UnknownProvider { .. }
        )
    }
}

pub type RankResult<T> = Result<T, RankError>;

/// Everything a run needs besides the configuration file.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RunOptions {
    pub config: Option<String>,
    pub input: Option<String>,
    pub input_type: Option<String>,
    pub excel_worksheet_name: Option<String>,
    /// NAME=VALUE weight adjustments, applied in order.
    pub weights: Vec<String>,
    pub group: Option<String>,
    pub top_n: Option<usize>,
    pub out: Option<String>,
    pub reference: Option<String>,
}

fn parse_weight_arg(arg: &str) -> RankResult<(String, i64)> {
    let (name, value) = arg
        .rsplit_once('=')
        .context(WeightArgumentSnafu { arg })?;
    let value = value
        .trim()
        .parse::<i64>()
        .ok()
        .context(WeightArgumentSnafu { arg })?;
    Ok((name.trim().to_string(), value))
}

// Rejected adjustments keep the previous weight and are reported.
fn apply_weight_args(session: &mut RankingSession, args: &[String]) -> RankResult<()> {
    for arg in args.iter() {
        let (name, value) = parse_weight_arg(arg)?;
        match session.set_weight(&name, value) {
            Ok(()) => info!("Weight of {:?} set to {}", name, value),
            Err(e) if e.is_invalid_weight() => {
                warn!("Weight adjustment rejected: {}", e);
                eprintln!("Weight adjustment rejected: {}", e);
            }
            Err(e) => return Err(e).context(RankingSnafu {}),
        }
    }
    Ok(())
}

fn rows_to_json(indicators: &[String], rows: &[RankedRow]) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        let mut values: JSMap<String, JSValue> = JSMap::new();
        for (name, value) in indicators.iter().zip(row.provider.values.iter()) {
            values.insert(name.clone(), json!(value));
        }
        // Section names may repeat indicator names, hence the nesting.
        let mut sections: JSMap<String, JSValue> = JSMap::new();
        for (name, value) in row.section_scores.iter() {
            sections.insert(name.clone(), json!(value));
        }
        l.push(json!({
            "rank": idx + 1,
            "name": row.provider.name,
            "longitude": row.provider.longitude,
            "latitude": row.provider.latitude,
            "group": row.provider.group,
            "indicators": values,
            "Ranking": row.ranking,
            "sections": sections,
        }));
    }
    l
}

struct SummaryParams<'a> {
    config: &'a RankConfig,
    range: WeightRange,
    group: Option<String>,
    top_n: usize,
    highlight: MarkerHighlight,
}

fn build_summary_js(params: &SummaryParams, view: &SessionView, shown: &RankedTable) -> JSValue {
    let mut weights: JSMap<String, JSValue> = JSMap::new();
    for (name, w) in view.ranked.weights.iter() {
        weights.insert(name.clone(), json!(w));
    }

    let markers: Vec<JSValue> = map_markers(&shown.rows, params.highlight)
        .iter()
        .map(|m| {
            json!({
                "name": m.name,
                "longitude": m.longitude,
                "latitude": m.latitude,
                "ranking": m.ranking,
                "highlighted": m.highlighted,
            })
        })
        .collect();

    let radar: Vec<JSValue> = radar_series(shown.head(params.top_n))
        .iter()
        .map(|p| json!({"provider": p.provider, "section": p.section, "value": p.value}))
        .collect();

    let center = match map_center(&shown.rows) {
        Some((latitude, longitude)) => json!({"latitude": latitude, "longitude": longitude}),
        None => JSValue::Null,
    };

    json!({
        "config": {
            "title": params.config.output_settings.title,
            "source": params.config.data_source.file_path,
            "groupFilter": params.group,
            "topN": params.top_n,
            "weightRange": {"min": params.range.min, "max": params.range.max},
        },
        "formula": view.formula,
        "weights": weights,
        "sections": view.ranked.sections,
        "groups": view.ranked.group_options(),
        "results": rows_to_json(&shown.indicators, &shown.rows),
        "markers": markers,
        "center": center,
        "radar": radar,
    })
}

fn write_summary(pretty_js: &str, out: &Option<String>) -> RankResult<()> {
    match out.as_deref() {
        None | Some("") | Some("stdout") => {
            println!("{}", pretty_js);
        }
        Some(path) => {
            fs::write(path, pretty_js).context(WritingOutputSnafu { path })?;
            info!("Summary written to {:?}", path);
        }
    }
    Ok(())
}

fn load_config(options: &RunOptions) -> RankResult<(RankConfig, PathBuf)> {
    let (mut config, mut root) = match &options.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path.as_str())
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            (config, root)
        }
        None => match &options.input {
            Some(input) => (
                RankConfig::from_source(DataSource::from_path(input)),
                PathBuf::from("."),
            ),
            None => whatever!("Either a configuration file or an input file must be provided"),
        },
    };

    // Command line settings win over the configuration file.
    if let Some(input) = &options.input {
        config.data_source.file_path = input.clone();
        root = PathBuf::from(".");
    }
    if let Some(input_type) = &options.input_type {
        config.data_source.provider = Some(input_type.clone());
    }
    if let Some(name) = &options.excel_worksheet_name {
        config.data_source.excel_worksheet_name = Some(name.clone());
    }
    if let Some(group) = &options.group {
        config.output_settings.group_filter = Some(group.clone());
    }
    if let Some(top_n) = options.top_n {
        config.output_settings.top_n = Some(top_n);
    }
    if let Some(out) = &options.out {
        config.output_settings.output_path = Some(out.clone());
    }
    Ok((config, root))
}

/// Runs one ranking end to end and returns the summary that was written.
pub fn run_ranking_job(options: &RunOptions, cache: &mut DatasetCache) -> RankResult<JSValue> {
    let (config, root) = load_config(options)?;
    info!("config: {:?}", config);

    let sections = config.section_schema()?;
    let range = config.weights.range()?;
    let defaults = config.weights.defaults();

    let table = cache.get_or_load(&config.data_source, &root)?;
    info!(
        "Loaded {} providers with {} indicators",
        table.rows.len(),
        table.indicators.len()
    );

    let mut session = RankingSession::new(
        table,
        sections,
        range,
        &defaults,
        config.formula_layout(),
    );
    apply_weight_args(&mut session, &options.weights)?;

    let view = session.recompute().context(RankingSnafu {})?;
    debug!("formula: {}", view.formula);

    let group = config.output_settings.group_filter.clone();
    let shown = match &group {
        Some(g) => {
            let filtered = view.ranked.filter_group(g);
            if filtered.rows.is_empty() {
                warn!("No provider belongs to group {:?}", g);
            }
            filtered
        }
        None => view.ranked.clone(),
    };
    let top_n = config.output_settings.top_n.unwrap_or(DEFAULT_TOP_N);
    let highlight = match config.output_settings.highlight_threshold {
        Some(x) => MarkerHighlight::ScoreAtLeast(x),
        None => MarkerHighlight::TopN(top_n),
    };

    let params = SummaryParams {
        config: &config,
        range,
        group,
        top_n,
        highlight,
    };
    let result_js = build_summary_js(&params, &view, &shown);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &options.reference {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return ReferenceMismatchSnafu {}.fail();
        }
    }

    write_summary(&pretty_js_stats, &config.output_settings.output_path)?;
    Ok(result_js)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir() -> String {
        format!("{}/tests", env!("CARGO_MANIFEST_DIR"))
    }

    fn run_test(test_name: &str, weights: &[&str]) -> RankResult<JSValue> {
        let _ = env_logger::builder().is_test(true).try_init();
        let options = RunOptions {
            config: Some(format!("{}/{}/{}_config.json", test_dir(), test_name, test_name)),
            reference: Some(format!(
                "{}/{}/{}_expected_summary.json",
                test_dir(),
                test_name,
                test_name
            )),
            weights: weights.iter().map(|s| s.to_string()).collect(),
            out: Some(std::env::temp_dir()
                .join(format!("provrank_{}.json", test_name))
                .display()
                .to_string()),
            ..RunOptions::default()
        };
        let mut cache = DatasetCache::new();
        run_ranking_job(&options, &mut cache)
    }

    #[test]
    fn basic_ranking() {
        let js = run_test("basic_ranking", &["Continuidad=4"]).unwrap();
        let names: Vec<&str> = js["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        // Ties at 0.75 and 0.25 keep the input order.
        assert_eq!(
            names,
            vec!["JASS Olmos", "JASS Naupe", "Comite Illimo", "JASS Motupe", "Comite Pitipo"]
        );
    }

    #[test]
    fn summary_keeps_column_order() {
        let js = run_test("basic_ranking", &["Continuidad=4"]).unwrap();
        let columns = vec!["Cobertura", "¿Cobra cuota?", "Cloración", "Continuidad"];
        let keys = |v: &JSValue| -> Vec<String> {
            v.as_object().unwrap().keys().cloned().collect()
        };
        assert_eq!(keys(&js["weights"]), columns);
        assert_eq!(keys(&js["results"][0]["indicators"]), columns);
        assert_eq!(keys(&js["results"][0]["sections"]), vec!["Acceso", "Calidad"]);
        // Same order as the terms of the formula.
        let formula = js["formula"].as_str().unwrap();
        let positions: Vec<usize> = ["Cobertura", "Cobra cuota", "Cloracion", "Continuidad"]
            .iter()
            .map(|label| formula.find(&format!("\\text{{{}}}", label)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn basic_ranking_detects_other_weights() {
        let res = run_test("basic_ranking", &["Continuidad=9"]);
        assert!(matches!(res, Err(RankError::ReferenceMismatch {})));
    }

    #[test]
    fn rejected_weight_keeps_previous_value() {
        // 11 is out of range and an unknown name is ignored: the remaining
        // adjustment still matches the reference.
        let res = run_test("basic_ranking", &["Continuidad=11", "Continuidad=4", "Nope=3"]);
        assert!(res.is_ok());
    }

    #[test]
    fn malformed_weight_argument() {
        let res = run_test("basic_ranking", &["Continuidad"]);
        assert!(matches!(res, Err(RankError::WeightArgument { .. })));
        assert_eq!(
            parse_weight_arg("Ind cuota = 3").unwrap(),
            ("Ind cuota".to_string(), 3)
        );
        assert!(parse_weight_arg("A=x").is_err());
    }

    #[test]
    fn missing_latitude() {
        let res = run_test("missing_latitude", &[]);
        match res {
            Err(e) => {
                assert!(e.is_load_error());
                assert!(matches!(e, RankError::MissingColumn { column } if column == "LATITUD"));
            }
            Ok(_) => panic!("a ranking was produced"),
        }
    }

    #[test]
    fn group_filter_and_threshold() {
        let options = RunOptions {
            config: Some(format!(
                "{}/basic_ranking/basic_ranking_config.json",
                test_dir()
            )),
            weights: vec!["Continuidad=4".to_string()],
            group: Some("EMAPA".to_string()),
            top_n: Some(1),
            out: Some(std::env::temp_dir()
                .join("provrank_group_filter.json")
                .display()
                .to_string()),
            ..RunOptions::default()
        };
        let mut cache = DatasetCache::new();
        let js = run_ranking_job(&options, &mut cache).unwrap();
        let results = js["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["name"], "JASS Motupe");
        assert_eq!(results[0]["rank"], 1);
        let highlighted: Vec<bool> = js["markers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["highlighted"].as_bool().unwrap())
            .collect();
        assert_eq!(highlighted, vec![true, false]);
        assert_eq!(js["radar"].as_array().unwrap().len(), 2);
        // Groups are listed for the whole table, not only the filtered one.
        assert_eq!(js["groups"], json!(["EPSEL", "EMAPA"]));
    }

    #[test]
    fn input_without_config_requires_built_in_columns() {
        let options = RunOptions {
            input: Some(format!("{}/basic_ranking/basic_ranking.csv", test_dir())),
            input_type: Some("csv".to_string()),
            ..RunOptions::default()
        };
        let mut cache = DatasetCache::new();
        let err = run_ranking_job(&options, &mut cache).unwrap_err();
        // The fixture does not carry the built-in indicator block.
        assert!(matches!(err, RankError::MissingColumn { .. }));
    }
}
