use clap::Parser;

/// This program ranks water and sanitation providers from a spreadsheet of indicators.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON configuration: data source, default weights and sections.
    /// Without it, the built-in schema is used and --input is required.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference summary in JSON format. If provided, provrank will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the ranking will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The spreadsheet or CSV file with the providers. Setting this option overrides
    /// the file path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (xlsx or csv, default xlsx) The type of the input.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (NAME=VALUE, repeatable) Adjusts the weight of one indicator before ranking.
    #[clap(short, long, value_parser)]
    pub weight: Vec<String>,

    /// (group key) Only reports the providers of this group (for example one EPS).
    #[clap(short, long, value_parser)]
    pub group: Option<String>,

    /// (default 10) The number of providers to highlight and to compare in the radar data.
    #[clap(long, value_parser)]
    pub top_n: Option<usize>,

    /// When using an Excel file, indicates the name of the worksheet to use (default: the first one).
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
