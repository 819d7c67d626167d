mod args;
mod rank;

use clap::Parser;
use env_logger::{Builder, Env, Target};
use log::{info, warn};
use snafu::ErrorCompat;

use crate::args::Args;
use crate::rank::{run_ranking_job, DatasetCache, RunOptions};

fn options_from_args(args: &Args) -> RunOptions {
    RunOptions {
        config: args.config.clone(),
        input: args.input.clone(),
        input_type: args.input_type.clone(),
        excel_worksheet_name: args.excel_worksheet_name.clone(),
        weights: args.weight.clone(),
        group: args.group.clone(),
        top_n: args.top_n,
        out: args.out.clone(),
        reference: args.reference.clone(),
    }
}

fn main() {
    let args = Args::parse();

    let mut builder = Builder::from_env(Env::default().default_filter_or(if args.verbose {
        "debug"
    } else {
        "warn"
    }));
    if args.verbose {
        builder.target(Target::Stdout);
    }
    builder.init();
    info!("args: {:?}", args);

    let options = options_from_args(&args);
    let mut cache = DatasetCache::new();
    if let Err(e) = run_ranking_job(&options, &mut cache) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(if e.is_load_error() { 2 } else { 1 });
    }
}
