use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::{error, info};

use replicate_cv::config::{Cli, Command, SearchArgs};
use replicate_cv::pipeline::search_table;
use replicate_cv::{PipelineConfig, run};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => PipelineConfig::from_args(&args)
            .map_err(anyhow::Error::from)
            .and_then(|cfg| run(&cfg).map(|_| ())),
        Command::Search(args) => search(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn search(args: &SearchArgs) -> Result<()> {
    let thresholds = args.thresholds()?;
    info!(
        "Classifying with CV >= {} or range >= {}",
        thresholds.cv, thresholds.range
    );
    let report = search_table(&args.stats, &args.query, thresholds)?;
    if report.matches.is_empty() {
        println!("No matching genes found");
        return Ok(());
    }
    println!(
        "Found {} unique genes ({} total points)",
        report.matches.len(),
        report.points
    );
    for (gene, category) in &report.matches {
        println!("{gene}\t{category}");
    }
    Ok(())
}
