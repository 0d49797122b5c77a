//! xmltv-tools binary - add or remove HDTV tags on XMLTV channels

use anyhow::Context;
use clap::Parser;
use tracing::info;

use xmltv_tools::{Args, DESCRIPTION, RunConfig, logging, paths, run};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.description {
        println!("{}", DESCRIPTION);
        return Ok(());
    }

    let config = RunConfig::from_args(&args)?;
    let input = std::fs::canonicalize(&config.input)
        .with_context(|| format!("The xmltv file {} is not readable", config.input.display()))?;

    let log_file = paths::rotate_log(&paths::log_path(&input))
        .with_context(|| format!("Cannot open the log file for {}", input.display()))?;
    logging::init(args.log_level, args.quiet, Some(log_file));

    info!(
        version = env!("CARGO_PKG_VERSION"),
        input = %input.display(),
        "Starting xmltv-tools"
    );

    let summary = run(&RunConfig { input, ..config })?;
    for report in &summary.reports {
        info!(
            channel = %report.channel_id,
            changed = report.changed,
            programmes = report.programmes,
            "Channel done"
        );
    }

    Ok(())
}
