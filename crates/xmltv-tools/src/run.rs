//! One run of the tool: read, process, write.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info};
use xmltv_tree::{
    HdTagReport, ListingRequest, OrderingPolicy, Serializer, XmltvDocument, parse_bytes,
};

use crate::cli::Args;
use crate::paths::{ensure_parent_dir, resolve_output_path};

/// Everything a run needs, with paths resolved.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub ordering: Option<PathBuf>,
    pub request: ListingRequest,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output: PathBuf,
    pub reports: Vec<HdTagReport>,
}

impl RunConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let input = args
            .input
            .clone()
            .context("An input file is required")?;
        let output = resolve_output_path(&input, args.output.as_deref());
        Ok(Self {
            input,
            output,
            ordering: args.ordering.clone(),
            request: args.request(),
        })
    }

    fn policy(&self) -> Result<OrderingPolicy> {
        match &self.ordering {
            Some(path) => OrderingPolicy::load(path)
                .with_context(|| format!("Cannot load the ordering from {}", path.display())),
            None => Ok(OrderingPolicy::xmltv()),
        }
    }
}

/// Process the listing and write the result.
///
/// The output file is only written when the whole listing was processed.
/// A failure is logged with its full cause chain before it is returned.
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    process_listing(config).inspect_err(|err| error!("{:#}", err))
}

fn process_listing(config: &RunConfig) -> Result<RunSummary> {
    let input = &config.input;
    let policy = config.policy()?;

    info!(input = %input.display(), "Reading listing");
    let content = fs::read(input)
        .with_context(|| format!("Cannot read the xmltv file: {}", input.display()))?;

    let parsed = match parse_bytes(&content) {
        Ok(parsed) => parsed,
        Err(err) => {
            if let Some(fragment) = err.fragment() {
                error!(fragment, "Offending input");
            }
            return Err(err).with_context(|| format!("Error parsing {}", input.display()));
        }
    };
    let mut document = XmltvDocument::from_parsed(parsed);

    let processed = document
        .process(&config.request, Serializer::new(&policy))
        .with_context(|| format!("Canceling the processing of {}", input.display()))?;

    if ensure_parent_dir(&config.output)
        .with_context(|| format!("Cannot create the directory for {}", config.output.display()))?
    {
        info!(output = %config.output.display(), "Created output directory");
    }
    fs::write(&config.output, &processed.output)
        .with_context(|| format!("Cannot write to {}", config.output.display()))?;
    info!(output = %config.output.display(), "Listing written");

    Ok(RunSummary {
        output: config.output.clone(),
        reports: processed.reports,
    })
}
