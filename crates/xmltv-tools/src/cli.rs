//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use xmltv_tree::{HdTagAction, ListingRequest};

/// Printed by `--description`.
pub const DESCRIPTION: &str = "\
xmltv-tools adds or removes the HDTV quality tag on all programmes of the
given channels in an XMLTV listing. Attributes and child elements of the
records are written in the conventional XMLTV order, so the output can be
read by grabbers and EPG consumers that depend on it.";

#[derive(Parser, Debug, Clone)]
#[command(name = "xmltv-tools")]
#[command(version)]
#[command(about = "On the given channels, remove all HD tags or add one to all programmes")]
pub struct Args {
    /// Print a short description of the program and exit
    #[arg(short = 'd', long)]
    pub description: bool,

    /// Suppress console output
    #[arg(short, long)]
    pub quiet: bool,

    /// Log level: 0 for warnings and errors, 1 for progress, 2 for every
    /// changed programme
    #[arg(
        short = 'L',
        long,
        value_name = "LEVEL",
        default_value_t = 1,
        value_parser = clap::value_parser!(u8).range(0..=2)
    )]
    pub log_level: u8,

    /// The XMLTV file to read
    #[arg(
        short = 'I',
        long,
        value_name = "FILE",
        required_unless_present = "description"
    )]
    pub input: Option<PathBuf>,

    /// The xmltvIDs of the channels to process
    #[arg(
        short = 'x',
        long = "id-list",
        value_name = "XMLTVID",
        num_args = 1..,
        required_unless_present = "description"
    )]
    pub id_list: Vec<String>,

    /// Where to write the result. A directory (or a path ending in `/`)
    /// gets `xmltv.out` appended. Defaults to `xmltv.out` next to the input
    #[arg(short = 'O', long, value_name = "FILE|DIR")]
    pub output: Option<PathBuf>,

    /// Remove the HDTV tag from every programme (the default)
    #[arg(short = 'r', long = "remove-hd-tags", conflicts_with = "add_hd_tags")]
    pub remove_hd_tags: bool,

    /// Add an HDTV tag to every programme
    #[arg(short = 't', long = "add-hd-tags")]
    pub add_hd_tags: bool,

    /// Keep the original listing and add the processed one under the id
    /// with `-sd` or `-hd` appended
    #[arg(short = 'n', long = "add-new-id")]
    pub add_new_id: bool,

    /// JSON file with the attribute and child ordering to write
    #[arg(long, value_name = "FILE")]
    pub ordering: Option<PathBuf>,
}

impl Args {
    pub fn action(&self) -> HdTagAction {
        if self.add_hd_tags {
            HdTagAction::Add
        } else {
            HdTagAction::Remove
        }
    }

    pub fn request(&self) -> ListingRequest {
        ListingRequest::new(self.id_list.clone(), self.action()).keep_original(self.add_new_id)
    }
}
