//! Command-line front end for editing HDTV tags in XMLTV listings.
//!
//! The binary parses [`Args`], sets up logging to the console and to
//! `<input>.log`, and hands a [`RunConfig`] to [`run`].

pub mod cli;
pub mod logging;
pub mod paths;
pub mod run;

pub use cli::{Args, DESCRIPTION};
pub use run::{RunConfig, RunSummary, run};
