//! Ordered element trees for editing XMLTV listings.
//!
//! This crate reads an XMLTV document into a tree of [`Node`]s, adds or
//! removes the HDTV quality marker on the programmes of selected channels,
//! and writes the listing back with a fixed, conventional order for the
//! attributes and children that XMLTV leaves unordered.
//!
//! # Overview
//!
//! The main types are:
//! - [`Node`]: an element with attributes, text, tail text and children
//! - [`OrderingPolicy`]: which attributes or children come first, per element
//!   name and depth
//! - [`Serializer`]: renders nodes using an ordering policy
//! - [`ChannelRegistry`]: channel records and their programmes by xmltvID
//! - [`XmltvDocument`]: a whole listing, processed with a [`ListingRequest`]
//!
//! # Example
//!
//! ```rust
//! use xmltv_tree::{HdTagAction, ListingRequest, OrderingPolicy, Serializer, XmltvDocument};
//!
//! let mut doc = XmltvDocument::parse(r#"<tv>
//!   <channel id="BBC1"/>
//!   <programme start="20150513180000 +0000" channel="BBC1"><title>News</title></programme>
//! </tv>"#).unwrap();
//!
//! let policy = OrderingPolicy::xmltv();
//! let request = ListingRequest::new(vec!["BBC1".to_string()], HdTagAction::Add);
//! let processed = doc.process(&request, Serializer::new(&policy)).unwrap();
//!
//! assert_eq!(processed.reports[0].changed, 1);
//! assert!(processed.output.contains("<quality>HDTV</quality>"));
//! ```

pub mod error;
pub mod hd_tag;
pub mod listing;
pub mod node;
pub mod ordering;
pub mod parser;
pub mod registry;
pub mod serializer;

// Re-export main types
pub use error::{Error, ParseError, RequestError, Result};
pub use hd_tag::{HdTagAction, HdTagReport, add_hd_tag, apply_to_channel, remove_hd_tag};
pub use listing::{ListingRequest, ProcessedListing, XmltvDocument};
pub use node::{Attribute, Node};
pub use ordering::{OrderingPolicy, OrderingRule, reorder};
pub use parser::{ParsedDocument, parse, parse_bytes};
pub use registry::ChannelRegistry;
pub use serializer::Serializer;
