//! Processing a whole listing: validate the request, edit the requested
//! channels, and write the new document.

use tracing::{error, info, warn};

use crate::error::{Error, RequestError, Result};
use crate::hd_tag::{HdTagAction, HdTagReport, apply_to_channel};
use crate::node::Node;
use crate::parser::{ParsedDocument, parse};
use crate::registry::ChannelRegistry;
use crate::serializer::Serializer;

/// Depth of the `<tv>` root element.
const ROOT_DEPTH: usize = 0;

/// Which channels to process and how.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingRequest {
    pub channel_ids: Vec<String>,
    pub action: HdTagAction,
    /// Keep the original listing and add the processed one under the
    /// `-sd`/`-hd` id instead of replacing it.
    pub keep_original: bool,
}

impl ListingRequest {
    pub fn new(channel_ids: Vec<String>, action: HdTagAction) -> Self {
        Self {
            channel_ids,
            action,
            keep_original: false,
        }
    }

    pub fn keep_original(mut self, keep: bool) -> Self {
        self.keep_original = keep;
        self
    }

    /// Requested ids in request order, each listed once.
    pub fn unique_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::with_capacity(self.channel_ids.len());
        for id in &self.channel_ids {
            if !ids.contains(&id.as_str()) {
                ids.push(id);
            }
        }
        ids
    }

    fn includes(&self, id: &str) -> bool {
        self.channel_ids.iter().any(|requested| requested == id)
    }
}

/// The result of [`XmltvDocument::process`].
#[derive(Debug, Clone)]
pub struct ProcessedListing {
    /// The complete output document.
    pub output: String,
    /// One report per processed channel, in document order.
    pub reports: Vec<HdTagReport>,
}

/// A parsed XMLTV listing.
#[derive(Debug, Clone)]
pub struct XmltvDocument {
    preamble: String,
    root: Node,
    registry: ChannelRegistry,
}

/// Collects channel and programme elements separately, so every channel is
/// written before the first programme.
struct ListingWriter<'s> {
    serializer: Serializer<'s>,
    channels: String,
    programmes: String,
}

impl<'s> ListingWriter<'s> {
    fn new(serializer: Serializer<'s>) -> Self {
        Self {
            serializer,
            channels: String::new(),
            programmes: String::new(),
        }
    }

    fn push_group(&mut self, registry: &ChannelRegistry, id: &str) {
        let depth = ROOT_DEPTH + 1;
        for channel in registry.channels_with_id(id) {
            self.channels.push_str(&self.serializer.render(channel, depth));
        }
        for programme in registry.programmes(id) {
            self.programmes
                .push_str(&self.serializer.render(programme, depth));
        }
    }

    fn finish(self, preamble: &str, root: &Node) -> String {
        let mut out = String::with_capacity(
            preamble.len() + self.channels.len() + self.programmes.len() + 64,
        );
        out.push_str(preamble);
        out.push_str(&self.serializer.render_start_tag(root, ROOT_DEPTH));
        out.push_str(&self.channels);
        out.push_str(&self.programmes);
        out.push_str(&self.serializer.render_end_tag(root, ROOT_DEPTH));
        out
    }
}

impl XmltvDocument {
    /// Parse a listing.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(Self::from_parsed(parse(content)?))
    }

    pub fn from_parsed(parsed: ParsedDocument) -> Self {
        let ParsedDocument { preamble, mut root } = parsed;
        let registry = ChannelRegistry::from_root(&mut root);
        Self {
            preamble,
            root,
            registry,
        }
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// The root element, without its channel and programme children.
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Check that every requested channel exists and, when the original is
    /// kept, that its new id is free.
    ///
    /// Every problem is logged and all of them are returned together.
    pub fn check_request(&self, request: &ListingRequest) -> Result<()> {
        let mut problems = Vec::new();
        for id in request.unique_ids() {
            if !self.registry.has_channel(id) {
                problems.push(RequestError::UnknownChannel(id.to_string()));
            }
            if request.keep_original {
                let new_id = request.action.renamed_id(id);
                if self.registry.has_channel(&new_id) {
                    problems.push(RequestError::ConflictingIdentifier(new_id));
                }
            }
        }

        if problems.is_empty() {
            return Ok(());
        }
        for problem in &problems {
            error!("{}", problem);
        }
        Err(Error::InvalidRequests(problems))
    }

    /// Render the listing as it currently is.
    pub fn render(&self, serializer: Serializer<'_>) -> String {
        let mut writer = ListingWriter::new(serializer);
        for id in self.registry.channel_ids() {
            writer.push_group(&self.registry, id);
        }
        writer.finish(&self.preamble, &self.root)
    }

    /// Validate `request`, apply it, and render the resulting listing.
    ///
    /// Nothing is changed when validation fails. Channels are written in
    /// document order; with `keep_original` a requested channel is written
    /// twice, first unchanged and then processed under its new id.
    /// Programmes whose channel has no channel record are not written.
    pub fn process(
        &mut self,
        request: &ListingRequest,
        serializer: Serializer<'_>,
    ) -> Result<ProcessedListing> {
        self.check_request(request)?;

        let mut writer = ListingWriter::new(serializer);
        let mut reports = Vec::new();
        let ids: Vec<String> = self
            .registry
            .channel_ids()
            .into_iter()
            .map(str::to_string)
            .collect();

        for id in &ids {
            if !request.includes(id) {
                writer.push_group(&self.registry, id);
                continue;
            }

            if request.keep_original {
                info!(channel = %id, "Preserving the old listing");
                writer.push_group(&self.registry, id);
            }

            let report = apply_to_channel(
                &mut self.registry,
                id,
                request.action,
                request.keep_original,
            )
            .map_err(|e| Error::InvalidRequests(vec![e]))?;
            info!(channel = %report.channel_id, "Creating the new listing");
            writer.push_group(&self.registry, &report.channel_id);
            reports.push(report);
        }

        for orphan in self.registry.orphan_ids() {
            warn!(
                channel = orphan,
                programmes = self.registry.programmes(orphan).len(),
                "Dropping programmes of a channel that is not in the listing"
            );
        }

        Ok(ProcessedListing {
            output: writer.finish(&self.preamble, &self.root),
            reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::OrderingPolicy;

    const LISTING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tv generator-info-name="test">
  <channel id="BBC1"><display-name>BBC One</display-name></channel>
  <channel id="ITV"/>
  <programme start="1" channel="BBC1"><title>News</title><video><quality>HDTV</quality></video></programme>
  <programme start="2" channel="ITV"><title>Quiz</title></programme>
</tv>
"#;

    #[test]
    fn test_unknown_and_conflicting_ids_are_reported_together() {
        let doc = XmltvDocument::parse(
            r#"<tv><channel id="A"/><channel id="A-sd"/></tv>"#,
        )
        .unwrap();
        let request = ListingRequest::new(
            vec!["A".to_string(), "B".to_string()],
            HdTagAction::Remove,
        )
        .keep_original(true);

        match doc.check_request(&request) {
            Err(Error::InvalidRequests(problems)) => assert_eq!(
                problems,
                vec![
                    RequestError::ConflictingIdentifier("A-sd".to_string()),
                    RequestError::UnknownChannel("B".to_string()),
                ]
            ),
            other => panic!("Expected InvalidRequests, got: {:?}", other),
        }
    }

    #[test]
    fn test_repeated_ids_are_reported_once() {
        let doc = XmltvDocument::parse(r#"<tv><channel id="A"/></tv>"#).unwrap();
        let request = ListingRequest::new(
            vec!["B".to_string(), "A".to_string(), "B".to_string()],
            HdTagAction::Remove,
        );
        assert_eq!(request.unique_ids(), vec!["B", "A"]);

        match doc.check_request(&request) {
            Err(Error::InvalidRequests(problems)) => assert_eq!(
                problems,
                vec![RequestError::UnknownChannel("B".to_string())]
            ),
            other => panic!("Expected InvalidRequests, got: {:?}", other),
        }
    }

    #[test]
    fn test_conflicts_only_matter_when_keeping_the_original() {
        let doc = XmltvDocument::parse(r#"<tv><channel id="A"/><channel id="A-hd"/></tv>"#)
            .unwrap();
        let request = ListingRequest::new(vec!["A".to_string()], HdTagAction::Add);
        assert!(doc.check_request(&request).is_ok());
    }

    #[test]
    fn test_failed_validation_changes_nothing() {
        let mut doc = XmltvDocument::parse(LISTING).unwrap();
        let policy = OrderingPolicy::xmltv();
        let request = ListingRequest::new(
            vec!["BBC1".to_string(), "missing".to_string()],
            HdTagAction::Remove,
        );

        assert!(doc.process(&request, Serializer::new(&policy)).is_err());
        assert!(doc.registry().programmes("BBC1")[0].child("video").is_some());
    }

    #[test]
    fn test_process_replaces_listing() {
        let mut doc = XmltvDocument::parse(LISTING).unwrap();
        let policy = OrderingPolicy::xmltv();
        let request = ListingRequest::new(vec!["BBC1".to_string()], HdTagAction::Remove);

        let processed = doc.process(&request, Serializer::new(&policy)).unwrap();
        assert_eq!(processed.reports.len(), 1);
        assert_eq!(processed.reports[0].changed, 1);
        assert!(!processed.output.contains("HDTV"));
        assert_eq!(processed.output.matches("<channel id=\"BBC1\">").count(), 1);
    }

    #[test]
    fn test_process_keeps_original_and_adds_renamed_copy() {
        let mut doc = XmltvDocument::parse(LISTING).unwrap();
        let policy = OrderingPolicy::xmltv();
        let request = ListingRequest::new(vec!["BBC1".to_string()], HdTagAction::Remove)
            .keep_original(true);

        let processed = doc.process(&request, Serializer::new(&policy)).unwrap();
        let output = &processed.output;

        assert_eq!(output.matches("<channel id=\"BBC1\">").count(), 1);
        assert_eq!(output.matches("<channel id=\"BBC1-sd\">").count(), 1);
        assert_eq!(output.matches("<quality>HDTV</quality>").count(), 1);
        assert_eq!(output.matches("channel=\"BBC1-sd\"").count(), 1);

        let first_programme = output.find("<programme").unwrap();
        assert!(output[..first_programme].contains("<channel id=\"ITV\"/>"));
        assert!(output.ends_with("</tv>\n"));
    }

    #[test]
    fn test_keep_original_replaces_stray_programmes_under_new_id() {
        let mut doc = XmltvDocument::parse(
            r#"<tv>
  <channel id="A"/>
  <programme start="1" channel="A"><title>Kept</title><video><quality>HDTV</quality></video></programme>
  <programme start="2" channel="A-sd"><title>Stray</title><video><quality>HDTV</quality></video></programme>
</tv>"#,
        )
        .unwrap();
        let policy = OrderingPolicy::xmltv();
        let request =
            ListingRequest::new(vec!["A".to_string()], HdTagAction::Remove).keep_original(true);

        let processed = doc.process(&request, Serializer::new(&policy)).unwrap();
        assert_eq!(
            processed.reports,
            vec![HdTagReport {
                channel_id: "A-sd".to_string(),
                changed: 1,
                programmes: 1,
            }]
        );

        let output = XmltvDocument::parse(&processed.output).unwrap();
        let sd = output.registry().programmes("A-sd");
        assert_eq!(sd.len(), 1);
        assert_eq!(sd[0].get_attribute("start"), Some("1"));
        assert!(sd[0].child("video").is_none());
        assert!(!processed.output.contains("Stray"));
        assert_eq!(processed.output.matches("<quality>HDTV</quality>").count(), 1);
    }

    #[test]
    fn test_orphan_programmes_are_not_written() {
        let mut doc = XmltvDocument::parse(
            r#"<tv><channel id="A"/><programme channel="ghost" start="1"/></tv>"#,
        )
        .unwrap();
        let policy = OrderingPolicy::empty();
        let request = ListingRequest::new(vec!["A".to_string()], HdTagAction::Add);

        let processed = doc.process(&request, Serializer::new(&policy)).unwrap();
        assert!(!processed.output.contains("ghost"));
    }
}
