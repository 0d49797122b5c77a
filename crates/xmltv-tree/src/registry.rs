//! Channels and their programmes, keyed by xmltvID.

use std::collections::HashMap;

use tracing::warn;

use crate::node::Node;

pub const CHANNEL: &str = "channel";
pub const PROGRAMME: &str = "programme";

/// The records of a listing: channels in document order, and the programmes
/// of each channel id.
///
/// Programmes are grouped under the value of their `channel` attribute even
/// when no channel with that id exists, so the programme map may have more
/// keys than there are channels.
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    channels: Vec<Node>,
    programmes: HashMap<String, Vec<Node>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the channel and programme records out of a `<tv>` root.
    ///
    /// Channels without an `id`, programmes without a `channel`, and any other
    /// root children are dropped. The root keeps its name and attributes.
    pub fn from_root(root: &mut Node) -> Self {
        let mut registry = Self::new();
        for node in std::mem::take(&mut root.children) {
            match node.name.as_str() {
                CHANNEL => registry.add_channel(node),
                PROGRAMME => registry.add_programme(node),
                other => warn!(element = other, "Skipping unsupported top-level element"),
            }
        }
        registry
    }

    /// Add a channel record. Records without a non-empty `id` are skipped.
    pub fn add_channel(&mut self, channel: Node) {
        let Some(id) = non_empty_attribute(&channel, "id") else {
            warn!("Skipping channel without an id");
            return;
        };
        self.programmes.entry(id.to_string()).or_default();
        self.channels.push(channel);
    }

    /// Add a programme record. Records without a non-empty `channel` are
    /// skipped.
    pub fn add_programme(&mut self, programme: Node) {
        let Some(id) = non_empty_attribute(&programme, "channel") else {
            warn!("Skipping programme without a channel");
            return;
        };
        self.programmes
            .entry(id.to_string())
            .or_default()
            .push(programme);
    }

    /// Channel ids in document order, each listed once.
    pub fn channel_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::with_capacity(self.channels.len());
        for id in self.channels.iter().filter_map(|c| c.get_attribute("id")) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    pub fn has_channel(&self, id: &str) -> bool {
        self.channels_with_id(id).next().is_some()
    }

    /// Channel records with the given id. Normally there is exactly one.
    pub fn channels_with_id<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.channels
            .iter()
            .filter(move |c| c.get_attribute("id") == Some(id))
    }

    pub fn channels(&self) -> &[Node] {
        &self.channels
    }

    /// Programmes of a channel id, empty when there are none.
    pub fn programmes(&self, id: &str) -> &[Node] {
        self.programmes.get(id).map_or(&[][..], Vec::as_slice)
    }

    pub fn programmes_mut(&mut self, id: &str) -> Option<&mut Vec<Node>> {
        self.programmes.get_mut(id)
    }

    /// Ids that have programmes but no channel record.
    pub fn orphan_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .programmes
            .iter()
            .filter(|(id, programmes)| !programmes.is_empty() && !self.has_channel(id))
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Move a channel and all its programmes to a new id.
    ///
    /// Rewrites the channel's `id`, each programme's `channel`, and re-keys
    /// the programme map so nothing is left under `old_id`. Programmes that
    /// were already grouped under `new_id` without a channel record are
    /// replaced, not merged. Returns the number of programmes moved, or
    /// `None` when there is no such channel.
    pub fn rename_channel(&mut self, old_id: &str, new_id: &str) -> Option<usize> {
        if !self.has_channel(old_id) {
            return None;
        }
        for channel in self
            .channels
            .iter_mut()
            .filter(|c| c.get_attribute("id") == Some(old_id))
        {
            channel.set_attribute("id", new_id);
        }

        let mut moved = self.programmes.remove(old_id).unwrap_or_default();
        for programme in &mut moved {
            programme.set_attribute("channel", new_id);
        }
        let count = moved.len();
        if let Some(dropped) = self
            .programmes
            .insert(new_id.to_string(), moved)
            .filter(|p| !p.is_empty())
        {
            warn!(
                channel = new_id,
                programmes = dropped.len(),
                "Dropping programmes already listed under the new id"
            );
        }
        Some(count)
    }
}

fn non_empty_attribute<'a>(node: &'a Node, name: &str) -> Option<&'a str> {
    node.get_attribute(name).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn sample() -> ChannelRegistry {
        let mut doc = parse(
            r#"<tv>
  <channel id="BBC1"><display-name>BBC One</display-name></channel>
  <channel id="BBC2"/>
  <channel/>
  <programme channel="BBC1" start="1"><title>News</title></programme>
  <programme channel="ghost" start="2"><title>Boo</title></programme>
  <programme channel="BBC1" start="3"><title>Weather</title></programme>
  <programme start="4"/>
  <comment-like/>
</tv>"#,
        )
        .unwrap();
        ChannelRegistry::from_root(&mut doc.root)
    }

    #[test]
    fn test_channels_in_document_order() {
        let registry = sample();
        assert_eq!(registry.channel_ids(), vec!["BBC1", "BBC2"]);
        assert_eq!(registry.programmes("BBC1").len(), 2);
        assert!(registry.programmes("BBC2").is_empty());
        assert!(registry.programmes("unknown").is_empty());
    }

    #[test]
    fn test_unknown_channel_programmes_are_kept() {
        let registry = sample();
        assert!(!registry.has_channel("ghost"));
        assert_eq!(registry.programmes("ghost").len(), 1);
        assert_eq!(registry.orphan_ids(), vec!["ghost"]);
    }

    #[test]
    fn test_rename_moves_every_programme() {
        let mut registry = sample();
        assert_eq!(registry.rename_channel("BBC1", "BBC1-sd"), Some(2));

        assert_eq!(registry.channel_ids(), vec!["BBC1-sd", "BBC2"]);
        assert!(registry.programmes("BBC1").is_empty());
        assert!(!registry.has_channel("BBC1"));
        let moved = registry.programmes("BBC1-sd");
        assert_eq!(moved.len(), 2);
        assert!(moved.iter().all(|p| p.get_attribute("channel") == Some("BBC1-sd")));
        assert_eq!(moved[0].get_attribute("start"), Some("1"));
        assert_eq!(moved[1].get_attribute("start"), Some("3"));
    }

    #[test]
    fn test_rename_replaces_programmes_already_under_new_id() {
        let mut registry = sample();
        assert_eq!(registry.rename_channel("BBC1", "ghost"), Some(2));

        let moved = registry.programmes("ghost");
        assert_eq!(moved.len(), 2);
        assert!(moved.iter().all(|p| p.child("title").map(Node::text_or_empty) != Some("Boo")));
        assert!(registry.orphan_ids().is_empty());
    }

    #[test]
    fn test_rename_unknown_channel() {
        let mut registry = sample();
        assert_eq!(registry.rename_channel("nope", "nope-hd"), None);
    }
}
