//! Adding and removing the HDTV quality marker on programmes.
//!
//! A programme is marked high-definition by a `<quality>HDTV</quality>`
//! element inside its `<video>` element. Both operations converge: applying
//! one twice changes nothing the second time.

use tracing::{debug, info};

use crate::error::RequestError;
use crate::node::Node;
use crate::registry::ChannelRegistry;

const VIDEO: &str = "video";
const QUALITY: &str = "quality";
const HDTV: &str = "HDTV";
const TITLE: &str = "title";

/// Shown in place of the title of a programme that has none.
pub const UNTITLED: &str = "(untitled)";

/// What to do with the HDTV markers of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HdTagAction {
    #[default]
    Remove,
    Add,
}

/// Outcome of applying an [`HdTagAction`] to one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdTagReport {
    /// The channel id after processing (renamed or not).
    pub channel_id: String,
    /// Number of programmes that were changed.
    pub changed: usize,
    /// Number of programmes of the channel.
    pub programmes: usize,
}

impl HdTagAction {
    /// Suffix appended to a channel id when the processed listing is added
    /// next to the original.
    pub fn id_suffix(self) -> &'static str {
        match self {
            HdTagAction::Remove => "-sd",
            HdTagAction::Add => "-hd",
        }
    }

    pub fn renamed_id(self, id: &str) -> String {
        format!("{}{}", id, self.id_suffix())
    }

    /// Apply to one programme. Returns whether the programme changed.
    pub fn apply(self, programme: &mut Node) -> bool {
        match self {
            HdTagAction::Remove => remove_hd_tag(programme),
            HdTagAction::Add => add_hd_tag(programme),
        }
    }
}

fn is_hd_quality(node: &Node) -> bool {
    node.name == QUALITY && node.text_or_empty().eq_ignore_ascii_case(HDTV)
}

fn hd_quality() -> Node {
    Node::with_text(QUALITY, HDTV)
}

/// The programme's title for log messages.
pub fn programme_title(programme: &Node) -> &str {
    programme
        .child(TITLE)
        .map_or(UNTITLED, Node::text_or_empty)
}

/// Remove the HDTV quality marker from a programme.
///
/// When the marker is the only child of `<video>`, the whole `<video>` element
/// goes; otherwise only the `<quality>` element is removed. Returns whether
/// anything was removed.
pub fn remove_hd_tag(programme: &mut Node) -> bool {
    let Some(video_index) = programme.child_position(VIDEO) else {
        return false;
    };
    let video = &mut programme.children[video_index];
    let Some(quality_index) = video.children.iter().position(is_hd_quality) else {
        return false;
    };

    if video.children.len() == 1 {
        programme.remove_child(video_index);
    } else {
        video.remove_child(quality_index);
    }
    true
}

/// Add an HDTV quality marker to a programme unless it already has one.
///
/// Creates `<video>` when the programme has none. Returns whether anything
/// was added.
pub fn add_hd_tag(programme: &mut Node) -> bool {
    let found = programme.child_position(VIDEO);
    match found {
        Some(video_index) => {
            let video = &mut programme.children[video_index];
            if video.children.iter().any(is_hd_quality) {
                return false;
            }
            video.push_child(hd_quality());
        }
        None => programme.push_child(Node::with_children(VIDEO, vec![hd_quality()])),
    }
    true
}

/// Apply `action` to every programme in the slice, returning how many
/// changed.
pub fn apply_to_programmes(action: HdTagAction, channel_id: &str, programmes: &mut [Node]) -> usize {
    let mut changed = 0;
    for programme in programmes.iter_mut() {
        if action.apply(programme) {
            changed += 1;
            debug!(
                title = programme_title(programme),
                channel = channel_id,
                ?action,
                "Updated HDTV tag"
            );
        }
    }
    changed
}

/// Apply `action` to all programmes of a channel.
///
/// With `rename`, the channel then moves to its `-sd`/`-hd` id: the channel's
/// `id`, every programme's `channel`, and the registry key are rewritten.
/// Nothing is changed when the channel is unknown or the new id is taken.
pub fn apply_to_channel(
    registry: &mut ChannelRegistry,
    channel_id: &str,
    action: HdTagAction,
    rename: bool,
) -> Result<HdTagReport, RequestError> {
    if !registry.has_channel(channel_id) {
        return Err(RequestError::UnknownChannel(channel_id.to_string()));
    }
    let new_id = action.renamed_id(channel_id);
    if rename && registry.has_channel(&new_id) {
        return Err(RequestError::ConflictingIdentifier(new_id));
    }

    info!(channel = channel_id, ?action, "Processing HDTV tags");
    let (changed, programmes) = match registry.programmes_mut(channel_id) {
        Some(programmes) => (
            apply_to_programmes(action, channel_id, programmes),
            programmes.len(),
        ),
        None => (0, 0),
    };
    info!(channel = channel_id, changed, programmes, ?action, "HDTV tags processed");

    let channel_id = if rename {
        registry.rename_channel(channel_id, &new_id);
        info!(from = channel_id, to = %new_id, "Renamed channel");
        new_id
    } else {
        channel_id.to_string()
    };

    Ok(HdTagReport {
        channel_id,
        changed,
        programmes,
    })
}
