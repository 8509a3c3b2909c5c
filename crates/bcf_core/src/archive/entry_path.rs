//! Archive entry name resolution.
//!
//! Entry names follow `<group_id>/<inner_name>`. The group id is everything up
//! to the first `/`; the inner name keeps any further separators.

use once_cell::sync::Lazy;
use regex::Regex;

pub const MARKUP_FILE_NAME: &str = "markup.bcf";
pub const VIEWPOINT_FILE_NAME: &str = "viewpoint.bcfv";
pub const SNAPSHOT_FILE_NAME: &str = "snapshot.png";

static ENTRY_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(?P<group>[^/]+)/(?P<inner>.*)$").expect("valid entry name regex")
});

/// Group/inner split of one archive entry name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPath<'a> {
    pub group_id: &'a str,
    pub inner_name: &'a str,
}

/// Role of a topic file, decided by its inner name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactRole {
    Markup,
    Viewpoint,
    Snapshot,
    /// Any other file; ignored unless sidecars are retained.
    Sidecar,
}

impl ArtifactRole {
    /// Classifies an inner name, ignoring ASCII case.
    pub fn from_inner_name(inner_name: &str) -> Self {
        if inner_name.eq_ignore_ascii_case(MARKUP_FILE_NAME) {
            Self::Markup
        } else if inner_name.eq_ignore_ascii_case(VIEWPOINT_FILE_NAME) {
            Self::Viewpoint
        } else if inner_name.eq_ignore_ascii_case(SNAPSHOT_FILE_NAME) {
            Self::Snapshot
        } else {
            Self::Sidecar
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markup => "markup",
            Self::Viewpoint => "viewpoint",
            Self::Snapshot => "snapshot",
            Self::Sidecar => "sidecar",
        }
    }
}

/// Splits `entry_name` on its first `/`.
///
/// Returns `None` when the name has no separator, e.g. root-level files such
/// as `bcf.version`, or when the group segment is empty.
pub fn resolve_entry_path(entry_name: &str) -> Option<EntryPath<'_>> {
    let captures = ENTRY_NAME_RE.captures(entry_name)?;
    Some(EntryPath {
        group_id: captures.name("group")?.as_str(),
        inner_name: captures.name("inner")?.as_str(),
    })
}

/// Builds the forward-slash entry name for a topic file.
pub fn entry_name(group_id: &str, inner_name: &str) -> String {
    format!("{group_id}/{inner_name}")
}
