use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Post-processing hook applied to a processed link list before it is used.
/// Receives the list, the owning item ID and the field; returns the list to
/// actually inject.
pub type ProcessedLinksHook =
    Arc<dyn Fn(Vec<String>, i64, LinkField) -> Vec<String> + Send + Sync>;

/// The two named link lists stored per content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkField {
    Significant,
    Related,
}

impl LinkField {
    pub const ALL: [LinkField; 2] = [LinkField::Significant, LinkField::Related];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkField::Significant => "significant",
            LinkField::Related => "related",
        }
    }

    /// Metadata key the raw newline-delimited list is stored under.
    pub fn meta_key(&self) -> &'static str {
        match self {
            LinkField::Significant => "significant_links_raw",
            LinkField::Related => "related_links_raw",
        }
    }

    /// Schema.org property the processed list is written to.
    pub fn property(&self) -> &'static str {
        match self {
            LinkField::Significant => "significantLink",
            LinkField::Related => "relatedLink",
        }
    }

    pub fn parse(s: &str) -> Option<LinkField> {
        match s {
            "significant" => Some(LinkField::Significant),
            "related" => Some(LinkField::Related),
            _ => None,
        }
    }
}

/// Normalize a single line into a canonical absolute URL.
///
/// Only absolute `http`/`https` URLs with a host are accepted. The `url`
/// round-trip canonicalizes percent-encoding, lowercases the host and drops
/// default ports, so the output is safe to embed in JSON or HTML attributes.
pub fn normalize_link(line: &str) -> Option<String> {
    let url = Url::parse(line).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.host_str()?;
    Some(url.to_string())
}

/// Validate one user-supplied link, for editing surfaces that need the
/// rejection surfaced rather than silently dropped.
pub fn validate_link(line: &str) -> Result<String> {
    let line = line.trim();
    normalize_link(line).ok_or_else(|| PipelineError::InvalidUrl(line.to_string()))
}

/// Turn raw newline-delimited text into a validated, deduplicated, ordered
/// list of absolute `http`/`https` URLs.
///
/// Lines failing validation are silently dropped; free-text input is expected
/// to contain garbage and that is not an error. Deterministic and idempotent:
/// feeding the joined output back in reproduces the same list.
pub fn process_links(raw: &str) -> Vec<String> {
    process_links_with_dropped(raw).0
}

/// Same as [`process_links`], also reporting how many non-blank lines failed
/// validation. The count is for editing surfaces; the render path ignores it.
pub fn process_links_with_dropped(raw: &str) -> (Vec<String>, usize) {
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    let mut dropped = 0;

    // split on CR and LF individually so CR, LF and CRLF endings all work;
    // the empty fragment a CRLF pair produces falls out as a blank line
    for line in raw.split(['\r', '\n']) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match normalize_link(line) {
            Some(url) => {
                if seen.insert(url.clone()) {
                    links.push(url);
                }
            }
            None => {
                debug!("Dropping invalid link line: {}", line);
                dropped += 1;
            }
        }
    }

    (links, dropped)
}
