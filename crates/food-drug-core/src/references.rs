//! Splitting free-text references into plain text and links.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[^\s]+").expect("URL pattern is a valid regex")
});

/// A piece of reference text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReferenceSegment {
    Text(String),
    Link(String),
}

/// Split `text` into alternating plain-text and link segments, in order.
pub fn split_links(text: &str) -> Vec<ReferenceSegment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for found in URL_PATTERN.find_iter(text) {
        if found.start() > last {
            segments.push(ReferenceSegment::Text(text[last..found.start()].to_string()));
        }
        segments.push(ReferenceSegment::Link(found.as_str().to_string()));
        last = found.end();
    }

    if last < text.len() {
        segments.push(ReferenceSegment::Text(text[last..].to_string()));
    }

    segments
}
