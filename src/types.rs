//! Shared types passed between pipeline stages.
//!
//! These are serialized into the generated metadata artifacts, so field names
//! follow the camelCase convention the downstream renderer reads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reference to an adjacent document in sidebar order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub title: String,
    pub permalink: String,
}

/// One resolved documentation file.
///
/// Stage 1 records (straight out of [`crate::metadata::process_metadata`])
/// have `sidebar`, `previous` and `next` unset. [`crate::order::link_documents`]
/// returns filled-in copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocMetadata {
    pub id: String,
    pub unversioned_id: String,
    /// `@site/`-prefixed source path.
    pub source: String,
    pub permalink: String,
    /// Version label, `next` for the unversioned tree. `None` when versioning is off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Language tag. `None` for the default language and when translation is off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar: Option<String>,
    pub is_docs_home_page: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<NavLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<NavLink>,
}

impl DocMetadata {
    pub fn nav_link(&self) -> NavLink {
        NavLink {
            title: self.title.clone(),
            permalink: self.permalink.clone(),
        }
    }
}

/// Id-indexed documents of one docs plugin instance.
pub type DocsMetadata = BTreeMap<String, DocMetadata>;

/// One blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub source: String,
    pub permalink: String,
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_title: Option<String>,
    /// Body carries a `<!--truncate-->` marker.
    pub truncated: bool,
    /// Newer post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_item: Option<NavLink>,
    /// Older post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_item: Option<NavLink>,
}

/// A page under the pages plugin's directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub permalink: String,
    pub source: String,
    /// Language prefix the page is served under, `None` for the unprefixed copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub is_markdown: bool,
}
