//! Front-matter parsing.
//!
//! A content file may open with a YAML block fenced by `---` or a TOML block
//! fenced by `+++`:
//!
//! ```text
//! ---
//! id: hello
//! title: Hello, World !
//! ---
//! # Body starts here
//! ```
//!
//! Recognized keys land in typed fields of [`FrontMatter`]. Everything else is
//! kept in [`FrontMatter::extra`].
//!
//! The body helpers ([`first_heading`], [`first_paragraph`]) feed the title and
//! description fallbacks.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Marker separating a blog post's summary from the rest of the body.
pub const TRUNCATE_MARKER: &str = "<!--truncate-->";

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("YAML front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("TOML front-matter: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("front-matter fields: {0}")]
    Fields(#[from] serde_json::Error),
    #[error("front-matter opened with '{0}' is never closed")]
    Unclosed(&'static str),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub sidebar_label: Option<String>,
    pub slug: Option<String>,
    pub author: Option<String>,
    pub author_url: Option<String>,
    pub author_title: Option<String>,
    pub date: Option<String>,
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Front-matter plus the remaining body of a content file.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<'a> {
    pub front_matter: FrontMatter,
    pub body: &'a str,
}

/// Split `content` into front-matter and body.
///
/// A file without a fence gets default front-matter and the whole content as
/// body.
pub fn parse(content: &str) -> Result<Parsed<'_>, FrontMatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some((fence, rest)) = opening_fence(content) else {
        return Ok(Parsed {
            front_matter: FrontMatter::default(),
            body: content,
        });
    };

    let (block, body) = split_at_closing(rest, fence).ok_or(FrontMatterError::Unclosed(fence))?;
    let value = match fence {
        _ if block.trim().is_empty() => serde_json::Value::Null,
        "+++" => toml_to_json(toml::from_str::<toml::Table>(block)?),
        _ => serde_yaml::from_str::<serde_json::Value>(block)?,
    };
    let value = match value {
        serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
        other => other,
    };
    Ok(Parsed {
        front_matter: serde_json::from_value(value)?,
        body,
    })
}

fn opening_fence(content: &str) -> Option<(&'static str, &str)> {
    let (first, rest) = content.split_once('\n').unwrap_or((content, ""));
    match first.trim_end() {
        "---" => Some(("---", rest)),
        "+++" => Some(("+++", rest)),
        _ => None,
    }
}

/// Returns (block, body) around the first line equal to `fence`.
fn split_at_closing<'a>(rest: &'a str, fence: &str) -> Option<(&'a str, &'a str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == fence {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// TOML dates have no JSON counterpart; they become their RFC 3339 string.
fn toml_to_json(table: toml::Table) -> serde_json::Value {
    serde_json::Value::Object(
        table
            .into_iter()
            .map(|(key, value)| (key, toml_value_to_json(value)))
            .collect(),
    )
}

fn toml_value_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::Value::from(i),
        toml::Value::Float(f) => serde_json::Value::from(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(d) => serde_json::Value::String(d.to_string()),
        toml::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(toml_value_to_json).collect())
        }
        toml::Value::Table(t) => toml_to_json(t),
    }
}

/// Text of the first level-1 heading.
pub fn first_heading(body: &str) -> Option<String> {
    let mut in_heading = false;
    let mut text = String::new();
    for event in Parser::new(body) {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => in_heading = true,
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
                text.clear();
                in_heading = false;
            }
            Event::Text(t) | Event::Code(t) if in_heading => text.push_str(&t),
            _ => {}
        }
    }
    None
}

/// Plain text of the first paragraph, soft breaks folded into spaces.
pub fn first_paragraph(body: &str) -> Option<String> {
    let mut in_paragraph = false;
    let mut text = String::new();
    for event in Parser::new(body) {
        match event {
            Event::Start(Tag::Paragraph) => in_paragraph = true,
            Event::End(TagEnd::Paragraph) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
                text.clear();
                in_paragraph = false;
            }
            Event::Text(t) | Event::Code(t) if in_paragraph => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak if in_paragraph => text.push(' '),
            _ => {}
        }
    }
    None
}

pub fn is_truncated(body: &str) -> bool {
    body.contains(TRUNCATE_MARKER)
}
