//! Previous/next ordering from sidebars.
//!
//! Ordering runs in two stages:
//!
//! 1. [`create_order`] walks the sidebars alone and records, per doc id, its
//!    sidebar and adjacent ids.
//! 2. [`link_documents`] takes the complete id-indexed document map and
//!    returns new records with `sidebar`, `previous` and `next` filled in.
//!    Titles of adjacent docs are only known once every doc is resolved,
//!    which is why this runs after metadata processing finishes.
//!
//! Adjacency crosses category boundaries within a sidebar, never sidebars:
//!
//! ```text
//! docs:  Getting Started [hello, install]  Guides [foo/bar]
//!
//! hello    → next install
//! install  → previous hello, next foo/bar
//! foo/bar  → previous install
//! ```

use crate::sidebar::Sidebars;
use crate::types::DocsMetadata;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Sidebar '{sidebar}' references doc '{id}', which does not exist")]
    UnknownDoc { id: String, sidebar: String },
}

/// Position of one doc id in its sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEntry {
    pub sidebar: String,
    pub previous: Option<String>,
    pub next: Option<String>,
}

pub type Order = BTreeMap<String, OrderEntry>;

/// Flatten each sidebar and record adjacency per id.
///
/// An id listed more than once takes the position of its last occurrence.
pub fn create_order(sidebars: &Sidebars) -> Order {
    let mut order = Order::new();
    for sidebar in sidebars.iter() {
        let ids: Vec<&str> = sidebar.flattened().collect();
        for (i, id) in ids.iter().enumerate() {
            let entry = OrderEntry {
                sidebar: sidebar.name.clone(),
                previous: i.checked_sub(1).map(|p| ids[p].to_string()),
                next: ids.get(i + 1).map(|n| n.to_string()),
            };
            if order.insert(id.to_string(), entry).is_some() {
                tracing::warn!(id = %id, sidebar = %sidebar.name, "Doc listed more than once in sidebars");
            }
        }
    }
    order
}

/// Attach sidebar membership and previous/next links to every ordered doc.
///
/// Fails before producing anything if the order names an id missing from
/// `docs`. Docs absent from the order are returned unchanged.
pub fn link_documents(docs: &DocsMetadata, order: &Order) -> Result<DocsMetadata, OrderError> {
    if let Some((id, entry)) = order.iter().find(|(id, _)| !docs.contains_key(id.as_str())) {
        return Err(OrderError::UnknownDoc {
            id: id.clone(),
            sidebar: entry.sidebar.clone(),
        });
    }

    let link = |id: &Option<String>| {
        id.as_deref()
            .and_then(|id| docs.get(id))
            .map(|doc| doc.nav_link())
    };

    Ok(docs
        .iter()
        .map(|(id, doc)| {
            let mut linked = doc.clone();
            if let Some(entry) = order.get(id) {
                linked.sidebar = Some(entry.sidebar.clone());
                linked.previous = link(&entry.previous);
                linked.next = link(&entry.next);
            }
            (id.clone(), linked)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DocMetadata, NavLink};
    use pretty_assertions::assert_eq;

    fn sidebars(json: &str) -> Sidebars {
        serde_json::from_str(json).unwrap()
    }

    fn doc(id: &str, title: &str) -> DocMetadata {
        DocMetadata {
            id: id.to_string(),
            unversioned_id: id.to_string(),
            source: format!("@site/docs/{id}.md"),
            permalink: format!("/docs/{id}"),
            version: None,
            language: None,
            title: title.to_string(),
            description: String::new(),
            sidebar_label: None,
            sidebar: None,
            is_docs_home_page: false,
            previous: None,
            next: None,
        }
    }

    fn docs(entries: &[(&str, &str)]) -> DocsMetadata {
        entries
            .iter()
            .map(|(id, title)| (id.to_string(), doc(id, title)))
            .collect()
    }

    #[test]
    fn adjacency_crosses_categories() {
        let order = create_order(&sidebars(
            r#"{"docs": {"Start": ["hello", "install"], "Guides": ["foo/bar"]}}"#,
        ));
        assert_eq!(
            order["install"],
            OrderEntry {
                sidebar: "docs".into(),
                previous: Some("hello".into()),
                next: Some("foo/bar".into()),
            }
        );
        assert_eq!(order["hello"].previous, None);
        assert_eq!(order["foo/bar"].next, None);
    }

    #[test]
    fn adjacency_never_crosses_sidebars() {
        let order = create_order(&sidebars(
            r#"{"docs": {"A": ["a1", "a2"]}, "api": {"B": ["b1", "b2"]}}"#,
        ));
        assert_eq!(order["a2"].next, None);
        assert_eq!(order["b1"].previous, None);
        assert_eq!(order["b1"].sidebar, "api");
    }

    #[test]
    fn order_covers_exactly_the_sidebar_ids() {
        let sidebars = sidebars(r#"{"docs": {"A": ["a", "b"], "B": ["c"]}, "x": {"C": ["d"]}}"#);
        let order = create_order(&sidebars);
        let mut referenced: Vec<&str> = sidebars.iter().flat_map(|s| s.flattened()).collect();
        referenced.sort();
        let ordered: Vec<&str> = order.keys().map(String::as_str).collect();
        assert_eq!(ordered, referenced);
    }

    #[test]
    fn link_documents_snapshots_titles() {
        let docs = docs(&[("hello", "Hello"), ("install", "Install"), ("loose", "Loose")]);
        let order = create_order(&sidebars(r#"{"docs": {"Start": ["hello", "install"]}}"#));
        let linked = link_documents(&docs, &order).unwrap();

        assert_eq!(
            linked["hello"].next,
            Some(NavLink {
                title: "Install".into(),
                permalink: "/docs/install".into(),
            })
        );
        assert_eq!(linked["install"].previous.as_ref().unwrap().title, "Hello");
        assert_eq!(linked["hello"].sidebar.as_deref(), Some("docs"));

        assert_eq!(linked["loose"], docs["loose"]);
        assert_eq!(docs["hello"].next, None, "stage 1 records are untouched");
    }

    #[test]
    fn unknown_sidebar_id_is_error() {
        let docs = docs(&[("hello", "Hello")]);
        let order = create_order(&sidebars(r#"{"docs": {"Start": ["hello", "ghost"]}}"#));
        let err = link_documents(&docs, &order).unwrap_err();
        assert!(matches!(err, OrderError::UnknownDoc { ref id, ref sidebar } if id == "ghost" && sidebar == "docs"));
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn versioned_sidebars_stay_within_version() {
        let plain = r#"{"docs": {"Start": ["hello", "foo/bar"]}}"#;
        let mut all = sidebars(plain);
        all.extend(crate::sidebar::namespace(sidebars(plain), "1.0.0"));
        let order = create_order(&all);
        assert_eq!(order["foo/bar"].next, None);
        assert_eq!(order["version-1.0.0/hello"].previous, None);
        assert_eq!(order["version-1.0.0/hello"].next.as_deref(), Some("version-1.0.0/foo/bar"));
        assert_eq!(order["version-1.0.0/hello"].sidebar, "version-1.0.0/docs");
    }
}
