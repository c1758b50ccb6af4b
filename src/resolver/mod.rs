//! Named-node resolution in the content graph.
//!
//! The roster lives at a fixed path of titled nodes below the root collection.
//! [`NodeResolver`] walks one step of that path: given a parent node, it lists
//! the parent's immediate children and returns the first one of the requested
//! kind whose title matches exactly.
//!
//! # Matching Rules
//!
//! - Titles compare exactly and case-sensitively; there is no fuzzy matching
//! - When several children match, the first in the source's native order wins
//! - Listing stops as soon as a match is found, so later pages are never fetched
//!
//! # Child Listings
//!
//! | Parent kind | Children come from | Child kinds |
//! |-------------|--------------------|-------------|
//! | collection | paginated collection query | pages (rows) |
//! | page/block | paginated block children | `child_page` → page, `child_database` → collection |

use futures::TryStreamExt;
use tracing::debug;

use crate::core::RosterError;
use crate::notion::{Block, CollectionReader, ContentNode, ContentSource, NodeKind};

/// Resolves titled children of content nodes.
#[derive(Clone, Copy)]
pub struct NodeResolver<'a> {
    reader: CollectionReader<'a>,
}

impl<'a> NodeResolver<'a> {
    #[must_use]
    pub const fn new(source: &'a dyn ContentSource) -> Self {
        Self {
            reader: CollectionReader::new(source),
        }
    }

    /// Find the first child of `parent` with `kind` titled `title`.
    ///
    /// Returns `Ok(None)` when no child matches.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::SourceUnavailable`] if any listing page fails.
    pub async fn find(
        &self,
        parent: &ContentNode,
        kind: NodeKind,
        title: &str,
    ) -> Result<Option<ContentNode>, RosterError> {
        match parent.kind {
            NodeKind::Collection => {
                if kind != NodeKind::Page {
                    return Ok(None);
                }
                let mut rows = self.reader.records(&parent.id);
                while let Some(row) = rows.try_next().await? {
                    if row.title().as_deref() == Some(title) {
                        return Ok(Some(ContentNode::new(row.id, NodeKind::Page, title)));
                    }
                }
                Ok(None)
            }
            NodeKind::Page | NodeKind::Block => {
                let mut blocks = self.reader.children(&parent.id);
                while let Some(block) = blocks.try_next().await? {
                    if block_kind(&block) == Some(kind) && block.child_title() == Some(title) {
                        return Ok(Some(ContentNode::new(block.id, kind, title)));
                    }
                }
                Ok(None)
            }
        }
    }

    /// Like [`NodeResolver::find`], but a missing child is a [`RosterError::NotFound`].
    pub async fn resolve(
        &self,
        parent: &ContentNode,
        kind: NodeKind,
        title: &str,
    ) -> Result<ContentNode, RosterError> {
        let node = self.find(parent, kind, title).await?.ok_or_else(|| RosterError::NotFound {
            kind: kind.to_string(),
            title: title.to_string(),
            parent: parent.to_string(),
        })?;
        debug!("Resolved {} under {}", node, parent);
        Ok(node)
    }
}

fn block_kind(block: &Block) -> Option<NodeKind> {
    match block.kind.as_deref()? {
        "child_page" => Some(NodeKind::Page),
        "child_database" => Some(NodeKind::Collection),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeContentSource, block, record};

    fn root() -> ContentNode {
        ContentNode::root_collection("root")
    }

    #[tokio::test]
    async fn test_finds_row_of_collection_by_title() {
        let source = FakeContentSource::new().with_collection(
            "root",
            vec![
                record("p-articles").title("Name", "Articles").build(),
                record("p-committee").title("Name", "CommitteeData").build(),
            ],
        );

        let node = NodeResolver::new(&source)
            .resolve(&root(), NodeKind::Page, "CommitteeData")
            .await
            .unwrap();

        assert_eq!(node, ContentNode::new("p-committee", NodeKind::Page, "CommitteeData"));
    }

    #[tokio::test]
    async fn test_matching_is_case_sensitive() {
        let source = FakeContentSource::new()
            .with_collection("root", vec![record("p1").title("Name", "committeedata").build()]);

        let found = NodeResolver::new(&source)
            .find(&root(), NodeKind::Page, "CommitteeData")
            .await
            .unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let page = ContentNode::new("page", NodeKind::Page, "2025");
        let source = FakeContentSource::new().with_children(
            "page",
            vec![
                block::child_database("db-first", "Members"),
                block::child_database("db-second", "Members"),
            ],
        );

        let node = NodeResolver::new(&source)
            .resolve(&page, NodeKind::Collection, "Members")
            .await
            .unwrap();
        assert_eq!(node.id, "db-first");
    }

    #[tokio::test]
    async fn test_kind_filter_applies_to_children() {
        let page = ContentNode::new("page", NodeKind::Page, "CommitteeData");
        let source = FakeContentSource::new().with_children(
            "page",
            vec![
                block::child_page("pg", "Committees By Semester"),
                block::paragraph("para"),
                block::child_database("db", "Committees By Semester"),
            ],
        );
        let resolver = NodeResolver::new(&source);

        let collection =
            resolver.resolve(&page, NodeKind::Collection, "Committees By Semester").await.unwrap();
        assert_eq!(collection.id, "db");

        let child_page =
            resolver.resolve(&page, NodeKind::Page, "Committees By Semester").await.unwrap();
        assert_eq!(child_page.id, "pg");
    }

    #[tokio::test]
    async fn test_missing_child_is_not_found() {
        let page = ContentNode::new("page", NodeKind::Page, "2025");
        let source = FakeContentSource::new()
            .with_children("page", vec![block::child_database("db", "Teams")]);

        let err = NodeResolver::new(&source)
            .resolve(&page, NodeKind::Collection, "Members")
            .await
            .unwrap_err();

        match err {
            RosterError::NotFound { kind, title, parent } => {
                assert_eq!(kind, "collection");
                assert_eq!(title, "Members");
                assert!(parent.contains("page"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stops_listing_after_match() {
        let source = FakeContentSource::new().with_paged_collection(
            "root",
            vec![
                vec![record("p1").title("Name", "CommitteeData").build()],
                vec![record("p2").title("Name", "Other").build()],
            ],
        );

        NodeResolver::new(&source).resolve(&root(), NodeKind::Page, "CommitteeData").await.unwrap();
        assert_eq!(source.query_calls("root"), 1);
    }

    #[tokio::test]
    async fn test_listing_failure_propagates() {
        let source = FakeContentSource::new()
            .with_collection("root", vec![])
            .failing_query("root", 1);
        let err = NodeResolver::new(&source)
            .resolve(&root(), NodeKind::Page, "CommitteeData")
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::SourceUnavailable { .. }));
    }
}
