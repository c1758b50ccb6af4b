//! Remote content source: model, transport and pagination.
//!
//! The pipeline reads the workspace through the [`ContentSource`] trait, which
//! exposes exactly the three read calls it needs. [`NotionClient`] implements
//! it against the Notion REST API; tests use an in-memory fake.
//!
//! - [`model`] - records, blocks and tagged property values
//! - [`pagination`] - lazy cursor-driven listings ([`CollectionReader`])
//! - [`client`] - the `reqwest` implementation
//!
//! Nothing here ever writes to the content source.

pub mod client;
pub mod model;
pub mod pagination;

use async_trait::async_trait;
use std::fmt;

pub use client::NotionClient;
pub use model::{Block, FileObject, PropertyValue, Record, ResultsPage};
pub use pagination::{CollectionReader, paginate};

use crate::core::RosterError;

/// Read access to the hierarchical content store.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// One page of a collection's rows, starting at `cursor` (`None` = first page).
    async fn query_collection(
        &self,
        collection_id: &str,
        cursor: Option<&str>,
    ) -> Result<ResultsPage<Record>, RosterError>;

    /// One page of a page's child blocks, starting at `cursor`.
    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<ResultsPage<Block>, RosterError>;

    /// A single page (row) by identifier.
    async fn retrieve_page(&self, page_id: &str) -> Result<Record, RosterError>;
}

/// Kinds of addressable nodes in the content graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Page,
    Collection,
    Block,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Page => "page",
            Self::Collection => "collection",
            Self::Block => "block",
        })
    }
}

/// A node located in the content graph. Identity is the remote `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentNode {
    pub id: String,
    pub kind: NodeKind,
    pub title: String,
}

impl ContentNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
        }
    }

    /// The configured root collection, whose title is not known up front.
    pub fn root_collection(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Collection, "root collection")
    }
}

impl fmt::Display for ContentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' ({})", self.kind, self.title, self.id)
    }
}
