//! In-memory content source and record builders.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::core::RosterError;
use crate::notion::model::{
    ChildTitle, ExternalFile, HostedFile, RelationRef, RichText, SelectOption,
};
use crate::notion::{Block, ContentSource, FileObject, PropertyValue, Record, ResultsPage};

/// A [`ContentSource`] backed by synthetic collections, pages and child blocks.
///
/// Collections and child listings are stored as explicit pages; the cursor
/// handed out is the index of the next page. Every call is counted so tests
/// can assert how much of the source was read.
///
/// ```rust,no_run
/// use rosterd::test_utils::{FakeContentSource, block, record};
///
/// let source = FakeContentSource::new()
///     .with_collection("root", vec![record("p1").title("Name", "CommitteeData").build()])
///     .with_children("p1", vec![block::child_database("db", "Committees By Semester")])
///     .failing_query("db", 1);
/// ```
#[derive(Default)]
pub struct FakeContentSource {
    collections: HashMap<String, Vec<Vec<Record>>>,
    children: HashMap<String, Vec<Vec<Block>>>,
    pages: HashMap<String, Record>,
    failing_queries: HashMap<String, usize>,
    failing_pages: HashSet<String>,
    latency: HashMap<String, Duration>,
    query_calls: Mutex<HashMap<String, usize>>,
    children_calls: AtomicUsize,
    page_calls: AtomicUsize,
}

impl FakeContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection delivered as a single page.
    pub fn with_collection(self, id: &str, records: Vec<Record>) -> Self {
        self.with_paged_collection(id, vec![records])
    }

    /// A collection delivered across the given pages, in order.
    pub fn with_paged_collection(mut self, id: &str, pages: Vec<Vec<Record>>) -> Self {
        self.collections.insert(id.to_string(), pages);
        self
    }

    /// Child blocks of a page, as a single listing page.
    pub fn with_children(mut self, id: &str, blocks: Vec<Block>) -> Self {
        self.children.insert(id.to_string(), vec![blocks]);
        self
    }

    /// A page retrievable by its id.
    pub fn with_page(mut self, record: Record) -> Self {
        self.pages.insert(record.id.clone(), record);
        self
    }

    /// Fail the `nth` (1-based) query of collection `id`.
    pub fn failing_query(mut self, id: &str, nth: usize) -> Self {
        self.failing_queries.insert(id.to_string(), nth);
        self
    }

    /// Fail every retrieval of page `id`.
    pub fn failing_page(mut self, id: &str) -> Self {
        self.failing_pages.insert(id.to_string());
        self
    }

    /// Delay every retrieval of page `id`.
    pub fn with_latency(mut self, id: &str, delay: Duration) -> Self {
        self.latency.insert(id.to_string(), delay);
        self
    }

    pub fn query_calls(&self, id: &str) -> usize {
        self.query_calls.lock().unwrap().get(id).copied().unwrap_or(0)
    }

    pub fn total_query_calls(&self) -> usize {
        self.query_calls.lock().unwrap().values().sum()
    }

    pub fn children_calls(&self) -> usize {
        self.children_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    /// Total number of remote reads of any kind.
    pub fn total_calls(&self) -> usize {
        self.total_query_calls() + self.children_calls() + self.page_calls()
    }
}

fn page_at<T: Clone>(
    pages: &[Vec<T>],
    cursor: Option<&str>,
    operation: &str,
) -> Result<ResultsPage<T>, RosterError> {
    let index = match cursor {
        Some(cursor) => cursor
            .parse::<usize>()
            .map_err(|_| RosterError::source(operation, format!("bad cursor {cursor}")))?,
        None => 0,
    };
    let results = pages.get(index).cloned().unwrap_or_default();
    if index + 1 < pages.len() {
        Ok(ResultsPage::with_cursor(results, (index + 1).to_string()))
    } else {
        Ok(ResultsPage::last(results))
    }
}

#[async_trait]
impl ContentSource for FakeContentSource {
    async fn query_collection(
        &self,
        collection_id: &str,
        cursor: Option<&str>,
    ) -> Result<ResultsPage<Record>, RosterError> {
        let operation = format!("query collection {collection_id}");
        let call = {
            let mut calls = self.query_calls.lock().unwrap();
            let count = calls.entry(collection_id.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        if self.failing_queries.get(collection_id) == Some(&call) {
            return Err(RosterError::source(&operation, "HTTP 502 Bad Gateway: injected"));
        }
        let pages = self
            .collections
            .get(collection_id)
            .ok_or_else(|| RosterError::source(&operation, "HTTP 404 Not Found"))?;
        page_at(pages, cursor, &operation)
    }

    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<ResultsPage<Block>, RosterError> {
        let operation = format!("list children of {block_id}");
        self.children_calls.fetch_add(1, Ordering::SeqCst);
        let pages = self
            .children
            .get(block_id)
            .ok_or_else(|| RosterError::source(&operation, "HTTP 404 Not Found"))?;
        page_at(pages, cursor, &operation)
    }

    async fn retrieve_page(&self, page_id: &str) -> Result<Record, RosterError> {
        let operation = format!("retrieve page {page_id}");
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.latency.get(page_id) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_pages.contains(page_id) {
            return Err(RosterError::source(&operation, "HTTP 500: injected"));
        }
        self.pages
            .get(page_id)
            .cloned()
            .ok_or_else(|| RosterError::source(&operation, "HTTP 404 Not Found"))
    }
}

/// Start building a structured record with id `id`.
pub fn record(id: &str) -> RecordBuilder {
    RecordBuilder {
        id: id.to_string(),
        properties: Some(HashMap::new()),
    }
}

/// Builder for [`Record`]s with typed properties.
pub struct RecordBuilder {
    id: String,
    properties: Option<HashMap<String, PropertyValue>>,
}

fn rich_text(text: &str) -> Vec<RichText> {
    vec![RichText {
        plain_text: text.to_string(),
    }]
}

impl RecordBuilder {
    fn property(mut self, name: &str, value: PropertyValue) -> Self {
        self.properties.get_or_insert_with(HashMap::new).insert(name.to_string(), value);
        self
    }

    pub fn title(self, name: &str, text: &str) -> Self {
        self.property(name, PropertyValue::Title { title: rich_text(text) })
    }

    pub fn rich_text(self, name: &str, text: &str) -> Self {
        self.property(name, PropertyValue::RichText { rich_text: rich_text(text) })
    }

    pub fn select(self, name: &str, option: &str) -> Self {
        self.property(
            name,
            PropertyValue::Select {
                select: Some(SelectOption {
                    name: option.to_string(),
                }),
            },
        )
    }

    pub fn empty_select(self, name: &str) -> Self {
        self.property(name, PropertyValue::Select { select: None })
    }

    pub fn relation(self, name: &str, ids: &[&str]) -> Self {
        let relation = ids.iter().map(|id| RelationRef { id: (*id).to_string() }).collect();
        self.property(name, PropertyValue::Relation { relation })
    }

    pub fn number(self, name: &str, number: Option<f64>) -> Self {
        self.property(name, PropertyValue::Number { number })
    }

    pub fn files(self, name: &str, files: Vec<FileObject>) -> Self {
        self.property(name, PropertyValue::Files { files })
    }

    pub fn external_file(self, name: &str, url: &str) -> Self {
        self.files(
            name,
            vec![FileObject::External {
                name: None,
                external: ExternalFile {
                    url: url.to_string(),
                },
            }],
        )
    }

    pub fn uploaded_file(self, name: &str, file_name: &str, url: &str) -> Self {
        self.files(
            name,
            vec![FileObject::File {
                name: Some(file_name.to_string()),
                file: HostedFile {
                    url: url.to_string(),
                },
            }],
        )
    }

    /// Drop the properties payload, as for partial objects.
    pub fn unstructured(mut self) -> Self {
        self.properties = None;
        self
    }

    pub fn build(self) -> Record {
        Record {
            id: self.id,
            object: "page".to_string(),
            properties: self.properties,
        }
    }
}

/// Child block constructors.
pub mod block {
    use super::{Block, ChildTitle};

    fn titled(id: &str, kind: &str, title: &str) -> Block {
        let child = Some(ChildTitle {
            title: title.to_string(),
        });
        Block {
            id: id.to_string(),
            kind: Some(kind.to_string()),
            child_database: if kind == "child_database" { child.clone() } else { None },
            child_page: if kind == "child_page" { child } else { None },
        }
    }

    pub fn child_database(id: &str, title: &str) -> Block {
        titled(id, "child_database", title)
    }

    pub fn child_page(id: &str, title: &str) -> Block {
        titled(id, "child_page", title)
    }

    pub fn paragraph(id: &str) -> Block {
        Block {
            id: id.to_string(),
            kind: Some("paragraph".to_string()),
            child_database: None,
            child_page: None,
        }
    }
}
