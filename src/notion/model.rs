//! Wire model for the remote content source.
//!
//! Only the shapes the roster pipeline reads are modelled. Property values are
//! a tagged enum keyed on the API's `type` field; every kind the pipeline does
//! not use decodes to [`PropertyValue::Other`] so unexpected schemas never fail
//! a whole page of results.

use serde::Deserialize;
use std::collections::HashMap;

use crate::core::SkipRecord;

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultsPage<T> {
    pub results: Vec<T>,
    /// Cursor for the next page; `None` when the listing is exhausted.
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

impl<T> ResultsPage<T> {
    /// A final page with no continuation.
    #[must_use]
    pub fn last(results: Vec<T>) -> Self {
        Self {
            results,
            next_cursor: None,
            has_more: false,
        }
    }

    /// A page followed by another one at `cursor`.
    #[must_use]
    pub fn with_cursor(results: Vec<T>, cursor: impl Into<String>) -> Self {
        Self {
            results,
            next_cursor: Some(cursor.into()),
            has_more: true,
        }
    }
}

/// A row of a collection, or a standalone page.
///
/// Partial objects (no `properties`) are tolerated at decode time and filtered
/// out by the collection reader.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub properties: Option<HashMap<String, PropertyValue>>,
}

/// A child block of a page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Block {
    pub id: String,
    /// Block type tag (`child_database`, `child_page`, `paragraph`, …).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub child_database: Option<ChildTitle>,
    #[serde(default)]
    pub child_page: Option<ChildTitle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChildTitle {
    pub title: String,
}

/// Response of the database endpoint; only its data sources matter here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseInfo {
    pub id: String,
    #[serde(default)]
    pub data_sources: Vec<DataSourceRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataSourceRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A property value, tagged by its declared kind.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title { title: Vec<RichText> },
    RichText { rich_text: Vec<RichText> },
    Select { select: Option<SelectOption> },
    Relation { relation: Vec<RelationRef> },
    Number { number: Option<f64> },
    Files { files: Vec<FileObject> },
    #[serde(other)]
    Other,
}

impl PropertyValue {
    /// The declared kind, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Title { .. } => "title",
            Self::RichText { .. } => "rich_text",
            Self::Select { .. } => "select",
            Self::Relation { .. } => "relation",
            Self::Number { .. } => "number",
            Self::Files { .. } => "files",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RichText {
    pub plain_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelationRef {
    pub id: String,
}

/// A file attached to a `files` property.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileObject {
    /// Uploaded to and served by the content source (short-lived signed URL).
    File {
        #[serde(default)]
        name: Option<String>,
        file: HostedFile,
    },
    /// A link to a file hosted elsewhere.
    External {
        #[serde(default)]
        name: Option<String>,
        external: ExternalFile,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostedFile {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalFile {
    pub url: String,
}

fn join_plain_text(parts: &[RichText]) -> String {
    parts.iter().map(|t| t.plain_text.as_str()).collect()
}

impl Record {
    /// Whether the record carries a properties payload at all.
    #[must_use]
    pub fn is_structured(&self) -> bool {
        self.object == "page" && self.properties.is_some()
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Result<&PropertyValue, SkipRecord> {
        self.properties
            .as_ref()
            .and_then(|props| props.get(name))
            .ok_or_else(|| SkipRecord::new(&self.id, format!("missing property '{name}'")))
    }

    fn wrong_kind(&self, name: &str, expected: &str, found: &PropertyValue) -> SkipRecord {
        SkipRecord::new(
            &self.id,
            format!("property '{name}' is {}, expected {expected}", found.kind()),
        )
    }

    /// The text of the record's title property, whatever it is named.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.properties.as_ref()?.values().find_map(|value| match value {
            PropertyValue::Title { title } => Some(join_plain_text(title)),
            _ => None,
        })
    }

    /// Non-empty text of a title or rich-text property.
    pub fn text(&self, name: &str) -> Result<String, SkipRecord> {
        let text = match self.property(name)? {
            PropertyValue::Title { title: parts } | PropertyValue::RichText { rich_text: parts } => {
                join_plain_text(parts)
            }
            other => return Err(self.wrong_kind(name, "title or rich_text", other)),
        };
        let text = text.trim();
        if text.is_empty() {
            return Err(SkipRecord::new(&self.id, format!("property '{name}' is empty")));
        }
        Ok(text.to_string())
    }

    /// Name of the chosen option of a select property.
    pub fn select(&self, name: &str) -> Result<String, SkipRecord> {
        match self.property(name)? {
            PropertyValue::Select {
                select: Some(option),
            } => Ok(option.name.clone()),
            PropertyValue::Select { select: None } => {
                Err(SkipRecord::new(&self.id, format!("select '{name}' has no value")))
            }
            other => Err(self.wrong_kind(name, "select", other)),
        }
    }

    /// Referenced record identifiers of a relation property, in source order.
    pub fn relation_ids(&self, name: &str) -> Result<Vec<String>, SkipRecord> {
        match self.property(name)? {
            PropertyValue::Relation { relation } => {
                Ok(relation.iter().map(|r| r.id.clone()).collect())
            }
            other => Err(self.wrong_kind(name, "relation", other)),
        }
    }

    /// Value of a number property, `None` when unset.
    pub fn number(&self, name: &str) -> Result<Option<f64>, SkipRecord> {
        match self.property(name)? {
            PropertyValue::Number { number } => Ok(*number),
            other => Err(self.wrong_kind(name, "number", other)),
        }
    }

    /// Attachments of a files property.
    pub fn files(&self, name: &str) -> Result<&[FileObject], SkipRecord> {
        match self.property(name)? {
            PropertyValue::Files { files } => Ok(files),
            other => Err(self.wrong_kind(name, "files", other)),
        }
    }
}

impl Block {
    /// Title of a `child_database` or `child_page` block.
    #[must_use]
    pub fn child_title(&self) -> Option<&str> {
        match self.kind.as_deref()? {
            "child_database" => self.child_database.as_ref().map(|c| c.title.as_str()),
            "child_page" => self.child_page.as_ref().map(|c| c.title.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(properties: serde_json::Value) -> Record {
        serde_json::from_value(json!({
            "object": "page",
            "id": "rec-1",
            "properties": properties,
        }))
        .unwrap()
    }

    #[test]
    fn test_decodes_known_and_unknown_property_kinds() {
        let rec = record(json!({
            "Position": {"id": "a", "type": "title", "title": [
                {"plain_text": "Vice ", "annotations": {}},
                {"plain_text": "President"}
            ]},
            "Team": {"id": "b", "type": "select", "select": {"id": "x", "name": "Events", "color": "red"}},
            "People": {"id": "c", "type": "relation", "relation": [{"id": "p1"}, {"id": "p2"}], "has_more": false},
            "Order": {"id": "d", "type": "number", "number": 3},
            "Updated": {"id": "e", "type": "last_edited_time", "last_edited_time": "2025-01-01T00:00:00Z"},
        }));

        assert_eq!(rec.text("Position").unwrap(), "Vice President");
        assert_eq!(rec.title().as_deref(), Some("Vice President"));
        assert_eq!(rec.select("Team").unwrap(), "Events");
        assert_eq!(rec.relation_ids("People").unwrap(), vec!["p1", "p2"]);
        assert_eq!(rec.number("Order").unwrap(), Some(3.0));
        assert_eq!(rec.property("Updated").unwrap(), &PropertyValue::Other);
    }

    #[test]
    fn test_wrong_kind_is_skip_signal() {
        let rec = record(json!({
            "Team": {"type": "number", "number": 1},
        }));
        let skip = rec.select("Team").unwrap_err();
        assert_eq!(skip.record_id, "rec-1");
        assert!(skip.reason.contains("is number, expected select"));
    }

    #[test]
    fn test_missing_and_empty_values_are_skip_signals() {
        let rec = record(json!({
            "Name": {"type": "title", "title": []},
            "Team": {"type": "select", "select": null},
        }));
        assert!(rec.text("Name").unwrap_err().reason.contains("empty"));
        assert!(rec.select("Team").unwrap_err().reason.contains("no value"));
        assert!(rec.files("Photo").unwrap_err().reason.contains("missing property"));
    }

    #[test]
    fn test_partial_record_is_not_structured() {
        let partial: Record = serde_json::from_value(json!({"object": "page", "id": "p"})).unwrap();
        assert!(!partial.is_structured());
        let other: Record =
            serde_json::from_value(json!({"object": "database", "id": "d", "properties": {}}))
                .unwrap();
        assert!(!other.is_structured());
    }

    #[test]
    fn test_file_objects() {
        let rec = record(json!({
            "Photo": {"type": "files", "files": [
                {"type": "file", "name": "me.png", "file": {"url": "https://s3/me.png", "expiry_time": "x"}},
                {"type": "external", "name": "cdn", "external": {"url": "https://cdn/me.jpg"}},
                {"type": "file_upload", "file_upload": {"id": "u"}}
            ]}
        }));
        let files = rec.files("Photo").unwrap();
        assert!(matches!(&files[0], FileObject::File { file, .. } if file.url == "https://s3/me.png"));
        assert!(
            matches!(&files[1], FileObject::External { external, .. } if external.url == "https://cdn/me.jpg")
        );
        assert_eq!(files[2], FileObject::Unsupported);
    }

    #[test]
    fn test_block_child_titles() {
        let blocks: Vec<Block> = serde_json::from_value(json!([
            {"id": "1", "type": "child_database", "child_database": {"title": "Members"}},
            {"id": "2", "type": "child_page", "child_page": {"title": "2025"}},
            {"id": "3", "type": "paragraph", "paragraph": {"rich_text": []}},
            {"id": "4"}
        ]))
        .unwrap();

        assert_eq!(blocks[0].child_title(), Some("Members"));
        assert_eq!(blocks[1].child_title(), Some("2025"));
        assert_eq!(blocks[2].child_title(), None);
        assert_eq!(blocks[3].kind, None);
    }
}
