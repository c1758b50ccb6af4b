//! Roster records read from the workspace, and the values derived from them.
//!
//! Each remote record kind has a `from_record` parser driven by the configured
//! property names. Parsers never fail the run: a record without the required
//! shape yields a [`SkipRecord`].

use serde::Serialize;
use std::fmt;

use crate::config::{MembershipSchema, ProfileSchema, TeamSchema};
use crate::core::SkipRecord;
use crate::notion::{FileObject, Record};

/// Rendering tier of a role.
///
/// Only [`RoleTier::Director`] and [`RoleTier::Officer`] appear in the snapshot;
/// any other label is kept so it can be logged, then dropped at render time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoleTier {
    Director,
    Officer,
    Other(String),
}

impl RoleTier {
    /// Parse a tier label. Only the exact labels `director` and `officer` are
    /// recognised; `"Director"` or `" officer"` are [`RoleTier::Other`].
    #[must_use]
    pub fn parse(label: &str) -> Self {
        match label {
            "director" => Self::Director,
            "officer" => Self::Officer,
            _ => Self::Other(label.to_string()),
        }
    }
}

impl fmt::Display for RoleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Director => f.write_str("director"),
            Self::Officer => f.write_str("officer"),
            Self::Other(label) => f.write_str(label),
        }
    }
}

/// One role on the committee and the people holding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipRecord {
    pub id: String,
    /// Role or position label, e.g. "Treasurer".
    pub title: String,
    /// Team label; must name a team metadata record.
    pub team: String,
    pub role_tier: RoleTier,
    /// Profile identifiers, in the order the relation lists them.
    pub member_refs: Vec<String>,
}

impl MembershipRecord {
    pub fn from_record(record: &Record, schema: &MembershipSchema) -> Result<Self, SkipRecord> {
        Ok(Self {
            id: record.id.clone(),
            title: record.text(&schema.title)?,
            team: record.select(&schema.team)?,
            role_tier: RoleTier::parse(&record.select(&schema.role_tier)?),
            member_refs: record.relation_ids(&schema.members)?,
        })
    }
}

/// Where a profile's image lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// Hosted elsewhere; used as-is.
    External { url: String },
    /// Uploaded to the content source; must be copied to the blob store.
    Uploaded {
        source_url: String,
        content_type_hint: Option<String>,
    },
}

/// A person as described by their profile record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub id: String,
    pub display_name: String,
    pub image: ImageReference,
}

impl ProfileRecord {
    /// Parse a profile; the first attachment of the image property is used.
    pub fn from_record(record: &Record, schema: &ProfileSchema) -> Result<Self, SkipRecord> {
        let display_name = record.text(&schema.display_name)?;
        let image = match record.files(&schema.image)?.first() {
            Some(FileObject::External { external, .. }) => ImageReference::External {
                url: external.url.clone(),
            },
            Some(FileObject::File { name, file }) => ImageReference::Uploaded {
                source_url: file.url.clone(),
                content_type_hint: name.as_deref().and_then(content_type_from_name),
            },
            Some(FileObject::Unsupported) | None => {
                return Err(SkipRecord::new(
                    &record.id,
                    format!("property '{}' has no usable image", schema.image),
                ));
            }
        };

        Ok(Self {
            id: record.id.clone(),
            display_name,
            image,
        })
    }
}

/// Guess an image content type from an attachment's file name.
fn content_type_from_name(name: &str) -> Option<String> {
    let (_, extension) = name.rsplit_once('.')?;
    let content_type = match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(content_type.to_string())
}

/// Display metadata for one team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMetadataRecord {
    pub team_name: String,
    /// Position in the snapshot; `None` when missing, zero, negative or fractional.
    pub sort_index: Option<u32>,
}

impl TeamMetadataRecord {
    pub fn from_record(record: &Record, schema: &TeamSchema) -> Result<Self, SkipRecord> {
        let team_name = record.text(&schema.team_name)?;
        let sort_index = match record.number(&schema.sort_index) {
            Ok(Some(n)) if n >= 1.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) => {
                Some(n as u32)
            }
            _ => None,
        };
        Ok(Self {
            team_name,
            sort_index,
        })
    }
}

/// A committee member ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPerson {
    pub name: String,
    pub title: String,
    /// Publicly resolvable image URL.
    pub image_url: String,
    #[serde(skip)]
    pub role_tier: RoleTier,
}

/// A team and its members, in snapshot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSection {
    pub team_name: String,
    pub sort_index: u32,
    pub people: Vec<ResolvedPerson>,
}

impl TeamSection {
    /// Members of `tier`, in the order they were added.
    pub fn tier(&self, tier: RoleTier) -> impl Iterator<Item = &ResolvedPerson> {
        self.people.iter().filter(move |p| p.role_tier == tier)
    }

    pub fn directors(&self) -> impl Iterator<Item = &ResolvedPerson> {
        self.tier(RoleTier::Director)
    }

    pub fn officers(&self) -> impl Iterator<Item = &ResolvedPerson> {
        self.tier(RoleTier::Officer)
    }
}
