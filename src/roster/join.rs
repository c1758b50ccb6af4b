//! Joining membership records with the profiles they reference.

use futures::stream::{self, StreamExt};
use std::future::ready;
use tracing::{debug, warn};

use super::model::{MembershipRecord, ProfileRecord, ResolvedPerson};
use crate::config::ProfileSchema;
use crate::core::RosterError;
use crate::media::MediaSynchronizer;
use crate::notion::ContentSource;

/// Resolves each member reference of a membership into a [`ResolvedPerson`].
///
/// Members are resolved concurrently, up to `concurrency` at a time, and come
/// back in `member_refs` order. A member whose profile cannot be fetched,
/// lacks a name or image, or whose image cannot be fetched is logged and left
/// out; the rest of the membership is still returned.
pub struct RelationJoiner<'a> {
    source: &'a dyn ContentSource,
    media: &'a MediaSynchronizer,
    schema: &'a ProfileSchema,
    concurrency: usize,
}

impl<'a> RelationJoiner<'a> {
    pub fn new(
        source: &'a dyn ContentSource,
        media: &'a MediaSynchronizer,
        schema: &'a ProfileSchema,
        concurrency: usize,
    ) -> Self {
        Self {
            source,
            media,
            schema,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn join(&self, membership: &MembershipRecord) -> Vec<ResolvedPerson> {
        let pending: Vec<_> = membership
            .member_refs
            .iter()
            .map(|profile_id| async move {
                match self.resolve_member(membership, profile_id).await {
                    Ok(person) => Some(person),
                    Err(e) => {
                        warn!("Dropping member {} of '{}': {}", profile_id, membership.title, e);
                        None
                    }
                }
            })
            .collect();

        stream::iter(pending)
            .buffered(self.concurrency)
            .filter_map(ready)
            .collect()
            .await
    }

    async fn resolve_member(
        &self,
        membership: &MembershipRecord,
        profile_id: &str,
    ) -> Result<ResolvedPerson, MemberError> {
        let record = self.source.retrieve_page(profile_id).await?;
        let profile = ProfileRecord::from_record(&record, self.schema)
            .map_err(|skip| MemberError::Skipped(skip.reason))?;
        let image_url = self.media.resolve_image(&profile).await?;

        debug!("Resolved {} as {}", profile_id, profile.display_name);
        Ok(ResolvedPerson {
            name: profile.display_name,
            title: membership.title.clone(),
            image_url,
            role_tier: membership.role_tier.clone(),
        })
    }
}

/// Why a single member was left out.
#[derive(Debug, thiserror::Error)]
enum MemberError {
    #[error(transparent)]
    Failed(#[from] RosterError),
    #[error("profile skipped: {0}")]
    Skipped(String),
}
