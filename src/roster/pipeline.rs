//! The full aggregation run, from the root collection to rendered HTML.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::assemble::RosterBuilder;
use super::join::RelationJoiner;
use super::model::{MembershipRecord, TeamMetadataRecord, TeamSection};
use crate::config::{NavigationSettings, SchemaSettings, Settings};
use crate::core::{RosterError, SkipRecord};
use crate::gateway::SnapshotSource;
use crate::media::MediaSynchronizer;
use crate::notion::{CollectionReader, ContentNode, ContentSource, NodeKind, Record};
use crate::render::SnapshotRenderer;
use crate::resolver::NodeResolver;

/// The two collections holding one period's roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterLocation {
    pub members: ContentNode,
    pub teams: ContentNode,
}

/// Drives one aggregation run.
///
/// # Stages
///
/// 1. Walk the configured navigation path to the period's collections
/// 2. Read team metadata and seed a [`RosterBuilder`]
/// 3. Read memberships and join each with its profiles
/// 4. Sort the sections and render them
///
/// Any [`RosterError`] escaping a stage aborts the run. Malformed records and
/// unresolvable members are logged and skipped inside their stage.
pub struct RosterPipeline {
    source: Arc<dyn ContentSource>,
    media: MediaSynchronizer,
    renderer: SnapshotRenderer,
    root: ContentNode,
    navigation: NavigationSettings,
    schema: SchemaSettings,
    concurrency: usize,
}

impl RosterPipeline {
    pub fn new(
        source: Arc<dyn ContentSource>,
        media: MediaSynchronizer,
        renderer: SnapshotRenderer,
        root_collection_id: impl Into<String>,
        settings: &Settings,
    ) -> Self {
        Self {
            source,
            media,
            renderer,
            root: ContentNode::root_collection(root_collection_id),
            navigation: settings.navigation.clone(),
            schema: settings.schema.clone(),
            concurrency: settings.http.max_concurrency,
        }
    }

    /// Resolve the members and teams collections of the configured period.
    pub async fn locate(&self) -> Result<RosterLocation, RosterError> {
        let nav = &self.navigation;
        let resolver = NodeResolver::new(self.source.as_ref());

        let data_page = resolver.resolve(&self.root, NodeKind::Page, &nav.data_page).await?;
        let years =
            resolver.resolve(&data_page, NodeKind::Collection, &nav.years_collection).await?;
        let period = resolver.resolve(&years, NodeKind::Page, &nav.period).await?;
        let members =
            resolver.resolve(&period, NodeKind::Collection, &nav.members_collection).await?;
        let teams = resolver.resolve(&period, NodeKind::Collection, &nav.teams_collection).await?;

        Ok(RosterLocation { members, teams })
    }

    /// Run every stage up to rendering.
    pub async fn assemble(&self) -> Result<Vec<TeamSection>, RosterError> {
        let location = self.locate().await?;
        let reader = CollectionReader::new(self.source.as_ref());

        let teams = parse_all(reader.read_all(&location.teams.id).await?, |record| {
            TeamMetadataRecord::from_record(record, &self.schema.team)
        });
        let mut builder = RosterBuilder::new(teams);

        let memberships = parse_all(reader.read_all(&location.members.id).await?, |record| {
            MembershipRecord::from_record(record, &self.schema.membership)
        });
        debug!("Read {} membership records", memberships.len());

        let joiner = RelationJoiner::new(
            self.source.as_ref(),
            &self.media,
            &self.schema.profile,
            self.concurrency,
        );
        for membership in &memberships {
            builder.accepts(&membership.team)?;
            let people = joiner.join(membership).await;
            builder.add(&membership.team, people)?;
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl SnapshotSource for RosterPipeline {
    async fn build(&self) -> Result<String, RosterError> {
        let sections = self.assemble().await?;
        let people: usize = sections.iter().map(|s| s.people.len()).sum();
        info!("Assembled {} teams with {} people", sections.len(), people);
        self.renderer.render(&sections)
    }
}

/// Parse every record, logging and dropping the ones that do not fit.
fn parse_all<T>(
    records: Vec<Record>,
    parse: impl Fn(&Record) -> Result<T, SkipRecord>,
) -> Vec<T> {
    records
        .iter()
        .filter_map(|record| match parse(record) {
            Ok(parsed) => Some(parsed),
            Err(skip) => {
                warn!("{}", skip);
                None
            }
        })
        .collect()
}
