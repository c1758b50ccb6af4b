//! A complete synthetic workspace laid out the way the pipeline navigates it.

use super::content::{FakeContentSource, block, record};
use crate::notion::Record;

/// Builds a [`FakeContentSource`] holding the default navigation path
/// (`CommitteeData` → `Committees By Semester` → period → `_team`/`_rolemetadata`)
/// plus whatever teams, memberships and profiles a test adds.
///
/// Property names follow the default schema settings.
///
/// ```rust,no_run
/// use rosterd::test_utils::RosterFixture;
///
/// let source = RosterFixture::new()
///     .team("Executive", Some(1.0))
///     .member("p1", "Dina")
///     .membership("President", "Executive", "director", &["p1"])
///     .build();
/// ```
pub struct RosterFixture {
    period: String,
    teams: Vec<Record>,
    memberships: Vec<Record>,
    profiles: Vec<Record>,
}

impl Default for RosterFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl RosterFixture {
    pub const ROOT_ID: &'static str = "root";
    pub const DATA_PAGE_ID: &'static str = "page-committee-data";
    pub const YEARS_ID: &'static str = "db-committees-by-semester";
    pub const PERIOD_ID: &'static str = "page-period";
    pub const MEMBERS_ID: &'static str = "db-team";
    pub const TEAMS_ID: &'static str = "db-rolemetadata";

    pub fn new() -> Self {
        Self {
            period: "2026 Sem 1".to_string(),
            teams: Vec::new(),
            memberships: Vec::new(),
            profiles: Vec::new(),
        }
    }

    /// Title of the period page present in the years collection.
    pub fn period(mut self, period: &str) -> Self {
        self.period = period.to_string();
        self
    }

    pub fn team(mut self, name: &str, order: Option<f64>) -> Self {
        let id = format!("team-{}", self.teams.len() + 1);
        self.teams.push(record(&id).title("Name", name).number("index", order).build());
        self
    }

    pub fn membership(mut self, title: &str, team: &str, role: &str, people: &[&str]) -> Self {
        let id = format!("membership-{}", self.memberships.len() + 1);
        self.memberships.push(
            record(&id)
                .title("Name", title)
                .select("team", team)
                .select("role", role)
                .relation("Committee Members", people)
                .build(),
        );
        self
    }

    /// Add a membership row exactly as given.
    pub fn raw_membership(mut self, membership: Record) -> Self {
        self.memberships.push(membership);
        self
    }

    /// A profile whose photo is hosted at `https://cdn.example/{id}.jpg`.
    pub fn member(mut self, id: &str, name: &str) -> Self {
        self.profiles.push(
            record(id)
                .title("Name", name)
                .external_file("Portrait", &format!("https://cdn.example/{id}.jpg"))
                .build(),
        );
        self
    }

    /// A profile whose photo was uploaded to the content source and lives at `url`.
    pub fn uploaded_member(mut self, id: &str, name: &str, url: &str) -> Self {
        self.profiles.push(
            record(id).title("Name", name).uploaded_file("Portrait", "photo.jpg", url).build(),
        );
        self
    }

    pub fn build(self) -> FakeContentSource {
        let source = FakeContentSource::new()
            .with_collection(
                Self::ROOT_ID,
                vec![
                    record("page-articles").title("Name", "Articles").build(),
                    record(Self::DATA_PAGE_ID).title("Name", "CommitteeData").build(),
                ],
            )
            .with_children(
                Self::DATA_PAGE_ID,
                vec![
                    block::paragraph("intro"),
                    block::child_database(Self::YEARS_ID, "Committees By Semester"),
                ],
            )
            .with_collection(
                Self::YEARS_ID,
                vec![record(Self::PERIOD_ID).title("Name", &self.period).build()],
            )
            .with_children(
                Self::PERIOD_ID,
                vec![
                    block::child_database(Self::MEMBERS_ID, "_team"),
                    block::child_database(Self::TEAMS_ID, "_rolemetadata"),
                ],
            )
            .with_collection(Self::TEAMS_ID, self.teams)
            .with_collection(Self::MEMBERS_ID, self.memberships);

        self.profiles.into_iter().fold(source, FakeContentSource::with_page)
    }
}
