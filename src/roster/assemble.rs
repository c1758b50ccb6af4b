//! Grouping resolved people into ordered team sections.

use std::collections::HashMap;
use tracing::{debug, warn};

use super::model::{ResolvedPerson, TeamMetadataRecord, TeamSection};
use crate::core::RosterError;

/// Accumulates people per team and produces sections sorted by team order.
///
/// The builder is seeded from team metadata. Only teams with a positive
/// integral sort index are registered. A membership naming any other label,
/// including a team whose metadata lacks a usable index, is an
/// [`RosterError::UnknownTeamLabel`].
#[derive(Debug, Default)]
pub struct RosterBuilder {
    sections: Vec<TeamSection>,
    index: HashMap<String, usize>,
}

impl RosterBuilder {
    pub fn new(teams: impl IntoIterator<Item = TeamMetadataRecord>) -> Self {
        let mut builder = Self::default();
        for team in teams {
            if builder.index.contains_key(&team.team_name) {
                warn!("Ignoring duplicate metadata for team '{}'", team.team_name);
                continue;
            }
            match team.sort_index {
                Some(sort_index) => {
                    builder.index.insert(team.team_name.clone(), builder.sections.len());
                    builder.sections.push(TeamSection {
                        team_name: team.team_name,
                        sort_index,
                        people: Vec::new(),
                    });
                }
                None => {
                    debug!("Not registering team '{}' without a sort index", team.team_name);
                }
            }
        }
        builder
    }

    /// Check a team label before doing any work for its members.
    pub fn accepts(&self, team: &str) -> Result<(), RosterError> {
        self.slot(team).map(|_| ())
    }

    fn slot(&self, team: &str) -> Result<usize, RosterError> {
        self.index.get(team).copied().ok_or_else(|| RosterError::UnknownTeamLabel {
            team: team.to_string(),
        })
    }

    /// Append `people` to `team`'s section, keeping their order.
    pub fn add(
        &mut self,
        team: &str,
        people: impl IntoIterator<Item = ResolvedPerson>,
    ) -> Result<(), RosterError> {
        let slot = self.slot(team)?;
        self.sections[slot].people.extend(people);
        Ok(())
    }

    /// Sections ascending by sort index; equal indices keep metadata order.
    #[must_use]
    pub fn build(mut self) -> Vec<TeamSection> {
        self.sections.sort_by_key(|section| section.sort_index);
        self.sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RoleTier;

    fn team(name: &str, sort_index: Option<u32>) -> TeamMetadataRecord {
        TeamMetadataRecord {
            team_name: name.into(),
            sort_index,
        }
    }

    fn person(name: &str) -> ResolvedPerson {
        ResolvedPerson {
            name: name.into(),
            title: "Member".into(),
            image_url: format!("https://cdn.example/{name}.jpg"),
            role_tier: RoleTier::Officer,
        }
    }

    fn names(sections: &[TeamSection]) -> Vec<&str> {
        sections.iter().map(|s| s.team_name.as_str()).collect()
    }

    #[test]
    fn test_sorts_by_index_and_omits_unindexed() {
        let builder = RosterBuilder::new([team("A", Some(2)), team("B", Some(1)), team("C", None)]);
        assert_eq!(names(&builder.build()), vec!["B", "A"]);
    }

    #[test]
    fn test_ties_keep_metadata_order() {
        let builder = RosterBuilder::new([team("X", Some(1)), team("Y", Some(1)), team("Z", Some(1))]);
        assert_eq!(names(&builder.build()), vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_unknown_label_is_fatal() {
        let mut builder = RosterBuilder::new([team("A", Some(1))]);
        let err = builder.add("Nope", [person("x")]).unwrap_err();
        assert_eq!(err, RosterError::UnknownTeamLabel { team: "Nope".into() });
    }

    #[test]
    fn test_unindexed_team_label_is_unknown() {
        let mut builder = RosterBuilder::new([team("A", Some(1)), team("C", None)]);
        let unknown = RosterError::UnknownTeamLabel { team: "C".into() };
        assert_eq!(builder.accepts("A"), Ok(()));
        assert_eq!(builder.accepts("C"), Err(unknown.clone()));
        assert_eq!(builder.add("C", [person("x")]), Err(unknown));
    }

    #[test]
    fn test_people_accumulate_in_order() {
        let mut builder = RosterBuilder::new([team("A", Some(1))]);
        builder.add("A", [person("p1"), person("p2")]).unwrap();
        builder.add("A", [person("p3")]).unwrap();

        let sections = builder.build();
        let people: Vec<_> = sections[0].people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(people, vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn test_first_duplicate_team_wins() {
        let builder = RosterBuilder::new([team("A", Some(3)), team("A", Some(1)), team("B", Some(2))]);
        let sections = builder.build();
        assert_eq!(names(&sections), vec!["B", "A"]);
        assert_eq!(sections[1].sort_index, 3);
    }
}
