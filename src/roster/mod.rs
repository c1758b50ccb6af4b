//! Roster aggregation: from workspace records to ordered team sections.
//!
//! - [`model`] - typed records and the derived people and sections
//! - [`join`] - membership × profile join with bounded fan-out
//! - [`assemble`] - grouping by team and ordering
//! - [`pipeline`] - the end-to-end run that the cache gateway drives

pub mod assemble;
pub mod join;
pub mod model;
pub mod pipeline;

pub use assemble::RosterBuilder;
pub use join::RelationJoiner;
pub use model::{
    ImageReference, MembershipRecord, ProfileRecord, ResolvedPerson, RoleTier, TeamMetadataRecord,
    TeamSection,
};
pub use pipeline::{RosterLocation, RosterPipeline};
