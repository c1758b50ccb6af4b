//! Core types shared by every pipeline stage.
//!
//! Currently this is the error taxonomy: [`RosterError`] for failures,
//! [`SkipRecord`] for malformed remote records, and [`ErrorContext`] for
//! presenting either to a CLI user.

pub mod error;

pub use error::{ErrorContext, RosterError, SkipRecord, user_friendly_error};
