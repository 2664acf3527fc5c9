//! Domain layer: value objects and rules with no I/O.

pub mod conversation;
pub mod foundation;
pub mod registry;
pub mod reporting;
pub mod submission;
