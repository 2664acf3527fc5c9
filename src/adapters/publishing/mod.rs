//! Report publishers used by dashboard regeneration.

mod in_memory;
mod json_file;

pub use in_memory::{InMemoryPublisher, PublishedReport};
pub use json_file::JsonFilePublisher;
