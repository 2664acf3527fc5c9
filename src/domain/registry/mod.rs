//! Business streams and the projects that report into them.

mod project;

pub use project::{BusinessStream, Project};
