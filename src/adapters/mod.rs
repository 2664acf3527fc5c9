//! Adapters - Implementations of port interfaces.
//!
//! - `ai` - model transports (OpenAI-compatible, retrying, mock)
//! - `extraction` - structured extraction over a transport
//! - `registry` - built-in and YAML project catalogues
//! - `storage` - submission repositories
//! - `sources` - issue tracker, release calendar, regression timings
//! - `metrics` - metrics sinks
//! - `publishing` - report publishers
//! - `clock` - system and fixed clocks

pub mod ai;
pub mod clock;
pub mod extraction;
pub mod metrics;
pub mod publishing;
pub mod registry;
pub mod sources;
pub mod storage;

pub use clock::{FixedClock, SystemClock};
