//! QA Pulse - conversational QA status intake and monthly quality reporting
//!
//! Project leads report test coverage in free text; a model-backed extractor
//! turns each answer into structured fields, a conversation state machine asks
//! for whatever is missing, and finalized submissions feed a monthly report of
//! defect leakage, automation coverage and regression times per business stream.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
