//! Parsing Strategy Module
//!
//! - Single document: [`crate::dom::parse_document`]
//! - Batch: many independent documents parsed in parallel

pub mod parallel;

pub use parallel::parse_documents;
