//! Core XML parsing primitives
//!
//! The building blocks underneath the tree builder:
//! - Scanner: byte cursor with memchr-accelerated delimiter search
//! - Tokenizer: well-formedness checking push tokenizer over a SaxHandler
//! - Entities: entity decoding and escaping with Cow (zero-copy when possible)

pub mod entities;
pub mod scanner;
pub mod tokenizer;

pub use tokenizer::{RawAttribute, SaxHandler, Tokenizer};
