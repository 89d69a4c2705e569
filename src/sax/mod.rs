//! SAX (Simple API for XML) Module
//!
//! Records the tokenizer's event stream as owned values:
//!
//! ```text
//! Tokenizer ---> EventCollector ---> Vec<XmlEvent>
//!                                        |
//!                        +---------------+---------------+
//!                        v                               v
//!                 Elixir terms (NIF)          TreeBuilder::from_events
//! ```

pub mod collector;
pub mod events;

pub use collector::{parse_events, EventCollector};
pub use events::XmlEvent;
