//! SAX Collector
//!
//! Implements SaxHandler to record the event sequence for batch return to
//! the host or for replay into a [`TreeBuilder`](crate::dom::TreeBuilder).

use super::events::XmlEvent;
use crate::core::tokenizer::{RawAttribute, SaxHandler, Tokenizer};
use crate::error::ParseError;

/// Collector that gathers SAX events during tokenizing
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<XmlEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(256),
        }
    }

    /// Take the collected events
    pub fn take_events(&mut self) -> Vec<XmlEvent> {
        std::mem::take(&mut self.events)
    }
}

impl SaxHandler for EventCollector {
    fn start_document(&mut self) {
        self.events.push(XmlEvent::DocumentStart);
    }

    fn start_element(&mut self, name: &str, attributes: &[RawAttribute<'_>]) {
        self.events.push(XmlEvent::ElementStart {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|a| (a.name.to_string(), a.value.to_string()))
                .collect(),
        });
    }

    fn characters(&mut self, text: &str) {
        self.events.push(XmlEvent::Characters(text.to_string()));
    }

    fn cdata(&mut self, data: &[u8]) {
        self.events.push(XmlEvent::CData(data.to_vec()));
    }

    fn end_element(&mut self, name: &str) {
        self.events.push(XmlEvent::ElementEnd {
            name: name.to_string(),
        });
    }

    fn end_document(&mut self) {
        self.events.push(XmlEvent::DocumentEnd);
    }

    fn parse_error(&mut self, error: &ParseError) {
        self.events.push(XmlEvent::ParseError(error.clone()));
    }

    fn comment(&mut self, text: &str) {
        self.events.push(XmlEvent::Comment(text.to_string()));
    }

    fn processing_instruction(&mut self, target: &str, data: Option<&str>) {
        self.events.push(XmlEvent::ProcessingInstruction {
            target: target.to_string(),
            data: data.map(str::to_string),
        });
    }
}

/// Tokenize input and return the full event sequence
///
/// A malformed document ends with an [`XmlEvent::ParseError`] instead of
/// [`XmlEvent::DocumentEnd`].
pub fn parse_events(input: &[u8]) -> Vec<XmlEvent> {
    let mut collector = EventCollector::new();
    let _ = Tokenizer::new(input).run(&mut collector);
    collector.take_events()
}
