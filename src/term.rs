//! Elixir Term Conversion Utilities
//!
//! Converts trees, events and diagnostics to Elixir terms.

use rustler::types::atom::nil;
use rustler::{Encoder, Env, NewBinary, Term};

use crate::dom::{NodeId, XmlTree};
use crate::error::ParseError;
use crate::sax::XmlEvent;

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    element,
    start_document,
    start_element,
    characters,
    cdata,
    end_element,
    end_document,
    parse_error,
    comment,
    processing_instruction,
}

/// Convert an element subtree to `{:element, name, attrs, text, cdata, children}`
///
/// `text` and `cdata` are `nil` when absent. Unknown IDs become `nil`.
/// Terms are built bottom-up from an explicit stack, so deep documents do
/// not recurse.
pub fn tree_to_term<'a>(env: Env<'a>, tree: &XmlTree, id: NodeId) -> Term<'a> {
    if tree.get(id).is_none() {
        return nil().encode(env);
    }

    // Pre-order walk; reversed, every child comes before its parent
    let mut order = Vec::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        order.push(current);
        stack.extend_from_slice(tree.children(current));
    }

    let mut built: Vec<Option<Term<'a>>> = vec![None; tree.node_count()];
    for &current in order.iter().rev() {
        let Some(node) = tree.get(current) else {
            continue;
        };

        let name = str_to_binary(env, node.name());
        let attrs = attributes_to_term(env, node.attributes());
        let text = match node.text() {
            Some(text) => str_to_binary(env, text),
            None => nil().encode(env),
        };
        let data = match node.cdata() {
            Some(data) => bytes_to_binary(env, data),
            None => nil().encode(env),
        };

        // Build in reverse so each prepend is O(1)
        let mut children = Term::list_new_empty(env);
        for child in node.children().iter().rev() {
            if let Some(term) = built.get_mut(*child as usize).and_then(Option::take) {
                children = children.list_prepend(term);
            }
        }

        built[current as usize] = Some((element(), name, attrs, text, data, children).encode(env));
    }

    built[id as usize].take().unwrap_or_else(|| nil().encode(env))
}

/// Attributes as a list of `{name, value}` binaries, in document order
fn attributes_to_term<'a>(env: Env<'a>, attributes: &[(String, String)]) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for (key, value) in attributes.iter().rev() {
        let tuple = (str_to_binary(env, key), str_to_binary(env, value));
        list = list.list_prepend(tuple.encode(env));
    }
    list
}

/// Convert recorded events to an Elixir list
pub fn events_to_term<'a>(env: Env<'a>, events: &[XmlEvent]) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for event in events.iter().rev() {
        list = list.list_prepend(event_to_term(env, event));
    }
    list
}

/// Convert a single event to an Elixir term
pub fn event_to_term<'a>(env: Env<'a>, event: &XmlEvent) -> Term<'a> {
    match event {
        XmlEvent::DocumentStart => start_document().encode(env),
        XmlEvent::ElementStart { name, attributes } => (
            start_element(),
            str_to_binary(env, name),
            attributes_to_term(env, attributes),
        )
            .encode(env),
        XmlEvent::Characters(text) => (characters(), str_to_binary(env, text)).encode(env),
        XmlEvent::CData(data) => (cdata(), bytes_to_binary(env, data)).encode(env),
        XmlEvent::ElementEnd { name } => (end_element(), str_to_binary(env, name)).encode(env),
        XmlEvent::DocumentEnd => end_document().encode(env),
        XmlEvent::ParseError(error) => (parse_error(), error_to_term(env, error)).encode(env),
        XmlEvent::Comment(text) => (comment(), str_to_binary(env, text)).encode(env),
        XmlEvent::ProcessingInstruction { target, data } => {
            let data = match data {
                Some(data) => str_to_binary(env, data),
                None => nil().encode(env),
            };
            (processing_instruction(), str_to_binary(env, target), data).encode(env)
        }
    }
}

/// `{kind, offset, line, column}` with `kind` as a short binary code
pub fn error_to_term<'a>(env: Env<'a>, error: &ParseError) -> Term<'a> {
    (
        str_to_binary(env, error.kind.code()),
        error.offset,
        error.line,
        error.column,
    )
        .encode(env)
}

pub fn errors_to_term<'a>(env: Env<'a>, errors: &[ParseError]) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for error in errors.iter().rev() {
        list = list.list_prepend(error_to_term(env, error));
    }
    list
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    bytes_to_binary(env, s.as_bytes())
}

/// Create a binary from bytes
pub fn bytes_to_binary<'a>(env: Env<'a>, bytes: &[u8]) -> Term<'a> {
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
