//! Parallel Batch Parsing
//!
//! Uses Rayon to parse many independent documents at once. Each worker
//! builds its own tree; results come back in input order.

use rayon::prelude::*;

use crate::dom::{parse_document, XmlTree};
use crate::options::ParseOptions;

/// Parse every input in parallel
///
/// The result at index `i` is what [`parse_document`] returns for
/// `inputs[i]`.
pub fn parse_documents<T>(inputs: &[T], options: &ParseOptions) -> Vec<Option<XmlTree>>
where
    T: AsRef<[u8]> + Sync,
{
    log::debug!("batch parse of {} documents", inputs.len());
    inputs
        .par_iter()
        .map(|input| parse_document(input.as_ref(), options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_preserves_order() {
        let inputs: [&[u8]; 4] = [b"<a/>", b"", b"<b><c/></b>", b"not xml"];
        let results = parse_documents(&inputs[..], &ParseOptions::default());
        assert_eq!(results.len(), 4);

        let names: Vec<Option<&str>> = results
            .iter()
            .map(|tree| tree.as_ref().and_then(|t| t.name(t.root())))
            .collect();
        assert_eq!(names, vec![Some("a"), None, Some("b"), None]);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let inputs: Vec<String> = (0..32)
            .map(|i| format!("<doc n='{}'>  item {}  <x/></doc>", i, i))
            .collect();
        let options = ParseOptions::new(false);
        let parallel = parse_documents(&inputs, &options);
        for (input, tree) in inputs.iter().zip(&parallel) {
            assert_eq!(tree, &parse_document(input.as_bytes(), &options));
        }
    }

    #[test]
    fn test_empty_batch() {
        let inputs: Vec<Vec<u8>> = Vec::new();
        assert!(parse_documents(&inputs, &ParseOptions::default()).is_empty());
    }
}
