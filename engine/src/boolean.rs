//! Conjunctive (AND) matching over the frequency-free boolean index.

use crate::index::{BooleanIndex, DocId};
use crate::tokenizer::tokenize;

/// Documents containing every query token.
///
/// Starts from the full document universe and intersects each distinct
/// token's posting set; a token absent from the index short-circuits to an
/// empty result. A query with no tokens at all is a vacuous conjunction and
/// returns the whole universe. Results come back in ascending doc-id order.
pub fn boolean_search(query: &str, index: &BooleanIndex) -> Vec<DocId> {
    let mut tokens = tokenize(query);
    tokens.sort_unstable();
    tokens.dedup();

    if tokens.is_empty() {
        return (0..index.num_docs()).collect();
    }

    let mut result: Option<Vec<DocId>> = None;
    for token in &tokens {
        let Some(doc_ids) = index.doc_ids(token) else {
            return Vec::new();
        };
        result = Some(match result {
            None => doc_ids.to_vec(),
            Some(current) => intersect_sorted(&current, doc_ids),
        });
        if result.as_ref().is_some_and(Vec::is_empty) {
            return Vec::new();
        }
    }
    result.unwrap_or_default()
}

/// Merge-intersect two ascending id lists.
fn intersect_sorted(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::BooleanIndex;

    fn collection() -> BooleanIndex {
        BooleanIndex::from_texts(&["the cat sat", "the dog sat on the mat", "cats and dogs"])
    }

    #[test]
    fn conjunction_of_all_terms() {
        let index = collection();
        assert_eq!(boolean_search("cat sat", &index), vec![0]);
        assert_eq!(boolean_search("the", &index), vec![0, 1]);
        assert_eq!(boolean_search("sat", &index), vec![0, 1]);
    }

    #[test]
    fn unknown_term_empties_the_result() {
        let index = collection();
        assert!(boolean_search("cat zebra", &index).is_empty());
        assert!(boolean_search("zebra", &index).is_empty());
    }

    #[test]
    fn tokenless_query_is_a_vacuous_and() {
        let index = collection();
        assert_eq!(boolean_search("", &index), vec![0, 1, 2]);
        assert_eq!(boolean_search("123 !?", &index), vec![0, 1, 2]);
    }
}
