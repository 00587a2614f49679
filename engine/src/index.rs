use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Dense document identifier: position of the document in the input
/// collection. Duplicate texts keep distinct ids.
pub type DocId = u32;

/// A single entry in a term's postings list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    /// Occurrences of the term in this document; always >= 1.
    pub term_freq: u32,
}

/// Inverted index: term -> postings sorted by ascending doc id, at most one
/// posting per document. Built once over the whole collection and read-only
/// afterward.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvertedIndex {
    postings: HashMap<String, Vec<Posting>>,
    num_docs: u32,
}

impl InvertedIndex {
    /// Index a collection in one pass. Ids are assigned in input order, so
    /// postings lists come out sorted by doc id by construction.
    pub fn from_texts<S: AsRef<str>>(docs: &[S]) -> Self {
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        for (doc_id, doc) in docs.iter().enumerate() {
            let tokens = tokenize(doc.as_ref());
            let mut tf: HashMap<&str, u32> = HashMap::new();
            for token in &tokens {
                *tf.entry(token).or_insert(0) += 1;
            }
            for (term, term_freq) in tf {
                postings.entry(term.to_string()).or_default().push(Posting {
                    doc_id: doc_id as DocId,
                    term_freq,
                });
            }
        }
        tracing::debug!(
            num_docs = docs.len(),
            num_terms = postings.len(),
            "built inverted index"
        );
        Self {
            postings,
            num_docs: docs.len() as u32,
        }
    }

    /// Postings for `term`, or `None` if the term never occurs.
    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    /// Number of documents containing `term`.
    pub fn doc_frequency(&self, term: &str) -> u32 {
        self.postings.get(term).map_or(0, |p| p.len() as u32)
    }

    /// Iterate over every (term, postings) pair.
    pub fn terms(&self) -> impl Iterator<Item = (&str, &[Posting])> {
        self.postings.iter().map(|(t, p)| (t.as_str(), p.as_slice()))
    }

    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    pub fn num_terms(&self) -> usize {
        self.postings.len()
    }
}

/// Frequency-free variant of [`InvertedIndex`]: term -> sorted doc ids only.
/// Used solely by conjunctive boolean matching.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanIndex {
    postings: HashMap<String, Vec<DocId>>,
    num_docs: u32,
}

impl BooleanIndex {
    pub fn from_texts<S: AsRef<str>>(docs: &[S]) -> Self {
        let mut postings: HashMap<String, Vec<DocId>> = HashMap::new();
        for (doc_id, doc) in docs.iter().enumerate() {
            let mut tokens = tokenize(doc.as_ref());
            tokens.sort_unstable();
            tokens.dedup();
            for term in tokens {
                postings.entry(term).or_default().push(doc_id as DocId);
            }
        }
        Self {
            postings,
            num_docs: docs.len() as u32,
        }
    }

    /// Sorted ids of the documents containing `term`.
    pub fn doc_ids(&self, term: &str) -> Option<&[DocId]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postings_sorted_with_counted_frequencies() {
        let docs = ["the cat sat", "the dog sat on the mat"];
        let index = InvertedIndex::from_texts(&docs);

        let sat = index.postings("sat").unwrap();
        assert_eq!(
            sat,
            &[
                Posting { doc_id: 0, term_freq: 1 },
                Posting { doc_id: 1, term_freq: 1 }
            ]
        );
        let the = index.postings("the").unwrap();
        assert_eq!(the[1], Posting { doc_id: 1, term_freq: 2 });
        assert_eq!(index.doc_frequency("mat"), 1);
        assert_eq!(index.doc_frequency("fish"), 0);
        assert_eq!(index.num_docs(), 2);
    }

    #[test]
    fn duplicate_texts_get_distinct_ids() {
        let docs = ["same text", "same text"];
        let index = InvertedIndex::from_texts(&docs);
        let same = index.postings("same").unwrap();
        assert_eq!(same.iter().map(|p| p.doc_id).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn boolean_index_drops_frequencies() {
        let docs = ["the the the", "the cat"];
        let index = BooleanIndex::from_texts(&docs);
        assert_eq!(index.doc_ids("the").unwrap(), &[0, 1]);
        assert_eq!(index.doc_ids("cat").unwrap(), &[1]);
        assert!(index.doc_ids("dog").is_none());
    }
}
