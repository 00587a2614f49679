//! Term statistics derived from the inverted index: per-term IDF with
//! document-frequency pruning, and per-document TF-IDF norms.

use crate::index::InvertedIndex;
use std::collections::HashMap;

/// Per-term inverse document frequency, restricted to terms whose document
/// frequency lies inside the configured band. Pruned terms are absent and
/// contribute nothing to TF-IDF scoring, even though they stay in the
/// inverted index.
#[derive(Debug, Default, Clone)]
pub struct IdfTable {
    values: HashMap<String, f32>,
}

impl IdfTable {
    /// Compute IDF values from the index. A term is kept when
    /// `df >= min_df` and `df / n_docs < max_df_ratio`; its value is
    /// `log2(n_docs / (1 + df))`. Values are always finite, and a very
    /// common term can legitimately come out negative.
    pub fn compute(index: &InvertedIndex, min_df: u32, max_df_ratio: f32) -> Self {
        let n_docs = index.num_docs();
        let mut values = HashMap::new();
        for (term, postings) in index.terms() {
            let df = postings.len() as u32;
            if df >= min_df && (df as f32) / (n_docs as f32) < max_df_ratio {
                let idf = (n_docs as f32 / (1.0 + df as f32)).log2();
                values.insert(term.to_string(), idf);
            }
        }
        tracing::debug!(
            kept = values.len(),
            indexed = index.num_terms(),
            "computed idf table"
        );
        Self { values }
    }

    /// IDF of `term`, or `None` if the term was pruned (or never indexed).
    pub fn get(&self, term: &str) -> Option<f32> {
        self.values.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.values.contains_key(term)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.values.iter().map(|(t, &v)| (t.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Euclidean norm of every document's TF-IDF vector, restricted to terms
/// surviving in `idf`. Indexed by doc id; a document with no surviving terms
/// gets norm 0, which the ranker must treat as "no denominator".
pub fn compute_doc_norms(index: &InvertedIndex, idf: &IdfTable) -> Vec<f32> {
    let mut norms = vec![0.0f32; index.num_docs() as usize];
    for (term, idf_val) in idf.iter() {
        if let Some(postings) = index.postings(term) {
            for posting in postings {
                let w = posting.term_freq as f32 * idf_val;
                norms[posting.doc_id as usize] += w * w;
            }
        }
    }
    for norm in norms.iter_mut() {
        *norm = norm.sqrt();
    }
    norms
}
