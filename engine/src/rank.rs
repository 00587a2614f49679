//! TF-IDF cosine ranking: term-at-a-time dot-product scorer plus the
//! ranker that normalizes scores and orders documents.

use crate::index::{DocId, InvertedIndex};
use crate::stats::{compute_doc_norms, IdfTable};
use crate::tokenizer::term_counts;
use std::collections::HashMap;

/// Numerator of cosine similarity for every document sharing a term with the
/// query, accumulated term-at-a-time over the inverted index.
///
/// For each query term with postings, each posting contributes
/// `doc_tf * query_tf * idf^2` to its document's total. Only (term, document)
/// pairs that actually co-occur are visited, so cost is proportional to the
/// postings of the query terms, not vocabulary x collection. Terms pruned
/// from `idf` are skipped rather than looked up unconditionally.
pub fn accumulate_dot_scores(
    query_counts: &HashMap<String, u32>,
    index: &InvertedIndex,
    idf: &IdfTable,
) -> HashMap<DocId, f32> {
    let mut scores: HashMap<DocId, f32> = HashMap::new();
    for (term, &query_tf) in query_counts {
        let Some(idf_val) = idf.get(term) else {
            continue;
        };
        let Some(postings) = index.postings(term) else {
            continue;
        };
        for posting in postings {
            let dot = posting.term_freq as f32 * query_tf as f32 * idf_val * idf_val;
            *scores.entry(posting.doc_id).or_insert(0.0) += dot;
        }
    }
    scores
}

/// Rank documents by cosine similarity to `query`.
///
/// `score` computes per-document dot-product numerators from the query's
/// term counts ([`accumulate_dot_scores`] is the canonical choice). Each
/// numerator is divided by `query_norm * doc_norms[doc]`; a query with no
/// tokens in the idf vocabulary has norm 0 and yields an empty ranking, and
/// documents with a zero numerator or a zero denominator are omitted rather
/// than scored. Results are
/// `(score, doc_id)` sorted by descending score, ties broken by ascending
/// doc id.
pub fn index_search<S>(
    query: &str,
    index: &InvertedIndex,
    idf: &IdfTable,
    doc_norms: &[f32],
    score: S,
) -> Vec<(f32, DocId)>
where
    S: Fn(&HashMap<String, u32>, &InvertedIndex, &IdfTable) -> HashMap<DocId, f32>,
{
    let query_counts = term_counts(query);

    let mut query_norm_sq = 0.0f32;
    for (term, &tf) in &query_counts {
        if let Some(idf_val) = idf.get(term) {
            let w = idf_val * tf as f32;
            query_norm_sq += w * w;
        }
    }
    let query_norm = query_norm_sq.sqrt();
    if query_norm == 0.0 {
        return Vec::new();
    }

    let numerators = score(&query_counts, index, idf);
    let mut results: Vec<(f32, DocId)> = Vec::with_capacity(numerators.len());
    for (doc_id, numerator) in numerators {
        let denom = query_norm * doc_norms.get(doc_id as usize).copied().unwrap_or(0.0);
        if numerator == 0.0 || denom == 0.0 {
            continue;
        }
        results.push((numerator / denom, doc_id));
    }

    results.sort_unstable_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    results
}

/// End-to-end convenience path: index `docs` from scratch with no
/// document-frequency pruning (`min_df = 0`, `max_df_ratio = 1`) and return
/// the ids of the `top_n` most similar documents, best first.
pub fn get_doc_rankings<T: AsRef<str>>(query: &str, docs: &[T], top_n: usize) -> Vec<DocId> {
    let index = InvertedIndex::from_texts(docs);
    let idf = IdfTable::compute(&index, 0, 1.0);
    let doc_norms = compute_doc_norms(&index, &idf);
    let results = index_search(query, &index, &idf, &doc_norms, accumulate_dot_scores);
    results
        .into_iter()
        .take(top_n)
        .map(|(_, doc_id)| doc_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::InvertedIndex;
    use crate::stats::{compute_doc_norms, IdfTable};

    #[test]
    fn pruned_terms_do_not_panic_the_scorer() {
        let docs = ["rare term here", "another document entirely"];
        let index = InvertedIndex::from_texts(&docs);
        // Prune everything: every term has df/n = 0.5 >= 0.1.
        let idf = IdfTable::compute(&index, 0, 0.1);
        let scores = accumulate_dot_scores(&term_counts("rare term"), &index, &idf);
        assert!(scores.is_empty());
    }

    #[test]
    fn query_outside_vocabulary_ranks_nothing() {
        let docs = ["the cat sat"];
        let index = InvertedIndex::from_texts(&docs);
        let idf = IdfTable::compute(&index, 0, 1.0);
        let norms = compute_doc_norms(&index, &idf);
        let results = index_search("zebra", &index, &idf, &norms, accumulate_dot_scores);
        assert!(results.is_empty());
    }

    #[test]
    fn equal_scores_break_ties_by_doc_id() {
        // Four docs keep the shared terms at df = 2, n = 4, so their idf
        // (log2(4/3)) is nonzero and the duplicates actually score. With
        // df = n - 1 the idf would be 0 and the query norm would vanish.
        let docs = ["alpha beta", "alpha beta", "gamma", "delta"];
        let ranked = get_doc_rankings("alpha beta", &docs, 10);
        assert_eq!(ranked, vec![0, 1]);
    }

    #[test]
    fn zero_idf_query_yields_empty_ranking() {
        // Every query term at df = n - 1 gives idf = log2(n/(1+df)) = 0, so
        // the query norm is 0 and no cosine is defined.
        let docs = ["alpha beta", "alpha beta", "gamma"];
        let ranked = get_doc_rankings("alpha beta", &docs, 10);
        assert!(ranked.is_empty());
    }
}
