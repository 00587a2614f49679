use engine::boolean::boolean_search;
use engine::rank::{accumulate_dot_scores, get_doc_rankings, index_search};
use engine::stats::compute_doc_norms;
use engine::tokenizer::term_counts;
use engine::{BooleanIndex, IdfTable, InvertedIndex};

const DOCS: [&str; 3] = ["the cat sat", "the dog sat on the mat", "cats and dogs"];

#[test]
fn boolean_results_stay_within_the_collection() {
    let index = BooleanIndex::from_texts(&DOCS);
    for query in ["cat", "the dog", "sat mat", "zebra", "", "cats and dogs extra"] {
        let hits = boolean_search(query, &index);
        assert!(hits.len() <= DOCS.len());
        assert!(hits.iter().all(|&id| (id as usize) < DOCS.len()));
    }
}

#[test]
fn boolean_conjunction_examples() {
    let index = BooleanIndex::from_texts(&DOCS);
    assert_eq!(boolean_search("cat sat", &index), vec![0]);
    assert_eq!(boolean_search("the", &index), vec![0, 1]);
}

#[test]
fn rebuilding_the_index_is_idempotent() {
    let first = InvertedIndex::from_texts(&DOCS);
    let second = InvertedIndex::from_texts(&DOCS);
    assert_eq!(first, second);
}

#[test]
fn unpruned_idf_covers_every_term_and_ranks_exact_matches_first() {
    let index = InvertedIndex::from_texts(&DOCS);
    let idf = IdfTable::compute(&index, 0, 1.0);
    // No term occurs in all three documents, so nothing is pruned.
    assert_eq!(idf.len(), index.num_terms());

    let norms = compute_doc_norms(&index, &idf);
    let results = index_search("cat", &index, &idf, &norms, accumulate_dot_scores);

    // "cats" is a different token, so document 2 has no overlap and no score.
    assert_eq!(results[0].1, 0);
    assert!(results[0].0 > 0.0);
    assert!(results.iter().all(|&(_, doc)| doc != 2));
}

#[test]
fn adding_a_term_occurrence_never_lowers_the_dot_score() {
    let before = ["cat dog", "cat"];
    let after = ["cat dog cat", "cat"];
    let query = term_counts("cat");

    let index_before = InvertedIndex::from_texts(&before);
    let idf_before = IdfTable::compute(&index_before, 0, 1.0);
    let score_before = accumulate_dot_scores(&query, &index_before, &idf_before)[&0];

    let index_after = InvertedIndex::from_texts(&after);
    let idf_after = IdfTable::compute(&index_after, 0, 1.0);
    let score_after = accumulate_dot_scores(&query, &index_after, &idf_after)[&0];

    assert!(score_after >= score_before);
}

#[test]
fn a_document_is_most_similar_to_its_own_text() {
    let docs = ["big red fish swim deep", "big red fish", "red fish", "green turtle"];
    let index = InvertedIndex::from_texts(&docs);
    let idf = IdfTable::compute(&index, 0, 1.0);
    let norms = compute_doc_norms(&index, &idf);

    let results = index_search(docs[0], &index, &idf, &norms, accumulate_dot_scores);
    assert_eq!(results[0].1, 0);
    assert!((results[0].0 - 1.0).abs() < 1e-5);
    for &(score, _) in &results[1..] {
        assert!(score <= results[0].0);
    }
}

#[test]
fn empty_query_degrades_gracefully() {
    let index = InvertedIndex::from_texts(&DOCS);
    let idf = IdfTable::compute(&index, 0, 1.0);
    let norms = compute_doc_norms(&index, &idf);
    assert!(index_search("", &index, &idf, &norms, accumulate_dot_scores).is_empty());
    assert!(index_search("42!", &index, &idf, &norms, accumulate_dot_scores).is_empty());
}

#[test]
fn pruned_query_terms_are_skipped_not_fatal() {
    let docs = ["the cat sat", "the dog sat on the mat", "cats and dogs", "the bird flew"];
    // min_df = 2 prunes "mat" (df 1) while it stays in the inverted index.
    let index = InvertedIndex::from_texts(&docs);
    let idf = IdfTable::compute(&index, 2, 1.0);
    assert!(!idf.contains("mat"));
    assert!(index.postings("mat").is_some());

    let norms = compute_doc_norms(&index, &idf);
    let results = index_search("mat sat", &index, &idf, &norms, accumulate_dot_scores);
    // Only "sat" (df 2) contributes; both sat-documents rank, nothing panics.
    assert_eq!(results.len(), 2);
    let ids: Vec<_> = results.iter().map(|&(_, doc)| doc).collect();
    assert_eq!(ids, vec![0, 1]);
}

#[test]
fn end_to_end_rankings_truncate_to_top_n() {
    let docs = ["apple pie", "apple tart", "apple apple crumble", "banana split", "cherry jam"];
    let ranked = get_doc_rankings("apple", &docs, 2);
    assert_eq!(ranked.len(), 2);
    // The doubled query term outweighs the single occurrences.
    assert_eq!(ranked[0], 2);
}
