//! `engine`: batch text retrieval over a frozen in-memory collection.
//!
//! Three complementary models over the same tokenization:
//! - conjunctive boolean matching over a term -> doc-id index
//! - TF-IDF cosine ranking driven by a term-at-a-time dot-product scorer
//! - latent semantic retrieval from a truncated SVD of the TF-IDF
//!   term-document matrix
//!
//! The collection is indexed once; every index structure is immutable after
//! construction, so concurrent readers need no coordination. Rebuilding is a
//! whole-index replace.
//!
//! Scope:
//! - In-memory indexes, position-based document ids
//! - Deterministic ranking (tie-break by ascending doc id)
//!
//! Non-goals:
//! - Persistence, incremental updates, sharding
//! - Query operators beyond "bag of terms" AND / cosine
//! - Stemming or unicode folding in the tokenizer

pub mod boolean;
pub mod index;
pub mod lsi;
pub mod rank;
pub mod stats;
pub mod tokenizer;

pub use error::Error;
pub use index::{BooleanIndex, DocId, InvertedIndex, Posting};
pub use stats::IdfTable;

mod error {
    /// Errors for retrieval operations.
    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        /// Query produced no usable tokens (or none survive the vocabulary).
        #[error("empty query")]
        EmptyQuery,
        /// Collection contains no documents.
        #[error("empty collection")]
        EmptyCollection,
        /// Document-frequency pruning removed every vocabulary term.
        #[error("vocabulary empty after document-frequency pruning")]
        EmptyVocabulary,
    }
}
