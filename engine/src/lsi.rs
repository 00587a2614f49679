//! Latent semantic retrieval: a TF-IDF term-document matrix factored by
//! truncated SVD into low-rank document and term embeddings, queried by
//! projecting the query into the same space and ranking by dot product.
//!
//! The factorization is a randomized subspace iteration (range finder +
//! power steps), with the small Gram matrix eigendecomposed by cyclic
//! Jacobi. The range finder is seeded, so embeddings are reproducible for a
//! given collection and parameters.

use crate::tokenizer::{is_stopword, tokenize};
use crate::Error;
use ndarray::{Array1, Array2, Axis};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Build parameters for [`LsiModel`]. Defaults match the batch engine's
/// production settings; small collections want a looser df band and a lower
/// rank.
#[derive(Debug, Clone, Copy)]
pub struct LsiParams {
    /// Minimum number of documents a term must occur in.
    pub min_df: u32,
    /// Maximum fraction of documents a term may occur in (inclusive).
    pub max_df_ratio: f32,
    /// Target latent rank; clamped to `min(n_docs, vocab) - 1`.
    pub rank: usize,
    /// Seed for the randomized range finder.
    pub seed: u64,
}

impl Default for LsiParams {
    fn default() -> Self {
        Self {
            min_df: 75,
            max_df_ratio: 0.7,
            rank: 100,
            seed: 42,
        }
    }
}

/// TF-IDF vectorizer with its own vocabulary: stop words removed, terms kept
/// when `df >= min_df` and `df / n_docs <= max_df_ratio`, columns in sorted
/// term order. Weights are `tf * (ln((1 + n) / (1 + df)) + 1)` with each
/// document row L2-normalized.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocab: HashMap<String, usize>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    /// Learn the vocabulary and IDF weights from the collection.
    pub fn fit<S: AsRef<str>>(docs: &[S], min_df: u32, max_df_ratio: f32) -> Result<Self, Error> {
        if docs.is_empty() {
            return Err(Error::EmptyCollection);
        }
        let n_docs = docs.len() as f32;

        let mut df: HashMap<String, u32> = HashMap::new();
        for doc in docs {
            let mut terms: Vec<String> = tokenize(doc.as_ref())
                .into_iter()
                .filter(|t| !is_stopword(t))
                .collect();
            terms.sort_unstable();
            terms.dedup();
            for term in terms {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let mut kept: Vec<(String, u32)> = df
            .into_iter()
            .filter(|&(_, d)| d >= min_df && d as f32 / n_docs <= max_df_ratio)
            .collect();
        if kept.is_empty() {
            return Err(Error::EmptyVocabulary);
        }
        kept.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let mut vocab = HashMap::with_capacity(kept.len());
        let mut idf = Vec::with_capacity(kept.len());
        for (col, (term, d)) in kept.into_iter().enumerate() {
            vocab.insert(term, col);
            idf.push(((1.0 + n_docs) / (1.0 + d as f32)).ln() + 1.0);
        }
        Ok(Self { vocab, idf })
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Column index of `term`, if it survived fitting.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocab.get(term).copied()
    }

    /// TF-IDF vector of `text` under the fitted vocabulary, L2-normalized.
    /// A text with no vocabulary terms comes out as the zero vector.
    pub fn transform(&self, text: &str) -> Array1<f32> {
        let mut vec = Array1::<f32>::zeros(self.vocab.len());
        for token in tokenize(text) {
            if let Some(&col) = self.vocab.get(&token) {
                vec[col] += self.idf[col];
            }
        }
        let norm = vec.dot(&vec).sqrt();
        if norm > 0.0 {
            vec /= norm;
        }
        vec
    }

    /// Stack [`Self::transform`] of every document into an
    /// `n_docs x vocab` matrix.
    pub fn transform_corpus<S: AsRef<str>>(&self, docs: &[S]) -> Array2<f32> {
        let mut matrix = Array2::<f32>::zeros((docs.len(), self.vocab.len()));
        for (row, doc) in docs.iter().enumerate() {
            matrix.row_mut(row).assign(&self.transform(doc.as_ref()));
        }
        matrix
    }
}

/// Frozen latent-semantic model: unit-row document embeddings
/// (`n_docs x rank`) and term embeddings (`vocab x rank`) plus the fitted
/// vectorizer for query projection.
pub struct LsiModel {
    vectorizer: TfidfVectorizer,
    doc_embeddings: Array2<f32>,
    term_embeddings: Array2<f32>,
    rank: usize,
}

impl LsiModel {
    /// Vectorize the collection, factor it at the configured rank, and
    /// L2-normalize each document row and each term row independently.
    pub fn build<S: AsRef<str>>(docs: &[S], params: &LsiParams) -> Result<Self, Error> {
        let vectorizer = TfidfVectorizer::fit(docs, params.min_df, params.max_df_ratio)?;
        let matrix = vectorizer.transform_corpus(docs);
        let (n_docs, vocab) = matrix.dim();

        // The factorization needs rank strictly below the smaller dimension.
        let rank = params.rank.min(n_docs.min(vocab).saturating_sub(1)).max(1);
        let (u, _sigma, v) = truncated_svd(&matrix, rank, params.seed);

        tracing::info!(n_docs, vocab, rank, "built latent semantic model");
        Ok(Self {
            vectorizer,
            doc_embeddings: normalize_rows(u),
            term_embeddings: normalize_rows(v),
            rank,
        })
    }

    /// Project `query` into the latent space through the term embeddings and
    /// L2-normalize. Fails with [`Error::EmptyQuery`] when the query shares
    /// no terms with the fitted vocabulary (including the zero-token query).
    pub fn embed_query(&self, query: &str) -> Result<Array1<f32>, Error> {
        let query_vec = self.vectorizer.transform(query);
        let mut projected = self.term_embeddings.t().dot(&query_vec);
        let norm = projected.dot(&projected).sqrt();
        if norm == 0.0 {
            return Err(Error::EmptyQuery);
        }
        projected /= norm;
        Ok(projected)
    }

    /// Indices and similarities of the `k` documents nearest to
    /// `query_embedding`, best first. Both sides are unit vectors, so the
    /// dot product is cosine similarity. Ties break by ascending index;
    /// fewer than `k` results only when the collection is smaller than `k`.
    pub fn nearest_documents(&self, query_embedding: &Array1<f32>, k: usize) -> Vec<(usize, f32)> {
        let mut heap: BinaryHeap<Reverse<(OrderedFloat<f32>, Reverse<usize>)>> =
            BinaryHeap::with_capacity(k + 1);
        for (doc, row) in self.doc_embeddings.axis_iter(Axis(0)).enumerate() {
            let sim = row.dot(query_embedding);
            heap.push(Reverse((OrderedFloat(sim), Reverse(doc))));
            if heap.len() > k {
                heap.pop();
            }
        }
        let mut results: Vec<(usize, f32)> = heap
            .into_iter()
            .map(|Reverse((sim, Reverse(doc)))| (doc, sim.0))
            .collect();
        results.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        results
    }

    pub fn doc_embeddings(&self) -> &Array2<f32> {
        &self.doc_embeddings
    }

    pub fn term_embeddings(&self) -> &Array2<f32> {
        &self.term_embeddings
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn rank(&self) -> usize {
        self.rank
    }
}

/// L2-normalize each row in place; zero rows stay zero.
fn normalize_rows(mut m: Array2<f32>) -> Array2<f32> {
    for mut row in m.axis_iter_mut(Axis(0)) {
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row /= norm;
        }
    }
    m
}

/// Randomized truncated SVD of `a` (`n x v`) at `rank`, returning
/// `(u: n x rank, sigma: rank, v: v x rank)` with singular values in
/// descending order.
fn truncated_svd(a: &Array2<f32>, rank: usize, seed: u64) -> (Array2<f32>, Array1<f32>, Array2<f32>) {
    let (n, v) = a.dim();
    let rank = rank.min(n).min(v).max(1);
    // Oversampled sketch width for the range finder.
    let sketch = (rank + 8).min(n).min(v);

    let mut rng = StdRng::seed_from_u64(seed);
    let omega = Array2::from_shape_fn((v, sketch), |_| rng.gen_range(-1.0f32..1.0));

    // Range finder, sharpened by two power iterations.
    let mut q = orthonormalize(a.dot(&omega));
    for _ in 0..2 {
        let y = a.dot(&a.t().dot(&q));
        q = orthonormalize(y);
    }

    // Project to the small subspace and eigendecompose its Gram matrix.
    let b = q.t().dot(a); // sketch x v
    let gram = b.dot(&b.t()); // sketch x sketch, symmetric
    let (eigvals, eigvecs) = jacobi_eigh(gram);

    let mut order: Vec<usize> = (0..eigvals.len()).collect();
    order.sort_unstable_by(|&i, &j| eigvals[j].total_cmp(&eigvals[i]));
    order.truncate(rank);

    let w = eigvecs.select(Axis(1), &order);
    let sigma = Array1::from_iter(order.iter().map(|&i| eigvals[i].max(0.0).sqrt()));

    let u = q.dot(&w); // n x rank
    let mut right = b.t().dot(&w); // v x rank, columns scaled by sigma
    for (col, &s) in sigma.iter().enumerate() {
        let mut column = right.column_mut(col);
        if s > f32::EPSILON {
            column /= s;
        } else {
            column.fill(0.0);
        }
    }
    (u, sigma, right)
}

/// Orthonormalize the columns of `m` by Gram-Schmidt. The projection pass
/// runs twice per column: a single pass leaves f32 cancellation residue on
/// near-dependent columns, which would normalize into spurious unit columns
/// almost parallel to earlier ones. Columns whose residual is negligible
/// relative to their pre-projection norm are dropped to zero instead of
/// normalized.
fn orthonormalize(mut m: Array2<f32>) -> Array2<f32> {
    let cols = m.ncols();
    for j in 0..cols {
        let original_norm = m.column(j).dot(&m.column(j)).sqrt();
        for _ in 0..2 {
            for i in 0..j {
                let proj = m.column(i).dot(&m.column(j));
                let prev = m.column(i).to_owned();
                let mut col = m.column_mut(j);
                col.scaled_add(-proj, &prev);
            }
        }
        let norm = m.column(j).dot(&m.column(j)).sqrt();
        let mut col = m.column_mut(j);
        if norm > 1e-5 * original_norm.max(f32::EPSILON) {
            col /= norm;
        } else {
            col.fill(0.0);
        }
    }
    m
}

/// Eigendecomposition of a symmetric matrix by cyclic Jacobi rotations.
/// Returns `(eigenvalues, eigenvectors-as-columns)`, unsorted.
fn jacobi_eigh(mut a: Array2<f32>) -> (Array1<f32>, Array2<f32>) {
    let n = a.nrows();
    let mut v = Array2::<f32>::eye(n);
    for _sweep in 0..64 {
        let mut off_diag = 0.0f32;
        for p in 0..n {
            for q in (p + 1)..n {
                off_diag += a[[p, q]] * a[[p, q]];
            }
        }
        if off_diag < 1e-12 {
            break;
        }
        for p in 0..n.saturating_sub(1) {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq.abs() < 1e-12 {
                    continue;
                }
                let theta = 0.5 * (a[[q, q]] - a[[p, p]]) / apq;
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;
                for i in 0..n {
                    let aip = a[[i, p]];
                    let aiq = a[[i, q]];
                    a[[i, p]] = c * aip - s * aiq;
                    a[[i, q]] = s * aip + c * aiq;
                }
                for i in 0..n {
                    let api = a[[p, i]];
                    let aqi = a[[q, i]];
                    a[[p, i]] = c * api - s * aqi;
                    a[[q, i]] = s * api + c * aqi;
                }
                for i in 0..n {
                    let vip = v[[i, p]];
                    let viq = v[[i, q]];
                    v[[i, p]] = c * vip - s * viq;
                    v[[i, q]] = s * vip + c * viq;
                }
            }
        }
    }
    let eigvals = Array1::from_iter((0..n).map(|i| a[[i, i]]));
    (eigvals, v)
}
