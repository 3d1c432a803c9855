use crate::catalog::{Catalog, RowIndex};
use crate::error::{EngineError, Result};
use crate::tokenizer::terms;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

pub type TermId = u32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TfidfConfig {
    /// Vocabulary cap, ranked by total corpus count.
    pub max_features: usize,
    /// Minimum number of documents a term must appear in.
    pub min_df: u32,
    /// Longest n-gram to index (1 = unigrams only).
    pub ngram_max: usize,
    /// Use `1 + ln(tf)` instead of the raw count.
    pub sublinear_tf: bool,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self { max_features: 5000, min_df: 1, ngram_max: 2, sublinear_tf: false }
    }
}

/// L2-normalized sparse row, entries sorted by term id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(TermId, f32)>,
}

impl SparseVector {
    pub fn entries(&self) -> &[(TermId, f32)] { &self.entries }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Merge-join dot product over the shared term ids.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (a, b) = (&self.entries, &other.entries);
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a[i].1 * b[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// TF-IDF vectors for every book of a catalog over a shared vocabulary.
///
/// Immutable once built; rebuilding means constructing a new index.
#[derive(Debug)]
pub struct VectorIndex {
    catalog: Arc<Catalog>,
    vocabulary: HashMap<String, TermId>,
    idf: Vec<f32>,
    rows: Vec<SparseVector>,
}

impl VectorIndex {
    pub fn build(catalog: Arc<Catalog>) -> Result<Self> {
        Self::build_with(catalog, TfidfConfig::default())
    }

    pub fn build_with(catalog: Arc<Catalog>, config: TfidfConfig) -> Result<Self> {
        if catalog.is_empty() {
            return Err(EngineError::InvalidCatalog("cannot vectorize an empty catalog".into()));
        }
        let start = std::time::Instant::now();
        let n = catalog.len();

        // Per-document term counts plus corpus totals and document frequencies.
        let mut doc_counts: Vec<HashMap<String, u32>> = Vec::with_capacity(n);
        let mut corpus_tf: HashMap<String, u64> = HashMap::new();
        let mut df: HashMap<String, u32> = HashMap::new();
        for book in catalog.books() {
            let mut counts: HashMap<String, u32> = HashMap::new();
            for term in terms(&book.combined_text(), config.ngram_max.max(1)) {
                *counts.entry(term).or_insert(0) += 1;
            }
            for (term, c) in counts.iter() {
                *corpus_tf.entry(term.clone()).or_insert(0) += u64::from(*c);
                *df.entry(term.clone()).or_insert(0) += 1;
            }
            doc_counts.push(counts);
        }

        // Cap the vocabulary, then assign columns in term order.
        let mut ranked: Vec<(String, u64)> = corpus_tf
            .into_iter()
            .filter(|(term, _)| df.get(term).copied().unwrap_or(0) >= config.min_df)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(config.max_features);
        let ordered: BTreeMap<String, u64> = ranked.into_iter().collect();
        let vocabulary: HashMap<String, TermId> = ordered
            .into_keys()
            .enumerate()
            .map(|(id, term)| (term, id as TermId))
            .collect();

        let mut idf = vec![0.0f32; vocabulary.len()];
        for (term, &tid) in vocabulary.iter() {
            let df_t = df.get(term).copied().unwrap_or(0) as f32;
            idf[tid as usize] = ((1.0 + n as f32) / (1.0 + df_t)).ln() + 1.0;
        }

        let rows = doc_counts
            .into_iter()
            .map(|counts| weigh(&counts, &vocabulary, &idf, config.sublinear_tf))
            .collect();

        let index = Self { catalog, vocabulary, idf, rows };
        tracing::info!(
            num_books = n,
            vocabulary_size = index.vocabulary.len(),
            took_s = start.elapsed().as_secs_f64(),
            "built vector index"
        );
        Ok(index)
    }

    pub fn catalog(&self) -> &Catalog { &self.catalog }
    pub fn vocabulary(&self) -> &HashMap<String, TermId> { &self.vocabulary }
    pub fn vocabulary_size(&self) -> usize { self.vocabulary.len() }
    pub fn row_count(&self) -> usize { self.rows.len() }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary.get(term).map(|&tid| self.idf[tid as usize])
    }

    pub fn row(&self, row: RowIndex) -> Result<&SparseVector> {
        self.rows.get(row).ok_or(EngineError::RowIndexOutOfRange { row, rows: self.rows.len() })
    }

    /// Cosine similarity of `row` against every row, in row order.
    pub fn similarities(&self, row: RowIndex) -> Result<Vec<f32>> {
        let query = self.row(row)?;
        Ok(self.rows.iter().map(|r| query.dot(r).clamp(0.0, 1.0)).collect())
    }
}

fn weigh(counts: &HashMap<String, u32>, vocabulary: &HashMap<String, TermId>, idf: &[f32], sublinear_tf: bool) -> SparseVector {
    let mut entries: Vec<(TermId, f32)> = counts
        .iter()
        .filter_map(|(term, &tf_raw)| {
            let tid = *vocabulary.get(term)?;
            let tf = if sublinear_tf { 1.0 + (tf_raw as f32).ln() } else { tf_raw as f32 };
            Some((tid, tf * idf[tid as usize]))
        })
        .collect();
    entries.sort_by_key(|(tid, _)| *tid);
    let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for (_, w) in entries.iter_mut() { *w /= norm; }
    }
    SparseVector { entries }
}
