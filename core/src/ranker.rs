use crate::catalog::{BookRecord, RowIndex};
use crate::error::Result;
use crate::index::VectorIndex;
use crate::resolver::resolve;

/// Genre restriction applied to candidates before ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GenreFilter {
    #[default]
    All,
    Only(String),
}

impl GenreFilter {
    /// Blank input and the sentinel "all" (any case) mean no restriction.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None => GenreFilter::All,
            Some(v) if v.is_empty() || v.eq_ignore_ascii_case("all") => GenreFilter::All,
            Some(v) => GenreFilter::Only(v.to_string()),
        }
    }

    pub fn matches(&self, genre: &str) -> bool {
        match self {
            GenreFilter::All => true,
            GenreFilter::Only(g) => g.to_lowercase() == genre.to_lowercase(),
        }
    }
}

/// Inclusive publication-year window. An inverted window matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self { Self { start, end } }
    pub fn contains(&self, year: i32) -> bool { self.start <= year && year <= self.end }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendQuery {
    pub top_n: usize,
    pub genre: GenreFilter,
    pub years: Option<YearRange>,
}

impl Default for RecommendQuery {
    fn default() -> Self {
        Self { top_n: 5, genre: GenreFilter::All, years: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub row: RowIndex,
    pub book: BookRecord,
    pub score: f32,
}

/// Rank every other book by similarity to `row`, then filter and truncate.
pub fn recommend(index: &VectorIndex, row: RowIndex, query: &RecommendQuery) -> Result<Vec<Recommendation>> {
    let scores = index.similarities(row)?;
    if query.top_n == 0 {
        return Ok(Vec::new());
    }
    let books = index.catalog().books();
    let mut candidates: Vec<(RowIndex, f32)> = scores
        .into_iter()
        .enumerate()
        .filter(|&(r, _)| r != row)
        .filter(|&(r, _)| query.genre.matches(&books[r].genre))
        .filter(|&(r, _)| query.years.map_or(true, |y| y.contains(books[r].year)))
        .collect();
    // sort_by is stable: equal scores keep row order.
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    candidates.truncate(query.top_n);
    Ok(candidates
        .into_iter()
        .map(|(r, score)| Recommendation { row: r, book: books[r].clone(), score })
        .collect())
}

/// Resolve `title` against the index's catalog and recommend from the match.
///
/// Returns the resolved row alongside the ranking; an unmatched title yields
/// `None` and an empty list.
pub fn recommend_by_title(index: &VectorIndex, title: &str, query: &RecommendQuery) -> Result<(Option<RowIndex>, Vec<Recommendation>)> {
    match resolve(index.catalog(), title) {
        Some(row) => Ok((Some(row), recommend(index, row, query)?)),
        None => {
            tracing::debug!(title, "no catalog title matched");
            Ok((None, Vec::new()))
        }
    }
}
