use crate::error::{EngineError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

pub type RowIndex = usize;

/// Columns every catalog input must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = ["id", "title", "author", "genre", "year", "description"];
const RATING_COLUMN: &str = "average_rating";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookRecord {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub year: i32,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f32>,
}

impl BookRecord {
    /// Title, author, genre and description joined by single spaces.
    pub fn combined_text(&self) -> String {
        [self.title.as_str(), self.author.as_str(), self.genre.as_str(), self.description.as_str()].join(" ")
    }
}

/// Ordered, immutable set of books addressed by dense row index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    books: Vec<BookRecord>,
    folded_titles: Vec<String>,
}

impl Catalog {
    pub fn new(books: Vec<BookRecord>) -> Self {
        let folded_titles = books.iter().map(|b| b.title.to_lowercase()).collect();
        Self { books, folded_titles }
    }

    /// Load and normalize a catalog from a CSV file with a header row.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        let catalog = Self::from_csv(reader)?;
        tracing::info!(path = %path.display(), num_books = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    /// Load and normalize a catalog from any CSV source with a header row.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        Self::from_csv(csv::ReaderBuilder::new().flexible(true).from_reader(rdr))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let headers = reader.headers()?.clone();
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let mut missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| position(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            missing.sort();
            return Err(EngineError::SchemaValidation { missing });
        }
        let col = |name: &str| position(name).unwrap_or_default();
        let (id_col, title_col, author_col) = (col("id"), col("title"), col("author"));
        let (genre_col, year_col, desc_col) = (col("genre"), col("year"), col("description"));
        let rating_col = position(RATING_COLUMN);

        let mut books = Vec::new();
        let mut dropped = 0usize;
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let field = |i: usize| record.get(i).unwrap_or("").trim().to_string();

            let title = field(title_col);
            if title.is_empty() {
                dropped += 1;
                continue;
            }
            let raw_id = field(id_col);
            let id = parse_int(&raw_id).ok_or_else(|| EngineError::InvalidRecord {
                line,
                message: format!("id {raw_id:?} is not an integer"),
            })?;
            books.push(BookRecord {
                id,
                title,
                author: field(author_col),
                genre: field(genre_col),
                year: parse_int(&field(year_col)).and_then(|y| i32::try_from(y).ok()).unwrap_or(0),
                description: field(desc_col),
                average_rating: rating_col.and_then(|i| field(i).parse::<f32>().ok()).filter(|r| r.is_finite()),
            });
        }
        if dropped > 0 {
            tracing::debug!(dropped, "skipped records with empty title");
        }
        Ok(Self::new(books))
    }

    pub fn len(&self) -> usize { self.books.len() }
    pub fn is_empty(&self) -> bool { self.books.is_empty() }
    pub fn books(&self) -> &[BookRecord] { &self.books }
    pub fn get(&self, row: RowIndex) -> Option<&BookRecord> { self.books.get(row) }

    /// Case-folded titles, aligned with row indices.
    pub fn folded_titles(&self) -> &[String] { &self.folded_titles }

    pub fn find_by_id(&self, id: i64) -> Option<&BookRecord> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Distinct non-empty genres in sorted order.
    pub fn genres(&self) -> Vec<String> {
        let mut genres: Vec<String> = self
            .books
            .iter()
            .filter(|b| !b.genre.is_empty())
            .map(|b| b.genre.clone())
            .collect();
        genres.sort();
        genres.dedup();
        genres
    }

    /// Smallest and largest publication year.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let min = self.books.iter().map(|b| b.year).min()?;
        let max = self.books.iter().map(|b| b.year).max()?;
        Some((min, max))
    }

    /// Most common genres with their book counts, ties by name.
    pub fn genre_counts(&self, limit: usize) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for b in self.books.iter().filter(|b| !b.genre.is_empty()) {
            *counts.entry(b.genre.as_str()).or_insert(0) += 1;
        }
        let mut counts: Vec<(String, usize)> = counts.into_iter().map(|(g, c)| (g.to_string(), c)).collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts.truncate(limit);
        counts
    }

    /// Titles containing `query` case-insensitively, in catalog order.
    ///
    /// When nothing matches, the first `limit` titles are listed instead so a
    /// picker never comes up empty.
    pub fn titles_matching(&self, query: &str, limit: usize) -> Vec<&str> {
        let q = query.trim().to_lowercase();
        let matched: Vec<&str> = self
            .books
            .iter()
            .zip(&self.folded_titles)
            .filter(|(_, folded)| folded.contains(&q))
            .map(|(b, _)| b.title.as_str())
            .take(limit)
            .collect();
        if !matched.is_empty() {
            return matched;
        }
        self.books.iter().map(|b| b.title.as_str()).take(limit).collect()
    }

    /// Books that carry a rating, best first.
    pub fn top_rated(&self, limit: usize) -> Vec<&BookRecord> {
        let mut rated: Vec<(&BookRecord, f32)> = self
            .books
            .iter()
            .filter_map(|b| b.average_rating.map(|r| (b, r)))
            .collect();
        rated.sort_by(|a, b| b.1.total_cmp(&a.1));
        rated.into_iter().take(limit).map(|(b, _)| b).collect()
    }
}

/// Integers, or decimals truncated to their integer part.
fn parse_int(s: &str) -> Option<i64> {
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok().filter(|f| f.is_finite())?;
    if f.abs() < i64::MAX as f64 { Some(f.trunc() as i64) } else { None }
}
