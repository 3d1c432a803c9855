//! Content-based book recommendations over a TF-IDF vector space.

pub mod catalog;
pub mod error;
pub mod index;
pub mod ranker;
pub mod resolver;
pub mod shared;
pub mod tokenizer;

pub use catalog::{BookRecord, Catalog, RowIndex};
pub use error::{EngineError, Result};
pub use index::{SparseVector, TermId, TfidfConfig, VectorIndex};
pub use ranker::{recommend, recommend_by_title, GenreFilter, RecommendQuery, Recommendation, YearRange};
pub use resolver::resolve;
pub use shared::SharedIndex;
