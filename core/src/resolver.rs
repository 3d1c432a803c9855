use crate::catalog::{Catalog, RowIndex};

/// Resolve a free-text title query to a catalog row.
///
/// An exact case-insensitive title match wins over a substring match; within
/// each step the first row in catalog order wins. `None` means nothing matched.
pub fn resolve(catalog: &Catalog, query: &str) -> Option<RowIndex> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return None;
    }
    let titles = catalog.folded_titles();
    titles
        .iter()
        .position(|t| *t == q)
        .or_else(|| titles.iter().position(|t| t.contains(&q)))
}
