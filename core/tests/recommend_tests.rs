use bookrec_core::{
    recommend, recommend_by_title, resolve, BookRecord, Catalog, EngineError, GenreFilter, RecommendQuery, VectorIndex,
    YearRange,
};
use std::io::Write;
use std::sync::Arc;

fn book(id: i64, title: &str, author: &str, genre: &str, year: i32, description: &str) -> BookRecord {
    BookRecord {
        id,
        title: title.into(),
        author: author.into(),
        genre: genre.into(),
        year,
        description: description.into(),
        average_rating: None,
    }
}

fn dune_catalog() -> Arc<Catalog> {
    Arc::new(Catalog::new(vec![
        book(10, "Dune", "", "Sci-Fi", 1965, ""),
        book(20, "Dune Messiah", "", "Sci-Fi", 1969, ""),
        book(30, "Hobbit", "", "Fantasy", 1937, ""),
    ]))
}

fn library() -> Arc<Catalog> {
    Arc::new(Catalog::new(vec![
        book(1, "Dune", "Frank Herbert", "Sci-Fi", 1965, "Desert planet politics and giant sandworms"),
        book(2, "Dune Messiah", "Frank Herbert", "Sci-Fi", 1969, "Emperor of the desert planet faces a conspiracy"),
        book(3, "Children of Dune", "Frank Herbert", "Sci-Fi", 1976, "Twins inherit the desert planet"),
        book(4, "The Hobbit", "J.R.R. Tolkien", "Fantasy", 1937, "A hobbit joins dwarves on a quest for dragon gold"),
        book(5, "The Fellowship of the Ring", "J.R.R. Tolkien", "Fantasy", 1954, "A hobbit carries a ring on a quest"),
        book(6, "Foundation", "Isaac Asimov", "Sci-Fi", 1951, "Psychohistory predicts the fall of a galactic empire"),
        book(7, "Emma", "Jane Austen", "Romance", 1815, "Matchmaking in a country village"),
        book(8, "Dragon Desert", "Anon", "fantasy", 1990, "A dragon crosses a desert planet"),
    ]))
}

#[test]
fn scenario_all_genres() {
    let index = VectorIndex::build(dune_catalog()).unwrap();
    let (row, results) = recommend_by_title(&index, "Dune", &RecommendQuery::default()).unwrap();
    assert_eq!(row, Some(0));
    let titles: Vec<&str> = results.iter().map(|r| r.book.title.as_str()).collect();
    assert_eq!(titles[0], "Dune Messiah");
    assert!(!titles.contains(&"Dune"));
    assert!(results[0].score > 0.0);
    if let Some(hobbit) = results.iter().find(|r| r.book.title == "Hobbit") {
        assert!(hobbit.score <= results[0].score);
    }
}

#[test]
fn scenario_fantasy_only() {
    let index = VectorIndex::build(dune_catalog()).unwrap();
    let query = RecommendQuery { genre: GenreFilter::parse(Some("Fantasy")), ..RecommendQuery::default() };
    let (_, results) = recommend_by_title(&index, "Dune", &query).unwrap();
    assert!(results.iter().all(|r| r.book.genre != "Sci-Fi"));
    assert_eq!(results.len(), 1);
}

#[test]
fn resolver_precedence_and_fallback() {
    let catalog = dune_catalog();
    assert_eq!(resolve(&catalog, "dune"), Some(0));
    let reordered = Catalog::new(vec![
        book(1, "Hobbit", "", "", 0, ""),
        book(2, "Dune Messiah", "", "", 0, ""),
        book(3, "Dune", "", "", 0, ""),
    ]);
    assert_eq!(resolve(&reordered, "dune"), Some(2));
    assert_eq!(resolve(&reordered, "une"), Some(1));
}

#[test]
fn deterministic_and_bounded() {
    let index = VectorIndex::build(library()).unwrap();
    let query = RecommendQuery { top_n: 10, ..RecommendQuery::default() };
    for row in 0..index.row_count() {
        let a = recommend(&index, row, &query).unwrap();
        let b = recommend(&index, row, &query).unwrap();
        assert_eq!(a, b);
        assert!(a.len() <= 10);
        assert_eq!(a.len(), index.row_count() - 1);
        assert!(a.iter().all(|r| r.row != row));
        assert!(a.iter().all(|r| (0.0..=1.0).contains(&r.score)));
        assert!(a.windows(2).all(|w| w[0].score >= w[1].score));
    }
}

#[test]
fn equal_scores_keep_catalog_order() {
    let index = VectorIndex::build(library()).unwrap();
    // Emma shares nothing with Foundation; zero-score rows follow catalog order.
    let query = RecommendQuery { top_n: 10, genre: GenreFilter::parse(Some("Romance")), years: None };
    let results = recommend(&index, 5, &query).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 0.0);

    let zeros: Vec<usize> = recommend(&index, 6, &RecommendQuery { top_n: 10, ..RecommendQuery::default() })
        .unwrap()
        .into_iter()
        .filter(|r| r.score == 0.0)
        .map(|r| r.row)
        .collect();
    assert!(zeros.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn filters_hold_for_every_entry() {
    let index = VectorIndex::build(library()).unwrap();
    let query = RecommendQuery {
        top_n: 10,
        genre: GenreFilter::parse(Some("FANTASY")),
        years: Some(YearRange::new(1950, 2000)),
    };
    let results = recommend(&index, 0, &query).unwrap();
    let titles: Vec<&str> = results.iter().map(|r| r.book.title.as_str()).collect();
    assert_eq!(titles, vec!["Dragon Desert", "The Fellowship of the Ring"]);
    assert!(results.iter().all(|r| r.book.genre.eq_ignore_ascii_case("fantasy")));
    assert!(results.iter().all(|r| (1950..=2000).contains(&r.book.year)));
}

#[test]
fn same_author_and_setting_rank_first() {
    let index = VectorIndex::build(library()).unwrap();
    let query = RecommendQuery { top_n: 2, ..RecommendQuery::default() };
    let (_, results) = recommend_by_title(&index, "the hobbit", &query).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].book.title, "The Fellowship of the Ring");
}

#[test]
fn cardinality_edges() {
    let index = VectorIndex::build(library()).unwrap();
    let none = RecommendQuery { top_n: 0, ..RecommendQuery::default() };
    assert!(recommend(&index, 0, &none).unwrap().is_empty());
    let inverted = RecommendQuery { years: Some(YearRange::new(2000, 1900)), ..RecommendQuery::default() };
    assert!(recommend(&index, 0, &inverted).unwrap().is_empty());
    let (row, results) = recommend_by_title(&index, "moby dick", &RecommendQuery::default()).unwrap();
    assert!(row.is_none() && results.is_empty());
}

#[test]
fn out_of_range_row_is_an_error() {
    let index = VectorIndex::build(dune_catalog()).unwrap();
    let err = recommend(&index, 3, &RecommendQuery::default()).unwrap_err();
    assert!(matches!(err, EngineError::RowIndexOutOfRange { row: 3, rows: 3 }));
}

#[test]
fn empty_catalog_is_rejected() {
    let err = VectorIndex::build(Arc::new(Catalog::new(Vec::new()))).unwrap_err();
    assert!(matches!(err, EngineError::InvalidCatalog(_)));
}

#[test]
fn loads_catalog_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "id,title,author,genre,year,description").unwrap();
    writeln!(f, "1,Dune,Frank Herbert,Sci-Fi,1965,\"Desert planet, spice\"").unwrap();
    writeln!(f, "2,Dune Messiah,Frank Herbert,Sci-Fi,1969,Sequel").unwrap();
    drop(f);

    let catalog = Arc::new(Catalog::from_path(&path).unwrap());
    assert_eq!(catalog.get(0).unwrap().description, "Desert planet, spice");
    let index = VectorIndex::build(catalog).unwrap();
    let (_, results) = recommend_by_title(&index, "messiah", &RecommendQuery::default()).unwrap();
    assert_eq!(results[0].book.id, 1);
}
