//! The in-memory book catalog: a [`RankTree`] for score ordering kept in step
//! with a [`TitleIndex`] for lookups. Every mutation goes through [`Catalog`]
//! so both structures always hold the same set of records.

mod rank_tree;
mod seed;
mod title_index;

use std::collections::HashSet;
use std::rc::Rc;

use tracing::{error, info, warn};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::models::Book;

pub use rank_tree::{Descending, RankTree};
pub use seed::SEED_BOOKS;
pub use title_index::TitleIndex;

/// What happened when a title was asked to be removed.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoveOutcome {
    Removed(Rc<Book>),
    NotFound,
}

/// Composition root owning both structures.
#[derive(Debug, Default)]
pub struct Catalog {
    config: CatalogConfig,
    ranking: RankTree,
    titles: TitleIndex,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CatalogConfig) -> Self {
        Self {
            config,
            ranking: RankTree::new(),
            titles: TitleIndex::new(),
        }
    }

    /// A catalog pre-filled with [`SEED_BOOKS`].
    pub fn seeded(config: CatalogConfig) -> Result<Self> {
        let mut catalog = Self::with_config(config);
        for (title, author, rating, reviews) in SEED_BOOKS {
            catalog.add_book(title, author, *rating, *reviews)?;
        }
        Ok(catalog)
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Validate the fields, then link one shared record into both structures.
    ///
    /// Titles are not required to be unique; a repeated title shadows the
    /// earlier record for lookups while both stay ranked.
    pub fn add_book(
        &mut self,
        title: &str,
        author: &str,
        rating: f64,
        review_count: u32,
    ) -> Result<Rc<Book>> {
        let limits = &self.config.limits;
        limits.check_title(title)?;
        limits.check_author(author)?;
        if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
            return Err(CatalogError::invalid(
                "rating",
                format!("{rating} is outside 0.0 to 5.0"),
            ));
        }

        // Store -0.0 as 0.0 so it displays and ranks like any other zero.
        let rating = rating + 0.0;
        let book = Rc::new(Book::new(title, author, rating, review_count));
        self.ranking.insert(Rc::clone(&book));
        self.titles.insert(title, Rc::clone(&book));
        info!(title, rating, review_count, "book added");
        Ok(book)
    }

    /// Remove the record currently visible under `title` from both
    /// structures. Unknown titles leave the catalog untouched.
    pub fn remove_book(&mut self, title: &str) -> RemoveOutcome {
        let Some(book) = self.titles.lookup(title) else {
            warn!(title, "remove requested for unknown book");
            return RemoveOutcome::NotFound;
        };

        // An indexed book the tree does not hold keeps its index entry.
        let outcome = self.unlink(&book);
        let ranked = matches!(outcome, RemoveOutcome::Removed(_));
        if !ranked {
            error!(title, "indexed book missing from the rank tree");
        }
        debug_assert!(ranked, "indexed book '{title}' missing from the rank tree");
        outcome
    }

    /// Remove exactly `book` from both structures, even when another record
    /// with the same title shadows it. Records that are not in the catalog
    /// leave it untouched.
    pub fn remove_record(&mut self, book: &Rc<Book>) -> RemoveOutcome {
        let outcome = self.unlink(book);
        if outcome == RemoveOutcome::NotFound {
            warn!(title = %book.title, "remove requested for a record not in the catalog");
        }
        outcome
    }

    /// The tree goes first: a record it does not hold is not in the catalog.
    fn unlink(&mut self, book: &Rc<Book>) -> RemoveOutcome {
        let Some(ranked) = self.ranking.remove_book(book) else {
            return RemoveOutcome::NotFound;
        };

        let indexed = self.titles.remove_record(book);
        if indexed.is_none() {
            error!(title = %book.title, "ranked book missing from the title index");
        }
        debug_assert!(
            indexed.is_some(),
            "ranked book '{}' missing from the title index",
            book.title
        );
        info!(title = %book.title, "book removed");
        RemoveOutcome::Removed(ranked)
    }

    pub fn lookup(&self, title: &str) -> Option<Rc<Book>> {
        self.titles.lookup(title)
    }

    pub fn list_all_descending(&self) -> Vec<Rc<Book>> {
        self.ranking.traverse_descending()
    }

    pub fn top_recommended(&self, n: usize) -> Vec<Rc<Book>> {
        self.ranking.top_n(n)
    }

    pub fn len(&self) -> usize {
        self.ranking.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranking.is_empty()
    }

    /// Height of the rank tree. It only grows with unlucky insertion orders
    /// since the tree is never rebalanced.
    pub fn depth(&self) -> usize {
        self.ranking.depth()
    }

    /// Verify that both structures hold exactly the same records and that the
    /// ranking is ordered.
    pub fn check_consistency(&self) -> Result<()> {
        let ranked = self.ranking.traverse_descending();
        if ranked.len() != self.titles.len() {
            return Err(CatalogError::Inconsistent(format!(
                "rank tree holds {} books but the title index holds {}",
                ranked.len(),
                self.titles.len()
            )));
        }

        if let Some(pair) = ranked.windows(2).find(|pair| pair[0].score() < pair[1].score()) {
            return Err(CatalogError::Inconsistent(format!(
                "'{}' is ranked above '{}'",
                pair[0].title, pair[1].title
            )));
        }

        let indexed: HashSet<*const Book> = self.titles.entries().map(Rc::as_ptr).collect();
        if let Some(stray) = ranked.iter().find(|book| !indexed.contains(&Rc::as_ptr(book))) {
            return Err(CatalogError::Inconsistent(format!(
                "'{}' is ranked but not indexed",
                stray.title
            )));
        }

        Ok(())
    }
}

impl RemoveOutcome {
    /// For callers that treat a missing title as an error.
    pub fn into_result(self, title: &str) -> Result<Rc<Book>> {
        match self {
            RemoveOutcome::Removed(book) => Ok(book),
            RemoveOutcome::NotFound => Err(CatalogError::book_not_found(title)),
        }
    }
}
