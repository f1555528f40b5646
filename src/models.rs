//! Domain models shared by the catalog structures, the user directory and the
//! TUI. These stay light-weight data holders; ordering and indexing live in
//! [`crate::catalog`].

use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
/// A catalog entry. The title is the identity; the score fields decide where
/// the book sits in the ranking and never change after creation.
pub struct Book {
    pub title: String,
    pub author: String,
    /// Average rating in `[0.0, 5.0]`.
    pub rating: f64,
    pub review_count: u32,
}

impl Book {
    pub fn new(title: &str, author: &str, rating: f64, review_count: u32) -> Self {
        Self {
            title: title.to_string(),
            author: author.to_string(),
            rating,
            review_count,
        }
    }

    /// The composite key the rank tree orders on.
    pub fn score(&self) -> ScoreKey {
        ScoreKey::new(self.rating, self.review_count)
    }
}

impl fmt::Display for Book {
    /// One-line summary used by the list views.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} by {} ({:.2}, {} reviews)",
            self.title, self.author, self.rating, self.review_count
        )
    }
}

/// Composite ranking key: rating first, review count as the tie-break.
///
/// Ratings are validated to be finite before a book is created. Signed zeros
/// are folded together before [`f64::total_cmp`], so `-0.0` and `0.0` compare
/// equal and fall through to the review count.
#[derive(Debug, Clone, Copy)]
pub struct ScoreKey {
    pub rating: f64,
    pub review_count: u32,
}

impl ScoreKey {
    pub fn new(rating: f64, review_count: u32) -> Self {
        Self {
            rating,
            review_count,
        }
    }
}

impl PartialEq for ScoreKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoreKey {}

impl PartialOrd for ScoreKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoreKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // Adding 0.0 turns -0.0 into 0.0 and leaves every other value alone.
        (self.rating + 0.0)
            .total_cmp(&(other.rating + 0.0))
            .then(self.review_count.cmp(&other.review_count))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A registered reader and the title they picked as their favorite.
pub struct UserRecord {
    pub name: String,
    pub favorite_title: String,
}

impl fmt::Display for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (favorite: {})", self.name, self.favorite_title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_orders_by_rating_then_reviews() {
        let low = ScoreKey::new(4.0, 9000);
        let high = ScoreKey::new(4.5, 10);
        let tie_more = ScoreKey::new(4.5, 11);
        assert!(low < high);
        assert!(high < tie_more);
        assert_eq!(ScoreKey::new(4.5, 10), high);
    }

    #[test]
    fn signed_zero_ratings_tie_on_rating() {
        assert_eq!(ScoreKey::new(-0.0, 50), ScoreKey::new(0.0, 50));
        assert!(ScoreKey::new(0.0, 50) < ScoreKey::new(-0.0, 100));
        assert!(ScoreKey::new(-0.0, 50) < ScoreKey::new(0.0, 100));
    }

    #[test]
    fn display_formats_rating_with_two_decimals() {
        let book = Book::new("Dune", "Frank Herbert", 4.9, 6000);
        assert_eq!(book.to_string(), "Dune by Frank Herbert (4.90, 6000 reviews)");
    }
}
