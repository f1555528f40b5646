//! Behavioural tests for the catalog: ordering, index consistency and the
//! recommendation list, driven only through the public API.

use std::collections::HashSet;
use std::rc::Rc;

use book_catalog::{Book, Catalog, RemoveOutcome};
use pretty_assertions::assert_eq;

fn titles(books: &[Rc<Book>]) -> Vec<&str> {
    books.iter().map(|b| b.title.as_str()).collect()
}

fn assert_descending(books: &[Rc<Book>]) {
    for pair in books.windows(2) {
        assert!(
            pair[0].score() >= pair[1].score(),
            "'{}' ranked above '{}'",
            pair[0].title,
            pair[1].title
        );
    }
}

/// Small deterministic generator so the interleaving test is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

#[test]
fn scenario_top_two_then_remove() {
    let mut catalog = Catalog::new();
    catalog.add_book("Dune", "Frank Herbert", 4.9, 6000).unwrap();
    catalog.add_book("Hobbit", "J.R.R. Tolkien", 4.7, 4000).unwrap();
    catalog.add_book("1984", "George Orwell", 4.0, 3200).unwrap();

    assert_eq!(titles(&catalog.top_recommended(2)), vec!["Dune", "Hobbit"]);
    assert!(matches!(catalog.remove_book("Hobbit"), RemoveOutcome::Removed(_)));
    assert_eq!(titles(&catalog.list_all_descending()), vec!["Dune", "1984"]);
}

#[test]
fn duplicate_scores_keep_both_books() {
    let mut catalog = Catalog::new();
    catalog.add_book("Twin A", "X", 4.2, 77).unwrap();
    catalog.add_book("Twin B", "Y", 4.2, 77).unwrap();

    let mut listed = titles(&catalog.list_all_descending())
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    listed.sort();
    assert_eq!(listed, vec!["Twin A", "Twin B"]);
}

#[test]
fn add_then_remove_restores_previous_set() {
    let mut catalog = Catalog::seeded(Default::default()).unwrap();
    let before: HashSet<String> = catalog
        .list_all_descending()
        .iter()
        .map(|b| b.title.clone())
        .collect();

    catalog.add_book("Dune", "Frank Herbert", 4.9, 6000).unwrap();
    catalog.remove_book("Dune");

    let after: HashSet<String> = catalog
        .list_all_descending()
        .iter()
        .map(|b| b.title.clone())
        .collect();
    assert_eq!(before, after);
    catalog.check_consistency().unwrap();
}

#[test]
fn top_recommended_size_law() {
    let catalog = Catalog::seeded(Default::default()).unwrap();
    let total = catalog.len();
    for n in [0, 1, 5, total - 1, total, total + 3] {
        let top = catalog.top_recommended(n);
        assert_eq!(top.len(), n.min(total), "n = {n}");
        assert_descending(&top);
        let distinct: HashSet<*const Book> = top.iter().map(Rc::as_ptr).collect();
        assert_eq!(distinct.len(), top.len());
    }
}

#[test]
fn seeded_ranking_breaks_rating_ties_by_reviews() {
    let catalog = Catalog::seeded(Default::default()).unwrap();
    assert_eq!(
        titles(&catalog.top_recommended(5)),
        vec![
            "The Little Prince",
            "The Lord of the Rings",
            "Moby Dick",
            "Harry Potter and the Philosopher's Stone",
            "Pride and Prejudice",
        ]
    );
}

#[test]
fn interleaved_adds_and_removes_stay_consistent() {
    let mut catalog = Catalog::new();
    let mut live: Vec<String> = Vec::new();
    let mut rng = Lcg(42);

    for step in 0..400 {
        if live.is_empty() || rng.next(3) > 0 {
            let title = format!("Book {step}");
            // Coarse scores so ties are frequent.
            let rating = rng.next(6) as f64 * 0.5 + 2.0;
            let reviews = rng.next(4) as u32 * 100;
            catalog.add_book(&title, "Author", rating, reviews).unwrap();
            live.push(title);
        } else {
            let victim = live.swap_remove(rng.next(live.len() as u64) as usize);
            let outcome = catalog.remove_book(&victim);
            let RemoveOutcome::Removed(book) = outcome else {
                panic!("'{victim}' should be present");
            };
            assert_eq!(book.title, victim);
        }

        catalog.check_consistency().unwrap();
        assert_eq!(catalog.len(), live.len());
    }

    let listed = catalog.list_all_descending();
    assert_descending(&listed);
    let listed: HashSet<&str> = titles(&listed).into_iter().collect();
    let expected: HashSet<&str> = live.iter().map(String::as_str).collect();
    assert_eq!(listed, expected);
    for title in &live {
        assert_eq!(catalog.lookup(title).unwrap().title, *title);
    }
}

#[test]
fn removing_everything_empties_both_structures() {
    let mut catalog = Catalog::seeded(Default::default()).unwrap();
    for book in catalog.list_all_descending() {
        catalog.remove_book(&book.title);
    }
    assert!(catalog.is_empty());
    assert!(catalog.list_all_descending().is_empty());
    assert!(catalog.lookup("1984").is_none());
    assert_eq!(catalog.remove_book("1984"), RemoveOutcome::NotFound);
}
