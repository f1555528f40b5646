use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::models::Book;

/// Hash index from title to the shared book record.
///
/// Each title owns a small stack of entries: inserting a title that already
/// exists pushes the new record on top so it shadows the older one, and
/// removal pops the newest entry first. Older entries resurface once the
/// newer ones are gone.
#[derive(Debug, Default)]
pub struct TitleIndex {
    entries: HashMap<String, Vec<Rc<Book>>>,
    len: usize,
}

impl TitleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `book` under `title`, shadowing any earlier entry.
    pub fn insert(&mut self, title: &str, book: Rc<Book>) {
        let stack = self.entries.entry(title.to_string()).or_default();
        stack.push(book);
        self.len += 1;
        debug!(title, depth = stack.len(), "title index insert");
    }

    /// Most recently inserted surviving entry for `title`.
    pub fn lookup(&self, title: &str) -> Option<Rc<Book>> {
        self.entries
            .get(title)
            .and_then(|stack| stack.last())
            .cloned()
    }

    /// Drop the newest entry for `title`, returning it. Absent titles are a
    /// no-op.
    pub fn remove(&mut self, title: &str) -> Option<Rc<Book>> {
        let stack = self.entries.get_mut(title)?;
        let removed = stack.pop();
        if stack.is_empty() {
            self.entries.remove(title);
        }
        if removed.is_some() {
            self.len -= 1;
            debug!(title, "title index remove");
        }
        removed
    }

    /// Drop exactly `book` from its title's stack, wherever it sits. Other
    /// records sharing the title keep their order.
    pub fn remove_record(&mut self, book: &Rc<Book>) -> Option<Rc<Book>> {
        let title = book.title.as_str();
        let stack = self.entries.get_mut(title)?;
        let position = stack.iter().position(|entry| Rc::ptr_eq(entry, book))?;
        let removed = stack.remove(position);
        if stack.is_empty() {
            self.entries.remove(title);
        }
        self.len -= 1;
        debug!(title, position, "title index remove record");
        Some(removed)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.entries.contains_key(title)
    }

    /// Total number of live entries, shadowed ones included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Distinct titles currently indexed, in no particular order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Every live entry, shadowed ones included.
    pub fn entries(&self) -> impl Iterator<Item = &Rc<Book>> {
        self.entries.values().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, rating: f64) -> Rc<Book> {
        Rc::new(Book::new(title, "Author", rating, 10))
    }

    #[test]
    fn lookup_returns_inserted_record() {
        let mut index = TitleIndex::new();
        let dune = book("Dune", 4.9);
        index.insert("Dune", Rc::clone(&dune));

        let hit = index.lookup("Dune").expect("Dune indexed");
        assert!(Rc::ptr_eq(&hit, &dune));
        assert!(index.lookup("Emma").is_none());
    }

    #[test]
    fn newer_entry_shadows_older_until_removed() {
        let mut index = TitleIndex::new();
        let first = book("Dune", 4.1);
        let second = book("Dune", 4.8);
        index.insert("Dune", Rc::clone(&first));
        index.insert("Dune", Rc::clone(&second));
        assert_eq!(index.len(), 2);

        assert!(Rc::ptr_eq(&index.lookup("Dune").unwrap(), &second));
        let removed = index.remove("Dune").unwrap();
        assert!(Rc::ptr_eq(&removed, &second));
        assert!(Rc::ptr_eq(&index.lookup("Dune").unwrap(), &first));

        index.remove("Dune");
        assert!(!index.contains("Dune"));
        assert!(index.is_empty());
    }

    #[test]
    fn removing_unknown_title_is_a_no_op() {
        let mut index = TitleIndex::new();
        index.insert("Emma", book("Emma", 3.9));
        assert!(index.remove("Dune").is_none());
        assert_eq!(index.len(), 1);
        assert_eq!(index.titles().collect::<Vec<_>>(), vec!["Emma"]);
    }

    #[test]
    fn remove_record_takes_a_shadowed_entry() {
        let mut index = TitleIndex::new();
        let old = book("Dune", 4.9);
        let new = book("Dune", 1.0);
        index.insert("Dune", Rc::clone(&old));
        index.insert("Dune", Rc::clone(&new));

        let removed = index.remove_record(&old).unwrap();
        assert!(Rc::ptr_eq(&removed, &old));
        assert!(Rc::ptr_eq(&index.lookup("Dune").unwrap(), &new));
        assert_eq!(index.len(), 1);

        // an equal but distinct record is not in the index
        assert!(index.remove_record(&book("Dune", 1.0)).is_none());
        assert_eq!(index.len(), 1);

        index.remove_record(&new).unwrap();
        assert!(!index.contains("Dune"));
        assert!(index.is_empty());
    }
}
