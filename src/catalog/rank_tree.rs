use std::cmp::Ordering;
use std::mem;
use std::rc::Rc;

use tracing::debug;

use crate::models::{Book, ScoreKey};

/// Position of a node inside the arena.
type NodeId = usize;

#[derive(Debug)]
struct Node {
    book: Rc<Book>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// Unbalanced binary search tree over books, ascending on [`ScoreKey`].
///
/// Nodes live in an arena and link to each other by index, so every child slot
/// has exactly one owner. A new book descends right only when its key is
/// strictly greater than the node's; equal keys go left. Duplicate keys are
/// legal and stay as separate nodes. Deletion may later move an equal key to
/// the right of its twin, so the invariant the tree keeps is
/// `left <= node <= right`.
///
/// Released slots are recycled before the arena grows.
#[derive(Debug, Default)]
pub struct RankTree {
    nodes: Vec<Option<Node>>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    len: usize,
}

impl RankTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Link `book` into the tree following the composite ordering.
    pub fn insert(&mut self, book: Rc<Book>) {
        let key = book.score();
        let id = self.alloc(book);
        self.len += 1;

        let Some(mut current) = self.root else {
            self.root = Some(id);
            debug!(depth = 1, "rank tree insert at root");
            return;
        };

        let mut depth = 2;
        loop {
            let node = self.node(current);
            let go_right = key > node.book.score();
            let next = if go_right { node.right } else { node.left };
            match next {
                Some(child) => {
                    current = child;
                    depth += 1;
                }
                None => {
                    let parent = self.node_mut(current);
                    if go_right {
                        parent.right = Some(id);
                    } else {
                        parent.left = Some(id);
                    }
                    break;
                }
            }
        }
        debug!(depth, "rank tree insert");
    }

    /// Remove some node whose key equals `(rating, review_count)`.
    ///
    /// When several books share the key, the first one met on the descent is
    /// removed, whichever title it carries. Use [`RankTree::remove_book`] to
    /// remove a specific record.
    pub fn remove(&mut self, rating: f64, review_count: u32) -> Option<Rc<Book>> {
        self.remove_where(ScoreKey::new(rating, review_count), None)
    }

    /// Remove exactly the node holding `book` (compared by identity).
    pub fn remove_book(&mut self, book: &Rc<Book>) -> Option<Rc<Book>> {
        self.remove_where(book.score(), Some(book))
    }

    /// Every book, highest score first.
    pub fn traverse_descending(&self) -> Vec<Rc<Book>> {
        self.iter_descending().cloned().collect()
    }

    /// The first `n` books in descending order; exactly `min(n, len)` items.
    pub fn top_n(&self, n: usize) -> Vec<Rc<Book>> {
        self.iter_descending().take(n).cloned().collect()
    }

    /// Lazy reverse in-order walk (right subtree, node, left subtree).
    pub fn iter_descending(&self) -> Descending<'_> {
        let mut iter = Descending {
            tree: self,
            stack: Vec::new(),
        };
        iter.push_right_spine(self.root);
        iter
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending: Vec<(NodeId, usize)> = self.root.map(|id| (id, 1)).into_iter().collect();
        while let Some((id, level)) = pending.pop() {
            deepest = deepest.max(level);
            let node = self.node(id);
            for child in [node.left, node.right].into_iter().flatten() {
                pending.push((child, level + 1));
            }
        }
        deepest
    }

    fn remove_where(&mut self, key: ScoreKey, target: Option<&Rc<Book>>) -> Option<Rc<Book>> {
        let mut removed = None;
        self.root = self.remove_from(self.root, key, target, &mut removed);
        if removed.is_some() {
            self.len -= 1;
            debug!(
                rating = key.rating,
                review_count = key.review_count,
                "rank tree remove"
            );
        }
        removed
    }

    /// Remove the matching node from the subtree rooted at `subtree` and return
    /// the subtree's new root.
    fn remove_from(
        &mut self,
        subtree: Option<NodeId>,
        key: ScoreKey,
        target: Option<&Rc<Book>>,
        removed: &mut Option<Rc<Book>>,
    ) -> Option<NodeId> {
        let id = subtree?;
        let node = self.node(id);
        match key.cmp(&node.book.score()) {
            Ordering::Less => {
                let left = node.left;
                let new_left = self.remove_from(left, key, target, removed);
                self.node_mut(id).left = new_left;
            }
            Ordering::Greater => {
                let right = node.right;
                let new_right = self.remove_from(right, key, target, removed);
                self.node_mut(id).right = new_right;
            }
            Ordering::Equal => {
                if target.map_or(true, |book| Rc::ptr_eq(book, &node.book)) {
                    let (replacement, book) = self.excise(id);
                    *removed = Some(book);
                    return replacement;
                }
                // A tied record may sit on either side after earlier deletions.
                let (left, right) = (node.left, node.right);
                let new_left = self.remove_from(left, key, target, removed);
                self.node_mut(id).left = new_left;
                if removed.is_none() {
                    let new_right = self.remove_from(right, key, target, removed);
                    self.node_mut(id).right = new_right;
                }
            }
        }
        Some(id)
    }

    /// Unlink node `id`, returning the root that takes its place and the book
    /// it held.
    fn excise(&mut self, id: NodeId) -> (Option<NodeId>, Rc<Book>) {
        let node = self.node(id);
        match (node.left, node.right) {
            (None, None) => (None, self.release(id).book),
            (Some(child), None) | (None, Some(child)) => (Some(child), self.release(id).book),
            (Some(_), Some(right)) => {
                let (new_right, successor) = self.detach_min(right);
                let node = self.node_mut(id);
                node.right = new_right;
                (Some(id), mem::replace(&mut node.book, successor))
            }
        }
    }

    /// Detach the leftmost node of the subtree at `id`, returning the new
    /// subtree root and the detached book.
    fn detach_min(&mut self, id: NodeId) -> (Option<NodeId>, Rc<Book>) {
        match self.node(id).left {
            Some(left) => {
                let (new_left, min) = self.detach_min(left);
                self.node_mut(id).left = new_left;
                (Some(id), min)
            }
            None => {
                let node = self.release(id);
                (node.right, node.book)
            }
        }
    }

    fn alloc(&mut self, book: Rc<Book>) -> NodeId {
        let node = Node {
            book,
            left: None,
            right: None,
        };
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Node {
        let node = self.nodes[id]
            .take()
            .unwrap_or_else(|| unreachable!("rank tree released empty slot {id}"));
        self.free.push(id);
        node
    }

    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id]
            .as_ref()
            .unwrap_or_else(|| unreachable!("rank tree link to empty slot {id}"))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id]
            .as_mut()
            .unwrap_or_else(|| unreachable!("rank tree link to empty slot {id}"))
    }
}

/// Iterator returned by [`RankTree::iter_descending`].
pub struct Descending<'a> {
    tree: &'a RankTree,
    stack: Vec<NodeId>,
}

impl Descending<'_> {
    fn push_right_spine(&mut self, mut next: Option<NodeId>) {
        while let Some(id) = next {
            self.stack.push(id);
            next = self.tree.node(id).right;
        }
    }
}

impl<'a> Iterator for Descending<'a> {
    type Item = &'a Rc<Book>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let tree = self.tree;
        let node = tree.node(id);
        self.push_right_spine(node.left);
        Some(&node.book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn book(title: &str, rating: f64, reviews: u32) -> Rc<Book> {
        Rc::new(Book::new(title, "Author", rating, reviews))
    }

    fn titles(books: &[Rc<Book>]) -> Vec<&str> {
        books.iter().map(|b| b.title.as_str()).collect()
    }

    fn tree_of(books: &[Rc<Book>]) -> RankTree {
        let mut tree = RankTree::new();
        for b in books {
            tree.insert(Rc::clone(b));
        }
        tree
    }

    #[test]
    fn traversal_is_descending_with_review_tie_break() {
        let tree = tree_of(&[
            book("B", 4.5, 100),
            book("A", 4.9, 10),
            book("C", 4.5, 300),
            book("D", 2.0, 5),
        ]);
        assert_eq!(titles(&tree.traverse_descending()), vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn equal_rating_with_fewer_reviews_goes_left() {
        let mut tree = RankTree::new();
        tree.insert(book("root", 4.0, 100));
        tree.insert(book("fewer", 4.0, 50));
        tree.insert(book("same", 4.0, 100));
        assert_eq!(tree.depth(), 3);
        assert_eq!(
            titles(&tree.traverse_descending()),
            vec!["root", "same", "fewer"]
        );
    }

    #[test]
    fn top_n_returns_min_of_n_and_len() {
        let tree = tree_of(&[book("A", 1.0, 1), book("B", 2.0, 1), book("C", 3.0, 1)]);
        assert_eq!(titles(&tree.top_n(2)), vec!["C", "B"]);
        assert_eq!(tree.top_n(10).len(), 3);
        assert!(tree.top_n(0).is_empty());
        assert!(RankTree::new().top_n(5).is_empty());
    }

    #[test]
    fn remove_leaf_single_child_and_two_children() {
        let mut tree = tree_of(&[
            book("m", 3.0, 0),
            book("d", 2.0, 0),
            book("t", 4.0, 0),
            book("a", 1.0, 0),
            book("q", 3.5, 0),
            book("z", 5.0, 0),
        ]);

        assert_eq!(tree.remove(1.0, 0).unwrap().title, "a");
        assert_eq!(titles(&tree.traverse_descending()), vec!["z", "t", "q", "m", "d"]);

        assert_eq!(tree.remove(2.0, 0).unwrap().title, "d");
        assert_eq!(tree.remove(4.0, 0).unwrap().title, "t");
        assert_eq!(titles(&tree.traverse_descending()), vec!["z", "q", "m"]);

        assert_eq!(tree.remove(3.0, 0).unwrap().title, "m");
        assert_eq!(titles(&tree.traverse_descending()), vec!["z", "q"]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn root_with_two_children_takes_successor() {
        let mut tree = tree_of(&[
            book("root", 3.0, 0),
            book("low", 1.0, 0),
            book("high", 5.0, 0),
            book("succ", 4.0, 0),
        ]);
        tree.remove(3.0, 0);
        assert_eq!(titles(&tree.traverse_descending()), vec!["high", "succ", "low"]);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn key_only_removal_may_pick_a_different_title() {
        let first = book("First", 4.0, 10);
        let second = book("Second", 4.0, 10);
        let mut tree = tree_of(&[Rc::clone(&first), Rc::clone(&second)]);

        let removed = tree.remove(4.0, 10).unwrap();
        assert!(Rc::ptr_eq(&removed, &first));
        assert_eq!(titles(&tree.traverse_descending()), vec!["Second"]);
    }

    #[test]
    fn identity_removal_picks_the_requested_record() {
        let first = book("First", 4.0, 10);
        let second = book("Second", 4.0, 10);
        let third = book("Third", 4.0, 10);
        let mut tree = tree_of(&[
            Rc::clone(&first),
            Rc::clone(&second),
            book("Higher", 4.5, 1),
            Rc::clone(&third),
        ]);

        let removed = tree.remove_book(&second).unwrap();
        assert!(Rc::ptr_eq(&removed, &second));
        let listed = tree.traverse_descending();
        let remaining = titles(&listed);
        assert_eq!(remaining.len(), 3);
        assert!(!remaining.contains(&"Second"));
    }

    #[test]
    fn identity_removal_finds_ties_moved_right() {
        // Removing "pivot" promotes its successor, which leaves the two 4.0
        // records on opposite sides of each other.
        let pivot = book("pivot", 3.0, 0);
        let tie_a = book("tie-a", 4.0, 0);
        let tie_b = book("tie-b", 4.0, 0);
        let mut tree = tree_of(&[
            Rc::clone(&pivot),
            book("low", 1.0, 0),
            Rc::clone(&tie_a),
            Rc::clone(&tie_b),
        ]);
        tree.remove_book(&pivot).unwrap();
        tree.insert(book("tie-c", 4.0, 0));

        for tie in [&tie_a, &tie_b] {
            assert!(tree.remove_book(tie).is_some());
        }
        assert_eq!(titles(&tree.traverse_descending()), vec!["tie-c", "low"]);
    }

    #[test]
    fn removing_a_missing_key_changes_nothing() {
        let mut tree = tree_of(&[book("A", 1.0, 1)]);
        assert!(tree.remove(2.0, 1).is_none());
        assert!(tree.remove_book(&book("A", 1.0, 1)).is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn released_slots_are_reused() {
        let mut tree = tree_of(&[book("A", 1.0, 1), book("B", 2.0, 1)]);
        tree.remove(1.0, 1);
        tree.insert(book("C", 3.0, 1));
        assert_eq!(tree.nodes.len(), 2);
        assert_eq!(titles(&tree.traverse_descending()), vec!["C", "B"]);
    }
}
