//! Ordered traversal
//!
//! Traversal keeps an explicit stack of pending nodes instead of recursing, so
//! its depth is bounded by memory rather than by the call stack. Each iterator
//! borrows the tree, which rules out structural mutation while it is alive.

use std::iter::FusedIterator;

use crate::tree::{NIL, OrderedTree};

/// `(key, value)` pairs in key order
pub struct Elements<'a, K, V> {
    tree: &'a OrderedTree<K, V>,
    stack: Vec<usize>,
    ascending: bool,
    remaining: usize,
}

impl<'a, K: Ord, V> Elements<'a, K, V> {
    pub(crate) fn new(tree: &'a OrderedTree<K, V>, ascending: bool) -> Self {
        let mut elements = Self {
            tree,
            stack: Vec::new(),
            ascending,
            remaining: tree.len(),
        };
        elements.descend(tree.root);
        elements
    }

    /// Push `node` and its chain of left (ascending) or right (descending)
    /// children
    fn descend(&mut self, mut node: usize) {
        while node != NIL {
            self.stack.push(node);
            let links = &self.tree.nodes[node];
            node = if self.ascending { links.left } else { links.right };
        }
    }
}

impl<K, V> Clone for Elements<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            stack: self.stack.clone(),
            ascending: self.ascending,
            remaining: self.remaining,
        }
    }
}

impl<'a, K: Ord, V> Iterator for Elements<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let links = &self.tree.nodes[node];
        let next = if self.ascending { links.right } else { links.left };
        self.descend(next);
        self.remaining = self.remaining.saturating_sub(1);
        let tree: &'a OrderedTree<K, V> = self.tree;
        Some((tree.key(node), tree.value(node)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Ord, V> ExactSizeIterator for Elements<'_, K, V> {}

impl<K: Ord, V> FusedIterator for Elements<'_, K, V> {}

/// Keys in key order
pub struct Keys<'a, K, V> {
    inner: Elements<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(inner: Elements<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K: Ord, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Ord, V> ExactSizeIterator for Keys<'_, K, V> {}

/// Values in key order
pub struct Values<'a, K, V> {
    inner: Elements<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(inner: Elements<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K: Ord, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Ord, V> ExactSizeIterator for Values<'_, K, V> {}
