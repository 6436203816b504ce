//! Red-black tree storage and rebalancing
//!
//! Nodes live in an arena (`Vec<Node>`) and refer to each other by index.
//! Slot [`NIL`] is the sentinel: it is always BLACK, its children point back to
//! itself, and every "is this a leaf" check is an index comparison against it.
//! Deletion may temporarily store a parent link in the sentinel; it is reset
//! before the operation returns.

use std::borrow::Borrow;
use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Index;

use crate::error::{VellumError, VellumResult};
use crate::iter::{Elements, Keys, Values};

/// Index of the sentinel node
pub(crate) const NIL: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

#[derive(Debug, Clone)]
pub(crate) struct Node<K, V> {
    /// `None` only for the sentinel and for freed slots
    pub(crate) entry: Option<(K, V)>,
    pub(crate) color: Color,
    pub(crate) left: usize,
    pub(crate) right: usize,
    pub(crate) parent: usize,
}

impl<K, V> Node<K, V> {
    fn sentinel() -> Self {
        Self {
            entry: None,
            color: Color::Black,
            left: NIL,
            right: NIL,
            parent: NIL,
        }
    }
}

/// Result of walking down from the root looking for a key
enum Lookup {
    Found(usize),
    Vacant { parent: usize, ordering: Ordering },
}

/// Red-black tree keyed by an ordered key
///
/// # Invariants
/// 1. The root is BLACK.
/// 2. No RED node has a RED child.
/// 3. Every path from the root to the sentinel crosses the same number of
///    BLACK nodes.
/// 4. In-order traversal yields keys in strictly ascending order.
///
/// # Concurrency
/// The tree is not thread-safe for mutation. Lookups record the found node in
/// an interior cache, so the type is `Send` but not `Sync`; callers sharing a
/// tree across threads must wrap it in their own lock.
#[derive(Clone)]
pub struct OrderedTree<K, V> {
    pub(crate) nodes: Vec<Node<K, V>>,
    free: Vec<usize>,
    pub(crate) root: usize,
    count: usize,
    /// Node found by the most recent successful lookup
    last_found: Cell<usize>,
}

impl<K: Ord, V> OrderedTree<K, V> {
    /// Create an empty tree
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::sentinel()],
            free: Vec::new(),
            root: NIL,
            count: 0,
            last_found: Cell::new(NIL),
        }
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Insert a new entry
    ///
    /// # Errors
    /// Returns [`VellumError::DuplicateKey`] if an equal key is already
    /// present. The tree is left untouched in that case, the first value is
    /// retained.
    pub fn insert(&mut self, key: K, value: V) -> VellumResult<()> {
        match self.locate(&key) {
            Lookup::Found(_) => Err(VellumError::DuplicateKey),
            Lookup::Vacant { parent, ordering } => {
                self.attach(parent, ordering, key, value);
                Ok(())
            }
        }
    }

    /// Insert or overwrite an entry (indexer-set form)
    ///
    /// If an equal key exists its value is replaced in place without any
    /// structural change and the previous value is returned.
    pub fn upsert(&mut self, key: K, value: V) -> Option<V> {
        match self.locate(&key) {
            Lookup::Found(node) => match &mut self.nodes[node].entry {
                Some((_, slot)) => Some(std::mem::replace(slot, value)),
                None => unreachable!("lookup returned an empty slot"),
            },
            Lookup::Vacant { parent, ordering } => {
                self.attach(parent, ordering, key, value);
                None
            }
        }
    }

    /// Look up the value stored under `key`
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.find_node(key);
        if node == NIL {
            return None;
        }
        self.last_found.set(node);
        Some(self.value(node))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.find_node(key);
        if node == NIL {
            return None;
        }
        self.last_found.set(node);
        match &mut self.nodes[node].entry {
            Some((_, value)) => Some(value),
            None => None,
        }
    }

    /// Look up the value stored under `key`, failing if it is absent
    pub fn get_data<Q>(&self, key: &Q) -> VellumResult<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).ok_or(VellumError::KeyNotFound)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Remove the entry stored under `key`
    ///
    /// Absent keys are a no-op. When the immediately preceding lookup found
    /// this key, the cached node is reused instead of walking the tree again.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let cached = self.last_found.get();
        let node = if cached != NIL
            && self.nodes[cached].entry.is_some()
            && key.cmp(self.key(cached).borrow()) == Ordering::Equal
        {
            cached
        } else {
            self.find_node(key)
        };
        if node == NIL {
            return None;
        }
        let (_, value) = self.delete_node(node);
        Some(value)
    }

    pub fn min_key(&self) -> VellumResult<&K> {
        self.min_node().map(|node| self.key(node))
    }

    pub fn max_key(&self) -> VellumResult<&K> {
        self.max_node().map(|node| self.key(node))
    }

    pub fn min_value(&self) -> VellumResult<&V> {
        self.min_node().map(|node| self.value(node))
    }

    pub fn max_value(&self) -> VellumResult<&V> {
        self.max_node().map(|node| self.value(node))
    }

    /// Remove and return the smallest entry
    ///
    /// # Errors
    /// Returns [`VellumError::EmptyTree`] on an empty tree, like [`Self::min_key`].
    pub fn remove_min(&mut self) -> VellumResult<(K, V)> {
        let node = self.min_node()?;
        Ok(self.delete_node(node))
    }

    /// Remove and return the largest entry
    ///
    /// # Errors
    /// Returns [`VellumError::EmptyTree`] on an empty tree, like [`Self::max_key`].
    pub fn remove_max(&mut self) -> VellumResult<(K, V)> {
        let node = self.max_node()?;
        Ok(self.delete_node(node))
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[NIL] = Node::sentinel();
        self.free.clear();
        self.root = NIL;
        self.count = 0;
        self.last_found.set(NIL);
    }

    /// Keys in ascending or descending order
    pub fn keys(&self, ascending: bool) -> Keys<'_, K, V> {
        Keys::new(self.elements(ascending))
    }

    /// Values in ascending or descending key order
    pub fn values(&self, ascending: bool) -> Values<'_, K, V> {
        Values::new(self.elements(ascending))
    }

    /// `(key, value)` pairs in ascending or descending key order
    pub fn elements(&self, ascending: bool) -> Elements<'_, K, V> {
        Elements::new(self, ascending)
    }

    /// `(key, value)` pairs in ascending key order
    pub fn iter(&self) -> Elements<'_, K, V> {
        self.elements(true)
    }

    /// Number of nodes on the longest root-to-leaf path
    pub fn height(&self) -> usize {
        let mut max = 0;
        let mut stack = Vec::new();
        if self.root != NIL {
            stack.push((self.root, 1));
        }
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            for child in [self.nodes[node].left, self.nodes[node].right] {
                if child != NIL {
                    stack.push((child, depth + 1));
                }
            }
        }
        max
    }

    /// Check every red-black invariant and return the black height
    ///
    /// # Errors
    /// Returns [`VellumError::Structural`] describing the first violated
    /// invariant.
    pub fn validate(&self) -> VellumResult<usize> {
        let sentinel = &self.nodes[NIL];
        if sentinel.color != Color::Black || sentinel.left != NIL || sentinel.right != NIL {
            return Err(VellumError::structural("sentinel node was modified"));
        }
        if self.root == NIL {
            return if self.count == 0 {
                Ok(0)
            } else {
                Err(VellumError::structural("empty root with non-zero count"))
            };
        }
        if self.nodes[self.root].color != Color::Black {
            return Err(VellumError::structural("root is red"));
        }
        if self.nodes[self.root].parent != NIL {
            return Err(VellumError::structural("root has a parent"));
        }

        let mut black_height = None;
        let mut visited = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((node, blacks_above)) = stack.pop() {
            visited += 1;
            let current = &self.nodes[node];
            let blacks = blacks_above + usize::from(current.color == Color::Black);
            for child in [current.left, current.right] {
                if child == NIL {
                    match black_height {
                        None => black_height = Some(blacks),
                        Some(expected) if expected != blacks => {
                            return Err(VellumError::structural(format!(
                                "black height mismatch: {} vs {}",
                                expected, blacks
                            )));
                        }
                        Some(_) => {}
                    }
                    continue;
                }
                if self.nodes[child].parent != node {
                    return Err(VellumError::structural("broken parent link"));
                }
                if current.color == Color::Red && self.nodes[child].color == Color::Red {
                    return Err(VellumError::structural("red node with red child"));
                }
                stack.push((child, blacks));
            }
        }
        if visited != self.count {
            return Err(VellumError::structural(format!(
                "count is {} but {} nodes are reachable",
                self.count, visited
            )));
        }

        let mut keys = self.keys(true);
        if let Some(mut previous) = keys.next() {
            for key in keys {
                if previous >= key {
                    return Err(VellumError::structural("keys out of order"));
                }
                previous = key;
            }
        }

        Ok(black_height.unwrap_or(0))
    }

    pub(crate) fn key(&self, node: usize) -> &K {
        match &self.nodes[node].entry {
            Some((key, _)) => key,
            None => unreachable!("sentinel or freed slot has no key"),
        }
    }

    pub(crate) fn value(&self, node: usize) -> &V {
        match &self.nodes[node].entry {
            Some((_, value)) => value,
            None => unreachable!("sentinel or freed slot has no value"),
        }
    }

    fn locate(&self, key: &K) -> Lookup {
        let mut parent = NIL;
        let mut ordering = Ordering::Equal;
        let mut current = self.root;
        while current != NIL {
            ordering = key.cmp(self.key(current));
            match ordering {
                Ordering::Equal => return Lookup::Found(current),
                Ordering::Less => {
                    parent = current;
                    current = self.nodes[current].left;
                }
                Ordering::Greater => {
                    parent = current;
                    current = self.nodes[current].right;
                }
            }
        }
        Lookup::Vacant { parent, ordering }
    }

    fn find_node<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while current != NIL {
            match key.cmp(self.key(current).borrow()) {
                Ordering::Equal => return current,
                Ordering::Less => current = self.nodes[current].left,
                Ordering::Greater => current = self.nodes[current].right,
            }
        }
        NIL
    }

    fn min_node(&self) -> VellumResult<usize> {
        if self.root == NIL {
            return Err(VellumError::EmptyTree);
        }
        Ok(self.leftmost(self.root))
    }

    fn max_node(&self) -> VellumResult<usize> {
        if self.root == NIL {
            return Err(VellumError::EmptyTree);
        }
        let mut node = self.root;
        while self.nodes[node].right != NIL {
            node = self.nodes[node].right;
        }
        Ok(node)
    }

    fn leftmost(&self, mut node: usize) -> usize {
        while self.nodes[node].left != NIL {
            node = self.nodes[node].left;
        }
        node
    }

    fn allocate(&mut self, key: K, value: V, parent: usize) -> usize {
        let node = Node {
            entry: Some((key, value)),
            color: Color::Red,
            left: NIL,
            right: NIL,
            parent,
        };
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, slot: usize) {
        self.nodes[slot] = Node::sentinel();
        self.free.push(slot);
    }

    /// Hang a new RED leaf under `parent` and restore the invariants
    fn attach(&mut self, parent: usize, ordering: Ordering, key: K, value: V) {
        let node = self.allocate(key, value, parent);
        if parent == NIL {
            self.root = node;
        } else if ordering == Ordering::Less {
            self.nodes[parent].left = node;
        } else {
            self.nodes[parent].right = node;
        }
        self.count += 1;
        self.last_found.set(NIL);
        self.insert_fixup(node);
    }

    fn color(&self, node: usize) -> Color {
        self.nodes[node].color
    }

    fn parent(&self, node: usize) -> usize {
        self.nodes[node].parent
    }

    fn rotate_left(&mut self, x: usize) {
        let y = self.nodes[x].right;
        let y_left = self.nodes[y].left;
        self.nodes[x].right = y_left;
        if y_left != NIL {
            self.nodes[y_left].parent = x;
        }
        let x_parent = self.nodes[x].parent;
        self.nodes[y].parent = x_parent;
        if x_parent == NIL {
            self.root = y;
        } else if x == self.nodes[x_parent].left {
            self.nodes[x_parent].left = y;
        } else {
            self.nodes[x_parent].right = y;
        }
        self.nodes[y].left = x;
        self.nodes[x].parent = y;
    }

    fn rotate_right(&mut self, x: usize) {
        let y = self.nodes[x].left;
        let y_right = self.nodes[y].right;
        self.nodes[x].left = y_right;
        if y_right != NIL {
            self.nodes[y_right].parent = x;
        }
        let x_parent = self.nodes[x].parent;
        self.nodes[y].parent = x_parent;
        if x_parent == NIL {
            self.root = y;
        } else if x == self.nodes[x_parent].right {
            self.nodes[x_parent].right = y;
        } else {
            self.nodes[x_parent].left = y;
        }
        self.nodes[y].right = x;
        self.nodes[x].parent = y;
    }

    fn insert_fixup(&mut self, mut z: usize) {
        while self.color(self.parent(z)) == Color::Red {
            let parent = self.parent(z);
            let grandparent = self.parent(parent);
            if parent == self.nodes[grandparent].left {
                let uncle = self.nodes[grandparent].right;
                if self.color(uncle) == Color::Red {
                    self.nodes[parent].color = Color::Black;
                    self.nodes[uncle].color = Color::Black;
                    self.nodes[grandparent].color = Color::Red;
                    z = grandparent;
                } else {
                    if z == self.nodes[parent].right {
                        z = parent;
                        self.rotate_left(z);
                    }
                    let parent = self.parent(z);
                    let grandparent = self.parent(parent);
                    self.nodes[parent].color = Color::Black;
                    self.nodes[grandparent].color = Color::Red;
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = self.nodes[grandparent].left;
                if self.color(uncle) == Color::Red {
                    self.nodes[parent].color = Color::Black;
                    self.nodes[uncle].color = Color::Black;
                    self.nodes[grandparent].color = Color::Red;
                    z = grandparent;
                } else {
                    if z == self.nodes[parent].left {
                        z = parent;
                        self.rotate_right(z);
                    }
                    let parent = self.parent(z);
                    let grandparent = self.parent(parent);
                    self.nodes[parent].color = Color::Black;
                    self.nodes[grandparent].color = Color::Red;
                    self.rotate_left(grandparent);
                }
            }
        }
        let root = self.root;
        self.nodes[root].color = Color::Black;
    }

    /// Unlink `z` and return its entry
    ///
    /// A node with two children is not unlinked itself: its in-order successor
    /// is spliced out instead and the successor's entry moves into `z`.
    fn delete_node(&mut self, z: usize) -> (K, V) {
        let spliced = if self.nodes[z].left == NIL || self.nodes[z].right == NIL {
            z
        } else {
            self.leftmost(self.nodes[z].right)
        };
        let child = if self.nodes[spliced].left != NIL {
            self.nodes[spliced].left
        } else {
            self.nodes[spliced].right
        };

        let spliced_parent = self.parent(spliced);
        self.nodes[child].parent = spliced_parent;
        if spliced_parent == NIL {
            self.root = child;
        } else if spliced == self.nodes[spliced_parent].left {
            self.nodes[spliced_parent].left = child;
        } else {
            self.nodes[spliced_parent].right = child;
        }

        let removed_color = self.color(spliced);
        let spliced_entry = self.nodes[spliced].entry.take();
        let removed = if spliced != z {
            std::mem::replace(&mut self.nodes[z].entry, spliced_entry)
        } else {
            spliced_entry
        };

        if removed_color == Color::Black {
            self.delete_fixup(child);
        }
        self.nodes[NIL].parent = NIL;
        self.release(spliced);
        self.count -= 1;
        self.last_found.set(NIL);

        match removed {
            Some(entry) => entry,
            None => unreachable!("deleted node had no entry"),
        }
    }

    fn delete_fixup(&mut self, mut x: usize) {
        while x != self.root && self.color(x) == Color::Black {
            let parent = self.parent(x);
            if x == self.nodes[parent].left {
                let mut sibling = self.nodes[parent].right;
                if self.color(sibling) == Color::Red {
                    self.nodes[sibling].color = Color::Black;
                    self.nodes[parent].color = Color::Red;
                    self.rotate_left(parent);
                    sibling = self.nodes[self.parent(x)].right;
                }
                let near = self.nodes[sibling].left;
                let far = self.nodes[sibling].right;
                if self.color(near) == Color::Black && self.color(far) == Color::Black {
                    self.nodes[sibling].color = Color::Red;
                    x = self.parent(x);
                } else {
                    if self.color(far) == Color::Black {
                        self.nodes[near].color = Color::Black;
                        self.nodes[sibling].color = Color::Red;
                        self.rotate_right(sibling);
                        sibling = self.nodes[self.parent(x)].right;
                    }
                    let parent = self.parent(x);
                    self.nodes[sibling].color = self.color(parent);
                    self.nodes[parent].color = Color::Black;
                    let far = self.nodes[sibling].right;
                    self.nodes[far].color = Color::Black;
                    self.rotate_left(parent);
                    x = self.root;
                }
            } else {
                let mut sibling = self.nodes[parent].left;
                if self.color(sibling) == Color::Red {
                    self.nodes[sibling].color = Color::Black;
                    self.nodes[parent].color = Color::Red;
                    self.rotate_right(parent);
                    sibling = self.nodes[self.parent(x)].left;
                }
                let near = self.nodes[sibling].right;
                let far = self.nodes[sibling].left;
                if self.color(near) == Color::Black && self.color(far) == Color::Black {
                    self.nodes[sibling].color = Color::Red;
                    x = self.parent(x);
                } else {
                    if self.color(far) == Color::Black {
                        self.nodes[near].color = Color::Black;
                        self.nodes[sibling].color = Color::Red;
                        self.rotate_left(sibling);
                        sibling = self.nodes[self.parent(x)].left;
                    }
                    let parent = self.parent(x);
                    self.nodes[sibling].color = self.color(parent);
                    self.nodes[parent].color = Color::Black;
                    let far = self.nodes[sibling].left;
                    self.nodes[far].color = Color::Black;
                    self.rotate_right(parent);
                    x = self.root;
                }
            }
        }
        self.nodes[x].color = Color::Black;
    }
}

impl<K: Ord, V> Default for OrderedTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, Q, V> Index<&Q> for OrderedTree<K, V>
where
    K: Ord + Borrow<Q>,
    Q: Ord + ?Sized,
{
    type Output = V;

    /// # Panics
    /// Panics if the key is not present, like `BTreeMap`.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not found in OrderedTree"),
        }
    }
}

impl<K: Ord, V> Extend<(K, V)> for OrderedTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.upsert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a OrderedTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Elements<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
