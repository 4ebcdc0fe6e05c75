use crate::bounds::Bound;
use crate::intervals::{Interval, ToInterval};
use std::cmp::Ordering;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

impl Color {
    fn flip(self) -> Self {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

type Link<T> = Option<Arc<Node<T>>>;

#[derive(Clone)]
struct Node<T> {
    key: Interval,

    // All values stored for this key, in insertion order
    items: Vec<T>,

    color: Color,

    // The largest end among key and both subtrees
    max: Bound,

    left: Link<T>,
    right: Link<T>,
}

impl<T> Node<T> {
    fn new(key: Interval, items: Vec<T>) -> Self {
        Self {
            key,
            items,
            color: Color::Red,
            max: key.end_bound(),
            left: None,
            right: None,
        }
    }

    fn update_max(&mut self) {
        self.max = [
            Some(self.key.end_bound()),
            self.left.as_ref().map(|l| l.max),
            self.right.as_ref().map(|r| r.max),
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(Bound::PosInfinity);
    }
}

fn is_red<T>(link: &Link<T>) -> bool {
    link.as_ref().is_some_and(|n| n.color == Color::Red)
}

impl<T: Clone> Node<T> {
    /// Recolor a black node with two red children, so that it can receive a
    /// new child in a 2-3 tree sense.
    fn flip_colors(&mut self) {
        self.color = self.color.flip();
        for child in [&mut self.left, &mut self.right] {
            let child = Arc::make_mut(
                child.as_mut().expect("flip_colors requires two children"),
            );
            child.color = child.color.flip();
        }
    }
}

fn rotate_left<T: Clone>(mut node: Arc<Node<T>>) -> Arc<Node<T>> {
    let n = Arc::make_mut(&mut node);
    let mut x = n.right.take().expect("rotate_left requires a right child");
    let top = Arc::make_mut(&mut x);
    n.right = top.left.take();
    top.color = n.color;
    n.color = Color::Red;
    n.update_max();
    top.left = Some(node);
    top.update_max();
    x
}

fn rotate_right<T: Clone>(mut node: Arc<Node<T>>) -> Arc<Node<T>> {
    let n = Arc::make_mut(&mut node);
    let mut x = n.left.take().expect("rotate_right requires a left child");
    let top = Arc::make_mut(&mut x);
    n.left = top.right.take();
    top.color = n.color;
    n.color = Color::Red;
    n.update_max();
    top.right = Some(node);
    top.update_max();
    x
}

fn insert_node<T: Clone>(
    link: Link<T>,
    key: Interval,
    items: Vec<T>,
) -> Arc<Node<T>> {
    let Some(mut node) = link else {
        return Arc::new(Node::new(key, items));
    };
    let n = Arc::make_mut(&mut node);
    if is_red(&n.left) && is_red(&n.right) {
        n.flip_colors();
    }
    match key.cmp(&n.key) {
        Ordering::Less => n.left = Some(insert_node(n.left.take(), key, items)),
        Ordering::Equal => n.items.extend(items),
        Ordering::Greater => {
            n.right = Some(insert_node(n.right.take(), key, items))
        }
    }
    n.update_max();

    if is_red(&n.right) && !is_red(&n.left) {
        node = rotate_left(node);
    }
    if is_red(&node.left) && node.left.as_ref().is_some_and(|l| is_red(&l.left))
    {
        node = rotate_right(node);
    }
    node
}

/// A collection of values indexed by the interval of time they apply to.
/// Several values can be stored for the same interval, and intervals can
/// overlap.  Querying for all values whose interval intersects a given range
/// is done in O(log n + k).
///
/// The tree is a left-leaning red-black tree sorted on intervals, where each
/// node also knows the largest end in its subtree.  Nodes are shared between
/// trees, so that cloning is cheap and `add` returns a new tree without
/// modifying the original one.
pub struct IntervalTree<T> {
    root: Link<T>,
}

impl<T> Default for IntervalTree<T> {
    fn default() -> Self {
        Self { root: None }
    }
}

impl<T> Clone for IntervalTree<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
        }
    }
}

impl<T> IntervalTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of values stored in the tree
    pub fn len(&self) -> usize {
        self.nodes(None).map(|n| n.items.len()).sum()
    }

    /// Number of values whose interval intersects the range
    pub fn count(&self, range: impl ToInterval) -> usize {
        self.nodes(Some(range.to_interval()))
            .map(|n| n.items.len())
            .sum()
    }

    fn nodes(&self, range: Option<Interval>) -> Nodes<'_, T> {
        Nodes::new(self.root.as_deref(), range)
    }

    /// All values, sorted by interval
    pub fn iter(&self) -> Iter<'_, T> {
        self.stream(None)
    }

    /// All values whose interval intersects the range, sorted by interval
    pub fn query(&self, range: impl ToInterval) -> Iter<'_, T> {
        self.stream(Some(&range.to_interval()))
    }

    /// Same as query, but the range is optional
    pub fn stream(&self, range: Option<&Interval>) -> Iter<'_, T> {
        Iter {
            nodes: self.nodes(range.copied()),
            current: None,
        }
    }

    /// The interval for each value that intersects the range (an interval is
    /// repeated when it has several values).
    pub fn keys(&self, range: Option<&Interval>) -> Vec<Interval> {
        self.stream(range).map(|(k, _)| *k).collect()
    }

    pub fn values(&self, range: Option<&Interval>) -> Vec<&T> {
        self.stream(range).map(|(_, v)| v).collect()
    }

    /// The smallest interval containing all the keys
    pub fn span(&self) -> Option<Interval> {
        let root = self.root.as_deref()?;
        let mut first = root;
        while let Some(left) = first.left.as_deref() {
            first = left;
        }
        Some(Interval::from_bounds(first.key.start_bound(), root.max))
    }

    /// Transform each value.  The new tree has the same shape
    pub fn map<U, F>(&self, mut transform: F) -> IntervalTree<U>
    where
        F: FnMut(&T) -> U,
    {
        IntervalTree {
            root: self
                .root
                .as_deref()
                .map(|n| Arc::new(map_node(n, &mut transform))),
        }
    }
}

fn map_node<T, U, F>(node: &Node<T>, transform: &mut F) -> Node<U>
where
    F: FnMut(&T) -> U,
{
    //  In-order, so that transform sees values sorted by interval
    let left = node
        .left
        .as_deref()
        .map(|l| Arc::new(map_node(l, transform)));
    let items = node.items.iter().map(|v| transform(v)).collect();
    let right = node
        .right
        .as_deref()
        .map(|r| Arc::new(map_node(r, transform)));
    Node {
        key: node.key,
        items,
        color: node.color,
        max: node.max,
        left,
        right,
    }
}

impl<T: Clone> IntervalTree<T> {
    /// Store values for the key.  If the key already exists (same start and
    /// same end), the values are appended to the existing ones.
    pub fn insert(&mut self, key: impl ToInterval, values: Vec<T>) {
        let mut root = insert_node(self.root.take(), key.to_interval(), values);
        Arc::make_mut(&mut root).color = Color::Black;
        self.root = Some(root);
    }

    /// A new tree, with one more value.  Self is unchanged
    pub fn add(&self, key: impl ToInterval, value: T) -> Self {
        let mut tree = self.clone();
        tree.insert(key, vec![value]);
        tree
    }

    /// Build a tree from values, given a function that returns the intervals
    /// each value applies to.  A value is stored once per interval.
    pub fn import<V, F, I, K>(values: V, mut keys: F) -> Self
    where
        V: IntoIterator<Item = T>,
        F: FnMut(&T) -> I,
        I: IntoIterator<Item = K>,
        K: ToInterval,
    {
        let mut tree = Self::new();
        let mut count = 0_usize;
        for value in values {
            for key in keys(&value) {
                tree.insert(key, vec![value.clone()]);
                count += 1;
            }
        }
        log::debug!("imported {count} values in interval tree");
        tree
    }

    /// A new tree with only the values for which the predicate is true
    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&T, &Interval) -> bool,
    {
        let mut tree = Self::new();
        for node in self.nodes(None) {
            let items: Vec<T> = node
                .items
                .iter()
                .filter(|v| predicate(v, &node.key))
                .cloned()
                .collect();
            if !items.is_empty() {
                tree.insert(node.key, items);
            }
        }
        tree
    }

    /// A new tree with only the values whose interval intersects the range.
    /// Intervals are not truncated.
    pub fn slice(&self, range: impl ToInterval) -> Self {
        let mut tree = Self::new();
        for node in self.nodes(Some(range.to_interval())) {
            tree.insert(node.key, node.items.clone());
        }
        tree
    }
}

impl<T: Clone, K: ToInterval> FromIterator<(K, T)> for IntervalTree<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Clone, K: ToInterval> Extend<(K, T)> for IntervalTree<T> {
    fn extend<I: IntoIterator<Item = (K, T)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, vec![value]);
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for IntervalTree<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a IntervalTree<T> {
    type Item = (&'a Interval, &'a T);
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Depth-first, left-to-right traversal of the nodes whose key intersects
/// the range.  Subtrees that cannot intersect are never visited.
struct Nodes<'a, T> {
    // Nodes whose left subtree has been visited already
    stack: Vec<&'a Node<T>>,
    range: Option<Interval>,
}

impl<'a, T> Nodes<'a, T> {
    fn new(root: Option<&'a Node<T>>, range: Option<Interval>) -> Self {
        let mut nodes = Self {
            stack: Vec::new(),
            range,
        };
        nodes.descend(root);
        nodes
    }

    /// Push the left spine of the subtree
    fn descend(&mut self, mut link: Option<&'a Node<T>>) {
        while let Some(node) = link {
            if self.range.is_some_and(|r| r.start_bound() > node.max) {
                // Everything in this subtree ends before the range
                break;
            }
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a, T> Iterator for Nodes<'a, T> {
    type Item = &'a Node<T>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            // Keys in the right subtree start no earlier than this one
            if !self
                .range
                .is_some_and(|r| r.end_bound() < node.key.start_bound())
            {
                self.descend(node.right.as_deref());
            }
            if self.range.map_or(true, |r| node.key.intersects(&r)) {
                return Some(node);
            }
        }
        None
    }
}

/// Iterator over the values of a tree, with their interval
pub struct Iter<'a, T> {
    nodes: Nodes<'a, T>,
    current: Option<(&'a Interval, std::slice::Iter<'a, T>)>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (&'a Interval, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, items)) = &mut self.current {
                if let Some(value) = items.next() {
                    return Some((*key, value));
                }
            }
            let node = self.nodes.next()?;
            self.current = Some((&node.key, node.items.iter()));
        }
    }
}
