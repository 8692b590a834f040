use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;
use std::mem;

use super::compare::{Comparator, Natural};

/// Index standing for an absent node, both for leaves and for an empty tree.
const NIL: usize = usize::MAX;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Colour {
    Black,
    Red,
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Colour::*;
        match self {
            Black => write!(f, "black"),
            Red => write!(f, "red"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Clone)]
struct Node<K, V> {
    colour: Colour,
    parent: usize,
    left: usize,
    right: usize,
    key: K,
    value: V,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V, parent: usize) -> Node<K, V> {
        Node {
            colour: Colour::Red,
            parent,
            left: NIL,
            right: NIL,
            key,
            value,
        }
    }

    #[inline]
    fn child(&self, side: Side) -> usize {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    fn set_child(&mut self, side: Side, node: usize) {
        match side {
            Side::Left => self.left = node,
            Side::Right => self.right = node,
        }
    }
}

#[derive(Clone)]
enum Slot<K, V> {
    Occupied(Node<K, V>),
    /// Holds the next vacant slot of the free list.
    Vacant(usize),
}

enum Search {
    Found(usize),
    Vacant { parent: usize, side: Side },
}

#[derive(Debug, Fail)]
pub enum MapError {
    #[fail(
        display = "map was modified since the cursor was taken (revision {}, now {})",
        expected, found
    )]
    ConcurrentModification { expected: u64, found: u64 },
    #[fail(display = "cursor does not point to a live entry")]
    InvalidCursor,
}

/// Detached position inside an `OrderedMap`.
///
/// A cursor does not borrow the map. It is only valid until the next
/// structural change (insertion of a new key, removal, clear); after that
/// every method taking it returns `MapError::ConcurrentModification`.
///
/// A cursor belongs to the map that produced it. Handing it to another map
/// is not detected when both maps happen to share a revision, and then
/// resolves to whatever entry that map keeps in the same slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Cursor {
    node: usize,
    mod_count: u64,
}

/// Ordered map backed by a red-black tree.
///
/// Nodes live in an arena and reference each other by index, so the parent
/// back links never own anything. Removed nodes give their slot back to a
/// free list which later insertions reuse.
#[derive(Clone)]
pub struct OrderedMap<K, V, C = Natural> {
    slots: Vec<Slot<K, V>>,
    free: usize,
    root: usize,
    len: usize,
    mod_count: u64,
    comparator: C,
}

impl<K, V> OrderedMap<K, V, Natural>
where
    K: Ord,
{
    pub fn new() -> OrderedMap<K, V, Natural> {
        OrderedMap::with_comparator(Natural)
    }
}

impl<K, V, C> Default for OrderedMap<K, V, C>
where
    C: Comparator<K> + Default,
{
    fn default() -> Self {
        OrderedMap::with_comparator(C::default())
    }
}

impl<K, V, C> OrderedMap<K, V, C>
where
    C: Comparator<K>,
{
    pub fn with_comparator(comparator: C) -> OrderedMap<K, V, C> {
        OrderedMap {
            slots: Vec::new(),
            free: NIL,
            root: NIL,
            len: 0,
            mod_count: 0,
            comparator,
        }
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        match self.search(key) {
            Search::Found(idx) => Some(&self.node(idx).value),
            Search::Vacant { .. } => None,
        }
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.search(key) {
            Search::Found(idx) => Some(&mut self.node_mut(idx).value),
            Search::Vacant { .. } => None,
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Inserts `value` under `key`, returning the value it replaced.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        match self.search(&key) {
            Search::Found(idx) => Some(mem::replace(&mut self.node_mut(idx).value, value)),
            Search::Vacant { parent, side } => {
                self.attach(key, value, parent, side);
                None
            }
        }
    }

    /// Inserts `value` only if `key` is missing. An existing value is left
    /// untouched and returned.
    pub fn put_if_absent(&mut self, key: K, value: V) -> Option<&V> {
        match self.search(&key) {
            Search::Found(idx) => Some(&self.node(idx).value),
            Search::Vacant { parent, side } => {
                self.attach(key, value, parent, side);
                None
            }
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        match self.search(key) {
            Search::Found(idx) => Some(self.delete_node(idx).1),
            Search::Vacant { .. } => None,
        }
    }

    pub fn clear(&mut self) {
        trace!("clear {} entries", self.len);
        self.slots.clear();
        self.free = NIL;
        self.root = NIL;
        self.len = 0;
        self.mod_count += 1;
    }

    pub fn first_entry(&self) -> Option<(&K, &V)> {
        self.entry(self.extreme(self.root, Side::Left))
    }

    pub fn last_entry(&self) -> Option<(&K, &V)> {
        self.entry(self.extreme(self.root, Side::Right))
    }

    /// Entry with the least key greater than or equal to `key`.
    pub fn ceiling_entry(&self, key: &K) -> Option<(&K, &V)> {
        self.entry(self.bound(key, Side::Right, true))
    }

    /// Entry with the greatest key less than or equal to `key`.
    pub fn floor_entry(&self, key: &K) -> Option<(&K, &V)> {
        self.entry(self.bound(key, Side::Left, true))
    }

    /// Entry with the least key strictly greater than `key`.
    pub fn higher_entry(&self, key: &K) -> Option<(&K, &V)> {
        self.entry(self.bound(key, Side::Right, false))
    }

    /// Entry with the greatest key strictly less than `key`.
    pub fn lower_entry(&self, key: &K) -> Option<(&K, &V)> {
        self.entry(self.bound(key, Side::Left, false))
    }

    pub fn first(&self) -> Option<Cursor> {
        self.cursor(self.extreme(self.root, Side::Left))
    }

    pub fn last(&self) -> Option<Cursor> {
        self.cursor(self.extreme(self.root, Side::Right))
    }

    /// Cursor on the entry stored under `key`.
    pub fn find(&self, key: &K) -> Option<Cursor> {
        match self.search(key) {
            Search::Found(idx) => self.cursor(idx),
            Search::Vacant { .. } => None,
        }
    }

    /// Next entry in key order, `None` past the last one.
    pub fn successor(&self, cursor: Cursor) -> Result<Option<Cursor>, MapError> {
        let idx = self.validate(cursor)?;
        Ok(self.cursor(self.step(idx, Side::Right)))
    }

    /// Previous entry in key order, `None` before the first one.
    pub fn predecessor(&self, cursor: Cursor) -> Result<Option<Cursor>, MapError> {
        let idx = self.validate(cursor)?;
        Ok(self.cursor(self.step(idx, Side::Left)))
    }

    pub fn entry_at(&self, cursor: Cursor) -> Result<(&K, &V), MapError> {
        let idx = self.validate(cursor)?;
        let node = self.node(idx);
        Ok((&node.key, &node.value))
    }

    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter {
            map: self,
            front: self.extreme(self.root, Side::Left),
            back: self.extreme(self.root, Side::Right),
            remaining: self.len,
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V, C> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V, C> {
        Values { inner: self.iter() }
    }

    pub fn dump_as_dot(&self) -> String
    where
        K: fmt::Debug,
    {
        let mut lines = Vec::new();
        lines.push(String::from("graph Tree {"));

        let mut definitions = Vec::new();
        let mut links = Vec::new();
        let mut idx = self.extreme(self.root, Side::Left);
        while idx != NIL {
            let node = self.node(idx);
            definitions.push(format!(
                "    Node{} [label=\"{:?}\", color={}]",
                idx, node.key, node.colour
            ));
            if node.left != NIL {
                links.push(format!("    Node{} -- Node{}", idx, node.left));
            } else {
                definitions.push(format!("    NullL{} [shape=point]", idx));
                links.push(format!("    Node{0} -- NullL{0}", idx));
            }
            if node.right != NIL {
                links.push(format!("    Node{} -- Node{}", idx, node.right));
            } else {
                definitions.push(format!("    NullR{} [shape=point]", idx));
                links.push(format!("    Node{0} -- NullR{0}", idx));
            }
            idx = self.step(idx, Side::Right);
        }

        lines.append(&mut definitions);
        lines.push(String::new());
        lines.append(&mut links);

        lines.push(String::from("}"));
        lines.push(String::new());
        lines.join("\n")
    }

    fn search(&self, key: &K) -> Search {
        let mut parent = NIL;
        let mut side = Side::Left;
        let mut cur = self.root;
        while cur != NIL {
            let node = self.node(cur);
            side = match self.comparator.compare(key, &node.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Search::Found(cur),
            };
            parent = cur;
            cur = node.child(side);
        }
        Search::Vacant { parent, side }
    }

    /// Closest entry to `key` on `side`: the ceiling for `Right`, the floor
    /// for `Left`. An equal key only matches when `inclusive`.
    fn bound(&self, key: &K, side: Side, inclusive: bool) -> usize {
        let mut res = NIL;
        let mut cur = self.root;
        while cur != NIL {
            let node = self.node(cur);
            let toward = match self.comparator.compare(key, &node.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal if inclusive => return cur,
                Ordering::Equal => side,
            };
            if toward != side {
                res = cur;
            }
            cur = node.child(toward);
        }
        res
    }

    fn attach(&mut self, key: K, value: V, parent: usize, side: Side) -> usize {
        let idx = self.alloc(Node::new(key, value, parent));
        trace!("insert node {} under {} ({:?})", idx, parent, side);
        if parent == NIL {
            self.root = idx;
        } else {
            self.node_mut(parent).set_child(side, idx);
        }
        self.len += 1;
        self.mod_count += 1;
        self.fix_after_insertion(idx);
        idx
    }

    fn fix_after_insertion(&mut self, mut node: usize) {
        self.set_colour(node, Colour::Red);
        while node != self.root && self.colour_of(self.parent_of(node)) == Colour::Red {
            // a red parent is never the root, so the grand parent exists
            let parent = self.parent_of(node);
            let grand_parent = self.parent_of(parent);
            let side = self.side_of(parent);
            let uncle = self.child_of(grand_parent, side.opposite());

            if self.colour_of(uncle) == Colour::Red {
                trace!("balance red uncle: {}", node);
                self.set_colour(parent, Colour::Black);
                self.set_colour(uncle, Colour::Black);
                self.set_colour(grand_parent, Colour::Red);
                node = grand_parent;
            } else {
                trace!("balance black uncle: {}", node);
                if node == self.child_of(parent, side.opposite()) {
                    node = parent;
                    self.rotate(node, side);
                }
                let parent = self.parent_of(node);
                let grand_parent = self.parent_of(parent);
                self.set_colour(parent, Colour::Black);
                self.set_colour(grand_parent, Colour::Red);
                self.rotate(grand_parent, side.opposite());
            }
        }
        let root = self.root;
        self.set_colour(root, Colour::Black);
    }

    fn delete_node(&mut self, mut node: usize) -> (K, V) {
        trace!("delete node {}", node);
        self.len -= 1;
        self.mod_count += 1;

        if self.child_of(node, Side::Left) != NIL && self.child_of(node, Side::Right) != NIL {
            let successor = self.step(node, Side::Right);
            self.swap_entries(node, successor);
            node = successor;
        }

        let replacement = match self.child_of(node, Side::Left) {
            NIL => self.child_of(node, Side::Right),
            left => left,
        };
        let parent = self.parent_of(node);

        if replacement != NIL {
            self.node_mut(replacement).parent = parent;
            if parent == NIL {
                self.root = replacement;
            } else {
                let side = self.side_of(node);
                self.node_mut(parent).set_child(side, replacement);
            }
            if self.colour_of(node) == Colour::Black {
                self.fix_after_deletion(replacement);
            }
        } else if parent == NIL {
            self.root = NIL;
        } else {
            // the node stands in for its absent child while fixing up
            if self.colour_of(node) == Colour::Black {
                self.fix_after_deletion(node);
            }
            let parent = self.parent_of(node);
            if parent != NIL {
                let side = self.side_of(node);
                self.node_mut(parent).set_child(side, NIL);
            }
        }

        self.release(node)
    }

    fn fix_after_deletion(&mut self, mut node: usize) {
        while node != self.root && self.colour_of(node) == Colour::Black {
            let side = self.side_of(node);
            let far = side.opposite();
            let mut sibling = self.child_of(self.parent_of(node), far);

            if self.colour_of(sibling) == Colour::Red {
                trace!("double black with red sibling: {}", node);
                let parent = self.parent_of(node);
                self.set_colour(sibling, Colour::Black);
                self.set_colour(parent, Colour::Red);
                self.rotate(parent, side);
                sibling = self.child_of(self.parent_of(node), far);
            }

            if self.colour_of(self.child_of(sibling, side)) == Colour::Black
                && self.colour_of(self.child_of(sibling, far)) == Colour::Black
            {
                trace!("double black with black nephews: {}", node);
                self.set_colour(sibling, Colour::Red);
                node = self.parent_of(node);
            } else {
                trace!("double black with red nephew: {}", node);
                if self.colour_of(self.child_of(sibling, far)) == Colour::Black {
                    let near = self.child_of(sibling, side);
                    self.set_colour(near, Colour::Black);
                    self.set_colour(sibling, Colour::Red);
                    self.rotate(sibling, far);
                    sibling = self.child_of(self.parent_of(node), far);
                }
                let parent = self.parent_of(node);
                let parent_colour = self.colour_of(parent);
                self.set_colour(sibling, parent_colour);
                self.set_colour(parent, Colour::Black);
                let far_nephew = self.child_of(sibling, far);
                self.set_colour(far_nephew, Colour::Black);
                self.rotate(parent, side);
                node = self.root;
            }
        }
        self.set_colour(node, Colour::Black);
    }

    /// Rotates `node` down toward `side`; its child on the other side takes
    /// its place.
    fn rotate(&mut self, node: usize, side: Side) {
        trace!("rotate {:?}: {}", side, node);
        let other = side.opposite();
        let pivot = self.child_of(node, other);
        let inner = self.child_of(pivot, side);

        self.node_mut(node).set_child(other, inner);
        if inner != NIL {
            self.node_mut(inner).parent = node;
        }

        let parent = self.parent_of(node);
        self.node_mut(pivot).parent = parent;
        if parent == NIL {
            self.root = pivot;
        } else {
            let node_side = self.side_of(node);
            self.node_mut(parent).set_child(node_side, pivot);
        }

        self.node_mut(pivot).set_child(side, node);
        self.node_mut(node).parent = pivot;
    }
}

impl<K, V, C> OrderedMap<K, V, C> {
    fn node(&self, idx: usize) -> &Node<K, V> {
        match self.slots[idx] {
            Slot::Occupied(ref node) => node,
            Slot::Vacant(_) => unreachable!("vacant slot {} linked in the tree", idx),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<K, V> {
        match self.slots[idx] {
            Slot::Occupied(ref mut node) => node,
            Slot::Vacant(_) => unreachable!("vacant slot {} linked in the tree", idx),
        }
    }

    #[inline]
    fn colour_of(&self, idx: usize) -> Colour {
        if idx == NIL {
            Colour::Black
        } else {
            self.node(idx).colour
        }
    }

    #[inline]
    fn set_colour(&mut self, idx: usize, colour: Colour) {
        if idx != NIL {
            self.node_mut(idx).colour = colour;
        }
    }

    #[inline]
    fn parent_of(&self, idx: usize) -> usize {
        if idx == NIL {
            NIL
        } else {
            self.node(idx).parent
        }
    }

    #[inline]
    fn child_of(&self, idx: usize, side: Side) -> usize {
        if idx == NIL {
            NIL
        } else {
            self.node(idx).child(side)
        }
    }

    /// Side of its parent `idx` hangs from. Only meaningful for non-root nodes.
    fn side_of(&self, idx: usize) -> Side {
        if self.child_of(self.parent_of(idx), Side::Left) == idx {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Furthest node toward `side` in the subtree rooted at `idx`.
    fn extreme(&self, mut idx: usize, side: Side) -> usize {
        while self.child_of(idx, side) != NIL {
            idx = self.child_of(idx, side);
        }
        idx
    }

    /// In-order neighbour of `idx`: successor toward `Right`, predecessor
    /// toward `Left`.
    fn step(&self, idx: usize, side: Side) -> usize {
        let child = self.child_of(idx, side);
        if child != NIL {
            return self.extreme(child, side.opposite());
        }
        let mut cur = idx;
        let mut parent = self.parent_of(cur);
        while parent != NIL && cur == self.child_of(parent, side) {
            cur = parent;
            parent = self.parent_of(cur);
        }
        parent
    }

    fn entry(&self, idx: usize) -> Option<(&K, &V)> {
        if idx == NIL {
            None
        } else {
            let node = self.node(idx);
            Some((&node.key, &node.value))
        }
    }

    fn cursor(&self, idx: usize) -> Option<Cursor> {
        if idx == NIL {
            None
        } else {
            Some(Cursor {
                node: idx,
                mod_count: self.mod_count,
            })
        }
    }

    fn validate(&self, cursor: Cursor) -> Result<usize, MapError> {
        if cursor.mod_count != self.mod_count {
            return Err(MapError::ConcurrentModification {
                expected: cursor.mod_count,
                found: self.mod_count,
            });
        }
        match self.slots.get(cursor.node) {
            Some(Slot::Occupied(_)) => Ok(cursor.node),
            _ => Err(MapError::InvalidCursor),
        }
    }

    fn swap_entries(&mut self, a: usize, b: usize) {
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.slots.split_at_mut(high);
        if let (Slot::Occupied(x), Slot::Occupied(y)) = (&mut head[low], &mut tail[0]) {
            mem::swap(&mut x.key, &mut y.key);
            mem::swap(&mut x.value, &mut y.value);
        }
    }

    fn alloc(&mut self, node: Node<K, V>) -> usize {
        if self.free == NIL {
            self.slots.push(Slot::Occupied(node));
            return self.slots.len() - 1;
        }
        let idx = self.free;
        match mem::replace(&mut self.slots[idx], Slot::Occupied(node)) {
            Slot::Vacant(next) => self.free = next,
            Slot::Occupied(_) => unreachable!("occupied slot {} in the free list", idx),
        }
        idx
    }

    fn release(&mut self, idx: usize) -> (K, V) {
        match mem::replace(&mut self.slots[idx], Slot::Vacant(self.free)) {
            Slot::Occupied(node) => {
                self.free = idx;
                (node.key, node.value)
            }
            Slot::Vacant(_) => unreachable!("slot {} released twice", idx),
        }
    }
}

impl<K, V, C> fmt::Debug for OrderedMap<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
    C: Comparator<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C, D> PartialEq<OrderedMap<K, V, D>> for OrderedMap<K, V, C>
where
    V: PartialEq,
    C: Comparator<K>,
    D: Comparator<K>,
{
    fn eq(&self, other: &OrderedMap<K, V, D>) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).map_or(false, |v| v == value))
    }
}

impl<K, V, C> Eq for OrderedMap<K, V, C>
where
    V: Eq,
    C: Comparator<K>,
{
}

impl<K, V, C> FromIterator<(K, V)> for OrderedMap<K, V, C>
where
    C: Comparator<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::default();
        map.extend(iter);
        map
    }
}

impl<K, V, C> Extend<(K, V)> for OrderedMap<K, V, C>
where
    C: Comparator<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<'a, K, V, C> IntoIterator for &'a OrderedMap<K, V, C>
where
    C: Comparator<K>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Iter<'a, K, V, C> {
        self.iter()
    }
}

pub struct Iter<'a, K, V, C> {
    map: &'a OrderedMap<K, V, C>,
    front: usize,
    back: usize,
    remaining: usize,
}

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        let map = self.map;
        let node = map.node(self.front);
        self.front = map.step(self.front, Side::Right);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V, C> DoubleEndedIterator for Iter<'a, K, V, C> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        let map = self.map;
        let node = map.node(self.back);
        self.back = map.step(self.back, Side::Left);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }
}

impl<'a, K, V, C> ExactSizeIterator for Iter<'a, K, V, C> {}

pub struct Keys<'a, K, V, C> {
    inner: Iter<'a, K, V, C>,
}

impl<'a, K, V, C> Iterator for Keys<'a, K, V, C> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V, C> DoubleEndedIterator for Keys<'a, K, V, C> {
    fn next_back(&mut self) -> Option<&'a K> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<'a, K, V, C> ExactSizeIterator for Keys<'a, K, V, C> {}

pub struct Values<'a, K, V, C> {
    inner: Iter<'a, K, V, C>,
}

impl<'a, K, V, C> Iterator for Values<'a, K, V, C> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V, C> DoubleEndedIterator for Values<'a, K, V, C> {
    fn next_back(&mut self) -> Option<&'a V> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<'a, K, V, C> ExactSizeIterator for Values<'a, K, V, C> {}
