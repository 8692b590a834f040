use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;
use std::mem;
use std::slice;

use super::compare::{Comparator, Natural};

#[derive(Debug, Fail)]
pub enum QueueError {
    #[fail(display = "priority queue is empty")]
    Empty,
}

/// Priority queue backed by a binary heap stored in a `Vec`.
///
/// The element at position `i` has its children at `2i + 1` and `2i + 2`.
/// `compare(a, b) == Greater` means `a` has the higher priority and leaves
/// the queue first, so the natural ordering gives a max-heap and
/// `Reverse(Natural)` a min-heap. Equal priorities come out in no
/// particular order.
#[derive(Clone)]
pub struct PriorityQueue<T, C = Natural> {
    data: Vec<T>,
    comparator: C,
}

impl<T> PriorityQueue<T, Natural>
where
    T: Ord,
{
    pub fn new() -> PriorityQueue<T, Natural> {
        PriorityQueue::with_comparator(Natural)
    }

    pub fn from_vec(data: Vec<T>) -> PriorityQueue<T, Natural> {
        PriorityQueue::from_vec_with_comparator(data, Natural)
    }
}

impl<T, C> Default for PriorityQueue<T, C>
where
    C: Comparator<T> + Default,
{
    fn default() -> Self {
        PriorityQueue::with_comparator(C::default())
    }
}

impl<T, C> PriorityQueue<T, C>
where
    C: Comparator<T>,
{
    pub fn with_comparator(comparator: C) -> PriorityQueue<T, C> {
        PriorityQueue {
            data: Vec::new(),
            comparator,
        }
    }

    /// Builds a queue over an existing sequence, restoring the heap order
    /// in linear time.
    pub fn from_vec_with_comparator(data: Vec<T>, comparator: C) -> PriorityQueue<T, C> {
        let mut queue = PriorityQueue { data, comparator };
        queue.heapify_all();
        queue
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Always succeeds.
    pub fn add(&mut self, element: T) -> bool {
        self.data.push(element);
        let last = self.data.len() - 1;
        self.sift_up(last);
        true
    }

    pub fn peek(&self) -> Result<&T, QueueError> {
        self.data.first().ok_or(QueueError::Empty)
    }

    pub fn pop(&mut self) -> Option<T> {
        let last = self.data.pop()?;
        if self.data.is_empty() {
            return Some(last);
        }
        let top = mem::replace(&mut self.data[0], last);
        self.sift_down(0);
        Some(top)
    }

    /// Restores the heap order over the whole backing sequence.
    pub fn heapify_all(&mut self) {
        let len = self.data.len();
        if len < 2 {
            return;
        }
        debug!("heapify {} elements", len);
        for pos in (0..len / 2).rev() {
            self.sift_down(pos);
        }
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Elements in backing order, which is the level order of the heap.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Drains the queue, highest priority first.
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut sorted = Vec::with_capacity(self.data.len());
        while let Some(element) = self.pop() {
            sorted.push(element);
        }
        sorted
    }

    #[inline]
    fn precedes(&self, a: usize, b: usize) -> bool {
        self.comparator.compare(&self.data[a], &self.data[b]) == Ordering::Greater
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.precedes(pos, parent) {
                break;
            }
            self.data.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.data.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut highest = pos;
            if left < len && self.precedes(left, highest) {
                highest = left;
            }
            if right < len && self.precedes(right, highest) {
                highest = right;
            }
            if highest == pos {
                break;
            }
            self.data.swap(pos, highest);
            pos = highest;
        }
    }
}

impl<T, C> fmt::Debug for PriorityQueue<T, C>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.data.iter()).finish()
    }
}

impl<T, C> FromIterator<T> for PriorityQueue<T, C>
where
    C: Comparator<T> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        PriorityQueue::from_vec_with_comparator(iter.into_iter().collect(), C::default())
    }
}

impl<T, C> Extend<T> for PriorityQueue<T, C>
where
    C: Comparator<T>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.add(element);
        }
    }
}

impl<'a, T, C> IntoIterator for &'a PriorityQueue<T, C>
where
    C: Comparator<T>,
{
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> slice::Iter<'a, T> {
        self.iter()
    }
}
