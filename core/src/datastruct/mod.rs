mod compare;
mod heap;
mod rbtree;

pub use compare::{Comparator, DynComparator, Natural, Reverse};
pub use heap::{PriorityQueue, QueueError};
pub use rbtree::{Cursor, Iter, Keys, MapError, OrderedMap, Values};
