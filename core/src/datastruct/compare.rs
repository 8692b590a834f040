use std::cmp::Ordering;

/// Three-way comparison used by the ordered containers.
///
/// Closures and functions of the shape `Fn(&T, &T) -> Ordering` are
/// comparators too, so a custom ordering can be passed inline.
pub trait Comparator<T: ?Sized> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// Ordering given by the `Ord` implementation of the type.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Natural;

impl<T> Comparator<T> for Natural
where
    T: Ord + ?Sized,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Flips the ordering of the wrapped comparator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Reverse<C>(pub C);

impl<T, C> Comparator<T> for Reverse<C>
where
    T: ?Sized,
    C: Comparator<T>,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self.0.compare(b, a)
    }
}

impl<T, F> Comparator<T> for F
where
    T: ?Sized,
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// Comparator picked at runtime.
pub type DynComparator<T> = Box<dyn Fn(&T, &T) -> Ordering>;
