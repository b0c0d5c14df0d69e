//! Reduce phase: associative, commutative merging of partial aggregates.
use crate::{memory::Primitive, task::PartialAggregate, Error, Result};

impl<T: Primitive> PartialAggregate<T> {
    /// Merge **other** into this aggregate: sums and counts are added element-wise, errors are
    /// added. Merging is associative and commutative up to floating-point summation order.
    ///
    /// ## Panics
    /// If both aggregates do not have the same k×d shape. Use [`PartialAggregate::try_merge`]
    /// to get an error instead.
    pub fn merge(self, other: &Self) -> Self {
        match self.try_merge(other) {
            Ok(merged) => merged,
            Err(e) => panic!("{}", e)
        }
    }

    /// Same as [`PartialAggregate::merge`], but reports a shape mismatch as an error.
    pub fn try_merge(mut self, other: &Self) -> Result<Self> {
        if (self.k, self.dims) != (other.k, other.dims) {
            return Err(Error::ShapeMismatch(self.k, self.dims, other.k, other.dims));
        }
        self.sums.iter_mut().zip(other.sums.iter()).for_each(|(s, o)| *s += o);
        self.counts.iter_mut().zip(other.counts.iter()).for_each(|(c, o)| *c += o);
        self.error += other.error;
        Ok(self)
    }

    /// Fold all **aggregates** into one, pairwise as a balanced tree. Returns `None` for an
    /// empty input.
    pub fn merge_all<I>(aggregates: I) -> Option<Result<Self>> where I: IntoIterator<Item = Self> {
        let mut level: Vec<Self> = aggregates.into_iter().collect();
        if level.is_empty() {
            return None;
        }
        while level.len() > 1 {
            let mut next = Vec::with_capacity((level.len() + 1) / 2);
            let mut it = level.into_iter();
            while let Some(left) = it.next() {
                match it.next() {
                    Some(right) => match left.try_merge(&right) {
                        Ok(merged) => next.push(merged),
                        Err(e) => return Some(Err(e))
                    },
                    None => next.push(left)
                }
            }
            level = next;
        }
        level.pop().map(Ok)
    }
}
