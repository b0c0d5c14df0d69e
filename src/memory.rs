use num::{NumCast, Zero, Float};
use std::{
    fmt::{Debug, Display, LowerExp}, iter::Sum, ops::{Add, AddAssign, Sub, SubAssign}
};
use rand::distributions::uniform::SampleUniform;

pub trait Primitive: Add + AddAssign + Sum + Sub + SubAssign + Zero + Float + NumCast + SampleUniform
                + PartialOrd + Copy + Default + Display + Debug + Sync + Send + LowerExp + 'static
                + for<'a> AddAssign<&'a Self> + for<'a> Sub<&'a Self> {}
impl Primitive for f32 {}
impl Primitive for f64 {}


/// Dense k×d matrix of centroids, stored row-major: [<centroid0>,<centroid1>,<centroid2>,...]
///
/// The driver owns exactly one instance per round. It is handed out to partition tasks by shared
/// reference only, and replaced wholesale once a round's aggregates have been merged.
#[derive(Clone, Debug, PartialEq)]
pub struct CentroidMatrix<T: Primitive> {
    k: usize,
    dims: usize,
    values: Vec<T>
}
impl<T: Primitive> CentroidMatrix<T> {
    /// Create a zero-initialized matrix with **k** rows and **dims** columns.
    pub fn zeros(k: usize, dims: usize) -> Self {
        Self { k, dims, values: vec![T::zero(); k * dims] }
    }

    /// Create a matrix from row-major **values**. Returns `None` if `values.len() != k * dims`.
    pub fn from_vec(values: Vec<T>, k: usize, dims: usize) -> Option<Self> {
        if values.len() != k * dims {
            return None;
        }
        Some(Self { k, dims, values })
    }

    pub fn k(&self) -> usize { self.k }
    pub fn dims(&self) -> usize { self.dims }
    pub fn as_slice(&self) -> &[T] { &self.values }
    pub fn into_vec(self) -> Vec<T> { self.values }

    /// Row of the **idx**-th centroid.
    pub fn nth(&self, idx: usize) -> &[T] {
        &self.values[idx * self.dims..(idx + 1) * self.dims]
    }

    pub(crate) fn nth_mut(&mut self, idx: usize) -> &mut [T] {
        &mut self.values[idx * self.dims..(idx + 1) * self.dims]
    }

    pub(crate) fn set_nth_from_iter(&mut self, idx: usize, src: impl Iterator<Item = T>) {
        self.nth_mut(idx).iter_mut()
            .zip(src)
            .for_each(|(c,s)| *c = s);
    }

    /// Iterate over all centroid rows.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, T> {
        self.values.chunks_exact(self.dims)
    }
}
