use crate::memory::Primitive;

/// Squared euclidean distance between a sample and a centroid of equal length.
#[inline(always)]
pub(crate) fn squared_euclidean<T: Primitive>(sample: &[T], centroid: &[T]) -> T {
    sample.iter().cloned()
        .zip(centroid.iter().cloned())
        .map(|(sv, cv)| sv - cv)        // <sample> - <centroid>
        .map(|v| v * v)                 // <vec_components> ^2
        .sum()                          // sum(<vec_components>^2)
}
