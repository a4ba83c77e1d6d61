//! Parallel helpers with sequential fallbacks
//!
//! Row-wise kernels (SpMV, SpGEMM, strength filtering) go through these so
//! the `rayon` feature can be switched off without touching call sites.

/// Rows below this count are processed sequentially even with rayon.
pub const PARALLEL_ROW_THRESHOLD: usize = 256;

/// Map `f` over `0..count`, in parallel when rayon is enabled and the
/// work is large enough.
#[cfg(feature = "rayon")]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    use rayon::prelude::*;
    if count < PARALLEL_ROW_THRESHOLD {
        return (0..count).map(f).collect();
    }
    (0..count).into_par_iter().map(f).collect()
}

/// Sequential map with index (fallback)
#[cfg(not(feature = "rayon"))]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    F: Fn(usize) -> U,
{
    (0..count).map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_map_indexed() {
        let result = parallel_map_indexed(5, |i| i * 2);
        assert_eq!(result, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_parallel_map_indexed_preserves_order() {
        let n = PARALLEL_ROW_THRESHOLD * 4;
        let result = parallel_map_indexed(n, |i| i + 1);
        assert!(result.iter().enumerate().all(|(i, &v)| v == i + 1));
    }
}
