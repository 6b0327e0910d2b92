//! Process-wide cache of computed filter matrices.
//!
//! Matrix computation is cheap but not free, and hosts recompute on every
//! slider tick. The cache is keyed by the serialized configuration plus the
//! strength bits, so equal configurations always hit. RwLock allows
//! concurrent readers; `peek` keeps the read path lock-light.

use std::num::NonZeroUsize;
use std::sync::{LazyLock, RwLock};

use anyhow::{bail, Result};
use lru::LruCache;

use crate::filter::{FilterState, TransformOp};
use crate::math::Matrix3;

static MATRIX_CACHE: LazyLock<RwLock<LruCache<(String, u64), Matrix3>>> =
    LazyLock::new(|| RwLock::new(LruCache::new(NonZeroUsize::new(64).unwrap())));

/// The single-matrix transform for `state`, memoized.
///
/// Fails for configurations whose transform is not a single matrix (the
/// opponent-solver correction and the inversion effects) and for parameters
/// the underlying math rejects; callers keep their previous matrix in both
/// cases.
pub fn matrix_cached(state: &FilterState) -> Result<Matrix3> {
    let key = (state.to_string(), state.strength().to_bits());

    // Fast path: read lock only, and peek() to avoid the LRU bookkeeping.
    if let Ok(cache) = MATRIX_CACHE.read() {
        if let Some(&matrix) = cache.peek(&key) {
            return Ok(matrix);
        }
    }

    log::debug!("matrix cache miss for {} @ {}", key.0, state.strength());
    let transform = state.compute_transform()?;
    let matrix = match transform.op {
        TransformOp::Matrix(m) => m,
        _ => bail!("{} has no single-matrix form", state),
    };

    if let Ok(mut cache) = MATRIX_CACHE.write() {
        cache.put(key, matrix);
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_returns_the_same_matrix() {
        let state = FilterState::from_string("correction-aosp-protanopia").unwrap();
        let first = matrix_cached(&state).unwrap();
        let second = matrix_cached(&state).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_strength_is_part_of_the_key() {
        let mut state = FilterState::from_string("correction-hpe-deuteranopia").unwrap();
        let half = matrix_cached(&state).unwrap();
        state.set_strength(1.0);
        let full = matrix_cached(&state).unwrap();
        assert_ne!(half, full);
    }

    #[test]
    fn test_solver_configurations_are_rejected() {
        let state = FilterState::from_string("correction-ocs-deuteranopia").unwrap();
        assert!(
            matrix_cached(&state).is_err(),
            "the iterative correction has no single-matrix form"
        );
    }
}
