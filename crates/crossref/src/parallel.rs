//! Optional data parallelism over ordered work items.
//!
//! Every stage that fans out (projects in the qualifier, namespaces in the
//! graph builder) goes through [`map_maybe_parallel`]. Results always come
//! back in input order, which is what keeps the pipeline deterministic:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       run stage                          │
//! ├──────────────────────────────────────────────────────────┤
//! │  Fan out (rayon, optional):  per-item work, local state  │
//! │  Fan in  (sequential):       merge results in order      │
//! └──────────────────────────────────────────────────────────┘
//! ```

use rayon::prelude::*;

/// Apply `f` to every item, on the rayon pool when `parallel` is set.
///
/// The output is in input order either way.
pub(crate) fn map_maybe_parallel<T, R, F>(items: &[T], parallel: bool, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if parallel && items.len() > 1 {
        items.par_iter().map(f).collect()
    } else {
        items.iter().map(f).collect()
    }
}
