//! Fixed-size batching for bulk store operations.
//!
//! The store caps statement size and bound-parameter count, so bulk ingests
//! and `IN (...)` lookups are split into batches of at most `size` items.
//! Batch sizes come from code or a validated [`BackendConfig`], never from
//! request input, so a zero size is a bug and panics.
//!
//! [`BackendConfig`]: crate::config::BackendConfig

/// Split `items` into contiguous runs of `size`; the last holds the remainder.
///
/// # Panics
///
/// Panics if `size` is 0.
pub fn chunk<T>(items: &[T], size: usize) -> Vec<&[T]> {
    assert!(size > 0, "chunk size must be greater than 0");
    let chunks: Vec<&[T]> = items.chunks(size).collect();
    tracing::trace!(items = items.len(), size, chunks = chunks.len(), "chunked batch");
    chunks
}

/// Owned form of [`chunk`].
///
/// # Panics
///
/// Panics if `size` is 0.
pub fn into_chunks<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    assert!(size > 0, "chunk size must be greater than 0");
    let total = items.len();
    let mut out = Vec::with_capacity(total.div_ceil(size));
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        out.push(iter.by_ref().take(size).collect());
    }
    tracing::trace!(items = total, size, chunks = out.len(), "chunked owned batch");
    out
}
