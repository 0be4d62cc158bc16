//! Deterministic batching of ordered input for size-bounded requests.
//!
//! The external service has an output-size ceiling, so operations split their
//! input into fixed-size batches. Chunking is a pure function of input order
//! and limit: no randomization, so a rerun of the same operation issues the
//! same requests.

/// Split `items` into ordered chunks of at most `size` elements.
///
/// Every chunk except possibly the last has exactly `size` elements; the
/// concatenation of all chunks is the input in its original order. Empty
/// input yields no chunks. `size` is caller-guaranteed positive.
pub fn chunks<T>(items: &[T], size: usize) -> Vec<&[T]> {
    debug_assert!(size > 0, "chunk size must be positive");
    items.chunks(size.max(1)).collect()
}
