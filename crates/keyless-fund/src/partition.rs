//! Splitting ordered payout lists into contiguous batches.

use crate::{FundingError, Result};

/// Splits `items` into consecutive, non-overlapping batches of `batch_size`. Only the last batch
/// may be shorter. Concatenating the batches in order gives back `items`.
pub fn partition<T>(items: &[T], batch_size: usize) -> Result<Vec<&[T]>> {
    if batch_size == 0 {
        return Err(FundingError::InvalidBatchSize { batch_size, min: 1 });
    }
    Ok(items.chunks(batch_size).collect())
}

/// Number of batches `partition` yields for `len` items.
pub const fn batch_count(len: usize, batch_size: usize) -> usize {
    len.div_ceil(batch_size)
}
