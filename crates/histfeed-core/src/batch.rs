//! Order-preserving batching of the requested instrument list.

use crate::ConfigError;

/// Split `items` into contiguous batches of at most `batch_size`.
///
/// Batches partition the input exactly: concatenating them reproduces the
/// input in order. An empty input yields no batches.
pub fn split_batches<T: Clone>(items: &[T], batch_size: usize) -> Result<Vec<Vec<T>>, ConfigError> {
    if batch_size == 0 {
        return Err(ConfigError::InvalidBatchSize);
    }

    Ok(items
        .chunks(batch_size)
        .map(|chunk| chunk.to_vec())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_exactly_in_order() {
        let items: Vec<u32> = (0..12).collect();
        let batches = split_batches(&items, 5).expect("valid batch size");

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 5);
        assert_eq!(batches[1].len(), 5);
        assert_eq!(batches[2].len(), 2);

        let flattened: Vec<u32> = batches.into_iter().flatten().collect();
        assert_eq!(flattened, items);
    }

    #[test]
    fn exact_multiple_has_no_trailing_batch() {
        let items: Vec<u32> = (0..10).collect();
        let batches = split_batches(&items, 5).expect("valid batch size");
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|batch| batch.len() == 5));
    }

    #[test]
    fn input_smaller_than_batch_size_is_one_batch() {
        let items = vec!["AAPL", "MSFT"];
        let batches = split_batches(&items, 5).expect("valid batch size");
        assert_eq!(batches, vec![vec!["AAPL", "MSFT"]]);
    }

    #[test]
    fn empty_input_yields_no_batches() {
        let batches = split_batches::<u32>(&[], 5).expect("valid batch size");
        assert!(batches.is_empty());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let err = split_batches(&[1, 2, 3], 0).expect_err("must fail");
        assert_eq!(err, ConfigError::InvalidBatchSize);
    }

    #[test]
    fn batch_count_is_ceiling_division() {
        for (n, size, expected) in [(1, 5, 1), (5, 5, 1), (6, 5, 2), (11, 4, 3)] {
            let items: Vec<u32> = (0..n).collect();
            let batches = split_batches(&items, size).expect("valid batch size");
            assert_eq!(batches.len(), expected, "n={n} size={size}");
            assert!(batches.iter().all(|batch| !batch.is_empty()));
        }
    }
}
