use std::ops::Range;

pub fn chunk_size(len: usize, granularity: usize) -> usize {
    debug_assert!(granularity > 0, "granularity must be >= 1");
    len.div_ceil(granularity)
}

/// Bounds of chunk `index` when `len` elements are split into `granularity` chunks.
///
/// Returns `None` for an empty chunk. Ceiling sizing can leave trailing indices with no
/// elements, e.g. `len = 5, granularity = 4` only fills chunks 0..3.
pub fn chunk_bounds(len: usize, granularity: usize, index: usize) -> Option<Range<usize>> {
    let size = chunk_size(len, granularity);
    let start = index.checked_mul(size)?;
    if start >= len {
        return None;
    }
    Some(start..(start + size).min(len))
}

pub fn complement<T: Clone>(current: &[T], chunk: Range<usize>) -> Vec<T> {
    let mut out = Vec::with_capacity(current.len() - chunk.len());
    out.extend_from_slice(&current[..chunk.start]);
    out.extend_from_slice(&current[chunk.end..]);
    out
}

pub fn trials(len: usize, granularity: usize) -> impl Iterator<Item = (usize, Range<usize>)> {
    (0..granularity).filter_map(move |index| {
        let chunk = chunk_bounds(len, granularity, index)?;
        (chunk.len() < len).then_some((index, chunk))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_elements_in_two_chunks() {
        assert_eq!(chunk_size(5, 2), 3);
        assert_eq!(chunk_bounds(5, 2, 0), Some(0..3));
        assert_eq!(chunk_bounds(5, 2, 1), Some(3..5));

        let current = ["a", "b", "c", "d", "e"];
        assert_eq!(complement(&current, 0..3), vec!["d", "e"]);
        assert_eq!(complement(&current, 3..5), vec!["a", "b", "c"]);
    }

    #[test]
    fn trailing_chunks_past_the_end_are_empty() {
        assert_eq!(chunk_size(5, 4), 2);
        assert_eq!(chunk_bounds(5, 4, 2), Some(4..5));
        assert_eq!(chunk_bounds(5, 4, 3), None);

        let indices: Vec<usize> = trials(5, 4).map(|(index, _)| index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn finest_granularity_removes_single_elements() {
        let chunks: Vec<Range<usize>> = trials(3, 3).map(|(_, chunk)| chunk).collect();
        assert_eq!(chunks, vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn chunk_covering_everything_is_not_a_trial() {
        assert_eq!(chunk_bounds(1, 2, 0), Some(0..1));
        assert_eq!(trials(1, 2).count(), 0);
        assert_eq!(trials(0, 2).count(), 0);
    }
}
