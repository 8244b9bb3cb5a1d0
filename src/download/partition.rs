use std::ops::RangeInclusive;

/// Splits a page range into contiguous chunks, one per worker
///
/// Every chunk holds `ceil(len / workers)` pages except the last, which may
/// be shorter, so there are never more than `workers` chunks. An empty range
/// yields no chunks and `workers == 0` is treated as one worker.
///
/// # Examples
///
/// ```
/// use comic_walker::download::partition;
///
/// assert_eq!(partition(1..=10, 4), vec![1..=3, 4..=6, 7..=9, 10..=10]);
/// assert_eq!(partition(5..=6, 20), vec![5..=5, 6..=6]);
/// ```
pub fn partition(pages: RangeInclusive<u32>, workers: usize) -> Vec<RangeInclusive<u32>> {
    let (start, end) = (u64::from(*pages.start()), u64::from(*pages.end()));
    if start > end {
        return Vec::new();
    }

    let len = end - start + 1;
    let workers = workers.max(1) as u64;
    let chunk_len = len.div_ceil(workers);

    let mut chunks = Vec::new();
    let mut chunk_start = start;
    while chunk_start <= end {
        let chunk_end = (chunk_start + chunk_len - 1).min(end);
        chunks.push(chunk_start as u32..=chunk_end as u32);
        chunk_start = chunk_end + 1;
    }

    chunks
}
