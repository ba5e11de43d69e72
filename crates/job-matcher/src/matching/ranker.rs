use super::scoring::ScoreResult;
use std::cmp::Ordering;

/// Orders results by score descending, breaking ties by posting id ascending.
pub fn rank<T: AsRef<ScoreResult>>(mut results: Vec<T>) -> Vec<T> {
    results.sort_by(|left, right| ranking_order(left.as_ref(), right.as_ref()));
    results
}

/// Ranks and keeps at most `limit` results.
pub fn top_n<T: AsRef<ScoreResult>>(results: Vec<T>, limit: usize) -> Vec<T> {
    let mut ranked = rank(results);
    ranked.truncate(limit);
    ranked
}

/// Total order used by [`rank`]. `total_cmp` keeps NaN from breaking the sort.
pub fn ranking_order(left: &ScoreResult, right: &ScoreResult) -> Ordering {
    right
        .score
        .total_cmp(&left.score)
        .then_with(|| left.posting_id.cmp(&right.posting_id))
}
