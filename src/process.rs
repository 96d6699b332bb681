//! Ranking, filtering and truncation of a raw result set.

use crate::types::SearchResult;

/// The subset of [`crate::Config`] that shapes the displayed result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Stable-sort by descending score.
    pub sort_score: bool,
    /// Drop entries with a score of zero or below.
    pub filter_zeros: bool,
    /// Maximum number of entries kept.
    pub nb_results: usize,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            sort_score: true,
            filter_zeros: true,
            nb_results: 3,
        }
    }
}

/// Sort, filter, then truncate `results`.
///
/// The order of the steps matters: sorting first lets the best entries
/// survive truncation, and filtering before truncation keeps the bound
/// from being spent on non-positive entries. The input is left untouched.
pub fn process(results: &[SearchResult], options: &ProcessOptions) -> Vec<SearchResult> {
    let mut ranked = results.to_vec();
    if options.sort_score {
        // `sort_by` is stable, so equal scores keep their service order.
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    }

    let kept: Vec<SearchResult> = if options.filter_zeros {
        ranked.into_iter().filter(|r| r.score > 0.0).collect()
    } else {
        ranked
    };

    let before = kept.len();
    let limited: Vec<SearchResult> = kept.into_iter().take(options.nb_results).collect();
    tracing::debug!(
        received = results.len(),
        filtered = before,
        displayed = limited.len(),
        "Processed result set"
    );
    limited
}
