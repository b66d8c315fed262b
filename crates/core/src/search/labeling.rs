use crate::domain::flight::SearchResult;

pub const RECOMMENDED_COUNT: usize = 3;

/// Label for the result at zero-based `index` in provider order.
pub fn rank_label(index: usize) -> String {
    let position = index + 1;
    if index < RECOMMENDED_COUNT {
        format!("Recommended {position}")
    } else {
        format!("Option {position}")
    }
}

/// Tags results in the order the provider returned them. Nothing is re-sorted.
pub fn label_results(mut results: Vec<SearchResult>) -> Vec<SearchResult> {
    for (index, result) in results.iter_mut().enumerate() {
        result.rank_label = rank_label(index);
    }
    results
}
