use lintrate_core::{bucket_of, enumerate_months, MonthBucket};
use lintrate_storage::{ResultStore, StoreError};

/// Months to report over. Missing bounds come from the earliest and latest
/// parsable issuance date in the store; with no usable dates the range is empty.
pub fn resolve_months(
    store: &dyn ResultStore,
    from: Option<MonthBucket>,
    to: Option<MonthBucket>,
) -> Result<Vec<MonthBucket>, StoreError> {
    let (from, to) = match (from, to) {
        (Some(f), Some(t)) => (f, t),
        (from, to) => {
            let Some((min, max)) = issuance_span(store)? else {
                return Ok(vec![]);
            };
            (from.unwrap_or(min), to.unwrap_or(max))
        }
    };
    Ok(enumerate_months(from, to))
}

fn issuance_span(store: &dyn ResultStore) -> Result<Option<(MonthBucket, MonthBucket)>, StoreError> {
    let buckets: Vec<MonthBucket> = store
        .issuance_dates()?
        .iter()
        .filter_map(|d| bucket_of(d).ok())
        .collect();
    let min = buckets.iter().min().copied();
    let max = buckets.iter().max().copied();
    Ok(min.zip(max))
}
