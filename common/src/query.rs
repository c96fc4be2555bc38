//! Job query engine
//!
//! Filters the corpus with the criteria predicate, keeping corpus order,
//! and returns one page of the matches.

use crate::error::{QueryError, Result};
use crate::{FilterCriteria, Job, QueryResult};

/// Page size used when the caller does not pass one.
pub const DEFAULT_LIMIT: u32 = 10;

/// Case-insensitive substring test. An empty needle matches everything.
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Returns true when the job satisfies every clause of the criteria:
/// search text in title or company, location text in location, and
/// salary ranges overlapping.
pub fn matches(job: &Job, criteria: &FilterCriteria) -> bool {
    let matches_search = criteria.search.is_empty()
        || contains_ignore_case(&job.title, &criteria.search)
        || contains_ignore_case(&job.company, &criteria.search);

    let matches_location = contains_ignore_case(&job.location, &criteria.location);

    let (min_salary, max_salary) = criteria.salary_bounds();
    let matches_salary = job.salary_max >= min_salary && job.salary_min <= max_salary;

    matches_search && matches_location && matches_salary
}

/// Evaluates `criteria` over `corpus` and returns page `page` (1-based)
/// of at most `limit` jobs.
pub fn query(
    corpus: &[Job],
    criteria: &FilterCriteria,
    page: u32,
    limit: u32,
) -> Result<QueryResult<Job>> {
    if page < 1 {
        return Err(QueryError::InvalidArgument(format!(
            "page must be at least 1, got {page}"
        )));
    }
    if limit == 0 {
        return Err(QueryError::InvalidArgument(
            "limit must be at least 1".to_string(),
        ));
    }

    let filtered: Vec<&Job> = corpus.iter().filter(|job| matches(job, criteria)).collect();

    let total_items = u32::try_from(filtered.len()).unwrap_or(u32::MAX);
    let total_pages = total_items.div_ceil(limit);
    let next_page = if page < total_pages { Some(page + 1) } else { None };

    let start = (page as usize - 1).saturating_mul(limit as usize);
    let data: Vec<Job> = filtered
        .into_iter()
        .skip(start)
        .take(limit as usize)
        .cloned()
        .collect();

    tracing::debug!(
        page,
        limit,
        total_items,
        returned = data.len(),
        "query evaluated"
    );

    Ok(QueryResult {
        data,
        next_page,
        total_pages,
        total_items,
    })
}

/// Looks up a single job by its identifier.
pub fn find_by_id<'a>(corpus: &'a [Job], id: &str) -> Result<&'a Job> {
    corpus
        .iter()
        .find(|job| job.id == id)
        .ok_or_else(|| QueryError::NotFound(id.to_string()))
}
