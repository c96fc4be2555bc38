//! Filter criteria and their query-string form.
//!
//! The query string is the shareable address of a filtered listing:
//! `?search=rust&location=berlin&minSalary=80000&maxSalary=150000`.
//! Fields holding their default value are left out of the string.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::query::DEFAULT_LIMIT;

/// Upper bound of the salary slider, also the default `max_salary`.
pub const DEFAULT_MAX_SALARY: u64 = 500_000;

const SEARCH_KEY: &str = "search";
const LOCATION_KEY: &str = "location";
const MIN_SALARY_KEY: &str = "minSalary";
const MAX_SALARY_KEY: &str = "maxSalary";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub search: String,
    pub location: String,
    pub min_salary: u64,
    pub max_salary: u64,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            search: String::new(),
            location: String::new(),
            min_salary: 0,
            max_salary: DEFAULT_MAX_SALARY,
        }
    }
}

impl FilterCriteria {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_salary(mut self, min: u64, max: u64) -> Self {
        self.min_salary = min;
        self.max_salary = max;
        self
    }

    /// Salary bounds in ascending order. An inverted pair is swapped.
    pub fn salary_bounds(&self) -> (u64, u64) {
        if self.min_salary <= self.max_salary {
            (self.min_salary, self.max_salary)
        } else {
            (self.max_salary, self.min_salary)
        }
    }

    /// Encodes the non-default fields as a query string (no leading `?`).
    pub fn to_query_string(&self) -> String {
        let defaults = Self::default();
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        if self.search != defaults.search {
            serializer.append_pair(SEARCH_KEY, &self.search);
        }
        if self.location != defaults.location {
            serializer.append_pair(LOCATION_KEY, &self.location);
        }
        if self.min_salary != defaults.min_salary {
            serializer.append_pair(MIN_SALARY_KEY, &self.min_salary.to_string());
        }
        if self.max_salary != defaults.max_salary {
            serializer.append_pair(MAX_SALARY_KEY, &self.max_salary.to_string());
        }

        serializer.finish()
    }

    /// Decodes criteria from a query string, with or without the leading `?`.
    ///
    /// Missing keys and integers that do not parse take their defaults.
    /// When a key repeats, the first occurrence wins. Unknown keys are ignored.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut criteria = Self::default();
        let mut seen = [false; 4];

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                SEARCH_KEY => 0,
                LOCATION_KEY => 1,
                MIN_SALARY_KEY => 2,
                MAX_SALARY_KEY => 3,
                _ => continue,
            };
            if seen[slot] {
                continue;
            }
            seen[slot] = true;

            match slot {
                0 => criteria.search = value.into_owned(),
                1 => criteria.location = value.into_owned(),
                2 => {
                    if let Ok(min) = value.trim().parse() {
                        criteria.min_salary = min;
                    }
                }
                _ => {
                    if let Ok(max) = value.trim().parse() {
                        criteria.max_salary = max;
                    }
                }
            }
        }

        criteria
    }
}

/// Parameters of a listing request as they travel over the wire.
///
/// Every field is optional on the wire; omissions take the same defaults
/// as [`FilterCriteria`] with `page = 1` and `limit = DEFAULT_LIMIT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobsRequest {
    pub search: String,
    pub location: String,
    pub min_salary: u64,
    pub max_salary: u64,
    pub page: u32,
    pub limit: u32,
}

impl Default for JobsRequest {
    fn default() -> Self {
        Self::new(&FilterCriteria::default(), 1, DEFAULT_LIMIT)
    }
}

impl JobsRequest {
    pub fn new(criteria: &FilterCriteria, page: u32, limit: u32) -> Self {
        Self {
            search: criteria.search.clone(),
            location: criteria.location.clone(),
            min_salary: criteria.min_salary,
            max_salary: criteria.max_salary,
            page,
            limit,
        }
    }

    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            search: self.search.clone(),
            location: self.location.clone(),
            min_salary: self.min_salary,
            max_salary: self.max_salary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_criteria_encode_to_empty_string() {
        assert_eq!(FilterCriteria::default().to_query_string(), "");
    }

    #[test]
    fn test_only_changed_fields_are_encoded() {
        let criteria = FilterCriteria::default()
            .with_search("rust dev")
            .with_salary(0, 150_000);
        assert_eq!(
            criteria.to_query_string(),
            "search=rust+dev&maxSalary=150000"
        );
    }

    #[test]
    fn test_decode_fills_defaults() {
        let criteria = FilterCriteria::from_query_string("?location=Berlin");
        assert_eq!(criteria.location, "Berlin");
        assert_eq!(criteria.search, "");
        assert_eq!(criteria.min_salary, 0);
        assert_eq!(criteria.max_salary, DEFAULT_MAX_SALARY);
    }

    #[test]
    fn test_decode_ignores_bad_integers_and_unknown_keys() {
        let criteria =
            FilterCriteria::from_query_string("minSalary=abc&maxSalary=90000&theme=dark");
        assert_eq!(criteria.min_salary, 0);
        assert_eq!(criteria.max_salary, 90_000);
    }

    #[test]
    fn test_decode_first_occurrence_wins() {
        let criteria = FilterCriteria::from_query_string("search=first&search=second");
        assert_eq!(criteria.search, "first");
    }

    #[test]
    fn test_encoded_address_decodes_back() {
        let criteria = FilterCriteria::default()
            .with_search("C++ & Rust")
            .with_location("São Paulo")
            .with_salary(40_000, 120_000);
        let decoded = FilterCriteria::from_query_string(&criteria.to_query_string());
        assert_eq!(decoded, criteria);
    }

    #[test]
    fn test_salary_bounds_swaps_inverted_range() {
        let criteria = FilterCriteria::default().with_salary(120_000, 100_000);
        assert_eq!(criteria.salary_bounds(), (100_000, 120_000));
    }

    #[test]
    fn test_jobs_request_defaults() {
        let request = JobsRequest::default();
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, DEFAULT_LIMIT);
        assert_eq!(request.criteria(), FilterCriteria::default());
    }
}
