//! Display helpers for job cards and detail pages.

use chrono::{DateTime, Utc};

use crate::Job;

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 1_440;
const MINUTES_PER_MONTH: i64 = 43_200;

impl Job {
    /// Up to two uppercase initials of the company name, used as a logo.
    pub fn company_initials(&self) -> String {
        self.company
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }

    /// Human-readable distance between posting time and `now`, e.g. "3 days ago".
    pub fn posted_ago(&self, now: DateTime<Utc>) -> String {
        relative_time(self.posted_at, now)
    }

    /// Salary range with thousands separators, e.g. "$90,000 - $150,000".
    pub fn salary_range(&self) -> String {
        format!(
            "${} - ${}",
            group_thousands(self.salary_min),
            group_thousands(self.salary_max)
        )
    }
}

/// Formats the distance from `then` to `now` with an "ago"/"in" suffix.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    let distance = distance_in_words(seconds.unsigned_abs() as i64);
    if seconds >= 0 {
        format!("{distance} ago")
    } else {
        format!("in {distance}")
    }
}

fn distance_in_words(seconds: i64) -> String {
    let minutes = (seconds + 30) / 60;

    match minutes {
        0 => "less than a minute".to_string(),
        1 => "1 minute".to_string(),
        m if m < 45 => format!("{m} minutes"),
        m if m < 90 => "about 1 hour".to_string(),
        m if m < MINUTES_PER_DAY => format!("about {} hours", round_div(m, MINUTES_PER_HOUR)),
        m if m < 2_520 => "1 day".to_string(),
        m if m < MINUTES_PER_MONTH => format!("{} days", round_div(m, MINUTES_PER_DAY)),
        m if m < 2 * MINUTES_PER_MONTH => plural(round_div(m, MINUTES_PER_MONTH), "about", "month"),
        m if m / MINUTES_PER_MONTH < 12 => format!("{} months", round_div(m, MINUTES_PER_MONTH)),
        m => {
            let months = m / MINUTES_PER_MONTH;
            let years = months / 12;
            match months % 12 {
                0..3 => plural(years, "about", "year"),
                3..9 => plural(years, "over", "year"),
                _ => plural(years + 1, "almost", "year"),
            }
        }
    }
}

fn plural(count: i64, qualifier: &str, unit: &str) -> String {
    if count == 1 {
        format!("{qualifier} 1 {unit}")
    } else {
        format!("{qualifier} {count} {unit}s")
    }
}

fn round_div(value: i64, unit: i64) -> i64 {
    (value + unit / 2) / unit
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
