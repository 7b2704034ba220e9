//! Show request/response models and the date/time text helpers every show
//! surface shares.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

lazy_static::lazy_static! {
    pub static ref DATE_REGEX: regex::Regex =
        regex::Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    /// Accepts HH:mm or HH:mm:ss; storage normalizes to zero-padded HH:mm.
    pub static ref SHOW_TIME_REGEX: regex::Regex =
        regex::Regex::new(r"^\d{1,2}:\d{2}(?::\d{2})?$").unwrap();
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateShowRequest {
    #[validate(regex(path = &*DATE_REGEX, message = "Date must be YYYY-MM-DD"))]
    pub date: String,

    #[validate(regex(path = &*SHOW_TIME_REGEX, message = "Time must be HH:mm or HH:mm:ss"))]
    pub show_time: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EditShowRequest {
    #[validate(regex(path = &*DATE_REGEX, message = "Date must be YYYY-MM-DD"))]
    pub date: Option<String>,

    #[validate(regex(path = &*SHOW_TIME_REGEX, message = "Time must be HH:mm or HH:mm:ss"))]
    pub show_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListShowsQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkGenerateRequest {
    #[validate(regex(path = &*DATE_REGEX, message = "Start date must be YYYY-MM-DD"))]
    pub start_date: String,

    #[validate(regex(path = &*DATE_REGEX, message = "End date must be YYYY-MM-DD"))]
    pub end_date: String,

    /// Weekday index (`"0"` = Sunday … `"6"` = Saturday) to show times.
    pub weekday_times: HashMap<String, Vec<String>>,

    pub skip_duplicates: Option<bool>,
}

/// A single created or skipped row in an import/bulk-generate result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedShow {
    pub date: String,
    pub show_time: String,
}

#[derive(Debug, Serialize, Default)]
pub struct ImportResult {
    pub created_count: usize,
    pub skipped_count: usize,
    pub created_shows: Vec<ImportedShow>,
    pub skipped_shows: Vec<ImportedShow>,
}

/// Normalizes an already-validated `H:mm[:ss]` string to zero-padded
/// `HH:mm` for storage, so text ordering matches chronological ordering.
pub fn to_hhmm(s: &str) -> String {
    let mut parts = s.splitn(3, ':');
    match (parts.next(), parts.next()) {
        (Some(h), Some(m)) => match h.parse::<u32>() {
            Ok(hour) => format!("{:02}:{}", hour, m),
            Err(_) => s.to_string(),
        },
        _ => s.to_string(),
    }
}

pub fn parse_date_only(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}
