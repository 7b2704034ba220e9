//! Calendar import and weekday-template bulk generation.
//!
//! Both modes feed the same sequential creation loop: for every candidate
//! row the duplicate check and the insert are awaited before the next row
//! starts. That bounds throughput to one round trip per row and is what
//! keeps per-row duplicate detection correct without extra locking.

use axum::{
    Extension, Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use chrono::Datelike;
use sea_orm::DatabaseConnection;
use std::collections::BTreeSet;
use std::io::Cursor;
use validator::Validate;

use util::state::AppState;

use crate::{auth::AuthUser, response::ApiResponse, routes::common::format_validation_errors};

use super::common::{
    BulkGenerateRequest, DATE_REGEX, ImportResult, ImportedShow, SHOW_TIME_REGEX, parse_date_only,
    to_hhmm,
};
use db::models::show::Model as ShowModel;

/// A time-like cell from an uploaded file. Spreadsheet cells carry numbers
/// (fractional-day serials); CSV fields are always text.
#[derive(Debug, Clone)]
pub enum RawTime {
    Text(String),
    Number(f64),
}

lazy_static::lazy_static! {
    static ref H24_REGEX: regex::Regex =
        regex::Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").unwrap();
    static ref H12_REGEX: regex::Regex =
        regex::Regex::new(r"(?i)^(\d{1,2}):(\d{2})\s*(am|pm)?$").unwrap();
}

/// Aliases accepted for the date and time-like columns, matched exactly.
const DATE_ALIASES: &[&str] = &["date", "Date", "DATE"];
const TIME_ALIASES: &[&str] = &[
    "showTime", "show_time", "ShowTime", "time", "Time", "label", "Label", "name", "Name",
];

/// Normalizes an imported time-like value to zero-padded `HH:mm`.
///
/// Tried in order: legacy text labels, numeric fractional-day serial,
/// 24-hour `HH:mm[:ss]`, 12-hour `HH:mm am|pm`. Values failing every form
/// yield `None` and the row is dropped.
pub fn normalize_show_time(value: &RawTime) -> Option<String> {
    let s = match value {
        RawTime::Text(s) => s.trim().to_string(),
        RawTime::Number(n) => {
            if !n.is_nan() {
                let fraction = if *n >= 1.0 { n % 1.0 } else { *n };
                if (0.0..1.0).contains(&fraction) {
                    let total_minutes = ((fraction * 24.0 * 60.0).round() as i64) % (24 * 60);
                    let h = total_minutes / 60;
                    let m = total_minutes % 60;
                    return Some(format!("{:02}:{:02}", h, m));
                }
            }
            return None;
        }
    };
    if s.is_empty() {
        return None;
    }

    match s.to_lowercase().as_str() {
        "matinee" => return Some("14:00".into()),
        "evening" => return Some("19:00".into()),
        "noon" => return Some("12:00".into()),
        "midnight" => return Some("00:00".into()),
        _ => {}
    }

    if let Some(caps) = H24_REGEX.captures(&s) {
        let h: u32 = caps[1].parse().ok()?;
        if h <= 23 {
            return Some(format!("{:02}:{}", h, &caps[2]));
        }
        return None;
    }

    if let Some(caps) = H12_REGEX.captures(&s) {
        let mut h: u32 = caps[1].parse().ok()?;
        let ampm = caps
            .get(3)
            .map(|m| m.as_str().to_lowercase())
            .unwrap_or_default();
        if ampm == "pm" && h < 12 {
            h += 12;
        }
        if ampm == "am" && h == 12 {
            h = 0;
        }
        if h <= 23 {
            return Some(format!("{:02}:{}", h, &caps[2]));
        }
    }

    None
}

fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| h == alias))
}

/// Extracts `(date, show_time)` candidate rows from CSV bytes. Rows without
/// both columns, or whose time fails normalization, are omitted.
fn rows_from_csv(bytes: &[u8]) -> Result<Vec<ImportedShow>, String> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);
    let headers: Vec<String> = rdr
        .headers()
        .map_err(|_| "Could not read CSV header row".to_string())?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let date_idx = find_column(&headers, DATE_ALIASES);
    let time_idx = find_column(&headers, TIME_ALIASES);

    let mut rows = Vec::new();
    let (Some(date_idx), Some(time_idx)) = (date_idx, time_idx) else {
        return Ok(rows);
    };

    for record in rdr.records() {
        let Ok(record) = record else { continue };
        let Some(date) = record.get(date_idx).map(str::trim).filter(|s| !s.is_empty()) else {
            continue;
        };
        let raw = RawTime::Text(record.get(time_idx).unwrap_or_default().to_string());
        let Some(show_time) = normalize_show_time(&raw) else {
            continue;
        };
        if SHOW_TIME_REGEX.is_match(&show_time) {
            rows.push(ImportedShow {
                date: date.to_string(),
                show_time,
            });
        }
    }
    Ok(rows)
}

/// Extracts candidate rows from the first sheet of an Excel workbook.
fn rows_from_workbook(bytes: &[u8]) -> Result<Vec<ImportedShow>, String> {
    use calamine::{Data, Reader};

    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|_| "Could not read workbook".to_string())?;

    let sheet_names = workbook.sheet_names().to_vec();
    let first = sheet_names
        .first()
        .ok_or_else(|| "Workbook has no sheets".to_string())?;
    let range = workbook
        .worksheet_range(first)
        .map_err(|_| "Could not read first sheet".to_string())?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(row) => row.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => return Ok(Vec::new()),
    };

    let date_idx = find_column(&headers, DATE_ALIASES);
    let time_idx = find_column(&headers, TIME_ALIASES);

    let mut rows = Vec::new();
    let (Some(date_idx), Some(time_idx)) = (date_idx, time_idx) else {
        return Ok(rows);
    };

    for row in rows_iter {
        let date = row
            .get(date_idx)
            .map(|c| c.to_string().trim().to_string())
            .unwrap_or_default();
        if date.is_empty() {
            continue;
        }
        let raw = match row.get(time_idx) {
            Some(Data::Float(f)) => RawTime::Number(*f),
            Some(Data::Int(i)) => RawTime::Number(*i as f64),
            Some(Data::DateTime(dt)) => RawTime::Number(dt.as_f64()),
            Some(cell) => RawTime::Text(cell.to_string()),
            None => continue,
        };
        let Some(show_time) = normalize_show_time(&raw) else {
            continue;
        };
        if SHOW_TIME_REGEX.is_match(&show_time) {
            rows.push(ImportedShow { date, show_time });
        }
    }
    Ok(rows)
}

/// Runs the sequential duplicate-check-then-insert loop over candidate
/// rows. Rows with malformed dates are dropped silently, omitted from both
/// counts. An existing `(org, date, show_time)` match is always reported in
/// `skipped_shows`; nothing is ever created twice.
async fn create_rows(
    db: &DatabaseConnection,
    org_id: i64,
    rows: Vec<ImportedShow>,
) -> Result<ImportResult, sea_orm::DbErr> {
    let mut result = ImportResult::default();

    for row in rows {
        if !DATE_REGEX.is_match(&row.date) {
            continue;
        }
        let Some(date) = parse_date_only(&row.date) else {
            continue;
        };
        let show_time = to_hhmm(&row.show_time);

        let existing = ShowModel::find_by_org_date_time(db, org_id, date, &show_time).await?;
        if existing.is_some() {
            result.skipped_shows.push(ImportedShow {
                date: row.date,
                show_time,
            });
        } else {
            ShowModel::create(db, org_id, date, &show_time).await?;
            result.created_shows.push(ImportedShow {
                date: row.date,
                show_time,
            });
        }
    }

    result.created_count = result.created_shows.len();
    result.skipped_count = result.skipped_shows.len();
    Ok(result)
}

/// POST `/api/shows/import`
///
/// Multipart upload: a `file` field (CSV or Excel) plus an optional
/// `skip_duplicates` text field. Malformed rows are dropped softly; an
/// unsupported container format is a hard 400. The `skip_duplicates` flag is
/// accepted for compatibility; duplicates are always reported as skipped.
pub async fn import_shows(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    mut multipart: Multipart,
) -> (StatusCode, Json<ApiResponse<Option<ImportResult>>>) {
    let db = state.db();

    let mut file_name: Option<String> = None;
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut _skip_duplicates = true;

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("file") => {
                file_name = field.file_name().map(|n| n.to_lowercase());
                file_bytes = field.bytes().await.ok().map(|b| b.to_vec());
            }
            Some("skip_duplicates") => {
                _skip_duplicates = field.text().await.unwrap_or_else(|_| "true".into()) == "true";
            }
            _ => {}
        }
    }

    let (Some(name), Some(bytes)) = (file_name, file_bytes) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("No file uploaded")),
        );
    };

    let parsed = if name.ends_with(".csv") {
        rows_from_csv(&bytes)
    } else if name.ends_with(".xlsx") || name.ends_with(".xls") {
        rows_from_workbook(&bytes)
    } else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                "Unsupported format. Use CSV or Excel (.xlsx, .xls)",
            )),
        );
    };

    let rows = match parsed {
        Ok(rows) => rows,
        Err(msg) => return (StatusCode::BAD_REQUEST, Json(ApiResponse::error(msg))),
    };

    match create_rows(db, claims.org_id, rows).await {
        Ok(result) => (
            StatusCode::OK,
            Json(ApiResponse::success(Some(result), "Import complete")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "show import failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Import failed")),
            )
        }
    }
}

/// POST `/api/shows/bulk-generate`
///
/// Generates shows from a weekday-to-times template over an inclusive date
/// range of at most 366 days. Times are normalized, deduplicated, and
/// sorted per weekday before generation.
pub async fn bulk_generate(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<BulkGenerateRequest>,
) -> (StatusCode, Json<ApiResponse<Option<ImportResult>>>) {
    let db = state.db();

    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format_validation_errors(
                &validation_errors,
            ))),
        );
    }

    let (Some(start), Some(end)) = (
        parse_date_only(&req.start_date),
        parse_date_only(&req.end_date),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Dates must be real calendar days")),
        );
    };

    if start > end {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Start date must be on or before end date")),
        );
    }
    let span_days = (end - start).num_days() + 1;
    if span_days > 366 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Date range cannot exceed 1 year")),
        );
    }

    // weekday index -> normalized, deduplicated, sorted times
    let mut weekday_times: [Vec<String>; 7] = Default::default();
    for (raw_key, raw_times) in &req.weekday_times {
        let Ok(key @ 0..=6) = raw_key.parse::<usize>() else {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(
                    "Weekday keys must be 0-6 (Sunday-Saturday)",
                )),
            );
        };
        let mut unique = BTreeSet::new();
        for time in raw_times {
            if !SHOW_TIME_REGEX.is_match(time) {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::error("Time must be HH:mm or HH:mm:ss")),
                );
            }
            unique.insert(to_hhmm(time));
        }
        weekday_times[key] = unique.into_iter().collect();
    }

    let mut rows = Vec::new();
    let mut day = start;
    while day <= end {
        let weekday = day.weekday().num_days_from_sunday() as usize;
        for show_time in &weekday_times[weekday] {
            rows.push(ImportedShow {
                date: day.format("%Y-%m-%d").to_string(),
                show_time: show_time.clone(),
            });
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    match create_rows(db, claims.org_id, rows).await {
        Ok(result) => (
            StatusCode::OK,
            Json(ApiResponse::success(Some(result), "Shows generated")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "bulk generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Bulk generation failed")),
            )
        }
    }
}
