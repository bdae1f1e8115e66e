use anyhow::{Context, Result, bail};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

use foodfit_core::models;
use foodfit_core::week::{WeekWindow, resolve_week, today};

/// Relative date keywords accepted wherever a date argument is.
fn keyword_date(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    match s {
        "today" => Some(today),
        "yesterday" => Some(today - Duration::days(1)),
        "tomorrow" => Some(today + Duration::days(1)),
        _ => None,
    }
}

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    let today = today();
    match date_str {
        None => Ok(today),
        Some(s) => {
            let s = s.trim();
            if let Some(date) = keyword_date(s, today) {
                return Ok(date);
            }
            models::parse_date(s).context("Expected YYYY-MM-DD or today/yesterday/tomorrow")
        }
    }
}

/// Pick the week to show. Unlike [`parse_date`] this never fails: a malformed
/// argument shows the current week, the same as the web view.
pub(crate) fn week_for_arg(arg: Option<&str>, today: NaiveDate) -> WeekWindow {
    match arg.map(str::trim) {
        None => WeekWindow::containing(today),
        Some(s) => match keyword_date(s, today) {
            Some(date) => WeekWindow::containing(date),
            None => resolve_week(Some(s), today),
        },
    }
}

/// Nutrient flags from the command line must be real, non-negative numbers.
pub(crate) fn check_quantity(name: &str, value: Option<f64>) -> Result<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() => bail!("{name} must be a finite number"),
        Some(v) if v < 0.0 => bail!("{name} must not be negative"),
        other => Ok(other),
    }
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
