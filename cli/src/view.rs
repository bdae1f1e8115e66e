use askama::Template;
use chrono::NaiveDate;

use foodfit_core::models::{DATE_FORMAT, MealType, Nutrients, WeightEntry};
use foodfit_core::summary::{DaySummary, MealBucket, WeekSummary};

/// Placeholder shown for a nutrient nobody recorded.
pub(crate) const ABSENT: &str = "-";

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

/// One decimal place, dropping a trailing `.0`.
pub(crate) fn fmt_quantity(value: Option<f64>) -> String {
    let Some(v) = value else {
        return ABSENT.to_string();
    };
    let text = format!("{:.1}", no_neg_zero(v));
    match text.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => text,
    }
}

pub(crate) fn nutrient_cells(n: &Nutrients) -> Vec<String> {
    n.values().into_iter().map(fmt_quantity).collect()
}

pub(crate) struct MealOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub(crate) struct ItemView {
    pub id: i64,
    pub food_name: String,
    pub cells: Vec<String>,
}

pub(crate) struct MealView {
    pub label: &'static str,
    pub items: Vec<ItemView>,
    pub cells: Vec<String>,
}

pub(crate) struct DayView {
    pub date: String,
    pub label: String,
    pub meals: Vec<MealView>,
    pub cells: Vec<String>,
}

pub(crate) struct WeightRow {
    pub date: String,
    pub weight: String,
}

#[derive(Template)]
#[template(path = "index.html")]
pub(crate) struct WeekPage {
    pub week_start: String,
    pub week_end: String,
    pub prev_week: String,
    pub next_week: String,
    pub default_entry_date: String,
    pub today: String,
    pub nutrient_names: [&'static str; 5],
    pub meal_options: Vec<MealOption>,
    pub days: Vec<DayView>,
    pub weights: Vec<WeightRow>,
    pub target_label: String,
}

fn iso(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl From<&MealBucket> for MealView {
    fn from(bucket: &MealBucket) -> Self {
        MealView {
            label: bucket.meal_type.label(),
            items: bucket
                .items
                .iter()
                .map(|item| ItemView {
                    id: item.id,
                    food_name: item.food_name.clone(),
                    cells: nutrient_cells(&item.nutrients),
                })
                .collect(),
            cells: nutrient_cells(&bucket.totals),
        }
    }
}

impl From<&DaySummary> for DayView {
    fn from(day: &DaySummary) -> Self {
        DayView {
            date: iso(day.date),
            label: day.label.clone(),
            meals: day.meals.iter().map(MealView::from).collect(),
            cells: nutrient_cells(&day.totals),
        }
    }
}

impl WeekPage {
    pub(crate) fn new(
        summary: &WeekSummary,
        weights: &[WeightEntry],
        target: Option<f64>,
        today: NaiveDate,
    ) -> Self {
        let window = summary.window;
        // New items default to today while viewing the current week.
        let default_entry_date = if window.contains(today) {
            today
        } else {
            window.start
        };

        WeekPage {
            week_start: iso(window.start),
            week_end: iso(window.end),
            prev_week: iso(window.previous_start),
            next_week: iso(window.next_start),
            default_entry_date: iso(default_entry_date),
            today: iso(today),
            nutrient_names: Nutrients::NAMES,
            meal_options: MealType::ALL
                .iter()
                .map(|m| MealOption {
                    value: m.as_str(),
                    label: m.label(),
                })
                .collect(),
            days: summary.days.iter().map(DayView::from).collect(),
            weights: weights
                .iter()
                .map(|w| WeightRow {
                    date: iso(w.date),
                    weight: fmt_quantity(Some(w.weight)),
                })
                .collect(),
            target_label: target.map_or_else(
                || "No target set".to_string(),
                |t| fmt_quantity(Some(t)),
            ),
        }
    }
}
