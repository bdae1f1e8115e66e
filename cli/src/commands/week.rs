use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use foodfit_core::db::Database;
use foodfit_core::models::{DATE_FORMAT, Nutrients};
use foodfit_core::summary::{DaySummary, WeekSummary};
use foodfit_core::week::today;

use super::helpers::{truncate, week_for_arg};
use crate::view::{ABSENT, fmt_quantity};

#[derive(Tabled)]
struct WeekRow {
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Meal")]
    meal: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Food")]
    food: String,
    #[tabled(rename = "Cal")]
    calories: String,
    #[tabled(rename = "Protein")]
    protein: String,
    #[tabled(rename = "Fat")]
    fat: String,
    #[tabled(rename = "Sugars")]
    sugars: String,
    #[tabled(rename = "Carbs")]
    carbs: String,
}

impl WeekRow {
    fn new(day: &str, meal: &str, id: String, food: String, n: &Nutrients) -> Self {
        let [calories, protein, fat, sugars, carbs] = n.values().map(fmt_quantity);
        WeekRow {
            day: day.to_string(),
            meal: meal.to_string(),
            id,
            food,
            calories,
            protein,
            fat,
            sugars,
            carbs,
        }
    }
}

fn day_rows(day: &DaySummary) -> Vec<WeekRow> {
    let mut rows = Vec::new();
    for bucket in &day.meals {
        for item in &bucket.items {
            rows.push(WeekRow::new(
                &day.label,
                bucket.meal_type.label(),
                item.id.to_string(),
                truncate(&item.food_name, 30),
                &item.nutrients,
            ));
        }
    }
    if rows.is_empty() {
        rows.push(WeekRow::new(
            &day.label,
            ABSENT,
            String::new(),
            "(nothing logged)".to_string(),
            &day.totals,
        ));
    } else {
        rows.push(WeekRow::new(
            &day.label,
            "Total",
            String::new(),
            String::new(),
            &day.totals,
        ));
    }
    rows
}

fn print_week(week: &WeekSummary) {
    let window = week.window;
    println!(
        "Week of {} to {}",
        window.start.format(DATE_FORMAT),
        window.end.format(DATE_FORMAT)
    );

    let rows: Vec<WeekRow> = week.days.iter().flat_map(day_rows).collect();
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(4..9)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn cmd_week(db: &Database, date: Option<&str>, json: bool) -> Result<()> {
    let window = week_for_arg(date, today());
    let week = db.build_week_summary(window)?;
    tracing::debug!(week_start = %window.start, "showing week");

    if json {
        println!("{}", serde_json::to_string_pretty(&week)?);
    } else {
        print_week(&week);
    }

    Ok(())
}
