use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use foodfit_core::db::Database;
use foodfit_core::models::{DATE_FORMAT, NewWeightEntry, validate_weight};

use super::helpers::parse_date;
use crate::view::fmt_quantity;

pub(crate) fn cmd_weight_log(
    db: &Database,
    value: f64,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let weight = validate_weight(value)?;
    let date = parse_date(date)?;

    let result = db.upsert_weight(&NewWeightEntry { date, weight })?;
    tracing::info!(date = %result.date, weight = result.weight, "weight logged");

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Logged {} for {}",
            fmt_quantity(Some(result.weight)),
            result.date.format(DATE_FORMAT)
        );
    }

    Ok(())
}

pub(crate) fn cmd_weight_history(db: &Database, json: bool) -> Result<()> {
    let entries = db.get_weight_history()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        eprintln!("No weight entries found. Use `foodfit weight log` to record your weight.");
    } else {
        #[derive(Tabled)]
        struct WeightRow {
            #[tabled(rename = "Date")]
            date: String,
            #[tabled(rename = "Weight")]
            weight: String,
        }

        let rows: Vec<WeightRow> = entries
            .iter()
            .map(|e| WeightRow {
                date: e.date.format(DATE_FORMAT).to_string(),
                weight: fmt_quantity(Some(e.weight)),
            })
            .collect();

        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..2)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }

    Ok(())
}
