use anyhow::Result;

use foodfit_core::db::Database;
use foodfit_core::models::validate_weight;

use crate::view::fmt_quantity;

pub(crate) fn cmd_target_set(db: &Database, value: f64, json: bool) -> Result<()> {
    let target = validate_weight(value)?;
    db.set_target_weight(target)?;
    tracing::info!(target_weight = target, "target weight set");

    if json {
        println!("{}", serde_json::json!({ "target_weight": target }));
    } else {
        println!("Target weight set to {}", fmt_quantity(Some(target)));
    }

    Ok(())
}

pub(crate) fn cmd_target_show(db: &Database, json: bool) -> Result<()> {
    let target = db.get_target_weight()?;

    if json {
        println!("{}", serde_json::json!({ "target_weight": target }));
    } else if let Some(t) = target {
        println!("Target weight: {}", fmt_quantity(Some(t)));
    } else {
        eprintln!("No target set. Use `foodfit target set <weight>` to set one.");
    }

    Ok(())
}
