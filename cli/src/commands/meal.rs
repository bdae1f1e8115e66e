use anyhow::Result;

use foodfit_core::db::Database;
use foodfit_core::models::{
    DATE_FORMAT, MealType, NewMealItem, Nutrients, validate_food_name,
};

use super::helpers::{check_quantity, json_error, parse_date};
use crate::view::fmt_quantity;

pub(crate) fn cmd_meal_add(
    db: &Database,
    food: &str,
    meal: &str,
    date: Option<String>,
    nutrients: Nutrients,
    json: bool,
) -> Result<()> {
    let food_name = validate_food_name(food)?;
    let meal_type: MealType = meal.parse()?;
    let date = parse_date(date)?;

    let nutrients = Nutrients {
        calories: check_quantity("calories", nutrients.calories)?,
        protein: check_quantity("protein", nutrients.protein)?,
        fat: check_quantity("fat", nutrients.fat)?,
        sugars: check_quantity("sugars", nutrients.sugars)?,
        carbs: check_quantity("carbs", nutrients.carbs)?,
    };

    let item = db.insert_meal_item(&NewMealItem {
        date,
        meal_type,
        food_name,
        nutrients,
    })?;
    tracing::info!(id = item.id, date = %item.date, meal = %item.meal_type, "meal item added");

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        println!(
            "Added {} to {} on {} ({} cal) [id {}]",
            item.food_name,
            item.meal_type.label(),
            item.date.format(DATE_FORMAT),
            fmt_quantity(item.nutrients.calories),
            item.id
        );
    }

    Ok(())
}

/// Deleting an id that does not exist is reported but is not an error.
pub(crate) fn cmd_meal_delete(db: &Database, id: i64, json: bool) -> Result<()> {
    let removed = db.delete_meal_item(id)?;

    if json {
        if removed {
            println!("{}", serde_json::json!({ "deleted": id }));
        } else {
            println!("{}", json_error(&format!("No meal item with id {id}")));
        }
    } else if removed {
        tracing::info!(id, "meal item deleted");
        println!("Deleted meal item {id}");
    } else {
        eprintln!("No meal item with id {id}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn meal_item_count(db: &Database) -> usize {
        db.get_meal_items_between(ymd(0, 1, 1), ymd(9999, 12, 31))
            .unwrap()
            .len()
    }

    #[test]
    fn test_meal_add_stores_item() {
        let db = Database::open_in_memory().unwrap();
        let nutrients = Nutrients {
            calories: Some(410.0),
            carbs: Some(52.0),
            ..Nutrients::default()
        };
        cmd_meal_add(
            &db,
            " Burrito ",
            "Dinner",
            Some("2024-03-15".to_string()),
            nutrients,
            true,
        )
        .unwrap();

        let items = db
            .get_meal_items_between(ymd(2024, 3, 15), ymd(2024, 3, 15))
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].food_name, "Burrito");
        assert_eq!(items[0].meal_type, MealType::Dinner);
        assert_eq!(items[0].nutrients, nutrients);
    }

    #[test]
    fn test_meal_add_rejects_unknown_slot() {
        let db = Database::open_in_memory().unwrap();
        let err = cmd_meal_add(&db, "Crisps", "snack", None, Nutrients::default(), false)
            .unwrap_err();
        assert!(err.to_string().contains("Invalid meal type"));
        assert_eq!(meal_item_count(&db), 0);
    }

    #[test]
    fn test_meal_add_rejects_negative_nutrient() {
        let db = Database::open_in_memory().unwrap();
        let nutrients = Nutrients {
            protein: Some(-2.0),
            ..Nutrients::default()
        };
        assert!(cmd_meal_add(&db, "Tofu", "lunch", None, nutrients, false).is_err());
        assert_eq!(meal_item_count(&db), 0);
    }

    #[test]
    fn test_meal_delete_missing_is_ok() {
        let db = Database::open_in_memory().unwrap();
        cmd_meal_delete(&db, 77, false).unwrap();
        cmd_meal_delete(&db, 77, true).unwrap();
    }
}
