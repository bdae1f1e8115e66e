use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, params};

use crate::models::{
    DATE_FORMAT, MealItem, MealType, NewMealItem, NewWeightEntry, Nutrients, WeightEntry,
};
use crate::summary::{WeekSummary, summarize_week};
use crate::week::WeekWindow;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    // Every step is IF NOT EXISTS: files written by the weights-only and
    // weights+settings layouts carry user_version 0 but already hold those tables.
    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS weights (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    entry_date TEXT NOT NULL UNIQUE,
                    weight REAL NOT NULL
                );

                PRAGMA user_version = 1;",
            )?;
        }

        if version < 2 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS user_settings (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    target_weight REAL
                );

                PRAGMA user_version = 2;",
            )?;
        }

        if version < 3 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS meal_items (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    entry_date TEXT NOT NULL,
                    meal_type TEXT NOT NULL CHECK (meal_type IN ('breakfast', 'lunch', 'dinner')),
                    food_name TEXT NOT NULL,
                    calories REAL,
                    protein REAL,
                    fat REAL,
                    sugars REAL,
                    carbs REAL
                );

                CREATE INDEX IF NOT EXISTS idx_meal_items_date ON meal_items(entry_date);

                PRAGMA user_version = 3;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn date_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
        let raw: String = row.get(idx)?;
        NaiveDate::parse_from_str(&raw, DATE_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    fn weight_entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<WeightEntry> {
        Ok(WeightEntry {
            id: row.get(0)?,
            date: Self::date_column(row, 1)?,
            weight: row.get(2)?,
        })
    }

    // Expects columns:
    // 0: id, 1: entry_date, 2: meal_type, 3: food_name,
    // 4: calories, 5: protein, 6: fat, 7: sugars, 8: carbs
    fn meal_item_from_row(row: &rusqlite::Row) -> rusqlite::Result<MealItem> {
        let meal_type: String = row.get(2)?;
        let meal_type = meal_type
            .parse::<MealType>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into()))?;
        Ok(MealItem {
            id: row.get(0)?,
            date: Self::date_column(row, 1)?,
            meal_type,
            food_name: row.get(3)?,
            nutrients: Nutrients {
                calories: row.get(4)?,
                protein: row.get(5)?,
                fat: row.get(6)?,
                sugars: row.get(7)?,
                carbs: row.get(8)?,
            },
        })
    }

    // --- Weights ---

    pub fn upsert_weight(&self, entry: &NewWeightEntry) -> Result<WeightEntry> {
        let date_str = entry.date.format(DATE_FORMAT).to_string();
        self.conn.execute(
            "INSERT INTO weights (entry_date, weight)
             VALUES (?1, ?2)
             ON CONFLICT(entry_date) DO UPDATE SET weight = excluded.weight",
            params![date_str, entry.weight],
        )?;
        self.get_weight(entry.date)?
            .context("Weight entry not found after upsert")
    }

    pub fn get_weight(&self, date: NaiveDate) -> Result<Option<WeightEntry>> {
        let date_str = date.format(DATE_FORMAT).to_string();
        let mut stmt = self
            .conn
            .prepare("SELECT id, entry_date, weight FROM weights WHERE entry_date = ?1")?;
        let mut rows = stmt.query(params![date_str])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::weight_entry_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Every weight entry ever logged, oldest first.
    pub fn get_weight_history(&self) -> Result<Vec<WeightEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, entry_date, weight FROM weights ORDER BY entry_date")?;
        let entries = stmt
            .query_map([], Self::weight_entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // --- Target weight ---

    pub fn set_target_weight(&self, target: f64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO user_settings (id, target_weight)
             VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET target_weight = excluded.target_weight",
            params![target],
        )?;
        Ok(())
    }

    pub fn get_target_weight(&self) -> Result<Option<f64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT target_weight FROM user_settings WHERE id = 1")?;
        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            Ok(row.get(0)?)
        } else {
            Ok(None)
        }
    }

    // --- Meal items ---

    pub fn insert_meal_item(&self, item: &NewMealItem) -> Result<MealItem> {
        let date_str = item.date.format(DATE_FORMAT).to_string();
        let n = &item.nutrients;
        self.conn.execute(
            "INSERT INTO meal_items (entry_date, meal_type, food_name, calories, protein, fat, sugars, carbs)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                date_str,
                item.meal_type.as_str(),
                item.food_name,
                n.calories,
                n.protein,
                n.fat,
                n.sugars,
                n.carbs,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_meal_item(id)
    }

    pub fn get_meal_item(&self, id: i64) -> Result<MealItem> {
        self.conn
            .query_row(
                "SELECT id, entry_date, meal_type, food_name, calories, protein, fat, sugars, carbs
                 FROM meal_items WHERE id = ?1",
                params![id],
                Self::meal_item_from_row,
            )
            .context("Meal item not found")
    }

    /// Returns whether a row was removed. An unknown id is not an error.
    pub fn delete_meal_item(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM meal_items WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    /// Items dated within `[start, end]`, ordered by date, meal slot, then id.
    pub fn get_meal_items_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<MealItem>> {
        let start_str = start.format(DATE_FORMAT).to_string();
        let end_str = end.format(DATE_FORMAT).to_string();
        let mut stmt = self.conn.prepare(
            "SELECT id, entry_date, meal_type, food_name, calories, protein, fat, sugars, carbs
             FROM meal_items
             WHERE entry_date >= ?1 AND entry_date <= ?2
             ORDER BY entry_date,
                      CASE meal_type WHEN 'breakfast' THEN 0 WHEN 'lunch' THEN 1 ELSE 2 END,
                      id",
        )?;
        let items = stmt
            .query_map(params![start_str, end_str], Self::meal_item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn build_week_summary(&self, window: WeekWindow) -> Result<WeekSummary> {
        let items = self.get_meal_items_between(window.start, window.end)?;
        Ok(summarize_week(window, items))
    }
}
