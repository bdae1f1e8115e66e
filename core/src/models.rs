use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

// --- Weight tracking types ---

#[derive(Debug, Clone, Serialize)]
pub struct WeightEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub weight: f64,
}

#[derive(Debug, Clone)]
pub struct NewWeightEntry {
    pub date: NaiveDate,
    pub weight: f64,
}

// --- Meal types ---

/// Time-of-day slot a meal item is filed under. Ordered breakfast < lunch < dinner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            _ => bail!(
                "Invalid meal type '{s}'. Must be one of: {}",
                MealType::ALL.map(MealType::as_str).join(", ")
            ),
        }
    }
}

/// Optional nutrient quantities. `None` means "not tracked", which is not the same as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub sugars: Option<f64>,
    pub carbs: Option<f64>,
}

impl Nutrients {
    pub const NAMES: [&'static str; 5] = ["calories", "protein", "fat", "sugars", "carbs"];

    /// Values in the same order as [`Nutrients::NAMES`].
    #[must_use]
    pub fn values(&self) -> [Option<f64>; 5] {
        [
            self.calories,
            self.protein,
            self.fat,
            self.sugars,
            self.carbs,
        ]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values().iter().all(Option::is_none)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MealItem {
    pub id: i64,
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub food_name: String,
    #[serde(flatten)]
    pub nutrients: Nutrients,
}

#[derive(Debug, Clone)]
pub struct NewMealItem {
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub food_name: String,
    pub nutrients: Nutrients,
}

// --- Field parsing ---

/// Dates are stored as `YYYY-MM-DD` text and compared as strings, so only
/// four-digit years keep their order.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 0..=9999;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let date = NaiveDate::parse_from_str(s, DATE_FORMAT)
        .with_context(|| format!("Invalid date '{s}'. Use YYYY-MM-DD"))?;
    if !YEAR_RANGE.contains(&date.year()) {
        bail!("Invalid date '{s}'. Year must be between 0000 and 9999");
    }
    Ok(date)
}

/// Parse an optional nutrient field. Blank, unparseable, non-finite or negative input is absent.
#[must_use]
pub fn parse_optional_quantity(value: Option<&str>) -> Option<f64> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

pub fn parse_required_number(field: &str, value: &str) -> Result<f64> {
    let trimmed = value.trim();
    let parsed: f64 = trimmed
        .parse()
        .with_context(|| format!("Invalid {field} '{trimmed}'. Must be a number"))?;
    if !parsed.is_finite() {
        bail!("Invalid {field} '{trimmed}'. Must be a finite number");
    }
    Ok(parsed)
}

pub fn validate_weight(weight: f64) -> Result<f64> {
    if !weight.is_finite() {
        bail!("Weight must be a finite number");
    }
    if weight <= 0.0 {
        bail!("Weight must be greater than 0");
    }
    Ok(weight)
}

pub fn validate_food_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        bail!("Food name must not be empty");
    }
    Ok(trimmed.to_string())
}
