use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{MealItem, MealType, Nutrients};
use crate::week::WeekWindow;

/// Running total over the values that are actually present.
#[derive(Debug, Clone, Copy, Default)]
struct PresentSum {
    seen: usize,
    sum: f64,
}

impl PresentSum {
    fn add(self, value: Option<f64>) -> Self {
        match value {
            Some(v) => Self {
                seen: self.seen + 1,
                sum: self.sum + v,
            },
            None => self,
        }
    }

    fn finish(self) -> Option<f64> {
        (self.seen > 0).then_some(self.sum)
    }
}

impl Nutrients {
    /// Sum each field over the items that recorded it. A field nobody recorded stays absent.
    #[must_use]
    pub fn total<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a Nutrients>,
    {
        let mut acc = [PresentSum::default(); 5];
        for n in items {
            for (slot, value) in acc.iter_mut().zip(n.values()) {
                *slot = slot.add(value);
            }
        }
        let [calories, protein, fat, sugars, carbs] = acc.map(PresentSum::finish);
        Self {
            calories,
            protein,
            fat,
            sugars,
            carbs,
        }
    }

    /// Field-wise addition where absent is the identity.
    #[must_use]
    pub fn combine(self, other: Nutrients) -> Nutrients {
        Nutrients::total([&self, &other])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    pub date: NaiveDate,
    pub meal_type: MealType,
}

impl BucketKey {
    #[must_use]
    pub fn of(item: &MealItem) -> Self {
        Self {
            date: item.date,
            meal_type: item.meal_type,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MealBucket {
    pub meal_type: MealType,
    pub items: Vec<MealItem>,
    pub totals: Nutrients,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub label: String,
    pub meals: Vec<MealBucket>,
    pub totals: Nutrients,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekSummary {
    pub window: WeekWindow,
    pub days: Vec<DaySummary>,
}

/// Group items by (date, meal slot), keeping their incoming order inside each group.
#[must_use]
pub fn group_items(items: Vec<MealItem>) -> BTreeMap<BucketKey, Vec<MealItem>> {
    let mut buckets: BTreeMap<BucketKey, Vec<MealItem>> = BTreeMap::new();
    for item in items {
        buckets.entry(BucketKey::of(&item)).or_default().push(item);
    }
    buckets
}

#[must_use]
pub fn day_label(date: NaiveDate) -> String {
    date.format("%A, %b %-d").to_string()
}

/// Build the seven-day view for `window`. Items dated outside the window are dropped.
#[must_use]
pub fn summarize_week(window: WeekWindow, items: Vec<MealItem>) -> WeekSummary {
    let mut buckets = group_items(items);

    let days = window
        .days()
        .map(|date| {
            let meals: Vec<MealBucket> = MealType::ALL
                .iter()
                .map(|&meal_type| {
                    let items = buckets
                        .remove(&BucketKey { date, meal_type })
                        .unwrap_or_default();
                    let totals = Nutrients::total(items.iter().map(|i| &i.nutrients));
                    MealBucket {
                        meal_type,
                        items,
                        totals,
                    }
                })
                .collect();

            let totals = Nutrients::total(
                meals
                    .iter()
                    .flat_map(|m| m.items.iter())
                    .map(|i| &i.nutrients),
            );

            DaySummary {
                date,
                label: day_label(date),
                meals,
                totals,
            }
        })
        .collect();

    WeekSummary { window, days }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(id: i64, date: NaiveDate, meal_type: MealType, nutrients: Nutrients) -> MealItem {
        MealItem {
            id,
            date,
            meal_type,
            food_name: format!("food {id}"),
            nutrients,
        }
    }

    fn calories(v: f64) -> Nutrients {
        Nutrients {
            calories: Some(v),
            ..Nutrients::default()
        }
    }

    #[test]
    fn test_total_of_nothing_is_all_absent() {
        let totals = Nutrients::total(std::iter::empty());
        assert_eq!(totals, Nutrients::default());
        assert!(totals.is_empty());
    }

    #[test]
    fn test_total_calories_only() {
        let items = [calories(120.0), calories(80.0)];
        let totals = Nutrients::total(&items);
        assert_eq!(totals.calories, Some(200.0));
        assert_eq!(totals.protein, None);
        assert_eq!(totals.fat, None);
        assert_eq!(totals.sugars, None);
        assert_eq!(totals.carbs, None);
    }

    #[test]
    fn test_recorded_zero_is_not_absent() {
        let items = [Nutrients {
            fat: Some(0.0),
            ..Nutrients::default()
        }];
        assert_eq!(Nutrients::total(&items).fat, Some(0.0));
    }

    #[test]
    fn test_combine_treats_absent_as_identity() {
        let a = Nutrients {
            calories: Some(100.0),
            protein: None,
            ..Nutrients::default()
        };
        let b = Nutrients {
            calories: Some(50.0),
            protein: Some(4.0),
            ..Nutrients::default()
        };
        let c = a.combine(b);
        assert_eq!(c.calories, Some(150.0));
        assert_eq!(c.protein, Some(4.0));
        assert_eq!(c.fat, None);
    }

    #[test]
    fn test_breakfast_example_bucket() {
        let monday = ymd(2024, 3, 11);
        let items = vec![
            item(1, monday, MealType::Breakfast, calories(300.0)),
            item(
                2,
                monday,
                MealType::Breakfast,
                Nutrients {
                    calories: Some(150.0),
                    protein: Some(10.0),
                    ..Nutrients::default()
                },
            ),
        ];
        let week = summarize_week(WeekWindow::containing(monday), items);
        let breakfast = &week.days[0].meals[0];
        assert_eq!(breakfast.meal_type, MealType::Breakfast);
        assert_eq!(breakfast.items.len(), 2);
        assert_eq!(
            breakfast.totals,
            Nutrients {
                calories: Some(450.0),
                protein: Some(10.0),
                fat: None,
                sugars: None,
                carbs: None,
            }
        );
    }

    #[test]
    fn test_week_has_seven_days_with_every_slot() {
        let week = summarize_week(WeekWindow::containing(ymd(2024, 3, 14)), Vec::new());
        assert_eq!(week.days.len(), 7);
        for day in &week.days {
            let slots: Vec<MealType> = day.meals.iter().map(|m| m.meal_type).collect();
            assert_eq!(slots, MealType::ALL.to_vec());
            assert!(day.meals.iter().all(|m| m.items.is_empty() && m.totals.is_empty()));
            assert!(day.totals.is_empty());
        }
        assert_eq!(week.days[0].date, ymd(2024, 3, 11));
        assert_eq!(week.days[0].label, "Monday, Mar 11");
    }

    #[test]
    fn test_day_totals_match_combined_slot_totals() {
        let tuesday = ymd(2024, 3, 12);
        let items = vec![
            item(1, tuesday, MealType::Breakfast, calories(250.0)),
            item(
                2,
                tuesday,
                MealType::Lunch,
                Nutrients {
                    protein: Some(30.0),
                    carbs: Some(45.5),
                    ..Nutrients::default()
                },
            ),
            item(
                3,
                tuesday,
                MealType::Dinner,
                Nutrients {
                    calories: Some(600.0),
                    sugars: Some(12.0),
                    ..Nutrients::default()
                },
            ),
        ];
        let week = summarize_week(WeekWindow::containing(tuesday), items);
        let day = &week.days[1];
        let combined = day
            .meals
            .iter()
            .fold(Nutrients::default(), |acc, m| acc.combine(m.totals));
        assert_eq!(day.totals, combined);
        assert_eq!(day.totals.calories, Some(850.0));
        assert_eq!(day.totals.protein, Some(30.0));
        assert_eq!(day.totals.fat, None);
        assert_eq!(day.totals.sugars, Some(12.0));
        assert_eq!(day.totals.carbs, Some(45.5));
    }

    #[test]
    fn test_bucket_preserves_retrieval_order() {
        let wednesday = ymd(2024, 3, 13);
        let items = vec![
            item(7, wednesday, MealType::Lunch, calories(1.0)),
            item(3, wednesday, MealType::Lunch, calories(2.0)),
            item(9, wednesday, MealType::Lunch, calories(3.0)),
        ];
        let buckets = group_items(items);
        let key = BucketKey {
            date: wednesday,
            meal_type: MealType::Lunch,
        };
        let ids: Vec<i64> = buckets[&key].iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![7, 3, 9]);
    }

    #[test]
    fn test_items_split_by_day_and_slot() {
        let monday = ymd(2024, 3, 11);
        let sunday = ymd(2024, 3, 17);
        let items = vec![
            item(1, monday, MealType::Dinner, calories(500.0)),
            item(2, sunday, MealType::Dinner, calories(700.0)),
        ];
        let week = summarize_week(WeekWindow::containing(monday), items);
        assert_eq!(week.days[0].meals[2].totals.calories, Some(500.0));
        assert_eq!(week.days[6].meals[2].totals.calories, Some(700.0));
        assert!(week.days[0].meals[0].items.is_empty());
        assert!(week.days[3].totals.is_empty());
    }

    #[test]
    fn test_items_outside_window_are_ignored() {
        let items = vec![item(1, ymd(2024, 3, 18), MealType::Lunch, calories(999.0))];
        let week = summarize_week(WeekWindow::containing(ymd(2024, 3, 11)), items);
        assert!(week.days.iter().all(|d| d.totals.is_empty()));
    }
}
