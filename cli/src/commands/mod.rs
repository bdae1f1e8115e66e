mod helpers;
mod meal;
mod target;
mod week;
mod weight;

pub(crate) use meal::{cmd_meal_add, cmd_meal_delete};
pub(crate) use target::{cmd_target_set, cmd_target_show};
pub(crate) use week::cmd_week;
pub(crate) use weight::{cmd_weight_history, cmd_weight_log};
