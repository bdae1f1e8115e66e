pub mod db;
pub mod models;
pub mod summary;
pub mod week;
