pub mod error;
pub mod uploads;
