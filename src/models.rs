pub mod auth;
pub mod listing;
pub mod order;
pub mod product;
