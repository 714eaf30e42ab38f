pub mod auth;
pub mod listing_service;
pub mod order_service;
pub mod product_service;
