pub mod user_repo;
pub use user_repo::UserRepository;
pub mod listing_repo;
pub use listing_repo::ListingRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
