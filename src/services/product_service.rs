// src/services/product_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProductRepository,
    models::{
        auth::User,
        product::{Product, ProductKind},
    },
    services::listing_service::ensure_owner,
};

#[derive(Clone)]
pub struct ProductService {
    product_repo: ProductRepository,
    pool: PgPool,
}

impl ProductService {
    pub fn new(product_repo: ProductRepository, pool: PgPool) -> Self {
        Self { product_repo, pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Product>, AppError> {
        self.product_repo.list_all().await
    }

    pub async fn my_products(&self, farmer: &User) -> Result<Vec<Product>, AppError> {
        self.product_repo.list_by_farmer(farmer.id).await
    }

    pub async fn create_product(
        &self,
        farmer: &User,
        name: &str,
        kind: ProductKind,
        quantity: Decimal,
        price: Decimal,
        image: &str,
    ) -> Result<Product, AppError> {
        self.product_repo
            .create(&self.pool, farmer.id, &farmer.name, name, kind, quantity, price, image)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_product(
        &self,
        user: &User,
        id: Uuid,
        name: &str,
        kind: ProductKind,
        quantity: Decimal,
        price: Decimal,
        image: &str,
    ) -> Result<Product, AppError> {
        let product = self
            .product_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        ensure_owner(user, product.farmer_id)?;

        self.product_repo
            .update(&self.pool, id, name, kind, quantity, price, image)
            .await
    }

    pub async fn delete_product(&self, user: &User, id: Uuid) -> Result<(), AppError> {
        let product = self
            .product_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        ensure_owner(user, product.farmer_id)?;

        self.product_repo.delete(&self.pool, id).await?;
        Ok(())
    }
}
