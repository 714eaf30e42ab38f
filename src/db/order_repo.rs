// src/db/order_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        listing::ListingUnit,
        order::{DeliveryType, Order, OrderStatus},
    },
};

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_farmer(&self, farmer_id: Uuid) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE farmer_id = $1 ORDER BY created_at DESC",
        )
        .bind(farmer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    pub async fn list_by_wholesaler(&self, wholesaler_id: Uuid) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE wholesaler_id = $1 ORDER BY created_at DESC",
        )
        .bind(wholesaler_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    /// Versão com lock de linha, para a transição de status não competir
    /// com outra atualização concorrente do mesmo pedido.
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    // O total chega pronto: o service calcula quantity * price_per_unit
    // dentro da mesma transação que reserva o estoque.
    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        farmer_id: Uuid,
        farmer_name: &str,
        wholesaler_id: Uuid,
        wholesaler_name: &str,
        crop_listing_id: Option<Uuid>,
        crop_name: &str,
        quantity: Decimal,
        unit: ListingUnit,
        price_per_unit: Decimal,
        total_price: Decimal,
        delivery_type: DeliveryType,
        location: &str,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Status sempre nasce 'Pending'
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders
                (farmer_id, farmer_name, wholesaler_id, wholesaler_name, crop_listing_id,
                 crop_name, quantity, unit, price_per_unit, total_price,
                 delivery_type, status, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'Pending', $12)
            RETURNING *
            "#,
        )
        .bind(farmer_id)
        .bind(farmer_name)
        .bind(wholesaler_id)
        .bind(wholesaler_name)
        .bind(crop_listing_id)
        .bind(crop_name)
        .bind(quantity)
        .bind(unit)
        .bind(price_per_unit)
        .bind(total_price)
        .bind(delivery_type)
        .bind(location)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }
}
