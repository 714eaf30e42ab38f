// src/db/listing_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::listing::{CropListing, ListingStatus, ListingUnit},
};

#[derive(Clone)]
pub struct ListingRepository {
    pool: PgPool,
}

impl ListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---
    // Funções de leitura são simples e usam a pool principal.

    /// Vitrine pública: só lotes com status 'available'.
    pub async fn list_available(&self) -> Result<Vec<CropListing>, AppError> {
        let listings = sqlx::query_as::<_, CropListing>(
            "SELECT * FROM crop_listings WHERE status = 'available' ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(listings)
    }

    /// Painel do produtor: todos os lotes dele, em qualquer status.
    pub async fn list_by_farmer(&self, farmer_id: Uuid) -> Result<Vec<CropListing>, AppError> {
        let listings = sqlx::query_as::<_, CropListing>(
            "SELECT * FROM crop_listings WHERE farmer_id = $1 ORDER BY created_at DESC",
        )
        .bind(farmer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(listings)
    }

    /// Busca com lock de linha, para uso dentro de uma transação
    /// (reserva de estoque na criação de pedido).
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<CropListing>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let listing =
            sqlx::query_as::<_, CropListing>("SELECT * FROM crop_listings WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(listing)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---
    // Estas usam o padrão genérico 'Executor' para rodar dentro de uma transação.

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        farmer_id: Uuid,
        farmer_name: &str,
        crop_name: &str,
        quantity: Decimal,
        unit: ListingUnit,
        truck_net_weight: Decimal,
        price_per_unit: Decimal,
        images: &[String],
        description: Option<&str>,
        location: &str,
    ) -> Result<CropListing, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Status sempre nasce 'available', sem exceção
        let listing = sqlx::query_as::<_, CropListing>(
            r#"
            INSERT INTO crop_listings
                (farmer_id, farmer_name, crop_name, quantity, unit,
                 truck_net_weight, price_per_unit, images, description, location, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'available')
            RETURNING *
            "#,
        )
        .bind(farmer_id)
        .bind(farmer_name)
        .bind(crop_name)
        .bind(quantity)
        .bind(unit)
        .bind(truck_net_weight)
        .bind(price_per_unit)
        .bind(images)
        .bind(description)
        .bind(location)
        .fetch_one(executor)
        .await?;

        Ok(listing)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: ListingStatus,
    ) -> Result<CropListing, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let listing = sqlx::query_as::<_, CropListing>(
            r#"
            UPDATE crop_listings
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(listing)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_full<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        crop_name: &str,
        quantity: Decimal,
        unit: ListingUnit,
        truck_net_weight: Decimal,
        price_per_unit: Decimal,
        images: &[String],
        description: Option<&str>,
        location: &str,
    ) -> Result<CropListing, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let listing = sqlx::query_as::<_, CropListing>(
            r#"
            UPDATE crop_listings
            SET crop_name = $2,
                quantity = $3,
                unit = $4,
                truck_net_weight = $5,
                price_per_unit = $6,
                images = $7,
                description = $8,
                location = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(crop_name)
        .bind(quantity)
        .bind(unit)
        .bind(truck_net_weight)
        .bind(price_per_unit)
        .bind(images)
        .bind(description)
        .bind(location)
        .fetch_one(executor)
        .await?;

        Ok(listing)
    }

    /// Baixa atômica de estoque dentro da transação do pedido: a quantidade
    /// nova e o status novo já foram decididos sob o lock de linha.
    pub async fn set_quantity_and_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        quantity: Decimal,
        status: ListingStatus,
    ) -> Result<CropListing, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let listing = sqlx::query_as::<_, CropListing>(
            r#"
            UPDATE crop_listings
            SET quantity = $2, status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(listing)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM crop_listings WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
