// src/services/listing_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ListingRepository,
    models::{
        auth::User,
        listing::{CropListing, ListingStatus, ListingUnit},
    },
};

#[derive(Clone)]
pub struct ListingService {
    listing_repo: ListingRepository,
    pool: PgPool,
}

impl ListingService {
    pub fn new(listing_repo: ListingRepository, pool: PgPool) -> Self {
        Self { listing_repo, pool }
    }

    pub async fn list_available(&self) -> Result<Vec<CropListing>, AppError> {
        self.listing_repo.list_available().await
    }

    pub async fn my_listings(&self, farmer: &User) -> Result<Vec<CropListing>, AppError> {
        self.listing_repo.list_by_farmer(farmer.id).await
    }

    // --- CREATE ---
    // O produtor vem do token; o nome gravado no lote é o nome dele no banco.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_listing(
        &self,
        farmer: &User,
        crop_name: &str,
        quantity: Decimal,
        unit: ListingUnit,
        truck_net_weight: Decimal,
        price_per_unit: Decimal,
        images: Vec<String>,
        description: Option<&str>,
        location: &str,
    ) -> Result<CropListing, AppError> {
        // Invariante: pelo menos uma foto na criação
        if images.is_empty() {
            return Err(AppError::NoImages);
        }

        self.listing_repo
            .create(
                &self.pool,
                farmer.id,
                &farmer.name,
                crop_name,
                quantity,
                unit,
                truck_net_weight,
                price_per_unit,
                &images,
                description,
                location,
            )
            .await
    }

    // --- UPDATE STATUS ---
    // Dono do lote + tabela de transições. O lock de linha garante que a
    // checagem e a escrita enxergam o mesmo estado.
    pub async fn update_status(
        &self,
        user: &User,
        id: Uuid,
        new_status: ListingStatus,
    ) -> Result<CropListing, AppError> {
        let mut tx = self.pool.begin().await?;

        let listing = self
            .listing_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::ListingNotFound)?;

        ensure_owner(user, listing.farmer_id)?;

        if !listing.status.can_transition_to(new_status) {
            return Err(AppError::InvalidStatusTransition {
                from: listing.status.to_string(),
                to: new_status.to_string(),
            });
        }

        let updated = self.listing_repo.update_status(&mut *tx, id, new_status).await?;
        tx.commit().await?;

        Ok(updated)
    }

    // --- UPDATE (COMPLETO) ---
    // As fotos novas já foram gravadas em disco pelo handler; aqui juntamos
    // com as que o cliente pediu para manter e validamos o conjunto final.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_listing(
        &self,
        user: &User,
        id: Uuid,
        crop_name: &str,
        quantity: Decimal,
        unit: ListingUnit,
        truck_net_weight: Decimal,
        price_per_unit: Decimal,
        kept_images: Vec<String>,
        new_images: Vec<String>,
        description: Option<&str>,
        location: &str,
    ) -> Result<CropListing, AppError> {
        let mut tx = self.pool.begin().await?;

        let listing = self
            .listing_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::ListingNotFound)?;

        ensure_owner(user, listing.farmer_id)?;

        // Só mantém fotos que realmente pertencem ao lote (o cliente não
        // pode "adotar" arquivos de outros lotes)
        let mut images: Vec<String> = kept_images
            .into_iter()
            .filter(|img| listing.images.contains(img))
            .collect();
        images.extend(new_images);

        if images.is_empty() {
            return Err(AppError::NoImages);
        }

        let updated = self
            .listing_repo
            .update_full(
                &mut *tx,
                id,
                crop_name,
                quantity,
                unit,
                truck_net_weight,
                price_per_unit,
                &images,
                description,
                location,
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    // --- DELETE ---
    pub async fn delete_listing(&self, user: &User, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let listing = self
            .listing_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::ListingNotFound)?;

        ensure_owner(user, listing.farmer_id)?;

        self.listing_repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(())
    }
}

// Checagem de posse: o ID vem do token validado, nunca do corpo da requisição.
pub(crate) fn ensure_owner(user: &User, owner_id: Uuid) -> Result<(), AppError> {
    if user.id != owner_id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use chrono::Utc;

    fn farmer(id: Uuid) -> User {
        User {
            id,
            name: "João".into(),
            email: "joao@exemplo.com".into(),
            password_hash: String::new(),
            role: Role::Farmer,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn dono_passa_na_checagem() {
        let id = Uuid::new_v4();
        assert!(ensure_owner(&farmer(id), id).is_ok());
    }

    #[test]
    fn nao_dono_recebe_forbidden() {
        let user = farmer(Uuid::new_v4());
        let err = ensure_owner(&user, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }
}
