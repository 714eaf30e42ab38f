// src/services/order_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ListingRepository, OrderRepository, UserRepository},
    models::{
        auth::User,
        listing::{ListingStatus, ListingUnit},
        order::{DeliveryType, Order, OrderStatus},
    },
};

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    listing_repo: ListingRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

// Total do pedido: calculado uma única vez, na criação.
// Decimal faz a conta exata mesmo com quantidades fracionadas.
pub fn compute_total(quantity: Decimal, price_per_unit: Decimal) -> Decimal {
    quantity * price_per_unit
}

/// Resultado da reserva: saldo restante e o status que o lote passa a ter.
#[derive(Debug, PartialEq, Eq)]
pub struct StockReservation {
    pub remaining: Decimal,
    pub new_status: ListingStatus,
}

// A decisão da reserva de estoque, separada do SQL: lote vendido rejeita,
// pedido acima do saldo rejeita, baixa que zera o saldo marca o lote 'sold'.
// O chamador roda isto sob o lock de linha, entre o SELECT e o UPDATE.
pub fn reserve_stock(
    status: ListingStatus,
    available: Decimal,
    requested: Decimal,
) -> Result<StockReservation, AppError> {
    if status == ListingStatus::Sold {
        return Err(AppError::ListingUnavailable);
    }

    if requested > available {
        return Err(AppError::InsufficientStock { available, requested });
    }

    let remaining = available - requested;
    let new_status = if remaining.is_zero() { ListingStatus::Sold } else { status };

    Ok(StockReservation { remaining, new_status })
}

impl OrderService {
    pub fn new(
        order_repo: OrderRepository,
        listing_repo: ListingRepository,
        user_repo: UserRepository,
        pool: PgPool,
    ) -> Self {
        Self { order_repo, listing_repo, user_repo, pool }
    }

    /// Pedidos onde o usuário é uma das partes, conforme o papel dele.
    pub async fn my_orders(&self, user: &User) -> Result<Vec<Order>, AppError> {
        match user.role {
            crate::models::auth::Role::Farmer => self.order_repo.list_by_farmer(user.id).await,
            crate::models::auth::Role::Wholesale => {
                self.order_repo.list_by_wholesaler(user.id).await
            }
        }
    }

    // --- CREATE (com reserva atômica de estoque) ---
    //
    // Quando o pedido referencia um lote, tudo acontece numa transação só:
    // lock de linha no lote, checagem de saldo, baixa da quantidade e insert
    // do pedido. Dois pedidos concorrentes sobre o mesmo lote serializam no
    // lock: o segundo enxerga o saldo já debitado.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_order(
        &self,
        wholesaler: &User,
        crop_listing_id: Option<Uuid>,
        farmer_id: Option<Uuid>,
        crop_name: Option<&str>,
        quantity: Decimal,
        unit: Option<ListingUnit>,
        price_per_unit: Option<Decimal>,
        delivery_type: DeliveryType,
        location: &str,
    ) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = if let Some(listing_id) = crop_listing_id {
            // CASO A: pedido sobre um lote publicado.
            // Preço, unidade e produtor saem do lote, não do cliente.
            let listing = self
                .listing_repo
                .find_by_id_for_update(&mut *tx, listing_id)
                .await?
                .ok_or(AppError::ListingNotFound)?;

            let reservation = reserve_stock(listing.status, listing.quantity, quantity)?;
            self.listing_repo
                .set_quantity_and_status(
                    &mut *tx,
                    listing_id,
                    reservation.remaining,
                    reservation.new_status,
                )
                .await?;

            let total = compute_total(quantity, listing.price_per_unit);

            self.order_repo
                .create(
                    &mut *tx,
                    listing.farmer_id,
                    &listing.farmer_name,
                    wholesaler.id,
                    &wholesaler.name,
                    Some(listing_id),
                    &listing.crop_name,
                    quantity,
                    listing.unit,
                    listing.price_per_unit,
                    total,
                    delivery_type,
                    location,
                )
                .await?
        } else {
            // CASO B: negociação avulsa (sem lote), típica dos produtos do
            // inventário simplificado. Aqui o payload precisa trazer tudo.
            let farmer_id = farmer_id.ok_or(AppError::MissingField("farmerId"))?;
            let crop_name = crop_name.ok_or(AppError::MissingField("cropName"))?;
            let price_per_unit = price_per_unit.ok_or(AppError::MissingField("pricePerUnit"))?;
            let unit = unit.unwrap_or(ListingUnit::Kg);

            let farmer = self
                .user_repo
                .find_by_id(farmer_id)
                .await?
                .ok_or(AppError::UserNotFound)?;

            let total = compute_total(quantity, price_per_unit);

            self.order_repo
                .create(
                    &mut *tx,
                    farmer.id,
                    &farmer.name,
                    wholesaler.id,
                    &wholesaler.name,
                    None,
                    crop_name,
                    quantity,
                    unit,
                    price_per_unit,
                    total,
                    delivery_type,
                    location,
                )
                .await?
        };

        tx.commit().await?;

        tracing::info!(
            "🧾 Pedido {} criado: {} x {} = {}",
            order.id,
            order.quantity,
            order.price_per_unit,
            order.total_price
        );
        Ok(order)
    }

    // --- UPDATE STATUS ---
    //
    // Só as partes do pedido mexem nele: o produtor confirma e entrega;
    // cancelar, qualquer uma das partes pode (enquanto a tabela permitir).
    pub async fn update_status(
        &self,
        user: &User,
        id: Uuid,
        new_status: OrderStatus,
    ) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .order_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        let is_farmer = user.id == order.farmer_id;
        let is_wholesaler = user.id == order.wholesaler_id;

        if !is_farmer && !is_wholesaler {
            return Err(AppError::Forbidden);
        }

        match new_status {
            OrderStatus::Confirmed | OrderStatus::Delivered if !is_farmer => {
                return Err(AppError::Forbidden);
            }
            _ => {}
        }

        if !order.status.can_transition_to(new_status) {
            return Err(AppError::InvalidStatusTransition {
                from: order.status.to_string(),
                to: new_status.to_string(),
            });
        }

        let updated = self.order_repo.update_status(&mut *tx, id, new_status).await?;
        tx.commit().await?;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn total_e_quantidade_vezes_preco() {
        let total = compute_total(Decimal::from(10), Decimal::from(20));
        assert_eq!(total, Decimal::from(200));
    }

    #[test]
    fn total_exato_com_fracoes() {
        // 2.5 * 3.2 = 8.00, sem resíduo de ponto flutuante
        let total = compute_total(
            Decimal::from_str("2.5").unwrap(),
            Decimal::from_str("3.2").unwrap(),
        );
        assert_eq!(total, Decimal::from_str("8.00").unwrap());
    }

    #[test]
    fn total_em_quintais() {
        let total = compute_total(
            Decimal::from_str("1.5").unwrap(),
            Decimal::from_str("1850.75").unwrap(),
        );
        assert_eq!(total, Decimal::from_str("2776.125").unwrap());
    }

    #[test]
    fn reserva_parcial_mantem_o_status() {
        let r = reserve_stock(ListingStatus::Available, Decimal::from(100), Decimal::from(30))
            .unwrap();
        assert_eq!(r.remaining, Decimal::from(70));
        assert_eq!(r.new_status, ListingStatus::Available);

        // Lote reservado por outra negociação continua 'pending' após a baixa
        let r = reserve_stock(ListingStatus::Pending, Decimal::from(100), Decimal::from(30))
            .unwrap();
        assert_eq!(r.new_status, ListingStatus::Pending);
    }

    #[test]
    fn reserva_que_zera_o_saldo_marca_sold() {
        let r = reserve_stock(ListingStatus::Available, Decimal::from(100), Decimal::from(100))
            .unwrap();
        assert_eq!(r.remaining, Decimal::ZERO);
        assert_eq!(r.new_status, ListingStatus::Sold);
    }

    #[test]
    fn pedido_acima_do_saldo_e_rejeitado() {
        let err = reserve_stock(ListingStatus::Available, Decimal::from(100), Decimal::from(101))
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientStock { available, requested }
                if available == Decimal::from(100) && requested == Decimal::from(101)
        ));
    }

    #[test]
    fn lote_vendido_nao_aceita_pedido() {
        let err = reserve_stock(ListingStatus::Sold, Decimal::from(100), Decimal::from(1))
            .unwrap_err();
        assert!(matches!(err, AppError::ListingUnavailable));
    }

    #[test]
    fn reserva_fracionada_e_exata() {
        let r = reserve_stock(
            ListingStatus::Available,
            Decimal::from_str("2.5").unwrap(),
            Decimal::from_str("2.5").unwrap(),
        )
        .unwrap();
        assert!(r.remaining.is_zero());
        assert_eq!(r.new_status, ListingStatus::Sold);
    }
}
