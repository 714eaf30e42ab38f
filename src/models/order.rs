// src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::listing::ListingUnit;

// --- Modalidade de entrega ---
// Os valores ficam capitalizados no banco e no JSON ('Delivery'/'Pickup'),
// como a API sempre expôs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "delivery_type")]
pub enum DeliveryType {
    Delivery,
    Pickup,
}

// --- Ciclo de vida do pedido ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    // Tabela de transições:
    //   Pending   -> Confirmed | Cancelled
    //   Confirmed -> Delivered | Cancelled
    //   Delivered e Cancelled são terminais.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Delivered) | (Confirmed, Cancelled)
        )
    }
}

impl FromStr for OrderStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Confirmed" => Ok(OrderStatus::Confirmed),
            "Delivered" => Ok(OrderStatus::Delivered),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(()),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", s)
    }
}

// --- O pedido em si ---
// 'total_price' é calculado uma única vez na criação e nunca recalculado,
// mesmo que o preço do lote mude depois.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub farmer_name: String,
    pub wholesaler_id: Uuid,
    pub wholesaler_name: String,
    pub crop_listing_id: Option<Uuid>,
    pub crop_name: String,
    pub quantity: Decimal,
    pub unit: ListingUnit,
    pub price_per_unit: Decimal,
    pub total_price: Decimal,
    pub delivery_type: DeliveryType,
    pub status: OrderStatus,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transicoes_validas_do_pedido() {
        use OrderStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Delivered));
        assert!(Confirmed.can_transition_to(Cancelled));
    }

    #[test]
    fn estados_terminais_nao_saem_do_lugar() {
        use OrderStatus::*;

        for next in [Pending, Confirmed, Delivered, Cancelled] {
            assert!(!Delivered.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn pedido_nao_pula_direto_para_entregue() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn parse_de_status_do_pedido() {
        assert_eq!("Pending".parse::<OrderStatus>(), Ok(OrderStatus::Pending));
        assert_eq!("Cancelled".parse::<OrderStatus>(), Ok(OrderStatus::Cancelled));
        // A API sempre usou os valores capitalizados
        assert!("pending".parse::<OrderStatus>().is_err());
        assert!("Shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn status_do_pedido_serializa_capitalizado() {
        assert_eq!(serde_json::to_string(&OrderStatus::Pending).unwrap(), "\"Pending\"");
        assert_eq!(serde_json::to_string(&DeliveryType::Pickup).unwrap(), "\"Pickup\"");
    }
}
