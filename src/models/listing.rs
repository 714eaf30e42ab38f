// src/models/listing.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Unidade de venda do lote ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "listing_unit", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListingUnit {
    Kg,
    Quintal,
    Ton,
}

impl FromStr for ListingUnit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kg" => Ok(ListingUnit::Kg),
            "quintal" => Ok(ListingUnit::Quintal),
            "ton" => Ok(ListingUnit::Ton),
            _ => Err(()),
        }
    }
}

// --- Ciclo de vida do lote ---
// A máquina de estados é explícita: qualquer salto fora da tabela é rejeitado.
// 'sold' é terminal (um lote vendido nunca volta a ficar disponível).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "listing_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Available,
    Pending,
    Sold,
}

impl ListingStatus {
    // Tabela de transições:
    //   available -> pending | sold
    //   pending   -> available | sold
    //   sold      -> (terminal)
    pub fn can_transition_to(self, next: ListingStatus) -> bool {
        use ListingStatus::*;
        matches!(
            (self, next),
            (Available, Pending) | (Available, Sold) | (Pending, Available) | (Pending, Sold)
        )
    }
}

impl FromStr for ListingStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(ListingStatus::Available),
            "pending" => Ok(ListingStatus::Pending),
            "sold" => Ok(ListingStatus::Sold),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ListingStatus::Available => "available",
            ListingStatus::Pending => "pending",
            ListingStatus::Sold => "sold",
        };
        write!(f, "{}", s)
    }
}

// --- O lote publicado pelo produtor ---
// Invariante: 'images' tem pelo menos uma foto (na criação e após update completo).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CropListing {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub farmer_name: String,
    pub crop_name: String,
    pub quantity: Decimal,
    pub unit: ListingUnit,

    // Peso líquido do caminhão, em kg
    pub truck_net_weight: Decimal,

    pub price_per_unit: Decimal,
    pub images: Vec<String>,
    pub description: Option<String>,
    pub location: String,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transicoes_validas_do_lote() {
        use ListingStatus::*;

        assert!(Available.can_transition_to(Pending));
        assert!(Available.can_transition_to(Sold));
        assert!(Pending.can_transition_to(Available));
        assert!(Pending.can_transition_to(Sold));
    }

    #[test]
    fn sold_e_terminal() {
        use ListingStatus::*;

        assert!(!Sold.can_transition_to(Available));
        assert!(!Sold.can_transition_to(Pending));
        assert!(!Sold.can_transition_to(Sold));
    }

    #[test]
    fn transicao_para_o_mesmo_estado_e_rejeitada() {
        use ListingStatus::*;

        assert!(!Available.can_transition_to(Available));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn parse_de_status() {
        assert_eq!("available".parse::<ListingStatus>(), Ok(ListingStatus::Available));
        assert_eq!("pending".parse::<ListingStatus>(), Ok(ListingStatus::Pending));
        assert_eq!("sold".parse::<ListingStatus>(), Ok(ListingStatus::Sold));
        assert!("SOLD".parse::<ListingStatus>().is_err());
        assert!("banana".parse::<ListingStatus>().is_err());
    }

    #[test]
    fn parse_de_unidade() {
        assert_eq!("kg".parse::<ListingUnit>(), Ok(ListingUnit::Kg));
        assert_eq!("quintal".parse::<ListingUnit>(), Ok(ListingUnit::Quintal));
        assert_eq!("ton".parse::<ListingUnit>(), Ok(ListingUnit::Ton));
        assert!("tonelada".parse::<ListingUnit>().is_err());
    }
}
