// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Tipo do produto no inventário simplificado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "product_kind")]
pub enum ProductKind {
    Vegetable,
    Fruit,
    Grain,
    Pulse,
}

// Inventário simplificado do produtor: sem status, sem galeria de fotos.
// O campo 'image' pode ficar vazio (diferente do lote, que exige fotos).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub farmer_name: String,
    pub name: String,

    #[serde(rename = "type")]
    pub kind: ProductKind,

    pub quantity: Decimal,
    pub price: Decimal,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_sai_como_type_no_json() {
        let p = Product {
            id: Uuid::new_v4(),
            farmer_id: Uuid::new_v4(),
            farmer_name: "João".into(),
            name: "Tomate".into(),
            kind: ProductKind::Vegetable,
            quantity: Decimal::new(50, 0),
            price: Decimal::new(3, 0),
            image: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["type"], "Vegetable");
        assert!(json.get("kind").is_none());
    }
}
