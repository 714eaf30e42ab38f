// src/handlers/orders.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequireRole, WholesaleOnly},
    },
    models::{
        listing::ListingUnit,
        order::{DeliveryType, Order, OrderStatus},
    },
};

// ---
// Payload: criação do pedido
// ---
// Duas formas de uso: com 'cropListingId' (pedido sobre lote publicado,
// preço e produtor saem do lote) ou sem (negociação avulsa, o payload
// precisa trazer farmerId/cropName/pricePerUnit).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub crop_listing_id: Option<Uuid>,

    pub farmer_id: Option<Uuid>,

    pub crop_name: Option<String>,

    #[validate(required(message = "O campo 'quantity' é obrigatório."))]
    pub quantity: Option<Decimal>,

    pub unit: Option<ListingUnit>,

    pub price_per_unit: Option<Decimal>,

    pub delivery_type: Option<DeliveryType>,

    pub location: Option<String>,
}

// ---
// Handler: create_order (só atacadista)
// ---
#[utoipa::path(
    post,
    path = "/orders",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado (status 'Pending')", body = Order),
        (status = 400, description = "Campos inválidos"),
        (status = 404, description = "Lote ou produtor não encontrado"),
        (status = 409, description = "Lote vendido ou saldo insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<WholesaleOnly>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let quantity = payload.quantity.unwrap();
    if quantity <= Decimal::ZERO {
        return Err(AppError::InvalidField("quantity"));
    }

    let order = app_state
        .order_service
        .create_order(
            &user.0,
            payload.crop_listing_id,
            payload.farmer_id,
            payload.crop_name.as_deref(),
            quantity,
            payload.unit,
            payload.price_per_unit,
            payload.delivery_type.unwrap_or(DeliveryType::Delivery),
            payload.location.as_deref().unwrap_or(""),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

// ---
// Handler: get_my_orders (os dois papéis, cada um vê o seu lado)
// ---
#[utoipa::path(
    get,
    path = "/orders/mine",
    tag = "Orders",
    responses((status = 200, description = "Pedidos do usuário logado", body = [Order])),
    security(("api_jwt" = []))
)]
pub async fn get_my_orders(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.order_service.my_orders(&user.0).await?;
    Ok((StatusCode::OK, Json(orders)))
}

// ---
// Payload: atualização de status do pedido
// ---
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusPayload {
    #[schema(example = "Confirmed")]
    pub status: String,
}

// ---
// Handler: update_order_status (só as partes do pedido)
// ---
#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    tag = "Orders",
    request_body = UpdateOrderStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = Order),
        (status = 400, description = "Status fora do enum"),
        (status = 403, description = "Usuário não é parte do pedido"),
        (status = 404, description = "Pedido não encontrado"),
        (status = 409, description = "Transição ilegal")
    ),
    params(("id" = Uuid, Path, description = "ID do pedido")),
    security(("api_jwt" = []))
)]
pub async fn update_order_status(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let new_status: OrderStatus = payload
        .status
        .parse()
        .map_err(|_| AppError::InvalidStatus(payload.status.clone()))?;

    let order = app_state.order_service.update_status(&user.0, id, new_status).await?;
    Ok((StatusCode::OK, Json(order)))
}
