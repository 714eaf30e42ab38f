// src/handlers/products.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{FarmerOnly, RequireRole},
    },
    models::product::{Product, ProductKind},
};

// ---
// Validação Customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: criação/atualização do produto
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[serde(rename = "type")]
    pub kind: ProductKind,

    #[validate(required(message = "O campo 'quantity' é obrigatório."))]
    #[validate(custom(function = validate_not_negative))]
    pub quantity: Option<Decimal>,

    #[validate(required(message = "O campo 'price' é obrigatório."))]
    #[validate(custom(function = validate_not_negative))]
    pub price: Option<Decimal>,

    pub image: Option<String>,
}

// ---
// Handler: get_all_products (catálogo público do atacado)
// ---
#[utoipa::path(
    get,
    path = "/products",
    tag = "Products",
    responses((status = 200, description = "Todos os produtos", body = [Product]))
)]
pub async fn get_all_products(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.product_service.list_all().await?;
    Ok((StatusCode::OK, Json(products)))
}

// ---
// Handler: get_my_products
// ---
#[utoipa::path(
    get,
    path = "/products/mine",
    tag = "Products",
    responses((status = 200, description = "Produtos do produtor logado", body = [Product])),
    security(("api_jwt" = []))
)]
pub async fn get_my_products(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<FarmerOnly>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.product_service.my_products(&user.0).await?;
    Ok((StatusCode::OK, Json(products)))
}

// ---
// Handler: create_product
// ---
#[utoipa::path(
    post,
    path = "/products",
    tag = "Products",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Campos inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<FarmerOnly>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product = app_state
        .product_service
        .create_product(
            &user.0,
            &payload.name,
            payload.kind,
            payload.quantity.unwrap(),
            payload.price.unwrap(),
            payload.image.as_deref().unwrap_or(""),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

// ---
// Handler: update_product (só o dono)
// ---
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "Products",
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 403, description = "Não é o dono"),
        (status = 404, description = "Produto não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do produto")),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product = app_state
        .product_service
        .update_product(
            &user.0,
            id,
            &payload.name,
            payload.kind,
            payload.quantity.unwrap(),
            payload.price.unwrap(),
            payload.image.as_deref().unwrap_or(""),
        )
        .await?;

    Ok((StatusCode::OK, Json(product)))
}

// ---
// Handler: delete_product (só o dono)
// ---
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "Products",
    responses(
        (status = 200, description = "Produto removido"),
        (status = 403, description = "Não é o dono"),
        (status = 404, description = "Produto não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do produto")),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.product_service.delete_product(&user.0, id).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Produto removido com sucesso." }))))
}
