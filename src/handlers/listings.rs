// src/handlers/listings.rs

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::AppError, uploads},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{FarmerOnly, RequireRole},
    },
    models::listing::{CropListing, ListingStatus, ListingUnit},
};

// ---
// Leitura do formulário multipart
// ---
// O lote chega como multipart (campos de texto + fotos). As fotos são
// validadas e mantidas em memória; só vão para o disco depois que TODOS
// os campos passaram e, se o resto da requisição falhar (dono errado,
// lote inexistente, erro de banco), as recém-gravadas são removidas.

#[derive(Default)]
struct ListingForm {
    crop_name: Option<String>,
    quantity: Option<Decimal>,
    unit: Option<ListingUnit>,
    truck_net_weight: Option<Decimal>,
    price_per_unit: Option<Decimal>,
    location: Option<String>,
    description: Option<String>,
    // Só no PUT: fotos antigas que o cliente quer manter (JSON array)
    existing_images: Vec<String>,
    // (nome original, bytes) das fotos novas
    images: Vec<(String, Vec<u8>)>,
}

async fn read_listing_form(multipart: &mut Multipart) -> Result<ListingForm, AppError> {
    let mut form = ListingForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "cropName" => form.crop_name = Some(field.text().await?),
            "quantity" => form.quantity = Some(parse_decimal(&field.text().await?, "quantity")?),
            "unit" => {
                let raw = field.text().await?;
                form.unit = Some(raw.parse().map_err(|_| AppError::InvalidField("unit"))?);
            }
            "truckNetWeight" => {
                form.truck_net_weight =
                    Some(parse_decimal(&field.text().await?, "truckNetWeight")?);
            }
            "pricePerUnit" => {
                form.price_per_unit = Some(parse_decimal(&field.text().await?, "pricePerUnit")?);
            }
            "location" => form.location = Some(field.text().await?),
            "description" => form.description = Some(field.text().await?),
            "existingImages" => {
                let raw = field.text().await?;
                form.existing_images = serde_json::from_str(&raw)
                    .map_err(|_| AppError::InvalidField("existingImages"))?;
            }
            "images" => {
                if form.images.len() >= uploads::MAX_IMAGES_PER_LISTING {
                    return Err(AppError::InvalidImage(
                        "são aceitas no máximo 5 fotos por lote.".to_string(),
                    ));
                }
                let file_name = field.file_name().unwrap_or("foto").to_string();
                let data = field.bytes().await?.to_vec();
                // Falha cedo, antes de gravar qualquer coisa
                uploads::validate_image(&file_name, data.len())?;
                form.images.push((file_name, data));
            }
            // Campos desconhecidos são ignorados
            _ => {}
        }
    }

    Ok(form)
}

fn parse_decimal(raw: &str, field: &'static str) -> Result<Decimal, AppError> {
    raw.trim().parse::<Decimal>().map_err(|_| AppError::InvalidField(field))
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, AppError> {
    value.ok_or(AppError::MissingField(field))
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, AppError> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(AppError::MissingField(field)),
    }
}

// Espelho do formulário, apenas para o Swagger (o handler lê o multipart na mão)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct CropListingForm {
    pub crop_name: String,
    pub quantity: Decimal,
    pub unit: Option<ListingUnit>,
    pub truck_net_weight: Decimal,
    pub price_per_unit: Decimal,
    pub location: String,
    pub description: Option<String>,
    /// JSON array com os caminhos das fotos a manter (só no PUT)
    pub existing_images: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pub images: String,
}

// ---
// Handler: create_listing (multipart, ≤5 fotos)
// ---
#[utoipa::path(
    post,
    path = "/crop-listings",
    tag = "Listings",
    request_body(content = CropListingForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Lote publicado (status 'available')", body = CropListing),
        (status = 400, description = "Campos ou fotos faltando")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_listing(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<FarmerOnly>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_listing_form(&mut multipart).await?;

    let crop_name = required_text(form.crop_name, "cropName")?;
    let quantity = required(form.quantity, "quantity")?;
    let truck_net_weight = required(form.truck_net_weight, "truckNetWeight")?;
    let price_per_unit = required(form.price_per_unit, "pricePerUnit")?;
    let location = required_text(form.location, "location")?;
    let unit = form.unit.unwrap_or(ListingUnit::Kg);

    if quantity <= Decimal::ZERO {
        return Err(AppError::InvalidField("quantity"));
    }
    if truck_net_weight.is_sign_negative() {
        return Err(AppError::InvalidField("truckNetWeight"));
    }
    if price_per_unit.is_sign_negative() {
        return Err(AppError::InvalidField("pricePerUnit"));
    }
    if form.images.is_empty() {
        return Err(AppError::NoImages);
    }

    // Agora sim, com tudo validado, as fotos vão para o disco
    let image_paths = uploads::save_crop_images(&app_state.uploads_dir, &form.images).await?;

    let created = app_state
        .listing_service
        .create_listing(
            &user.0,
            &crop_name,
            quantity,
            unit,
            truck_net_weight,
            price_per_unit,
            image_paths.clone(),
            form.description.as_deref(),
            &location,
        )
        .await;

    match created {
        Ok(listing) => Ok((StatusCode::CREATED, Json(listing))),
        Err(err) => {
            // Insert falhou: as fotos desta requisição não podem ficar no disco
            uploads::remove_crop_images(&app_state.uploads_dir, &image_paths).await;
            Err(err)
        }
    }
}

// ---
// Handler: get_available_listings (vitrine pública)
// ---
#[utoipa::path(
    get,
    path = "/crop-listings",
    tag = "Listings",
    responses((status = 200, description = "Lotes disponíveis", body = [CropListing]))
)]
pub async fn get_available_listings(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let listings = app_state.listing_service.list_available().await?;
    Ok((StatusCode::OK, Json(listings)))
}

// ---
// Handler: get_my_listings (painel do produtor, todos os status)
// ---
#[utoipa::path(
    get,
    path = "/crop-listings/mine",
    tag = "Listings",
    responses((status = 200, description = "Lotes do produtor logado", body = [CropListing])),
    security(("api_jwt" = []))
)]
pub async fn get_my_listings(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<FarmerOnly>,
) -> Result<impl IntoResponse, AppError> {
    let listings = app_state.listing_service.my_listings(&user.0).await?;
    Ok((StatusCode::OK, Json(listings)))
}

// ---
// Payload: atualização de status
// ---
// O status chega como texto e é validado contra o enum na mão:
// valor desconhecido é 400, salto ilegal na máquina de estados é 409.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateListingStatusPayload {
    #[schema(example = "sold")]
    pub status: String,
}

// ---
// Handler: update_listing_status (só o dono)
// ---
#[utoipa::path(
    patch,
    path = "/crop-listings/{id}/status",
    tag = "Listings",
    request_body = UpdateListingStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = CropListing),
        (status = 400, description = "Status fora do enum"),
        (status = 403, description = "Não é o dono"),
        (status = 404, description = "Lote não encontrado"),
        (status = 409, description = "Transição ilegal")
    ),
    params(("id" = Uuid, Path, description = "ID do lote")),
    security(("api_jwt" = []))
)]
pub async fn update_listing_status(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateListingStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let new_status: ListingStatus = payload
        .status
        .parse()
        .map_err(|_| AppError::InvalidStatus(payload.status.clone()))?;

    let listing = app_state.listing_service.update_status(&user.0, id, new_status).await?;
    Ok((StatusCode::OK, Json(listing)))
}

// ---
// Handler: update_listing (PUT completo, multipart)
// ---
// Junta as fotos novas com as que o cliente pediu para manter
// ('existingImages'); o conjunto final não pode ficar vazio.
#[utoipa::path(
    put,
    path = "/crop-listings/{id}",
    tag = "Listings",
    request_body(content = CropListingForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Lote atualizado", body = CropListing),
        (status = 400, description = "Conjunto final de fotos vazio"),
        (status = 403, description = "Não é o dono"),
        (status = 404, description = "Lote não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do lote")),
    security(("api_jwt" = []))
)]
pub async fn update_listing(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_listing_form(&mut multipart).await?;

    let crop_name = required_text(form.crop_name, "cropName")?;
    let quantity = required(form.quantity, "quantity")?;
    let truck_net_weight = required(form.truck_net_weight, "truckNetWeight")?;
    let price_per_unit = required(form.price_per_unit, "pricePerUnit")?;
    let location = required_text(form.location, "location")?;
    let unit = form.unit.unwrap_or(ListingUnit::Kg);

    if quantity <= Decimal::ZERO {
        return Err(AppError::InvalidField("quantity"));
    }
    if truck_net_weight.is_sign_negative() {
        return Err(AppError::InvalidField("truckNetWeight"));
    }
    if price_per_unit.is_sign_negative() {
        return Err(AppError::InvalidField("pricePerUnit"));
    }

    let new_images = uploads::save_crop_images(&app_state.uploads_dir, &form.images).await?;

    let updated = app_state
        .listing_service
        .update_listing(
            &user.0,
            id,
            &crop_name,
            quantity,
            unit,
            truck_net_weight,
            price_per_unit,
            form.existing_images,
            new_images.clone(),
            form.description.as_deref(),
            &location,
        )
        .await;

    match updated {
        Ok(listing) => Ok((StatusCode::OK, Json(listing))),
        Err(err) => {
            // Lote inexistente, dono errado ou erro de banco: nada de foto órfã
            uploads::remove_crop_images(&app_state.uploads_dir, &new_images).await;
            Err(err)
        }
    }
}

// ---
// Handler: delete_listing (só o dono)
// ---
#[utoipa::path(
    delete,
    path = "/crop-listings/{id}",
    tag = "Listings",
    responses(
        (status = 200, description = "Lote removido"),
        (status = 403, description = "Não é o dono"),
        (status = 404, description = "Lote não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do lote")),
    security(("api_jwt" = []))
)]
pub async fn delete_listing(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.listing_service.delete_listing(&user.0, id).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Lote removido com sucesso." }))))
}
