// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::signup,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Listings ---
        handlers::listings::create_listing,
        handlers::listings::get_available_listings,
        handlers::listings::get_my_listings,
        handlers::listings::update_listing_status,
        handlers::listings::update_listing,
        handlers::listings::delete_listing,

        // --- Products ---
        handlers::products::get_all_products,
        handlers::products::get_my_products,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,

        // --- Orders ---
        handlers::orders::create_order,
        handlers::orders::get_my_orders,
        handlers::orders::update_order_status,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::UserSummary,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::RegisterResponse,
            models::auth::AuthResponse,

            // --- Listings ---
            models::listing::ListingUnit,
            models::listing::ListingStatus,
            models::listing::CropListing,
            handlers::listings::CropListingForm,
            handlers::listings::UpdateListingStatusPayload,

            // --- Products ---
            models::product::ProductKind,
            models::product::Product,
            handlers::products::ProductPayload,

            // --- Orders ---
            models::order::DeliveryType,
            models::order::OrderStatus,
            models::order::Order,
            handlers::orders::CreateOrderPayload,
            handlers::orders::UpdateOrderStatusPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Listings", description = "Lotes de Safra (Vitrine do Produtor)"),
        (name = "Products", description = "Inventário Simplificado do Produtor"),
        (name = "Orders", description = "Pedidos do Atacado"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
