//src/main.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

// Formulários multipart carregam até 5 fotos de 5MB, mais os campos de texto
const MULTIPART_BODY_LIMIT: usize = 30 * 1024 * 1024;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas: cadastro, login e as vitrines de leitura
    let public_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .route("/crop-listings", get(handlers::listings::get_available_listings))
        .route("/products", get(handlers::products::get_all_products));

    // Rotas protegidas (exigem Bearer token via auth_guard)
    let listing_routes = Router::new()
        .route("/crop-listings", post(handlers::listings::create_listing))
        .route("/crop-listings/mine", get(handlers::listings::get_my_listings))
        .route(
            "/crop-listings/{id}/status",
            patch(handlers::listings::update_listing_status),
        )
        .route(
            "/crop-listings/{id}",
            axum::routing::put(handlers::listings::update_listing)
                .delete(handlers::listings::delete_listing),
        )
        .layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT));

    let product_routes = Router::new()
        .route("/products", post(handlers::products::create_product))
        .route("/products/mine", get(handlers::products::get_my_products))
        .route(
            "/products/{id}",
            axum::routing::put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        );

    let order_routes = Router::new()
        .route("/orders", post(handlers::orders::create_order))
        .route("/orders/mine", get(handlers::orders::get_my_orders))
        .route("/orders/{id}/status", patch(handlers::orders::update_order_status));

    let protected_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .merge(listing_routes)
        .merge(product_routes)
        .merge(order_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/uploads", ServeDir::new(&app_state.uploads_dir))
        .layer(CorsLayer::permissive())
        .with_state(app_state.clone());

    // Inicia o servidor
    let listener = TcpListener::bind(&app_state.bind_addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
