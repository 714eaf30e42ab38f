// src/config.rs

use crate::{
    db::{ListingRepository, OrderRepository, ProductRepository, UserRepository},
    services::{
        auth::AuthService, listing_service::ListingService, order_service::OrderService,
        product_service::ProductService,
    },
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, path::PathBuf, time::Duration};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub uploads_dir: PathBuf,
    pub bind_addr: String,
    pub auth_service: AuthService,
    pub listing_service: ListingService,
    pub product_service: ProductService,
    pub order_service: OrderService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let uploads_dir =
            PathBuf::from(env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string()));
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let listing_repo = ListingRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());

        let auth_service =
            AuthService::new(user_repo.clone(), jwt_secret.clone(), db_pool.clone());
        let listing_service = ListingService::new(listing_repo.clone(), db_pool.clone());
        let product_service = ProductService::new(product_repo, db_pool.clone());
        let order_service =
            OrderService::new(order_repo, listing_repo, user_repo, db_pool.clone());

        Ok(Self {
            db_pool,
            jwt_secret,
            uploads_dir,
            bind_addr,
            auth_service,
            listing_service,
            product_service,
            order_service,
        })
    }
}
