// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// A taxonomia HTTP inteira mora no `IntoResponse` ali embaixo.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("O campo '{0}' é obrigatório.")]
    MissingField(&'static str),

    #[error("O valor do campo '{0}' é inválido.")]
    InvalidField(&'static str),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Lote não encontrado")]
    ListingNotFound,

    #[error("Produto não encontrado")]
    ProductNotFound,

    #[error("Pedido não encontrado")]
    OrderNotFound,

    #[error("Status inválido: '{0}'")]
    InvalidStatus(String),

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Estoque insuficiente: disponível {available}, pedido {requested}")]
    InsufficientStock { available: Decimal, requested: Decimal },

    #[error("O lote não está mais disponível.")]
    ListingUnavailable,

    #[error("O lote precisa de pelo menos uma imagem.")]
    NoImages,

    #[error("Imagem inválida: {0}")]
    InvalidImage(String),

    #[error("Falha ao ler o formulário multipart")]
    MultipartError(#[from] axum::extract::multipart::MultipartError),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Falha de I/O ao salvar arquivo")]
    IoError(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            // 400: entrada malformada
            ref e @ (AppError::MissingField(_)
            | AppError::InvalidField(_)
            | AppError::InvalidStatus(_)
            | AppError::NoImages
            | AppError::InvalidImage(_)
            | AppError::MultipartError(_)) => (StatusCode::BAD_REQUEST, e.to_string()),

            // 401: não sabemos quem é
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string())
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),

            // 403: sabemos quem é, mas o registro não é dele
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Você não tem permissão para realizar esta ação.".to_string(),
            ),

            // 404
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "Usuário não encontrado.".to_string()),
            AppError::ListingNotFound => (StatusCode::NOT_FOUND, "Lote não encontrado.".to_string()),
            AppError::ProductNotFound => (StatusCode::NOT_FOUND, "Produto não encontrado.".to_string()),
            AppError::OrderNotFound => (StatusCode::NOT_FOUND, "Pedido não encontrado.".to_string()),

            // 409: conflito com o estado atual
            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string())
            }
            ref e @ (AppError::InvalidStatusTransition { .. }
            | AppError::InsufficientStock { .. }
            | AppError::ListingUnavailable) => (StatusCode::CONFLICT, e.to_string()),

            // Todos os outros erros (DatabaseError, InternalServerError, etc.) viram 500.
            // O `tracing` loga a mensagem detalhada; o cliente recebe uma genérica.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
