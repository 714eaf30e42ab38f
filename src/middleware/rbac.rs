// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{Role, User},
};

/// 1. O Trait que define qual papel a rota exige
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> Role;
}

/// Só produtores (publicar lotes, gerenciar inventário)
pub struct FarmerOnly;
impl RoleDef for FarmerOnly {
    fn role() -> Role {
        Role::Farmer
    }
}

/// Só atacadistas (fazer pedidos)
pub struct WholesaleOnly;
impl RoleDef for WholesaleOnly {
    fn role() -> Role {
        Role::Wholesale
    }
}

/// 2. O Extractor (Guardião)
/// Depende do `auth_guard` já ter colocado o usuário nos extensions.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<User>().ok_or(AppError::InvalidToken)?;

        if user.role != T::role() {
            return Err(AppError::Forbidden);
        }

        Ok(RequireRole(PhantomData))
    }
}
