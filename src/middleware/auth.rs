use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState};

// O cadastro/login mora no serviço de auth externo; aqui só validamos o
// token emitido por ele e extraímos o perfil atuante. O fluxo público não
// passa por este middleware: lá a credencial é o public_token da proposta.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
}

// O middleware em si
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let headers = request.headers();
    let auth_header = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok());

    if let Some(auth_header) = auth_header {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            let claims = decode::<Claims>(
                token,
                &DecodingKey::from_secret(app_state.jwt_secret.as_ref()),
                &Validation::default(),
            )?
            .claims;

            // Insere o perfil nos "extensions" da requisição
            request
                .extensions_mut()
                .insert(AuthenticatedProfile(claims.sub));
            return Ok(next.run(request).await);
        }
    }

    Err(AppError::InvalidToken)
}

// Extrator para obter o perfil autenticado diretamente nos handlers
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedProfile(pub Uuid);

impl<S> FromRequestParts<S> for AuthenticatedProfile
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedProfile>()
            .copied()
            .ok_or(AppError::InvalidToken)
    }
}
