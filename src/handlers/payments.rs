// src/handlers/payments.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedProfile,
    models::payment::{PaymentConfig, PaymentMethod},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfigPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "PIX do estúdio")]
    pub label: String,

    #[schema(example = "PIX")]
    pub method: PaymentMethod,

    #[schema(example = "contato@estudio.com.br")]
    pub pix_key: Option<String>,

    pub bank_details: Option<String>,
    pub payment_link: Option<String>,
    pub instructions: Option<String>,
}

// POST /api/payment-configs
#[utoipa::path(
    post,
    path = "/api/payment-configs",
    tag = "Payments",
    request_body = PaymentConfigPayload,
    responses(
        (status = 201, description = "Configuração de pagamento criada", body = PaymentConfig),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_payment_config(
    State(app_state): State<AppState>,
    profile: AuthenticatedProfile,
    Json(payload): Json<PaymentConfigPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let config = app_state
        .payment_service
        .create(
            &app_state.db_pool,
            profile.0,
            &payload.label,
            payload.method,
            payload.pix_key.as_deref(),
            payload.bank_details.as_deref(),
            payload.payment_link.as_deref(),
            payload.instructions.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(config)))
}

// GET /api/payment-configs
#[utoipa::path(
    get,
    path = "/api/payment-configs",
    tag = "Payments",
    responses(
        (status = 200, description = "Configurações do perfil", body = Vec<PaymentConfig>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_payment_configs(
    State(app_state): State<AppState>,
    profile: AuthenticatedProfile,
) -> Result<impl IntoResponse, AppError> {
    let configs = app_state
        .payment_service
        .list(&app_state.db_pool, profile.0)
        .await?;

    Ok((StatusCode::OK, Json(configs)))
}

// DELETE /api/payment-configs/{id}
#[utoipa::path(
    delete,
    path = "/api/payment-configs/{id}",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "ID da configuração")),
    responses(
        (status = 204, description = "Configuração excluída"),
        (status = 404, description = "Configuração não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_payment_config(
    State(app_state): State<AppState>,
    profile: AuthenticatedProfile,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .payment_service
        .delete(&app_state.db_pool, profile.0, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
