// src/handlers/templates.rs

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
    models::{proposal::ProposalItemInput, template::ProposalTemplate},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Casamento — pacote completo")]
    pub name: String,

    pub content: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub default_items: Vec<ProposalItemInput>,

    pub default_payment_config_id: Option<Uuid>,

    #[schema(example = 15)]
    pub default_valid_days: Option<i32>,
}

// POST /api/templates
#[utoipa::path(
    post,
    path = "/api/templates",
    tag = "Templates",
    request_body = TemplatePayload,
    responses(
        (status = 201, description = "Modelo criado", body = ProposalTemplate),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_template(
    State(app_state): State<AppState>,
    profile: AuthenticatedProfile,
    Json(payload): Json<TemplatePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let template = app_state
        .template_service
        .create(
            &app_state.db_pool,
            profile.0,
            &payload.name,
            payload.content.as_deref(),
            payload.default_items,
            payload.default_payment_config_id,
            payload.default_valid_days,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(template)))
}

// GET /api/templates
#[utoipa::path(
    get,
    path = "/api/templates",
    tag = "Templates",
    responses(
        (status = 200, description = "Modelos do perfil", body = Vec<ProposalTemplate>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_templates(
    State(app_state): State<AppState>,
    profile: AuthenticatedProfile,
) -> Result<impl IntoResponse, AppError> {
    let templates = app_state
        .template_service
        .list(&app_state.db_pool, profile.0)
        .await?;

    Ok((StatusCode::OK, Json(templates)))
}

// GET /api/templates/{id}
#[utoipa::path(
    get,
    path = "/api/templates/{id}",
    tag = "Templates",
    params(("id" = Uuid, Path, description = "ID do modelo")),
    responses(
        (status = 200, description = "Modelo", body = ProposalTemplate),
        (status = 404, description = "Modelo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_template(
    State(app_state): State<AppState>,
    profile: AuthenticatedProfile,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let template = app_state
        .template_service
        .get(&app_state.db_pool, profile.0, id)
        .await?;

    Ok((StatusCode::OK, Json(template)))
}

// PUT /api/templates/{id}
#[utoipa::path(
    put,
    path = "/api/templates/{id}",
    tag = "Templates",
    params(("id" = Uuid, Path, description = "ID do modelo")),
    request_body = TemplatePayload,
    responses(
        (status = 200, description = "Modelo atualizado", body = ProposalTemplate),
        (status = 404, description = "Modelo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_template(
    State(app_state): State<AppState>,
    profile: AuthenticatedProfile,
    Path(id): Path<Uuid>,
    Json(payload): Json<TemplatePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let template = app_state
        .template_service
        .update(
            &app_state.db_pool,
            profile.0,
            id,
            &payload.name,
            payload.content.as_deref(),
            payload.default_items,
            payload.default_payment_config_id,
            payload.default_valid_days,
        )
        .await?;

    Ok((StatusCode::OK, Json(template)))
}

// DELETE /api/templates/{id}
#[utoipa::path(
    delete,
    path = "/api/templates/{id}",
    tag = "Templates",
    params(("id" = Uuid, Path, description = "ID do modelo")),
    responses(
        (status = 204, description = "Modelo excluído"),
        (status = 404, description = "Modelo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_template(
    State(app_state): State<AppState>,
    profile: AuthenticatedProfile,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .template_service
        .delete(&app_state.db_pool, profile.0, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
