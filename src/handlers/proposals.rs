// src/handlers/proposals.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedProfile,
    models::proposal::{
        Proposal, ProposalDetail, ProposalDraft, ProposalItemInput, ProposalType,
    },
};

// Payload único do editor: criação (com modelo opcional) e save usam o
// mesmo formato. Título vazio é permitido em rascunho; o envio é que exige.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalPayload {
    // Só considerado na criação; o save ignora.
    pub template_id: Option<Uuid>,

    #[serde(default)]
    #[schema(example = "Ensaio de casamento — Ana & Pedro")]
    pub title: String,

    #[serde(default)]
    pub proposal_type: ProposalType,

    pub lead_id: Option<Uuid>,
    pub payment_config_id: Option<Uuid>,

    #[serde(default)]
    pub use_manual_total: bool,

    #[schema(example = "2500.00")]
    pub manual_amount: Option<Decimal>,

    #[serde(default)]
    #[schema(example = "100.00")]
    pub discount_amount: Decimal,

    pub contract_content: Option<String>,

    pub client_name: Option<String>,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "maria@email.com")]
    pub client_email: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "2026-09-30")]
    pub valid_until: Option<NaiveDate>,

    pub cover_video_url: Option<String>,
    pub revision_limit: Option<i32>,
    pub delivery_formats: Option<Vec<String>>,
    pub estimated_duration_min: Option<i32>,
    pub reference_links: Option<Vec<String>>,
    pub soundtrack_links: Option<Vec<String>>,

    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<ProposalItemInput>,
}

impl ProposalPayload {
    fn into_parts(self) -> (Option<Uuid>, ProposalDraft, Vec<ProposalItemInput>) {
        let draft = ProposalDraft {
            title: self.title,
            proposal_type: self.proposal_type,
            lead_id: self.lead_id,
            payment_config_id: self.payment_config_id,
            use_manual_total: self.use_manual_total,
            manual_amount: self.manual_amount,
            discount_amount: self.discount_amount,
            contract_content: self.contract_content,
            client_name: self.client_name,
            client_email: self.client_email,
            valid_until: self.valid_until,
            cover_video_url: self.cover_video_url,
            revision_limit: self.revision_limit,
            delivery_formats: self.delivery_formats,
            estimated_duration_min: self.estimated_duration_min,
            reference_links: self.reference_links,
            soundtrack_links: self.soundtrack_links,
        };

        (self.template_id, draft, self.items)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractFilePayload {
    // data-URL base64 (PDF ou imagem)
    #[validate(length(min = 1, message = "required"))]
    pub file: String,
}

// POST /api/proposals
#[utoipa::path(
    post,
    path = "/api/proposals",
    tag = "Proposals",
    request_body = ProposalPayload,
    responses(
        (status = 201, description = "Proposta criada em rascunho", body = ProposalDetail),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_proposal(
    State(app_state): State<AppState>,
    profile: AuthenticatedProfile,
    Json(payload): Json<ProposalPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (template_id, draft, items) = payload.into_parts();

    let detail = app_state
        .proposal_service
        .create(&app_state.db_pool, profile.0, template_id, draft, items)
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/proposals
#[utoipa::path(
    get,
    path = "/api/proposals",
    tag = "Proposals",
    responses(
        (status = 200, description = "Lista de propostas do perfil", body = Vec<Proposal>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_proposals(
    State(app_state): State<AppState>,
    profile: AuthenticatedProfile,
) -> Result<impl IntoResponse, AppError> {
    let proposals = app_state
        .proposal_service
        .list(&app_state.db_pool, profile.0)
        .await?;

    Ok((StatusCode::OK, Json(proposals)))
}

// GET /api/proposals/{id}
#[utoipa::path(
    get,
    path = "/api/proposals/{id}",
    tag = "Proposals",
    params(("id" = Uuid, Path, description = "ID da proposta")),
    responses(
        (status = 200, description = "Proposta com itens", body = ProposalDetail),
        (status = 404, description = "Proposta não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_proposal(
    State(app_state): State<AppState>,
    profile: AuthenticatedProfile,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .proposal_service
        .get(&app_state.db_pool, profile.0, id)
        .await?;

    Ok((StatusCode::OK, Json(detail)))
}

// PUT /api/proposals/{id}
#[utoipa::path(
    put,
    path = "/api/proposals/{id}",
    tag = "Proposals",
    params(("id" = Uuid, Path, description = "ID da proposta")),
    request_body = ProposalPayload,
    responses(
        (status = 200, description = "Proposta atualizada (itens reconciliados)", body = ProposalDetail),
        (status = 404, description = "Proposta não encontrada"),
        (status = 409, description = "Proposta não aceita mais edição")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_proposal(
    State(app_state): State<AppState>,
    profile: AuthenticatedProfile,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProposalPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (_, draft, items) = payload.into_parts();

    let detail = app_state
        .proposal_service
        .update(&app_state.db_pool, profile.0, id, draft, items)
        .await?;

    Ok((StatusCode::OK, Json(detail)))
}

// DELETE /api/proposals/{id}
#[utoipa::path(
    delete,
    path = "/api/proposals/{id}",
    tag = "Proposals",
    params(("id" = Uuid, Path, description = "ID da proposta")),
    responses(
        (status = 204, description = "Proposta excluída"),
        (status = 409, description = "Proposta assinada não pode ser excluída")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_proposal(
    State(app_state): State<AppState>,
    profile: AuthenticatedProfile,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .proposal_service
        .delete(&app_state.db_pool, profile.0, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/proposals/{id}/send
#[utoipa::path(
    post,
    path = "/api/proposals/{id}/send",
    tag = "Proposals",
    params(("id" = Uuid, Path, description = "ID da proposta")),
    responses(
        (status = 200, description = "Proposta enviada", body = Proposal),
        (status = 409, description = "Status atual não permite envio"),
        (status = 422, description = "Título, contrato ou total inválidos para envio")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_proposal(
    State(app_state): State<AppState>,
    profile: AuthenticatedProfile,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let proposal = app_state
        .proposal_service
        .send(&app_state.db_pool, profile.0, id)
        .await?;

    Ok((StatusCode::OK, Json(proposal)))
}

// POST /api/proposals/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/proposals/{id}/cancel",
    tag = "Proposals",
    params(("id" = Uuid, Path, description = "ID da proposta")),
    responses(
        (status = 200, description = "Proposta cancelada", body = Proposal),
        (status = 409, description = "Status atual não permite cancelamento")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_proposal(
    State(app_state): State<AppState>,
    profile: AuthenticatedProfile,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let proposal = app_state
        .proposal_service
        .cancel(&app_state.db_pool, profile.0, id)
        .await?;

    Ok((StatusCode::OK, Json(proposal)))
}

// POST /api/proposals/{id}/confirm-payment
#[utoipa::path(
    post,
    path = "/api/proposals/{id}/confirm-payment",
    tag = "Proposals",
    params(("id" = Uuid, Path, description = "ID da proposta")),
    responses(
        (status = 200, description = "Pagamento confirmado", body = Proposal),
        (status = 409, description = "Proposta ainda não assinada")
    ),
    security(("api_jwt" = []))
)]
pub async fn confirm_payment(
    State(app_state): State<AppState>,
    profile: AuthenticatedProfile,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let proposal = app_state
        .proposal_service
        .confirm_payment(&app_state.db_pool, profile.0, id)
        .await?;

    Ok((StatusCode::OK, Json(proposal)))
}

// POST /api/proposals/{id}/contract-file
#[utoipa::path(
    post,
    path = "/api/proposals/{id}/contract-file",
    tag = "Proposals",
    params(("id" = Uuid, Path, description = "ID da proposta")),
    request_body = ContractFilePayload,
    responses(
        (status = 200, description = "Arquivo de contrato anexado", body = Proposal),
        (status = 409, description = "Proposta não aceita mais edição")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_contract_file(
    State(app_state): State<AppState>,
    profile: AuthenticatedProfile,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContractFilePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let proposal = app_state
        .proposal_service
        .upload_contract_file(&app_state.db_pool, profile.0, id, &payload.file)
        .await?;

    Ok((StatusCode::OK, Json(proposal)))
}
