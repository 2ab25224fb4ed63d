// src/handlers/public.rs
//
// Rotas do fluxo público do cliente. Nenhuma sessão: o public_token na URL
// é a única credencial (modelo URL-capacidade), então nada aqui passa pelo
// auth_guard.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::proposal::{Contract, ContractPreviewResponse, PublicProposalView},
};

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestChangesPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Pode incluir um álbum 30x30?")]
    pub notes: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientDataPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Maria da Silva")]
    pub client_name: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "maria@email.com")]
    pub client_email: Option<String>,

    // Valores das variáveis do contrato (required_fields).
    #[serde(default)]
    #[schema(example = json!({"cpf": "123.456.789-00"}))]
    pub client_data: Value,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Maria da Silva")]
    pub client_name: String,

    #[validate(email(message = "invalid_email"))]
    pub client_email: Option<String>,

    #[serde(default)]
    pub client_data: Value,

    // Gate duro: sem aceite explícito não há assinatura.
    #[serde(default)]
    pub accepted_contract: bool,

    // Imagem da assinatura desenhada, como data-URL base64.
    #[serde(default)]
    pub signature: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptPayload {
    #[validate(length(min = 1, message = "required"))]
    pub file: String,
}

// GET /api/public/proposals/{token}
#[utoipa::path(
    get,
    path = "/api/public/proposals/{token}",
    tag = "Public",
    params(("token" = String, Path, description = "Token público da proposta")),
    responses(
        (status = 200, description = "Proposta pública (primeira visita marca VIEWED)", body = PublicProposalView),
        (status = 404, description = "Token desconhecido")
    )
)]
pub async fn view_proposal(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let view = app_state
        .public_service
        .view(&app_state.db_pool, &token)
        .await?;

    Ok((StatusCode::OK, Json(view)))
}

// POST /api/public/proposals/{token}/approve
#[utoipa::path(
    post,
    path = "/api/public/proposals/{token}/approve",
    tag = "Public",
    params(("token" = String, Path, description = "Token público da proposta")),
    responses(
        (status = 200, description = "Proposta aprovada; assistente avança para o formulário", body = PublicProposalView),
        (status = 409, description = "Status atual não permite aprovação"),
        (status = 410, description = "Proposta expirada")
    )
)]
pub async fn approve_proposal(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let view = app_state
        .public_service
        .approve(&app_state.db_pool, &token)
        .await?;

    Ok((StatusCode::OK, Json(view)))
}

// POST /api/public/proposals/{token}/request-changes
#[utoipa::path(
    post,
    path = "/api/public/proposals/{token}/request-changes",
    tag = "Public",
    params(("token" = String, Path, description = "Token público da proposta")),
    request_body = RequestChangesPayload,
    responses(
        (status = 200, description = "Alterações solicitadas; cliente volta à proposta", body = PublicProposalView),
        (status = 409, description = "Status atual não permite o pedido")
    )
)]
pub async fn request_changes(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<RequestChangesPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let view = app_state
        .public_service
        .request_changes(&app_state.db_pool, &token, &payload.notes)
        .await?;

    Ok((StatusCode::OK, Json(view)))
}

// POST /api/public/proposals/{token}/contract
#[utoipa::path(
    post,
    path = "/api/public/proposals/{token}/contract",
    tag = "Public",
    params(("token" = String, Path, description = "Token público da proposta")),
    request_body = ClientDataPayload,
    responses(
        (status = 200, description = "Contrato renderizado com os dados do cliente", body = ContractPreviewResponse),
        (status = 409, description = "Formulário só existe após a aprovação")
    )
)]
pub async fn contract_preview(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ClientDataPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let preview = app_state
        .public_service
        .preview_contract(
            &app_state.db_pool,
            &token,
            &payload.client_name,
            payload.client_email.as_deref(),
            &payload.client_data,
        )
        .await?;

    Ok((StatusCode::OK, Json(preview)))
}

// POST /api/public/proposals/{token}/sign
#[utoipa::path(
    post,
    path = "/api/public/proposals/{token}/sign",
    tag = "Public",
    params(("token" = String, Path, description = "Token público da proposta")),
    request_body = SignPayload,
    responses(
        (status = 200, description = "Contrato assinado; registro congelado criado", body = PublicProposalView),
        (status = 409, description = "Proposta não está aprovada ou já foi assinada"),
        (status = 422, description = "Falta aceite ou assinatura")
    )
)]
pub async fn sign_proposal(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<SignPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let ip = client_ip(&headers);
    let agent = user_agent(&headers);

    let view = app_state
        .public_service
        .sign(
            &app_state.db_pool,
            &token,
            &payload.client_name,
            payload.client_email.as_deref(),
            &payload.client_data,
            payload.accepted_contract,
            &payload.signature,
            ip.as_deref(),
            agent.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(view)))
}

// POST /api/public/proposals/{token}/receipt
#[utoipa::path(
    post,
    path = "/api/public/proposals/{token}/receipt",
    tag = "Public",
    params(("token" = String, Path, description = "Token público da proposta")),
    request_body = ReceiptPayload,
    responses(
        (status = 200, description = "Comprovante anexado (status não muda)", body = PublicProposalView),
        (status = 409, description = "Comprovante só após a assinatura")
    )
)]
pub async fn upload_receipt(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ReceiptPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let view = app_state
        .public_service
        .upload_receipt(&app_state.db_pool, &token, &payload.file)
        .await?;

    Ok((StatusCode::OK, Json(view)))
}

// GET /api/public/proposals/{token}/contract
#[utoipa::path(
    get,
    path = "/api/public/proposals/{token}/contract",
    tag = "Public",
    params(("token" = String, Path, description = "Token público da proposta")),
    responses(
        (status = 200, description = "Registro congelado da assinatura", body = Contract),
        (status = 404, description = "Proposta ainda não assinada")
    )
)]
pub async fn get_contract(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let contract = app_state
        .public_service
        .get_contract(&app_state.db_pool, &token)
        .await?;

    Ok((StatusCode::OK, Json(contract)))
}

// GET /api/public/proposals/{token}/contract.pdf
#[utoipa::path(
    get,
    path = "/api/public/proposals/{token}/contract.pdf",
    tag = "Public",
    params(("token" = String, Path, description = "Token público da proposta")),
    responses(
        (status = 200, description = "PDF do contrato", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "Sem texto de contrato para renderizar")
    )
)]
pub async fn download_contract_pdf(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, AppError> {
    let pdf_bytes = app_state
        .document_service
        .generate_contract_pdf(&app_state.db_pool, &token)
        .await?;

    // Configura os Headers para o navegador baixar ou mostrar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"contrato_{}.pdf\"", token),
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}
