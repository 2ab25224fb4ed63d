// src/models/proposal.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "proposal_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalType {
    #[default]
    Photo,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "proposal_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    Draft,            // Em edição
    Sent,             // Enviada ao cliente
    Viewed,           // Cliente abriu o link
    Approved,         // Cliente aprovou o orçamento
    ChangesRequested, // Cliente pediu ajustes
    Signed,           // Contrato assinado
    Paid,             // Pagamento confirmado
    Cancelled,        // Cancelada pelo fotógrafo
}

// Eventos que movem a proposta pelo ciclo de vida.
// `Send`/`ConfirmPayment`/`Cancel` são do fotógrafo; o restante, do cliente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalEvent {
    Send,
    ClientView,
    Approve,
    RequestChanges,
    Sign,
    ConfirmPayment,
    Cancel,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Draft => "DRAFT",
            ProposalStatus::Sent => "SENT",
            ProposalStatus::Viewed => "VIEWED",
            ProposalStatus::Approved => "APPROVED",
            ProposalStatus::ChangesRequested => "CHANGES_REQUESTED",
            ProposalStatus::Signed => "SIGNED",
            ProposalStatus::Paid => "PAID",
            ProposalStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProposalStatus::Paid | ProposalStatus::Cancelled)
    }

    /// A tabela de transições do ciclo de vida, pura e sem I/O.
    /// Os repositórios reforçam a mesma regra com UPDATEs guardados por
    /// status, então um ator com estado defasado falha em vez de sobrescrever.
    pub fn apply(self, event: ProposalEvent) -> Result<ProposalStatus, AppError> {
        use ProposalEvent as E;
        use ProposalStatus as S;

        let next = match (self, event) {
            (S::Draft, E::Send) => S::Sent,
            (S::Sent, E::ClientView) => S::Viewed,
            (S::Sent | S::Viewed | S::ChangesRequested, E::Approve) => S::Approved,
            (S::Sent | S::Viewed, E::RequestChanges) => S::ChangesRequested,
            (S::Approved, E::Sign) => S::Signed,
            (S::Signed, E::ConfirmPayment) => S::Paid,
            (from, E::Cancel) if !from.is_terminal() => S::Cancelled,
            (from, event) => {
                return Err(AppError::InvalidTransition {
                    from: from.to_string(),
                    event: event.to_string(),
                })
            }
        };

        Ok(next)
    }
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ProposalEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalEvent::Send => "SEND",
            ProposalEvent::ClientView => "CLIENT_VIEW",
            ProposalEvent::Approve => "APPROVE",
            ProposalEvent::RequestChanges => "REQUEST_CHANGES",
            ProposalEvent::Sign => "SIGN",
            ProposalEvent::ConfirmPayment => "CONFIRM_PAYMENT",
            ProposalEvent::Cancel => "CANCEL",
        }
    }
}

impl std::fmt::Display for ProposalEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Passo do assistente público. Nunca é persistido: é derivado do status
// a cada carga, então o cliente retoma de onde o registro diz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PublicStep {
    Proposal,
    Form,
    Contract,
    Signature,
    Success,
}

impl PublicStep {
    pub fn from_status(status: ProposalStatus) -> Self {
        match status {
            ProposalStatus::Approved => PublicStep::Form,
            ProposalStatus::Signed | ProposalStatus::Paid => PublicStep::Success,
            _ => PublicStep::Proposal,
        }
    }
}

// --- Structs (linhas do banco) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: Uuid,

    #[schema(ignore)]
    pub profile_id: Uuid,

    // Única credencial do fluxo público: URL-capacidade, sem sessão.
    #[schema(example = "9f2c4a31c56e4b0f8a77d1c2e3b4a5f6")]
    pub public_token: String,

    pub proposal_type: ProposalType,
    pub status: ProposalStatus,

    pub lead_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub payment_config_id: Option<Uuid>,

    #[schema(example = "Ensaio de casamento — Ana & Pedro")]
    pub title: String,

    pub use_manual_total: bool,
    #[schema(example = "2500.00")]
    pub manual_amount: Option<Decimal>,
    #[schema(example = "100.00")]
    pub discount_amount: Decimal,
    #[schema(example = "2400.00")]
    pub total_amount: Decimal,

    pub contract_content: Option<String>,
    pub contract_file_url: Option<String>,

    // Variáveis do contrato que o formulário público precisa coletar.
    #[schema(example = json!(["nome_completo", "cpf"]))]
    pub required_fields: Vec<String>,

    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_data: Value,

    // Campos específicos de propostas de vídeo
    pub cover_video_url: Option<String>,
    pub revision_limit: Option<i32>,
    pub delivery_formats: Option<Vec<String>>,
    pub estimated_duration_min: Option<i32>,
    pub reference_links: Option<Vec<String>>,
    pub soundtrack_links: Option<Vec<String>>,

    pub change_request_notes: Option<String>,
    pub payment_receipt_url: Option<String>,

    pub sent_at: Option<DateTime<Utc>>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,

    #[schema(value_type = Option<String>, format = Date, example = "2026-09-30")]
    pub valid_until: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Proposal {
    /// Expiração é propriedade derivada, só de exibição: o status
    /// persistido nunca muda por causa dela.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        matches!(self.valid_until, Some(limit) if limit < today)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalItem {
    pub id: Uuid,

    #[schema(ignore)]
    pub proposal_id: Uuid,

    #[schema(example = "Ensaio externo")]
    pub name: String,
    pub details: Option<String>,

    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = "350.00")]
    pub unit_price: Decimal,

    // false = item "incluso": aparece na proposta, mas sem preço.
    pub show_price: bool,

    pub order_index: i32,
}

// Registro imutável da assinatura: congelado no momento do aceite,
// é o documento contra o qual uma disputa futura se resolve.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: Uuid,
    pub proposal_id: Uuid,

    pub signed_content: Option<String>,
    pub contract_file_url: Option<String>,

    pub client_data: Value,
    pub signature_image_url: String,
    pub signed_at: DateTime<Utc>,

    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
}

// --- Entrada do editor ---

fn default_quantity() -> i32 {
    1
}

fn default_show_price() -> bool {
    true
}

// Uma linha do editor de itens. Também é o formato serializado em
// `proposal_templates.default_items`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalItemInput {
    // Nome vazio não é erro: o item é descartado em silêncio no save.
    #[schema(example = "Ensaio externo")]
    pub name: String,

    pub details: Option<String>,

    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "invalid_quantity"))]
    #[schema(example = 1)]
    pub quantity: i32,

    #[serde(default)]
    #[schema(example = "350.00")]
    pub unit_price: Decimal,

    #[serde(default = "default_show_price")]
    #[schema(example = true)]
    pub show_price: bool,
}

// Estado em memória do editor, antes de persistir. A aplicação de modelo
// (services/template_service) opera sobre este struct.
#[derive(Debug, Clone, Default)]
pub struct ProposalDraft {
    pub title: String,
    pub proposal_type: ProposalType,
    pub lead_id: Option<Uuid>,
    pub payment_config_id: Option<Uuid>,
    pub use_manual_total: bool,
    pub manual_amount: Option<Decimal>,
    pub discount_amount: Decimal,
    pub contract_content: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub valid_until: Option<NaiveDate>,
    pub cover_video_url: Option<String>,
    pub revision_limit: Option<i32>,
    pub delivery_formats: Option<Vec<String>>,
    pub estimated_duration_min: Option<i32>,
    pub reference_links: Option<Vec<String>>,
    pub soundtrack_links: Option<Vec<String>>,
}

// --- Respostas ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDetail {
    #[serde(flatten)]
    pub header: Proposal,
    pub items: Vec<ProposalItem>,
}

// Item como o cliente vê: preço omitido quando `show_price` é false.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicItemView {
    pub name: String,
    pub details: Option<String>,
    pub quantity: i32,
    pub unit_price: Option<Decimal>,
    pub line_total: Option<Decimal>,
    pub show_price: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicPaymentView {
    #[schema(example = "PIX do estúdio")]
    pub label: String,
    pub method: crate::models::payment::PaymentMethod,
    pub pix_key: Option<String>,
    pub bank_details: Option<String>,
    pub payment_link: Option<String>,
    pub instructions: Option<String>,
}

// Payload completo da página pública: dados + passo derivado + expiração.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProposalView {
    pub title: String,
    pub proposal_type: ProposalType,
    pub status: ProposalStatus,
    pub step: PublicStep,
    pub expired: bool,
    pub items: Vec<PublicItemView>,
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub has_contract_content: bool,
    pub contract_file_url: Option<String>,
    pub required_fields: Vec<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub change_request_notes: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub valid_until: Option<NaiveDate>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub payment: Option<PublicPaymentView>,
    pub payment_receipt_url: Option<String>,
    pub cover_video_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractPreviewResponse {
    // Texto com as variáveis substituídas; None quando o contrato é um
    // arquivo enviado (não há pré-renderização nesse caso).
    pub content: Option<String>,
    pub contract_file_url: Option<String>,
    pub step: PublicStep,
}
