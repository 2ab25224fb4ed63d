// src/models/payment.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Pix,
    BankTransfer,
    PaymentLink,
    Custom,
}

// Preset de instruções de pagamento do perfil. A proposta referencia,
// mas nunca é dona: excluir o preset não apaga a proposta.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfig {
    pub id: Uuid,

    #[schema(ignore)]
    pub profile_id: Uuid,

    #[schema(example = "PIX do estúdio")]
    pub label: String,

    pub method: PaymentMethod,

    #[schema(example = "contato@estudio.com.br")]
    pub pix_key: Option<String>,

    #[schema(example = "Banco 341 / Ag 0001 / CC 12345-6")]
    pub bank_details: Option<String>,

    #[schema(example = "https://pagamento.exemplo.com/estudio")]
    pub payment_link: Option<String>,

    pub instructions: Option<String>,

    pub created_at: DateTime<Utc>,
}
