// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Dados de exibição do estúdio, usados no cabeçalho/rodapé do PDF do
// contrato. O cadastro em si pertence ao serviço de auth externo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudioSettings {
    #[schema(ignore)]
    pub profile_id: Uuid,

    #[schema(example = "Estúdio Luz & Prata")]
    pub studio_name: Option<String>,

    #[schema(example = "12.345.678/0001-99")]
    pub document_number: Option<String>,

    #[schema(example = "Rua das Flores, 123 - Centro")]
    pub address: Option<String>,

    #[schema(example = "(11) 99999-8888")]
    pub phone: Option<String>,

    #[schema(example = "contato@estudio.com.br")]
    pub email: Option<String>,

    #[schema(example = "https://estudio.com.br/assets/logo.png")]
    pub logo_url: Option<String>,

    pub updated_at: Option<DateTime<Utc>>,
}
