// src/models/template.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Modelo reutilizável de proposta. Aplicar um modelo nunca o altera:
// os valores são copiados para o rascunho em edição.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalTemplate {
    pub id: Uuid,

    #[schema(ignore)]
    pub profile_id: Uuid,

    #[schema(example = "Casamento — pacote completo")]
    pub name: String,

    // Texto do contrato com {{variaveis}}.
    pub content: Option<String>,

    // Lista serializada de ProposalItemInput.
    #[schema(example = json!([{"name": "Ensaio externo", "quantity": 1, "unitPrice": 350.00, "showPrice": true}]))]
    pub default_items: Value,

    pub default_payment_config_id: Option<Uuid>,

    // Usado para calcular o valid_until da proposta no momento da aplicação.
    #[schema(example = 15)]
    pub default_valid_days: Option<i32>,

    // Nomes de placeholder declarados, extraídos do content a cada save.
    #[schema(example = json!(["nome_completo", "cpf"]))]
    pub variables: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
