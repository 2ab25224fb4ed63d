use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Item inválido: {0}")]
    InvalidItem(String),

    #[error("Proposta não encontrada")]
    ProposalNotFound,

    #[error("Modelo não encontrado")]
    TemplateNotFound,

    #[error("Configuração de pagamento não encontrada")]
    PaymentConfigNotFound,

    #[error("Contrato não encontrado")]
    ContractNotFound,

    // Guarda do ciclo de vida: o status atual não aceita o evento pedido.
    #[error("Transição inválida: {from} não aceita o evento {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Proposta expirada")]
    ProposalExpired,

    #[error("Título obrigatório para envio")]
    MissingTitle,

    #[error("Contrato obrigatório para envio")]
    MissingContract,

    #[error("O valor total precisa ser positivo para envio")]
    TotalNotPositive,

    #[error("Assinatura ausente")]
    SignatureMissing,

    #[error("Contrato não aceito")]
    ContractNotAccepted,

    #[error("Proposta já assinada")]
    AlreadySigned,

    #[error("Proposta bloqueada")]
    ProposalLocked,

    #[error("Campo obrigatório: {0}")]
    MissingRequiredField(String),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro de armazenamento: {0}")]
    StorageError(String),

    // Variante para erros de banco de dados (exemplo com sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retornar todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::InvalidTransition { ref from, ref event } => {
                let body = Json(json!({
                    "error": "Esta ação não é permitida no status atual da proposta.",
                    "details": { "status": from, "evento": event },
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }

            AppError::InvalidItem(ref msg) => {
                let body = Json(json!({ "error": msg }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }

            AppError::ProposalNotFound => (StatusCode::NOT_FOUND, "Proposta não encontrada."),
            AppError::TemplateNotFound => (StatusCode::NOT_FOUND, "Modelo de proposta não encontrado."),
            AppError::PaymentConfigNotFound => (StatusCode::NOT_FOUND, "Configuração de pagamento não encontrada."),
            AppError::ContractNotFound => (StatusCode::NOT_FOUND, "Contrato não encontrado."),

            AppError::ProposalExpired => (StatusCode::GONE, "Esta proposta expirou."),

            AppError::MissingTitle => (StatusCode::UNPROCESSABLE_ENTITY, "Informe um título antes de enviar a proposta."),
            AppError::MissingContract => (StatusCode::UNPROCESSABLE_ENTITY, "Adicione o contrato (texto ou arquivo) antes de enviar a proposta."),
            AppError::TotalNotPositive => (StatusCode::UNPROCESSABLE_ENTITY, "O valor total da proposta precisa ser maior que zero para envio."),
            AppError::SignatureMissing => (StatusCode::UNPROCESSABLE_ENTITY, "Desenhe a assinatura antes de concluir."),
            AppError::ContractNotAccepted => (StatusCode::UNPROCESSABLE_ENTITY, "É necessário aceitar os termos do contrato para assinar."),

            AppError::AlreadySigned => (StatusCode::CONFLICT, "Esta proposta já foi assinada."),
            AppError::ProposalLocked => (StatusCode::CONFLICT, "A proposta não aceita mais alterações ou exclusão."),

            AppError::MissingRequiredField(ref field) => {
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": { "field": field, "code": "required" },
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::UniqueConstraintViolation(ref _detail) => (StatusCode::CONFLICT, "Registro duplicado."),

            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente."),
            AppError::JwtError(_) => (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente."),

            // Todos os outros erros (DatabaseError, StorageError, InternalServerError) viram 500.
            // O `tracing` vai logar a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
