// src/services/public_service.rs
//
// Orquestra o fluxo público (sem sessão): a posse do public_token é a
// única credencial. O passo do assistente nunca é persistido — é derivado
// do status a cada chamada.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{Acquire, Executor, PgConnection, Postgres};

use crate::{
    common::error::AppError,
    db::{ContractRepository, PaymentRepository, ProposalRepository},
    models::proposal::{
        ContractPreviewResponse, Proposal, ProposalEvent, ProposalStatus, PublicItemView,
        PublicPaymentView, PublicProposalView, PublicStep,
    },
    services::{contract_service, storage, storage::Storage},
};

#[derive(Clone)]
pub struct PublicService {
    repo: ProposalRepository,
    contract_repo: ContractRepository,
    payment_repo: PaymentRepository,
    storage: Arc<dyn Storage>,
}

impl PublicService {
    pub fn new(
        repo: ProposalRepository,
        contract_repo: ContractRepository,
        payment_repo: PaymentRepository,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            repo,
            contract_repo,
            payment_repo,
            storage,
        }
    }

    /// Rascunho não tem página pública: o token só vale depois do envio.
    async fn fetch_public(
        &self,
        conn: &mut PgConnection,
        public_token: &str,
    ) -> Result<Proposal, AppError> {
        let proposal = self
            .repo
            .find_by_token(&mut *conn, public_token)
            .await?
            .ok_or(AppError::ProposalNotFound)?;

        if proposal.status == ProposalStatus::Draft {
            return Err(AppError::ProposalNotFound);
        }

        Ok(proposal)
    }

    async fn assemble_view(
        &self,
        conn: &mut PgConnection,
        proposal: Proposal,
    ) -> Result<PublicProposalView, AppError> {
        let items = self.repo.list_items(&mut *conn, proposal.id).await?;

        let payment = match proposal.payment_config_id {
            Some(config_id) => self
                .payment_repo
                .find_any(&mut *conn, config_id)
                .await?
                .map(|config| PublicPaymentView {
                    label: config.label,
                    method: config.method,
                    pix_key: config.pix_key,
                    bank_details: config.bank_details,
                    payment_link: config.payment_link,
                    instructions: config.instructions,
                }),
            None => None,
        };

        let today = Utc::now().date_naive();
        let expired = proposal.is_expired(today);
        let step = if expired {
            PublicStep::Proposal
        } else {
            PublicStep::from_status(proposal.status)
        };

        let items = items
            .into_iter()
            .map(|item| PublicItemView {
                unit_price: item.show_price.then_some(item.unit_price),
                line_total: item
                    .show_price
                    .then(|| item.unit_price * Decimal::from(item.quantity)),
                name: item.name,
                details: item.details,
                quantity: item.quantity,
                show_price: item.show_price,
            })
            .collect();

        Ok(PublicProposalView {
            title: proposal.title,
            proposal_type: proposal.proposal_type,
            status: proposal.status,
            step,
            expired,
            items,
            total_amount: proposal.total_amount,
            discount_amount: proposal.discount_amount,
            has_contract_content: proposal
                .contract_content
                .as_deref()
                .is_some_and(|content| !content.trim().is_empty()),
            contract_file_url: proposal.contract_file_url,
            required_fields: proposal.required_fields,
            client_name: proposal.client_name,
            client_email: proposal.client_email,
            change_request_notes: proposal.change_request_notes,
            valid_until: proposal.valid_until,
            viewed_at: proposal.viewed_at,
            approved_at: proposal.approved_at,
            payment,
            payment_receipt_url: proposal.payment_receipt_url,
            cover_video_url: proposal.cover_video_url,
        })
    }

    /// Abertura do link. A primeira visita com status SENT vira VIEWED;
    /// visitas seguintes não re-disparam. Proposta expirada não transiciona:
    /// a expiração é só de exibição e o status persistido fica intacto.
    pub async fn view<'e, E>(
        &self,
        executor: E,
        public_token: &str,
    ) -> Result<PublicProposalView, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let proposal = self.fetch_public(&mut conn, public_token).await?;
        let today = Utc::now().date_naive();

        let proposal = if !proposal.is_expired(today) && proposal.status == ProposalStatus::Sent {
            self.repo
                .mark_viewed(&mut *conn, proposal.id)
                .await?
                .unwrap_or(proposal)
        } else {
            proposal
        };

        self.assemble_view(&mut conn, proposal).await
    }

    pub async fn approve<'e, E>(
        &self,
        executor: E,
        public_token: &str,
    ) -> Result<PublicProposalView, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let proposal = self.fetch_public(&mut conn, public_token).await?;
        if proposal.is_expired(Utc::now().date_naive()) {
            return Err(AppError::ProposalExpired);
        }

        proposal.status.apply(ProposalEvent::Approve)?;

        let updated = self
            .repo
            .mark_approved(&mut *conn, proposal.id)
            .await?
            .ok_or(AppError::InvalidTransition {
                from: proposal.status.to_string(),
                event: ProposalEvent::Approve.to_string(),
            })?;

        self.assemble_view(&mut conn, updated).await
    }

    /// Pedido de ajustes: guarda as observações e devolve a apresentação ao
    /// passo da proposta. A notificação ao fotógrafo é superfície externa;
    /// aqui só registramos.
    pub async fn request_changes<'e, E>(
        &self,
        executor: E,
        public_token: &str,
        notes: &str,
    ) -> Result<PublicProposalView, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let proposal = self.fetch_public(&mut conn, public_token).await?;
        if proposal.is_expired(Utc::now().date_naive()) {
            return Err(AppError::ProposalExpired);
        }

        proposal.status.apply(ProposalEvent::RequestChanges)?;

        let updated = self
            .repo
            .mark_changes_requested(&mut *conn, proposal.id, notes)
            .await?
            .ok_or(AppError::InvalidTransition {
                from: proposal.status.to_string(),
                event: ProposalEvent::RequestChanges.to_string(),
            })?;

        tracing::info!(
            proposal_id = %updated.id,
            "Cliente solicitou alterações na proposta"
        );

        self.assemble_view(&mut conn, updated).await
    }

    /// Passo formulário → contrato: grava os dados do cliente e devolve o
    /// texto já substituído. Contrato por arquivo não pré-renderiza nada;
    /// o cliente lê o próprio arquivo.
    pub async fn preview_contract<'e, E>(
        &self,
        executor: E,
        public_token: &str,
        client_name: &str,
        client_email: Option<&str>,
        client_data: &Value,
    ) -> Result<ContractPreviewResponse, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let proposal = self.fetch_public(&mut conn, public_token).await?;
        let today = Utc::now().date_naive();
        if proposal.is_expired(today) {
            return Err(AppError::ProposalExpired);
        }

        match proposal.status {
            ProposalStatus::Approved => {}
            ProposalStatus::Signed | ProposalStatus::Paid => {
                return Err(AppError::AlreadySigned);
            }
            other => {
                return Err(AppError::InvalidTransition {
                    from: other.to_string(),
                    event: "CLIENT_FORM".to_string(),
                });
            }
        }

        // Last-write-wins: duas abas com o mesmo link, vence a última.
        let updated = self
            .repo
            .save_client_data(&mut *conn, proposal.id, client_name, client_email, client_data)
            .await?
            .unwrap_or(proposal);

        let content = match updated.contract_content.as_deref() {
            Some(text) if !text.trim().is_empty() => {
                let items = self.repo.list_items(&mut *conn, updated.id).await?;
                Some(contract_service::render_contract(
                    text,
                    &contract_service::client_values(&updated.client_data),
                    &items,
                    updated.total_amount,
                    today,
                ))
            }
            _ => None,
        };

        Ok(ContractPreviewResponse {
            content,
            contract_file_url: updated.contract_file_url,
            step: PublicStep::Contract,
        })
    }

    /// Assinatura: o gate duro é aceite explícito + assinatura não vazia.
    /// O upload da imagem acontece antes da transação; se a transição
    /// falhar depois, sobra uma imagem órfã no storage — aceitável. Status
    /// SIGNED sem registro de contrato não existe: ambos nascem na mesma
    /// transação.
    #[allow(clippy::too_many_arguments)]
    pub async fn sign<'e, E>(
        &self,
        executor: E,
        public_token: &str,
        client_name: &str,
        client_email: Option<&str>,
        client_data: &Value,
        accepted_contract: bool,
        signature: &str,
        client_ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<PublicProposalView, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let proposal = self.fetch_public(&mut conn, public_token).await?;
        let today = Utc::now().date_naive();
        if proposal.is_expired(today) {
            return Err(AppError::ProposalExpired);
        }

        match proposal.status {
            ProposalStatus::Signed | ProposalStatus::Paid => {
                return Err(AppError::AlreadySigned)
            }
            status => {
                status.apply(ProposalEvent::Sign)?;
            }
        }

        if !accepted_contract {
            return Err(AppError::ContractNotAccepted);
        }
        if signature.trim().is_empty() {
            return Err(AppError::SignatureMissing);
        }

        let items = self.repo.list_items(&mut *conn, proposal.id).await?;

        let (bytes, extension) = storage::decode_data_url(signature)?;
        let signature_url = self.storage.upload(&bytes, &extension).await?;

        let mut tx = conn.begin().await?;

        let updated = self
            .repo
            .mark_signed(&mut *tx, proposal.id, client_name, client_email, client_data)
            .await?
            // Corrida mais provável quando a guarda falha: duas abas
            // assinando o mesmo link.
            .ok_or(AppError::AlreadySigned)?;

        let signed_content = updated.contract_content.as_deref().map(|text| {
            contract_service::render_contract(
                text,
                &contract_service::client_values(client_data),
                &items,
                updated.total_amount,
                today,
            )
        });

        self.contract_repo
            .create(
                &mut *tx,
                updated.id,
                signed_content.as_deref(),
                updated.contract_file_url.as_deref(),
                client_data,
                &signature_url,
                client_ip,
                user_agent,
            )
            .await?;

        tx.commit().await?;

        self.assemble_view(&mut conn, updated).await
    }

    /// Comprovante de pagamento do cliente. Independente do status: PAID só
    /// acontece pela confirmação manual do fotógrafo.
    pub async fn upload_receipt<'e, E>(
        &self,
        executor: E,
        public_token: &str,
        payload: &str,
    ) -> Result<PublicProposalView, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let proposal = self.fetch_public(&mut conn, public_token).await?;

        match proposal.status {
            ProposalStatus::Signed | ProposalStatus::Paid => {}
            other => {
                return Err(AppError::InvalidTransition {
                    from: other.to_string(),
                    event: "UPLOAD_RECEIPT".to_string(),
                });
            }
        }

        let (bytes, extension) = storage::decode_data_url(payload)?;
        let receipt_url = self.storage.upload(&bytes, &extension).await?;

        let updated = self
            .repo
            .set_receipt(&mut *conn, proposal.id, &receipt_url)
            .await?
            .unwrap_or(proposal);

        self.assemble_view(&mut conn, updated).await
    }

    /// Registro congelado da assinatura, para download/auditoria.
    pub async fn get_contract<'e, E>(
        &self,
        executor: E,
        public_token: &str,
    ) -> Result<crate::models::proposal::Contract, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let proposal = self.fetch_public(&mut conn, public_token).await?;

        self.contract_repo
            .find_by_proposal(&mut *conn, proposal.id)
            .await?
            .ok_or(AppError::ContractNotFound)
    }
}
