// src/services/template_service.rs

use chrono::{Duration, NaiveDate};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{PaymentRepository, TemplateRepository},
    models::{
        proposal::{ProposalDraft, ProposalItemInput},
        template::ProposalTemplate,
    },
    services::{contract_service, proposal_service},
};

/// Aplica um modelo ao rascunho em edição. Transformação pura, em memória:
/// nada é persistido até o save do editor, e o modelo nunca é alterado.
///
/// Regras:
/// - contrato: copiado só quando o modelo tem conteúdo (modelo vazio nunca
///   limpa um rascunho já preenchido);
/// - configuração de pagamento: copiada incondicionalmente quando definida;
/// - valid_until: hoje + default_valid_days, só quando o modelo define;
/// - itens: default_items vira a lista do editor, reindexada a partir de 0
///   (quando o modelo não tem itens, a lista atual fica como está).
pub fn apply_template(
    template: &ProposalTemplate,
    mut draft: ProposalDraft,
    items: Vec<ProposalItemInput>,
    today: NaiveDate,
) -> (ProposalDraft, Vec<ProposalItemInput>) {
    if let Some(content) = &template.content {
        if !content.trim().is_empty() {
            draft.contract_content = Some(content.clone());
        }
    }

    if template.default_payment_config_id.is_some() {
        draft.payment_config_id = template.default_payment_config_id;
    }

    if let Some(days) = template.default_valid_days {
        draft.valid_until = Some(today + Duration::days(days as i64));
    }

    // default_items é JSONB gravado por nós; se algo externo corromper o
    // formato, o modelo degrada para "sem itens" em vez de travar o editor.
    let template_items: Vec<ProposalItemInput> =
        serde_json::from_value(template.default_items.clone()).unwrap_or_default();

    let items = if template_items.is_empty() {
        items
    } else {
        template_items
    };

    (draft, items)
}

#[derive(Clone)]
pub struct TemplateService {
    repo: TemplateRepository,
    payment_repo: PaymentRepository,
}

impl TemplateService {
    pub fn new(repo: TemplateRepository, payment_repo: PaymentRepository) -> Self {
        Self { repo, payment_repo }
    }

    /// As variáveis declaradas são re-extraídas do conteúdo a cada save;
    /// itens sem nome são descartados como no editor de propostas.
    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        name: &str,
        content: Option<&str>,
        items: Vec<ProposalItemInput>,
        default_payment_config_id: Option<Uuid>,
        default_valid_days: Option<i32>,
    ) -> Result<ProposalTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if let Some(config_id) = default_payment_config_id {
            self.payment_repo
                .find_by_id(&mut *tx, config_id, profile_id)
                .await?
                .ok_or(AppError::PaymentConfigNotFound)?;
        }

        let items = proposal_service::sanitize_items(items);
        let variables = content
            .map(contract_service::extract_variables)
            .unwrap_or_default();
        let default_items = serde_json::to_value(&items)
            .map_err(|e| AppError::InternalServerError(e.into()))?;

        let template = self
            .repo
            .create(
                &mut *tx,
                profile_id,
                name,
                content,
                &default_items,
                default_payment_config_id,
                default_valid_days,
                &variables,
            )
            .await?;

        tx.commit().await?;
        Ok(template)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        id: Uuid,
        name: &str,
        content: Option<&str>,
        items: Vec<ProposalItemInput>,
        default_payment_config_id: Option<Uuid>,
        default_valid_days: Option<i32>,
    ) -> Result<ProposalTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if let Some(config_id) = default_payment_config_id {
            self.payment_repo
                .find_by_id(&mut *tx, config_id, profile_id)
                .await?
                .ok_or(AppError::PaymentConfigNotFound)?;
        }

        let items = proposal_service::sanitize_items(items);
        let variables = content
            .map(contract_service::extract_variables)
            .unwrap_or_default();
        let default_items = serde_json::to_value(&items)
            .map_err(|e| AppError::InternalServerError(e.into()))?;

        let template = self
            .repo
            .update(
                &mut *tx,
                id,
                profile_id,
                name,
                content,
                &default_items,
                default_payment_config_id,
                default_valid_days,
                &variables,
            )
            .await?
            .ok_or(AppError::TemplateNotFound)?;

        tx.commit().await?;
        Ok(template)
    }

    pub async fn get<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        id: Uuid,
    ) -> Result<ProposalTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, id, profile_id)
            .await?
            .ok_or(AppError::TemplateNotFound)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
    ) -> Result<Vec<ProposalTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_by_profile(executor, profile_id).await
    }

    pub async fn delete<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deleted = self.repo.delete(executor, id, profile_id).await?;
        if deleted == 0 {
            return Err(AppError::TemplateNotFound);
        }
        Ok(())
    }
}
