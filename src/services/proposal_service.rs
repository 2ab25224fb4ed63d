// src/services/proposal_service.rs

use std::sync::Arc;

use chrono::Utc;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ContractRepository, ProposalRepository, TemplateRepository},
    models::proposal::{
        Proposal, ProposalDetail, ProposalDraft, ProposalEvent, ProposalItemInput,
    },
    services::{contract_service, pricing, storage, storage::Storage, template_service},
};

/// Filtra a lista editada: item sem nome (após trim) é descartado em
/// silêncio, nunca derruba o save. O order_index de quem fica é a posição
/// na lista filtrada, fechando os buracos.
pub fn sanitize_items(items: Vec<ProposalItemInput>) -> Vec<ProposalItemInput> {
    items
        .into_iter()
        .filter_map(|mut item| {
            let name = item.name.trim();
            if name.is_empty() {
                return None;
            }
            item.name = name.to_string();
            Some(item)
        })
        .collect()
}

pub fn validate_items(items: &[ProposalItemInput]) -> Result<(), AppError> {
    for item in items {
        if item.quantity < 1 {
            return Err(AppError::InvalidItem(format!(
                "Quantidade inválida no item '{}'.",
                item.name
            )));
        }
        if item.unit_price.is_sign_negative() {
            return Err(AppError::InvalidItem(format!(
                "Preço negativo no item '{}'.",
                item.name
            )));
        }
    }
    Ok(())
}

/// Validações de envio. Total negativo pode viver em rascunho, mas nunca
/// passa daqui.
pub fn validate_for_send(proposal: &Proposal) -> Result<(), AppError> {
    if proposal.title.trim().is_empty() {
        return Err(AppError::MissingTitle);
    }

    let has_content = proposal
        .contract_content
        .as_deref()
        .is_some_and(|content| !content.trim().is_empty());
    if !has_content && proposal.contract_file_url.is_none() {
        return Err(AppError::MissingContract);
    }

    if proposal.total_amount <= rust_decimal::Decimal::ZERO {
        return Err(AppError::TotalNotPositive);
    }

    Ok(())
}

#[derive(Clone)]
pub struct ProposalService {
    repo: ProposalRepository,
    template_repo: TemplateRepository,
    contract_repo: ContractRepository,
    storage: Arc<dyn Storage>,
}

impl ProposalService {
    pub fn new(
        repo: ProposalRepository,
        template_repo: TemplateRepository,
        contract_repo: ContractRepository,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            repo,
            template_repo,
            contract_repo,
            storage,
        }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        template_id: Option<Uuid>,
        draft: ProposalDraft,
        items: Vec<ProposalItemInput>,
    ) -> Result<ProposalDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let today = Utc::now().date_naive();

        let (draft, items) = match template_id {
            Some(id) => {
                let template = self
                    .template_repo
                    .find_by_id(&mut *tx, id, profile_id)
                    .await?
                    .ok_or(AppError::TemplateNotFound)?;
                template_service::apply_template(&template, draft, items, today)
            }
            None => (draft, items),
        };

        let items = sanitize_items(items);
        validate_items(&items)?;

        let required_fields = draft
            .contract_content
            .as_deref()
            .map(contract_service::extract_variables)
            .unwrap_or_default();

        let total = pricing::compute_total(
            &items,
            draft.discount_amount,
            draft.use_manual_total,
            draft.manual_amount,
        );

        // Credencial única do fluxo público; precisa ser não-adivinhável.
        let public_token = Uuid::new_v4().simple().to_string();

        let proposal = self
            .repo
            .create(
                &mut *tx,
                profile_id,
                &public_token,
                template_id,
                &draft,
                total,
                &required_fields,
            )
            .await?;

        // Na criação os itens entram direto; a reconciliação
        // apaga-e-reinsere só roda no update.
        let mut inserted = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            inserted.push(
                self.repo
                    .insert_item(&mut *tx, proposal.id, item, index as i32)
                    .await?,
            );
        }

        tx.commit().await?;

        Ok(ProposalDetail {
            header: proposal,
            items: inserted,
        })
    }

    /// Save do editor: recalcula o total, re-extrai as variáveis do contrato
    /// e reconcilia os itens (apaga tudo, insere o conjunto filtrado) dentro
    /// de uma única transação — ou o save inteiro entra, ou nada muda.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        id: Uuid,
        draft: ProposalDraft,
        items: Vec<ProposalItemInput>,
    ) -> Result<ProposalDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let items = sanitize_items(items);
        validate_items(&items)?;

        let required_fields = draft
            .contract_content
            .as_deref()
            .map(contract_service::extract_variables)
            .unwrap_or_default();

        let total = pricing::compute_total(
            &items,
            draft.discount_amount,
            draft.use_manual_total,
            draft.manual_amount,
        );

        let mut tx = executor.begin().await?;

        let updated = self
            .repo
            .update(&mut *tx, id, profile_id, &draft, total, &required_fields)
            .await?;

        let proposal = match updated {
            Some(proposal) => proposal,
            None => {
                // Sem linha atualizada: ou a proposta não existe, ou já
                // passou do ponto de edição.
                return Err(match self.repo.find_by_id(&mut *tx, id, profile_id).await? {
                    Some(_) => AppError::ProposalLocked,
                    None => AppError::ProposalNotFound,
                });
            }
        };

        let items = self.repo.replace_items(&mut *tx, proposal.id, &items).await?;

        tx.commit().await?;

        Ok(ProposalDetail {
            header: proposal,
            items,
        })
    }

    pub async fn get<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        id: Uuid,
    ) -> Result<ProposalDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let proposal = self
            .repo
            .find_by_id(&mut *conn, id, profile_id)
            .await?
            .ok_or(AppError::ProposalNotFound)?;

        let items = self.repo.list_items(&mut *conn, proposal.id).await?;

        Ok(ProposalDetail {
            header: proposal,
            items,
        })
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
    ) -> Result<Vec<Proposal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_by_profile(executor, profile_id).await
    }

    /// Exclusão definitiva. Proposta com contrato assinado nunca sai do
    /// banco; os itens saem antes da proposta (integridade de FK).
    pub async fn delete<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let proposal = self
            .repo
            .find_by_id(&mut *tx, id, profile_id)
            .await?
            .ok_or(AppError::ProposalNotFound)?;

        if self.contract_repo.exists(&mut *tx, proposal.id).await? {
            return Err(AppError::ProposalLocked);
        }

        self.repo.delete_items(&mut *tx, proposal.id).await?;
        self.repo.delete(&mut *tx, id, profile_id).await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn send<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        id: Uuid,
    ) -> Result<Proposal, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let proposal = self
            .repo
            .find_by_id(&mut *tx, id, profile_id)
            .await?
            .ok_or(AppError::ProposalNotFound)?;

        proposal.status.apply(ProposalEvent::Send)?;
        validate_for_send(&proposal)?;

        let updated = self
            .repo
            .mark_sent(&mut *tx, id, profile_id)
            .await?
            .ok_or(AppError::InvalidTransition {
                from: proposal.status.to_string(),
                event: ProposalEvent::Send.to_string(),
            })?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn cancel<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        id: Uuid,
    ) -> Result<Proposal, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let proposal = self
            .repo
            .find_by_id(&mut *tx, id, profile_id)
            .await?
            .ok_or(AppError::ProposalNotFound)?;

        proposal.status.apply(ProposalEvent::Cancel)?;

        let updated = self
            .repo
            .mark_cancelled(&mut *tx, id, profile_id)
            .await?
            .ok_or(AppError::InvalidTransition {
                from: proposal.status.to_string(),
                event: ProposalEvent::Cancel.to_string(),
            })?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Confirmação manual de pagamento (após conferir o comprovante).
    pub async fn confirm_payment<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        id: Uuid,
    ) -> Result<Proposal, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let proposal = self
            .repo
            .find_by_id(&mut *tx, id, profile_id)
            .await?
            .ok_or(AppError::ProposalNotFound)?;

        proposal.status.apply(ProposalEvent::ConfirmPayment)?;

        let updated = self
            .repo
            .mark_paid(&mut *tx, id, profile_id)
            .await?
            .ok_or(AppError::InvalidTransition {
                from: proposal.status.to_string(),
                event: ProposalEvent::ConfirmPayment.to_string(),
            })?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Contrato como arquivo enviado (substitui o texto com variáveis).
    pub async fn upload_contract_file<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        id: Uuid,
        payload: &str,
    ) -> Result<Proposal, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let (bytes, extension) = storage::decode_data_url(payload)?;
        let file_url = self.storage.upload(&bytes, &extension).await?;

        let mut conn = executor.acquire().await?;

        match self
            .repo
            .set_contract_file(&mut *conn, id, profile_id, &file_url)
            .await?
        {
            Some(proposal) => Ok(proposal),
            None => Err(
                match self.repo.find_by_id(&mut *conn, id, profile_id).await? {
                    Some(_) => AppError::ProposalLocked,
                    None => AppError::ProposalNotFound,
                },
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> ProposalItemInput {
        ProposalItemInput {
            name: name.to_string(),
            details: None,
            quantity: 1,
            unit_price: rust_decimal::Decimal::ZERO,
            show_price: true,
        }
    }

    #[test]
    fn sanitize_descarta_nome_vazio_e_fecha_buracos() {
        let items = vec![item("A"), item("   "), item("B")];
        let kept = sanitize_items(items);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].name, "A");
        assert_eq!(kept[1].name, "B");
    }

    #[test]
    fn sanitize_apara_o_nome() {
        let kept = sanitize_items(vec![item("  Ensaio  ")]);
        assert_eq!(kept[0].name, "Ensaio");
    }
}
