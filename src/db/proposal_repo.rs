// src/db/proposal_repo.rs

use sqlx::{Executor, PgConnection, Postgres};
use uuid::Uuid;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::{
    common::error::AppError,
    models::proposal::{Proposal, ProposalDraft, ProposalItem, ProposalItemInput},
};

// Lista única de colunas para todos os SELECT/RETURNING, já que o
// `sqlx::query_as` em tempo de execução mapeia por nome.
const PROPOSAL_COLUMNS: &str = "\
    id, profile_id, public_token, proposal_type, status, \
    lead_id, template_id, payment_config_id, title, \
    use_manual_total, manual_amount, discount_amount, total_amount, \
    contract_content, contract_file_url, required_fields, \
    client_name, client_email, client_data, \
    cover_video_url, revision_limit, delivery_formats, \
    estimated_duration_min, reference_links, soundtrack_links, \
    change_request_notes, payment_receipt_url, \
    sent_at, viewed_at, approved_at, valid_until, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, proposal_id, name, details, quantity, unit_price, show_price, order_index";

#[derive(Clone)]
pub struct ProposalRepository;

impl ProposalRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  CRUD DA PROPOSTA
    // =========================================================================

    pub async fn create<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        public_token: &str,
        template_id: Option<Uuid>,
        draft: &ProposalDraft,
        total_amount: Decimal,
        required_fields: &[String],
    ) -> Result<Proposal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO proposals (
                profile_id, public_token, proposal_type, lead_id, template_id,
                payment_config_id, title, use_manual_total, manual_amount,
                discount_amount, total_amount, contract_content, required_fields,
                client_name, client_email, cover_video_url, revision_limit,
                delivery_formats, estimated_duration_min, reference_links,
                soundtrack_links, valid_until
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22)
            RETURNING {PROPOSAL_COLUMNS}
            "#
        );

        let proposal = sqlx::query_as::<_, Proposal>(&sql)
            .bind(profile_id)
            .bind(public_token)
            .bind(draft.proposal_type)
            .bind(draft.lead_id)
            .bind(template_id)
            .bind(draft.payment_config_id)
            .bind(&draft.title)
            .bind(draft.use_manual_total)
            .bind(draft.manual_amount)
            .bind(draft.discount_amount)
            .bind(total_amount)
            .bind(draft.contract_content.as_deref())
            .bind(required_fields)
            .bind(draft.client_name.as_deref())
            .bind(draft.client_email.as_deref())
            .bind(draft.cover_video_url.as_deref())
            .bind(draft.revision_limit)
            .bind(draft.delivery_formats.as_deref())
            .bind(draft.estimated_duration_min)
            .bind(draft.reference_links.as_deref())
            .bind(draft.soundtrack_links.as_deref())
            .bind(draft.valid_until)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::UniqueConstraintViolation("public_token".to_string());
                    }
                }
                e.into()
            })?;

        Ok(proposal)
    }

    /// Atualização do editor. Propostas assinadas, pagas ou canceladas não
    /// aceitam mais edição; a guarda fica na própria cláusula WHERE.
    /// Texto de contrato novo invalida o arquivo enviado (fontes mutuamente
    /// exclusivas).
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        profile_id: Uuid,
        draft: &ProposalDraft,
        total_amount: Decimal,
        required_fields: &[String],
    ) -> Result<Option<Proposal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE proposals SET
                proposal_type = $3,
                lead_id = $4,
                payment_config_id = $5,
                title = $6,
                use_manual_total = $7,
                manual_amount = $8,
                discount_amount = $9,
                total_amount = $10,
                contract_content = $11,
                contract_file_url = CASE WHEN $11 IS NOT NULL THEN NULL ELSE contract_file_url END,
                required_fields = $12,
                client_name = $13,
                client_email = $14,
                cover_video_url = $15,
                revision_limit = $16,
                delivery_formats = $17,
                estimated_duration_min = $18,
                reference_links = $19,
                soundtrack_links = $20,
                valid_until = $21,
                updated_at = now()
            WHERE id = $1 AND profile_id = $2
              AND status NOT IN ('SIGNED', 'PAID', 'CANCELLED')
            RETURNING {PROPOSAL_COLUMNS}
            "#
        );

        let proposal = sqlx::query_as::<_, Proposal>(&sql)
            .bind(id)
            .bind(profile_id)
            .bind(draft.proposal_type)
            .bind(draft.lead_id)
            .bind(draft.payment_config_id)
            .bind(&draft.title)
            .bind(draft.use_manual_total)
            .bind(draft.manual_amount)
            .bind(draft.discount_amount)
            .bind(total_amount)
            .bind(draft.contract_content.as_deref())
            .bind(required_fields)
            .bind(draft.client_name.as_deref())
            .bind(draft.client_email.as_deref())
            .bind(draft.cover_video_url.as_deref())
            .bind(draft.revision_limit)
            .bind(draft.delivery_formats.as_deref())
            .bind(draft.estimated_duration_min)
            .bind(draft.reference_links.as_deref())
            .bind(draft.soundtrack_links.as_deref())
            .bind(draft.valid_until)
            .fetch_optional(executor)
            .await?;

        Ok(proposal)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<Proposal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {PROPOSAL_COLUMNS} FROM proposals WHERE id = $1 AND profile_id = $2");

        let proposal = sqlx::query_as::<_, Proposal>(&sql)
            .bind(id)
            .bind(profile_id)
            .fetch_optional(executor)
            .await?;

        Ok(proposal)
    }

    /// Busca pela credencial do fluxo público (URL-capacidade, sem sessão).
    pub async fn find_by_token<'e, E>(
        &self,
        executor: E,
        public_token: &str,
    ) -> Result<Option<Proposal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {PROPOSAL_COLUMNS} FROM proposals WHERE public_token = $1");

        let proposal = sqlx::query_as::<_, Proposal>(&sql)
            .bind(public_token)
            .fetch_optional(executor)
            .await?;

        Ok(proposal)
    }

    pub async fn list_by_profile<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
    ) -> Result<Vec<Proposal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {PROPOSAL_COLUMNS} FROM proposals WHERE profile_id = $1 ORDER BY created_at DESC"
        );

        let proposals = sqlx::query_as::<_, Proposal>(&sql)
            .bind(profile_id)
            .fetch_all(executor)
            .await?;

        Ok(proposals)
    }

    pub async fn delete<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        profile_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM proposals WHERE id = $1 AND profile_id = $2")
            .bind(id)
            .bind(profile_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  ITENS (reconciliação substitui-tudo)
    // =========================================================================

    pub async fn delete_items<'e, E>(
        &self,
        executor: E,
        proposal_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM proposal_items WHERE proposal_id = $1")
            .bind(proposal_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Apaga todos os itens da proposta e insere o conjunto editado.
    /// Os ids dos itens não sobrevivem ao save; o order_index é a posição
    /// na lista já filtrada. Roda dentro da transação do chamador, então
    /// ou tudo entra ou nada muda.
    pub async fn replace_items(
        &self,
        conn: &mut PgConnection,
        proposal_id: Uuid,
        items: &[ProposalItemInput],
    ) -> Result<Vec<ProposalItem>, AppError> {
        self.delete_items(&mut *conn, proposal_id).await?;

        let mut inserted = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            inserted.push(
                self.insert_item(&mut *conn, proposal_id, item, index as i32)
                    .await?,
            );
        }

        Ok(inserted)
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        proposal_id: Uuid,
        item: &ProposalItemInput,
        order_index: i32,
    ) -> Result<ProposalItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO proposal_items (proposal_id, name, details, quantity, unit_price, show_price, order_index)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ITEM_COLUMNS}
            "#
        );

        let item = sqlx::query_as::<_, ProposalItem>(&sql)
            .bind(proposal_id)
            .bind(&item.name)
            .bind(item.details.as_deref())
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.show_price)
            .bind(order_index)
            .fetch_one(executor)
            .await?;

        Ok(item)
    }

    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        proposal_id: Uuid,
    ) -> Result<Vec<ProposalItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM proposal_items WHERE proposal_id = $1 ORDER BY order_index ASC"
        );

        let items = sqlx::query_as::<_, ProposalItem>(&sql)
            .bind(proposal_id)
            .fetch_all(executor)
            .await?;

        Ok(items)
    }

    // =========================================================================
    //  TRANSIÇÕES DE STATUS (UPDATEs guardados)
    // =========================================================================
    // Cada transição carrega a guarda de status na cláusula WHERE: se outro
    // ator mudou o registro antes, o UPDATE devolve zero linhas e o service
    // decide entre "não encontrada" e "transição inválida".

    pub async fn mark_sent<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<Proposal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE proposals
            SET status = 'SENT', sent_at = now(), updated_at = now()
            WHERE id = $1 AND profile_id = $2 AND status = 'DRAFT'
            RETURNING {PROPOSAL_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Proposal>(&sql)
            .bind(id)
            .bind(profile_id)
            .fetch_optional(executor)
            .await?)
    }

    /// Primeira visualização do cliente. A guarda `status = 'SENT'` garante
    /// o viewed_at único: visitas seguintes não passam por aqui.
    pub async fn mark_viewed<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Proposal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE proposals
            SET status = 'VIEWED', viewed_at = now(), updated_at = now()
            WHERE id = $1 AND status = 'SENT'
            RETURNING {PROPOSAL_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Proposal>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?)
    }

    pub async fn mark_approved<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Proposal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE proposals
            SET status = 'APPROVED', approved_at = now(), updated_at = now()
            WHERE id = $1 AND status IN ('SENT', 'VIEWED', 'CHANGES_REQUESTED')
            RETURNING {PROPOSAL_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Proposal>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?)
    }

    pub async fn mark_changes_requested<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        notes: &str,
    ) -> Result<Option<Proposal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE proposals
            SET status = 'CHANGES_REQUESTED', change_request_notes = $2, updated_at = now()
            WHERE id = $1 AND status IN ('SENT', 'VIEWED')
            RETURNING {PROPOSAL_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Proposal>(&sql)
            .bind(id)
            .bind(notes)
            .fetch_optional(executor)
            .await?)
    }

    /// Persiste os dados coletados no formulário público. Sem merge: duas
    /// abas com o mesmo link fazem last-write-wins, como o fluxo assume.
    pub async fn save_client_data<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        client_name: &str,
        client_email: Option<&str>,
        client_data: &Value,
    ) -> Result<Option<Proposal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE proposals
            SET client_name = $2, client_email = $3, client_data = $4, updated_at = now()
            WHERE id = $1 AND status = 'APPROVED'
            RETURNING {PROPOSAL_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Proposal>(&sql)
            .bind(id)
            .bind(client_name)
            .bind(client_email)
            .bind(client_data)
            .fetch_optional(executor)
            .await?)
    }

    pub async fn mark_signed<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        client_name: &str,
        client_email: Option<&str>,
        client_data: &Value,
    ) -> Result<Option<Proposal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE proposals
            SET status = 'SIGNED', client_name = $2, client_email = $3,
                client_data = $4, updated_at = now()
            WHERE id = $1 AND status = 'APPROVED'
            RETURNING {PROPOSAL_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Proposal>(&sql)
            .bind(id)
            .bind(client_name)
            .bind(client_email)
            .bind(client_data)
            .fetch_optional(executor)
            .await?)
    }

    pub async fn mark_paid<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<Proposal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE proposals
            SET status = 'PAID', updated_at = now()
            WHERE id = $1 AND profile_id = $2 AND status = 'SIGNED'
            RETURNING {PROPOSAL_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Proposal>(&sql)
            .bind(id)
            .bind(profile_id)
            .fetch_optional(executor)
            .await?)
    }

    pub async fn mark_cancelled<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<Proposal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE proposals
            SET status = 'CANCELLED', updated_at = now()
            WHERE id = $1 AND profile_id = $2 AND status NOT IN ('PAID', 'CANCELLED')
            RETURNING {PROPOSAL_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Proposal>(&sql)
            .bind(id)
            .bind(profile_id)
            .fetch_optional(executor)
            .await?)
    }

    // =========================================================================
    //  ANEXOS
    // =========================================================================

    /// Arquivo de contrato enviado pelo fotógrafo. Fontes mutuamente
    /// exclusivas: o upload limpa o texto com variáveis.
    pub async fn set_contract_file<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        profile_id: Uuid,
        file_url: &str,
    ) -> Result<Option<Proposal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE proposals
            SET contract_file_url = $3, contract_content = NULL,
                required_fields = '{{}}', updated_at = now()
            WHERE id = $1 AND profile_id = $2
              AND status NOT IN ('SIGNED', 'PAID', 'CANCELLED')
            RETURNING {PROPOSAL_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Proposal>(&sql)
            .bind(id)
            .bind(profile_id)
            .bind(file_url)
            .fetch_optional(executor)
            .await?)
    }

    /// Comprovante de pagamento do cliente. Não muda o status: PAID só
    /// acontece pela confirmação manual do fotógrafo.
    pub async fn set_receipt<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        receipt_url: &str,
    ) -> Result<Option<Proposal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE proposals
            SET payment_receipt_url = $2, updated_at = now()
            WHERE id = $1 AND status IN ('SIGNED', 'PAID')
            RETURNING {PROPOSAL_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Proposal>(&sql)
            .bind(id)
            .bind(receipt_url)
            .fetch_optional(executor)
            .await?)
    }
}
