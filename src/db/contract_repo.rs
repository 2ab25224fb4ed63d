// src/db/contract_repo.rs

use sqlx::{Executor, Postgres};
use serde_json::Value;
use uuid::Uuid;

use crate::{common::error::AppError, models::proposal::Contract};

const CONTRACT_COLUMNS: &str = "\
    id, proposal_id, signed_content, contract_file_url, client_data, \
    signature_image_url, signed_at, client_ip, user_agent";

#[derive(Clone)]
pub struct ContractRepository;

impl ContractRepository {
    pub fn new() -> Self {
        Self
    }

    /// Cria o registro imutável da assinatura. O UNIQUE de proposal_id é a
    /// trava contra assinatura dupla; a violação vira AlreadySigned.
    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        proposal_id: Uuid,
        signed_content: Option<&str>,
        contract_file_url: Option<&str>,
        client_data: &Value,
        signature_image_url: &str,
        client_ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<Contract, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO contracts (
                proposal_id, signed_content, contract_file_url, client_data,
                signature_image_url, client_ip, user_agent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CONTRACT_COLUMNS}
            "#
        );

        let contract = sqlx::query_as::<_, Contract>(&sql)
            .bind(proposal_id)
            .bind(signed_content)
            .bind(contract_file_url)
            .bind(client_data)
            .bind(signature_image_url)
            .bind(client_ip)
            .bind(user_agent)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::AlreadySigned;
                    }
                }
                e.into()
            })?;

        Ok(contract)
    }

    pub async fn find_by_proposal<'e, E>(
        &self,
        executor: E,
        proposal_id: Uuid,
    ) -> Result<Option<Contract>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CONTRACT_COLUMNS} FROM contracts WHERE proposal_id = $1");

        let contract = sqlx::query_as::<_, Contract>(&sql)
            .bind(proposal_id)
            .fetch_optional(executor)
            .await?;

        Ok(contract)
    }

    pub async fn exists<'e, E>(
        &self,
        executor: E,
        proposal_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM contracts WHERE proposal_id = $1)")
                .bind(proposal_id)
                .fetch_one(executor)
                .await?;

        Ok(exists)
    }
}
