// src/db/payment_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::payment::{PaymentConfig, PaymentMethod},
};

const PAYMENT_COLUMNS: &str = "\
    id, profile_id, label, method, pix_key, bank_details, payment_link, \
    instructions, created_at";

#[derive(Clone)]
pub struct PaymentRepository;

impl PaymentRepository {
    pub fn new() -> Self {
        Self
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        label: &str,
        method: PaymentMethod,
        pix_key: Option<&str>,
        bank_details: Option<&str>,
        payment_link: Option<&str>,
        instructions: Option<&str>,
    ) -> Result<PaymentConfig, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO payment_configs (
                profile_id, label, method, pix_key, bank_details, payment_link, instructions
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PAYMENT_COLUMNS}
            "#
        );

        let config = sqlx::query_as::<_, PaymentConfig>(&sql)
            .bind(profile_id)
            .bind(label)
            .bind(method)
            .bind(pix_key)
            .bind(bank_details)
            .bind(payment_link)
            .bind(instructions)
            .fetch_one(executor)
            .await?;

        Ok(config)
    }

    pub async fn list_by_profile<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
    ) -> Result<Vec<PaymentConfig>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payment_configs WHERE profile_id = $1 ORDER BY label ASC"
        );

        let configs = sqlx::query_as::<_, PaymentConfig>(&sql)
            .bind(profile_id)
            .fetch_all(executor)
            .await?;

        Ok(configs)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<PaymentConfig>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql =
            format!("SELECT {PAYMENT_COLUMNS} FROM payment_configs WHERE id = $1 AND profile_id = $2");

        let config = sqlx::query_as::<_, PaymentConfig>(&sql)
            .bind(id)
            .bind(profile_id)
            .fetch_optional(executor)
            .await?;

        Ok(config)
    }

    /// Variante sem checagem de perfil, usada pela página pública para
    /// montar as instruções de pagamento da proposta.
    pub async fn find_any<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<PaymentConfig>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payment_configs WHERE id = $1");

        let config = sqlx::query_as::<_, PaymentConfig>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(config)
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
        let result = sqlx::query("DELETE FROM payment_configs WHERE id = $1 AND profile_id = $2")
            .bind(id)
            .bind(profile_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
