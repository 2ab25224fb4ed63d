// src/db/template_repo.rs

use sqlx::{Executor, Postgres};
use serde_json::Value;
use uuid::Uuid;

use crate::{common::error::AppError, models::template::ProposalTemplate};

const TEMPLATE_COLUMNS: &str = "\
    id, profile_id, name, content, default_items, default_payment_config_id, \
    default_valid_days, variables, created_at, updated_at";

#[derive(Clone)]
pub struct TemplateRepository;

impl TemplateRepository {
    pub fn new() -> Self {
        Self
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        name: &str,
        content: Option<&str>,
        default_items: &Value,
        default_payment_config_id: Option<Uuid>,
        default_valid_days: Option<i32>,
        variables: &[String],
    ) -> Result<ProposalTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO proposal_templates (
                profile_id, name, content, default_items,
                default_payment_config_id, default_valid_days, variables
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TEMPLATE_COLUMNS}
            "#
        );

        let template = sqlx::query_as::<_, ProposalTemplate>(&sql)
            .bind(profile_id)
            .bind(name)
            .bind(content)
            .bind(default_items)
            .bind(default_payment_config_id)
            .bind(default_valid_days)
            .bind(variables)
            .fetch_one(executor)
            .await?;

        Ok(template)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        profile_id: Uuid,
        name: &str,
        content: Option<&str>,
        default_items: &Value,
        default_payment_config_id: Option<Uuid>,
        default_valid_days: Option<i32>,
        variables: &[String],
    ) -> Result<Option<ProposalTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE proposal_templates SET
                name = $3, content = $4, default_items = $5,
                default_payment_config_id = $6, default_valid_days = $7,
                variables = $8, updated_at = now()
            WHERE id = $1 AND profile_id = $2
            RETURNING {TEMPLATE_COLUMNS}
            "#
        );

        let template = sqlx::query_as::<_, ProposalTemplate>(&sql)
            .bind(id)
            .bind(profile_id)
            .bind(name)
            .bind(content)
            .bind(default_items)
            .bind(default_payment_config_id)
            .bind(default_valid_days)
            .bind(variables)
            .fetch_optional(executor)
            .await?;

        Ok(template)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<ProposalTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {TEMPLATE_COLUMNS} FROM proposal_templates WHERE id = $1 AND profile_id = $2"
        );

        let template = sqlx::query_as::<_, ProposalTemplate>(&sql)
            .bind(id)
            .bind(profile_id)
            .fetch_optional(executor)
            .await?;

        Ok(template)
    }

    pub async fn list_by_profile<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
    ) -> Result<Vec<ProposalTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {TEMPLATE_COLUMNS} FROM proposal_templates WHERE profile_id = $1 ORDER BY name ASC"
        );

        let templates = sqlx::query_as::<_, ProposalTemplate>(&sql)
            .bind(profile_id)
            .fetch_all(executor)
            .await?;

        Ok(templates)
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
        let result = sqlx::query("DELETE FROM proposal_templates WHERE id = $1 AND profile_id = $2")
            .bind(id)
            .bind(profile_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
