// src/db/settings_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::settings::StudioSettings};

#[derive(Clone)]
pub struct SettingsRepository;

impl SettingsRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn get_settings<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
    ) -> Result<Option<StudioSettings>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, StudioSettings>(
            r#"
            SELECT profile_id, studio_name, document_number, address, phone,
                   email, logo_url, updated_at
            FROM studio_settings
            WHERE profile_id = $1
            "#,
        )
        .bind(profile_id)
        .fetch_optional(executor)
        .await?;

        Ok(settings)
    }
}
