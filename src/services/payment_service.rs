// src/services/payment_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PaymentRepository,
    models::payment::{PaymentConfig, PaymentMethod},
};

#[derive(Clone)]
pub struct PaymentService {
    repo: PaymentRepository,
}

impl PaymentService {
    pub fn new(repo: PaymentRepository) -> Self {
        Self { repo }
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
        // Cada método exige o seu campo de instrução.
        match method {
            PaymentMethod::Pix if pix_key.map_or(true, |k| k.trim().is_empty()) => {
                return Err(AppError::MissingRequiredField("pixKey".to_string()));
            }
            PaymentMethod::BankTransfer
                if bank_details.map_or(true, |d| d.trim().is_empty()) =>
            {
                return Err(AppError::MissingRequiredField("bankDetails".to_string()));
            }
            PaymentMethod::PaymentLink
                if payment_link.map_or(true, |l| l.trim().is_empty()) =>
            {
                return Err(AppError::MissingRequiredField("paymentLink".to_string()));
            }
            PaymentMethod::Custom
                if instructions.map_or(true, |i| i.trim().is_empty()) =>
            {
                return Err(AppError::MissingRequiredField("instructions".to_string()));
            }
            _ => {}
        }

        self.repo
            .create(
                executor,
                profile_id,
                label,
                method,
                pix_key,
                bank_details,
                payment_link,
                instructions,
            )
            .await
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
    ) -> Result<Vec<PaymentConfig>, AppError>
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
            return Err(AppError::PaymentConfigNotFound);
        }
        Ok(())
    }
}
