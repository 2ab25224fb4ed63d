// src/config.rs

use std::sync::Arc;
use std::{env, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::db::{
    ContractRepository, PaymentRepository, ProposalRepository, SettingsRepository,
    TemplateRepository,
};
use crate::services::{
    document_service::DocumentService,
    payment_service::PaymentService,
    proposal_service::ProposalService,
    public_service::PublicService,
    storage::{LocalStorage, Storage},
    template_service::TemplateService,
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub proposal_service: ProposalService,
    pub public_service: PublicService,
    pub template_service: TemplateService,
    pub payment_service: PaymentService,
    pub document_service: DocumentService,
}

impl AppState {
    // A assinatura retorna um Result: se a configuração falhar, quem decide
    // o que fazer é o main.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let storage_dir = env::var("STORAGE_DIR").unwrap_or("./uploads".to_string());
        let public_base_url =
            env::var("PUBLIC_BASE_URL").unwrap_or("http://localhost:3000".to_string());

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new(storage_dir, public_base_url));

        let proposal_repo = ProposalRepository::new();
        let template_repo = TemplateRepository::new();
        let contract_repo = ContractRepository::new();
        let payment_repo = PaymentRepository::new();
        let settings_repo = SettingsRepository::new();

        let proposal_service = ProposalService::new(
            proposal_repo.clone(),
            template_repo.clone(),
            contract_repo.clone(),
            storage.clone(),
        );
        let public_service = PublicService::new(
            proposal_repo.clone(),
            contract_repo.clone(),
            payment_repo.clone(),
            storage.clone(),
        );
        let template_service = TemplateService::new(template_repo, payment_repo.clone());
        let payment_service = PaymentService::new(payment_repo.clone());
        let document_service = DocumentService::new(
            proposal_repo,
            contract_repo,
            payment_repo,
            settings_repo,
        );

        Ok(Self {
            db_pool,
            jwt_secret,
            proposal_service,
            public_service,
            template_service,
            payment_service,
            document_service,
        })
    }
}
