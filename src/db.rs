pub mod proposal_repo;
pub use proposal_repo::ProposalRepository;
pub mod contract_repo;
pub use contract_repo::ContractRepository;
pub mod template_repo;
pub use template_repo::TemplateRepository;
pub mod payment_repo;
pub use payment_repo::PaymentRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
