pub mod contract_service;
pub mod document_service;
pub mod payment_service;
pub mod pricing;
pub mod proposal_service;
pub mod public_service;
pub mod storage;
pub mod template_service;
