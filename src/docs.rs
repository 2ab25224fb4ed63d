// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Proposals ---
        handlers::proposals::create_proposal,
        handlers::proposals::list_proposals,
        handlers::proposals::get_proposal,
        handlers::proposals::update_proposal,
        handlers::proposals::delete_proposal,
        handlers::proposals::send_proposal,
        handlers::proposals::cancel_proposal,
        handlers::proposals::confirm_payment,
        handlers::proposals::upload_contract_file,

        // --- Templates ---
        handlers::templates::create_template,
        handlers::templates::list_templates,
        handlers::templates::get_template,
        handlers::templates::update_template,
        handlers::templates::delete_template,

        // --- Payments ---
        handlers::payments::create_payment_config,
        handlers::payments::list_payment_configs,
        handlers::payments::delete_payment_config,

        // --- Public ---
        handlers::public::view_proposal,
        handlers::public::approve_proposal,
        handlers::public::request_changes,
        handlers::public::contract_preview,
        handlers::public::sign_proposal,
        handlers::public::upload_receipt,
        handlers::public::get_contract,
        handlers::public::download_contract_pdf,
    ),
    components(
        schemas(
            // --- Proposals ---
            models::proposal::ProposalType,
            models::proposal::ProposalStatus,
            models::proposal::PublicStep,
            models::proposal::Proposal,
            models::proposal::ProposalItem,
            models::proposal::ProposalItemInput,
            models::proposal::ProposalDetail,
            models::proposal::Contract,
            models::proposal::PublicItemView,
            models::proposal::PublicPaymentView,
            models::proposal::PublicProposalView,
            models::proposal::ContractPreviewResponse,

            // --- Templates ---
            models::template::ProposalTemplate,

            // --- Payments ---
            models::payment::PaymentMethod,
            models::payment::PaymentConfig,

            // --- Settings ---
            models::settings::StudioSettings,

            // --- Payloads ---
            handlers::proposals::ProposalPayload,
            handlers::proposals::ContractFilePayload,
            handlers::templates::TemplatePayload,
            handlers::payments::PaymentConfigPayload,
            handlers::public::RequestChangesPayload,
            handlers::public::ClientDataPayload,
            handlers::public::SignPayload,
            handlers::public::ReceiptPayload,
        )
    ),
    tags(
        (name = "Proposals", description = "Editor de propostas do fotógrafo"),
        (name = "Templates", description = "Modelos reutilizáveis de proposta"),
        (name = "Payments", description = "Configurações de pagamento"),
        (name = "Public", description = "Fluxo público do cliente (token na URL)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
