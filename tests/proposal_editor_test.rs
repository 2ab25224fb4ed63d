//! Regras do editor: precificação, validação de envio e aplicação de modelo.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

use estudio_backend::common::error::AppError;
use estudio_backend::models::proposal::{
    Proposal, ProposalDraft, ProposalItemInput, ProposalStatus, ProposalType,
};
use estudio_backend::models::template::ProposalTemplate;
use estudio_backend::services::pricing::compute_total;
use estudio_backend::services::proposal_service::{sanitize_items, validate_for_send};
use estudio_backend::services::template_service::apply_template;

fn item_input(name: &str, quantity: i32, unit_price: Decimal, show_price: bool) -> ProposalItemInput {
    ProposalItemInput {
        name: name.to_string(),
        details: None,
        quantity,
        unit_price,
        show_price,
    }
}

fn base_proposal() -> Proposal {
    Proposal {
        id: Uuid::new_v4(),
        profile_id: Uuid::new_v4(),
        public_token: "9f2c4a31c56e4b0f8a77d1c2e3b4a5f6".to_string(),
        proposal_type: ProposalType::Photo,
        status: ProposalStatus::Draft,
        lead_id: None,
        template_id: None,
        payment_config_id: None,
        title: "Ensaio de casamento".to_string(),
        use_manual_total: false,
        manual_amount: None,
        discount_amount: dec!(20.00),
        total_amount: dec!(130.00),
        contract_content: Some("Eu, {{nome}}, aceito {{valor_total}}.".to_string()),
        contract_file_url: None,
        required_fields: vec!["nome".to_string()],
        client_name: None,
        client_email: None,
        client_data: json!({}),
        cover_video_url: None,
        revision_limit: None,
        delivery_formats: None,
        estimated_duration_min: None,
        reference_links: None,
        soundtrack_links: None,
        change_request_notes: None,
        payment_receipt_url: None,
        sent_at: None,
        viewed_at: None,
        approved_at: None,
        valid_until: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn base_template() -> ProposalTemplate {
    ProposalTemplate {
        id: Uuid::new_v4(),
        profile_id: Uuid::new_v4(),
        name: "Casamento".to_string(),
        content: Some("Contrato padrão com {{nome_completo}}.".to_string()),
        default_items: json!([
            {"name": "Ensaio externo", "quantity": 1, "unitPrice": 350.00, "showPrice": true},
            {"name": "Álbum", "quantity": 1, "unitPrice": 0.0, "showPrice": false}
        ]),
        default_payment_config_id: None,
        default_valid_days: Some(15),
        variables: vec!["nome_completo".to_string()],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
}

// --- Precificação ---

#[test]
fn total_do_cenario_de_ponta_a_ponta() {
    // 1x R$100 com preço exibido + 1x R$50 incluso, desconto de R$20.
    let items = vec![
        item_input("Cobertura", 1, dec!(100.00), true),
        item_input("Pen drive", 1, dec!(50.00), false),
    ];

    assert_eq!(compute_total(&items, dec!(20.00), false, None), dec!(130.00));
}

#[test]
fn quantidade_multiplica_o_preco() {
    let items = vec![item_input("Hora extra", 3, dec!(150.00), true)];
    assert_eq!(compute_total(&items, Decimal::ZERO, false, None), dec!(450.00));
}

// --- Reconciliação de itens (filtro puro) ---

#[test]
fn item_sem_nome_e_descartado_e_a_ordem_fecha_buracos() {
    let kept = sanitize_items(vec![
        item_input("A", 1, Decimal::ZERO, true),
        item_input("", 1, Decimal::ZERO, true),
        item_input("B", 1, Decimal::ZERO, true),
    ]);

    // order_index é a posição na lista filtrada: 0 e 1, sem buraco.
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0].name, "A");
    assert_eq!(kept[1].name, "B");
}

// --- Validação de envio ---

#[test]
fn envio_valido_passa() {
    assert!(validate_for_send(&base_proposal()).is_ok());
}

#[test]
fn envio_sem_titulo_e_bloqueado() {
    let mut proposal = base_proposal();
    proposal.title = "   ".to_string();
    assert!(matches!(
        validate_for_send(&proposal),
        Err(AppError::MissingTitle)
    ));
}

#[test]
fn envio_sem_contrato_e_bloqueado() {
    let mut proposal = base_proposal();
    proposal.contract_content = None;
    assert!(matches!(
        validate_for_send(&proposal),
        Err(AppError::MissingContract)
    ));
}

#[test]
fn contrato_por_arquivo_satisfaz_o_envio() {
    let mut proposal = base_proposal();
    proposal.contract_content = None;
    proposal.contract_file_url = Some("https://cdn.local/uploads/contrato.pdf".to_string());
    assert!(validate_for_send(&proposal).is_ok());
}

#[test]
fn total_nao_positivo_bloqueia_o_envio() {
    // Rascunho pode guardar total negativo; o envio não.
    let mut proposal = base_proposal();
    proposal.total_amount = dec!(-20.00);
    assert!(matches!(
        validate_for_send(&proposal),
        Err(AppError::TotalNotPositive)
    ));

    proposal.total_amount = Decimal::ZERO;
    assert!(matches!(
        validate_for_send(&proposal),
        Err(AppError::TotalNotPositive)
    ));
}

// --- Expiração é só de exibição ---

#[test]
fn expiracao_nao_muda_o_status_persistido() {
    let mut proposal = base_proposal();
    proposal.status = ProposalStatus::Sent;
    proposal.valid_until = Some(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());

    assert!(proposal.is_expired(today()));
    assert_eq!(proposal.status, ProposalStatus::Sent);
}

#[test]
fn proposta_sem_validade_nao_expira() {
    assert!(!base_proposal().is_expired(today()));
}

// --- Aplicação de modelo ---

#[test]
fn modelo_preenche_contrato_itens_e_validade() {
    let (draft, items) = apply_template(&base_template(), ProposalDraft::default(), vec![], today());

    assert_eq!(
        draft.contract_content.as_deref(),
        Some("Contrato padrão com {{nome_completo}}.")
    );
    assert_eq!(
        draft.valid_until,
        Some(NaiveDate::from_ymd_opt(2026, 8, 22).unwrap())
    );
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "Ensaio externo");
    assert!(!items[1].show_price);
}

#[test]
fn modelo_vazio_nunca_limpa_o_rascunho() {
    let mut template = base_template();
    template.content = Some("   ".to_string());
    template.default_valid_days = None;
    template.default_items = json!([]);

    let draft = ProposalDraft {
        contract_content: Some("Texto do rascunho".to_string()),
        ..Default::default()
    };
    let current_items = vec![item_input("Já editado", 1, dec!(10.00), true)];

    let (draft, items) = apply_template(&template, draft, current_items, today());

    assert_eq!(draft.contract_content.as_deref(), Some("Texto do rascunho"));
    assert_eq!(draft.valid_until, None);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Já editado");
}

#[test]
fn configuracao_de_pagamento_do_modelo_sobrescreve() {
    let mut template = base_template();
    let config_id = Uuid::new_v4();
    template.default_payment_config_id = Some(config_id);

    let draft = ProposalDraft {
        payment_config_id: Some(Uuid::new_v4()),
        ..Default::default()
    };

    let (draft, _) = apply_template(&template, draft, vec![], today());
    assert_eq!(draft.payment_config_id, Some(config_id));
}

#[test]
fn default_items_corrompido_degrada_para_lista_atual() {
    let mut template = base_template();
    template.default_items = json!("isto não é uma lista");

    let current = vec![item_input("Atual", 1, dec!(10.00), true)];
    let (_, items) = apply_template(&template, ProposalDraft::default(), current, today());

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Atual");
}
