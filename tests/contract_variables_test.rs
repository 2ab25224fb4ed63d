//! Testes do motor de substituição de variáveis do contrato.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

use estudio_backend::models::proposal::ProposalItem;
use estudio_backend::services::contract_service::{
    client_values, extract_variables, format_brl, render_contract, render_items_table,
};

fn item(name: &str, quantity: i32, unit_price: rust_decimal::Decimal, show_price: bool) -> ProposalItem {
    ProposalItem {
        id: Uuid::new_v4(),
        proposal_id: Uuid::new_v4(),
        name: name.to_string(),
        details: None,
        quantity,
        unit_price,
        show_price,
        order_index: 0,
    }
}

fn signing_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
}

#[test]
fn extracao_deduplica_na_ordem_da_primeira_aparicao() {
    let vars = extract_variables("Olá {{nome}}, valor {{nome}} é {{valor}}");
    assert_eq!(vars, vec!["nome".to_string(), "valor".to_string()]);
}

#[test]
fn extracao_ignora_tokens_automaticos() {
    let content = "Total {{valor_total}}, em {{data_assinatura}}:\n{{tabela_itens}}\nCPF: {{cpf}}";
    assert_eq!(extract_variables(content), vec!["cpf".to_string()]);
}

#[test]
fn extracao_de_texto_sem_tokens_e_vazia() {
    assert!(extract_variables("Contrato sem variáveis.").is_empty());
}

#[test]
fn substituicao_preenche_automaticos_e_valores_do_cliente() {
    let mut values = HashMap::new();
    values.insert("nome".to_string(), "Maria".to_string());

    let rendered = render_contract(
        "Eu, {{nome}}, aceito o valor de {{valor_total}} em {{data_assinatura}}.",
        &values,
        &[],
        dec!(130),
        signing_date(),
    );

    assert_eq!(
        rendered,
        "Eu, Maria, aceito o valor de R$ 130,00 em 07/08/2026."
    );
}

#[test]
fn token_sem_valor_fica_verbatim() {
    // Fail-soft: um modelo malformado nunca pode travar a assinatura.
    let rendered = render_contract(
        "Cláusula: {{clausula_inexistente}}.",
        &HashMap::new(),
        &[],
        dec!(0),
        signing_date(),
    );

    assert_eq!(rendered, "Cláusula: {{clausula_inexistente}}.");
}

#[test]
fn substituicao_e_passada_unica() {
    // Valor de cliente contendo um token não é re-expandido.
    let mut values = HashMap::new();
    values.insert("a".to_string(), "{{b}}".to_string());
    values.insert("b".to_string(), "X".to_string());

    let rendered = render_contract("{{a}}", &values, &[], dec!(0), signing_date());
    assert_eq!(rendered, "{{b}}");
}

#[test]
fn substituir_texto_ja_expandido_e_noop() {
    let mut values = HashMap::new();
    values.insert("nome".to_string(), "Maria".to_string());

    let once = render_contract(
        "Eu, {{nome}}, total {{valor_total}}.",
        &values,
        &[],
        dec!(2400),
        signing_date(),
    );
    let twice = render_contract(&once, &values, &[], dec!(2400), signing_date());

    assert_eq!(once, twice);
}

#[test]
fn tabela_de_itens_suprime_preco_de_item_incluso() {
    let items = vec![
        item("Ensaio externo", 2, dec!(350.00), true),
        item("Álbum 20x20", 1, dec!(50.00), false),
    ];

    let table = render_items_table(&items);

    assert!(table.contains("Ensaio externo"));
    assert!(table.contains("R$ 350,00"));
    assert!(table.contains("R$ 700,00"));
    assert!(table.contains("Álbum 20x20"));
    assert!(table.contains("Incluído"));
    assert!(!table.contains("R$ 50,00"));
}

#[test]
fn tabela_sem_itens_nao_quebra() {
    let rendered = render_contract(
        "Itens:\n{{tabela_itens}}",
        &HashMap::new(),
        &[],
        dec!(0),
        signing_date(),
    );

    assert_eq!(rendered, "Itens:\nNenhum item listado.");
}

#[test]
fn formatacao_em_reais() {
    assert_eq!(format_brl(dec!(130)), "R$ 130,00");
    assert_eq!(format_brl(dec!(0.5)), "R$ 0,50");
    assert_eq!(format_brl(dec!(2400)), "R$ 2.400,00");
    assert_eq!(format_brl(dec!(1234567.89)), "R$ 1.234.567,89");
}

#[test]
fn valores_do_cliente_achatam_tipos_em_string() {
    let values = client_values(&json!({
        "nome": "Maria",
        "parcelas": 3,
        "aceita_drone": true,
        "ignorado": null
    }));

    assert_eq!(values.get("nome").unwrap(), "Maria");
    assert_eq!(values.get("parcelas").unwrap(), "3");
    assert_eq!(values.get("aceita_drone").unwrap(), "true");
    assert!(!values.contains_key("ignorado"));
}
