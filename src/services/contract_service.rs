// src/services/contract_service.rs
//
// Motor de substituição de variáveis do contrato. Tudo aqui é puro:
// texto entra, texto sai, nenhum I/O.

use std::collections::HashMap;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::models::proposal::ProposalItem;

/// Tokens preenchidos automaticamente na substituição. Nunca entram em
/// `required_fields`: o cliente não deve ser cobrado por eles.
pub const VAR_VALOR_TOTAL: &str = "valor_total";
pub const VAR_DATA_ASSINATURA: &str = "data_assinatura";
pub const VAR_TABELA_ITENS: &str = "tabela_itens";

const AUTO_VARS: [&str; 3] = [VAR_VALOR_TOTAL, VAR_DATA_ASSINATURA, VAR_TABELA_ITENS];

lazy_static! {
    static ref VARIABLE_RE: Regex = Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*)\}\}").unwrap();
}

/// Enumera os nomes distintos de `{{token}}` no texto, na ordem da primeira
/// aparição, sem os tokens automáticos. O resultado vira o `required_fields`
/// da proposta e dirige o formulário público de dados do cliente.
pub fn extract_variables(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for caps in VARIABLE_RE.captures_iter(content) {
        let name = caps[1].to_string();
        if AUTO_VARS.contains(&name.as_str()) {
            continue;
        }
        if !names.contains(&name) {
            names.push(name);
        }
    }

    names
}

/// Formata em reais: "R$ 1.234,56". Valores negativos só existem em
/// rascunho, mas formatamos do mesmo jeito.
pub fn format_brl(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let negative = rounded.is_sign_negative();
    let text = format!("{:.2}", rounded.abs());

    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    let digits = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if negative {
        format!("R$ -{grouped},{frac_part}")
    } else {
        format!("R$ {grouped},{frac_part}")
    }
}

/// Tabela textual de itens para o token {{tabela_itens}}. Itens com
/// `show_price = false` aparecem como "Incluído", sem valores.
pub fn render_items_table(items: &[ProposalItem]) -> String {
    if items.is_empty() {
        return "Nenhum item listado.".to_string();
    }

    let mut table = String::new();
    table.push_str(&format!(
        "{:<40} {:>4} {:>14} {:>14}\n",
        "Item", "Qtd", "Unitário", "Subtotal"
    ));

    for item in items {
        if item.show_price {
            let line_total = item.unit_price * Decimal::from(item.quantity);
            table.push_str(&format!(
                "{:<40} {:>4} {:>14} {:>14}\n",
                item.name,
                item.quantity,
                format_brl(item.unit_price),
                format_brl(line_total)
            ));
        } else {
            table.push_str(&format!(
                "{:<40} {:>4} {:>14} {:>14}\n",
                item.name, item.quantity, "Incluído", "—"
            ));
        }
    }

    table
}

/// Achata o `client_data` (JSON) no mapa string→string da substituição.
pub fn client_values(data: &Value) -> HashMap<String, String> {
    let mut values = HashMap::new();

    if let Some(object) = data.as_object() {
        for (key, value) in object {
            match value {
                Value::Null => {}
                Value::String(s) => {
                    values.insert(key.clone(), s.clone());
                }
                other => {
                    values.insert(key.clone(), other.to_string());
                }
            }
        }
    }

    values
}

/// Expande o texto do contrato em uma única passada, sensível a maiúsculas.
/// Token sem valor fica como está — um modelo malformado nunca pode travar a
/// assinatura. Em texto já expandido (sem `{{}}`) a chamada é no-op.
pub fn render_contract(
    content: &str,
    values: &HashMap<String, String>,
    items: &[ProposalItem],
    total: Decimal,
    signing_date: NaiveDate,
) -> String {
    VARIABLE_RE
        .replace_all(content, |caps: &Captures| {
            let name = &caps[1];
            match name {
                VAR_VALOR_TOTAL => format_brl(total),
                VAR_DATA_ASSINATURA => signing_date.format("%d/%m/%Y").to_string(),
                VAR_TABELA_ITENS => render_items_table(items),
                _ => values
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string()),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn formata_reais_com_milhar() {
        assert_eq!(format_brl(dec!(130)), "R$ 130,00");
        assert_eq!(format_brl(dec!(1234.5)), "R$ 1.234,50");
        assert_eq!(format_brl(dec!(1234567.89)), "R$ 1.234.567,89");
        assert_eq!(format_brl(dec!(-20)), "R$ -20,00");
    }
}
