// src/services/pricing.rs

use rust_decimal::Decimal;

use crate::models::proposal::ProposalItemInput;

/// Soma de quantidade × preço unitário de TODOS os itens. Itens com
/// `show_price = false` entram na soma do mesmo jeito: o que se suprime
/// é só a exibição do preço, não o valor econômico.
pub fn items_subtotal(items: &[ProposalItemInput]) -> Decimal {
    items
        .iter()
        .map(|item| item.unit_price * Decimal::from(item.quantity))
        .sum()
}

/// Total persistido da proposta: (total manual ou soma dos itens) − desconto.
/// Pode ficar negativo em rascunho; o envio é que bloqueia total <= 0.
pub fn compute_total(
    items: &[ProposalItemInput],
    discount: Decimal,
    use_manual: bool,
    manual_amount: Option<Decimal>,
) -> Decimal {
    let base = if use_manual {
        manual_amount.unwrap_or(Decimal::ZERO)
    } else {
        items_subtotal(items)
    };

    base - discount
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(price: Decimal, quantity: i32, show_price: bool) -> ProposalItemInput {
        ProposalItemInput {
            name: "Item".to_string(),
            details: None,
            quantity,
            unit_price: price,
            show_price,
        }
    }

    #[test]
    fn soma_inclui_itens_sem_preco_exibido() {
        let items = vec![item(dec!(100.00), 1, true), item(dec!(50.00), 1, false)];
        assert_eq!(items_subtotal(&items), dec!(150.00));
    }

    #[test]
    fn total_itemizado_com_desconto() {
        let items = vec![item(dec!(100.00), 1, true), item(dec!(50.00), 1, false)];
        let total = compute_total(&items, dec!(20.00), false, None);
        assert_eq!(total, dec!(130.00));
    }

    #[test]
    fn total_manual_ignora_itens() {
        let items = vec![item(dec!(999.00), 3, true)];
        let total = compute_total(&items, dec!(100.00), true, Some(dec!(2500.00)));
        assert_eq!(total, dec!(2400.00));
    }

    #[test]
    fn desconto_maior_que_base_fica_negativo_em_rascunho() {
        let total = compute_total(&[], dec!(50.00), true, Some(dec!(30.00)));
        assert_eq!(total, dec!(-20.00));
    }
}
