//! Testes da máquina de estados do ciclo de vida da proposta.

use estudio_backend::common::error::AppError;
use estudio_backend::models::proposal::PublicStep;
use estudio_backend::models::proposal::ProposalEvent as E;
use estudio_backend::models::proposal::ProposalStatus as S;

fn assert_rejected(from: S, event: E) {
    match from.apply(event) {
        Err(AppError::InvalidTransition { .. }) => {}
        other => panic!("{from} + {event} deveria ser rejeitado, veio {other:?}"),
    }
}

#[test]
fn caminho_feliz_ate_o_pagamento() {
    let status = S::Draft;
    let status = status.apply(E::Send).unwrap();
    assert_eq!(status, S::Sent);

    let status = status.apply(E::ClientView).unwrap();
    assert_eq!(status, S::Viewed);

    let status = status.apply(E::Approve).unwrap();
    assert_eq!(status, S::Approved);

    let status = status.apply(E::Sign).unwrap();
    assert_eq!(status, S::Signed);

    let status = status.apply(E::ConfirmPayment).unwrap();
    assert_eq!(status, S::Paid);
}

#[test]
fn aprovacao_direto_do_envio_sem_visualizacao() {
    // O webhook de visualização pode se perder; aprovar direto de SENT vale.
    assert_eq!(S::Sent.apply(E::Approve).unwrap(), S::Approved);
}

#[test]
fn aprovacao_depois_de_pedir_alteracoes() {
    let status = S::Viewed.apply(E::RequestChanges).unwrap();
    assert_eq!(status, S::ChangesRequested);
    assert_eq!(status.apply(E::Approve).unwrap(), S::Approved);
}

#[test]
fn assinar_sem_aprovacao_e_rejeitado() {
    // Propriedade central: nunca nasce contrato de proposta não aprovada.
    assert_rejected(S::Draft, E::Sign);
    assert_rejected(S::Sent, E::Sign);
    assert_rejected(S::Viewed, E::Sign);
    assert_rejected(S::ChangesRequested, E::Sign);
    assert_rejected(S::Cancelled, E::Sign);
}

#[test]
fn transicoes_invalidas_diversas() {
    assert_rejected(S::Sent, E::Send);
    assert_rejected(S::Approved, E::Send);
    assert_rejected(S::Viewed, E::ClientView);
    assert_rejected(S::Approved, E::RequestChanges);
    assert_rejected(S::Approved, E::ConfirmPayment);
    assert_rejected(S::Draft, E::Approve);
}

#[test]
fn cancelamento_vale_em_qualquer_estado_nao_terminal() {
    for status in [S::Draft, S::Sent, S::Viewed, S::Approved, S::ChangesRequested, S::Signed] {
        assert_eq!(status.apply(E::Cancel).unwrap(), S::Cancelled);
    }

    assert_rejected(S::Paid, E::Cancel);
    assert_rejected(S::Cancelled, E::Cancel);
}

#[test]
fn estados_terminais() {
    assert!(S::Paid.is_terminal());
    assert!(S::Cancelled.is_terminal());
    assert!(!S::Signed.is_terminal());
    assert!(!S::Draft.is_terminal());
}

#[test]
fn passo_do_assistente_deriva_do_status_persistido() {
    // Cliente que volta retoma de onde o registro diz, não de onde o
    // navegador parou.
    assert_eq!(PublicStep::from_status(S::Sent), PublicStep::Proposal);
    assert_eq!(PublicStep::from_status(S::Viewed), PublicStep::Proposal);
    assert_eq!(PublicStep::from_status(S::ChangesRequested), PublicStep::Proposal);
    assert_eq!(PublicStep::from_status(S::Approved), PublicStep::Form);
    assert_eq!(PublicStep::from_status(S::Signed), PublicStep::Success);
    assert_eq!(PublicStep::from_status(S::Paid), PublicStep::Success);
    assert_eq!(PublicStep::from_status(S::Cancelled), PublicStep::Proposal);
}
