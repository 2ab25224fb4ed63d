// src/services/document_service.rs

use chrono::Utc;
use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::error::AppError,
    db::{ContractRepository, PaymentRepository, ProposalRepository, SettingsRepository},
    models::{payment::PaymentMethod, proposal::ProposalStatus},
    services::contract_service,
};

#[derive(Clone)]
pub struct DocumentService {
    repo: ProposalRepository,
    contract_repo: ContractRepository,
    payment_repo: PaymentRepository,
    settings_repo: SettingsRepository,
}

impl DocumentService {
    pub fn new(
        repo: ProposalRepository,
        contract_repo: ContractRepository,
        payment_repo: PaymentRepository,
        settings_repo: SettingsRepository,
    ) -> Self {
        Self {
            repo,
            contract_repo,
            payment_repo,
            settings_repo,
        }
    }

    /// PDF do contrato para o passo de sucesso da página pública. Depois da
    /// assinatura usa o texto congelado do registro; antes dela, renderiza
    /// uma prévia com os dados já coletados. Contrato por arquivo não tem
    /// texto para renderizar: o cliente baixa o próprio arquivo.
    pub async fn generate_contract_pdf<'e, E>(
        &self,
        executor: E,
        public_token: &str,
    ) -> Result<Vec<u8>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // 1. Busca os Dados
        let proposal = self
            .repo
            .find_by_token(&mut *tx, public_token)
            .await?
            .ok_or(AppError::ProposalNotFound)?;

        if proposal.status == ProposalStatus::Draft {
            return Err(AppError::ProposalNotFound);
        }

        let items = self.repo.list_items(&mut *tx, proposal.id).await?;
        let contract = self
            .contract_repo
            .find_by_proposal(&mut *tx, proposal.id)
            .await?;
        let settings = self
            .settings_repo
            .get_settings(&mut *tx, proposal.profile_id)
            .await?;
        let payment = match proposal.payment_config_id {
            Some(config_id) => self.payment_repo.find_any(&mut *tx, config_id).await?,
            None => None,
        };

        tx.commit().await?;

        let today = Utc::now().date_naive();
        let content = match contract.as_ref().and_then(|c| c.signed_content.clone()) {
            Some(signed) => signed,
            None => match proposal.contract_content.as_deref() {
                Some(text) if !text.trim().is_empty() => contract_service::render_contract(
                    text,
                    &contract_service::client_values(&proposal.client_data),
                    &items,
                    proposal.total_amount,
                    today,
                ),
                _ => return Err(AppError::ContractNotFound),
            },
        };

        // 2. Configura o PDF
        // Carrega a fonte da pasta 'fonts/'
        let font_family = genpdf::fonts::from_files("./fonts", "Roboto", None)
            .map_err(|_| AppError::FontNotFound("Fonte não encontrada na pasta ./fonts".to_string()))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Contrato — {}", proposal.title));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO DO ESTÚDIO ---
        let studio_name = settings
            .as_ref()
            .and_then(|s| s.studio_name.clone())
            .unwrap_or("ESTÚDIO".to_string());
        doc.push(
            elements::Paragraph::new(studio_name)
                .styled(style::Style::new().bold().with_font_size(18)),
        );

        if let Some(doc_num) = settings.as_ref().and_then(|s| s.document_number.clone()) {
            doc.push(
                elements::Paragraph::new(format!("CNPJ/CPF: {}", doc_num))
                    .styled(style::Style::new().with_font_size(10)),
            );
        }

        doc.push(elements::Break::new(1.5));

        doc.push(
            elements::Paragraph::new(format!("CONTRATO — {}", proposal.title))
                .styled(style::Style::new().bold().with_font_size(14)),
        );

        doc.push(elements::Paragraph::new(format!(
            "Data: {}",
            today.format("%d/%m/%Y")
        )));

        if let Some(client) = proposal.client_name.as_deref() {
            doc.push(elements::Paragraph::new(format!("Cliente: {}", client)));
        }

        if let Some(signed) = contract.as_ref() {
            doc.push(elements::Paragraph::new(format!(
                "Assinado em: {}",
                signed.signed_at.format("%d/%m/%Y %H:%M")
            )));
        }

        doc.push(elements::Break::new(2));

        // --- TEXTO DO CONTRATO ---
        for line in content.lines() {
            if line.trim().is_empty() {
                doc.push(elements::Break::new(1));
            } else {
                doc.push(elements::Paragraph::new(line));
            }
        }

        doc.push(elements::Break::new(2));

        // --- TABELA DE ITENS ---
        // Pesos das colunas: Nome (4), Qtd (1), Preço (2), Total (2)
        let mut table = elements::TableLayout::new(vec![4, 1, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        // Header da Tabela
        let style_bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Item").styled(style_bold))
            .element(elements::Paragraph::new("Qtd").styled(style_bold))
            .element(elements::Paragraph::new("Unitário").styled(style_bold))
            .element(elements::Paragraph::new("Total").styled(style_bold))
            .push()
            .expect("Table error");

        // Linhas
        for item in &items {
            let (unit, line_total) = if item.show_price {
                let line_total =
                    item.unit_price * rust_decimal::Decimal::from(item.quantity);
                (
                    contract_service::format_brl(item.unit_price),
                    contract_service::format_brl(line_total),
                )
            } else {
                ("Incluído".to_string(), "—".to_string())
            };

            table
                .row()
                .element(elements::Paragraph::new(item.name.clone()))
                .element(elements::Paragraph::new(format!("{}", item.quantity)))
                .element(elements::Paragraph::new(unit))
                .element(elements::Paragraph::new(line_total))
                .push()
                .expect("Table row error");
        }

        doc.push(table);
        doc.push(elements::Break::new(2));

        // --- TOTAIS ---
        let mut total_paragraph = elements::Paragraph::new(format!(
            "TOTAL: {}",
            contract_service::format_brl(proposal.total_amount)
        ));

        total_paragraph.set_alignment(genpdf::Alignment::Right);

        doc.push(total_paragraph.styled(style::Style::new().bold().with_font_size(12)));

        doc.push(elements::Break::new(2));

        // --- ÁREA DE PAGAMENTO ---
        if let Some(payment) = payment {
            doc.push(
                elements::Paragraph::new(format!("PAGAMENTO — {}", payment.label))
                    .styled(style::Style::new().bold().with_font_size(12)),
            );

            match payment.method {
                PaymentMethod::Pix => {
                    if let Some(key) = payment.pix_key {
                        doc.push(elements::Paragraph::new(format!("Chave PIX: {}", key)));
                        doc.push(elements::Break::new(1));

                        // QR Code simples da chave. Para o "Pix Copia e Cola"
                        // oficial (EMV BR Code) seria preciso uma lib de
                        // payload Pix.
                        let code = QrCode::new(key.as_bytes()).map_err(|e| {
                            AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
                        })?;

                        let image_buffer = code.render::<Luma<u8>>().build();
                        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

                        let pdf_image =
                            genpdf::elements::Image::from_dynamic_image(dynamic_image)
                                .map_err(|e| {
                                    AppError::InternalServerError(anyhow::Error::msg(
                                        e.to_string(),
                                    ))
                                })?
                                .with_scale(genpdf::Scale::new(0.5, 0.5));

                        doc.push(pdf_image);
                    }
                }
                PaymentMethod::BankTransfer => {
                    if let Some(details) = payment.bank_details {
                        doc.push(elements::Paragraph::new(details));
                    }
                }
                PaymentMethod::PaymentLink => {
                    if let Some(link) = payment.payment_link {
                        doc.push(elements::Paragraph::new(format!("Link: {}", link)));
                    }
                }
                PaymentMethod::Custom => {}
            }

            if let Some(instructions) = payment.instructions {
                doc.push(elements::Break::new(1));
                doc.push(
                    elements::Paragraph::new(instructions)
                        .styled(style::Style::new().with_font_size(10)),
                );
            }
        }

        // --- RODAPÉ ---
        if let Some(addr) = settings.and_then(|s| s.address) {
            doc.push(elements::Break::new(2));
            doc.push(
                elements::Paragraph::new(addr)
                    .styled(style::Style::new().italic().with_font_size(8)),
            );
        }

        // 3. Renderiza para Buffer (Memória)
        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        Ok(buffer)
    }
}
