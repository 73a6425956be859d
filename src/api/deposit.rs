use serde::Deserialize;

use super::{Chorus, ChorusTransport, parse_answer};
use crate::core::{ChorusError, ChorusFlow, Invoice, InvoiceState};
use crate::payload::{InvoiceRenderer, SyntaxTable, build_deposit_payload};

/// Flow deposit endpoint.
pub const DEPOSIT_PATH: &str = "factures/v1/deposer/flux";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DepositAnswer {
    #[serde(default)]
    numero_flux_depot: Option<String>,
    #[serde(default)]
    date_depot: Option<String>,
}

impl<T: ChorusTransport> Chorus<T> {
    /// Send posted Chorus invoices of one company to the portal as a single
    /// flow, and link the created flow to each of them.
    pub fn deposit_flux(
        &mut self,
        invoices: &mut [Invoice],
        renderer: &dyn InvoiceRenderer,
        syntax: &SyntaxTable,
    ) -> Result<ChorusFlow, ChorusError> {
        let Some(first) = invoices.first() else {
            return Err(ChorusError::EmptyBatch);
        };
        let company = first.company.clone();

        for inv in invoices.iter() {
            if !inv.is_chorus() {
                return Err(ChorusError::NotChorusInvoice {
                    invoice: inv.name.clone(),
                });
            }
            if inv.state != InvoiceState::Posted {
                return Err(ChorusError::NotPosted {
                    invoice: inv.name.clone(),
                });
            }
            if let Some(flow) = inv.chorus_flow() {
                return Err(ChorusError::AlreadySent {
                    invoice: inv.name.clone(),
                    flow: flow.name.clone(),
                });
            }
            if inv.company.id != company.id {
                return Err(ChorusError::MixedCompanies);
            }
        }

        let payload = build_deposit_payload(invoices, renderer, syntax)?;
        let Some(params) = company.api_params(true)? else {
            return Err(ChorusError::MissingApiCredentials {
                company: company.name.clone(),
            });
        };

        let body = serde_json::to_value(&payload).map_err(|e| ChorusError::Api {
            url_path: DEPOSIT_PATH.to_string(),
            message: format!("failed to serialize payload: {e}"),
        })?;
        let answer = self.transport.post(params, DEPOSIT_PATH, &body)?;
        let answer: DepositAnswer = parse_answer(DEPOSIT_PATH, answer)?;
        let Some(name) = answer.numero_flux_depot.filter(|n| !n.is_empty()) else {
            return Err(ChorusError::Api {
                url_path: DEPOSIT_PATH.to_string(),
                message: "no deposit number (numeroFluxDepot) in the answer".into(),
            });
        };

        let flow = ChorusFlow {
            name,
            date: answer.date_depot,
            syntax: payload.syntaxe_flux,
            company_id: company.id,
            invoice_count: invoices.len(),
        };
        for inv in invoices.iter_mut() {
            inv.chorus_flow = Some(flow.clone());
        }
        tracing::info!(
            flow = %flow.name,
            company = %company.name,
            invoices = flow.invoice_count,
            "invoices deposited on Chorus Pro"
        );
        Ok(flow)
    }
}
