use std::collections::HashMap;

use chrono::Utc;
use serde_json::{Value, json};

use super::{ApiParams, Chorus, ChorusTransport};
use crate::core::{ChorusError, CompanyId, Invoice};

/// Invoice history endpoint.
pub const HISTORY_PATH: &str = "factures/v1/consulter/historique";

/// Counters of a status synchronisation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusUpdateReport {
    /// Invoices whose status was refreshed.
    pub updated: usize,
    /// Invoices queried without a usable status in the answer.
    pub unchanged: usize,
    /// Invoices not queried (not Chorus, no identifier, no credentials).
    pub skipped: usize,
}

impl<T: ChorusTransport> Chorus<T> {
    /// Refresh `chorus_status` of the given invoices from the portal.
    ///
    /// Called by a button on the invoice or by a scheduler. Invoices are
    /// queried in input order. Invoices of companies without credentials
    /// are skipped. With `raise_if_ko` unset in the context, invoices
    /// without identifier are skipped too instead of failing. A transport
    /// error stops the run.
    pub fn update_invoice_status(
        &mut self,
        invoices: &mut [Invoice],
    ) -> Result<StatusUpdateReport, ChorusError> {
        tracing::info!("start to update chorus invoice status");
        let raise_if_ko = self.context.raise_if_ko;
        let mut report = StatusUpdateReport::default();
        let mut company2api: HashMap<CompanyId, Option<ApiParams>> = HashMap::new();
        let mut selected = Vec::with_capacity(invoices.len());

        for (index, inv) in invoices.iter().enumerate() {
            if !inv.is_chorus() {
                tracing::debug!(
                    invoice = %inv.name,
                    move_type = inv.move_type.code(),
                    "not a Chorus invoice, skipped"
                );
                report.skipped += 1;
                continue;
            }
            if inv.chorus_identifier().is_none() {
                if raise_if_ko {
                    return Err(ChorusError::MissingChorusIdentifier {
                        invoice: inv.name.clone(),
                    });
                }
                tracing::warn!(invoice = %inv.name, "skipping invoice: missing chorus invoice identifier");
                report.skipped += 1;
                continue;
            }
            if !company2api.contains_key(&inv.company.id) {
                let params = inv.company.api_params(false)?.cloned();
                company2api.insert(inv.company.id, params);
            }
            if company2api
                .get(&inv.company.id)
                .is_some_and(|params| params.is_some())
            {
                selected.push(index);
            } else {
                report.skipped += 1;
            }
        }

        for index in selected {
            let inv = &mut invoices[index];
            let Some(Some(params)) = company2api.get(&inv.company.id) else {
                continue;
            };
            let Some(identifier) = inv.chorus_identifier() else {
                continue;
            };
            match self.consult_history(params, identifier)? {
                Some(status) => {
                    tracing::debug!(invoice = %inv.name, %status, "chorus status updated");
                    inv.record_chorus_status(status, Utc::now());
                    report.updated += 1;
                }
                None => report.unchanged += 1,
            }
        }

        tracing::info!(
            updated = report.updated,
            unchanged = report.unchanged,
            skipped = report.skipped,
            "end of the update of chorus invoice status"
        );
        Ok(report)
    }

    /// Current status code of an invoice on the portal, if the answer is
    /// about this invoice and carries one. Answers of an unexpected shape
    /// leave the invoice untouched.
    fn consult_history(
        &mut self,
        params: &ApiParams,
        identifier: i64,
    ) -> Result<Option<String>, ChorusError> {
        let payload = json!({ "idFacture": identifier });
        let answer = self.transport.post(params, HISTORY_PATH, &payload)?;
        if answer.get("idFacture").and_then(Value::as_i64) != Some(identifier) {
            tracing::debug!(identifier, "history answer is not about this invoice");
            return Ok(None);
        }
        Ok(answer
            .get("statutCourantCode")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string))
    }
}
