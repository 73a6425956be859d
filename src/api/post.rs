use super::commitment::commitment_note;
use super::{AuditLog, Chorus, ChorusTransport, CommitmentCheck};
use crate::core::{ChorusError, ChorusRequired, Invoice, InvoiceState, check_payment_data};

/// Audit note produced while checking a batch, emitted once the batch posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditNote {
    /// Position of the invoice in the checked batch.
    pub index: usize,
    pub body: String,
}

impl<T: ChorusTransport> Chorus<T> {
    /// Post a batch of invoices.
    ///
    /// Chorus invoices are checked first; the first failure aborts the
    /// whole batch and nothing is posted or logged. Other invoices are
    /// posted without Chorus checks.
    pub fn action_post(
        &mut self,
        invoices: &mut [Invoice],
        audit: &mut dyn AuditLog,
    ) -> Result<(), ChorusError> {
        if let Some(inv) = invoices.iter().find(|i| i.state != InvoiceState::Draft) {
            return Err(ChorusError::NotDraft {
                invoice: inv.name.clone(),
            });
        }

        let notes = self.check_before_post(invoices)?;
        for note in &notes {
            audit.message_post(&invoices[note.index], &note.body);
        }
        for inv in invoices.iter_mut() {
            inv.state = InvoiceState::Posted;
        }
        tracing::info!(count = invoices.len(), "invoices posted");
        Ok(())
    }

    /// Run the Chorus checks of a batch without posting it.
    ///
    /// Returns the audit notes to emit when the batch is posted.
    pub fn check_before_post(&mut self, invoices: &[Invoice]) -> Result<Vec<AuditNote>, ChorusError> {
        let mut notes = Vec::new();
        for (index, inv) in invoices.iter().enumerate().filter(|(_, i)| i.is_chorus()) {
            if let Some(reference) = self.check_chorus_invoice(inv)? {
                notes.push(AuditNote {
                    index,
                    body: commitment_note(&reference),
                });
            }
        }
        Ok(notes)
    }

    /// Checks of a single Chorus invoice. Returns the commitment number
    /// verified on the portal, if any.
    fn check_chorus_invoice(&mut self, inv: &Invoice) -> Result<Option<String>, ChorusError> {
        let company_partner = &inv.company.partner;
        if !company_partner.has_siret() {
            return Err(ChorusError::MissingCompanySiret {
                partner: company_partner.display_name().to_string(),
                company: inv.company.display_name().to_string(),
            });
        }

        let cpartner = &inv.commercial_partner;
        if !cpartner.has_siret() {
            return Err(ChorusError::MissingPartnerSiret {
                partner: cpartner.display_name().to_string(),
            });
        }

        let mode = cpartner.fr_chorus_required;
        if mode.requires_service() && !inv.partner.chorus_service_ok() {
            return Err(ChorusError::ServiceContactRequired {
                partner: cpartner.display_name().to_string(),
            });
        }

        let commitment_number = inv.commitment_number();
        let mut checked = None;

        if mode.requires_engagement() {
            let Some(number) = commitment_number else {
                return Err(ChorusError::MissingEngagementNumber {
                    partner: cpartner.display_name().to_string(),
                    service: None,
                });
            };
            checked = self.verify_commitment(inv, number)?;
        } else if let Some(service) = inv
            .partner
            .chorus_service
            .as_ref()
            .filter(|s| s.engagement_required)
        {
            let Some(number) = commitment_number else {
                return Err(ChorusError::MissingEngagementNumber {
                    partner: inv.partner.display_name().to_string(),
                    service: Some(service.code.clone()),
                });
            };
            checked = self.verify_commitment(inv, number)?;
        }

        if mode == ChorusRequired::ServiceOrEngagement && !inv.partner.chorus_service_ok() {
            let Some(number) = commitment_number else {
                return Err(ChorusError::ServiceOrEngagementRequired {
                    partner: cpartner.display_name().to_string(),
                });
            };
            if checked.is_none() {
                checked = self.verify_commitment(inv, number)?;
            }
        }

        check_payment_data(inv)?;
        Ok(checked)
    }

    fn verify_commitment(&mut self, inv: &Invoice, number: &str) -> Result<Option<String>, ChorusError> {
        match self.check_commitment_number(&inv.company, number, true)? {
            CommitmentCheck::Found => Ok(Some(number.to_string())),
            CommitmentCheck::NotChecked | CommitmentCheck::NotFound => Ok(None),
        }
    }
}
