use serde::Deserialize;
use serde_json::{Value, json};

use super::{AuditLog, Chorus, ChorusTransport, parse_answer};
use crate::core::{ChorusError, Company, Invoice};

/// Legal commitment (engagement juridique) search endpoint.
pub const COMMITMENT_SEARCH_PATH: &str = "engagementsJuridiques/v1/rechercher";

/// Maximum length of a commitment number on Chorus Pro.
const COMMITMENT_NUMBER_MAX: usize = 50;

/// Outcome of a commitment-number check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitmentCheck {
    /// Checking is disabled for the company or not allowed for the user.
    NotChecked,
    /// The portal knows the commitment number.
    Found,
    /// The portal does not know it (only when not raising).
    NotFound,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitmentSearchAnswer {
    #[serde(default)]
    liste_engagement_juridique: Option<Vec<Value>>,
}

/// Audit note posted when a commitment number has been verified.
pub fn commitment_note(reference: &str) -> String {
    format!("Engagement juridique {reference} checked via Chorus Pro API.")
}

impl<T: ChorusTransport> Chorus<T> {
    /// Check that a commitment number exists on Chorus Pro, in state
    /// "COMMANDE", for the company's structure.
    ///
    /// Returns [`CommitmentCheck::NotChecked`] without looking at the
    /// reference when the company has not enabled the check or the context
    /// has no API access. Usable from any document carrying a customer
    /// reference, not only invoices.
    pub fn check_commitment_number(
        &mut self,
        company: &Company,
        reference: &str,
        raise_if_not_found: bool,
    ) -> Result<CommitmentCheck, ChorusError> {
        if !company.check_commitment_number {
            tracing::info!(company = %company.name, "commitment number check not enabled");
            return Ok(CommitmentCheck::NotChecked);
        }
        if !self.context.api_access {
            tracing::debug!(company = %company.name, "no Chorus Pro API access, commitment number not checked");
            return Ok(CommitmentCheck::NotChecked);
        }

        let reference = reference.trim();
        if reference.is_empty() {
            return Err(ChorusError::MissingCommitmentNumber);
        }

        let Some(params) = company.api_params(true)? else {
            return Err(ChorusError::MissingApiCredentials {
                company: company.name.clone(),
            });
        };
        let params = params.clone();
        let company_identifier = self.company_structure_identifier(company, &params)?;

        let len = reference.chars().count();
        if len > COMMITMENT_NUMBER_MAX {
            return Err(ChorusError::CommitmentNumberTooLong {
                reference: reference.to_string(),
                len,
            });
        }

        let payload = json!({
            "structureReceptriceEngagementJuridique": company_identifier.to_string(),
            "numeroEngagementJuridique": reference,
            "etatCourantEngagementJuridique": "COMMANDE",
        });
        let answer = self
            .transport
            .post(&params, COMMITMENT_SEARCH_PATH, &payload)?;
        let answer: CommitmentSearchAnswer = parse_answer(COMMITMENT_SEARCH_PATH, answer)?;

        match answer.liste_engagement_juridique.as_deref().unwrap_or_default() {
            [] => {
                if raise_if_not_found {
                    return Err(ChorusError::CommitmentNumberNotFound {
                        reference: reference.to_string(),
                    });
                }
                tracing::warn!(reference, "commitment number not found in Chorus Pro");
                Ok(CommitmentCheck::NotFound)
            }
            [_] => Ok(CommitmentCheck::Found),
            several => {
                tracing::warn!(
                    reference,
                    count = several.len(),
                    "several engagements juridiques match this commitment number"
                );
                Ok(CommitmentCheck::Found)
            }
        }
    }

    /// [`check_commitment_number`](Self::check_commitment_number) for an
    /// invoice, posting an audit note when the number was found.
    pub fn invoice_check_commitment_number(
        &mut self,
        invoice: &Invoice,
        reference: &str,
        raise_if_not_found: bool,
        audit: &mut dyn AuditLog,
    ) -> Result<CommitmentCheck, ChorusError> {
        let res = self.check_commitment_number(&invoice.company, reference, raise_if_not_found)?;
        if res == CommitmentCheck::Found {
            audit.message_post(invoice, &commitment_note(reference));
        }
        Ok(res)
    }
}
