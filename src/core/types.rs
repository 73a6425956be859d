use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attachments::check_chorus_attachments;
use super::error::ChorusError;

/// Transmit method code that routes an invoice through Chorus Pro.
pub const CHORUS_TRANSMIT_METHOD: &str = "fr-chorus";

/// Company identifier used to group invoices per company.
pub type CompanyId = u64;

/// Accounting move (invoice, refund, …) with its Chorus Pro fields.
///
/// Deserializing runs the same attachment check as [`InvoiceBuilder::build`](super::InvoiceBuilder::build).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "InvoiceRecord")]
pub struct Invoice {
    /// Invoice number, e.g. "FAC/2024/0001".
    pub name: String,
    pub move_type: MoveType,
    pub state: InvoiceState,
    pub(crate) transmit_method: Option<String>,
    pub company: Company,
    /// Customer of the invoice; may be a contact of the commercial partner.
    pub partner: Partner,
    /// Commercial entity the customer belongs to.
    pub commercial_partner: Partner,
    /// Customer reference, carries the commitment number.
    pub reference: Option<String>,
    pub payment_mode: Option<PaymentMode>,
    /// Bank account set explicitly on the invoice.
    pub partner_bank: Option<BankAccount>,
    pub(crate) chorus_flow: Option<ChorusFlow>,
    pub(crate) chorus_identifier: Option<i64>,
    pub(crate) chorus_status: Option<String>,
    pub(crate) chorus_status_date: Option<DateTime<Utc>>,
    pub(crate) chorus_attachments: Vec<Attachment>,
}

/// Stored form of an [`Invoice`], checked before it becomes one.
#[derive(Deserialize)]
struct InvoiceRecord {
    name: String,
    move_type: MoveType,
    state: InvoiceState,
    #[serde(default)]
    transmit_method: Option<String>,
    company: Company,
    partner: Partner,
    commercial_partner: Partner,
    #[serde(default)]
    reference: Option<String>,
    #[serde(default)]
    payment_mode: Option<PaymentMode>,
    #[serde(default)]
    partner_bank: Option<BankAccount>,
    #[serde(default)]
    chorus_flow: Option<ChorusFlow>,
    #[serde(default)]
    chorus_identifier: Option<i64>,
    #[serde(default)]
    chorus_status: Option<String>,
    #[serde(default)]
    chorus_status_date: Option<DateTime<Utc>>,
    #[serde(default)]
    chorus_attachments: Vec<Attachment>,
}

impl TryFrom<InvoiceRecord> for Invoice {
    type Error = ChorusError;

    fn try_from(r: InvoiceRecord) -> Result<Self, Self::Error> {
        let invoice = Invoice {
            name: r.name,
            move_type: r.move_type,
            state: r.state,
            transmit_method: r.transmit_method,
            company: r.company,
            partner: r.partner,
            commercial_partner: r.commercial_partner,
            reference: r.reference,
            payment_mode: r.payment_mode,
            partner_bank: r.partner_bank,
            chorus_flow: r.chorus_flow,
            chorus_identifier: r.chorus_identifier,
            chorus_status: r.chorus_status,
            chorus_status_date: r.chorus_status_date,
            chorus_attachments: r.chorus_attachments,
        };
        check_chorus_attachments(&invoice)?;
        Ok(invoice)
    }
}

impl Invoice {
    /// Customer invoice or refund transmitted via Chorus Pro.
    pub fn is_chorus(&self) -> bool {
        self.move_type.is_customer_document()
            && self.transmit_method.as_deref() == Some(CHORUS_TRANSMIT_METHOD)
    }

    /// Commitment number (engagement juridique) carried by the invoice.
    pub fn commitment_number(&self) -> Option<&str> {
        self.reference.as_deref().filter(|r| !r.trim().is_empty())
    }

    pub fn transmit_method(&self) -> Option<&str> {
        self.transmit_method.as_deref()
    }

    /// Change the transmit method, re-checking the Chorus attachments.
    ///
    /// The previous value is kept when the new one makes the attachments
    /// non-compliant.
    pub fn set_transmit_method(&mut self, method: Option<&str>) -> Result<(), ChorusError> {
        let previous = std::mem::replace(&mut self.transmit_method, method.map(str::to_string));
        if let Err(e) = check_chorus_attachments(self) {
            self.transmit_method = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn chorus_attachments(&self) -> &[Attachment] {
        &self.chorus_attachments
    }

    /// Replace the Chorus attachments. Only allowed in draft; the new set
    /// must pass [`check_chorus_attachments`].
    pub fn set_chorus_attachments(&mut self, attachments: Vec<Attachment>) -> Result<(), ChorusError> {
        if self.state != InvoiceState::Draft {
            return Err(ChorusError::AttachmentsLocked {
                invoice: self.name.clone(),
            });
        }
        let previous = std::mem::replace(&mut self.chorus_attachments, attachments);
        if let Err(e) = check_chorus_attachments(self) {
            self.chorus_attachments = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Identifier assigned by the portal. Zero counts as unset.
    pub fn chorus_identifier(&self) -> Option<i64> {
        self.chorus_identifier.filter(|id| *id != 0)
    }

    /// Record the identifier assigned by the portal. It cannot change afterwards.
    pub fn assign_chorus_identifier(&mut self, identifier: i64) -> Result<(), ChorusError> {
        if let Some(existing) = self.chorus_identifier() {
            return Err(ChorusError::ChorusIdentifierAlreadySet {
                invoice: self.name.clone(),
                identifier: existing,
            });
        }
        self.chorus_identifier = Some(identifier);
        Ok(())
    }

    pub fn chorus_status(&self) -> Option<&str> {
        self.chorus_status.as_deref()
    }

    pub fn chorus_status_date(&self) -> Option<DateTime<Utc>> {
        self.chorus_status_date
    }

    pub(crate) fn record_chorus_status(&mut self, status: String, at: DateTime<Utc>) {
        self.chorus_status = Some(status);
        self.chorus_status_date = Some(at);
    }

    pub fn chorus_flow(&self) -> Option<&ChorusFlow> {
        self.chorus_flow.as_ref()
    }
}

/// Kind of accounting move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveType {
    OutInvoice,
    OutRefund,
    InInvoice,
    InRefund,
    Entry,
}

impl MoveType {
    /// Only customer invoices and refunds take part in Chorus flows.
    pub fn is_customer_document(&self) -> bool {
        matches!(self, Self::OutInvoice | Self::OutRefund)
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::OutInvoice => "out_invoice",
            Self::OutRefund => "out_refund",
            Self::InInvoice => "in_invoice",
            Self::InRefund => "in_refund",
            Self::Entry => "entry",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceState {
    Draft,
    Posted,
    Cancelled,
}

/// File attached to an invoice and uploaded alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    /// Filename, extension included.
    pub name: String,
    /// Size in bytes.
    pub file_size: u64,
    /// Raw content; empty for metadata-only attachments.
    #[serde(default)]
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            file_size: content.len() as u64,
            content,
        }
    }

    /// Attachment known only by its metadata (content stored elsewhere).
    pub fn with_size(name: impl Into<String>, file_size: u64) -> Self {
        Self {
            name: name.into(),
            file_size,
            content: Vec::new(),
        }
    }
}

/// Chorus Pro requirement configured on a public-sector customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChorusRequired {
    #[default]
    None,
    Service,
    Engagement,
    ServiceAndEngagement,
    ServiceOrEngagement,
}

impl ChorusRequired {
    pub fn requires_service(&self) -> bool {
        matches!(self, Self::Service | Self::ServiceAndEngagement)
    }

    pub fn requires_engagement(&self) -> bool {
        matches!(self, Self::Engagement | Self::ServiceAndEngagement)
    }
}

/// Structural unit (service) of a public-sector buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChorusService {
    pub code: String,
    pub name: String,
    pub active: bool,
    /// Invoices routed to this service must carry a commitment number.
    pub engagement_required: bool,
}

/// Customer, contact or company partner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub name: String,
    pub is_company: bool,
    pub siren: Option<String>,
    pub nic: Option<String>,
    pub fr_chorus_required: ChorusRequired,
    pub chorus_service: Option<ChorusService>,
    /// Chorus Pro structure identifier (`idStructureCPP`), when known.
    pub chorus_identifier: Option<i64>,
}

impl Partner {
    pub fn display_name(&self) -> &str {
        &self.name
    }

    /// SIREN and NIC are both filled in.
    pub fn has_siret(&self) -> bool {
        let filled = |v: &Option<String>| v.as_ref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.siren) && filled(&self.nic)
    }

    /// SIRET (SIREN + NIC), if both parts are set.
    pub fn siret(&self) -> Option<String> {
        if !self.has_siret() {
            return None;
        }
        Some(format!(
            "{}{}",
            self.siren.as_deref().unwrap_or_default().trim(),
            self.nic.as_deref().unwrap_or_default().trim()
        ))
    }

    /// A contact with a name and an active Chorus service.
    pub fn chorus_service_ok(&self) -> bool {
        !self.is_company
            && !self.name.trim().is_empty()
            && self.chorus_service.as_ref().is_some_and(|s| s.active)
    }
}

/// Company issuing the invoices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub partner: Partner,
    /// Invoice format sent to Chorus Pro, e.g. "xml_cii" or "pdf_factur-x".
    pub chorus_invoice_format: Option<String>,
    /// Check commitment numbers against the Chorus Pro API.
    pub check_commitment_number: bool,
    pub chorus_api: Option<crate::api::ApiParams>,
}

impl Company {
    pub fn display_name(&self) -> &str {
        &self.name
    }

    /// Resolve the API parameters of the company.
    ///
    /// Returns `Ok(None)` when they are not configured and `raise_if_ko` is false.
    pub fn api_params(
        &self,
        raise_if_ko: bool,
    ) -> Result<Option<&crate::api::ApiParams>, ChorusError> {
        match &self.chorus_api {
            Some(params) => Ok(Some(params)),
            None if raise_if_ko => Err(ChorusError::MissingApiCredentials {
                company: self.name.clone(),
            }),
            None => {
                tracing::warn!(company = %self.name, "Chorus Pro API credentials not configured");
                Ok(None)
            }
        }
    }
}

/// How a payment mode picks the bank account printed on invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankAccountLink {
    /// Always the bank account of the payment mode's journal.
    Fixed,
    #[default]
    Variable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMode {
    pub name: String,
    /// UNECE 4461 payment means code of the payment method ("30" if unset).
    pub payment_means_code: Option<String>,
    pub bank_account_link: BankAccountLink,
    /// Bank account of the fixed journal.
    pub fixed_bank_account: Option<BankAccount>,
}

impl PaymentMode {
    pub fn means_code(&self) -> &str {
        self.payment_means_code
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_PAYMENT_MEANS_CODE)
    }
}

/// Payment means code used when the payment method has none.
pub const DEFAULT_PAYMENT_MEANS_CODE: &str = "30";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankAccountType {
    Iban,
    Bank,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    pub acc_number: String,
    pub acc_type: BankAccountType,
}

impl BankAccount {
    pub fn iban(number: impl Into<String>) -> Self {
        Self {
            acc_number: number.into(),
            acc_type: BankAccountType::Iban,
        }
    }

    pub fn other(number: impl Into<String>) -> Self {
        Self {
            acc_number: number.into(),
            acc_type: BankAccountType::Bank,
        }
    }
}

/// Deposit of one or more invoices on Chorus Pro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChorusFlow {
    /// Deposit number (`numeroFluxDepot`).
    pub name: String,
    /// Deposit date as returned by the portal.
    pub date: Option<String>,
    /// Syntax code of the deposited file, e.g. "IN_DP_E1_CII_16B".
    pub syntax: String,
    pub company_id: CompanyId,
    pub invoice_count: usize,
}
