use super::attachments::check_chorus_attachments;
use super::error::ChorusError;
use super::types::*;
use crate::api::ApiParams;

/// Builder for invoices.
///
/// ```
/// use chorus_pro::core::*;
///
/// let company = CompanyBuilder::new(1, "ACME SAS").build();
/// let invoice = InvoiceBuilder::new("FAC/2024/0001", MoveType::OutInvoice, company)
///     .partner(PartnerBuilder::company("Mairie de Lyon").build())
///     .transmit_method(CHORUS_TRANSMIT_METHOD)
///     .reference("EJ-2024-42")
///     .build()
///     .unwrap();
/// assert_eq!(invoice.commitment_number(), Some("EJ-2024-42"));
/// ```
pub struct InvoiceBuilder {
    name: String,
    move_type: MoveType,
    state: InvoiceState,
    transmit_method: Option<String>,
    company: Company,
    partner: Option<Partner>,
    commercial_partner: Option<Partner>,
    reference: Option<String>,
    payment_mode: Option<PaymentMode>,
    partner_bank: Option<BankAccount>,
    chorus_identifier: Option<i64>,
    chorus_attachments: Vec<Attachment>,
}

impl InvoiceBuilder {
    pub fn new(name: impl Into<String>, move_type: MoveType, company: Company) -> Self {
        Self {
            name: name.into(),
            move_type,
            state: InvoiceState::Draft,
            transmit_method: None,
            company,
            partner: None,
            commercial_partner: None,
            reference: None,
            payment_mode: None,
            partner_bank: None,
            chorus_identifier: None,
            chorus_attachments: Vec::new(),
        }
    }

    pub fn state(mut self, state: InvoiceState) -> Self {
        self.state = state;
        self
    }

    pub fn transmit_method(mut self, method: impl Into<String>) -> Self {
        self.transmit_method = Some(method.into());
        self
    }

    /// Customer of the invoice. Also used as commercial partner unless
    /// [`commercial_partner`](Self::commercial_partner) is set.
    pub fn partner(mut self, partner: Partner) -> Self {
        self.partner = Some(partner);
        self
    }

    pub fn commercial_partner(mut self, partner: Partner) -> Self {
        self.commercial_partner = Some(partner);
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn payment_mode(mut self, mode: PaymentMode) -> Self {
        self.payment_mode = Some(mode);
        self
    }

    pub fn partner_bank(mut self, account: BankAccount) -> Self {
        self.partner_bank = Some(account);
        self
    }

    pub fn chorus_identifier(mut self, identifier: i64) -> Self {
        self.chorus_identifier = Some(identifier);
        self
    }

    pub fn add_attachment(mut self, attachment: Attachment) -> Self {
        self.chorus_attachments.push(attachment);
        self
    }

    /// Build the invoice, checking its Chorus attachments.
    pub fn build(self) -> Result<Invoice, ChorusError> {
        let partner = self
            .partner
            .or_else(|| self.commercial_partner.clone())
            .unwrap_or_else(|| PartnerBuilder::company("").build());
        let commercial_partner = self.commercial_partner.unwrap_or_else(|| partner.clone());

        let invoice = Invoice {
            name: self.name,
            move_type: self.move_type,
            state: self.state,
            transmit_method: self.transmit_method,
            company: self.company,
            partner,
            commercial_partner,
            reference: self.reference,
            payment_mode: self.payment_mode,
            partner_bank: self.partner_bank,
            chorus_flow: None,
            chorus_identifier: self.chorus_identifier,
            chorus_status: None,
            chorus_status_date: None,
            chorus_attachments: self.chorus_attachments,
        };

        check_chorus_attachments(&invoice)?;
        Ok(invoice)
    }
}

/// Builder for [`Partner`].
pub struct PartnerBuilder {
    partner: Partner,
}

impl PartnerBuilder {
    fn new(name: impl Into<String>, is_company: bool) -> Self {
        Self {
            partner: Partner {
                name: name.into(),
                is_company,
                siren: None,
                nic: None,
                fr_chorus_required: ChorusRequired::None,
                chorus_service: None,
                chorus_identifier: None,
            },
        }
    }

    /// A legal entity.
    pub fn company(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    /// A contact person or department of a company.
    pub fn contact(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    pub fn siret(mut self, siren: impl Into<String>, nic: impl Into<String>) -> Self {
        self.partner.siren = Some(siren.into());
        self.partner.nic = Some(nic.into());
        self
    }

    pub fn chorus_required(mut self, required: ChorusRequired) -> Self {
        self.partner.fr_chorus_required = required;
        self
    }

    pub fn chorus_service(mut self, service: ChorusService) -> Self {
        self.partner.chorus_service = Some(service);
        self
    }

    pub fn chorus_identifier(mut self, identifier: i64) -> Self {
        self.partner.chorus_identifier = Some(identifier);
        self
    }

    pub fn build(self) -> Partner {
        self.partner
    }
}

/// Builder for [`Company`].
pub struct CompanyBuilder {
    company: Company,
}

impl CompanyBuilder {
    pub fn new(id: CompanyId, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            company: Company {
                id,
                partner: PartnerBuilder::company(name.clone()).build(),
                name,
                chorus_invoice_format: None,
                check_commitment_number: false,
                chorus_api: None,
            },
        }
    }

    pub fn partner(mut self, partner: Partner) -> Self {
        self.company.partner = partner;
        self
    }

    pub fn invoice_format(mut self, format: impl Into<String>) -> Self {
        self.company.chorus_invoice_format = Some(format.into());
        self
    }

    pub fn check_commitment_number(mut self, enabled: bool) -> Self {
        self.company.check_commitment_number = enabled;
        self
    }

    pub fn api(mut self, params: ApiParams) -> Self {
        self.company.chorus_api = Some(params);
        self
    }

    pub fn build(self) -> Company {
        self.company
    }
}
