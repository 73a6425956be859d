use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the Chorus Pro checks, payload builder and API calls.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChorusError {
    // --- attachment constraints ---
    /// Attachment filename longer than the portal accepts.
    #[error(
        "On Chorus Pro, the attachment filename is {max} characters maximum \
         (extension included). The filename '{name}' has {len} characters."
    )]
    FilenameTooLong { name: String, len: usize, max: usize },

    #[error(
        "On Chorus Pro, the attachment filenames must have an extension. \
         The filename '{name}' doesn't have any extension."
    )]
    MissingExtension { name: String },

    #[error(
        "On Chorus Pro, the allowed formats for the attachments are the following: {}. \
         The attachment '{name}' is not part of this list.",
        crate::core::CHORUS_ALLOWED_FORMATS.join(", ")
    )]
    UnsupportedFormat { name: String },

    #[error("The size of the attachment '{name}' is 0.")]
    EmptyAttachment { name: String },

    #[error(
        "On Chorus Pro, each attachment cannot exceed {max_mb} Mb. \
         The attachment '{name}' weights {size_mb} Mb."
    )]
    AttachmentTooLarge {
        name: String,
        size_mb: Decimal,
        max_mb: Decimal,
    },

    #[error(
        "On Chorus Pro, an invoice with its attachments cannot exceed {portal_max_mb} Mb, \
         so we set a limit of {max_mb} Mb for the attachments. \
         The attachments have a total size of {total_mb} Mb."
    )]
    AttachmentsTooLarge {
        total_mb: Decimal,
        max_mb: Decimal,
        portal_max_mb: Decimal,
    },

    // --- invoice lifecycle ---
    #[error("Chorus attachments of invoice '{invoice}' can only be changed in draft.")]
    AttachmentsLocked { invoice: String },

    #[error("Invoice '{invoice}' already has Chorus identifier {identifier}.")]
    ChorusIdentifierAlreadySet { invoice: String, identifier: i64 },

    #[error("Invoice '{invoice}' is not in draft and cannot be posted.")]
    NotDraft { invoice: String },

    // --- pre-post gate ---
    #[error("Missing SIRET on partner '{partner}' linked to company '{company}'.")]
    MissingCompanySiret { partner: String, company: String },

    #[error("Missing SIRET on partner '{partner}'. This information is required for Chorus invoices.")]
    MissingPartnerSiret { partner: String },

    #[error(
        "Partner '{partner}' is configured as Service required for Chorus, so you must \
         select a contact as customer for the invoice and this contact should have a name \
         and a Chorus service and the Chorus service must be active."
    )]
    ServiceContactRequired { partner: String },

    /// `service` is set when the requirement comes from the contact's Chorus
    /// service rather than from the commercial partner's mode.
    #[error("{}", missing_engagement_message(.partner, .service))]
    MissingEngagementNumber {
        partner: String,
        service: Option<String>,
    },

    #[error(
        "Partner '{partner}' is configured as 'Service or Engagement' required for Chorus \
         but there is no engagement number in the field 'Reference' and the customer of the \
         invoice is not correctly configured as a service (should be a contact with a Chorus \
         service and a name)."
    )]
    ServiceOrEngagementRequired { partner: String },

    // --- payment data ---
    #[error("Missing Payment Mode. This information is required for Chorus.")]
    MissingPaymentMode,

    #[error(
        "Missing bank account information for payment. For that, you have two options: \
         either the payment mode of the invoice should have 'Link to Bank Account' = 'fixed' \
         and the related bank journal should have a 'Bank Account' set, or the field \
         'Bank Account' should be set on the customer invoice."
    )]
    MissingBankAccount,

    #[error("Chorus only accepts IBAN. But the bank account '{account}' is not an IBAN.")]
    NonIbanAccount { account: String },

    #[error("The Payment Mode must be empty for customer refunds sent to Chorus.")]
    PaymentModeOnRefund,

    // --- commitment numbers ---
    #[error("Missing commitment number.")]
    MissingCommitmentNumber,

    #[error(
        "The engagement juridique '{reference}' is {len} characters long. \
         The maximum is 50. Please update the customer order reference."
    )]
    CommitmentNumberTooLong { reference: String, len: usize },

    #[error(
        "Commitment number '{reference}' not found in Chorus Pro. \
         Please check the customer order reference carefully."
    )]
    CommitmentNumberNotFound { reference: String },

    #[error("Chorus Pro structure identifier of company '{company}' (SIRET {siret}) not found.")]
    CompanyIdentifierNotFound { company: String, siret: String },

    // --- payload / deposit ---
    #[error(
        "The Chorus Invoice Format is not configured on the Accounting Configuration \
         page of company '{company}'"
    )]
    MissingChorusFormat { company: String },

    #[error("Chorus invoice format '{format}' is malformed (expected 'ext_variant').")]
    InvalidChorusFormat { format: String },

    #[error("No Chorus syntax code is known for invoice format '{format}'.")]
    UnknownChorusFormat { format: String },

    #[error("No invoice to send to Chorus Pro.")]
    EmptyBatch,

    #[error("Invoice '{invoice}' is not a customer invoice/refund sent via Chorus Pro.")]
    NotChorusInvoice { invoice: String },

    #[error("Invoice '{invoice}' must be posted before being sent to Chorus Pro.")]
    NotPosted { invoice: String },

    #[error("Invoice '{invoice}' has already been sent to Chorus Pro in flow '{flow}'.")]
    AlreadySent { invoice: String, flow: String },

    #[error("All the invoices of a Chorus flow must belong to the same company.")]
    MixedCompanies,

    #[error("archive error: {0}")]
    Archive(String),

    // --- status synchronisation / remote ---
    #[error("Missing Chorus Invoice Identifier on invoice '{invoice}'")]
    MissingChorusIdentifier { invoice: String },

    #[error("Chorus Pro API credentials are not configured on company '{company}'.")]
    MissingApiCredentials { company: String },

    /// Network or HTTP-level failure.
    #[error("Chorus Pro transport error: {0}")]
    Transport(String),

    /// The portal answered with an error status or an unusable body.
    #[error("Chorus Pro API error on '{url_path}': {message}")]
    Api { url_path: String, message: String },
}

fn missing_engagement_message(partner: &str, service: &Option<String>) -> String {
    match service {
        Some(code) => format!(
            "Partner '{partner}' is linked to Chorus service '{code}' which is marked as \
             'Engagement required', so the field 'Reference' of its invoices must contain \
             an engagement number."
        ),
        None => format!(
            "Partner '{partner}' is configured as Engagement required for Chorus, so the \
             field 'Reference' of its invoices must contain an engagement number."
        ),
    }
}

/// Coarse classification of a [`ChorusError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User-correctable configuration or data problem.
    Validation,
    /// Constraint violation raised as soon as the offending data is set.
    Integrity,
    /// Transport, portal or archive failure.
    Remote,
}

impl ChorusError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FilenameTooLong { .. }
            | Self::MissingExtension { .. }
            | Self::UnsupportedFormat { .. }
            | Self::EmptyAttachment { .. }
            | Self::AttachmentTooLarge { .. }
            | Self::AttachmentsTooLarge { .. }
            | Self::AttachmentsLocked { .. }
            | Self::ChorusIdentifierAlreadySet { .. }
            | Self::NotDraft { .. } => ErrorKind::Integrity,
            Self::Transport(_) | Self::Api { .. } | Self::Archive(_) => ErrorKind::Remote,
            _ => ErrorKind::Validation,
        }
    }
}
