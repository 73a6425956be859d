//! Deposit payload for the Chorus Pro `deposer/flux` endpoint.
//!
//! One invoice is sent as its rendered file; several invoices are bundled
//! in a gzip-compressed tar archive. The content is base64-encoded.
//!
//! # Example
//!
//! ```
//! use chorus_pro::core::*;
//! use chorus_pro::payload::*;
//!
//! let company = CompanyBuilder::new(1, "ACME SAS").invoice_format("xml_cii").build();
//! let invoice = InvoiceBuilder::new("FAC/2024/0001", MoveType::OutInvoice, company)
//!     .build()
//!     .unwrap();
//!
//! let render = |_: &Invoice, _: &ChorusInvoiceFormat| {
//!     Ok::<_, ChorusError>(b"<rsm:CrossIndustryInvoice/>".to_vec())
//! };
//! let payload = build_deposit_payload(&[invoice], &render, &SyntaxTable::default()).unwrap();
//! assert_eq!(payload.nom_fichier, "cii_chorus_facture_FAC-2024-0001.xml");
//! assert_eq!(payload.syntaxe_flux, "IN_DP_E1_CII_16B");
//! ```

mod archive;
mod format;

pub use format::{ChorusInvoiceFormat, SyntaxTable};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{ChorusError, Invoice};

/// Renders an invoice in a Chorus Pro format (UBL, CII, Factur-X PDF …).
pub trait InvoiceRenderer {
    fn render(&self, invoice: &Invoice, format: &ChorusInvoiceFormat) -> Result<Vec<u8>, ChorusError>;
}

impl<F> InvoiceRenderer for F
where
    F: Fn(&Invoice, &ChorusInvoiceFormat) -> Result<Vec<u8>, ChorusError>,
{
    fn render(&self, invoice: &Invoice, format: &ChorusInvoiceFormat) -> Result<Vec<u8>, ChorusError> {
        self(invoice, format)
    }
}

/// Body of a `factures/v1/deposer/flux` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositPayload {
    /// Base64-encoded file.
    #[serde(rename = "fichierFlux")]
    pub fichier_flux: String,
    #[serde(rename = "nomFichier")]
    pub nom_fichier: String,
    /// Chorus Pro syntax code of the file.
    #[serde(rename = "syntaxeFlux")]
    pub syntaxe_flux: String,
    /// Always false: files are not signed.
    #[serde(rename = "avecSignature")]
    pub avec_signature: bool,
}

impl DepositPayload {
    /// Decoded file content.
    pub fn decoded_content(&self) -> Result<Vec<u8>, ChorusError> {
        STANDARD
            .decode(&self.fichier_flux)
            .map_err(|e| ChorusError::Archive(format!("invalid base64 content: {e}")))
    }
}

/// Build the deposit payload of invoices sharing the same company format.
///
/// The format is read from the first invoice's company.
pub fn build_deposit_payload(
    invoices: &[Invoice],
    renderer: &dyn InvoiceRenderer,
    syntax: &SyntaxTable,
) -> Result<DepositPayload, ChorusError> {
    build_deposit_payload_at(invoices, renderer, syntax, Utc::now())
}

/// Same as [`build_deposit_payload`], with an explicit modification time
/// for the archive entries.
pub fn build_deposit_payload_at(
    invoices: &[Invoice],
    renderer: &dyn InvoiceRenderer,
    syntax: &SyntaxTable,
    now: DateTime<Utc>,
) -> Result<DepositPayload, ChorusError> {
    let Some(first) = invoices.first() else {
        return Err(ChorusError::EmptyBatch);
    };
    let company = &first.company;
    let raw_format = company
        .chorus_invoice_format
        .as_deref()
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ChorusError::MissingChorusFormat {
            company: company.display_name().to_string(),
        })?;
    let format = ChorusInvoiceFormat::parse(raw_format)?;
    let syntaxe_flux = syntax.syntax_for(&format)?.to_string();

    let (content, nom_fichier) = match invoices {
        [invoice] => (
            renderer.render(invoice, &format)?,
            format.invoice_filename(&invoice.name),
        ),
        _ => {
            let mut entries = Vec::with_capacity(invoices.len());
            for inv in invoices {
                entries.push((format.invoice_filename(&inv.name), renderer.render(inv, &format)?));
            }
            let mtime = u64::try_from(now.timestamp()).unwrap_or_default();
            (archive::tar_gz(&entries, mtime)?, format.batch_filename())
        }
    };

    tracing::debug!(
        filename = %nom_fichier,
        syntax = %syntaxe_flux,
        invoices = invoices.len(),
        bytes = content.len(),
        "chorus deposit payload built"
    );

    Ok(DepositPayload {
        fichier_flux: STANDARD.encode(content),
        nom_fichier,
        syntaxe_flux,
        avec_signature: false,
    })
}
