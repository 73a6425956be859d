use std::collections::HashMap;

use crate::core::ChorusError;

/// Invoice format configured on a company, e.g. "xml_cii".
///
/// The first three characters are the file extension, the part after the
/// separator names the format variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChorusInvoiceFormat {
    raw: String,
    file_extension: String,
    short_format: String,
}

impl ChorusInvoiceFormat {
    pub fn parse(raw: &str) -> Result<Self, ChorusError> {
        let mut chars = raw.chars();
        let file_extension: String = chars.by_ref().take(3).collect();
        // separator
        if file_extension.chars().count() < 3 || chars.next().is_none() {
            return Err(ChorusError::InvalidChorusFormat {
                format: raw.to_string(),
            });
        }
        Ok(Self {
            raw: raw.to_string(),
            file_extension,
            short_format: chars.collect(),
        })
    }

    /// Configured format string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn file_extension(&self) -> &str {
        &self.file_extension
    }

    pub fn short_format(&self) -> &str {
        &self.short_format
    }

    /// Filename of one invoice: `{short}_chorus_facture_{number}.{ext}`,
    /// slashes of the invoice number replaced by dashes.
    pub fn invoice_filename(&self, invoice_name: &str) -> String {
        format!(
            "{}_chorus_facture_{}.{}",
            self.short_format,
            invoice_name.replace('/', "-"),
            self.file_extension
        )
    }

    /// Filename of a batch of invoices.
    pub fn batch_filename(&self) -> String {
        format!("{}_chorus_lot_factures.tar.gz", self.short_format)
    }
}

/// Mapping from invoice formats to Chorus Pro flow syntax codes.
#[derive(Debug, Clone)]
pub struct SyntaxTable {
    codes: HashMap<String, String>,
}

impl Default for SyntaxTable {
    fn default() -> Self {
        Self::empty()
            .with("xml_cii", "IN_DP_E1_CII_16B")
            .with("xml_ubl", "IN_DP_E1_UBL_INVOICE_V2")
            .with("xml_ubl_chorus", "IN_DP_E1_UBL_INVOICE")
            .with("pdf_factur-x", "IN_DP_E2_CII_FACTURX")
    }
}

impl SyntaxTable {
    /// Table without any entry.
    pub fn empty() -> Self {
        Self {
            codes: HashMap::new(),
        }
    }

    /// Add or replace the syntax code of a format.
    pub fn with(mut self, format: impl Into<String>, syntax: impl Into<String>) -> Self {
        self.codes.insert(format.into(), syntax.into());
        self
    }

    pub fn get(&self, format: &str) -> Option<&str> {
        self.codes.get(format).map(String::as_str)
    }

    pub fn syntax_for(&self, format: &ChorusInvoiceFormat) -> Result<&str, ChorusError> {
        self.get(format.as_str())
            .ok_or_else(|| ChorusError::UnknownChorusFormat {
                format: format.as_str().to_string(),
            })
    }
}
