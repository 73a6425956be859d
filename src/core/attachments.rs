//! Chorus Pro rules for invoice attachments.
//!
//! See <https://communaute.chorus-pro.gouv.fr/pieces-jointes-dans-chorus-pro-quelques-regles-a-respecter/>.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::ChorusError;
use super::types::{Attachment, Invoice};

/// Maximum filename length, extension included.
pub const CHORUS_FILENAME_MAX: usize = 50;
/// Maximum size of one attachment, in Mb.
pub const CHORUS_FILESIZE_MAX_MO: Decimal = dec!(10);
/// Hard limit of the portal for an invoice and its attachments, in Mb.
pub const CHORUS_TOTAL_FILESIZE_MAX_MO: Decimal = dec!(120);
/// Limit applied to the attachments, leaving room for the invoice itself.
pub const CHORUS_TOTAL_ATTACHMENTS_MAX_MO: Decimal = dec!(118);

/// Extensions accepted by Chorus Pro (upper case, with the leading dot).
pub const CHORUS_ALLOWED_FORMATS: &[&str] = &[
    ".BMP", ".GIF", ".FAX", ".ODT", ".PPT", ".TIFF", ".XLS", ".BZ2", ".GZ", ".JPEG", ".P7S",
    ".RTF", ".TXT", ".XML", ".CSV", ".GZIP", ".JPG", ".PDF", ".SVG", ".XHTML", ".XLSX", ".DOC",
    ".HTM", ".ODP", ".PNG", ".TGZ", ".XLC", ".ZIP", ".DOCX", ".HTML", ".ODS", ".PPS", ".TIF",
    ".XLM", ".PPTX",
];

const BYTES_PER_MO: Decimal = dec!(1048576);

/// Check the Chorus attachments of an invoice.
///
/// Only customer invoices and refunds sent through Chorus Pro are checked;
/// the first offending attachment stops the check.
pub fn check_chorus_attachments(invoice: &Invoice) -> Result<(), ChorusError> {
    if !invoice.is_chorus() {
        return Ok(());
    }
    check_attachment_set(invoice.chorus_attachments())
}

/// Check a set of attachments against the Chorus Pro rules, regardless of
/// the invoice they belong to.
pub fn check_attachment_set(attachments: &[Attachment]) -> Result<(), ChorusError> {
    let mut total_size: u64 = 0;
    for attach in attachments {
        check_attachment(attach)?;
        total_size = total_size.saturating_add(attach.file_size);
    }

    if total_size > 0 {
        let total_mb = size_in_mo(total_size);
        if total_mb > CHORUS_TOTAL_ATTACHMENTS_MAX_MO {
            return Err(ChorusError::AttachmentsTooLarge {
                total_mb,
                max_mb: CHORUS_TOTAL_ATTACHMENTS_MAX_MO,
                portal_max_mb: CHORUS_TOTAL_FILESIZE_MAX_MO,
            });
        }
    }
    Ok(())
}

/// Check a single attachment: name length, extension and size.
pub fn check_attachment(attach: &Attachment) -> Result<(), ChorusError> {
    let len = attach.name.chars().count();
    if len > CHORUS_FILENAME_MAX {
        return Err(ChorusError::FilenameTooLong {
            name: attach.name.clone(),
            len,
            max: CHORUS_FILENAME_MAX,
        });
    }

    let Some(extension) = file_extension(&attach.name) else {
        return Err(ChorusError::MissingExtension {
            name: attach.name.clone(),
        });
    };
    if !is_allowed_format(extension) {
        return Err(ChorusError::UnsupportedFormat {
            name: attach.name.clone(),
        });
    }

    if attach.file_size == 0 {
        return Err(ChorusError::EmptyAttachment {
            name: attach.name.clone(),
        });
    }

    let size_mb = size_in_mo(attach.file_size);
    if size_mb >= CHORUS_FILESIZE_MAX_MO {
        return Err(ChorusError::AttachmentTooLarge {
            name: attach.name.clone(),
            size_mb,
            max_mb: CHORUS_FILESIZE_MAX_MO,
        });
    }
    Ok(())
}

/// Whether `extension` (with its leading dot, any case) is accepted.
pub fn is_allowed_format(extension: &str) -> bool {
    let upper = extension.to_uppercase();
    CHORUS_ALLOWED_FORMATS.contains(&upper.as_str())
}

/// Extension of a filename, leading dot included.
///
/// Leading dots of the basename do not start an extension, so ".profile"
/// has none while "archive.tar.gz" has ".gz".
pub fn file_extension(name: &str) -> Option<&str> {
    let base = name.rsplit('/').next().unwrap_or(name);
    let dot = base.rfind('.')?;
    if base[..dot].chars().all(|c| c == '.') {
        return None;
    }
    Some(&base[dot..])
}

/// Size in Mb, rounded half-to-even to one decimal and always shown with it.
fn size_in_mo(bytes: u64) -> Decimal {
    let mut mb = (Decimal::from(bytes) / BYTES_PER_MO).round_dp(1);
    mb.rescale(1);
    mb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitelist_has_35_entries() {
        assert_eq!(CHORUS_ALLOWED_FORMATS.len(), 35);
    }

    #[test]
    fn extension_rules() {
        assert_eq!(file_extension("facture.pdf"), Some(".pdf"));
        assert_eq!(file_extension("archive.tar.gz"), Some(".gz"));
        assert_eq!(file_extension("dir.v2/readme"), None);
        assert_eq!(file_extension(".profile"), None);
        assert_eq!(file_extension("..pdf"), None);
        assert_eq!(file_extension("scan."), Some("."));
        assert_eq!(file_extension("scan"), None);
    }

    #[test]
    fn case_insensitive_formats() {
        assert!(is_allowed_format(".pdf"));
        assert!(is_allowed_format(".Docx"));
        assert!(!is_allowed_format(".exe"));
        assert!(!is_allowed_format("."));
    }

    #[test]
    fn rounding_to_one_decimal() {
        assert_eq!(size_in_mo(1_048_576), dec!(1.0));
        // 9.96 Mb rounds up to the limit
        assert_eq!(size_in_mo(10_443_817), dec!(10.0));
        assert_eq!(size_in_mo(524_288), dec!(0.5));
        assert_eq!(size_in_mo(10 * 1_048_576).to_string(), "10.0");
    }

    #[test]
    fn dotted_name_without_extension_is_missing_not_unsupported() {
        let err = check_attachment(&Attachment::with_size(".hidden", 10)).unwrap_err();
        assert!(matches!(err, ChorusError::MissingExtension { .. }));
    }

    #[test]
    fn trailing_dot_is_unsupported() {
        let err = check_attachment(&Attachment::with_size("scan.", 10)).unwrap_err();
        assert!(matches!(err, ChorusError::UnsupportedFormat { .. }));
    }
}
