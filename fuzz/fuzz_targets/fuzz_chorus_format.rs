#![no_main]

use chorus_pro::payload::{ChorusInvoiceFormat, SyntaxTable};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(format) = ChorusInvoiceFormat::parse(s) {
            assert!(!format.invoice_filename(s).contains('/'));
            let _ = format.batch_filename();
            let _ = SyntaxTable::default().syntax_for(&format);
        }
    }
});
