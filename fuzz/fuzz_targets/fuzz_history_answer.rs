#![no_main]

use chorus_pro::api::{Chorus, HISTORY_PATH, ReplayTransport};
use chorus_pro::core::*;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary portal answers must not panic the status sync.
    let Ok(answer) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let company = CompanyBuilder::new(1, "ACME SAS")
        .api(chorus_pro::api::ApiParams::new(
            chorus_pro::api::ApiEnvironment::Qualif,
            "t",
            "l",
            "p",
        ))
        .build();
    let Ok(invoice) = InvoiceBuilder::new("FAC/1", MoveType::OutInvoice, company)
        .transmit_method(CHORUS_TRANSMIT_METHOD)
        .chorus_identifier(1)
        .build()
    else {
        return;
    };
    let mut chorus = Chorus::new(ReplayTransport::new().respond(HISTORY_PATH, answer));
    let _ = chorus.update_invoice_status(&mut [invoice]);
});
