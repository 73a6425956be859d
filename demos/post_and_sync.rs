//! End-to-end walk through a Chorus Pro invoice lifecycle against a
//! scripted portal: post gate, flow deposit and status synchronisation.
//!
//! Run with: `cargo run --example post_and_sync --features payload`

use chorus_pro::api::*;
use chorus_pro::core::*;
use chorus_pro::payload::*;
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), ChorusError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chorus_pro=debug")),
        )
        .init();

    let company = CompanyBuilder::new(1, "ACME SAS")
        .partner(
            PartnerBuilder::company("ACME SAS")
                .siret("732829320", "00074")
                .build(),
        )
        .invoice_format("xml_cii")
        .check_commitment_number(true)
        .api(ApiParams::new(ApiEnvironment::Qualif, "oauth-token", "TECH_1@cpro.fr", "secret"))
        .build();

    let buyer = PartnerBuilder::company("Mairie de Lyon")
        .siret("216901231", "00011")
        .chorus_required(ChorusRequired::Engagement)
        .build();

    let mut invoices = vec![
        InvoiceBuilder::new("FAC/2024/0001", MoveType::OutInvoice, company)
            .partner(buyer)
            .transmit_method(CHORUS_TRANSMIT_METHOD)
            .reference("EJ-2024-001")
            .payment_mode(PaymentMode {
                name: "Virement SEPA".into(),
                payment_means_code: Some("30".into()),
                bank_account_link: BankAccountLink::Fixed,
                fixed_bank_account: Some(BankAccount::iban("FR7630006000011234567890189")),
            })
            .add_attachment(Attachment::new("bon_de_commande.pdf", b"%PDF-1.7".to_vec()))
            .build()?,
    ];

    let transport = ReplayTransport::new()
        .respond(
            STRUCTURE_SEARCH_PATH,
            json!({"listeStructures": [{"idStructureCPP": 25884400}]}),
        )
        .respond(
            COMMITMENT_SEARCH_PATH,
            json!({"listeEngagementJuridique": [{"numeroEngagement": "EJ-2024-001"}]}),
        )
        .respond(
            DEPOSIT_PATH,
            json!({"numeroFluxDepot": "DEP_20240315_000123", "dateDepot": "2024-03-15"}),
        )
        .respond(
            HISTORY_PATH,
            json!({"idFacture": 4242, "statutCourantCode": "MISE_A_DISPOSITION"}),
        );
    let mut chorus = Chorus::new(transport);

    let mut audit = AuditTrail::new();
    chorus.action_post(&mut invoices, &mut audit)?;
    for (invoice, note) in &audit.entries {
        println!("{invoice}: {note}");
    }

    let render = |inv: &Invoice, _: &ChorusInvoiceFormat| {
        Ok::<_, ChorusError>(format!("<rsm:CrossIndustryInvoice>{}</rsm:CrossIndustryInvoice>", inv.name).into_bytes())
    };
    let flow = chorus.deposit_flux(&mut invoices, &render, &SyntaxTable::default())?;
    println!("deposited as flow {} ({})", flow.name, flow.syntax);

    // The portal assigns the invoice identifier once the flow is integrated.
    invoices[0].assign_chorus_identifier(4242)?;
    let report = chorus.update_invoice_status(&mut invoices)?;
    println!(
        "status: {} (updated {}, skipped {})",
        invoices[0].chorus_status().unwrap_or("-"),
        report.updated,
        report.skipped
    );
    Ok(())
}
