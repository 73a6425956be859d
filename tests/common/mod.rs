#![allow(dead_code)]

use chorus_pro::api::*;
use chorus_pro::core::*;
use serde_json::{Value, json};

pub const COMPANY_STRUCTURE: i64 = 25_884_400;

pub fn params() -> ApiParams {
    ApiParams::new(ApiEnvironment::Qualif, "token", "TECH_1@cpro.fr", "secret")
}

pub fn company() -> Company {
    CompanyBuilder::new(1, "ACME SAS")
        .partner(
            PartnerBuilder::company("ACME SAS")
                .siret("732829320", "00074")
                .chorus_identifier(COMPANY_STRUCTURE)
                .build(),
        )
        .invoice_format("xml_cii")
        .check_commitment_number(true)
        .api(params())
        .build()
}

pub fn other_company() -> Company {
    CompanyBuilder::new(2, "Beta SARL")
        .partner(
            PartnerBuilder::company("Beta SARL")
                .siret("552100554", "00013")
                .chorus_identifier(26_000_002)
                .build(),
        )
        .invoice_format("xml_cii")
        .api(params())
        .build()
}

pub fn public_buyer(mode: ChorusRequired) -> Partner {
    PartnerBuilder::company("Mairie de Lyon")
        .siret("216901231", "00011")
        .chorus_required(mode)
        .build()
}

pub fn service(active: bool, engagement_required: bool) -> ChorusService {
    ChorusService {
        code: "SERV-FIN-01".into(),
        name: "Direction des finances".into(),
        active,
        engagement_required,
    }
}

pub fn service_contact(service: ChorusService) -> Partner {
    PartnerBuilder::contact("Direction des finances")
        .chorus_service(service)
        .build()
}

pub fn iban_mode() -> PaymentMode {
    PaymentMode {
        name: "Virement SEPA".into(),
        payment_means_code: Some("30".into()),
        bank_account_link: BankAccountLink::Fixed,
        fixed_bank_account: Some(BankAccount::iban("FR7630006000011234567890189")),
    }
}

/// Customer invoice sent via Chorus Pro, valid when the buyer's mode is `None`.
pub fn chorus_invoice(name: &str, mode: ChorusRequired) -> InvoiceBuilder {
    InvoiceBuilder::new(name, MoveType::OutInvoice, company())
        .partner(public_buyer(mode))
        .transmit_method(CHORUS_TRANSMIT_METHOD)
        .payment_mode(iban_mode())
}

pub fn commitments(count: usize) -> Value {
    let list: Vec<Value> = (0..count)
        .map(|i| json!({"idEngagement": i, "etatCourantEngagement": "COMMANDE"}))
        .collect();
    json!({ "codeRetour": 0, "listeEngagementJuridique": list })
}

pub fn history(id: i64, status: &str) -> Value {
    json!({ "codeRetour": 0, "idFacture": id, "statutCourantCode": status })
}
