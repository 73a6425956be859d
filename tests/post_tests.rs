#![cfg(feature = "core")]

mod common;

use chorus_pro::api::*;
use chorus_pro::core::*;
use common::*;

fn chorus() -> Chorus<ReplayTransport> {
    Chorus::new(ReplayTransport::new())
}

fn post(chorus: &mut Chorus<ReplayTransport>, invoices: &mut [Invoice]) -> Result<AuditTrail, ChorusError> {
    let mut audit = AuditTrail::new();
    chorus.action_post(invoices, &mut audit)?;
    Ok(audit)
}

// ---------------------------------------------------------------------------
// SIRET
// ---------------------------------------------------------------------------

#[test]
fn plain_chorus_invoice_posts() {
    let mut invoices = vec![chorus_invoice("FAC/1", ChorusRequired::None).build().unwrap()];
    let audit = post(&mut chorus(), &mut invoices).unwrap();
    assert_eq!(invoices[0].state, InvoiceState::Posted);
    assert!(audit.entries.is_empty());
}

#[test]
fn company_without_siret() {
    let mut company = company();
    company.partner.nic = None;
    let mut invoices = vec![
        InvoiceBuilder::new("FAC/1", MoveType::OutInvoice, company)
            .partner(public_buyer(ChorusRequired::None))
            .transmit_method(CHORUS_TRANSMIT_METHOD)
            .payment_mode(iban_mode())
            .build()
            .unwrap(),
    ];
    let err = post(&mut chorus(), &mut invoices).unwrap_err();
    assert!(matches!(err, ChorusError::MissingCompanySiret { .. }));
    assert!(err.to_string().contains("ACME SAS"));
    assert_eq!(invoices[0].state, InvoiceState::Draft);
}

#[test]
fn customer_without_siret() {
    let mut buyer = public_buyer(ChorusRequired::None);
    buyer.siren = Some("  ".into());
    let mut invoices = vec![
        chorus_invoice("FAC/1", ChorusRequired::None)
            .partner(buyer)
            .build()
            .unwrap(),
    ];
    let err = post(&mut chorus(), &mut invoices).unwrap_err();
    assert!(matches!(err, ChorusError::MissingPartnerSiret { ref partner } if partner == "Mairie de Lyon"));
}

// ---------------------------------------------------------------------------
// Service and engagement requirements
// ---------------------------------------------------------------------------

#[test]
fn service_required_without_service_contact() {
    let mut invoices = vec![chorus_invoice("FAC/1", ChorusRequired::Service).build().unwrap()];
    let err = post(&mut chorus(), &mut invoices).unwrap_err();
    assert!(matches!(err, ChorusError::ServiceContactRequired { .. }));
}

#[test]
fn service_required_with_inactive_service() {
    let mut invoices = vec![
        chorus_invoice("FAC/1", ChorusRequired::Service)
            .partner(service_contact(service(false, false)))
            .commercial_partner(public_buyer(ChorusRequired::Service))
            .build()
            .unwrap(),
    ];
    let err = post(&mut chorus(), &mut invoices).unwrap_err();
    assert!(matches!(err, ChorusError::ServiceContactRequired { .. }));
}

#[test]
fn service_required_with_active_service() {
    let mut invoices = vec![
        chorus_invoice("FAC/1", ChorusRequired::Service)
            .partner(service_contact(service(true, false)))
            .commercial_partner(public_buyer(ChorusRequired::Service))
            .build()
            .unwrap(),
    ];
    post(&mut chorus(), &mut invoices).unwrap();
    assert_eq!(invoices[0].state, InvoiceState::Posted);
}

#[test]
fn engagement_required_without_reference() {
    let mut invoices = vec![
        chorus_invoice("FAC/1", ChorusRequired::Engagement)
            .reference("   ")
            .build()
            .unwrap(),
    ];
    let err = post(&mut chorus(), &mut invoices).unwrap_err();
    assert!(matches!(
        err,
        ChorusError::MissingEngagementNumber { service: None, .. }
    ));
}

#[test]
fn engagement_verified_and_noted_once_posted() {
    let transport = ReplayTransport::new().respond(COMMITMENT_SEARCH_PATH, commitments(1));
    let mut chorus = Chorus::new(transport);
    let mut invoices = vec![
        chorus_invoice("FAC/1", ChorusRequired::Engagement)
            .reference("EJ-2024-001")
            .build()
            .unwrap(),
    ];

    let audit = post(&mut chorus, &mut invoices).unwrap();
    assert_eq!(invoices[0].state, InvoiceState::Posted);
    assert_eq!(
        audit.notes_for("FAC/1"),
        vec!["Engagement juridique EJ-2024-001 checked via Chorus Pro API."]
    );
    assert_eq!(chorus.transport().calls_to(COMMITMENT_SEARCH_PATH), 1);
}

#[test]
fn unknown_engagement_blocks_post() {
    let transport = ReplayTransport::new().respond(COMMITMENT_SEARCH_PATH, commitments(0));
    let mut chorus = Chorus::new(transport);
    let mut invoices = vec![
        chorus_invoice("FAC/1", ChorusRequired::Engagement)
            .reference("EJ-404")
            .build()
            .unwrap(),
    ];
    let err = post(&mut chorus, &mut invoices).unwrap_err();
    assert!(matches!(err, ChorusError::CommitmentNumberNotFound { ref reference } if reference == "EJ-404"));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn engagement_not_checked_when_company_disabled() {
    let mut company = company();
    company.check_commitment_number = false;
    let mut invoices = vec![
        InvoiceBuilder::new("FAC/1", MoveType::OutInvoice, company)
            .partner(public_buyer(ChorusRequired::Engagement))
            .transmit_method(CHORUS_TRANSMIT_METHOD)
            .payment_mode(iban_mode())
            .reference("EJ-2024-001")
            .build()
            .unwrap(),
    ];
    let mut chorus = chorus();
    let audit = post(&mut chorus, &mut invoices).unwrap();
    assert!(audit.entries.is_empty());
    assert!(chorus.transport().requests().is_empty());
}

#[test]
fn service_with_engagement_flag_needs_reference() {
    let mut invoices = vec![
        chorus_invoice("FAC/1", ChorusRequired::None)
            .partner(service_contact(service(true, true)))
            .commercial_partner(public_buyer(ChorusRequired::None))
            .build()
            .unwrap(),
    ];
    let err = post(&mut chorus(), &mut invoices).unwrap_err();
    match err {
        ChorusError::MissingEngagementNumber { partner, service } => {
            assert_eq!(partner, "Direction des finances");
            assert_eq!(service.as_deref(), Some("SERV-FIN-01"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn service_or_engagement_accepts_a_service() {
    let mut invoices = vec![
        chorus_invoice("FAC/1", ChorusRequired::ServiceOrEngagement)
            .partner(service_contact(service(true, false)))
            .commercial_partner(public_buyer(ChorusRequired::ServiceOrEngagement))
            .build()
            .unwrap(),
    ];
    post(&mut chorus(), &mut invoices).unwrap();
}

#[test]
fn service_or_engagement_needs_one_of_them() {
    let mut invoices = vec![
        chorus_invoice("FAC/1", ChorusRequired::ServiceOrEngagement)
            .build()
            .unwrap(),
    ];
    let err = post(&mut chorus(), &mut invoices).unwrap_err();
    assert!(matches!(err, ChorusError::ServiceOrEngagementRequired { .. }));
}

#[test]
fn service_or_engagement_checks_the_reference() {
    let transport = ReplayTransport::new().respond(COMMITMENT_SEARCH_PATH, commitments(2));
    let mut chorus = Chorus::new(transport);
    let mut invoices = vec![
        chorus_invoice("FAC/1", ChorusRequired::ServiceOrEngagement)
            .reference("EJ-2024-001")
            .build()
            .unwrap(),
    ];
    let audit = post(&mut chorus, &mut invoices).unwrap();
    assert_eq!(audit.notes_for("FAC/1").len(), 1);
    assert_eq!(chorus.transport().calls_to(COMMITMENT_SEARCH_PATH), 1);
}

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

#[test]
fn invoice_without_payment_mode() {
    let mut inv = chorus_invoice("FAC/1", ChorusRequired::None).build().unwrap();
    inv.payment_mode = None;
    let err = post(&mut chorus(), &mut [inv]).unwrap_err();
    assert!(matches!(err, ChorusError::MissingPaymentMode));
}

#[test]
fn credit_transfer_without_bank_account() {
    let mut mode = iban_mode();
    mode.bank_account_link = BankAccountLink::Variable;
    let mut invoices = vec![
        chorus_invoice("FAC/1", ChorusRequired::None)
            .payment_mode(mode)
            .build()
            .unwrap(),
    ];
    let err = post(&mut chorus(), &mut invoices).unwrap_err();
    assert!(matches!(err, ChorusError::MissingBankAccount));
}

#[test]
fn credit_transfer_to_non_iban_account() {
    let mut invoices = vec![
        chorus_invoice("FAC/1", ChorusRequired::None)
            .partner_bank(BankAccount::other("12345678901"))
            .build()
            .unwrap(),
    ];
    let err = post(&mut chorus(), &mut invoices).unwrap_err();
    assert!(matches!(err, ChorusError::NonIbanAccount { ref account } if account == "12345678901"));
}

#[test]
fn cheque_payment_needs_no_bank_account() {
    let mode = PaymentMode {
        name: "Chèque".into(),
        payment_means_code: Some("20".into()),
        bank_account_link: BankAccountLink::Variable,
        fixed_bank_account: None,
    };
    let mut invoices = vec![
        chorus_invoice("FAC/1", ChorusRequired::None)
            .payment_mode(mode)
            .build()
            .unwrap(),
    ];
    post(&mut chorus(), &mut invoices).unwrap();
}

#[test]
fn refund_with_payment_mode() {
    let mut invoices = vec![
        InvoiceBuilder::new("AV/1", MoveType::OutRefund, company())
            .partner(public_buyer(ChorusRequired::None))
            .transmit_method(CHORUS_TRANSMIT_METHOD)
            .payment_mode(iban_mode())
            .build()
            .unwrap(),
    ];
    let err = post(&mut chorus(), &mut invoices).unwrap_err();
    assert!(matches!(err, ChorusError::PaymentModeOnRefund));
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

#[test]
fn non_chorus_invoices_skip_the_checks() {
    let mut invoices = vec![
        InvoiceBuilder::new("FAC/1", MoveType::OutInvoice, company())
            .partner(PartnerBuilder::company("Particulier").build())
            .build()
            .unwrap(),
    ];
    post(&mut chorus(), &mut invoices).unwrap();
    assert_eq!(invoices[0].state, InvoiceState::Posted);
}

#[test]
fn one_failure_blocks_the_whole_batch() {
    let transport = ReplayTransport::new().respond(COMMITMENT_SEARCH_PATH, commitments(1));
    let mut chorus = Chorus::new(transport);
    let mut invoices = vec![
        chorus_invoice("FAC/1", ChorusRequired::Engagement)
            .reference("EJ-2024-001")
            .build()
            .unwrap(),
        chorus_invoice("FAC/2", ChorusRequired::Service).build().unwrap(),
    ];

    let mut audit = AuditTrail::new();
    let err = chorus.action_post(&mut invoices, &mut audit).unwrap_err();
    assert!(matches!(err, ChorusError::ServiceContactRequired { .. }));
    assert!(invoices.iter().all(|i| i.state == InvoiceState::Draft));
    assert!(audit.entries.is_empty());
}

#[test]
fn notes_go_to_the_checked_invoice() {
    let transport = ReplayTransport::new().respond(COMMITMENT_SEARCH_PATH, commitments(1));
    let mut chorus = Chorus::new(transport);
    let mut invoices = vec![
        chorus_invoice("FAC/1", ChorusRequired::None).build().unwrap(),
        chorus_invoice("FAC/2", ChorusRequired::Engagement)
            .reference("EJ-2")
            .build()
            .unwrap(),
    ];
    let audit = post(&mut chorus, &mut invoices).unwrap();
    assert!(audit.notes_for("FAC/1").is_empty());
    assert_eq!(audit.notes_for("FAC/2").len(), 1);
}

#[test]
fn check_before_post_returns_indexed_notes() {
    let transport = ReplayTransport::new().respond(COMMITMENT_SEARCH_PATH, commitments(1));
    let mut chorus = Chorus::new(transport);
    let invoices = vec![
        chorus_invoice("FAC/1", ChorusRequired::None).build().unwrap(),
        chorus_invoice("FAC/2", ChorusRequired::Engagement)
            .reference("EJ-2")
            .build()
            .unwrap(),
    ];
    let notes = chorus.check_before_post(&invoices).unwrap();
    assert_eq!(
        notes,
        vec![AuditNote {
            index: 1,
            body: commitment_note("EJ-2"),
        }]
    );
    assert!(invoices.iter().all(|i| i.state == InvoiceState::Draft));
}

#[test]
fn only_drafts_can_be_posted() {
    let mut invoices = vec![
        chorus_invoice("FAC/1", ChorusRequired::None)
            .state(InvoiceState::Posted)
            .build()
            .unwrap(),
    ];
    let err = post(&mut chorus(), &mut invoices).unwrap_err();
    assert!(matches!(err, ChorusError::NotDraft { .. }));
}

#[test]
fn closure_audit_log() {
    let transport = ReplayTransport::new().respond(COMMITMENT_SEARCH_PATH, commitments(1));
    let mut chorus = Chorus::new(transport);
    let mut invoices = vec![
        chorus_invoice("FAC/1", ChorusRequired::Engagement)
            .reference("EJ-1")
            .build()
            .unwrap(),
    ];
    let mut seen = Vec::new();
    let mut log = |inv: &Invoice, body: &str| seen.push(format!("{}: {body}", inv.name));
    chorus.action_post(&mut invoices, &mut log).unwrap();
    assert_eq!(seen, vec!["FAC/1: Engagement juridique EJ-1 checked via Chorus Pro API."]);
}
