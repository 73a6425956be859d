use super::error::ChorusError;
use super::types::*;

/// Payment means codes (UNECE 4461) that require bank details.
pub const CREDIT_TRF_CODES: &[&str] = &["30", "31", "42"];

/// Check the payment data Chorus Pro needs for an invoice.
///
/// - customer invoices need a payment mode and, for credit transfers, an IBAN
/// - customer refunds must not carry a payment mode
pub fn check_payment_data(invoice: &Invoice) -> Result<(), ChorusError> {
    match invoice.move_type {
        MoveType::OutInvoice => check_invoice_payment(invoice),
        MoveType::OutRefund => check_refund_payment(invoice),
        MoveType::InInvoice | MoveType::InRefund | MoveType::Entry => Ok(()),
    }
}

fn check_invoice_payment(invoice: &Invoice) -> Result<(), ChorusError> {
    let Some(mode) = &invoice.payment_mode else {
        return Err(ChorusError::MissingPaymentMode);
    };

    if !CREDIT_TRF_CODES.contains(&mode.means_code()) {
        return Ok(());
    }

    let Some(account) = resolve_bank_account(invoice, mode) else {
        return Err(ChorusError::MissingBankAccount);
    };
    if account.acc_type != BankAccountType::Iban {
        return Err(ChorusError::NonIbanAccount {
            account: account.acc_number.clone(),
        });
    }
    Ok(())
}

fn check_refund_payment(invoice: &Invoice) -> Result<(), ChorusError> {
    if invoice.payment_mode.is_some() {
        return Err(ChorusError::PaymentModeOnRefund);
    }
    Ok(())
}

/// Bank account of the invoice, falling back to the fixed account of the
/// payment mode.
pub fn resolve_bank_account<'a>(
    invoice: &'a Invoice,
    mode: &'a PaymentMode,
) -> Option<&'a BankAccount> {
    invoice.partner_bank.as_ref().or_else(|| {
        if mode.bank_account_link == BankAccountLink::Fixed {
            mode.fixed_bank_account.as_ref()
        } else {
            None
        }
    })
}
