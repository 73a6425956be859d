//! Chorus Pro records and the checks that need no remote call.
//!
//! This module provides the invoice, partner and company records, the
//! attachment constraints and the payment-data rules applied before an
//! invoice is posted.

mod attachments;
mod builder;
mod error;
mod payment;
mod types;

pub use attachments::*;
pub use builder::*;
pub use error::*;
pub use payment::*;
pub use types::*;
